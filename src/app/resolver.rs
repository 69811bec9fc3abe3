use tracing::{info, warn};

use super::api::VideoApi;

/// Marker YouTube uses at index 1 of a playlist id for a channel's uploads.
const UPLOADS_MARKER: char = 'U';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolvedVia {
    Username,
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedChannel {
    pub(crate) channel_id: String,
    pub(crate) uploads_playlist_id: String,
    pub(crate) via: ResolvedVia,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    Resolved(ResolvedChannel),
    NotFound,
}

/// Legacy-username lookup first; a channel-scoped search when that yields nothing.
pub(crate) fn resolve_channel<A>(api: &A, identifier: &str) -> Resolution
where
    A: VideoApi + ?Sized,
{
    let direct = match api.channels_for_username(identifier) {
        Ok(ids) => ids.into_iter().next(),
        Err(err) => {
            info!(channel = identifier, error = %err, "username lookup failed; trying search");
            None
        }
    };

    let (channel_id, via) = match direct {
        Some(id) => (id, ResolvedVia::Username),
        None => match api.search_channels(identifier) {
            Ok(ids) => match ids.into_iter().next() {
                Some(id) => (id, ResolvedVia::Search),
                None => {
                    warn!(channel = identifier, "no channel found by username or search; skipping");
                    return Resolution::NotFound;
                }
            },
            Err(err) => {
                warn!(channel = identifier, error = %err, "channel search failed; skipping");
                return Resolution::NotFound;
            }
        },
    };

    let Some(uploads_playlist_id) = uploads_playlist_id(&channel_id) else {
        warn!(
            channel = identifier,
            channel_id = %channel_id,
            "channel id too short to derive an uploads playlist; skipping"
        );
        return Resolution::NotFound;
    };

    Resolution::Resolved(ResolvedChannel {
        channel_id,
        uploads_playlist_id,
        via,
    })
}

/// `UCxxxx` -> `UUxxxx`.
pub(crate) fn uploads_playlist_id(channel_id: &str) -> Option<String> {
    if channel_id.chars().count() < 2 {
        return None;
    }
    Some(
        channel_id
            .chars()
            .enumerate()
            .map(|(idx, ch)| if idx == 1 { UPLOADS_MARKER } else { ch })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ApiError;
    use crate::test_support::FakeApi;

    #[test]
    fn uploads_id_replaces_second_character_only() {
        assert_eq!(
            uploads_playlist_id("UC_x5XG1OV2P6uZZ5FSM9Ttw").as_deref(),
            Some("UU_x5XG1OV2P6uZZ5FSM9Ttw")
        );
        assert_eq!(uploads_playlist_id("UU").as_deref(), Some("UU"));
        assert_eq!(uploads_playlist_id("U"), None);
        assert_eq!(uploads_playlist_id(""), None);
    }

    #[test]
    fn direct_match_never_triggers_search() {
        let api = FakeApi::default()
            .with_username("pierre", Ok(vec!["UCdirect".to_string()]))
            .with_search("pierre", Ok(vec!["UCsearch".to_string()]));

        let resolution = resolve_channel(&api, "pierre");

        assert_eq!(
            resolution,
            Resolution::Resolved(ResolvedChannel {
                channel_id: "UCdirect".to_string(),
                uploads_playlist_id: "UUdirect".to_string(),
                via: ResolvedVia::Username,
            })
        );
        assert_eq!(api.count_calls("search:"), 0);
    }

    #[test]
    fn empty_direct_result_falls_back_to_first_search_hit() {
        let api = FakeApi::default().with_search(
            "@JustinTrudeau",
            Ok(vec!["UCfirst".to_string(), "UCsecond".to_string()]),
        );

        match resolve_channel(&api, "@JustinTrudeau") {
            Resolution::Resolved(channel) => {
                assert_eq!(channel.channel_id, "UCfirst");
                assert_eq!(channel.via, ResolvedVia::Search);
            }
            Resolution::NotFound => panic!("search hit should resolve"),
        }
        assert_eq!(
            api.calls(),
            vec!["channels:@JustinTrudeau", "search:@JustinTrudeau"]
        );
    }

    #[test]
    fn failed_direct_lookup_falls_back_to_search() {
        let api = FakeApi::default()
            .with_username("jagmeet", Err(ApiError::Transport("reset".to_string())))
            .with_search("jagmeet", Ok(vec!["UCjagmeet".to_string()]));

        assert!(matches!(
            resolve_channel(&api, "jagmeet"),
            Resolution::Resolved(ResolvedChannel { via: ResolvedVia::Search, .. })
        ));
    }

    #[test]
    fn no_match_anywhere_is_not_found() {
        let api = FakeApi::default();
        assert_eq!(resolve_channel(&api, "nobody"), Resolution::NotFound);
    }

    #[test]
    fn failed_search_is_not_found() {
        let api = FakeApi::default().with_search(
            "nobody",
            Err(ApiError::Status {
                status: 403,
                excerpt: "quotaExceeded".to_string(),
            }),
        );
        assert_eq!(resolve_channel(&api, "nobody"), Resolution::NotFound);
    }
}
