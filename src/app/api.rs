use serde_json::Value;

use crate::config::Config;
use crate::http::{ApiError, ApiResult, HttpClient, excerpt};

const PLAYLIST_ITEM_FIELDS: &str =
    "items(contentDetails(videoId,videoPublishedAt),snippet(publishedAt,title)),nextPageToken";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FeedItem {
    pub(crate) video_id: String,
    pub(crate) title: String,
    pub(crate) published_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FeedPage {
    pub(crate) items: Vec<FeedItem>,
    pub(crate) next_page_token: Option<String>,
    /// Items on the page that lacked a video id, title or publish time.
    pub(crate) skipped_items: usize,
}

/// The four upstream endpoints the job talks to.
pub(crate) trait VideoApi {
    /// Channel ids registered under a legacy username. Empty when none match.
    fn channels_for_username(&self, username: &str) -> ApiResult<Vec<String>>;

    /// Channel ids from a channel-scoped text search, best match first.
    fn search_channels(&self, query: &str) -> ApiResult<Vec<String>>;

    /// One page of a playlist. A body without `items` is an error.
    fn playlist_items(&self, playlist_id: &str, page_token: Option<&str>) -> ApiResult<FeedPage>;

    /// Number of top-level comment threads returned for a video.
    fn comment_thread_count(&self, video_id: &str) -> ApiResult<usize>;
}

pub(crate) struct YouTubeClient {
    http: HttpClient,
    api_base: String,
    api_key: String,
    page_size: String,
}

impl YouTubeClient {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            http: HttpClient::new(config.connect_timeout, config.read_timeout),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            page_size: config.page_size.to_string(),
        }
    }

    fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> ApiResult<Value> {
        let url = format!("{}/{endpoint}", self.api_base);
        let mut params = query.to_vec();
        params.push(("key", self.api_key.as_str()));
        self.http.get_json(&url, &params)
    }
}

impl VideoApi for YouTubeClient {
    fn channels_for_username(&self, username: &str) -> ApiResult<Vec<String>> {
        let body = self.get("channels", &[("part", "id"), ("forUsername", username)])?;
        Ok(parse_channel_lookup(&body))
    }

    fn search_channels(&self, query: &str) -> ApiResult<Vec<String>> {
        let body = self.get(
            "search",
            &[
                ("part", "snippet"),
                ("type", "channel"),
                ("maxResults", "5"),
                ("q", query),
            ],
        )?;
        Ok(parse_channel_search(&body))
    }

    fn playlist_items(&self, playlist_id: &str, page_token: Option<&str>) -> ApiResult<FeedPage> {
        let mut query = vec![
            ("part", "snippet,contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", self.page_size.as_str()),
            ("fields", PLAYLIST_ITEM_FIELDS),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }
        let body = self.get("playlistItems", &query)?;
        parse_playlist_page(&body)
    }

    fn comment_thread_count(&self, video_id: &str) -> ApiResult<usize> {
        let body = self.get(
            "commentThreads",
            &[("part", "id"), ("maxResults", "1"), ("videoId", video_id)],
        )?;
        parse_comment_thread_count(&body)
    }
}

fn items_of<'a>(body: &'a Value) -> Option<&'a Vec<Value>> {
    body.get("items").and_then(Value::as_array)
}

fn missing_items(body: &Value) -> ApiError {
    ApiError::MissingField {
        field: "items",
        excerpt: excerpt(&body.to_string()),
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `channels?forUsername=` omits `items` entirely when nothing matches.
pub(crate) fn parse_channel_lookup(body: &Value) -> Vec<String> {
    items_of(body)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| non_empty(item.get("id").and_then(Value::as_str)))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn parse_channel_search(body: &Value) -> Vec<String> {
    items_of(body)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| non_empty(item.pointer("/id/channelId").and_then(Value::as_str)))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn parse_playlist_page(body: &Value) -> ApiResult<FeedPage> {
    let items = items_of(body).ok_or_else(|| missing_items(body))?;

    let mut page = FeedPage {
        next_page_token: non_empty(body.get("nextPageToken").and_then(Value::as_str)),
        ..FeedPage::default()
    };
    for item in items {
        match parse_feed_item(item) {
            Some(entry) => page.items.push(entry),
            None => page.skipped_items += 1,
        }
    }
    Ok(page)
}

fn parse_feed_item(item: &Value) -> Option<FeedItem> {
    let video_id = non_empty(item.pointer("/contentDetails/videoId").and_then(Value::as_str))?;
    let published_at =
        non_empty(item.pointer("/snippet/publishedAt").and_then(Value::as_str))?;
    let title = item
        .pointer("/snippet/title")
        .and_then(Value::as_str)?
        .to_string();
    Some(FeedItem {
        video_id,
        title,
        published_at,
    })
}

pub(crate) fn parse_comment_thread_count(body: &Value) -> ApiResult<usize> {
    items_of(body)
        .map(Vec::len)
        .ok_or_else(|| missing_items(body))
}
