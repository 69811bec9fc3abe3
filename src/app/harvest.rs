use std::vec;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::api::{FeedItem, VideoApi};
use super::comments::check_comments;
use super::ledger::{VideoRecord, watch_url};

/// Lazily pages through a playlist, one request per page, following
/// `nextPageToken` until the provider stops returning one. A failed or
/// malformed page ends the feed.
pub(crate) struct UploadsFeed<'a, A: VideoApi + ?Sized> {
    api: &'a A,
    playlist_id: &'a str,
    next_token: Option<String>,
    buffered: vec::IntoIter<FeedItem>,
    exhausted: bool,
    pages_fetched: usize,
    skipped_items: usize,
}

impl<'a, A: VideoApi + ?Sized> UploadsFeed<'a, A> {
    pub(crate) fn new(api: &'a A, playlist_id: &'a str) -> Self {
        Self {
            api,
            playlist_id,
            next_token: None,
            buffered: Vec::new().into_iter(),
            exhausted: false,
            pages_fetched: 0,
            skipped_items: 0,
        }
    }

    pub(crate) fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub(crate) fn skipped_items(&self) -> usize {
        self.skipped_items
    }

    fn fetch_next_page(&mut self) {
        let token = self.next_token.take();
        self.pages_fetched += 1;
        match self.api.playlist_items(self.playlist_id, token.as_deref()) {
            Ok(page) => {
                debug!(
                    playlist_id = self.playlist_id,
                    page = self.pages_fetched,
                    items = page.items.len(),
                    "fetched playlist page"
                );
                if page.skipped_items > 0 {
                    warn!(
                        playlist_id = self.playlist_id,
                        skipped = page.skipped_items,
                        "ignored playlist items without id, title or publish time"
                    );
                }
                self.skipped_items += page.skipped_items;
                self.buffered = page.items.into_iter();
                self.next_token = page.next_page_token;
                self.exhausted = self.next_token.is_none();
            }
            Err(err) => {
                warn!(
                    playlist_id = self.playlist_id,
                    page = self.pages_fetched,
                    error = %err,
                    "failed to fetch playlist page; stopping this channel"
                );
                self.exhausted = true;
            }
        }
    }
}

impl<A: VideoApi + ?Sized> Iterator for UploadsFeed<'_, A> {
    type Item = FeedItem;

    fn next(&mut self) -> Option<FeedItem> {
        loop {
            if let Some(item) = self.buffered.next() {
                return Some(item);
            }
            if self.exhausted {
                return None;
            }
            self.fetch_next_page();
        }
    }
}

/// Video records for one channel, newest-first as the feed returns them.
/// Every item of every page is checked against the cutoff; ordering is not
/// relied upon.
pub(crate) struct ChannelHarvest<'a, A: VideoApi + ?Sized> {
    api: &'a A,
    username: &'a str,
    cutoff: DateTime<Utc>,
    feed: UploadsFeed<'a, A>,
}

impl<'a, A: VideoApi + ?Sized> ChannelHarvest<'a, A> {
    pub(crate) fn new(
        api: &'a A,
        username: &'a str,
        uploads_playlist_id: &'a str,
        cutoff: DateTime<Utc>,
    ) -> Self {
        Self {
            api,
            username,
            cutoff,
            feed: UploadsFeed::new(api, uploads_playlist_id),
        }
    }

    pub(crate) fn pages_fetched(&self) -> usize {
        self.feed.pages_fetched()
    }

    pub(crate) fn skipped_items(&self) -> usize {
        self.feed.skipped_items()
    }
}

impl<A: VideoApi + ?Sized> Iterator for ChannelHarvest<'_, A> {
    type Item = VideoRecord;

    fn next(&mut self) -> Option<VideoRecord> {
        for item in self.feed.by_ref() {
            let Some(published) = parse_publish_timestamp(&item.published_at) else {
                warn!(
                    channel = self.username,
                    video_id = %item.video_id,
                    published_at = %item.published_at,
                    "unparseable publish time; skipping video"
                );
                continue;
            };
            if !is_after_cutoff(published, self.cutoff) {
                continue;
            }
            let has_comments = check_comments(self.api, &item.video_id);
            return Some(VideoRecord {
                username: self.username.to_string(),
                title: item.title,
                video_url: watch_url(&item.video_id),
                publish_date: item.published_at,
                has_comments,
            });
        }
        None
    }
}

/// Provider timestamps carry a `Z` suffix; explicit offsets are accepted too.
pub(crate) fn parse_publish_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

/// Strictly after: a video published at the cutoff instant was already seen.
pub(crate) fn is_after_cutoff(published: DateTime<Utc>, cutoff: DateTime<Utc>) -> bool {
    published > cutoff
}
