use std::fmt;

use tracing::warn;

use super::api::VideoApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommentPresence {
    Yes,
    No,
    Unknown,
}

impl CommentPresence {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CommentPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Never fails: any upstream problem becomes `Unknown`.
pub(crate) fn check_comments<A>(api: &A, video_id: &str) -> CommentPresence
where
    A: VideoApi + ?Sized,
{
    match api.comment_thread_count(video_id) {
        Ok(0) => CommentPresence::No,
        Ok(_) => CommentPresence::Yes,
        Err(err) => {
            warn!(video_id, error = %err, "comment check failed");
            CommentPresence::Unknown
        }
    }
}
