use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::comments::CommentPresence;
use crate::paths::ensure_parent_dir;

pub(crate) const LEDGER_HEADER: [&str; 5] = [
    "Username",
    "Title",
    "Video_URL",
    "Publish_Date",
    "Has_Comments",
];

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VideoRecord {
    pub(crate) username: String,
    pub(crate) title: String,
    pub(crate) video_url: String,
    pub(crate) publish_date: String,
    pub(crate) has_comments: CommentPresence,
}

pub(crate) fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_PREFIX}{video_id}")
}

/// CSV file holding the rows of the current run only. Creating it truncates
/// whatever an earlier run left behind.
pub(crate) struct Ledger {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: usize,
}

impl Ledger {
    pub(crate) fn create(path: &Path) -> Result<Self> {
        ensure_parent_dir(path)?;
        let file = File::create(path)
            .with_context(|| format!("failed to create ledger {}", path.display()))?;
        let mut ledger = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            rows: 0,
        };
        ledger.write_line(&LEDGER_HEADER)?;
        Ok(ledger)
    }

    pub(crate) fn append(&mut self, record: &VideoRecord) -> Result<()> {
        self.write_line(&[
            record.username.as_str(),
            record.title.as_str(),
            record.video_url.as_str(),
            record.publish_date.as_str(),
            record.has_comments.as_str(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    /// Flushes buffered rows and returns how many were written.
    pub(crate) fn finish(mut self) -> Result<usize> {
        self.writer
            .flush()
            .with_context(|| format!("failed to flush ledger {}", self.path.display()))?;
        Ok(self.rows)
    }

    fn write_line(&mut self, fields: &[&str]) -> Result<()> {
        let line = fields
            .iter()
            .map(|field| csv_field(field))
            .collect::<Vec<_>>()
            .join(",");
        write!(self.writer, "{line}\r\n")
            .with_context(|| format!("failed to write ledger {}", self.path.display()))
    }
}

/// Quotes a field only when it contains a delimiter, quote or line break.
pub(crate) fn csv_field(raw: &str) -> Cow<'_, str> {
    if raw.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", raw.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(raw)
    }
}
