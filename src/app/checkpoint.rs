use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use tracing::{info, warn};

use crate::paths::ensure_parent_dir;

/// Plain-text file holding the time of the last completed run.
pub(crate) struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Returns the stored run time, or `now` when the file is absent,
    /// unreadable or unparseable. Falling back to `now` means the run
    /// collects nothing rather than the whole back catalogue.
    pub(crate) fn load(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(
                    path = %self.path.display(),
                    "no checkpoint yet; starting from the current time"
                );
                return now;
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to read checkpoint; starting from the current time"
                );
                return now;
            }
        };

        match parse_checkpoint(&raw) {
            Some(at) => at,
            None => {
                warn!(
                    path = %self.path.display(),
                    contents = raw.trim(),
                    "checkpoint is not a valid timestamp; starting from the current time"
                );
                now
            }
        }
    }

    pub(crate) fn store(&self, at: DateTime<Utc>) -> Result<()> {
        ensure_parent_dir(&self.path)?;
        fs::write(&self.path, format_checkpoint(at))
            .with_context(|| format!("failed to write checkpoint {}", self.path.display()))
    }
}

/// Accepts RFC 3339 with any offset. A timestamp without an offset is read as
/// UTC, and a bare date as midnight UTC.
pub(crate) fn parse_checkpoint(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

pub(crate) fn format_checkpoint(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}
