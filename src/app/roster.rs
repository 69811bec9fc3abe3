use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Channel identifiers in file order. Lines are trimmed; blank lines are dropped.
pub(crate) fn read_channel_list(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read channel list {}", path.display()))?;
    Ok(parse_channel_list(&raw))
}

pub(crate) fn parse_channel_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
