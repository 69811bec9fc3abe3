use std::path::Path;

use anyhow::{Context, Result};

pub const DEFAULT_CHANNELS_PATH: &str = "YouTube/politicians.txt";
pub const DEFAULT_CHECKPOINT_PATH: &str = "YouTube/last_run_time.txt";
pub const DEFAULT_OUTPUT_PATH: &str = "YouTube/sample_video_info.csv";
pub const DEFAULT_ENV_PATH: &str = ".env";

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display())),
        _ => Ok(()),
    }
}
