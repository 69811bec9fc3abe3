use std::path::PathBuf;

use clap::Parser;

use crate::config::ConfigOverrides;

#[derive(Debug, Parser)]
#[command(
    name = "mp-video-ledger",
    version,
    about = "Collect videos published since the last run for a list of YouTube channels"
)]
pub struct Cli {
    /// Channel list, one username or handle per line
    #[arg(long, value_name = "FILE")]
    pub channels: Option<PathBuf>,

    /// File holding the timestamp of the last run
    #[arg(long, value_name = "FILE")]
    pub checkpoint: Option<PathBuf>,

    /// CSV ledger to (re)write
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Dotenv file consulted for YOUTUBE_API_KEY and path settings
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// Base URL of the YouTube Data API
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Playlist items requested per page (1-50)
    #[arg(long)]
    pub page_size: Option<u32>,
}

impl Cli {
    pub fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            channels_path: self.channels,
            checkpoint_path: self.checkpoint,
            output_path: self.output,
            env_path: self.env_file,
            api_base: self.api_base,
            page_size: self.page_size,
        }
    }
}
