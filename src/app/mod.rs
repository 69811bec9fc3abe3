pub(crate) mod api;
mod checkpoint;
mod comments;
mod harvest;
mod ledger;
mod resolver;
mod roster;


use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::cli::Cli;
use crate::config::{Config, resolve_config};

use self::api::{VideoApi, YouTubeClient};
use self::checkpoint::CheckpointStore;
use self::comments::CommentPresence;
use self::harvest::ChannelHarvest;
use self::ledger::Ledger;
use self::resolver::{Resolution, resolve_channel};
use self::roster::read_channel_list;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct HarvestSummary {
    pub(crate) channels: usize,
    pub(crate) channels_resolved: usize,
    pub(crate) channels_skipped: usize,
    pub(crate) pages_fetched: usize,
    pub(crate) items_skipped: usize,
    pub(crate) rows_written: usize,
    pub(crate) comments_unknown: usize,
}

pub fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.into_overrides())?;
    let client = YouTubeClient::new(&config);

    let summary = run_job(&config, &client, Utc::now)?;
    info!(
        channels = summary.channels,
        resolved = summary.channels_resolved,
        skipped = summary.channels_skipped,
        pages = summary.pages_fetched,
        items_skipped = summary.items_skipped,
        rows = summary.rows_written,
        comments_unknown = summary.comments_unknown,
        "CSV file '{}' has been created successfully",
        config.output_path.display()
    );
    Ok(())
}

/// One pass over every configured channel. Upstream failures are absorbed per
/// channel, per page or per field; only local file errors end the run early,
/// in which case the checkpoint is left untouched.
pub(crate) fn run_job<A, C>(config: &Config, api: &A, clock: C) -> Result<HarvestSummary>
where
    A: VideoApi + ?Sized,
    C: Fn() -> DateTime<Utc>,
{
    let checkpoint = CheckpointStore::new(&config.checkpoint_path);
    let cutoff = checkpoint.load(clock());
    info!("Filtering videos published after: {cutoff}");

    let channels = read_channel_list(&config.channels_path)?;
    let mut ledger = Ledger::create(&config.output_path)?;
    let mut summary = HarvestSummary {
        channels: channels.len(),
        ..HarvestSummary::default()
    };

    for (index, channel) in channels.iter().enumerate() {
        info!(
            "[{}/{}] Processing channel: {channel}",
            index + 1,
            channels.len()
        );
        let resolved = match resolve_channel(api, channel) {
            Resolution::Resolved(resolved) => resolved,
            Resolution::NotFound => {
                summary.channels_skipped += 1;
                continue;
            }
        };
        summary.channels_resolved += 1;
        info!(
            channel = %channel,
            channel_id = %resolved.channel_id,
            via = ?resolved.via,
            "resolved channel"
        );

        let mut harvest =
            ChannelHarvest::new(api, channel, &resolved.uploads_playlist_id, cutoff);
        let mut rows = 0;
        for record in harvest.by_ref() {
            if record.has_comments == CommentPresence::Unknown {
                summary.comments_unknown += 1;
            }
            ledger.append(&record)?;
            rows += 1;
        }
        summary.pages_fetched += harvest.pages_fetched();
        summary.items_skipped += harvest.skipped_items();
        summary.rows_written += rows;
        info!(channel = %channel, new_videos = rows, "channel done");
    }

    ledger.finish()?;
    checkpoint.store(clock())?;
    Ok(summary)
}
