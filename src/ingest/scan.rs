//! Full-channel history scans.
//!
//! A scan drains a channel's message history and runs one extractor per
//! message. Histories can be tens of thousands of messages long, so the
//! loop yields back to the runtime every [`YIELD_EVERY`] messages to avoid
//! starving concurrent event handling. There is no cancellation token; a
//! scan runs to completion or fails, and any upserts already committed stay
//! committed.

use crate::errors::Result;
use crate::ingest::message::{MessageFetcher, MessageHistory};
use crate::ingest::{IngestPatterns, process_download_message, process_video_message};
use crate::store::TenantStore;
use tracing::{info, instrument};

/// Messages between cooperative yields during a scan.
const YIELD_EVERY: u64 = 100;

/// Which extractor a scan runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    /// Download-announcement extraction
    Downloads,
    /// Video-announcement extraction
    Videos,
}

/// What a finished scan saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Messages read from the history
    pub processed: u64,
    /// Messages that produced an upsert
    pub ingested: u64,
}

/// Drains `history`, running the `kind` extractor on every message.
///
/// Errors from the history iterator or from persistence propagate to the
/// caller; extraction misses are not errors and just count as processed.
#[instrument(skip(store, patterns, fetcher, history), fields(tenant_id = store.tenant_id()))]
pub async fn scan_channel<F, H>(
    store: &TenantStore,
    patterns: &IngestPatterns,
    fetcher: &F,
    history: &mut H,
    kind: ScanKind,
) -> Result<ScanSummary>
where
    F: MessageFetcher,
    H: MessageHistory,
{
    let mut summary = ScanSummary::default();

    while let Some(message) = history.next_message().await? {
        let ingested = match kind {
            ScanKind::Downloads => {
                process_download_message(store, patterns, fetcher, &message).await?
            }
            ScanKind::Videos => process_video_message(store, fetcher, &message).await?,
        };

        summary.processed += 1;
        if ingested {
            summary.ingested += 1;
        }

        if summary.processed % YIELD_EVERY == 0 {
            tokio::task::yield_now().await;
        }
    }

    info!(
        tenant_id = store.tenant_id(),
        processed = summary.processed,
        ingested = summary.ingested,
        "Channel scan finished"
    );
    Ok(summary)
}
