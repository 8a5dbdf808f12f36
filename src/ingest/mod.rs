//! Chat-message ingestion - turns one message into at most one upsert.
//!
//! Download announcements are matched by a per-server pattern pair (an
//! identifier marker and a link marker); video announcements by a recognized
//! video-hosting URL in embed metadata or message text. Display names come
//! from the message's embed title, which the platform resolves
//! asynchronously - the pipeline re-reads the message a bounded number of
//! times before settling for a placeholder.

pub mod message;
pub mod scan;

pub use message::{EmbedField, EmbedSnapshot, MessageFetcher, MessageHistory, MessageSnapshot};
pub use scan::{ScanKind, ScanSummary, scan_channel};

use crate::errors::{Error, Result};
use crate::settings::TenantSettings;
use crate::store::TenantStore;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// How many times the pipeline re-reads a message waiting for its embed.
const MAX_TITLE_ATTEMPTS: u32 = 10;
/// Delay between embed re-reads.
const TITLE_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Display name used when the embed never resolves a title.
const FALLBACK_TITLE: &str = "Unknown Title";

// Both literals always compile; the panic paths are unreachable.
#[allow(clippy::unwrap_used)]
static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?(?:youtube\.com/watch\?v=[\w-]+|youtu\.be/[\w-]+)").unwrap()
});

#[allow(clippy::unwrap_used)]
static ROLE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<@&\d+>").unwrap());

/// Compiled extraction patterns for one server.
#[derive(Debug)]
pub struct IngestPatterns {
    search: Regex,
    link: Regex,
}

impl IngestPatterns {
    /// Compiles the per-tenant patterns.
    ///
    /// # Errors
    /// [`Error::Config`] when either pattern is not a valid regex.
    pub fn from_settings(settings: &TenantSettings) -> Result<Self> {
        let search = Regex::new(&settings.search_regex).map_err(|e| Error::Config {
            message: format!("Invalid search_regex '{}': {e}", settings.search_regex),
        })?;
        let link = Regex::new(&settings.link_regex).map_err(|e| Error::Config {
            message: format!("Invalid link_regex '{}': {e}", settings.link_regex),
        })?;
        Ok(Self { search, link })
    }
}

impl Default for IngestPatterns {
    // The stock patterns are literals; they always parse.
    #[allow(clippy::unwrap_used)]
    fn default() -> Self {
        Self::from_settings(&TenantSettings::default()).unwrap()
    }
}

/// Why title resolution stopped.
#[derive(Debug, PartialEq, Eq)]
enum TitleOutcome {
    /// The embed produced a title.
    Resolved(String),
    /// Retries exhausted without a title.
    TimedOut,
    /// The message was deleted while waiting.
    Gone,
}

/// Waits for the message's embed title, re-fetching up to
/// [`MAX_TITLE_ATTEMPTS`] times with [`TITLE_RETRY_DELAY`] between reads.
async fn resolve_embed_title<F: MessageFetcher>(
    fetcher: &F,
    message: &MessageSnapshot,
) -> Result<TitleOutcome> {
    let mut current = message.clone();
    for attempt in 0..MAX_TITLE_ATTEMPTS {
        if let Some(title) = current.embed_title() {
            if attempt > 0 {
                debug!(
                    message_id = message.message_id,
                    attempt, "Embed title resolved after retry"
                );
            }
            return Ok(TitleOutcome::Resolved(title.to_string()));
        }

        tokio::time::sleep(TITLE_RETRY_DELAY).await;
        match fetcher.fetch(message.channel_id, message.message_id).await? {
            Some(refreshed) => current = refreshed,
            None => return Ok(TitleOutcome::Gone),
        }
    }
    Ok(TitleOutcome::TimedOut)
}

/// Runs download extraction over one message, upserting on a match.
///
/// A match requires both the identifier pattern and the link pattern to hit
/// the combined text. The stored link value is the message permalink keyed by
/// channel name; the display name is the embed title (with bounded retry,
/// falling back to a placeholder). Returns whether a record was upserted.
#[instrument(skip(store, patterns, fetcher, message), fields(tenant_id = store.tenant_id(), message_id = message.message_id))]
pub async fn process_download_message<F: MessageFetcher>(
    store: &TenantStore,
    patterns: &IngestPatterns,
    fetcher: &F,
    message: &MessageSnapshot,
) -> Result<bool> {
    let text = message.combined_text();
    let Some(id) = patterns
        .search
        .captures(&text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|id| !id.is_empty())
    else {
        return Ok(false);
    };

    if !patterns.link.is_match(&text) {
        debug!(id, "Identifier without link marker, skipping");
        return Ok(false);
    }

    let name = match resolve_embed_title(fetcher, message).await? {
        TitleOutcome::Resolved(title) => title,
        TitleOutcome::TimedOut => {
            debug!(id, "Embed title never resolved, using placeholder");
            FALLBACK_TITLE.to_string()
        }
        TitleOutcome::Gone => {
            info!(id, "Message deleted during title resolution, dropping");
            return Ok(false);
        }
    };

    store
        .upsert_download(id, &name, &message.channel_name, &message.jump_url)
        .await?;
    Ok(true)
}

/// Runs video extraction over one message, upserting on a match.
///
/// A match is a recognized video-hosting URL in embed metadata or the
/// combined text; the canonical video URL is the stored link value. An
/// optional role-mention token becomes the record's tag. Title resolution
/// follows the same retry strategy as downloads. Returns whether a record
/// was upserted.
#[instrument(skip(store, fetcher, message), fields(tenant_id = store.tenant_id(), message_id = message.message_id))]
pub async fn process_video_message<F: MessageFetcher>(
    store: &TenantStore,
    fetcher: &F,
    message: &MessageSnapshot,
) -> Result<bool> {
    let text = message.combined_text();
    let Some(video_url) = find_video_url(message, &text) else {
        return Ok(false);
    };

    let tag = ROLE_TAG
        .find(&text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let name = match resolve_embed_title(fetcher, message).await? {
        TitleOutcome::Resolved(title) => title,
        TitleOutcome::TimedOut => {
            debug!(%video_url, "Embed title never resolved, using placeholder");
            FALLBACK_TITLE.to_string()
        }
        TitleOutcome::Gone => {
            info!(%video_url, "Message deleted during title resolution, dropping");
            return Ok(false);
        }
    };

    store
        .upsert_video(&name, &message.channel_name, &video_url, &tag)
        .await?;
    Ok(true)
}

/// Canonical video URL from embed metadata first, message text second.
fn find_video_url(message: &MessageSnapshot, text: &str) -> Option<String> {
    for embed in &message.embeds {
        if let Some(url) = &embed.url {
            let is_video_kind = embed.kind.as_deref() == Some("video");
            if is_video_kind {
                return Some(url.clone());
            }
            if let Some(found) = VIDEO_URL.find(url) {
                return Some(found.as_str().to_string());
            }
        }
    }
    VIDEO_URL.find(text).map(|m| m.as_str().to_string())
}
