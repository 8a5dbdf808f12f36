//! Query engine - exact lookups, ranked fuzzy search, suggestion lists.
//!
//! All operations are read-only and per-tenant: they take a snapshot of the
//! memory-resident table under the read lock and never touch disk, so the
//! interactive autocomplete paths stay cheap even while an upsert is
//! persisting elsewhere.
//!
//! Result-count policy (e.g. "more than 3 download hits means ask the user
//! to refine") belongs to the command layer: the engine returns up to
//! `limit` qualifying records and never truncates below what the caller
//! needs to detect the too-many condition.

use crate::score::score;
use crate::store::{DownloadRecord, TenantStore, VideoRecord};
use tracing::debug;

/// Score assigned when the query equals a record's natural key or name
/// exactly. Supersedes the scorer's 0-100 range so the ranking can tell
/// "exact key match" apart from "perfect fuzzy match".
pub const EXACT_MATCH_SCORE: u16 = 200;

/// Exact download lookup by id (uppercased before comparison). Returns the
/// stored name and links, never a fuzzy approximation.
pub async fn exact_download(store: &TenantStore, id: &str) -> Option<DownloadRecord> {
    store.get_download(id).await
}

/// Exact video lookup by name, compared case-sensitively as given.
pub async fn exact_video(store: &TenantStore, name: &str) -> Option<VideoRecord> {
    store.get_video(name).await
}

/// Ranked fuzzy search over download records.
///
/// An empty query returns the last `limit` records in table order as a
/// recency heuristic. Otherwise every record is scored as the better of
/// name-vs-query and id-vs-query; a query equal (trimmed, case-insensitive)
/// to the id or the name forces [`EXACT_MATCH_SCORE`], and any exact match
/// short-circuits to a single-element result regardless of how many fuzzy
/// matches also qualify.
pub async fn fuzzy_downloads(
    store: &TenantStore,
    query: &str,
    limit: usize,
    min_score: u16,
) -> Vec<DownloadRecord> {
    let records = store.downloads().await;
    let results = rank(records, query, limit, min_score);
    debug!(
        tenant_id = store.tenant_id(),
        query,
        hits = results.len(),
        "Fuzzy download search"
    );
    results
}

/// Ranked fuzzy search over video records.
///
/// Same algorithm as [`fuzzy_downloads`], scored on the name alone. The
/// exact-match short-circuit applies here too: a query equal to a video
/// title returns just that record.
pub async fn fuzzy_videos(
    store: &TenantStore,
    query: &str,
    limit: usize,
    min_score: u16,
) -> Vec<VideoRecord> {
    let records = store.videos().await;
    let results = rank(records, query, limit, min_score);
    debug!(
        tenant_id = store.tenant_id(),
        query,
        hits = results.len(),
        "Fuzzy video search"
    );
    results
}

/// Download ids containing `prefix` case-insensitively, at most `limit`.
/// No scoring - this feeds the interactive suggestion list.
pub async fn matching_ids(store: &TenantStore, prefix: &str, limit: usize) -> Vec<String> {
    contains_filter(store.download_ids().await, prefix, limit)
}

/// Download display names containing `prefix` case-insensitively.
pub async fn matching_names(store: &TenantStore, prefix: &str, limit: usize) -> Vec<String> {
    let names = store
        .downloads()
        .await
        .into_iter()
        .map(|r| r.name)
        .collect();
    contains_filter(names, prefix, limit)
}

/// Video titles containing `prefix` case-insensitively.
pub async fn matching_video_names(store: &TenantStore, prefix: &str, limit: usize) -> Vec<String> {
    contains_filter(store.video_names().await, prefix, limit)
}

fn contains_filter(candidates: Vec<String>, prefix: &str, limit: usize) -> Vec<String> {
    let needle = prefix.to_lowercase();
    candidates
        .into_iter()
        .filter(|c| c.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}

/// The fields a record exposes to the ranking core: its display name and,
/// for downloads, the id as a second scoring key.
trait SearchKeys {
    fn display_name(&self) -> &str;
    fn alt_key(&self) -> Option<&str>;
}

impl SearchKeys for DownloadRecord {
    fn display_name(&self) -> &str {
        &self.name
    }
    fn alt_key(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl SearchKeys for VideoRecord {
    fn display_name(&self) -> &str {
        &self.name
    }
    fn alt_key(&self) -> Option<&str> {
        None
    }
}

/// Shared ranking core over either record kind.
fn rank<R: SearchKeys>(records: Vec<R>, query: &str, limit: usize, min_score: u16) -> Vec<R> {
    let query = query.trim();
    if query.is_empty() {
        // Tail of the table as a "most recent" view.
        let skip = records.len().saturating_sub(limit);
        return records.into_iter().skip(skip).collect();
    }

    let query_lower = query.to_lowercase();
    let mut scored: Vec<(u16, R)> = records
        .into_iter()
        .filter_map(|record| {
            let exact = record.display_name().to_lowercase() == query_lower
                || record
                    .alt_key()
                    .is_some_and(|k| k.to_lowercase() == query_lower);
            let record_score = if exact {
                EXACT_MATCH_SCORE
            } else {
                let by_name = u16::from(score(query, record.display_name()));
                let by_key = record.alt_key().map_or(0, |k| u16::from(score(query, k)));
                by_name.max(by_key)
            };
            (record_score >= min_score).then_some((record_score, record))
        })
        .collect();

    // Exact key/name identity beats any ambiguity from fuzzy overlap.
    if let Some(position) = scored.iter().position(|(s, _)| *s == EXACT_MATCH_SCORE) {
        return vec![scored.swap_remove(position).1];
    }

    // Stable sort: ties keep their table order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, r)| r).collect()
}
