//! Per-tenant settings consumed by ingestion and the command layer.
//!
//! Settings live next to a tenant's tables as `settings.toml` and are owned
//! by the admin/config surface of the bot; this module only reads them.
//! Every field has a default, so a missing file just means stock behavior
//! and a corrupt file is logged and replaced by the defaults rather than
//! taking the server offline.

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// File name of the per-tenant settings inside a tenant directory.
const SETTINGS_FILE: &str = "settings.toml";

/// Tunable per-server behavior for extraction and search.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TenantSettings {
    /// Pattern with one capture group for the download identifier
    pub search_regex: String,
    /// Pattern that must also match before a download is ingested
    pub link_regex: String,
    /// Minimum fuzzy score for download search results
    pub download_min_score: u16,
    /// Download hits above this count mean "ask the user to refine"
    pub download_result_cap: usize,
    /// Minimum fuzzy score for video search results
    pub video_min_score: u16,
    /// Video hits above this count mean "ask the user to refine"
    pub video_result_cap: usize,
    /// Maximum entries in interactive suggestion lists
    pub suggestion_limit: usize,
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            search_regex: r"DN : (.+)".to_string(),
            link_regex: r"Link : (https?://\S+)".to_string(),
            download_min_score: 75,
            download_result_cap: 3,
            video_min_score: 90,
            video_result_cap: 5,
            suggestion_limit: 100,
        }
    }
}

/// Loads the settings for one tenant from its directory.
///
/// Missing file yields the defaults silently; an unparseable file yields
/// the defaults with a warning so a typo in one server's settings never
/// stops it from being served.
#[must_use]
pub fn load_tenant_settings(tenant_dir: &Path, tenant_id: u64) -> TenantSettings {
    let path = tenant_dir.join(SETTINGS_FILE);
    let Ok(contents) = std::fs::read_to_string(&path) else {
        debug!(tenant_id, "No settings file at {}, using defaults", path.display());
        return TenantSettings::default();
    };

    match toml::from_str(&contents) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(
                tenant_id,
                "Failed to parse {}: {}. Using default settings.",
                path.display(),
                e
            );
            TenantSettings::default()
        }
    }
}
