//! Record types held by the per-server tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One archived download announcement.
///
/// The natural key is `id`, stored uppercased and unique within a server.
/// `name` and `links` are overwritten/merged on re-ingestion of the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Download identifier, case-normalized to uppercase
    pub id: String,
    /// Display name, usually the announcing message's embed title
    pub name: String,
    /// Link-source label (channel name) to permalink URL
    pub links: BTreeMap<String, String>,
}

/// One archived video announcement.
///
/// The natural key is `name`, compared case-sensitively as given.
/// `tag` is last-write-wins; `links` merges by channel label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Video title, the natural key within a server
    pub name: String,
    /// Free-text label, typically a role-mention token
    pub tag: String,
    /// Channel label to canonical video URL
    pub links: BTreeMap<String, String>,
}
