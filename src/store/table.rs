//! In-memory record tables with CSV persistence.
//!
//! Each table is a plain `Vec` preserving row order: new records append,
//! updates stay in place. The durable format is a CSV file with a header row
//! where the `Links` column holds a JSON object mapping link-source labels
//! to URLs - the same layout the tables are loaded back from.

use crate::errors::{Error, Result};
use crate::store::records::{DownloadRecord, VideoRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Serialized row shape for the downloads table.
#[derive(Debug, Serialize, Deserialize)]
struct DownloadRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Links")]
    links: String,
}

/// Serialized row shape for the videos table.
#[derive(Debug, Serialize, Deserialize)]
struct VideoRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Tag")]
    tag: String,
    #[serde(rename = "Links")]
    links: String,
}

fn parse_links(raw: &str, context: &str) -> Result<BTreeMap<String, String>> {
    serde_json::from_str(raw).map_err(|e| Error::Storage {
        message: format!("Invalid links column for {context}: {e}"),
    })
}

fn render_links(links: &BTreeMap<String, String>) -> Result<String> {
    serde_json::to_string(links).map_err(|e| Error::Storage {
        message: format!("Failed to serialize links column: {e}"),
    })
}

/// Writes serialized CSV bytes to `path` through a temp file + rename, so a
/// crash mid-write never leaves a truncated table behind.
fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("csv.tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// The downloads table of one server, ordered by first ingestion.
#[derive(Debug, Default)]
pub struct DownloadTable {
    records: Vec<DownloadRecord>,
}

impl DownloadTable {
    /// Reads the table from `path`. A missing file yields an empty table;
    /// parse failures propagate so the caller can decide the fallback.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<DownloadRow>() {
            let row = row.map_err(|e| Error::Storage {
                message: format!("Invalid download row in {}: {e}", path.display()),
            })?;
            let links = parse_links(&row.links, &row.id)?;
            records.push(DownloadRecord {
                id: row.id,
                name: row.name,
                links,
            });
        }
        debug!("Loaded {} download records from {}", records.len(), path.display());
        Ok(Self { records })
    }

    /// Writes the full table to `path`, header included.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in &self.records {
            writer.serialize(DownloadRow {
                id: record.id.clone(),
                name: record.name.clone(),
                links: render_links(&record.links)?,
            })?;
        }
        let bytes = writer.into_inner().map_err(|e| Error::Storage {
            message: format!("Failed to flush download table: {e}"),
        })?;
        replace_file(path, &bytes)
    }

    /// Inserts or updates the record for `id` (uppercased before storage).
    /// Scalar fields are overwritten; the one new link entry merges by key.
    /// Returns the normalized key the record is stored under.
    pub fn upsert(&mut self, id: &str, name: &str, channel: &str, link: &str) -> String {
        let id = id.trim().to_uppercase();
        if let Some(record) = self.records.iter_mut().find(|r| r.id == id) {
            record.name = name.to_string();
            record.links.insert(channel.to_string(), link.to_string());
        } else {
            let mut links = BTreeMap::new();
            links.insert(channel.to_string(), link.to_string());
            self.records.push(DownloadRecord {
                id: id.clone(),
                name: name.to_string(),
                links,
            });
        }
        id
    }

    /// Exact lookup by id, uppercased before comparison.
    pub fn get(&self, id: &str) -> Option<&DownloadRecord> {
        let id = id.trim().to_uppercase();
        self.records.iter().find(|r| r.id == id)
    }

    /// All records in table order.
    pub fn all(&self) -> &[DownloadRecord] {
        &self.records
    }

    /// All ids in table order.
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }
}

/// The videos table of one server, ordered by first ingestion.
#[derive(Debug, Default)]
pub struct VideoTable {
    records: Vec<VideoRecord>,
}

impl VideoTable {
    /// Reads the table from `path`; missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<VideoRow>() {
            let row = row.map_err(|e| Error::Storage {
                message: format!("Invalid video row in {}: {e}", path.display()),
            })?;
            let links = parse_links(&row.links, &row.name)?;
            records.push(VideoRecord {
                name: row.name,
                tag: row.tag,
                links,
            });
        }
        debug!("Loaded {} video records from {}", records.len(), path.display());
        Ok(Self { records })
    }

    /// Writes the full table to `path`, header included.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in &self.records {
            writer.serialize(VideoRow {
                name: record.name.clone(),
                tag: record.tag.clone(),
                links: render_links(&record.links)?,
            })?;
        }
        let bytes = writer.into_inner().map_err(|e| Error::Storage {
            message: format!("Failed to flush video table: {e}"),
        })?;
        replace_file(path, &bytes)
    }

    /// Inserts or updates the record for `name` (case-sensitive key).
    /// Tag is last-write-wins; the one new link entry merges by key.
    pub fn upsert(&mut self, name: &str, channel: &str, link: &str, tag: &str) {
        if let Some(record) = self.records.iter_mut().find(|r| r.name == name) {
            record.tag = tag.to_string();
            record.links.insert(channel.to_string(), link.to_string());
        } else {
            let mut links = BTreeMap::new();
            links.insert(channel.to_string(), link.to_string());
            self.records.push(VideoRecord {
                name: name.to_string(),
                tag: tag.to_string(),
                links,
            });
        }
    }

    /// Exact lookup by name, compared as given.
    pub fn get(&self, name: &str) -> Option<&VideoRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// All records in table order.
    pub fn all(&self) -> &[VideoRecord] {
        &self.records
    }

    /// All names in table order.
    pub fn names(&self) -> Vec<String> {
        self.records.iter().map(|r| r.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_download_upsert_creates_then_merges() {
        let mut table = DownloadTable::default();
        let stored = table.upsert("ab12", "Farm One", "links", "https://a");
        assert_eq!(stored, "AB12");
        let stored = table.upsert("AB12", "Farm One v2", "archive", "https://b");
        assert_eq!(stored, "AB12");

        assert_eq!(table.all().len(), 1);
        let record = table.get("ab12").unwrap();
        assert_eq!(record.id, "AB12");
        assert_eq!(record.name, "Farm One v2");
        assert_eq!(record.links.len(), 2);
        assert_eq!(record.links["links"], "https://a");
        assert_eq!(record.links["archive"], "https://b");
    }

    #[test]
    fn test_download_upsert_same_channel_overwrites_link() {
        let mut table = DownloadTable::default();
        table.upsert("AB12", "Farm", "links", "https://old");
        table.upsert("AB12", "Farm", "links", "https://new");

        let record = table.get("AB12").unwrap();
        assert_eq!(record.links.len(), 1);
        assert_eq!(record.links["links"], "https://new");
    }

    #[test]
    fn test_video_name_key_is_case_sensitive() {
        let mut table = VideoTable::default();
        table.upsert("Iron Farm Tour", "videos", "https://v/1", "<@&1>");
        table.upsert("iron farm tour", "videos", "https://v/2", "<@&2>");

        assert_eq!(table.all().len(), 2);
        assert!(table.get("Iron Farm Tour").is_some());
        assert!(table.get("IRON FARM TOUR").is_none());
    }

    #[test]
    fn test_video_tag_is_last_write_wins() {
        let mut table = VideoTable::default();
        table.upsert("Tour", "videos", "https://v/1", "<@&1>");
        table.upsert("Tour", "tutorials", "https://v/2", "<@&2>");

        let record = table.get("Tour").unwrap();
        assert_eq!(record.tag, "<@&2>");
        assert_eq!(record.links.len(), 2);
    }

    #[test]
    fn test_download_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("downloads.csv");

        let mut table = DownloadTable::default();
        table.upsert("AB12", "Farm, \"quoted\"", "links", "https://a");
        table.upsert("CD34", "Other", "links", "https://b");
        table.upsert("AB12", "Farm, \"quoted\"", "archive", "https://c");
        table.persist(&path).unwrap();

        let reloaded = DownloadTable::load(&path).unwrap();
        assert_eq!(reloaded.all(), table.all());
    }

    #[test]
    fn test_video_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.csv");

        let mut table = VideoTable::default();
        table.upsert("Tour", "videos", "https://v/1", "<@&99>");
        table.persist(&path).unwrap();

        let reloaded = VideoTable::load(&path).unwrap();
        assert_eq!(reloaded.all(), table.all());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = DownloadTable::load(&dir.path().join("absent.csv")).unwrap();
        assert!(table.all().is_empty());
    }

    #[test]
    fn test_load_corrupt_links_column_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("downloads.csv");
        std::fs::write(&path, "ID,Name,Links\nAB12,Farm,not-json\n").unwrap();
        assert!(DownloadTable::load(&path).is_err());
    }

    #[test]
    fn test_table_order_preserved_on_update() {
        let mut table = DownloadTable::default();
        table.upsert("A1", "First", "links", "https://1");
        table.upsert("B2", "Second", "links", "https://2");
        table.upsert("A1", "First again", "links", "https://3");

        let ids = table.ids();
        assert_eq!(ids, vec!["A1", "B2"]);
    }
}
