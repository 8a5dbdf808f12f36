//! Durable per-tenant record store.
//!
//! One [`TenantStore`] per server holds the downloads and videos tables
//! behind independent read/write locks. Every mutation rewrites the backing
//! file before returning, so there is never more than the in-flight mutation
//! unflushed; reads only ever touch memory-resident state.

pub mod records;
pub(crate) mod table;

pub use records::{DownloadRecord, VideoRecord};

use crate::errors::Result;
use crate::store::table::{DownloadTable, VideoTable};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

/// File name of the downloads table inside a tenant directory.
const DOWNLOADS_FILE: &str = "downloads.csv";
/// File name of the videos table inside a tenant directory.
const VIDEOS_FILE: &str = "videos.csv";

/// The record store of a single server: both tables plus their on-disk home.
#[derive(Debug)]
pub struct TenantStore {
    tenant_id: u64,
    downloads_path: PathBuf,
    videos_path: PathBuf,
    downloads: RwLock<DownloadTable>,
    videos: RwLock<VideoTable>,
}

impl TenantStore {
    /// Opens the store for `tenant_id` under `tenant_dir`, creating the
    /// directory if needed. An unreadable or corrupt table falls back to an
    /// empty one with an error log - the bot keeps serving rather than
    /// refusing to start over one bad file.
    #[instrument(skip(tenant_dir))]
    pub fn open(tenant_id: u64, tenant_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(tenant_dir)?;
        let downloads_path = tenant_dir.join(DOWNLOADS_FILE);
        let videos_path = tenant_dir.join(VIDEOS_FILE);

        let downloads = DownloadTable::load(&downloads_path).unwrap_or_else(|e| {
            error!(
                tenant_id,
                "Failed to load download table from {}: {}. Starting empty.",
                downloads_path.display(),
                e
            );
            DownloadTable::default()
        });
        let videos = VideoTable::load(&videos_path).unwrap_or_else(|e| {
            error!(
                tenant_id,
                "Failed to load video table from {}: {}. Starting empty.",
                videos_path.display(),
                e
            );
            VideoTable::default()
        });

        info!(tenant_id, "Opened record store at {}", tenant_dir.display());
        Ok(Self {
            tenant_id,
            downloads_path,
            videos_path,
            downloads: RwLock::new(downloads),
            videos: RwLock::new(videos),
        })
    }

    /// The server this store belongs to.
    #[must_use]
    pub const fn tenant_id(&self) -> u64 {
        self.tenant_id
    }

    /// Inserts or updates a download record and persists the table before
    /// returning. The write guard is held across mutate + persist, so
    /// concurrent upserts to this table serialize and readers never see a
    /// half-merged row.
    #[instrument(skip(self, name, link), fields(tenant_id = self.tenant_id))]
    pub async fn upsert_download(
        &self,
        id: &str,
        name: &str,
        channel: &str,
        link: &str,
    ) -> Result<()> {
        let mut table = self.downloads.write().await;
        let stored_id = table.upsert(id, name, channel, link);
        table.persist(&self.downloads_path)?;
        info!(
            tenant_id = self.tenant_id,
            id = %stored_id,
            channel,
            "Upserted download record"
        );
        Ok(())
    }

    /// Inserts or updates a video record and persists the table before
    /// returning. Same locking discipline as [`Self::upsert_download`].
    #[instrument(skip(self, name, link, tag), fields(tenant_id = self.tenant_id))]
    pub async fn upsert_video(&self, name: &str, channel: &str, link: &str, tag: &str) -> Result<()> {
        let mut table = self.videos.write().await;
        table.upsert(name, channel, link, tag);
        table.persist(&self.videos_path)?;
        info!(
            tenant_id = self.tenant_id,
            name, channel, "Upserted video record"
        );
        Ok(())
    }

    /// Exact download lookup; the id is uppercased before comparison.
    pub async fn get_download(&self, id: &str) -> Option<DownloadRecord> {
        self.downloads.read().await.get(id).cloned()
    }

    /// Exact video lookup; names compare case-sensitively as given.
    pub async fn get_video(&self, name: &str) -> Option<VideoRecord> {
        self.videos.read().await.get(name).cloned()
    }

    /// Snapshot of all download records in table order.
    pub async fn downloads(&self) -> Vec<DownloadRecord> {
        self.downloads.read().await.all().to_vec()
    }

    /// Snapshot of all video records in table order.
    pub async fn videos(&self) -> Vec<VideoRecord> {
        self.videos.read().await.all().to_vec()
    }

    /// Snapshot of all download ids in table order.
    pub async fn download_ids(&self) -> Vec<String> {
        self.downloads.read().await.ids()
    }

    /// Snapshot of all video names in table order.
    pub async fn video_names(&self) -> Vec<String> {
        self.videos.read().await.names()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::init_test_tracing;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_upsert_then_get_round_trips_links() {
        init_test_tracing();
        let dir = tempfile::tempdir().unwrap();
        let store = TenantStore::open(42, dir.path()).unwrap();

        store
            .upsert_download("ab12", "Farm One", "links", "https://discord/jump/1")
            .await
            .unwrap();

        let record = store.get_download("AB12").await.unwrap();
        assert_eq!(record.name, "Farm One");
        assert_eq!(record.links["links"], "https://discord/jump/1");
    }

    #[tokio::test]
    async fn test_reload_from_disk_preserves_state() {
        init_test_tracing();
        let dir = tempfile::tempdir().unwrap();
        {
            let store = TenantStore::open(42, dir.path()).unwrap();
            store
                .upsert_download("AB12", "Farm One", "links", "https://a")
                .await
                .unwrap();
            store
                .upsert_video("Tour", "videos", "https://v/1", "<@&9>")
                .await
                .unwrap();
        }

        let reopened = TenantStore::open(42, dir.path()).unwrap();
        let download = reopened.get_download("AB12").await.unwrap();
        assert_eq!(download.name, "Farm One");
        assert_eq!(download.links["links"], "https://a");
        let video = reopened.get_video("Tour").await.unwrap();
        assert_eq!(video.tag, "<@&9>");
    }

    #[tokio::test]
    async fn test_corrupt_table_falls_back_to_empty() {
        init_test_tracing();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("downloads.csv"), "ID,Name,Links\nAB12,Farm,{broken\n")
            .unwrap();

        let store = TenantStore::open(42, dir.path()).unwrap();
        assert!(store.downloads().await.is_empty());

        // The store still accepts writes after the fallback.
        store
            .upsert_download("CD34", "Fresh", "links", "https://b")
            .await
            .unwrap();
        assert!(store.get_download("CD34").await.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_lose_no_records() {
        init_test_tracing();
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(TenantStore::open(42, dir.path()).unwrap());

        let mut handles = Vec::new();
        for n in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .upsert_download(
                        &format!("ID{n:02}"),
                        &format!("Farm {n}"),
                        "links",
                        &format!("https://jump/{n}"),
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.downloads().await.len(), 16);

        // And the persisted table agrees after a reload.
        let reopened = TenantStore::open(42, dir.path()).unwrap();
        assert_eq!(reopened.downloads().await.len(), 16);
    }
}
