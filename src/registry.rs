//! Tenant registry - one record store per server, created on first use.
//!
//! The registry is an explicit object constructed once at startup and handed
//! by reference to every consumer (event handlers, command handlers, scans).
//! There is deliberately no process-global instance: tests get a fresh
//! registry over a temp directory and share nothing.

use crate::errors::{Error, Result};
use crate::store::TenantStore;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Maps server ids to their lazily opened record stores.
#[derive(Debug)]
pub struct StoreRegistry {
    data_dir: PathBuf,
    stores: Mutex<HashMap<u64, Arc<TenantStore>>>,
}

impl StoreRegistry {
    /// Creates a registry rooted at `data_dir`. Each server gets its own
    /// subdirectory named after its id, holding both tables.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves the record store for `tenant_id`, opening it on first access
    /// and returning the same `Arc` on every later call so mutations are
    /// immediately visible to all callers.
    ///
    /// # Errors
    /// [`Error::MissingTenant`] when the id is absent or zero - store access
    /// is meaningless outside a server context and is never defaulted.
    pub fn get_store(&self, tenant_id: Option<u64>) -> Result<Arc<TenantStore>> {
        let tenant_id = match tenant_id {
            Some(id) if id != 0 => id,
            _ => return Err(Error::MissingTenant),
        };

        let mut stores = self
            .stores
            .lock()
            .map_err(|_| Error::Storage {
                message: "Store registry lock poisoned".to_string(),
            })?;

        if let Some(store) = stores.get(&tenant_id) {
            return Ok(Arc::clone(store));
        }

        let tenant_dir = self.data_dir.join(tenant_id.to_string());
        let store = Arc::new(TenantStore::open(tenant_id, &tenant_dir)?);
        stores.insert(tenant_id, Arc::clone(&store));
        info!(tenant_id, "Registered record store");
        Ok(store)
    }

    /// Directory a tenant's files live under; used by settings loading.
    #[must_use]
    pub fn tenant_dir(&self, tenant_id: u64) -> PathBuf {
        self.data_dir.join(tenant_id.to_string())
    }
}
