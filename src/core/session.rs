use crate::domain::model::{Folder, VaultCache};
use crate::domain::ports::VaultApi;
use crate::utils::error::Result;
use tokio::sync::{RwLock, RwLockReadGuard};

/// A vault connection plus the snapshot from its last sync.
pub struct VaultSession<V: VaultApi> {
    api: V,
    cache: RwLock<VaultCache>,
}

impl<V: VaultApi> VaultSession<V> {
    pub fn new(api: V) -> Self {
        Self {
            api,
            cache: RwLock::new(VaultCache::default()),
        }
    }

    /// Session that starts from an existing snapshot instead of an empty one.
    pub fn with_cache(api: V, cache: VaultCache) -> Self {
        Self {
            api,
            cache: RwLock::new(cache),
        }
    }

    pub fn api(&self) -> &V {
        &self.api
    }

    pub async fn sync(&self) -> Result<()> {
        let fresh = self.api.sync_down().await?;
        tracing::debug!(
            "Synced {} records, {} folders, {} shared folders",
            fresh.records.len(),
            fresh.folders.len(),
            fresh.shared_folders.len()
        );
        *self.cache.write().await = fresh;
        Ok(())
    }

    pub async fn cache(&self) -> RwLockReadGuard<'_, VaultCache> {
        self.cache.read().await
    }

    pub async fn remember_folder(&self, folder: Folder) {
        self.cache.write().await.insert_folder(folder);
    }

    pub async fn remember_link(&self, record_uid: &str, folder_uid: &str) {
        self.cache.write().await.link_record(record_uid, folder_uid);
    }
}
