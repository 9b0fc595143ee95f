//! In-memory store backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheStore, CachedResponse, Region};
use crate::Error;

type Entries = BTreeMap<String, CachedResponse>;

/// Volatile [`CacheStore`] backed by a map of maps.
///
/// Uses a tokio RwLock for concurrent access; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    regions: Arc<RwLock<HashMap<Region, Entries>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn open(&self, region: Region) -> Result<(), Error> {
        self.regions.write().await.entry(region).or_default();
        Ok(())
    }

    async fn has_region(&self, region: Region) -> Result<bool, Error> {
        Ok(self.regions.read().await.contains_key(&region))
    }

    async fn delete_region(&self, region: Region) -> Result<bool, Error> {
        Ok(self.regions.write().await.remove(&region).is_some())
    }

    async fn get(&self, region: Region, key: &str) -> Result<Option<CachedResponse>, Error> {
        let regions = self.regions.read().await;
        Ok(regions.get(&region).and_then(|entries| entries.get(key)).cloned())
    }

    async fn put(&self, region: Region, key: &str, response: &CachedResponse) -> Result<(), Error> {
        let mut regions = self.regions.write().await;
        regions
            .entry(region)
            .or_default()
            .insert(key.to_string(), response.clone());
        Ok(())
    }

    async fn delete(&self, region: Region, key: &str) -> Result<bool, Error> {
        let mut regions = self.regions.write().await;
        Ok(regions
            .get_mut(&region)
            .is_some_and(|entries| entries.remove(key).is_some()))
    }

    async fn keys(&self, region: Region) -> Result<Vec<String>, Error> {
        let regions = self.regions.read().await;
        Ok(regions
            .get(&region)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }
}
