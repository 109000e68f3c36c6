//! In-memory partition storage.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::storage::CacheStorage;
use crate::{Error, StoredResponse};

type Entries = BTreeMap<String, StoredResponse>;

/// Volatile storage backed by ordered maps behind a tokio RwLock.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    partitions: RwLock<BTreeMap<String, Entries>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        let mut partitions = self.partitions.write().await;
        partitions.entry(partition.to_string()).or_default();
        Ok(())
    }

    async fn names(&self) -> Result<Vec<String>, Error> {
        Ok(self.partitions.read().await.keys().cloned().collect())
    }

    async fn delete(&self, partition: &str) -> Result<bool, Error> {
        Ok(self.partitions.write().await.remove(partition).is_some())
    }

    async fn get(&self, partition: &str, key: &str) -> Result<Option<StoredResponse>, Error> {
        let partitions = self.partitions.read().await;
        Ok(partitions.get(partition).and_then(|entries| entries.get(key)).cloned())
    }

    async fn put(&self, partition: &str, key: &str, response: &StoredResponse) -> Result<(), Error> {
        let mut partitions = self.partitions.write().await;
        partitions
            .entry(partition.to_string())
            .or_default()
            .insert(key.to_string(), response.clone());
        Ok(())
    }

    async fn put_all(&self, partition: &str, entries: &[(String, StoredResponse)]) -> Result<(), Error> {
        let mut partitions = self.partitions.write().await;
        let target = partitions.entry(partition.to_string()).or_default();
        for (key, response) in entries {
            target.insert(key.clone(), response.clone());
        }
        Ok(())
    }

    async fn keys(&self, partition: &str) -> Result<Vec<String>, Error> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .get(partition)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
