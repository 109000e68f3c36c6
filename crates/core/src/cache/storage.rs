//! Storage collaborator trait and partition handle.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Error, RequestDescriptor, StoredResponse};

/// Key/value storage for named partitions.
///
/// Individual reads and writes are atomic; concurrent writers to the same
/// key are last-writer-wins.
#[async_trait]
pub trait CacheStorage: Send + Sync + 'static {
    /// Create the partition if it does not exist.
    async fn open(&self, partition: &str) -> Result<(), Error>;

    /// Names of all existing partitions, sorted.
    async fn names(&self) -> Result<Vec<String>, Error>;

    /// Delete a partition and all its entries. Returns whether it existed.
    async fn delete(&self, partition: &str) -> Result<bool, Error>;

    async fn get(&self, partition: &str, key: &str) -> Result<Option<StoredResponse>, Error>;

    /// Store a response, replacing any previous entry for the key. Creates
    /// the partition if needed.
    async fn put(&self, partition: &str, key: &str, response: &StoredResponse) -> Result<(), Error>;

    /// Store a batch of responses.
    ///
    /// Backends that can commit atomically should override this.
    async fn put_all(&self, partition: &str, entries: &[(String, StoredResponse)]) -> Result<(), Error> {
        for (key, response) in entries {
            self.put(partition, key, response).await?;
        }
        Ok(())
    }

    async fn keys(&self, partition: &str) -> Result<Vec<String>, Error>;

    fn backend(&self) -> &'static str;
}

/// Handle to an opened partition.
#[derive(Clone)]
pub struct Partition {
    name: String,
    storage: Arc<dyn CacheStorage>,
}

impl std::fmt::Debug for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partition")
            .field("name", &self.name)
            .field("backend", &self.storage.backend())
            .finish()
    }
}

impl Partition {
    /// Open (create-if-absent) a partition.
    pub async fn open(storage: Arc<dyn CacheStorage>, name: &str) -> Result<Self, Error> {
        storage.open(name).await?;
        Ok(Self { name: name.to_string(), storage })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn get(&self, request: &RequestDescriptor) -> Result<Option<StoredResponse>, Error> {
        self.storage.get(&self.name, &request.key()).await
    }

    pub async fn put(&self, request: &RequestDescriptor, response: &StoredResponse) -> Result<(), Error> {
        self.storage.put(&self.name, &request.key(), response).await
    }

    pub async fn put_all(&self, entries: &[(RequestDescriptor, StoredResponse)]) -> Result<(), Error> {
        let keyed: Vec<(String, StoredResponse)> = entries
            .iter()
            .map(|(request, response)| (request.key(), response.clone()))
            .collect();
        self.storage.put_all(&self.name, &keyed).await
    }

    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        self.storage.keys(&self.name).await
    }
}
