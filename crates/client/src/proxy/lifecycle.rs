//! Install and activate.

use std::sync::Arc;

use swcache_core::{Error, Partition, RequestDescriptor, StoredResponse};
use tokio::task::JoinSet;

use super::CacheProxy;
use crate::host::HostSignal;

fn install_failed(path: &str, reason: impl ToString) -> Error {
    Error::InstallFailed { path: path.to_string(), reason: reason.to_string() }
}

impl CacheProxy {
    /// Precache every manifest path into the static partition.
    ///
    /// All manifest entries are fetched first; nothing is stored unless every
    /// fetch returns a 2xx response. On success the host is told to skip
    /// waiting. There are no retries; the host decides whether to re-run install.
    ///
    /// # Errors
    ///
    /// Returns `Error::InstallFailed` for the first manifest entry that fails,
    /// or a storage error if the batch cannot be committed.
    pub async fn install(&self) -> Result<(), Error> {
        let static_name = &self.config.names.static_assets;
        let manifest = &self.config.manifest;
        tracing::info!(partition = %static_name, entries = manifest.len(), "installing");

        let partition = Partition::open(Arc::clone(&self.storage), static_name).await?;

        let mut join_set = JoinSet::new();
        for path in manifest.paths() {
            let request = RequestDescriptor::get(path).map_err(|e| install_failed(path, e))?;
            let network = Arc::clone(&self.network);
            join_set.spawn(async move {
                let result = network.fetch(&request).await;
                (request, result)
            });
        }

        let mut fetched: Vec<(RequestDescriptor, StoredResponse)> = Vec::with_capacity(manifest.len());
        while let Some(joined) = join_set.join_next().await {
            let (request, result) = joined.map_err(|e| install_failed("<precache task>", e))?;
            let failure = match result {
                Ok(response) if response.is_ok() => {
                    fetched.push((request, response));
                    continue;
                }
                Ok(response) => install_failed(&request.href(), format!("status {}", response.status)),
                Err(e) => install_failed(&request.href(), e),
            };

            join_set.shutdown().await;
            tracing::error!(error = %failure, "error caching static assets");
            return Err(failure);
        }

        partition.put_all(&fetched).await?;
        tracing::info!(partition = %static_name, entries = fetched.len(), "static assets cached");

        self.host.signal(HostSignal::SkipWaiting);
        Ok(())
    }

    /// Delete every partition outside the current-version set, then claim clients.
    ///
    /// Returns the names of the deleted partitions.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        tracing::info!("activating");

        let mut deleted = Vec::new();
        for name in self.storage.names().await? {
            if self.config.names.is_current(&name) {
                continue;
            }
            tracing::info!(partition = %name, "deleting old cache partition");
            if self.storage.delete(&name).await? {
                deleted.push(name);
            }
        }

        tracing::info!(deleted = deleted.len(), "activated");
        self.host.signal(HostSignal::ClaimClients);
        Ok(deleted)
    }
}
