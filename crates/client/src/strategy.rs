//! Fetch strategies.
//!
//! Every strategy resolves to a response; network failures are recovered
//! locally from the partition or with the synthetic unavailable-response.
//! Only 2xx responses are stored, and only after the body has been fully
//! received. Storage failures are logged and otherwise ignored.

use std::sync::Arc;

use serde::Serialize;
use swcache_core::{Partition, RequestDescriptor, StoredResponse};
use tokio_util::task::TaskTracker;

use crate::fetch::Network;

const CACHE_FIRST_UNAVAILABLE: &str = "Offline content not available";
const NETWORK_FIRST_UNAVAILABLE: &str = "Content not available offline";
const REVALIDATE_UNAVAILABLE: &str = "Content not available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

impl Strategy {
    /// Answer `request`. Background work is spawned on `tasks` so the host
    /// can wait for it before shutting down.
    pub async fn respond(
        self, network: &Arc<dyn Network>, partition: &Partition, request: &RequestDescriptor, tasks: &TaskTracker,
    ) -> StoredResponse {
        match self {
            Strategy::CacheFirst => cache_first(network.as_ref(), partition, request).await,
            Strategy::NetworkFirst => network_first(network.as_ref(), partition, request).await,
            Strategy::StaleWhileRevalidate => stale_while_revalidate(network, partition, request, tasks).await,
        }
    }
}

/// Serve from the partition if present; otherwise fetch, store if ok, serve.
pub async fn cache_first(network: &dyn Network, partition: &Partition, request: &RequestDescriptor) -> StoredResponse {
    if let Some(cached) = lookup(partition, request).await {
        tracing::debug!(partition = partition.name(), href = %request.href(), "cache hit");
        return cached;
    }

    match network.fetch(request).await {
        Ok(response) => {
            if response.is_ok() {
                store(partition, request, &response).await;
            }
            response
        }
        Err(e) => {
            tracing::warn!(href = %request.href(), error = %e, "cache-first fetch failed");
            StoredResponse::unavailable(CACHE_FIRST_UNAVAILABLE)
        }
    }
}

/// Fetch and store if ok; on a network failure serve from the partition.
pub async fn network_first(
    network: &dyn Network, partition: &Partition, request: &RequestDescriptor,
) -> StoredResponse {
    match network.fetch(request).await {
        Ok(response) => {
            if response.is_ok() {
                store(partition, request, &response).await;
            }
            response
        }
        Err(e) => {
            tracing::debug!(href = %request.href(), error = %e, "network failed, trying cache");
            match lookup(partition, request).await {
                Some(cached) => cached,
                None => StoredResponse::unavailable(NETWORK_FIRST_UNAVAILABLE),
            }
        }
    }
}

/// Serve from the partition immediately if present while refreshing it in a
/// task on `tasks`; on a miss, wait for that task.
pub async fn stale_while_revalidate(
    network: &Arc<dyn Network>, partition: &Partition, request: &RequestDescriptor, tasks: &TaskTracker,
) -> StoredResponse {
    let cached = lookup(partition, request).await;

    let revalidation = tasks.spawn(revalidate(Arc::clone(network), partition.clone(), request.clone()));

    if let Some(cached) = cached {
        tracing::debug!(partition = partition.name(), href = %request.href(), "serving stale, revalidating");
        return cached;
    }

    match revalidation.await {
        Ok(Some(response)) => response,
        Ok(None) => StoredResponse::unavailable(REVALIDATE_UNAVAILABLE),
        Err(e) => {
            tracing::warn!(href = %request.href(), error = %e, "revalidation task failed");
            StoredResponse::unavailable(REVALIDATE_UNAVAILABLE)
        }
    }
}

async fn revalidate(network: Arc<dyn Network>, partition: Partition, request: RequestDescriptor) -> Option<StoredResponse> {
    match network.fetch(&request).await {
        Ok(response) => {
            if response.is_ok() {
                store(&partition, &request, &response).await;
            }
            Some(response)
        }
        Err(e) => {
            tracing::debug!(href = %request.href(), error = %e, "revalidation request failed");
            None
        }
    }
}

async fn lookup(partition: &Partition, request: &RequestDescriptor) -> Option<StoredResponse> {
    match partition.get(request).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(partition = partition.name(), href = %request.href(), error = %e, "cache read failed");
            None
        }
    }
}

async fn store(partition: &Partition, request: &RequestDescriptor, response: &StoredResponse) {
    if let Err(e) = partition.put(request, response).await {
        tracing::warn!(partition = partition.name(), href = %request.href(), error = %e, "cache write failed");
    }
}
