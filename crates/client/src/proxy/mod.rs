//! The request-intercepting cache proxy.
//!
//! The host runtime fires lifecycle events at a [`CacheProxy`]:
//!
//! - `install`: precache the manifest into the static partition
//! - `activate`: delete every partition outside the current-version set
//! - `fetch`: classify a GET request and answer it with one strategy
//! - `message` / `push` / `notification_click` / `sync`: pass-through hooks
//!
//! Non-GET requests are never intercepted.

mod events;
mod lifecycle;

use std::sync::Arc;

use serde::Serialize;
use swcache_core::{CacheConfig, CacheStorage, Partition, PartitionNames, PrecacheManifest, RequestDescriptor, StoredResponse};
use tokio_util::task::TaskTracker;

use crate::classify::{Classifier, RequestClass};
use crate::fetch::Network;
use crate::host::Host;
use crate::strategy::Strategy;

pub use events::{Message, MessageReply, PushPayload};

const PARTITION_UNAVAILABLE: &str = "Content not available";

/// Everything the proxy needs to know at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub names: PartitionNames,
    pub manifest: PrecacheManifest,
    pub classifier: Classifier,
}

impl ProxyConfig {
    pub fn from_cache_config(config: &CacheConfig) -> Self {
        Self {
            names: config.partition_names(),
            manifest: config.manifest(),
            classifier: Classifier::from_config(config),
        }
    }
}

impl ProxyConfig {
    /// Route for a request, or `None` if it is not intercepted.
    pub fn route(&self, request: &RequestDescriptor) -> Option<Route> {
        if !request.is_get() {
            return None;
        }
        let class = self.classifier.classify(request);
        Some(Route {
            class,
            strategy: class.strategy(),
            partition: self.names.name_for(class.role()).to_string(),
        })
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::from_cache_config(&CacheConfig::default())
    }
}

/// Where an intercepted request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub class: RequestClass,
    pub strategy: Strategy,
    pub partition: String,
}

pub struct CacheProxy {
    config: ProxyConfig,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    host: Arc<dyn Host>,
    /// Background revalidations that outlive the fetch that started them.
    revalidations: TaskTracker,
}

impl CacheProxy {
    pub fn new(
        config: ProxyConfig, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>, host: Arc<dyn Host>,
    ) -> Self {
        Self { config, storage, network, host, revalidations: TaskTracker::new() }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    pub fn route(&self, request: &RequestDescriptor) -> Option<Route> {
        self.config.route(request)
    }

    /// Answer an intercepted request.
    ///
    /// Returns `None` when the request is not intercepted and the host should
    /// perform its default network handling. Otherwise always resolves to a
    /// response, falling back to a synthetic 503.
    pub async fn fetch(&self, request: &RequestDescriptor) -> Option<StoredResponse> {
        let Some(route) = self.route(request) else {
            tracing::debug!(method = request.method(), href = %request.href(), "passing through");
            return None;
        };

        tracing::debug!(
            href = %request.href(),
            class = ?route.class,
            strategy = ?route.strategy,
            partition = %route.partition,
            "intercepted"
        );

        let partition = match Partition::open(Arc::clone(&self.storage), &route.partition).await {
            Ok(partition) => partition,
            Err(e) => {
                tracing::warn!(partition = %route.partition, error = %e, "failed to open partition");
                return Some(StoredResponse::unavailable(PARTITION_UNAVAILABLE));
            }
        };

        Some(route.strategy.respond(&self.network, &partition, request, &self.revalidations).await)
    }

    /// Wait for every background revalidation started so far.
    ///
    /// Hosts call this before shutting down the runtime; a refresh dropped
    /// with the runtime never reaches the partition.
    pub async fn drain(&self) {
        self.revalidations.close();
        self.revalidations.wait().await;
        self.revalidations.reopen();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingHost, Reply, ScriptedNetwork, ok};
    use std::time::Duration;
    use swcache_core::MemoryStorage;

    pub(super) struct Harness {
        pub proxy: CacheProxy,
        pub network: Arc<ScriptedNetwork>,
        pub storage: Arc<MemoryStorage>,
        pub host: Arc<RecordingHost>,
    }

    pub(super) fn harness(config: ProxyConfig) -> Harness {
        let network = Arc::new(ScriptedNetwork::new());
        let storage = Arc::new(MemoryStorage::new());
        let host = Arc::new(RecordingHost::default());
        let proxy = CacheProxy::new(config, storage.clone(), network.clone(), host.clone());
        Harness { proxy, network, storage, host }
    }

    fn req(url: &str) -> RequestDescriptor {
        RequestDescriptor::get(url).unwrap()
    }

    #[tokio::test]
    async fn test_non_get_not_intercepted() {
        let h = harness(ProxyConfig::default());
        for method in ["POST", "PUT", "DELETE", "HEAD", "OPTIONS"] {
            let request = RequestDescriptor::new(method, "/static/styles.css").unwrap();
            assert!(h.proxy.route(&request).is_none());
            assert!(h.proxy.fetch(&request).await.is_none());
        }
        assert_eq!(h.network.calls(), 0);
        assert!(h.storage.names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_route_table() {
        let h = harness(ProxyConfig::default());
        let route = h.proxy.route(&req("/static/styles.css")).unwrap();
        assert_eq!(route.strategy, Strategy::CacheFirst);
        assert_eq!(route.partition, "static-v1.2");

        let route = h.proxy.route(&req("/api/chart.svg?v=2")).unwrap();
        assert_eq!(route.class, RequestClass::Image);
        assert_eq!(route.partition, "images-v1.2");

        let route = h.proxy.route(&req("/api/projects")).unwrap();
        assert_eq!(route.strategy, Strategy::NetworkFirst);
        assert_eq!(route.partition, "dynamic-v1.2");

        let route = h.proxy.route(&req("/")).unwrap();
        assert_eq!(route.strategy, Strategy::StaleWhileRevalidate);
        assert_eq!(route.partition, "dynamic-v1.2");
    }

    #[tokio::test]
    async fn test_warm_static_and_image_skip_network() {
        let h = harness(ProxyConfig::default());
        let css = req("/static/styles.css");
        let png = req("/media/me.png");
        h.storage.put("static-v1.2", &css.key(), &ok("css")).await.unwrap();
        h.storage.put("images-v1.2", &png.key(), &ok("png")).await.unwrap();
        h.network.respond("/static/styles.css", 200, "fresh css");
        h.network.respond("/media/me.png", 200, "fresh png");

        assert_eq!(h.proxy.fetch(&css).await.unwrap().body, "css");
        assert_eq!(h.proxy.fetch(&png).await.unwrap().body, "png");
        assert_eq!(h.network.calls(), 0);
    }

    #[tokio::test]
    async fn test_image_with_query_stored_in_image_partition() {
        let h = harness(ProxyConfig::default());
        let request = req("/api/chart.svg?v=2");
        h.network.respond("/api/chart.svg?v=2", 200, "<svg/>");

        let response = h.proxy.fetch(&request).await.unwrap();
        assert_eq!(response.body, "<svg/>");
        assert!(h.storage.get("images-v1.2", &request.key()).await.unwrap().is_some());
        assert!(h.storage.get("dynamic-v1.2", &request.key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dynamic_offline_falls_back_to_cache() {
        let h = harness(ProxyConfig::default());
        let request = req("/api/projects");
        h.storage.put("dynamic-v1.2", &request.key(), &ok("[]")).await.unwrap();

        let response = h.proxy.fetch(&request).await.unwrap();
        assert_eq!(response.body, "[]");
        assert_eq!(h.network.calls_for("/api/projects"), 1);
    }

    #[tokio::test]
    async fn test_every_intercepted_fetch_resolves_offline() {
        let h = harness(ProxyConfig::default());
        for url in ["/static/a.css", "/img/a.webp", "/api/x", "/contact/"] {
            let response = h.proxy.fetch(&req(url)).await.unwrap();
            assert_eq!(response.status, 503, "{url}");
        }
    }

    #[test]
    fn test_drained_refresh_survives_runtime_shutdown() {
        let h = harness(ProxyConfig::default());
        let request = req("/about/");

        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        runtime.block_on(async {
            h.storage.put("dynamic-v1.2", &request.key(), &ok("stale")).await.unwrap();
            h.network.script("/about/", Reply::Delayed(Duration::from_millis(20), ok("fresh")));

            assert_eq!(h.proxy.fetch(&request).await.unwrap().body, "stale");
            h.proxy.drain().await;
        });
        drop(runtime);

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let stored = runtime.block_on(h.storage.get("dynamic-v1.2", &request.key())).unwrap();
        assert_eq!(stored.unwrap().body, "fresh");
    }

    #[tokio::test]
    async fn test_drain_without_background_work_returns() {
        let h = harness(ProxyConfig::default());
        h.network.respond("/api/projects", 200, "[]");
        h.proxy.fetch(&req("/api/projects")).await.unwrap();
        h.proxy.drain().await;
        h.proxy.drain().await;
    }

    #[tokio::test]
    async fn test_concurrent_fetches_same_key() {
        let h = harness(ProxyConfig::default());
        let request = req("/static/app.js");
        h.network.respond("/static/app.js", 200, "js");

        let (a, b) = tokio::join!(h.proxy.fetch(&request), h.proxy.fetch(&request));
        assert_eq!(a.unwrap().body, "js");
        assert_eq!(b.unwrap().body, "js");
        assert_eq!(h.storage.keys("static-v1.2").await.unwrap().len(), 1);
    }
}
