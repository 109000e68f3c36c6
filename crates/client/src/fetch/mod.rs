//! Network collaborator.
//!
//! The proxy only needs "fetch a resource by request descriptor". A response
//! with any status is a successful call; only transport failures are errors.
//! Each call is exactly one attempt; there are no retries here.

pub mod url;

use async_trait::async_trait;
use reqwest::{Client, Method, header};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, parse_origin, resolve};

use swcache_core::{AppConfig, Error, RequestDescriptor, StoredResponse};

/// The network as seen by the proxy.
#[async_trait]
pub trait Network: Send + Sync + 'static {
    /// Perform the request.
    ///
    /// Non-2xx statuses are returned as `Ok`. `Err` means the call threw.
    async fn fetch(&self, request: &RequestDescriptor) -> Result<StoredResponse, Error>;
}

/// Configuration for the HTTP network.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Origin that request paths are resolved against.
    pub origin: ::url::Url,

    /// User agent string (default: "swcache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 10MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl FetchConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = parse_origin(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            origin,
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: 5,
        })
    }
}

/// reqwest-backed network.
pub struct HttpNetwork {
    http: Client,
    config: FetchConfig,
}

impl HttpNetwork {
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<StoredResponse, Error> {
        let start = Instant::now();
        let url = resolve(&self.config.origin, request).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let method = Method::from_bytes(request.method().as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {e}", request.method())))?;

        let response = self
            .http
            .request(method, url.as_str())
            .send()
            .await
            .map_err(|e| Error::Network(format!("network error: {e}")))?;

        let status = response.status();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let headers = header_pairs(response.headers());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {e}")))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                bytes.len(),
                self.config.max_bytes
            )));
        }

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes)",
            url,
            status.as_u16(),
            start.elapsed().as_millis(),
            bytes.len()
        );

        Ok(StoredResponse::new(status.as_u16(), headers, bytes))
    }
}

/// Header map as ordered pairs; values that are not valid UTF-8 are dropped.
fn header_pairs(headers: &header::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
        .collect()
}
