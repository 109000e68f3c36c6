//! Intercepted request descriptors.
//!
//! A descriptor keeps only what the proxy reasons about: the method and the
//! path + query of the URL. Scheme, host and fragment are dropped so that the
//! same resource requested through different origins maps to one cache key.

use crate::Error;
use crate::cache::hash::compute_request_key;
use url::{ParseError, Url};

/// Base used to resolve path-relative request URLs.
const RELATIVE_BASE: &str = "http://localhost/";

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: String,
    path: String,
    query: Option<String>,
}

impl RequestDescriptor {
    /// Parse a request from a method and a path-relative or absolute URL.
    ///
    /// The method is upper-cased. An empty query (`/a?`) is treated as absent.
    pub fn new(method: &str, url: &str) -> Result<Self, Error> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidUrl("empty URL".into()));
        }

        let parsed = match Url::parse(trimmed) {
            Ok(parsed) => match parsed.scheme() {
                "http" | "https" => parsed,
                scheme => return Err(Error::InvalidUrl(format!("unsupported scheme: {scheme}"))),
            },
            Err(ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)
                .and_then(|base| base.join(trimmed))
                .map_err(|e| Error::InvalidUrl(e.to_string()))?,
            Err(e) => return Err(Error::InvalidUrl(e.to_string())),
        };

        let method = method.trim().to_ascii_uppercase();
        if method.is_empty() {
            return Err(Error::InvalidInput("empty request method".into()));
        }

        Ok(Self {
            method,
            path: parsed.path().to_string(),
            query: parsed.query().filter(|q| !q.is_empty()).map(str::to_string),
        })
    }

    /// Shorthand for a GET request.
    pub fn get(url: &str) -> Result<Self, Error> {
        Self::new("GET", url)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query string without the leading `?`, present only when non-empty.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Path plus `?query` when a query is present.
    pub fn href(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }

    /// Storage key for this request.
    pub fn key(&self) -> String {
        compute_request_key(&self.method, &self.href())
    }
}
