//! Request classification.
//!
//! Predicates are evaluated in a fixed order and the first match wins:
//!
//! 1. static asset: path contains the static namespace and ends in `.css`,
//!    `.js`, `.svg` or `.ico`
//! 2. image: path ends in `.jpg|.jpeg|.png|.gif|.webp|.svg` (any case)
//! 3. dynamic: path contains an API/admin namespace, or the query is non-empty
//! 4. other
//!
//! Image precedes dynamic, so `/api/chart.svg?v=2` is an image.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use swcache_core::cache::PartitionRole;
use swcache_core::{CacheConfig, RequestDescriptor};

use crate::strategy::Strategy;

const STATIC_EXTENSIONS: &[&str] = &[".css", ".js", ".svg", ".ico"];

static IMAGE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp|svg)$").expect("valid image extension pattern"));

/// Classification of an intercepted GET request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestClass {
    StaticAsset,
    Image,
    Dynamic,
    Other,
}

impl RequestClass {
    pub fn strategy(self) -> Strategy {
        match self {
            RequestClass::StaticAsset | RequestClass::Image => Strategy::CacheFirst,
            RequestClass::Dynamic => Strategy::NetworkFirst,
            RequestClass::Other => Strategy::StaleWhileRevalidate,
        }
    }

    pub fn role(self) -> PartitionRole {
        match self {
            RequestClass::StaticAsset => PartitionRole::Static,
            RequestClass::Image => PartitionRole::Image,
            RequestClass::Dynamic | RequestClass::Other => PartitionRole::Dynamic,
        }
    }
}

/// Path-based request classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    static_namespace: String,
    dynamic_namespaces: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl Classifier {
    pub fn new(static_namespace: impl Into<String>, dynamic_namespaces: Vec<String>) -> Self {
        Self { static_namespace: static_namespace.into(), dynamic_namespaces }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.static_namespace.clone(), config.dynamic_namespaces.clone())
    }

    pub fn classify(&self, request: &RequestDescriptor) -> RequestClass {
        let path = request.path();
        if self.is_static_asset(path) {
            RequestClass::StaticAsset
        } else if is_image(path) {
            RequestClass::Image
        } else if self.is_dynamic(request) {
            RequestClass::Dynamic
        } else {
            RequestClass::Other
        }
    }

    pub fn is_static_asset(&self, path: &str) -> bool {
        path.contains(self.static_namespace.as_str()) && STATIC_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    }

    pub fn is_dynamic(&self, request: &RequestDescriptor) -> bool {
        let path = request.path();
        self.dynamic_namespaces.iter().any(|ns| path.contains(ns.as_str())) || request.query().is_some()
    }
}

pub fn is_image(path: &str) -> bool {
    IMAGE_EXTENSION.is_match(path)
}
