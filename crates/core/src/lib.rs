//! Core types and shared functionality for swcache.
//!
//! This crate provides:
//! - Request/response data model for intercepted fetches
//! - Partition storage with in-memory and SQLite backends
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod request;
pub mod response;

pub use cache::{CacheStorage, MemoryStorage, Partition, PartitionNames, PrecacheManifest, SqliteStorage};
pub use config::{AppConfig, CacheConfig, ConfigError};
pub use error::Error;
pub use request::RequestDescriptor;
pub use response::StoredResponse;
