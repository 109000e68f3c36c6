//! Named cache partitions of request → response pairs.
//!
//! This module provides the storage collaborator used by the proxy. It
//! supports:
//!
//! - Idempotent, lazily created partitions addressed by versioned name
//! - Whole-partition deletion as the only eviction mechanism
//! - An in-memory backend and a persistent SQLite backend (WAL mode,
//!   `user_version` migrations)

pub mod connection;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod names;
pub mod partitions;
pub mod storage;

pub use crate::Error;

pub use connection::SqliteStorage;
pub use memory::MemoryStorage;
pub use names::{PartitionNames, PartitionRole, PrecacheManifest};
pub use storage::{CacheStorage, Partition};
