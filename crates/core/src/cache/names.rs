//! Versioned partition names and the precache manifest.

use serde::{Deserialize, Serialize};

/// Logical role of a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionRole {
    Static,
    Dynamic,
    Image,
}

/// The current-version partition names, one per role.
///
/// Any partition whose name is not an exact match for one of these is
/// evicted on activate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionNames {
    pub static_assets: String,
    pub dynamic: String,
    pub images: String,
}

impl PartitionNames {
    /// Build names of the form `{prefix}-{version}`.
    pub fn versioned(version: &str, static_prefix: &str, dynamic_prefix: &str, image_prefix: &str) -> Self {
        Self {
            static_assets: format!("{static_prefix}-{version}"),
            dynamic: format!("{dynamic_prefix}-{version}"),
            images: format!("{image_prefix}-{version}"),
        }
    }

    pub fn name_for(&self, role: PartitionRole) -> &str {
        match role {
            PartitionRole::Static => &self.static_assets,
            PartitionRole::Dynamic => &self.dynamic,
            PartitionRole::Image => &self.images,
        }
    }

    /// The current-version set.
    pub fn current(&self) -> [&str; 3] {
        [&self.static_assets, &self.dynamic, &self.images]
    }

    pub fn is_current(&self, name: &str) -> bool {
        self.current().contains(&name)
    }
}

/// Ordered list of resource paths populated into the static partition on install.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrecacheManifest(Vec<String>);

impl PrecacheManifest {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }

    pub fn paths(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
