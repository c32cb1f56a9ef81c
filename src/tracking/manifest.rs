//! Node manifest stored inside the repository after each sync.
//!
//! The manifest records the exact node set a snapshot was taken from, so a
//! later `compare` (possibly in a different process) can classify against it
//! instead of against a fresh resolution.

use crate::error::{Result, SnapError};
use crate::tracking::node::NodeSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name for the node manifest, relative to the repository root
pub const MANIFEST_FILE: &str = ".snapdiff-nodes.toml";

/// Snapshot metadata persisted next to the mirrored files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeManifest {
    /// Format version for future compatibility
    pub version: u32,
    /// When the snapshot was taken
    pub synced_at: DateTime<Utc>,
    /// Nodes the snapshot was taken from
    pub nodes: NodeSet,
}

impl NodeManifest {
    /// Current manifest format version
    const CURRENT_VERSION: u32 = 1;

    /// Manifest for `nodes`, stamped with the current time
    #[must_use]
    pub fn new(nodes: NodeSet) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            synced_at: Utc::now(),
            nodes,
        }
    }

    /// Save the manifest into `repo_root`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A path cannot be represented in TOML
    /// - Cannot write to the file
    pub fn save(&self, repo_root: &Path) -> Result<()> {
        let data = toml::to_string(self)?;
        std::fs::write(repo_root.join(MANIFEST_FILE), data)?;
        Ok(())
    }

    /// Load the manifest from `repo_root`.
    ///
    /// Returns `None` if no snapshot has been taken yet.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot read the file (except if it doesn't exist)
    /// - Cannot deserialize the manifest
    /// - The manifest was written by a newer version
    pub fn load(repo_root: &Path) -> Result<Option<Self>> {
        let manifest_path = repo_root.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Ok(None);
        }

        let data = std::fs::read_to_string(&manifest_path)?;
        let manifest: Self = toml::from_str(&data)?;

        if manifest.version > Self::CURRENT_VERSION {
            return Err(SnapError::Configuration(format!(
                "Node manifest version {} is newer than supported version {}. Please upgrade snapdiff.",
                manifest.version,
                Self::CURRENT_VERSION
            )));
        }

        Ok(Some(manifest))
    }
}
