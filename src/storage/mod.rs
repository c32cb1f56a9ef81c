//! The repository store: a mirrored directory tree holding the latest snapshot.
//!
//! ```text
//! <root>/                       mirrors tracked files by repo_path
//! <root>/.snapdiff-nodes.toml   node manifest
//! <root>/<diff_dir>/            copies of changed sources
//! <root>/<diff_dir>/<report>/   report.htm and diff fragments
//! ```

/// Low-level file operations used by the store
pub mod file_ops;

use crate::error::{Result, SnapError};
use crate::report::REPORT_FILE;
use crate::tracking::Node;
use crate::utils::paths::fragment_file_name;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use file_ops::{copy_preserving, create_dir_with_retry, files_identical, remove_dir_all_if_exists};

/// Addresses files inside a snapshot repository
#[derive(Debug, Clone)]
pub struct RepositoryStore {
    root: PathBuf,
    diff_dir: PathBuf,
    report_dir: PathBuf,
}

impl RepositoryStore {
    #[must_use]
    pub fn new(root: PathBuf, diff_dir: &str, report_dir: &str) -> Self {
        let diff_dir = root.join(diff_dir);
        let report_dir = diff_dir.join(report_dir);
        Self {
            root,
            diff_dir,
            report_dir,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn diff_dir(&self) -> &Path {
        &self.diff_dir
    }

    #[must_use]
    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    /// Sibling lock file guarding the repository
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.root.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Snapshot copy of `node`
    #[must_use]
    pub fn snapshot_path(&self, node: &Node) -> PathBuf {
        node.snapshot_path(&self.root)
    }

    /// Where a changed source is copied during compare
    #[must_use]
    pub fn diff_copy_path(&self, node: &Node) -> PathBuf {
        self.diff_dir.join(&node.repo_path)
    }

    /// Diff fragment for `node`
    #[must_use]
    pub fn fragment_path(&self, node: &Node) -> PathBuf {
        self.report_dir.join(fragment_file_name(&node.source_path))
    }

    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.report_dir.join(REPORT_FILE)
    }

    /// Whether a snapshot copy of `node` exists as a regular file
    #[must_use]
    pub fn contains(&self, node: &Node) -> bool {
        self.snapshot_path(node).is_file()
    }

    /// Wipe the whole repository and recreate an empty root.
    ///
    /// # Errors
    ///
    /// Returns an error if the old tree cannot be removed or the root cannot be
    /// created.
    pub fn reset(&self) -> Result<()> {
        debug!(root = %self.root.display(), "Wiping repository");
        remove_dir_all_if_exists(&self.root)?;
        create_dir_with_retry(&self.root)
    }

    /// Wipe and recreate `<diff_dir>` and its report directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the old tree cannot be removed or the directories
    /// cannot be created.
    pub fn reset_diff_area(&self) -> Result<()> {
        debug!(diff_dir = %self.diff_dir.display(), "Wiping diff area");
        remove_dir_all_if_exists(&self.diff_dir)?;
        create_dir_with_retry(&self.diff_dir)?;
        create_dir_with_retry(&self.report_dir)
    }

    /// Copy `node` into the snapshot tree.
    ///
    /// # Errors
    ///
    /// Returns [`SnapError::DirectoryCreation`] if the parent directory cannot
    /// be created and [`SnapError::Copy`] if the file itself fails to copy.
    pub fn store(&self, node: &Node) -> Result<u64> {
        copy_into(&node.source_path, &self.snapshot_path(node))
    }

    /// Copy the current version of a changed `node` into `<diff_dir>`.
    ///
    /// # Errors
    ///
    /// Same as [`RepositoryStore::store`].
    pub fn store_diff_copy(&self, node: &Node) -> Result<PathBuf> {
        let destination = self.diff_copy_path(node);
        copy_into(&node.source_path, &destination)?;
        Ok(destination)
    }
}

fn copy_into(source: &Path, destination: &Path) -> Result<u64> {
    if let Some(parent) = destination.parent() {
        create_dir_with_retry(parent)?;
    }
    copy_preserving(source, destination).map_err(|e| SnapError::copy(source, destination, e))
}
