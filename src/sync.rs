//! Snapshot phase: copy every node into the repository.
//!
//! A sync always starts from an empty repository, so the snapshot never holds
//! files from an earlier node set. Per-file copy failures are collected in the
//! [`SyncReport`]; anything else aborts the run.

use crate::error::{Result, SnapError};
use crate::lock::{OperationType, RepositoryLock};
use crate::storage::RepositoryStore;
use crate::tracking::{Node, NodeManifest, NodeSet};
use tracing::{debug, info, warn};

/// A node that could not be copied
#[derive(Debug)]
pub struct CopyFailure {
    pub node: Node,
    pub error: SnapError,
}

/// Outcome of a sync run
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Number of files copied into the repository
    pub copied: usize,
    /// Files that failed to copy; they will show up as missing on compare
    pub failed: Vec<CopyFailure>,
}

impl SyncReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Copies a node set into a [`RepositoryStore`]
pub struct SyncEngine<'a> {
    store: &'a RepositoryStore,
}

impl<'a> SyncEngine<'a> {
    #[must_use]
    pub const fn new(store: &'a RepositoryStore) -> Self {
        Self { store }
    }

    /// Replace the snapshot with copies of `nodes`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The repository is locked by another invocation
    /// - The repository cannot be wiped or recreated
    /// - A directory cannot be created after a retry
    /// - The node manifest cannot be written
    pub fn sync(&self, nodes: &NodeSet) -> Result<SyncReport> {
        self.sync_with_progress(nodes, |_| {})
    }

    /// Same as [`SyncEngine::sync`], calling `on_progress` with the number of
    /// processed nodes after each one.
    ///
    /// # Errors
    ///
    /// See [`SyncEngine::sync`].
    pub fn sync_with_progress<F>(&self, nodes: &NodeSet, mut on_progress: F) -> Result<SyncReport>
    where
        F: FnMut(usize),
    {
        let span = tracing::info_span!("sync", root = %self.store.root().display(), nodes = nodes.len());
        let _enter = span.enter();

        let _lock = RepositoryLock::acquire(&self.store.lock_path(), OperationType::Sync)?;
        self.store.reset()?;

        let mut report = SyncReport::default();

        for (index, node) in nodes.iter().enumerate() {
            match self.store.store(node) {
                Ok(bytes) => {
                    debug!(source = %node.source_path.display(), bytes, "Copied");
                    report.copied += 1;
                }
                Err(error) if error.is_per_file() => {
                    warn!(source = %node.source_path.display(), %error, "Copy failed");
                    report.failed.push(CopyFailure {
                        node: node.clone(),
                        error,
                    });
                }
                Err(error) => return Err(error),
            }
            on_progress(index + 1);
        }

        NodeManifest::new(nodes.clone()).save(self.store.root())?;

        info!(
            copied = report.copied,
            failed = report.failed.len(),
            "Sync complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::manifest::MANIFEST_FILE;
    use anyhow::Result;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> Result<(TempDir, RepositoryStore, NodeSet)> {
        let temp = TempDir::new()?;
        let src = temp.path().join("src");
        fs::create_dir_all(&src)?;
        fs::write(src.join("a.txt"), "alpha")?;
        fs::write(src.join("b.txt"), "beta")?;

        let store = RepositoryStore::new(temp.path().join("repo"), "__diff", "__report");
        let nodes = NodeSet::new(vec![
            Node::from_source(src.join("a.txt")),
            Node::from_source(src.join("b.txt")),
        ]);
        Ok((temp, store, nodes))
    }

    #[test]
    fn test_sync_copies_every_node() -> Result<()> {
        let (_temp, store, nodes) = setup()?;

        let report = SyncEngine::new(&store).sync(&nodes)?;
        assert_eq!(report.copied, 2);
        assert!(report.is_complete());
        for node in &nodes {
            assert!(store.contains(node));
        }
        assert!(store.root().join(MANIFEST_FILE).is_file());
        Ok(())
    }

    #[test]
    fn test_sync_replaces_previous_snapshot() -> Result<()> {
        let (_temp, store, nodes) = setup()?;
        SyncEngine::new(&store).sync(&nodes)?;

        let only_a = NodeSet::new(vec![nodes.as_slice()[0].clone()]);
        SyncEngine::new(&store).sync(&only_a)?;

        assert!(store.contains(&nodes.as_slice()[0]));
        assert!(!store.contains(&nodes.as_slice()[1]));
        Ok(())
    }

    #[test]
    fn test_copy_failures_are_collected() -> Result<()> {
        let (temp, store, nodes) = setup()?;
        let mut with_ghost = nodes.as_slice().to_vec();
        with_ghost.insert(1, Node::from_source(temp.path().join("src/ghost.txt")));

        let report = SyncEngine::new(&store).sync(&NodeSet::new(with_ghost))?;
        assert_eq!(report.copied, 2);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].node.source_path.ends_with("ghost.txt"));
        Ok(())
    }

    #[test]
    fn test_progress_reports_each_node() -> Result<()> {
        let (_temp, store, nodes) = setup()?;
        let mut seen = Vec::new();

        SyncEngine::new(&store).sync_with_progress(&nodes, |done| seen.push(done))?;
        assert_eq!(seen, vec![1, 2]);
        Ok(())
    }

    #[test]
    fn test_sync_fails_while_locked() -> Result<()> {
        let (_temp, store, nodes) = setup()?;
        let _held = RepositoryLock::acquire(&store.lock_path(), OperationType::Compare)?;

        let err = SyncEngine::new(&store).sync(&nodes).unwrap_err();
        assert!(matches!(err, SnapError::Lock(_)));
        Ok(())
    }
}
