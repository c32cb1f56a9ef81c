//! Compare phase: reconcile the snapshot against the live filesystem.
//!
//! Every previously snapshotted node lands in exactly one of unchanged,
//! changed, removed or missing. Nodes that resolve now but were not part of
//! the snapshot are reported as new. Failing to read a source is a
//! classification, not an error.

use crate::diff::DiffRenderer;
use crate::error::Result;
use crate::filter::DiffFilter;
use crate::lock::{OperationType, RepositoryLock};
use crate::report;
use crate::storage::{RepositoryStore, files_identical};
use crate::tracking::{Node, NodeSet};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A file whose content differs from its snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub source_path: PathBuf,
    pub snapshot_path: PathBuf,
    /// Copy of the current content inside `<diff_dir>`
    pub current_copy: Option<PathBuf>,
    /// Rendered diff fragment, if the diff filter accepted it
    pub diff_path: Option<PathBuf>,
}

/// A snapshotted file whose source can no longer be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedFile {
    pub source_path: PathBuf,
    pub snapshot_path: PathBuf,
}

/// Classified outcome of a compare run, in node set order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    pub changed: Vec<ChangedFile>,
    pub removed: Vec<RemovedFile>,
    /// Files tracked now that were not part of the snapshot
    pub new: Vec<PathBuf>,
    /// Files that exist neither as source nor as snapshot
    pub missing: Vec<PathBuf>,
    /// Path of the written report
    pub report_path: Option<PathBuf>,
}

impl Comparison {
    /// Whether nothing changed since the snapshot
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.changed.is_empty()
            && self.removed.is_empty()
            && self.new.is_empty()
            && self.missing.is_empty()
    }
}

/// How one previously snapshotted node compares to its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Unchanged,
    Changed,
    Removed,
    Missing,
}

/// Compares a snapshot against current sources
pub struct ComparisonEngine<'a> {
    store: &'a RepositoryStore,
    diff_filter: &'a DiffFilter,
    renderer: DiffRenderer,
}

impl<'a> ComparisonEngine<'a> {
    #[must_use]
    pub const fn new(
        store: &'a RepositoryStore,
        diff_filter: &'a DiffFilter,
        renderer: DiffRenderer,
    ) -> Self {
        Self {
            store,
            diff_filter,
            renderer,
        }
    }

    /// Classify one node without touching the diff area.
    #[must_use]
    pub fn classify(&self, node: &Node) -> Classification {
        let snapshot = self.store.snapshot_path(node);
        match files_identical(&node.source_path, &snapshot) {
            Ok(true) => Classification::Unchanged,
            Ok(false) => Classification::Changed,
            Err(e) => {
                debug!(source = %node.source_path.display(), error = %e, "Comparison impossible");
                if snapshot.is_file() {
                    Classification::Removed
                } else {
                    Classification::Missing
                }
            }
        }
    }

    /// Compare `previous` against the sources and write the report.
    ///
    /// `fresh` is the node set resolved right now; entries absent from
    /// `previous` are reported as new.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The repository is locked by another invocation
    /// - The diff area cannot be wiped or recreated
    /// - The report cannot be written
    pub fn compare(&self, previous: &NodeSet, fresh: &[Node]) -> Result<Comparison> {
        self.compare_with_progress(previous, fresh, |_| {})
    }

    /// Same as [`ComparisonEngine::compare`], calling `on_progress` with the
    /// number of processed nodes after each one.
    ///
    /// # Errors
    ///
    /// See [`ComparisonEngine::compare`].
    pub fn compare_with_progress<F>(
        &self,
        previous: &NodeSet,
        fresh: &[Node],
        mut on_progress: F,
    ) -> Result<Comparison>
    where
        F: FnMut(usize),
    {
        let span = tracing::info_span!("compare", root = %self.store.root().display(), nodes = previous.len());
        let _enter = span.enter();

        let _lock = RepositoryLock::acquire(&self.store.lock_path(), OperationType::Compare)?;
        self.store.reset_diff_area()?;

        let mut comparison = Comparison::default();

        for (index, node) in previous.iter().enumerate() {
            match self.classify(node) {
                Classification::Unchanged => {
                    debug!(source = %node.source_path.display(), "Unchanged");
                }
                Classification::Changed => {
                    debug!(source = %node.source_path.display(), "Changed");
                    comparison.changed.push(self.record_change(node));
                }
                Classification::Removed => {
                    debug!(source = %node.source_path.display(), "Removed");
                    comparison.removed.push(RemovedFile {
                        source_path: node.source_path.clone(),
                        snapshot_path: self.store.snapshot_path(node),
                    });
                }
                Classification::Missing => {
                    debug!(source = %node.source_path.display(), "Missing");
                    comparison.missing.push(node.source_path.clone());
                }
            }
            on_progress(index + 1);
        }

        let known: HashSet<&Node> = previous.iter().collect();
        comparison.new = fresh
            .iter()
            .filter(|node| !known.contains(node))
            .map(|node| node.source_path.clone())
            .collect();

        comparison.report_path = Some(report::write_report(self.store, &comparison)?);

        info!(
            changed = comparison.changed.len(),
            removed = comparison.removed.len(),
            new = comparison.new.len(),
            missing = comparison.missing.len(),
            "Compare complete"
        );
        Ok(comparison)
    }

    fn record_change(&self, node: &Node) -> ChangedFile {
        let snapshot_path = self.store.snapshot_path(node);

        let current_copy = match self.store.store_diff_copy(node) {
            Ok(path) => Some(path),
            Err(error) => {
                warn!(source = %node.source_path.display(), %error, "Failed to copy changed file");
                None
            }
        };

        let fragment = self.store.fragment_path(node);
        let diff_path = if self.diff_filter.decide(&fragment) {
            match self
                .renderer
                .render_files(&snapshot_path, &node.source_path, &fragment)
            {
                Ok(()) => Some(fragment),
                Err(error) => {
                    warn!(source = %node.source_path.display(), %error, "Failed to render diff");
                    None
                }
            }
        } else {
            debug!(fragment = %fragment.display(), "Diff filtered out");
            None
        };

        ChangedFile {
            source_path: node.source_path.clone(),
            snapshot_path,
            current_copy,
            diff_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DiffFilterConfig, FilterMode, PatternList};
    use crate::sync::SyncEngine;
    use anyhow::Result;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        src: PathBuf,
        store: RepositoryStore,
    }

    impl Fixture {
        fn new() -> Result<Self> {
            let temp = TempDir::new()?;
            let src = temp.path().join("src");
            fs::create_dir_all(&src)?;
            fs::write(src.join("a.txt"), "alpha\n")?;
            fs::write(src.join("b.txt"), "beta\n")?;
            let store = RepositoryStore::new(temp.path().join("repo"), "__diff", "__report");
            Ok(Self {
                _temp: temp,
                src,
                store,
            })
        }

        fn node(&self, name: &str) -> Node {
            Node::from_source(self.src.join(name))
        }

        fn synced(&self) -> Result<NodeSet> {
            let nodes = NodeSet::new(vec![self.node("a.txt"), self.node("b.txt")]);
            SyncEngine::new(&self.store).sync(&nodes)?;
            Ok(nodes)
        }
    }

    #[test]
    fn test_unchanged_snapshot_is_clean() -> Result<()> {
        let fixture = Fixture::new()?;
        let nodes = fixture.synced()?;
        let filter = DiffFilter::default();
        let engine = ComparisonEngine::new(&fixture.store, &filter, DiffRenderer::default());

        let comparison = engine.compare(&nodes, nodes.as_slice())?;
        assert!(comparison.is_clean());
        assert!(comparison.report_path.is_some_and(|p| p.is_file()));
        Ok(())
    }

    #[test]
    fn test_modified_file_is_changed_with_diff() -> Result<()> {
        let fixture = Fixture::new()?;
        let nodes = fixture.synced()?;
        fs::write(fixture.src.join("a.txt"), "alpha v2\n")?;

        let filter = DiffFilter::default();
        let engine = ComparisonEngine::new(&fixture.store, &filter, DiffRenderer::default());
        let comparison = engine.compare(&nodes, nodes.as_slice())?;

        assert_eq!(comparison.changed.len(), 1);
        let changed = &comparison.changed[0];
        assert_eq!(changed.source_path, fixture.src.join("a.txt"));
        let copy = changed.current_copy.as_ref().expect("changed file copied");
        assert_eq!(fs::read_to_string(copy)?, "alpha v2\n");
        let diff = changed.diff_path.as_ref().expect("diff rendered");
        assert!(fs::read_to_string(diff)?.contains("+alpha v2"));
        Ok(())
    }

    #[test]
    fn test_removed_versus_missing() -> Result<()> {
        let fixture = Fixture::new()?;
        let nodes = fixture.synced()?;
        fs::remove_file(fixture.src.join("b.txt"))?;

        // Never synced and gone from disk
        let ghost = fixture.node("ghost.txt");
        let mut previous = nodes.as_slice().to_vec();
        previous.push(ghost.clone());

        let filter = DiffFilter::default();
        let engine = ComparisonEngine::new(&fixture.store, &filter, DiffRenderer::default());
        assert_eq!(engine.classify(&ghost), Classification::Missing);

        let comparison = engine.compare(&NodeSet::new(previous), &[])?;
        assert_eq!(comparison.removed.len(), 1);
        assert_eq!(comparison.removed[0].source_path, fixture.src.join("b.txt"));
        assert_eq!(comparison.missing, vec![ghost.source_path]);
        assert!(comparison.changed.is_empty());
        Ok(())
    }

    #[test]
    fn test_excluded_diff_keeps_changed_entry() -> Result<()> {
        let fixture = Fixture::new()?;
        let nodes = fixture.synced()?;
        fs::write(fixture.src.join("a.txt"), "x\n")?;
        fs::write(fixture.src.join("b.txt"), "y\n")?;

        let filter = DiffFilter::from_config(&DiffFilterConfig {
            mode: FilterMode::Search,
            patterns: PatternList::Ordered(vec!["_a_txt".into()]),
        })?;
        let engine = ComparisonEngine::new(&fixture.store, &filter, DiffRenderer::default());
        let comparison = engine.compare(&nodes, nodes.as_slice())?;

        assert_eq!(comparison.changed.len(), 2);
        assert!(comparison.changed[0].diff_path.is_some());
        assert!(comparison.changed[1].diff_path.is_none());
        Ok(())
    }

    #[test]
    fn test_new_nodes_follow_fresh_order() -> Result<()> {
        let fixture = Fixture::new()?;
        let nodes = fixture.synced()?;
        fs::write(fixture.src.join("c.txt"), "gamma\n")?;

        let fresh = vec![fixture.node("a.txt"), fixture.node("b.txt"), fixture.node("c.txt")];
        let filter = DiffFilter::default();
        let engine = ComparisonEngine::new(&fixture.store, &filter, DiffRenderer::default());
        let comparison = engine.compare(&nodes, &fresh)?;

        assert_eq!(comparison.new, vec![fixture.src.join("c.txt")]);
        assert!(comparison.changed.is_empty());
        Ok(())
    }

    #[test]
    fn test_compare_clears_previous_diff_area() -> Result<()> {
        let fixture = Fixture::new()?;
        let nodes = fixture.synced()?;
        let stale = fixture.store.diff_dir().join("stale.txt");
        fs::create_dir_all(fixture.store.diff_dir())?;
        fs::write(&stale, "old run")?;

        let filter = DiffFilter::default();
        ComparisonEngine::new(&fixture.store, &filter, DiffRenderer::default())
            .compare(&nodes, nodes.as_slice())?;
        assert!(!stale.exists());
        Ok(())
    }
}
