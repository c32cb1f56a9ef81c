//! Node resolution: turns the tracked-paths list into a [`NodeSet`].
//!
//! Each root is cleaned, made absolute against the base directory, and then
//! either emitted as a single node (regular file), walked recursively
//! (directory), or recorded as unresolved. The resolver never prompts; what to
//! do with unresolved roots is up to the caller.

use crate::error::{Result, SnapError};
use crate::filter::PathFilter;
use crate::tracking::node::{Node, NodeSet};
use crate::utils::paths::{make_absolute, trim_root_line};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// What to do when some tracked roots do not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedPolicy {
    /// Fail with [`SnapError::PathResolution`]
    Abort,
    /// Drop the unresolved roots and continue
    Ignore,
}

/// Outcome of resolving a list of roots
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Resolved nodes in list order
    pub nodes: Vec<Node>,
    /// Roots that are neither a regular file nor a directory
    pub unresolved: Vec<PathBuf>,
}

impl Resolution {
    /// Turn the resolution into a node set.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Some roots are unresolved and `policy` is [`UnresolvedPolicy::Abort`]
    /// - No nodes were resolved at all
    pub fn into_node_set(self, policy: UnresolvedPolicy) -> Result<NodeSet> {
        if !self.unresolved.is_empty() {
            match policy {
                UnresolvedPolicy::Abort => {
                    return Err(SnapError::PathResolution {
                        roots: self.unresolved,
                    });
                }
                UnresolvedPolicy::Ignore => {
                    for root in &self.unresolved {
                        warn!(root = %root.display(), "Ignoring unresolved root");
                    }
                }
            }
        }

        if self.nodes.is_empty() {
            return Err(SnapError::EmptyNodeSet);
        }

        Ok(NodeSet::new(self.nodes))
    }
}

/// Expands tracked roots into nodes
#[derive(Debug, Clone)]
pub struct NodeResolver {
    filter: PathFilter,
    base_dir: PathBuf,
    follow_symlinks: bool,
    /// Paths never resolved, together with everything below them
    excluded: Vec<PathBuf>,
}

impl NodeResolver {
    /// Create a resolver.
    ///
    /// `base_dir` must be absolute; relative roots are resolved against it.
    #[must_use]
    pub fn new(filter: PathFilter, base_dir: PathBuf) -> Self {
        Self {
            filter,
            base_dir,
            follow_symlinks: false,
            excluded: Vec::new(),
        }
    }

    /// Never resolve `path` or anything below it.
    ///
    /// Used for the repository root and its lock file so a tracked parent
    /// directory does not feed the snapshot back into itself.
    #[must_use]
    pub fn exclude(mut self, path: PathBuf) -> Self {
        self.excluded.push(path);
        self
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.iter().any(|excluded| path.starts_with(excluded))
    }

    /// Descend into symlinked directories while walking
    #[must_use]
    pub const fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Resolve raw root lines in order.
    pub fn resolve<I, S>(&self, roots: I) -> Resolution
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let span = tracing::debug_span!("resolve_nodes", base = %self.base_dir.display());
        let _enter = span.enter();

        let mut resolution = Resolution::default();

        for line in roots {
            let Some(root) = trim_root_line(line.as_ref()) else {
                continue;
            };
            let root = make_absolute(Path::new(root), &self.base_dir);

            if self.is_excluded(&root) {
                debug!(path = %root.display(), "Root lies inside the repository, skipped");
            } else if root.is_file() {
                if self.filter.decide(&root) {
                    debug!(path = %root.display(), "Resolved file");
                    resolution.nodes.push(Node::from_source(root));
                }
            } else if root.is_dir() {
                self.walk(&root, &mut resolution.nodes);
            } else {
                debug!(path = %root.display(), "Root is neither file nor directory");
                resolution.unresolved.push(root);
            }
        }

        info!(
            nodes = resolution.nodes.len(),
            unresolved = resolution.unresolved.len(),
            "Node resolution complete"
        );
        resolution
    }

    /// Read a tracked-paths list file and resolve its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read.
    pub fn resolve_list_file(&self, path: &Path) -> Result<Resolution> {
        if !path.is_file() {
            return Err(SnapError::Configuration(format!(
                "Tracked-paths list '{}' doesn't exist",
                path.display()
            )));
        }

        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(self.resolve(content.lines()))
    }

    fn walk(&self, dir: &Path, nodes: &mut Vec<Node>) {
        let walker = WalkDir::new(dir)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry.path()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let file_type = entry.file_type();
            let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }

            let path = entry.into_path();
            if self.filter.decide(&path) {
                debug!(path = %path.display(), "Resolved file");
                nodes.push(Node::from_source(path));
            }
        }
    }
}
