use crate::utils::paths::repo_relative;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A tracked file and its location inside the repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Absolute path of the live file
    pub source_path: PathBuf,
    /// Path relative to the repository root
    pub repo_path: PathBuf,
}

impl Node {
    /// Build a node for an absolute source path.
    #[must_use]
    pub fn from_source(source_path: PathBuf) -> Self {
        let repo_path = repo_relative(&source_path);
        Self {
            source_path,
            repo_path,
        }
    }

    /// Location of this node's snapshot under `repo_root`
    #[must_use]
    pub fn snapshot_path(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.repo_path)
    }
}

/// Ordered sequence of nodes.
///
/// Order follows the tracked-paths list and, inside a directory, the walk
/// order. Duplicates from overlapping roots are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeSet(Vec<Node>);

impl NodeSet {
    #[must_use]
    pub const fn new(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Node] {
        &self.0
    }

    /// Nodes of `self` that are absent from `other`, in `self` order.
    #[must_use]
    pub fn difference<'a>(&'a self, other: &NodeSet) -> Vec<&'a Node> {
        let known: HashSet<&Node> = other.iter().collect();
        self.iter().filter(|node| !known.contains(node)).collect()
    }
}

impl From<Vec<Node>> for NodeSet {
    fn from(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
