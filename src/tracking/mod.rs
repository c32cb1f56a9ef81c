//! Tracking: which files snapdiff snapshots and compares.
//!
//! # Architecture
//!
//! - [`Node`] / [`NodeSet`] - A tracked file and the ordered set of them
//! - [`NodeResolver`] - Expands the tracked-paths list into a node set
//! - [`NodeManifest`] - The node set a snapshot was taken from
//!
//! # Usage
//!
//! ```no_run
//! use snapdiff::filter::PathFilter;
//! use snapdiff::tracking::{NodeResolver, UnresolvedPolicy};
//! use std::path::{Path, PathBuf};
//!
//! # fn main() -> snapdiff::Result<()> {
//! let resolver = NodeResolver::new(PathFilter::include_all(), PathBuf::from("/srv"));
//! let nodes = resolver
//!     .resolve_list_file(Path::new("/srv/nodes.txt"))?
//!     .into_node_set(UnresolvedPolicy::Abort)?;
//! # Ok(())
//! # }
//! ```

pub mod manifest;
pub mod node;
pub mod resolver;

pub use manifest::NodeManifest;
pub use node::{Node, NodeSet};
pub use resolver::{NodeResolver, Resolution, UnresolvedPolicy};
