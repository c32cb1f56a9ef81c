// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Simple counters cannot overflow
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # snapdiff - snapshot and compare files outside version control
//!
//! snapdiff copies a user-defined set of files into a snapshot repository and
//! later compares the live files against that snapshot, producing a
//! categorized HTML change report (changed, removed, new, missing) with
//! per-file diffs.
//!
//! ## Architecture
//!
//! - [`filter`]: Regex path filters deciding what is tracked and what gets a diff
//! - [`tracking`]: Node resolution from the tracked-paths list, node manifest
//! - [`storage`]: The repository store mirroring tracked files
//! - [`sync`]: Snapshot phase
//! - [`compare`]: Compare phase and change classification
//! - [`diff`]: HTML diff fragments
//! - [`report`]: The HTML change report
//! - [`config`]: Configuration parsing and validation
//! - [`commands`]: CLI command implementations
//!
//! ## Example Usage
//!
//! ```no_run
//! use snapdiff::SnapContext;
//! use snapdiff::tracking::UnresolvedPolicy;
//!
//! # fn main() -> snapdiff::Result<()> {
//! let ctx = SnapContext::new(None)?;
//!
//! let nodes = ctx.resolve()?.into_node_set(UnresolvedPolicy::Abort)?;
//! ctx.sync(&nodes)?;
//!
//! // ... later
//! let comparison = ctx.compare(&ctx.previous_nodes(UnresolvedPolicy::Abort)?)?;
//! println!("{} changed", comparison.changed.len());
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Compare phase: classify live files against the snapshot.
pub mod compare;

/// Configuration parsing, validation, and management.
pub mod config;

/// HTML diff rendering and binary detection.
pub mod diff;

/// Error types.
pub mod error;

/// Regex path filters.
pub mod filter;

/// Repository locking for sync and compare.
pub mod lock;

/// Output formatting and progress display.
pub mod output;

/// HTML change report.
pub mod report;

/// Repository store and file operations.
pub mod storage;

/// Snapshot phase.
pub mod sync;

/// Node model, resolution and manifest.
pub mod tracking;

/// Utility functions and helpers.
pub mod utils;

pub use error::{Result, SnapError};

use compare::{Comparison, ComparisonEngine};
use diff::{DiffRenderer, HtmlDiffConfig};
use filter::{DiffFilter, PathFilter};
use std::path::{Path, PathBuf};
use storage::RepositoryStore;
use sync::{SyncEngine, SyncReport};
use tracing::warn;
use tracking::{NodeManifest, NodeResolver, NodeSet, Resolution, UnresolvedPolicy};
use utils::paths::make_absolute;

/// Current version of the snapdiff binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "SNAPDIFF_CONFIG_PATH";

/// Configuration file path relative to the platform config directory.
pub const DEFAULT_CONFIG_PATH: &str = "snapdiff/config.toml";

/// Central context for all snapdiff operations.
///
/// Holds the loaded configuration together with the absolute locations
/// derived from it. Relative paths in the configuration resolve against the
/// directory containing the configuration file.
///
/// # Examples
///
/// ```no_run
/// use snapdiff::SnapContext;
/// use snapdiff::config::Config;
///
/// # fn main() -> snapdiff::Result<()> {
/// // Default location (flag, then SNAPDIFF_CONFIG_PATH, then the config dir)
/// let ctx = SnapContext::new(None)?;
///
/// // Explicit configuration value (for testing)
/// let ctx = SnapContext::new_explicit(Config::default(), "/tmp/snap/config.toml".into())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SnapContext {
    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,

    /// Absolute repository root.
    pub repo_path: PathBuf,

    /// Absolute path of the tracked-paths list.
    pub nodes_list: PathBuf,

    /// Directory relative tracked roots resolve against.
    pub base_dir: PathBuf,

    /// Whether to run in non-interactive mode (no prompts).
    pub non_interactive: bool,
}

impl SnapContext {
    /// Load the configuration and build a context.
    ///
    /// The configuration path is `config_path` if given, otherwise
    /// `$SNAPDIFF_CONFIG_PATH`, otherwise `<config dir>/snapdiff/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration path can be determined or the
    /// configuration cannot be loaded.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = resolve_config_path(config_path)?;
        let config = config::Config::load(&config_path)?;
        Self::new_explicit(config, config_path)
    }

    /// Build a context from an already loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn new_explicit(config: config::Config, config_path: PathBuf) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let config_path = make_absolute(&config_path, &cwd);
        let base_dir = config_path
            .parent()
            .map_or_else(|| cwd.clone(), Path::to_path_buf);

        let repo_path = make_absolute(&config.repository.repo_path, &base_dir);
        let nodes_list = make_absolute(&config.repository.nodes_list, &base_dir);

        Ok(Self {
            config_path,
            config,
            repo_path,
            nodes_list,
            base_dir,
            non_interactive: false,
        })
    }

    /// Repository store for the configured layout
    #[must_use]
    pub fn store(&self) -> RepositoryStore {
        RepositoryStore::new(
            self.repo_path.clone(),
            self.config.repository.diff_dir_name(),
            self.config.repository.report_dir_name(),
        )
    }

    /// # Errors
    ///
    /// Returns an error if a path filter pattern is invalid.
    pub fn resolver(&self) -> Result<NodeResolver> {
        let filter = PathFilter::from_config(&self.config.path_filter)?;
        let store = self.store();
        Ok(NodeResolver::new(filter, self.base_dir.clone())
            .follow_symlinks(self.config.tracking.follow_symlinks)
            .exclude(store.root().to_path_buf())
            .exclude(store.lock_path()))
    }

    /// # Errors
    ///
    /// Returns an error if a diff filter pattern is invalid.
    pub fn diff_filter(&self) -> Result<DiffFilter> {
        DiffFilter::from_config(&self.config.diff_filter)
    }

    #[must_use]
    pub fn renderer(&self) -> DiffRenderer {
        DiffRenderer::new(HtmlDiffConfig::from(&self.config.diff))
    }

    /// Resolve the tracked-paths list.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter is invalid or the list cannot be read.
    pub fn resolve(&self) -> Result<Resolution> {
        self.resolver()?.resolve_list_file(&self.nodes_list)
    }

    /// Node set the current snapshot was taken from.
    ///
    /// Falls back to a fresh resolution when no snapshot manifest exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is unreadable or, on fallback, if
    /// resolution fails under `policy`.
    pub fn previous_nodes(&self, policy: UnresolvedPolicy) -> Result<NodeSet> {
        self.previous_nodes_with(|_| Ok(policy))
    }

    /// Same as [`SnapContext::previous_nodes`], asking `decide` what to do
    /// with unresolved roots.
    ///
    /// `decide` runs only on fallback and only if some roots are unresolved.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is unreadable, resolution fails, or
    /// `decide` fails.
    pub fn previous_nodes_with<F, E>(&self, decide: F) -> std::result::Result<NodeSet, E>
    where
        F: FnOnce(&[PathBuf]) -> std::result::Result<UnresolvedPolicy, E>,
        E: From<SnapError>,
    {
        if let Some(manifest) = NodeManifest::load(&self.repo_path)? {
            return Ok(manifest.nodes);
        }

        warn!(repo = %self.repo_path.display(), "No snapshot manifest, using fresh resolution");
        let resolution = self.resolve()?;
        let policy = if resolution.unresolved.is_empty() {
            UnresolvedPolicy::Ignore
        } else {
            decide(&resolution.unresolved)?
        };
        Ok(resolution.into_node_set(policy)?)
    }

    /// Snapshot `nodes` into the repository.
    ///
    /// # Errors
    ///
    /// See [`SyncEngine::sync`].
    pub fn sync(&self, nodes: &NodeSet) -> Result<SyncReport> {
        SyncEngine::new(&self.store()).sync(nodes)
    }

    /// Compare `previous` against the live files and write the report.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracked-paths list cannot be re-resolved, a
    /// filter is invalid, or the compare run fails.
    pub fn compare(&self, previous: &NodeSet) -> Result<Comparison> {
        self.compare_with_progress(previous, |_| {})
    }

    /// Same as [`SnapContext::compare`] with a progress callback.
    ///
    /// # Errors
    ///
    /// See [`SnapContext::compare`].
    pub fn compare_with_progress<F>(&self, previous: &NodeSet, on_progress: F) -> Result<Comparison>
    where
        F: FnMut(usize),
    {
        let fresh = self.fresh_nodes()?;
        let store = self.store();
        let diff_filter = self.diff_filter()?;
        ComparisonEngine::new(&store, &diff_filter, self.renderer())
            .compare_with_progress(previous, &fresh.nodes, on_progress)
    }

    /// Re-resolution used to detect new files. Unresolved roots are only logged.
    fn fresh_nodes(&self) -> Result<Resolution> {
        let resolution = self.resolve()?;
        for root in &resolution.unresolved {
            warn!(root = %root.display(), "Tracked root no longer resolves");
        }
        Ok(resolution)
    }
}

/// Configuration path from `explicit`, `$SNAPDIFF_CONFIG_PATH` or the
/// platform config directory, in that order.
///
/// # Errors
///
/// Returns [`SnapError::Configuration`] if no config directory exists.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV)
        && !path.is_empty()
    {
        return Ok(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|dir| dir.join(DEFAULT_CONFIG_PATH))
        .ok_or_else(|| {
            SnapError::Configuration(format!(
                "Could not determine the configuration directory; pass --config or set {CONFIG_PATH_ENV}"
            ))
        })
}
