pub mod parser;
pub mod validator;

use crate::error::{Result, SnapError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Parsed `snapdiff` configuration.
///
/// Loaded once at startup and handed to [`crate::SnapContext`]; nothing reads
/// configuration from global state.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Decides which files enter the tracked node set
    #[serde(default)]
    pub path_filter: PathFilterConfig,

    /// Decides which changed files get a rendered diff
    #[serde(default)]
    pub diff_filter: DiffFilterConfig,

    #[serde(default)]
    pub diff: DiffConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Root of the snapshot repository (relative paths resolve against the config file)
    #[serde(default = "default_repo_path")]
    pub repo_path: PathBuf,
    /// Per-run output directory inside the repository
    #[serde(default = "default_diff_dir")]
    pub diff_dir: String,
    /// Report directory inside `diff_dir`
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
    /// Text file listing tracked files and directories, one per line
    #[serde(default = "default_nodes_list")]
    pub nodes_list: PathBuf,
}

/// How a filter applies its patterns to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// No filtering
    #[default]
    None,
    /// Pattern must match at the start of the path
    Match,
    /// Pattern may match anywhere in the path
    Search,
}

/// What a matching path filter pattern means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    #[default]
    Include,
    Exclude,
}

/// How multiple path filter patterns combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PatternPolicy {
    /// Only the first pattern decides (order-sensitive)
    #[default]
    FirstPattern,
    /// Any matching pattern counts as a match
    AnyPattern,
}

/// Regex patterns, either as an ordered array or as a table of named patterns.
///
/// Named patterns are evaluated in key order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PatternList {
    Ordered(Vec<String>),
    Named(BTreeMap<String, String>),
}

impl Default for PatternList {
    fn default() -> Self {
        Self::Ordered(Vec::new())
    }
}

impl PatternList {
    /// Patterns in evaluation order
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            Self::Ordered(list) => list.iter().map(String::as_str).collect(),
            Self::Named(map) => map.values().map(String::as_str).collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Ordered(list) => list.is_empty(),
            Self::Named(map) => map.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PathFilterConfig {
    #[serde(default)]
    pub mode: FilterMode,
    #[serde(default)]
    pub action: FilterAction,
    #[serde(default)]
    pub policy: PatternPolicy,
    #[serde(default)]
    pub patterns: PatternList,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DiffFilterConfig {
    #[serde(default)]
    pub mode: FilterMode,
    #[serde(default)]
    pub patterns: PatternList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    #[default]
    Myers,
    Patience,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffConfig {
    /// Unchanged lines shown around each change
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
    #[serde(default)]
    pub algorithm: DiffAlgorithm,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TrackingConfig {
    /// Descend into symlinked directories while walking tracked roots
    #[serde(default)]
    pub follow_symlinks: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportConfig {
    /// Open the generated report in the platform viewer after `compare`
    #[serde(default = "default_open_report")]
    pub open: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            repo_path: default_repo_path(),
            diff_dir: default_diff_dir(),
            report_dir: default_report_dir(),
            nodes_list: default_nodes_list(),
        }
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
            algorithm: DiffAlgorithm::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            open: default_open_report(),
        }
    }
}

impl RepositoryConfig {
    /// `diff_dir` with surrounding separators removed
    #[must_use]
    pub fn diff_dir_name(&self) -> &str {
        trim_separators(&self.diff_dir)
    }

    /// `report_dir` with surrounding separators removed
    #[must_use]
    pub fn report_dir_name(&self) -> &str {
        trim_separators(&self.report_dir)
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist
    /// - The file cannot be read or is not valid UTF-8
    /// - The file contains invalid TOML or fails validation
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SnapError::Configuration(format!(
                "Config file '{}' doesn't exist. Run 'snapdiff init' to create one.",
                path.display()
            )));
        }

        parser::parse_config_file(path)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self).map_err(|e| {
            SnapError::Configuration(format!("Failed to serialize configuration: {e}"))
        })?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }
}

fn trim_separators(value: &str) -> &str {
    value.trim().trim_matches(|c| c == '/' || c == '\\')
}

// Default functions for serde
fn default_repo_path() -> PathBuf {
    PathBuf::from("repo")
}

fn default_diff_dir() -> String {
    "__diff".to_string()
}

fn default_report_dir() -> String {
    "__report".to_string()
}

fn default_nodes_list() -> PathBuf {
    PathBuf::from("nodes.txt")
}

const fn default_context_lines() -> usize {
    3
}

const fn default_open_report() -> bool {
    true
}
