//! Error taxonomy for snapdiff operations.
//!
//! Library code returns [`Result`] over [`SnapError`]; the binary wraps these
//! in `anyhow` at the command boundary.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while resolving, synchronizing or comparing tracked files.
#[derive(Error, Debug)]
pub enum SnapError {
    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A filter pattern failed to compile.
    #[error("Invalid regular expression '{pattern}' in [{section}]: {source}")]
    InvalidPattern {
        /// Config section the pattern came from
        section: &'static str,
        /// The offending pattern text
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Resolution produced no files at all.
    #[error(
        "Nothing to compare: the tracked-paths list is empty or no files match the path filter"
    )]
    EmptyNodeSet,

    /// One or more tracked roots are neither a file nor a directory.
    #[error("File or directory doesn't exist: {}", join_paths(.roots))]
    PathResolution {
        /// Roots that could not be resolved
        roots: Vec<PathBuf>,
    },

    /// A single file could not be copied into the repository.
    #[error("Failed to copy {} to {}: {source}", .source_path.display(), .destination.display())]
    Copy {
        /// File being copied
        source_path: PathBuf,
        /// Destination inside the repository
        destination: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A required directory could not be created, even after a retry.
    #[error("Directory path '{}' is invalid or access to the directory is denied: {source}", .path.display())]
    DirectoryCreation {
        /// Directory that could not be created
        path: PathBuf,
        /// Error from the final attempt
        #[source]
        source: io::Error,
    },

    /// The repository is in use by another invocation.
    #[error("Repository is locked: {0}")]
    Lock(String),

    /// Node manifest could not be parsed.
    #[error("Failed to parse node manifest: {0}")]
    ManifestDecode(#[from] toml::de::Error),

    /// Node manifest could not be serialized.
    #[error("Failed to serialize node manifest: {0}")]
    ManifestEncode(#[from] toml::ser::Error),

    /// Any other filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SnapError {
    /// Build a [`SnapError::Copy`] for `source_path` → `destination`.
    pub fn copy(source_path: &Path, destination: &Path, source: io::Error) -> Self {
        Self::Copy {
            source_path: source_path.to_path_buf(),
            destination: destination.to_path_buf(),
            source,
        }
    }

    /// Whether this error only affects a single file and should be collected
    /// rather than abort the batch.
    #[must_use]
    pub const fn is_per_file(&self) -> bool {
        matches!(self, Self::Copy { .. })
    }
}

/// Specialized Result type for snapdiff operations
pub type Result<T> = std::result::Result<T, SnapError>;

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}
