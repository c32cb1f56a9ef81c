//! Diff rendering for changed files.
//!
//! Changed text files are rendered as standalone HTML pages with a line diff;
//! binary files get a short notice instead.

/// Binary content detection
pub mod binary;
/// HTML diff fragments
pub mod html;

pub use binary::is_binary;
pub use html::{DiffRenderer, HtmlDiffConfig, render_html_diff};

use crate::config::{DiffAlgorithm, DiffConfig};
use similar::Algorithm;

/// Convert `DiffAlgorithm` config enum to `similar::Algorithm`
#[must_use]
pub const fn config_to_algorithm(algo: DiffAlgorithm) -> Algorithm {
    match algo {
        DiffAlgorithm::Myers => Algorithm::Myers,
        DiffAlgorithm::Patience => Algorithm::Patience,
    }
}

impl From<&DiffConfig> for HtmlDiffConfig {
    fn from(config: &DiffConfig) -> Self {
        Self {
            context_lines: config.context_lines,
            algorithm: config_to_algorithm(config.algorithm),
        }
    }
}
