//! Regex-based path filters.
//!
//! Two independent filters exist: the [`PathFilter`] decides which files are
//! tracked at all, the [`DiffFilter`] decides which changed files get a
//! rendered diff fragment.

use crate::config::{DiffFilterConfig, FilterAction, FilterMode, PathFilterConfig, PatternPolicy};
use crate::error::{Result, SnapError};
use regex::Regex;
use std::path::Path;

/// An ordered list of compiled patterns sharing one match mode.
#[derive(Debug, Clone)]
struct PatternSet {
    mode: FilterMode,
    regexes: Vec<Regex>,
}

impl PatternSet {
    fn compile(section: &'static str, mode: FilterMode, patterns: &[&str]) -> Result<Self> {
        let regexes = patterns
            .iter()
            .map(|pattern| {
                let source = match mode {
                    FilterMode::Match => format!(r"\A(?:{pattern})"),
                    FilterMode::None | FilterMode::Search => (*pattern).to_string(),
                };
                Regex::new(&source).map_err(|source| SnapError::InvalidPattern {
                    section,
                    pattern: (*pattern).to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { mode, regexes })
    }

    fn first_matches(&self, text: &str) -> Option<bool> {
        self.regexes.first().map(|re| re.is_match(text))
    }

    fn any_matches(&self, text: &str) -> bool {
        self.regexes.iter().any(|re| re.is_match(text))
    }
}

/// Decides whether a path enters the tracked node set.
#[derive(Debug, Clone)]
pub struct PathFilter {
    patterns: PatternSet,
    action: FilterAction,
    policy: PatternPolicy,
}

impl PathFilter {
    /// Compile a filter from its configuration section.
    ///
    /// Patterns are compiled even when `mode = none` so that a typo is
    /// reported regardless of the active mode.
    ///
    /// # Errors
    ///
    /// Returns [`SnapError::InvalidPattern`] if any pattern fails to compile.
    pub fn from_config(config: &PathFilterConfig) -> Result<Self> {
        Ok(Self {
            patterns: PatternSet::compile(
                "path_filter",
                config.mode,
                &config.patterns.patterns(),
            )?,
            action: config.action,
            policy: config.policy,
        })
    }

    /// A filter that accepts every path
    #[must_use]
    pub fn include_all() -> Self {
        Self {
            patterns: PatternSet {
                mode: FilterMode::None,
                regexes: Vec::new(),
            },
            action: FilterAction::Include,
            policy: PatternPolicy::FirstPattern,
        }
    }

    /// Returns `true` when `path` should be tracked.
    #[must_use]
    pub fn decide(&self, path: &Path) -> bool {
        if self.patterns.mode == FilterMode::None {
            return true;
        }

        let text = path.to_string_lossy();
        let matched = match self.policy {
            PatternPolicy::FirstPattern => match self.patterns.first_matches(&text) {
                Some(matched) => matched,
                // Nothing configured to match against
                None => return true,
            },
            PatternPolicy::AnyPattern => {
                if self.patterns.regexes.is_empty() {
                    return true;
                }
                self.patterns.any_matches(&text)
            }
        };

        match self.action {
            FilterAction::Include => matched,
            FilterAction::Exclude => !matched,
        }
    }
}

/// Decides whether a changed file gets a rendered diff fragment.
#[derive(Debug, Clone)]
pub struct DiffFilter {
    patterns: PatternSet,
}

impl DiffFilter {
    /// # Errors
    ///
    /// Returns [`SnapError::InvalidPattern`] if any pattern fails to compile.
    pub fn from_config(config: &DiffFilterConfig) -> Result<Self> {
        Ok(Self {
            patterns: PatternSet::compile("diff_filter", config.mode, &config.patterns.patterns())?,
        })
    }

    /// Returns `true` when a diff should be rendered for `path`.
    #[must_use]
    pub fn decide(&self, path: &Path) -> bool {
        if self.patterns.mode == FilterMode::None {
            return true;
        }
        self.patterns.any_matches(&path.to_string_lossy())
    }
}

impl Default for DiffFilter {
    fn default() -> Self {
        Self {
            patterns: PatternSet {
                mode: FilterMode::None,
                regexes: Vec::new(),
            },
        }
    }
}
