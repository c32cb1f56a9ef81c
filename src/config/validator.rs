use super::Config;
use crate::error::{Result, SnapError};
use crate::filter::{DiffFilter, PathFilter};
use colored::Colorize;
use std::collections::HashSet;
use std::path::{Component, Path};

/// Upper bound for `diff.context_lines`
const MAX_CONTEXT_LINES: usize = 10_000;

/// Checks a configuration for unknown keys and invalid values
pub struct ConfigValidator {
    /// Set of valid configuration fields that are recognized by snapdiff
    known_fields: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields = [
            "repository.repo_path",
            "repository.diff_dir",
            "repository.report_dir",
            "repository.nodes_list",
            "path_filter.mode",
            "path_filter.action",
            "path_filter.policy",
            "path_filter.patterns",
            "diff_filter.mode",
            "diff_filter.patterns",
            "diff.context_lines",
            "diff.algorithm",
            "tracking.follow_symlinks",
            "report.open",
        ]
        .into_iter()
        .collect();

        Self { known_fields }
    }

    /// Validate values that deserialization alone cannot check.
    ///
    /// Compiles both filters so a bad regex is reported before any
    /// filesystem mutation happens.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `diff_dir` or `report_dir` is empty or escapes its parent
    /// - `diff.context_lines` is out of range
    /// - A filter pattern fails to compile
    pub fn validate(&self, config: &Config) -> Result<()> {
        let repository = &config.repository;
        check_dir_name("repository.diff_dir", repository.diff_dir_name())?;
        check_dir_name("repository.report_dir", repository.report_dir_name())?;

        if repository.repo_path.as_os_str().is_empty() {
            return Err(SnapError::Configuration(
                "repository.repo_path cannot be empty".to_string(),
            ));
        }

        if config.diff.context_lines > MAX_CONTEXT_LINES {
            return Err(SnapError::Configuration(format!(
                "diff.context_lines cannot exceed {MAX_CONTEXT_LINES}"
            )));
        }

        PathFilter::from_config(&config.path_filter)?;
        DiffFilter::from_config(&config.diff_filter)?;

        Ok(())
    }

    /// Print a warning for every key in `content` that snapdiff does not use.
    ///
    /// Unparseable content is ignored here; the real parse reports it.
    pub fn warn_unknown_fields(&self, content: &str) {
        let Ok(parsed) = toml::from_str::<toml::Table>(content) else {
            return;
        };

        let mut unknown = Vec::new();
        for (section, value) in &parsed {
            match value {
                toml::Value::Table(fields) => {
                    for key in fields.keys() {
                        let full_key = format!("{section}.{key}");
                        if !self.known_fields.contains(full_key.as_str()) {
                            unknown.push(full_key);
                        }
                    }
                }
                _ => unknown.push(section.clone()),
            }
        }

        if !unknown.is_empty() {
            eprintln!("{}", "Configuration warnings:".yellow().bold());
            for field in unknown {
                eprintln!("  Unknown configuration field: {}", field.yellow());
            }
            eprintln!();
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_dir_name(key: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(SnapError::Configuration(format!("{key} cannot be empty")));
    }

    let escapes = Path::new(value)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapes {
        return Err(SnapError::Configuration(format!(
            "{key} must be a plain relative directory name, got '{value}'"
        )));
    }

    Ok(())
}
