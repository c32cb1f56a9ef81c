use super::Config;
use super::validator::ConfigValidator;
use crate::error::{Result, SnapError};
use memmap2::MmapOptions;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Files below this size are read directly; larger ones are memory-mapped
const MMAP_THRESHOLD: u64 = 4096;

/// Read, parse and validate a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid UTF-8, is not
/// valid TOML, or fails semantic validation.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let metadata = std::fs::metadata(path)?;

    if metadata.len() < MMAP_THRESHOLD {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SnapError::Configuration(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        parse_config_str(&content, path)
    } else {
        let file = File::open(path)?;
        // SAFETY: the map is read-only and dropped before this function returns.
        let mmap = unsafe { MmapOptions::new().map(&file)? };

        let content = simdutf8::basic::from_utf8(&mmap).map_err(|e| {
            SnapError::Configuration(format!(
                "Invalid UTF-8 in config file '{}': {e}",
                path.display()
            ))
        })?;

        parse_config_str(content, path)
    }
}

fn parse_config_str(content: &str, path: &Path) -> Result<Config> {
    let config: Config = toml::from_str(content).map_err(|e| {
        SnapError::Configuration(format!(
            "Config file '{}' is malformed: {e}",
            path.display()
        ))
    })?;

    let validator = ConfigValidator::new();
    validator.warn_unknown_fields(content);
    validator.validate(&config)?;

    debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}
