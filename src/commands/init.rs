use crate::config::Config;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Write a default configuration and an empty tracked-paths list.
///
/// # Errors
///
/// Returns an error if:
/// - No configuration path can be determined
/// - A configuration already exists and `force` is not set
/// - The files cannot be written
pub fn execute(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = crate::resolve_config_path(config_path)?;

    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    let config = Config::default();
    config
        .save(&config_path)
        .context("Failed to save default configuration")?;

    let base_dir = config_path
        .parent()
        .map(std::path::Path::to_path_buf)
        .unwrap_or_default();
    let nodes_list = base_dir.join(&config.repository.nodes_list);
    if !nodes_list.exists() {
        std::fs::write(&nodes_list, "")
            .with_context(|| format!("Failed to create {}", nodes_list.display()))?;
    }

    super::print_success(&format!(
        "Wrote default configuration to {}",
        config_path.display()
    ));
    println!("\n{}", "Quick start:".bold());
    println!("  echo /etc/myapp >> {}   # Track a directory", nodes_list.display());
    println!("  snapdiff sync                # Take a snapshot");
    println!("  snapdiff compare             # Report what changed since");

    Ok(())
}
