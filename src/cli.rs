//! Command-line interface definitions for snapdiff.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for snapdiff.
#[derive(Parser)]
#[command(
    name = "snapdiff",
    version = crate::VERSION,
    about = "Snapshot files outside version control and report what changed",
    long_about = "Copies a tracked set of files into a snapshot repository and later \
                  compares the live files against it, writing an HTML change report"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to $SNAPDIFF_CONFIG_PATH, then the user config dir)
    #[arg(short, long, global = true, value_name = "PATH", env = crate::CONFIG_PATH_ENV)]
    pub config: Option<PathBuf>,

    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Never prompt and never open the report
    #[arg(long, global = true)]
    pub non_interactive: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration and an empty tracked-paths list
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Resolve and print the tracked files
    Nodes {
        /// Skip tracked paths that don't exist instead of failing
        #[arg(short, long)]
        ignore_missing: bool,
    },

    /// Replace the snapshot with the current tracked files
    Sync {
        /// Skip tracked paths that don't exist instead of failing
        #[arg(short, long)]
        ignore_missing: bool,
    },

    /// Compare tracked files against the snapshot and write a report
    Compare {
        /// Skip tracked paths that don't exist instead of failing
        #[arg(short, long)]
        ignore_missing: bool,

        /// Don't open the report when done
        #[arg(long)]
        no_open: bool,
    },

    /// Interactive session: rebuild nodes, sync and compare repeatedly
    Shell,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["snapdiff", "compare", "--no-open", "--config", "/tmp/c.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(
            cli.command,
            Commands::Compare {
                ignore_missing: false,
                no_open: true
            }
        ));
    }

    #[test]
    fn test_non_interactive_flag_is_global() {
        let cli = Cli::parse_from(["snapdiff", "sync", "--non-interactive"]);
        assert!(cli.non_interactive);
        assert!(!Cli::parse_from(["snapdiff", "sync"]).non_interactive);
    }
}
