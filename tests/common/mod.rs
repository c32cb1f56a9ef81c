#![allow(dead_code)]

use anyhow::Result;
use snapdiff::SnapContext;
use snapdiff::config::Config;
use snapdiff::tracking::{NodeSet, UnresolvedPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test workspace fixture: a config location, a tracked `src/` tree and a
/// repository, all inside one temporary directory.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub ctx: SnapContext,
}

impl TestRepo {
    /// Create a workspace with default configuration tracking `src/`
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        fs::create_dir_all(temp_dir.path().join("src"))?;

        let mut ctx = SnapContext::new_explicit(config, temp_dir.path().join("config.toml"))?;
        ctx.non_interactive = true;

        let repo = Self { temp_dir, ctx };
        repo.write_nodes_list(&["src"])?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of `rel` inside the tracked `src/` tree
    pub fn source(&self, rel: &str) -> PathBuf {
        self.path().join("src").join(rel)
    }

    /// Write a file under `src/`, creating parent directories
    pub fn write_source(&self, rel: &str, content: &str) -> Result<PathBuf> {
        let path = self.source(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Replace the tracked-paths list with `roots`, one per line
    pub fn write_nodes_list(&self, roots: &[&str]) -> Result<()> {
        let mut content = roots.join("\n");
        content.push('\n');
        fs::write(&self.ctx.nodes_list, content)?;
        Ok(())
    }

    /// Resolve the tracked-paths list, failing on unresolved roots
    pub fn nodes(&self) -> Result<NodeSet> {
        Ok(self.ctx.resolve()?.into_node_set(UnresolvedPolicy::Abort)?)
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new().expect("Failed to create test workspace")
    }
}
