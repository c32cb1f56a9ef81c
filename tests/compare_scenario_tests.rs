//! End-to-end sync/compare scenarios against the library API.

mod common;

use anyhow::Result;
use common::TestRepo;
use rstest::rstest;
use snapdiff::config::{Config, FilterMode, PatternList};
use snapdiff::tracking::{Node, NodeManifest, NodeSet, UnresolvedPolicy};
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Relative path and content of every file in the snapshot, diff area excluded
fn snapshot_contents(repo: &TestRepo) -> Result<Vec<(PathBuf, Vec<u8>)>> {
    let store = repo.ctx.store();
    let mut files = Vec::new();
    for entry in WalkDir::new(store.root()).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.path().starts_with(store.diff_dir()) {
            continue;
        }
        if entry.file_name() == snapdiff::tracking::manifest::MANIFEST_FILE {
            continue;
        }
        let rel = entry.path().strip_prefix(store.root())?.to_path_buf();
        files.push((rel, fs::read(entry.path())?));
    }
    Ok(files)
}

#[test]
fn test_sync_twice_then_compare_is_clean() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write_source("a.txt", "alpha\n")?;
    repo.write_source("nested/b.txt", "beta\n")?;
    let nodes = repo.nodes()?;

    repo.ctx.sync(&nodes)?;
    let first = snapshot_contents(&repo)?;
    repo.ctx.sync(&nodes)?;
    let second = snapshot_contents(&repo)?;
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);

    let comparison = repo.ctx.compare(&nodes)?;
    assert!(comparison.is_clean());
    assert!(comparison.report_path.is_some_and(|p| p.is_file()));
    Ok(())
}

#[test]
fn test_modified_file_is_only_changed() -> Result<()> {
    let repo = TestRepo::new()?;
    let a = repo.write_source("a.txt", "one\n")?;
    repo.write_source("b.txt", "two\n")?;
    let nodes = repo.nodes()?;
    repo.ctx.sync(&nodes)?;

    fs::write(&a, "one, edited\n")?;
    let comparison = repo.ctx.compare(&nodes)?;

    assert_eq!(comparison.changed.len(), 1);
    assert_eq!(comparison.changed[0].source_path, a);
    assert!(comparison.removed.is_empty());
    assert!(comparison.new.is_empty());
    assert!(comparison.missing.is_empty());
    Ok(())
}

#[test]
fn test_changed_file_copied_into_diff_area() -> Result<()> {
    let repo = TestRepo::new()?;
    let a = repo.write_source("a.txt", "before\n")?;
    let nodes = repo.nodes()?;
    repo.ctx.sync(&nodes)?;

    fs::write(&a, "after\n")?;
    let comparison = repo.ctx.compare(&nodes)?;

    let changed = &comparison.changed[0];
    let copy = changed.current_copy.as_ref().expect("current copy");
    assert!(copy.starts_with(repo.ctx.store().diff_dir()));
    assert_eq!(fs::read_to_string(copy)?, "after\n");
    assert_eq!(fs::read_to_string(&changed.snapshot_path)?, "before\n");
    Ok(())
}

#[test]
fn test_deleted_synced_file_is_removed() -> Result<()> {
    let repo = TestRepo::new()?;
    let a = repo.write_source("a.txt", "alpha\n")?;
    repo.write_source("keep.txt", "keep\n")?;
    let nodes = repo.nodes()?;
    repo.ctx.sync(&nodes)?;

    fs::remove_file(&a)?;
    let comparison = repo.ctx.compare(&nodes)?;

    assert_eq!(comparison.removed.len(), 1);
    assert_eq!(comparison.removed[0].source_path, a);
    assert!(comparison.removed[0].snapshot_path.is_file());
    assert!(comparison.changed.is_empty());
    assert!(comparison.missing.is_empty());
    Ok(())
}

#[test]
fn test_never_synced_absent_file_is_missing() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write_source("a.txt", "alpha\n")?;
    let synced = repo.nodes()?;
    repo.ctx.sync(&synced)?;

    let ghost = repo.path().join("elsewhere/ghost.conf");
    let mut previous: Vec<Node> = synced.iter().cloned().collect();
    previous.push(Node::from_source(ghost.clone()));

    let comparison = repo.ctx.compare(&NodeSet::new(previous))?;
    assert_eq!(comparison.missing, vec![ghost]);
    assert!(comparison.removed.is_empty());
    assert!(comparison.new.is_empty());
    Ok(())
}

#[test]
fn test_added_file_is_only_new() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write_source("a.txt", "alpha\n")?;
    let nodes = repo.nodes()?;
    repo.ctx.sync(&nodes)?;

    let added = repo.write_source("sub/added.txt", "fresh\n")?;
    let comparison = repo.ctx.compare(&nodes)?;

    assert_eq!(comparison.new, vec![added]);
    assert!(comparison.changed.is_empty());
    assert!(comparison.removed.is_empty());
    assert!(comparison.missing.is_empty());
    Ok(())
}

#[test]
fn test_directory_scenario_change_remove_add() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write_nodes_list(&["src/D"])?;
    let a = repo.write_source("D/a.txt", "a v1\n")?;
    let b = repo.write_source("D/b.txt", "b v1\n")?;
    let nodes = repo.nodes()?;
    assert_eq!(nodes.len(), 2);
    repo.ctx.sync(&nodes)?;

    fs::write(&a, "a v2\n")?;
    fs::remove_file(&b)?;
    let c = repo.write_source("D/c.txt", "c v1\n")?;

    let comparison = repo.ctx.compare(&nodes)?;
    let changed: Vec<_> = comparison.changed.iter().map(|c| c.source_path.clone()).collect();
    let removed: Vec<_> = comparison.removed.iter().map(|r| r.source_path.clone()).collect();

    assert_eq!(changed, vec![a]);
    assert_eq!(removed, vec![b]);
    assert_eq!(comparison.new, vec![c]);
    assert!(comparison.missing.is_empty());
    Ok(())
}

#[rstest]
#[case::no_filter(FilterMode::None, true)]
#[case::exclude_everything(FilterMode::Search, false)]
fn test_diff_gating(#[case] mode: FilterMode, #[case] rendered: bool) -> Result<()> {
    let mut config = Config::default();
    config.diff_filter.mode = mode;
    config.diff_filter.patterns = PatternList::Ordered(Vec::new());

    let repo = TestRepo::with_config(config)?;
    let a = repo.write_source("a.txt", "old\n")?;
    let b = repo.write_source("b.txt", "old\n")?;
    let nodes = repo.nodes()?;
    repo.ctx.sync(&nodes)?;

    fs::write(&a, "new\n")?;
    fs::write(&b, "new\n")?;
    let comparison = repo.ctx.compare(&nodes)?;

    assert_eq!(comparison.changed.len(), 2);
    for changed in &comparison.changed {
        assert_eq!(changed.diff_path.is_some(), rendered);
        if let Some(fragment) = &changed.diff_path {
            assert!(fragment.is_file());
            assert!(fs::read_to_string(fragment)?.contains("new"));
        }
    }
    Ok(())
}

#[test]
fn test_diff_filter_patterns_select_fragments() -> Result<()> {
    let mut config = Config::default();
    config.diff_filter.mode = FilterMode::Search;
    config.diff_filter.patterns = PatternList::Ordered(vec![r"_conf\.htm$".into()]);

    let repo = TestRepo::with_config(config)?;
    let conf = repo.write_source("app.conf", "port = 1\n")?;
    let log = repo.write_source("app.log", "line\n")?;
    let nodes = repo.nodes()?;
    repo.ctx.sync(&nodes)?;

    fs::write(&conf, "port = 2\n")?;
    fs::write(&log, "line\nline\n")?;
    let comparison = repo.ctx.compare(&nodes)?;

    for changed in &comparison.changed {
        let expect_diff = changed.source_path == conf;
        assert_eq!(changed.diff_path.is_some(), expect_diff, "{}", changed.source_path.display());
    }
    Ok(())
}

#[test]
fn test_report_lists_every_category() -> Result<()> {
    let repo = TestRepo::new()?;
    let a = repo.write_source("a.txt", "a\n")?;
    let b = repo.write_source("b.txt", "b\n")?;
    let nodes = repo.nodes()?;
    repo.ctx.sync(&nodes)?;

    fs::write(&a, "a2\n")?;
    fs::remove_file(&b)?;
    repo.write_source("c.txt", "c\n")?;

    let comparison = repo.ctx.compare(&nodes)?;
    let report = fs::read_to_string(comparison.report_path.expect("report path"))?;

    let changed = report.find("Changed files (1)").expect("changed section");
    let removed = report.find("Removed files (1)").expect("removed section");
    let new = report.find("New files (1)").expect("new section");
    let missing = report.find("Missing files (0)").expect("missing section");
    assert!(changed < removed && removed < new && new < missing);
    assert!(report.contains("View differences"));
    Ok(())
}

#[test]
fn test_previous_nodes_come_from_manifest() -> Result<()> {
    let repo = TestRepo::new()?;
    let a = repo.write_source("a.txt", "alpha\n")?;
    let nodes = repo.nodes()?;
    repo.ctx.sync(&nodes)?;

    // The list changes after the sync; the snapshot's node set still wins
    repo.write_source("b.txt", "beta\n")?;
    let previous = repo.ctx.previous_nodes(UnresolvedPolicy::Abort)?;
    assert_eq!(previous, nodes);

    let manifest = NodeManifest::load(&repo.ctx.repo_path)?.expect("manifest after sync");
    assert_eq!(manifest.nodes.len(), 1);
    assert_eq!(manifest.nodes.as_slice()[0].source_path, a);
    Ok(())
}

#[test]
fn test_previous_nodes_fall_back_to_resolution() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write_source("a.txt", "alpha\n")?;

    let previous = repo.ctx.previous_nodes(UnresolvedPolicy::Abort)?;
    assert_eq!(previous, repo.nodes()?);
    Ok(())
}

#[test]
fn test_compare_wipes_previous_diff_area() -> Result<()> {
    let repo = TestRepo::new()?;
    let a = repo.write_source("a.txt", "v1\n")?;
    let nodes = repo.nodes()?;
    repo.ctx.sync(&nodes)?;

    fs::write(&a, "v2\n")?;
    let first = repo.ctx.compare(&nodes)?;
    let fragment = first.changed[0].diff_path.clone().expect("fragment");
    assert!(fragment.is_file());

    // Restore the original content; the stale fragment must disappear
    fs::write(&a, "v1\n")?;
    let second = repo.ctx.compare(&nodes)?;
    assert!(second.is_clean());
    assert!(!fragment.exists());
    Ok(())
}

#[test]
fn test_repository_under_tracked_root_is_not_tracked() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write_source("app.conf", "port = 1\n")?;
    // Track the directory holding the config, repository and lock file
    repo.write_nodes_list(&["."])?;

    repo.ctx.sync(&repo.nodes()?)?;
    repo.ctx.sync(&repo.nodes()?)?;

    let nodes = repo.nodes()?;
    let repo_root = repo.ctx.store().root().to_path_buf();
    assert!(nodes.iter().all(|n| !n.source_path.starts_with(&repo_root)));
    assert!(nodes.iter().all(|n| n.source_path != repo.ctx.store().lock_path()));

    let comparison = repo.ctx.compare(&repo.ctx.previous_nodes(UnresolvedPolicy::Abort)?)?;
    assert!(comparison.is_clean(), "{comparison:?}");
    Ok(())
}

#[test]
fn test_previous_nodes_with_asks_only_for_unresolved_roots() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write_source("a.txt", "alpha\n")?;

    let mut asked = false;
    repo.ctx.previous_nodes_with(|_| {
        asked = true;
        Ok::<_, anyhow::Error>(UnresolvedPolicy::Abort)
    })?;
    assert!(!asked);

    repo.write_nodes_list(&["src", "ghost"])?;
    let mut seen = Vec::new();
    let nodes = repo.ctx.previous_nodes_with(|roots| {
        seen = roots.to_vec();
        Ok::<_, anyhow::Error>(UnresolvedPolicy::Ignore)
    })?;
    assert_eq!(nodes.len(), 1);
    assert_eq!(seen, vec![repo.path().join("ghost")]);
    Ok(())
}
