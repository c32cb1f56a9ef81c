use crate::SnapContext;
use crate::output;
use crate::sync::{SyncEngine, SyncReport};
use crate::tracking::NodeSet;
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;

/// Resolve the tracked files and replace the snapshot with them.
///
/// # Errors
///
/// Returns an error if resolution fails or the sync aborts.
pub fn execute(ctx: &SnapContext, ignore_missing: bool) -> Result<()> {
    let nodes = super::resolve_nodes(ctx, ignore_missing)?;
    let report = run(ctx, &nodes)?;

    let stdout = std::io::stdout();
    write_summary(&mut stdout.lock(), ctx, &report)
}

/// Snapshot `nodes`, showing progress on a terminal.
///
/// # Errors
///
/// Returns an error if the sync aborts.
pub fn run(ctx: &SnapContext, nodes: &NodeSet) -> Result<SyncReport> {
    let store = ctx.store();
    let mut progress = output::start_progress("Snapshotting", nodes.len());

    let report = SyncEngine::new(&store)
        .sync_with_progress(nodes, |done| progress.update(done))
        .with_context(|| format!("Failed to sync into {}", store.root().display()))?;
    progress.finish();

    Ok(report)
}

/// Print the outcome of a sync, including every failed copy.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_summary<W: Write>(out: &mut W, ctx: &SnapContext, report: &SyncReport) -> Result<()> {
    if !report.failed.is_empty() {
        writeln!(
            out,
            "{} {} file(s) could not be copied and will be listed as missing files:",
            "⚠".yellow().bold(),
            report.failed.len()
        )?;
        for failure in &report.failed {
            writeln!(out, "    {}", failure.error)?;
        }
    }

    writeln!(
        out,
        "{} Snapshot of {} file(s) written to {}",
        "✓".green().bold(),
        report.copied,
        ctx.repo_path.display()
    )?;
    Ok(())
}
