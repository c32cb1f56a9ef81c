use crate::SnapContext;
use crate::compare::Comparison;
use crate::output;
use crate::tracking::NodeSet;
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;
use std::path::Path;

/// Compare the tracked files against the snapshot and write the report.
///
/// Compares against the node set of the last sync, or a fresh resolution
/// when there is no snapshot yet.
///
/// # Errors
///
/// Returns an error if the previous node set cannot be determined or the
/// compare run fails.
pub fn execute(ctx: &SnapContext, ignore_missing: bool, no_open: bool) -> Result<()> {
    let previous = ctx.previous_nodes_with(|roots| super::unresolved_policy(ctx, ignore_missing, roots))?;

    let comparison = run(ctx, &previous)?;

    let stdout = std::io::stdout();
    write_summary(&mut stdout.lock(), &comparison)?;

    if ctx.config.report.open && !no_open && !ctx.non_interactive {
        open_report(&comparison);
    }
    Ok(())
}

/// Compare `previous`, showing progress on a terminal.
///
/// # Errors
///
/// Returns an error if the compare run fails.
pub fn run(ctx: &SnapContext, previous: &NodeSet) -> Result<Comparison> {
    let mut progress = output::start_progress("Comparing", previous.len());

    let comparison = ctx
        .compare_with_progress(previous, |done| progress.update(done))
        .with_context(|| format!("Failed to compare against {}", ctx.repo_path.display()))?;
    progress.finish();

    Ok(comparison)
}

/// Print counts per category and the report location.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_summary<W: Write>(out: &mut W, comparison: &Comparison) -> Result<()> {
    writeln!(out, "{}", "Comparison complete".bold())?;
    writeln!(out, "  {:<8} {}", "changed".yellow(), comparison.changed.len())?;
    writeln!(out, "  {:<8} {}", "removed".red(), comparison.removed.len())?;
    writeln!(out, "  {:<8} {}", "new".green(), comparison.new.len())?;
    writeln!(out, "  {:<8} {}", "missing".dimmed(), comparison.missing.len())?;

    if let Some(report) = &comparison.report_path {
        writeln!(out, "Report: {}", report.display())?;
    }
    Ok(())
}

/// Open the report in the platform viewer; failures only warn.
pub fn open_report(comparison: &Comparison) {
    let Some(report) = comparison.report_path.as_deref() else {
        return;
    };
    if let Err(e) = open_path(report) {
        super::print_warning(&format!("Could not open {}: {e}", report.display()));
    }
}

fn open_path(path: &Path) -> Result<(), opener::OpenError> {
    tracing::debug!(path = %path.display(), "Opening report");
    opener::open(path)
}
