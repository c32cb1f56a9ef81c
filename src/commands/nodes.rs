use crate::SnapContext;
use crate::tracking::NodeSet;
use crate::utils::format_size;
use anyhow::Result;
use colored::Colorize;
use std::io::Write;

/// Resolve and print the tracked files.
///
/// # Errors
///
/// Returns an error if resolution fails or writing to stdout fails.
pub fn execute(ctx: &SnapContext, ignore_missing: bool) -> Result<()> {
    let nodes = super::resolve_nodes(ctx, ignore_missing)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_listing(&mut out, &nodes)
}

/// Print one line per node followed by a count and total size.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_listing<W: Write>(out: &mut W, nodes: &NodeSet) -> Result<()> {
    let mut total_size = 0u64;

    for node in nodes {
        total_size += std::fs::metadata(&node.source_path).map_or(0, |m| m.len());
        writeln!(
            out,
            "{} {}",
            node.source_path.display(),
            format!("-> {}", node.repo_path.display()).dimmed()
        )?;
    }

    writeln!(
        out,
        "\n{} tracked files, {}",
        nodes.len(),
        format_size(total_size)
    )?;
    Ok(())
}
