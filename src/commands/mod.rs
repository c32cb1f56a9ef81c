pub mod compare;
pub mod init;
pub mod nodes;
pub mod shell;
pub mod sync;

use crate::SnapContext;
use crate::tracking::{NodeSet, UnresolvedPolicy};
use anyhow::Result;
use colored::Colorize;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Resolve the tracked-paths list into a node set.
///
/// Unresolved roots are handled by [`unresolved_policy`].
///
/// # Errors
///
/// Returns an error if resolution fails, the user chooses to exit, or no
/// nodes remain.
pub fn resolve_nodes(ctx: &SnapContext, ignore_missing: bool) -> Result<NodeSet> {
    let resolution = ctx.resolve()?;
    let policy = unresolved_policy(ctx, ignore_missing, &resolution.unresolved)?;
    Ok(resolution.into_node_set(policy)?)
}

/// Decide what to do with unresolved roots.
///
/// They are skipped with `ignore_missing`. Otherwise the user is asked on an
/// interactive terminal, and resolution fails everywhere else.
///
/// # Errors
///
/// Returns an error if prompting the user fails.
pub fn unresolved_policy(
    ctx: &SnapContext,
    ignore_missing: bool,
    roots: &[PathBuf],
) -> Result<UnresolvedPolicy> {
    if roots.is_empty() || ignore_missing {
        return Ok(UnresolvedPolicy::Ignore);
    }
    if ctx.non_interactive || !io::stdin().is_terminal() {
        return Ok(UnresolvedPolicy::Abort);
    }

    let mut input = io::stdin().lock();
    let mut output = io::stderr();
    if ask_unresolved(&mut input, &mut output, roots)? {
        Ok(UnresolvedPolicy::Ignore)
    } else {
        Ok(UnresolvedPolicy::Abort)
    }
}

/// List unresolved roots and ask whether to ignore them.
///
/// Returns `true` for ignore and `false` for exit. End of input counts as
/// exit.
///
/// # Errors
///
/// Returns an error if reading or writing the terminal fails.
pub fn ask_unresolved<R, W>(input: &mut R, output: &mut W, roots: &[PathBuf]) -> Result<bool>
where
    R: BufRead,
    W: Write,
{
    for root in roots {
        writeln!(
            output,
            "{} File or directory doesn't exist: {}",
            "⚠".yellow().bold(),
            root.display()
        )?;
    }

    loop {
        write!(output, "(I)gnore, (E)xit: ")?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }

        match answer.trim().to_lowercase().as_str() {
            "i" | "ignore" => return Ok(true),
            "e" | "exit" => return Ok(false),
            _ => writeln!(output, "Please answer 'I' or 'E'.")?,
        }
    }
}
