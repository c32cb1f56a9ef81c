//! Interactive session around rebuild, sync and compare.

use crate::SnapContext;
use crate::tracking::{NodeSet, UnresolvedPolicy};
use anyhow::Result;
use colored::Colorize;
use std::io::{BufRead, Write};

const HELP: &str = "\
Commands:
  N, nodes        Rebuild the tracked file list
  R, repository   Replace the snapshot with the tracked files
  C, compare      Compare tracked files against the snapshot
  E, exit         Leave the shell
  help            Show this message";

/// What the loop should do after a command
enum Flow {
    Continue,
    Exit,
}

/// Run the interactive loop until `exit` or end of input.
///
/// Command failures are printed and the loop continues.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub fn execute<R, W>(ctx: &SnapContext, mut input: R, mut output: W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut session = Session { ctx, nodes: None };

    writeln!(
        output,
        "snapdiff {} interactive shell. Type 'help' for commands.",
        crate::VERSION
    )?;

    loop {
        write!(output, "{} ", "(N)odes, (R)epository, (C)ompare, (E)xit >".bold())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        let outcome = match line.trim().to_lowercase().as_str() {
            "" => Ok(Flow::Continue),
            "n" | "nodes" => session.rebuild(&mut input, &mut output),
            "r" | "repository" => session.sync(&mut input, &mut output),
            "c" | "compare" => session.compare(&mut input, &mut output),
            "e" | "exit" | "q" | "quit" => Ok(Flow::Exit),
            "h" | "help" | "?" => {
                writeln!(output, "{HELP}")?;
                Ok(Flow::Continue)
            }
            other => {
                writeln!(output, "Unknown command '{other}'. Type 'help' for commands.")?;
                Ok(Flow::Continue)
            }
        };

        match outcome {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) => writeln!(output, "{} {e:#}", "✗".red().bold())?,
        }
    }

    Ok(())
}

struct Session<'a> {
    ctx: &'a SnapContext,
    /// Last node set built in this session
    nodes: Option<NodeSet>,
}

impl Session<'_> {
    fn rebuild<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<Flow> {
        let resolution = self.ctx.resolve()?;

        let policy = if resolution.unresolved.is_empty() {
            UnresolvedPolicy::Ignore
        } else if super::ask_unresolved(input, output, &resolution.unresolved)? {
            UnresolvedPolicy::Ignore
        } else {
            return Ok(Flow::Exit);
        };

        let nodes = resolution.into_node_set(policy)?;
        writeln!(output, "Node list rebuilt: {} file(s)", nodes.len())?;
        self.nodes = Some(nodes);
        Ok(Flow::Continue)
    }

    fn ensure_nodes<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<Flow> {
        if self.nodes.is_some() {
            return Ok(Flow::Continue);
        }
        self.rebuild(input, output)
    }

    fn sync<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<Flow> {
        if let Flow::Exit = self.ensure_nodes(input, output)? {
            return Ok(Flow::Exit);
        }
        let Some(nodes) = &self.nodes else {
            return Ok(Flow::Continue);
        };

        let report = super::sync::run(self.ctx, nodes)?;
        super::sync::write_summary(output, self.ctx, &report)?;
        Ok(Flow::Continue)
    }

    fn compare<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<Flow> {
        let mut exit = false;
        let previous = self.ctx.previous_nodes_with(|roots| {
            if super::ask_unresolved(input, output, roots)? {
                Ok(UnresolvedPolicy::Ignore)
            } else {
                exit = true;
                Ok::<_, anyhow::Error>(UnresolvedPolicy::Abort)
            }
        });
        let previous = match previous {
            Ok(nodes) => nodes,
            Err(_) if exit => return Ok(Flow::Exit),
            Err(e) => return Err(e),
        };

        let comparison = super::compare::run(self.ctx, &previous)?;
        super::compare::write_summary(output, &comparison)?;
        if self.ctx.config.report.open && !self.ctx.non_interactive {
            super::compare::open_report(&comparison);
        }
        Ok(Flow::Continue)
    }
}
