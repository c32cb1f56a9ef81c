use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use snapdiff::cli::{Cli, Commands};
use snapdiff::{SnapContext, commands};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e:#}", "Error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let non_interactive = cli.non_interactive;
    let load = |config: Option<PathBuf>| -> Result<SnapContext> {
        let mut ctx = SnapContext::new(config)?;
        ctx.non_interactive = non_interactive;
        Ok(ctx)
    };

    match cli.command {
        Commands::Init { force } => {
            commands::init::execute(cli.config, force)?;
        }
        Commands::Nodes { ignore_missing } => {
            let ctx = load(cli.config)?;
            commands::nodes::execute(&ctx, ignore_missing)?;
        }
        Commands::Sync { ignore_missing } => {
            let ctx = load(cli.config)?;
            commands::sync::execute(&ctx, ignore_missing)?;
        }
        Commands::Compare {
            ignore_missing,
            no_open,
        } => {
            let ctx = load(cli.config)?;
            commands::compare::execute(&ctx, ignore_missing, no_open)?;
        }
        Commands::Shell => {
            let ctx = load(cli.config)?;
            commands::shell::execute(&ctx, io::stdin().lock(), io::stdout())?;
        }
        Commands::Completion { shell } => {
            print_completions(shell, &mut Cli::command());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false).compact())
        .try_init();
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
