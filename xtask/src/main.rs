//! xtask for snapdiff - build automation and tooling

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "xtask", about = "Build automation for snapdiff")]
enum Task {
    /// Generate man pages from clap definitions
    GenerateManPages {
        /// Output directory for man pages (default: ./man)
        #[arg(short, long, default_value = "man")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    match Task::parse() {
        Task::GenerateManPages { output } => generate_man_pages(&output)?,
    }

    Ok(())
}

fn generate_man_pages(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let cmd = snapdiff::cli::Cli::command();
    render(clap_mangen::Man::new(cmd.clone()), &output_dir.join("snapdiff.1"))?;

    // One page per subcommand, named git-style: snapdiff-sync.1
    for subcmd in cmd.get_subcommands() {
        let name = subcmd.get_name();
        if name == "help" {
            continue;
        }
        let page = clap_mangen::Man::new(subcmd.clone()).title(format!("snapdiff-{name}"));
        render(page, &output_dir.join(format!("snapdiff-{name}.1")))?;
    }

    println!("\nMan pages generated in: {}", output_dir.display());
    println!("  man {}/snapdiff.1", output_dir.display());

    Ok(())
}

fn render(page: clap_mangen::Man, path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create man page: {}", path.display()))?;
    page.render(&mut std::io::BufWriter::new(file))?;
    println!("✓ Generated: {}", path.display());
    Ok(())
}
