// Consolidates the per-category files listed in manifest.json into a single
// data/questions.json with sequential global ids.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use qbank::migrate::{self, MigrationOptions, DEFAULT_AUTHOR};

#[derive(Debug, Clone, Parser)]
#[command(name = "qbank-migrate", about = "Merge category files into one question list", version)]
struct Cli {
    /// Directory holding manifest.json
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Output file, defaults to <root>/data/questions.json
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Author for records that have none
    #[arg(long, default_value = DEFAULT_AUTHOR)]
    default_author: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let opts = MigrationOptions {
        root: cli.root,
        output: cli.output,
        default_author: cli.default_author,
    };
    let written = migrate::run(&opts)
        .with_context(|| format!("migration failed under {}", opts.root.display()))?;
    println!(
        "Wrote {} questions to {}",
        written,
        opts.output_path().display()
    );
    Ok(())
}
