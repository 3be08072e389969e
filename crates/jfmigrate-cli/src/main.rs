//! jfmigrate - Jenkins declarative pipeline to GitHub Actions converter

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use jfmigrate_cli::commands::{convert, scan};
use jfmigrate_cli::load_options;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "jfmigrate",
    version,
    about = "Convert Jenkins declarative pipelines into GitHub Actions workflows"
)]
struct Cli {
    /// Configuration file (default: ./jfmigrate.{yaml,toml,json} if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one Jenkinsfile
    Convert(convert::ConvertArgs),
    /// Convert every Jenkinsfile below a directory
    Scan(scan::ScanArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    let options = load_options(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert(args) => convert::run(args, options),
        Commands::Scan(args) => scan::run(args, options),
    }
}

/// Initialize tracing on stderr, keeping stdout for `--dry-run` documents
fn init_tracing(verbose: u8) -> Result<()> {
    let default_filter = match verbose {
        0 => "jfmigrate_cli=info,jfmigrate_compiler=info,jfmigrate_parser=info",
        1 => "jfmigrate_cli=debug,jfmigrate_compiler=debug,jfmigrate_parser=debug",
        _ => "debug",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
