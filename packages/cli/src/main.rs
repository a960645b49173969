mod commands;

use clap::{Parser, Subcommand};
use commands::{check, headings, process, CheckArgs, HeadingsArgs, ProcessArgs};

/// Vellum CLI - server-side tooling for persisted post content
#[derive(Parser, Debug)]
#[command(name = "vellum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assign heading ids to persisted HTML for TOC navigation
    Process(ProcessArgs),

    /// Extract the heading list (with derived ids) as JSON
    Headings(HeadingsArgs),

    /// Validate content structure and round-trip stability
    Check(CheckArgs),
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Process(args) => process::run(args),
        Command::Headings(args) => headings::run(args),
        Command::Check(args) => check::run(args),
    }
}
