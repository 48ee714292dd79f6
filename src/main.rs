//! tabreport - Main Entry Point
//!
//! Fits models on a CSV file and reports their fit statistics.

use clap::Parser;
use tabreport::cli::{cmd_classify, cmd_regress, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabreport=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Regress(args) => cmd_regress(&args)?,
        Commands::Classify(args) => cmd_classify(&args)?,
    }

    Ok(())
}
