//! Taxitip CLI - declares the model inputs of the taxi tip classifier.
//!
//! This binary loads the feature schema (built-in or from a JSON file),
//! builds the symbolic model inputs and reports on them.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taxitip_cli::Cli;

fn main() -> Result<()> {
    // Parse command-line arguments first: the verbosity flag sets the filter
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.verbosity.directive()));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("Taxitip CLI starting...");

    cli.command.run()?;

    info!("Taxitip CLI completed successfully");
    Ok(())
}
