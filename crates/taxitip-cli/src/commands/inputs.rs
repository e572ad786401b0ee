//! Inputs Command Implementation
//!
//! Builds the symbolic model inputs from the feature schema and prints them,
//! either as a name to placeholder map or as JSON.

use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use taxitip_core::{build_inputs, PlaceholderInfo};
use tracing::info;

use super::SchemaSource;

/// Build the model inputs and print them
///
/// # Example
///
/// ```bash
/// taxitip inputs --schema-path /path/to/schema.json --json
/// ```
#[derive(Args, Debug, Clone, Default)]
pub struct InputsCommand {
    #[command(flatten)]
    pub source: SchemaSource,

    /// Print a JSON listing instead of the placeholder map
    #[arg(long)]
    pub json: bool,
}

impl InputsCommand {
    /// Execute the inputs command
    pub fn run(&self) -> Result<()> {
        let stdout = std::io::stdout();
        self.write_to(&mut stdout.lock())
    }

    /// Builds the inputs and writes the report to `out`.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        let schema = self.source.load()?;
        let inputs = build_inputs(&schema);
        info!(
            "Built {} inputs ({} numeric, {} categorical)",
            inputs.len(),
            inputs.numeric().count(),
            inputs.categorical().count()
        );

        if self.json {
            let listing: Vec<PlaceholderInfo> = inputs.iter().map(|p| p.describe()).collect();
            serde_json::to_writer_pretty(&mut *out, &listing)
                .context("Failed to serialize inputs")?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", inputs)?;
        }
        Ok(())
    }
}
