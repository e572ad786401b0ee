//! Schema Command Implementation
//!
//! Prints the active feature schema in its JSON config form, which can be
//! edited and passed back through `--schema-path`.

use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use super::SchemaSource;

/// Print the feature schema as JSON
#[derive(Args, Debug, Clone, Default)]
pub struct SchemaCommand {
    #[command(flatten)]
    pub source: SchemaSource,

    /// Write the schema to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

impl SchemaCommand {
    /// Execute the schema command
    pub fn run(&self) -> Result<()> {
        let stdout = std::io::stdout();
        self.write_to(&mut stdout.lock())
    }

    /// Writes the schema JSON to the output file, or to `out` when none is set.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        let schema = self.source.load()?;
        let json = schema
            .to_json_string()
            .context("Failed to serialize feature schema")?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, format!("{}\n", json))
                    .with_context(|| format!("Failed to write schema to {:?}", path))?;
                info!("Wrote feature schema to {:?}", path);
            }
            None => writeln!(out, "{}", json)?,
        }
        Ok(())
    }
}
