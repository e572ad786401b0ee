//! Validate Command Implementation
//!
//! Loads a schema file and reports whether it is consistent: role tables
//! disjoint, embedding widths present and positive, target well formed.

use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use taxitip_core::FeatureSchema;
use tracing::info;

/// Validate a feature schema file
///
/// # Example
///
/// ```bash
/// taxitip validate /path/to/schema.json
/// ```
#[derive(Args, Debug, Clone)]
pub struct ValidateCommand {
    /// Path to the schema file to validate
    pub path: PathBuf,
}

impl ValidateCommand {
    /// Execute the validate command
    pub fn run(&self) -> Result<()> {
        let stdout = std::io::stdout();
        self.write_to(&mut stdout.lock())
    }

    /// Validates the file and writes a one-line summary to `out`.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        info!("Validating feature schema {:?}", self.path);
        let schema = FeatureSchema::from_json_file(&self.path)
            .with_context(|| format!("Invalid feature schema {:?}", self.path))?;

        writeln!(
            out,
            "{}: ok ({} numerical, {} embedding, {} one-hot, target '{}' with {} classes)",
            self.path.display(),
            schema.numerical_features().len(),
            schema.embedding_categorical_features().len(),
            schema.onehot_categorical_features().len(),
            schema.target_spec().name(),
            schema.target_spec().num_classes()
        )?;
        Ok(())
    }
}
