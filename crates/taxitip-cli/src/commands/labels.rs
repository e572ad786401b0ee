//! Labels Command Implementation

use anyhow::Result;
use clap::Args;
use std::io::Write;

use super::SchemaSource;

/// Print the target labels and their class indices
#[derive(Args, Debug, Clone, Default)]
pub struct LabelsCommand {
    #[command(flatten)]
    pub source: SchemaSource,
}

impl LabelsCommand {
    /// Execute the labels command
    pub fn run(&self) -> Result<()> {
        let stdout = std::io::stdout();
        self.write_to(&mut stdout.lock())
    }

    /// Writes the target name followed by one `index<TAB>label` line per class.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        let schema = self.source.load()?;
        let target = schema.target_spec();

        writeln!(out, "{}", target.name())?;
        for (index, label) in target.labels().iter().enumerate() {
            writeln!(out, "{}\t{}", index, label)?;
        }
        Ok(())
    }
}
