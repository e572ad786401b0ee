//! CLI Command Implementations
//!
//! This module contains the implementations for all CLI subcommands:
//!
//! - [`inputs`]: Build and print the model inputs
//! - [`schema`]: Print the feature schema
//! - [`validate`]: Validate a schema file
//! - [`labels`]: Print the label mapping

mod inputs;
mod labels;
mod schema;
mod validate;

pub use inputs::InputsCommand;
pub use labels::LabelsCommand;
pub use schema::SchemaCommand;
pub use validate::ValidateCommand;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use taxitip_core::FeatureSchema;
use tracing::info;

/// Where the feature schema comes from
#[derive(Args, Debug, Clone, Default)]
pub struct SchemaSource {
    /// Path to a feature schema file (JSON). Uses the built-in taxi schema when omitted
    #[arg(long, short = 's', env = "TAXITIP_SCHEMA_PATH")]
    pub schema_path: Option<PathBuf>,
}

impl SchemaSource {
    /// Loads and validates the schema.
    pub fn load(&self) -> Result<FeatureSchema> {
        match &self.schema_path {
            Some(path) => {
                let schema = FeatureSchema::from_json_file(path)
                    .with_context(|| format!("Failed to load feature schema from {:?}", path))?;
                info!(
                    "Loaded schema with {} features from {:?}",
                    schema.num_features(),
                    path
                );
                Ok(schema)
            }
            None => {
                info!("No schema file provided, using the built-in taxi tips schema");
                Ok(FeatureSchema::taxi_tips())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn load_with_max_level(level: tracing::Level) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let schema = tracing::subscriber::with_default(subscriber, || {
            SchemaSource::default().load().unwrap()
        });
        assert_eq!(schema, FeatureSchema::taxi_tips());

        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_builtin_schema_is_quiet_at_warning_level() {
        assert!(load_with_max_level(tracing::Level::WARN).is_empty());
    }

    #[test]
    fn test_builtin_schema_logged_at_info_level() {
        let logs = load_with_max_level(tracing::Level::INFO);
        assert!(logs.contains("INFO"));
        assert!(logs.contains("using the built-in taxi tips schema"));
    }
}
