//! Taxitip CLI Library
//!
//! This crate provides the command-line interface for inspecting the model
//! inputs of the taxi tip classifier:
//!
//! - **Inputs**: Build the symbolic model inputs and print them
//! - **Schema**: Print the active feature schema as JSON
//! - **Validate**: Check a schema file for inconsistencies
//! - **Labels**: Print the target label to class index mapping
//!
//! # Example
//!
//! ```bash
//! # Print the model inputs of the built-in schema
//! taxitip inputs
//!
//! # Same, for a custom schema, with debug logging
//! taxitip --verbosity debug inputs --schema-path /path/to/schema.json
//!
//! # Validate a schema file
//! taxitip validate /path/to/schema.json
//! ```

pub mod commands;

use clap::{Parser, Subcommand};

pub use commands::{InputsCommand, LabelsCommand, SchemaCommand, ValidateCommand};

/// Taxitip - feature schema and model inputs for the taxi tip classifier
#[derive(Parser, Debug)]
#[command(name = "taxitip")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Logging verbosity (overridden by RUST_LOG when set)
    #[arg(long, short = 'v', global = true, value_enum, default_value = "info")]
    pub verbosity: Verbosity,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the model inputs and print them
    Inputs(InputsCommand),

    /// Print the feature schema as JSON
    Schema(SchemaCommand),

    /// Validate a feature schema file
    Validate(ValidateCommand),

    /// Print the target labels and their class indices
    Labels(LabelsCommand),
}

impl Commands {
    /// Runs the selected command, writing its report to stdout.
    pub fn run(&self) -> CliResult<()> {
        match self {
            Commands::Inputs(cmd) => cmd.run(),
            Commands::Schema(cmd) => cmd.run(),
            Commands::Validate(cmd) => cmd.run(),
            Commands::Labels(cmd) => cmd.run(),
        }
    }
}

/// Logging verbosity levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Verbosity {
    /// Everything, including per-build details
    Debug,
    /// Progress messages
    #[default]
    Info,
    /// Warnings and errors only
    Warning,
    /// Errors only
    Error,
}

impl Verbosity {
    /// Returns the default `EnvFilter` directive for this level.
    pub fn directive(&self) -> &'static str {
        match self {
            Verbosity::Debug => "debug",
            Verbosity::Info => "info",
            Verbosity::Warning => "warn",
            Verbosity::Error => "error",
        }
    }
}

/// Result type alias for CLI operations
pub type CliResult<T> = anyhow::Result<T>;
