//! CLI error types.

use stock_core::types::ModelError;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Bad command-line argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Bad configuration value or file.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bundle file could not be parsed.
    #[error("Invalid bundle file {path}: {source}")]
    BundleFile {
        /// File path.
        path: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// Evaluation failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Output serialisation failed.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
