//! Unified error handling for the command layer.

use crate::config::ConfigError;

/// Command-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed store file: {0}")]
    MalformedStore(#[from] serde_json::Error),
}

/// Result type alias for command-layer operations.
pub type Result<T> = std::result::Result<T, CliError>;
