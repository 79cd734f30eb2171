//! Configuration for the command layer.
//!
//! Paths come from CLI flags first, environment variables second. A
//! `.env` file is honored via dotenvy at startup.

use std::env;
use std::path::PathBuf;

/// Environment variable naming the source export file.
pub const SOURCE_ENV: &str = "CONVERGE_SOURCE";

/// Environment variable naming the destination store file.
pub const STORE_ENV: &str = "CONVERGE_STORE";

/// Resolved paths for an import run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source export file (a JSON array of raw records)
    pub source_path: PathBuf,
    /// Destination store file
    pub store_path: PathBuf,
}

impl Config {
    /// Resolve both paths from flags and environment.
    pub fn resolve(
        source: Option<PathBuf>,
        store: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            source_path: resolve_source(source)?,
            store_path: resolve_store(store)?,
        })
    }
}

/// Resolve the source path from a flag or [`SOURCE_ENV`].
pub fn resolve_source(arg: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    arg.or_else(|| env::var(SOURCE_ENV).ok().map(PathBuf::from))
        .ok_or(ConfigError::MissingSource)
}

/// Resolve the store path from a flag or [`STORE_ENV`].
pub fn resolve_store(arg: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    arg.or_else(|| env::var(STORE_ENV).ok().map(PathBuf::from))
        .ok_or(ConfigError::MissingStore)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no source path: pass --source or set {SOURCE_ENV}")]
    MissingSource,

    #[error("no store path: pass --store or set {STORE_ENV}")]
    MissingStore,
}
