//! The repository contract: fetching the full current collection for one
//! side of a sync.

use crate::RawRecord;
use thiserror::Error;

/// A failed fetch. Fatal to the import run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("io error: {0}")]
    Io(String),

    #[error("malformed data: {0}")]
    Malformed(String),
}

/// Fetches every raw record of one side. No order guarantee; may be empty.
pub trait Repository {
    fn find_all(&self) -> Result<Vec<RawRecord>, RepositoryError>;
}
