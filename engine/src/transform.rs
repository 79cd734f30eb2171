//! The transformer contract: normalizing raw records into canonical form.

use crate::{RawRecord, Record};
use thiserror::Error;

/// A record that cannot be normalized. Caught per record by the Importer;
/// the record is logged and excluded, never fatal to the batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot transform record: {0}")]
pub struct TransformError(pub String);

impl TransformError {
    /// Create a transform error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Normalizes one raw record into a [`Record`].
pub trait Transformer {
    fn transform(&self, raw: RawRecord, dry_run: bool) -> Result<Record, TransformError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TransformError::new("missing natural key");
        assert_eq!(err.to_string(), "cannot transform record: missing natural key");
    }
}
