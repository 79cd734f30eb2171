//! Error types for the Converge engine.
//!
//! Two tiers exist: the fatal tier here aborts a whole run, while the
//! recoverable tier ([`PersistError`](crate::PersistError),
//! [`TransformError`](crate::TransformError)) is caught per record and
//! carried inside outcomes.

use crate::persist::PersistError;
use thiserror::Error;

/// Fatal, batch-level errors from the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A matched existing-side record carries no native id, so there is
    /// nothing to address an update or delete at. Detected during plan
    /// construction.
    #[error("matched existing record has no native id: {0}")]
    MissingNativeId(String),

    /// A delete failed. Deletes are not tracked per item; a failing one
    /// aborts the remaining work.
    #[error("delete failed: {0}")]
    Delete(#[from] PersistError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::MissingNativeId("widget#w-1".into());
        assert_eq!(
            err.to_string(),
            "matched existing record has no native id: widget#w-1"
        );

        let err = Error::Delete(PersistError::new("storage", "store file corrupted"));
        assert_eq!(err.to_string(), "delete failed: storage: store file corrupted");
    }
}
