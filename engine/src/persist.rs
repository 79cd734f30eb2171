//! The persister contract: applying one operation against a storage
//! backend.
//!
//! The persister owns the dry-run branch. In dry-run mode it must perform
//! no externally visible mutation and return a synthetic identifier, so the
//! engine's decision path stays identical in both modes.

use crate::compare::UpdateReasons;
use crate::{NativeId, Record};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A recoverable persist failure, recorded per item in the outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{code}: {message}")]
pub struct PersistError {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl PersistError {
    /// Create a persist error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Applies create/update/delete operations for single records.
pub trait Persister {
    /// Persist a new record and return its identifier (synthetic in
    /// dry-run mode).
    fn create(&mut self, record: &Record, dry_run: bool) -> Result<NativeId, PersistError>;

    /// Overwrite the stored entry `existing_id` with the record's values.
    /// The reason map says which attributes triggered the update.
    fn update(
        &mut self,
        record: &Record,
        existing_id: NativeId,
        reasons: &UpdateReasons,
        dry_run: bool,
    ) -> Result<NativeId, PersistError>;

    /// Remove the stored entry for the record. Failures here abort the
    /// batch; they are not tracked per item.
    fn delete(&mut self, record: &Record, dry_run: bool) -> Result<(), PersistError>;
}
