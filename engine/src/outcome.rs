//! Outcome accounting for sync and import runs.
//!
//! A [`SyncOutcome`] is created at sync start, appended to during execution,
//! and returned frozen at sync end (or at the first fatal error). The
//! [`ImportOutcome`] wraps it with import-level status and timing.

use crate::compare::UpdateReasons;
use crate::persist::PersistError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Overall status of a sync run; doubles as the message key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// The plan executed (possibly with per-item errors)
    Success,
    /// A fatal, batch-level error aborted the run
    Error,
    /// The plan was empty; nothing to do
    Noop,
}

/// Overall status of an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Success,
    Error,
}

/// A per-item persist failure, recorded without aborting the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemError {
    /// The operation that failed ("create" or "update")
    pub context: String,
    /// Machine-readable error code from the persister
    pub code: String,
    /// Human-readable message from the persister
    pub message: String,
    /// The reason map of the failed update, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasons: Option<UpdateReasons>,
}

impl ItemError {
    /// Tag a persist error with its operation context.
    pub fn new(context: impl Into<String>, error: PersistError) -> Self {
        Self {
            context: context.into(),
            code: error.code,
            message: error.message,
            reasons: None,
        }
    }

    /// Attach the update reason map to the error context.
    pub fn with_reasons(mut self, reasons: UpdateReasons) -> Self {
        self.reasons = Some(reasons);
        self
    }
}

/// A fatal, batch-level error with the stage it originated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FatalError {
    /// Where the run died ("analysis", "execution", "fetch")
    pub stage: String,
    /// The captured error message
    pub message: String,
}

impl FatalError {
    /// Capture an error at the given stage.
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

/// The accumulated record of what one sync run did.
///
/// Item buckets are keyed by loggable identifiers
/// (`<natural-key>#<identity>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    /// HTTP-style status code (200 success/noop, 500 fatal error)
    pub code: u16,
    /// Overall status
    pub status: SyncStatus,
    /// Seconds spent in the sync run, stamped by the Importer
    pub generation_time: f64,
    /// Inventory of all new-side records
    pub new_items: Vec<String>,
    /// Inventory of all existing-side records
    pub existing_items: Vec<String>,
    /// Records created
    pub created_items: Vec<String>,
    /// Matched records with nothing to change
    pub skipped_items: Vec<String>,
    /// Records updated, with the reasons that triggered each update
    pub updated_items: BTreeMap<String, UpdateReasons>,
    /// Records deleted
    pub deleted_items: Vec<String>,
    /// Existing-only records kept because deletion was disabled
    pub retained_items: Vec<String>,
    /// Per-item failures, keyed by loggable identifier
    pub errored_items: BTreeMap<String, ItemError>,
    /// The fatal error, when status is [`SyncStatus::Error`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FatalError>,
}

impl Default for SyncOutcome {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncOutcome {
    /// Fresh accumulator with success status.
    pub fn new() -> Self {
        Self {
            code: 200,
            status: SyncStatus::Success,
            generation_time: 0.0,
            new_items: Vec::new(),
            existing_items: Vec::new(),
            created_items: Vec::new(),
            skipped_items: Vec::new(),
            updated_items: BTreeMap::new(),
            deleted_items: Vec::new(),
            retained_items: Vec::new(),
            errored_items: BTreeMap::new(),
            error: None,
        }
    }

    /// Record a created item.
    pub fn add_created_item(&mut self, id: String) {
        self.created_items.push(id);
    }

    /// Record a skipped item.
    pub fn add_skipped_item(&mut self, id: String) {
        self.skipped_items.push(id);
    }

    /// Record an updated item with its reasons.
    pub fn add_updated_item(&mut self, id: String, reasons: UpdateReasons) {
        self.updated_items.insert(id, reasons);
    }

    /// Record a deleted item.
    pub fn add_deleted_item(&mut self, id: String) {
        self.deleted_items.push(id);
    }

    /// Record an existing-only item kept because deletion was disabled.
    pub fn add_retained_item(&mut self, id: String) {
        self.retained_items.push(id);
    }

    /// Record a per-item failure.
    pub fn add_errored_item(&mut self, id: String, error: ItemError) {
        self.errored_items.insert(id, error);
    }

    /// Mark the run as a no-op.
    pub fn set_noop(&mut self) {
        self.status = SyncStatus::Noop;
    }

    /// Mark the run as fatally failed.
    pub fn set_fatal(&mut self, error: FatalError) {
        self.code = 500;
        self.status = SyncStatus::Error;
        self.error = Some(error);
    }

    /// Whether the run completed without a fatal error.
    pub fn is_success(&self) -> bool {
        matches!(self.status, SyncStatus::Success | SyncStatus::Noop)
    }

    /// The count-only summary.
    pub fn to_short_report(&self) -> ShortReport {
        ShortReport {
            generation_time: self.generation_time,
            new_items: self.new_items.len(),
            existing_items: self.existing_items.len(),
            created_items: self.created_items.len(),
            skipped_items: self.skipped_items.len(),
            updated_items: self.updated_items.len(),
            deleted_items: self.deleted_items.len(),
            retained_items: self.retained_items.len(),
            errored_items: self.errored_items.len(),
            error: self.error.as_ref().map(|e| e.message.clone()),
            error_stage: self.error.as_ref().map(|e| e.stage.clone()),
        }
    }
}

/// Count-only summary of a sync run, for display and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortReport {
    pub generation_time: f64,
    pub new_items: usize,
    pub existing_items: usize,
    pub created_items: usize,
    pub skipped_items: usize,
    pub updated_items: usize,
    pub deleted_items: usize,
    pub retained_items: usize,
    pub errored_items: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_stage: Option<String>,
}

/// The record of one import run: the sync outcome plus import-level
/// status and timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    /// HTTP-style status code, mirroring the sync outcome
    pub code: u16,
    /// Overall status
    pub status: ImportStatus,
    /// Seconds spent in the whole import run
    pub duration: f64,
    /// The wrapped sync outcome; absent when fetching failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncOutcome>,
    /// The fatal error, when status is [`ImportStatus::Error`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FatalError>,
}

impl ImportOutcome {
    /// Wrap a finished sync outcome.
    pub fn from_sync(sync: SyncOutcome, duration: f64) -> Self {
        let status = if sync.is_success() {
            ImportStatus::Success
        } else {
            ImportStatus::Error
        };
        Self {
            code: sync.code,
            status,
            duration,
            error: sync.error.clone(),
            sync: Some(sync),
        }
    }

    /// An import that died before the sync could run.
    pub fn fatal(error: FatalError, duration: f64) -> Self {
        Self {
            code: 500,
            status: ImportStatus::Error,
            duration,
            sync: None,
            error: Some(error),
        }
    }

    /// Whether the import completed without a fatal error.
    pub fn is_success(&self) -> bool {
        self.status == ImportStatus::Success
    }
}
