//! Request types handed to the Syncer and the Importer.

use crate::Record;
use serde::{Deserialize, Serialize};

/// Immutable input to one sync run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// Records as the source wants them to be
    pub new_records: Vec<Record>,
    /// Records currently in the destination
    pub existing_records: Vec<Record>,
    /// Exercise the full decision path without external mutation
    #[serde(default)]
    pub dry_run: bool,
    /// When false, the delete phase is a no-op even if candidates exist
    #[serde(default)]
    pub deletion_enabled: bool,
}

impl SyncRequest {
    /// Build a request with both flags off.
    pub fn new(new_records: Vec<Record>, existing_records: Vec<Record>) -> Self {
        Self {
            new_records,
            existing_records,
            dry_run: false,
            deletion_enabled: false,
        }
    }

    /// Set the dry-run flag.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the deletion-enabled flag.
    pub fn with_deletion_enabled(mut self, deletion_enabled: bool) -> Self {
        self.deletion_enabled = deletion_enabled;
        self
    }
}

/// Input to one import run; the collections are fetched by the Importer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    /// Passed through to every collaborator
    #[serde(default)]
    pub dry_run: bool,
    /// Passed through to the sync request
    #[serde(default)]
    pub deletion_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_off() {
        let request = SyncRequest::new(vec![], vec![]);
        assert!(!request.dry_run);
        assert!(!request.deletion_enabled);
    }

    #[test]
    fn builder_flags() {
        let request = SyncRequest::new(vec![], vec![])
            .with_dry_run(true)
            .with_deletion_enabled(true);
        assert!(request.dry_run);
        assert!(request.deletion_enabled);
    }

    #[test]
    fn deserialize_without_flags() {
        let parsed: SyncRequest =
            serde_json::from_str(r#"{"newRecords":[],"existingRecords":[]}"#).unwrap();
        assert!(!parsed.dry_run);
        assert!(!parsed.deletion_enabled);
    }
}
