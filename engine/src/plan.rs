//! The computed classification for one sync run.
//!
//! A plan is computed once from a sync request and consumed once by
//! execution; it is not incrementally recomputable. The three sequences are
//! disjoint by identity and, together with the skipped and retained items
//! recorded on the outcome, cover the union of both input collections.

use crate::compare::UpdateReasons;
use crate::{NativeId, Record};
use serde::{Deserialize, Serialize};

/// One record to update: the new-side record, the native id of the matched
/// existing-side record, and the reasons that triggered the update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntry {
    /// The new-side record whose values win
    pub record: Record,
    /// Native id of the matched existing-side record
    pub existing_id: NativeId,
    /// Non-empty map of changed attributes
    pub reasons: UpdateReasons,
}

/// The create/update/delete classification for one sync run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPlan {
    /// New-side records with no identity match in the existing set
    pub to_create: Vec<Record>,
    /// Matched pairs with a non-empty reason map
    pub to_update: Vec<UpdateEntry>,
    /// Existing-side records with no identity match in the new set
    /// (only populated when deletion is enabled)
    pub to_delete: Vec<Record>,
}

impl SyncPlan {
    /// Total number of operations the plan will execute.
    pub fn op_count(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }

    /// Whether executing the plan would do nothing.
    pub fn is_empty(&self) -> bool {
        self.op_count() == 0
    }
}
