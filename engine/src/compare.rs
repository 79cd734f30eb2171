//! Update-need detection between a new-side record and its matched
//! existing-side record.
//!
//! Comparison is driven by what the new side specifies: a keyed attribute
//! category is scanned only when the new record declares at least one key in
//! it, and the keys checked are exactly the new side's keys. Scalar fields
//! are compared against an explicit, configured key list, again only for
//! the keys the new side carries.
//!
//! Values are normalized to canonical text (composite values serialized as
//! JSON with recursively sorted object keys) and trimmed before comparison,
//! so detection is deterministic and testable independently of value shapes.

use crate::identity::AttributeStore;
use crate::{AttributeKey, NativeId, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Scalar comparison keys, supplied to the Syncer at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonConfig {
    /// Scalar field keys compared on matched pairs, for the keys the new
    /// side carries
    pub field_keys: Vec<AttributeKey>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            field_keys: vec!["title".into(), "summary".into()],
        }
    }
}

impl ComparisonConfig {
    /// Configuration comparing the given scalar keys.
    pub fn with_field_keys(field_keys: Vec<AttributeKey>) -> Self {
        Self { field_keys }
    }
}

/// The literal (new, old) pair recorded for a changed attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChange {
    /// Value on the new side
    pub new: Option<Value>,
    /// Value on the existing side (absent when missing entirely)
    pub old: Option<Value>,
}

/// Changed attribute keys mapped to their (new, old) pairs. Emptiness after
/// comparison means "no update needed".
pub type UpdateReasons = BTreeMap<AttributeKey, ValueChange>;

/// Compare a new-side record with its matched existing-side record and
/// collect every changed attribute into an [`UpdateReasons`] map.
pub fn update_reasons(
    new: &Record,
    existing: &Record,
    config: &ComparisonConfig,
    store: Option<&dyn AttributeStore>,
) -> UpdateReasons {
    let mut reasons = UpdateReasons::new();

    for key in &config.field_keys {
        let Some(new_value) = new.fields.get(key) else {
            continue;
        };
        let old_value = existing.fields.get(key);
        if value_changed(new_value, old_value) {
            reasons.insert(
                key.clone(),
                ValueChange {
                    new: Some(new_value.clone()),
                    old: old_value.cloned(),
                },
            );
        }
    }

    for (key, new_value) in &new.metadata {
        let old_value = present(existing.metadata.get(key))
            .cloned()
            .or_else(|| stored_field(store, existing.native_id, key));
        if value_changed(new_value, old_value.as_ref()) {
            reasons.insert(
                key.clone(),
                ValueChange {
                    new: Some(new_value.clone()),
                    old: old_value,
                },
            );
        }
    }

    for (group, new_value) in &new.labels {
        let old_value = present(existing.labels.get(group))
            .cloned()
            .or_else(|| stored_labels(store, existing.native_id, group));
        if value_changed(new_value, old_value.as_ref()) {
            reasons.insert(
                group.clone(),
                ValueChange {
                    new: Some(new_value.clone()),
                    old: old_value,
                },
            );
        }
    }

    for (slot, new_value) in &new.media {
        let old_value = existing.media.get(slot);
        if value_changed(new_value, old_value) {
            reasons.insert(
                slot.clone(),
                ValueChange {
                    new: Some(new_value.clone()),
                    old: old_value.cloned(),
                },
            );
        }
    }

    reasons
}

/// Whether a compared value differs between the two sides. A missing (or
/// null) existing value counts as changed.
pub fn value_changed(new: &Value, existing: Option<&Value>) -> bool {
    let existing = match existing {
        None | Some(Value::Null) => return true,
        Some(value) => value,
    };
    canonical_text(new).trim() != canonical_text(existing).trim()
}

/// Normalize a value to canonical text: strings raw, scalars as their JSON
/// text, composites as JSON with recursively sorted object keys.
pub fn canonical_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => canonicalize(value).to_string(),
        other => other.to_string(),
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), v))
                    .collect(),
            )
        }
        other => other.clone(),
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn stored_field(
    store: Option<&dyn AttributeStore>,
    native_id: Option<NativeId>,
    key: &str,
) -> Option<Value> {
    store?.field(native_id?, key)
}

fn stored_labels(
    store: Option<&dyn AttributeStore>,
    native_id: Option<NativeId>,
    group: &str,
) -> Option<Value> {
    store?.labels(native_id?, group)
}
