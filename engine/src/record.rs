//! Record types for the entries being synchronized.

use crate::{AttributeKey, NativeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Metadata key carrying the explicit sync identifier, when the source
/// system provides one.
pub const SYNC_ID_KEY: &str = "sync_id";

/// Canonical in-memory representation of one importable entry.
///
/// Records are value-like; the engine never rewrites a record's identity
/// after construction. The only engine-side mutation is
/// [`Record::assign_native_id`] after a successful create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stable slug-like key, always present
    pub natural_key: String,
    /// Destination store id; absent until the record has been persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_id: Option<NativeId>,
    /// Scalar attributes (title, summary, ...)
    #[serde(default)]
    pub fields: BTreeMap<AttributeKey, Value>,
    /// Plain keyed metadata; may carry [`SYNC_ID_KEY`]
    #[serde(default)]
    pub metadata: BTreeMap<AttributeKey, Value>,
    /// Categorical attributes, keyed by group name
    #[serde(default)]
    pub labels: BTreeMap<AttributeKey, Value>,
    /// Media/reference attributes, keyed by slot name
    #[serde(default)]
    pub media: BTreeMap<AttributeKey, Value>,
    /// Opaque payload handed through to the persister
    #[serde(default)]
    pub payload: Value,
}

impl Record {
    /// Create a new record with the given natural key.
    pub fn new(natural_key: impl Into<String>) -> Self {
        Self {
            natural_key: natural_key.into(),
            native_id: None,
            fields: BTreeMap::new(),
            metadata: BTreeMap::new(),
            labels: BTreeMap::new(),
            media: BTreeMap::new(),
            payload: Value::Null,
        }
    }

    /// Set the native id (builder form, for records read from the store).
    pub fn with_native_id(mut self, native_id: NativeId) -> Self {
        self.native_id = Some(native_id);
        self
    }

    /// Add a scalar field.
    pub fn with_field(mut self, key: impl Into<AttributeKey>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<AttributeKey>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Set the explicit sync identifier.
    pub fn with_sync_id(self, sync_id: impl Into<String>) -> Self {
        self.with_metadata(SYNC_ID_KEY, Value::String(sync_id.into()))
    }

    /// Add a label group.
    pub fn with_label(mut self, group: impl Into<AttributeKey>, value: Value) -> Self {
        self.labels.insert(group.into(), value);
        self
    }

    /// Add a media slot.
    pub fn with_media(mut self, slot: impl Into<AttributeKey>, value: Value) -> Self {
        self.media.insert(slot.into(), value);
        self
    }

    /// Set the opaque payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Assign the identifier returned by the persister after a create.
    pub fn assign_native_id(&mut self, native_id: NativeId) {
        self.native_id = Some(native_id);
    }

    /// The explicit sync identifier, if the metadata carries one.
    pub fn sync_id(&self) -> Option<&Value> {
        self.metadata.get(SYNC_ID_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_record() {
        let record = Record::new("widget-a")
            .with_field("title", json!("Widget A"))
            .with_metadata("origin", json!("catalog"))
            .with_label("category", json!(["tools"]))
            .with_media("cover_image_url", json!("https://img/a.png"));

        assert_eq!(record.natural_key, "widget-a");
        assert_eq!(record.native_id, None);
        assert_eq!(record.fields["title"], json!("Widget A"));
        assert_eq!(record.labels["category"], json!(["tools"]));
        assert_eq!(record.payload, Value::Null);
    }

    #[test]
    fn sync_id_lives_in_metadata() {
        let record = Record::new("widget-a").with_sync_id("4242");
        assert_eq!(record.sync_id(), Some(&json!("4242")));
        assert_eq!(record.metadata[SYNC_ID_KEY], json!("4242"));

        let bare = Record::new("widget-b");
        assert_eq!(bare.sync_id(), None);
    }

    #[test]
    fn assign_native_id() {
        let mut record = Record::new("widget-a");
        record.assign_native_id(7);
        assert_eq!(record.native_id, Some(7));
    }

    #[test]
    fn serialization_roundtrip() {
        let record = Record::new("widget-a")
            .with_native_id(3)
            .with_field("title", json!("Widget A"))
            .with_payload(json!({"raw": true}));

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("naturalKey")); // camelCase
        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }

    #[test]
    fn deserialize_with_defaults() {
        let parsed: Record = serde_json::from_str(r#"{"naturalKey":"widget-a"}"#).unwrap();
        assert_eq!(parsed.natural_key, "widget-a");
        assert!(parsed.fields.is_empty());
        assert!(parsed.media.is_empty());
        assert_eq!(parsed.payload, Value::Null);
    }
}
