//! Transformers normalizing raw records into the engine's canonical shape.
//!
//! The source export uses its own field names (`slug`, `meta`, `tags`,
//! `images`); the destination side round-trips the store's own entries.
//! A record without a usable natural key is rejected and excluded from the
//! run by the importer.

use crate::store::StoredEntry;
use converge_engine::{RawRecord, Record, Transformer, TransformError, SYNC_ID_KEY};
use serde_json::Value;

/// Normalizes raw source records.
///
/// Expected shape:
/// `{"id": ..., "slug": ..., "title": ..., "summary": ...,
///   "meta": {...}, "tags": {...}, "images": {...}}`.
/// Only `slug` is required. The source id, when present, becomes the
/// explicit sync identifier.
pub struct SourceTransformer;

impl Transformer for SourceTransformer {
    fn transform(&self, raw: RawRecord, _dry_run: bool) -> Result<Record, TransformError> {
        let slug = raw
            .get("slug")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| TransformError::new("missing or empty slug"))?;

        let mut record = Record::new(slug);

        if let Some(id) = raw.get("id").filter(|v| !v.is_null()) {
            record = record.with_metadata(SYNC_ID_KEY, id.clone());
        }
        for key in ["title", "summary"] {
            if let Some(value) = raw.get(key).filter(|v| !v.is_null()) {
                record = record.with_field(key, value.clone());
            }
        }
        if let Some(meta) = raw.get("meta").and_then(Value::as_object) {
            for (key, value) in meta {
                record = record.with_metadata(key, value.clone());
            }
        }
        if let Some(tags) = raw.get("tags").and_then(Value::as_object) {
            for (group, value) in tags {
                record = record.with_label(group, value.clone());
            }
        }
        if let Some(images) = raw.get("images").and_then(Value::as_object) {
            for (slot, value) in images {
                record = record.with_media(slot, value.clone());
            }
        }

        Ok(record.with_payload(raw))
    }
}

/// Normalizes destination store entries back into records.
pub struct StoreTransformer;

impl Transformer for StoreTransformer {
    fn transform(&self, raw: RawRecord, _dry_run: bool) -> Result<Record, TransformError> {
        let entry: StoredEntry = serde_json::from_value(raw.clone())
            .map_err(|err| TransformError::new(format!("malformed store entry: {err}")))?;

        let mut record = Record::new(entry.natural_key).with_native_id(entry.id);
        record.fields = entry.fields;
        record.metadata = entry.metadata;
        record.labels = entry.labels;
        record.media = entry.media;
        Ok(record.with_payload(raw))
    }
}
