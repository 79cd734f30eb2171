//! Persister over the JSON destination store.
//!
//! Owns the dry-run branch: in dry-run mode every call returns a synthetic
//! identifier from a reserved range and the store is never touched, so a
//! dry run is a faithful predictor of the live run.

use crate::store::{EntryId, JsonStore};
use converge_engine::{NativeId, PersistError, Persister, Record, UpdateReasons};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

/// Media slot promoted to the entry's cover attachment.
pub const COVER_IMAGE_SLOT: &str = "cover_image_url";

/// Metadata key the cover attachment id is written under.
pub const COVER_ATTACHMENT_KEY: &str = "cover_attachment_id";

/// First identifier of the synthetic (dry-run) range; far above anything a
/// real store hands out.
pub const SYNTHETIC_ID_BASE: NativeId = 1_000_000_000;

/// Applies create/update/delete against a shared [`JsonStore`] handle.
pub struct StorePersister {
    store: Rc<RefCell<JsonStore>>,
    next_synthetic: NativeId,
}

impl StorePersister {
    /// Wrap a shared store handle.
    pub fn new(store: Rc<RefCell<JsonStore>>) -> Self {
        Self {
            store,
            next_synthetic: SYNTHETIC_ID_BASE,
        }
    }

    fn next_synthetic_id(&mut self) -> NativeId {
        self.next_synthetic += 1;
        self.next_synthetic
    }

    /// Attach every media slot of the record to the entry. The cover slot
    /// becomes the entry's cover attachment; other slots are written as
    /// metadata references under the slot name.
    fn save_entry_media(&self, entry_id: EntryId, record: &Record, dry_run: bool) {
        if dry_run {
            return;
        }
        let mut store = self.store.borrow_mut();
        for (slot, value) in &record.media {
            let Some(url) = value.as_str() else {
                tracing::warn!(slot = %slot, "media slot value is not a URL, skipping");
                continue;
            };
            let attachment_id = store.attach(url);
            let key = if slot == COVER_IMAGE_SLOT {
                COVER_ATTACHMENT_KEY
            } else {
                slot.as_str()
            };
            store.set_entry_metadata(entry_id, key, json!(attachment_id));
            tracing::debug!(entry = entry_id, slot = %slot, attachment = attachment_id, "media attached");
        }
    }
}

impl Persister for StorePersister {
    fn create(&mut self, record: &Record, dry_run: bool) -> Result<NativeId, PersistError> {
        let id = if dry_run {
            self.next_synthetic_id()
        } else {
            self.store.borrow_mut().insert(record)
        };
        self.save_entry_media(id, record, dry_run);
        tracing::debug!(entry = id, key = %record.natural_key, dry_run, "entry created");
        Ok(id)
    }

    fn update(
        &mut self,
        record: &Record,
        existing_id: NativeId,
        _reasons: &UpdateReasons,
        dry_run: bool,
    ) -> Result<NativeId, PersistError> {
        if !dry_run && !self.store.borrow_mut().update(existing_id, record) {
            return Err(PersistError::new(
                "entry_missing",
                format!("no entry with id {existing_id}"),
            ));
        }
        self.save_entry_media(existing_id, record, dry_run);
        tracing::debug!(entry = existing_id, key = %record.natural_key, dry_run, "entry updated");
        Ok(existing_id)
    }

    fn delete(&mut self, record: &Record, dry_run: bool) -> Result<(), PersistError> {
        if dry_run {
            return Ok(());
        }
        let Some(native_id) = record.native_id else {
            return Err(PersistError::new(
                "missing_native_id",
                format!("record {} has no native id to delete", record.natural_key),
            ));
        };
        // An already-gone entry is not an error.
        self.store.borrow_mut().remove(native_id);
        tracing::debug!(entry = native_id, key = %record.natural_key, "entry deleted");
        Ok(())
    }
}
