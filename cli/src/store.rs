//! JSON-file destination store.
//!
//! The store is a single JSON document: numbered entries plus an attachment
//! library. Maps are `BTreeMap` so the file serializes in a deterministic
//! order. One counter numbers entries and attachments alike.

use crate::error::Result;
use chrono::{DateTime, Utc};
use converge_engine::{AttributeStore, NativeId, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Identifier of a stored entry or attachment.
pub type EntryId = u64;

/// Version of the store file format.
pub const STORE_FORMAT_VERSION: u32 = 1;

/// One persisted entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry {
    /// Store-assigned id
    pub id: EntryId,
    /// Natural key of the record this entry was persisted from
    pub natural_key: String,
    /// Scalar attributes
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    /// Keyed metadata (includes attachment references written by the
    /// persister)
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    /// Categorical attributes
    #[serde(default)]
    pub labels: BTreeMap<String, Value>,
    /// Media slots as imported (source URLs)
    #[serde(default)]
    pub media: BTreeMap<String, Value>,
    /// When the entry was first persisted
    pub created_at: DateTime<Utc>,
    /// When the entry was last overwritten
    pub updated_at: DateTime<Utc>,
}

/// One attachment in the media library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Store-assigned id
    pub id: EntryId,
    /// File name derived from the source URL; the dedup key
    pub file_name: String,
    /// Where the attachment came from
    pub source_url: String,
}

/// The on-disk document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreFile {
    /// Store file format version
    pub format_version: u32,
    /// Last id handed out
    pub next_id: EntryId,
    /// Entries by id
    pub entries: BTreeMap<EntryId, StoredEntry>,
    /// Attachments by id
    pub attachments: BTreeMap<EntryId, Attachment>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            format_version: STORE_FORMAT_VERSION,
            next_id: 0,
            entries: BTreeMap::new(),
            attachments: BTreeMap::new(),
        }
    }
}

/// A loaded store, bound to its file path.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    data: StoreFile,
}

impl JsonStore {
    /// Load a store file; a missing file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            StoreFile::default()
        };
        Ok(Self { path, data })
    }

    /// Write the store back to its file.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.data)?)?;
        Ok(())
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, in id order.
    pub fn entries(&self) -> impl Iterator<Item = &StoredEntry> {
        self.data.entries.values()
    }

    /// One entry by id.
    pub fn entry(&self, id: EntryId) -> Option<&StoredEntry> {
        self.data.entries.get(&id)
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.data.entries.len()
    }

    /// All attachments, in id order.
    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.data.attachments.values()
    }

    fn next_id(&mut self) -> EntryId {
        self.data.next_id += 1;
        self.data.next_id
    }

    /// Persist a new entry from a record; returns its id.
    pub fn insert(&mut self, record: &Record) -> EntryId {
        let id = self.next_id();
        let now = Utc::now();
        self.data.entries.insert(
            id,
            StoredEntry {
                id,
                natural_key: record.natural_key.clone(),
                fields: record.fields.clone(),
                metadata: record.metadata.clone(),
                labels: record.labels.clone(),
                media: record.media.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Overwrite an entry with a record's values, keeping its creation
    /// time. Returns false when no such entry exists.
    pub fn update(&mut self, id: EntryId, record: &Record) -> bool {
        let Some(entry) = self.data.entries.get_mut(&id) else {
            return false;
        };
        entry.natural_key = record.natural_key.clone();
        entry.fields = record.fields.clone();
        entry.metadata = record.metadata.clone();
        entry.labels = record.labels.clone();
        entry.media = record.media.clone();
        entry.updated_at = Utc::now();
        true
    }

    /// Remove an entry. Returns false when no such entry exists.
    pub fn remove(&mut self, id: EntryId) -> bool {
        self.data.entries.remove(&id).is_some()
    }

    /// Write one metadata value onto an entry.
    pub fn set_entry_metadata(&mut self, id: EntryId, key: &str, value: Value) -> bool {
        let Some(entry) = self.data.entries.get_mut(&id) else {
            return false;
        };
        entry.metadata.insert(key.to_string(), value);
        entry.updated_at = Utc::now();
        true
    }

    /// Register an attachment for a source URL. An attachment with the same
    /// file name already in the library is reused.
    pub fn attach(&mut self, source_url: &str) -> EntryId {
        let file_name = file_name_of(source_url);
        if let Some(existing) = self
            .data
            .attachments
            .values()
            .find(|a| a.file_name == file_name)
        {
            return existing.id;
        }
        let id = self.next_id();
        self.data.attachments.insert(
            id,
            Attachment {
                id,
                file_name,
                source_url: source_url.to_string(),
            },
        );
        id
    }

    /// Remove every entry and attachment; returns the removed entry count.
    pub fn reset(&mut self) -> usize {
        let removed = self.data.entries.len();
        self.data.entries.clear();
        self.data.attachments.clear();
        removed
    }
}

/// The file name of a URL: its last path segment, query stripped.
fn file_name_of(url: &str) -> String {
    let path = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    if segment.is_empty() {
        path.to_string()
    } else {
        segment.to_string()
    }
}

/// Read-only attribute access over a shared store handle, for identity
/// lookups and comparison fallbacks inside the engine.
pub struct StoreAttributes {
    store: Rc<RefCell<JsonStore>>,
}

impl StoreAttributes {
    /// Wrap a shared store handle.
    pub fn new(store: Rc<RefCell<JsonStore>>) -> Self {
        Self { store }
    }
}

impl AttributeStore for StoreAttributes {
    fn field(&self, native_id: NativeId, key: &str) -> Option<Value> {
        self.store
            .borrow()
            .entry(native_id)
            .and_then(|entry| entry.metadata.get(key).cloned())
    }

    fn labels(&self, native_id: NativeId, group: &str) -> Option<Value> {
        self.store
            .borrow()
            .entry(native_id)
            .and_then(|entry| entry.labels.get(group).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(key: &str) -> Record {
        Record::new(key)
            .with_field("title", json!("Title"))
            .with_metadata("origin", json!("catalog"))
    }

    // The path only matters on save; these stores are never written.
    fn empty_store() -> JsonStore {
        let dir = tempfile::tempdir().unwrap();
        JsonStore::load(dir.path().join("store.json")).unwrap()
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let mut store = empty_store();
        assert_eq!(store.insert(&record("a")), 1);
        assert_eq!(store.insert(&record("b")), 2);
        assert_eq!(store.entry_count(), 2);
        assert_eq!(store.entry(1).unwrap().natural_key, "a");
    }

    #[test]
    fn update_keeps_creation_time() {
        let mut store = empty_store();
        let id = store.insert(&record("a"));
        let created_at = store.entry(id).unwrap().created_at;

        assert!(store.update(id, &record("a").with_field("title", json!("New"))));
        let entry = store.entry(id).unwrap();
        assert_eq!(entry.created_at, created_at);
        assert_eq!(entry.fields["title"], json!("New"));

        assert!(!store.update(999, &record("a")));
    }

    #[test]
    fn attach_dedupes_by_file_name() {
        let mut store = empty_store();
        let first = store.attach("https://cdn.example.com/img/cover.png");
        let again = store.attach("https://mirror.example.com/other/cover.png?v=2");
        let other = store.attach("https://cdn.example.com/img/back.png");

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(store.attachments().count(), 2);
    }

    #[test]
    fn reset_clears_everything() {
        let mut store = empty_store();
        store.insert(&record("a"));
        store.insert(&record("b"));
        store.attach("https://cdn.example.com/img/cover.png");

        assert_eq!(store.reset(), 2);
        assert_eq!(store.entry_count(), 0);
        assert_eq!(store.attachments().count(), 0);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = JsonStore::load(&path).unwrap();
        let id = store.insert(&record("a"));
        store.attach("https://cdn.example.com/img/cover.png");
        store.save().unwrap();

        let reloaded = JsonStore::load(&path).unwrap();
        assert_eq!(reloaded.entry_count(), 1);
        assert_eq!(reloaded.entry(id).unwrap().natural_key, "a");
        assert_eq!(reloaded.attachments().count(), 1);

        // Ids keep advancing after a reload.
        let mut reloaded = reloaded;
        assert!(reloaded.insert(&record("b")) > id);
    }

    #[test]
    fn file_name_extraction() {
        assert_eq!(file_name_of("https://x/img/cover.png"), "cover.png");
        assert_eq!(file_name_of("https://x/img/cover.png?v=2#frag"), "cover.png");
        assert_eq!(file_name_of("cover.png"), "cover.png");
        assert_eq!(file_name_of("https://x/img/"), "https://x/img/");
    }

    #[test]
    fn store_attributes_reads_through_the_handle() {
        let mut store = empty_store();
        let id = store.insert(&record("a").with_label("category", json!(["tools"])));
        let handle = Rc::new(RefCell::new(store));
        let attributes = StoreAttributes::new(Rc::clone(&handle));

        assert_eq!(attributes.field(id, "origin"), Some(json!("catalog")));
        assert_eq!(attributes.field(id, "absent"), None);
        assert_eq!(attributes.labels(id, "category"), Some(json!(["tools"])));
        assert_eq!(attributes.field(999, "origin"), None);
    }
}
