//! # Converge Engine
//!
//! A reconciliation engine for bulk imports.
//!
//! This crate provides the core logic for reconciling two collections of
//! records - a source set and a destination set - into a single target set by
//! computing and applying the minimal create/update/delete operations needed
//! to make the destination match the source.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of files, network, or storage
//! - **Identity matching**: records are matched by a resolved identity key,
//!   never by storage-native ids
//! - **Dry-run faithful**: the dry-run path is structurally identical to the
//!   live path; only the persister branches on the flag
//! - **Per-item error isolation**: a failing create or update never aborts
//!   the batch
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! Data is exchanged as [`Record`] values with:
//! - A stable natural key (slug-like)
//! - An optional destination-native id
//! - Scalar fields plus three keyed attribute categories
//!   (metadata, labels, media)
//! - An opaque payload handed through to the persister
//!
//! ### Plans
//!
//! A sync run first classifies every record into a [`SyncPlan`] - records to
//! create, [`UpdateEntry`] triples to update, records to delete - and then
//! executes the plan phase by phase against a [`Persister`].
//!
//! ### Outcomes
//!
//! Everything a run did is accumulated into a [`SyncOutcome`]: item
//! inventories, created/updated/deleted/skipped/retained buckets, per-item
//! errors with context, and an overall status. The [`Importer`] wraps it
//! into an [`ImportOutcome`] together with import-level timing.
//!
//! ## Quick Start
//!
//! ```rust
//! use converge_engine::{
//!     ComparisonConfig, NativeId, NoopProgress, PersistError, Persister,
//!     Record, SyncRequest, SyncStatus, Syncer, UpdateReasons,
//! };
//! use serde_json::json;
//!
//! struct Discard;
//!
//! impl Persister for Discard {
//!     fn create(&mut self, _: &Record, _: bool) -> Result<NativeId, PersistError> {
//!         Ok(1)
//!     }
//!     fn update(
//!         &mut self,
//!         _: &Record,
//!         id: NativeId,
//!         _: &UpdateReasons,
//!         _: bool,
//!     ) -> Result<NativeId, PersistError> {
//!         Ok(id)
//!     }
//!     fn delete(&mut self, _: &Record, _: bool) -> Result<(), PersistError> {
//!         Ok(())
//!     }
//! }
//!
//! let new_records = vec![Record::new("alpha").with_field("title", json!("Alpha"))];
//! let mut syncer = Syncer::new(Discard, ComparisonConfig::default());
//! let outcome = syncer.sync(SyncRequest::new(new_records, vec![]), &mut NoopProgress);
//!
//! assert_eq!(outcome.status, SyncStatus::Success);
//! assert_eq!(outcome.created_items, vec!["alpha#alpha".to_string()]);
//! ```

pub mod compare;
pub mod error;
pub mod identity;
pub mod importer;
pub mod outcome;
pub mod persist;
pub mod plan;
pub mod progress;
pub mod record;
pub mod repository;
pub mod request;
pub mod syncer;
pub mod transform;

// Re-export main types at crate root
pub use compare::{update_reasons, ComparisonConfig, UpdateReasons, ValueChange};
pub use error::Error;
pub use identity::{loggable_id, AttributeStore, IdentityResolver};
pub use importer::Importer;
pub use outcome::{
    FatalError, ImportOutcome, ImportStatus, ItemError, ShortReport, SyncOutcome, SyncStatus,
};
pub use persist::{PersistError, Persister};
pub use plan::{SyncPlan, UpdateEntry};
pub use progress::{NoopProgress, Progress};
pub use record::{Record, SYNC_ID_KEY};
pub use repository::{Repository, RepositoryError};
pub use request::{ImportRequest, SyncRequest};
pub use syncer::Syncer;
pub use transform::{TransformError, Transformer};

/// Type aliases for clarity
pub type NativeId = u64;
pub type AttributeKey = String;
pub type Identity = String;
pub type RawRecord = serde_json::Value;
