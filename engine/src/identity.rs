//! Identity resolution for matching records across the two sides.
//!
//! A record's identity is derived, not stored: the explicit sync identifier
//! wins, then a lookup in an external attribute store, then the natural key.
//! Matching is equality of resolved identity - a new-side record has no
//! native id yet, so native ids are never compared.

use crate::record::SYNC_ID_KEY;
use crate::{Identity, NativeId, Record};
use serde_json::Value;

/// External keyed field store, consulted for records that already have a
/// native id (identity lookups and comparison fallbacks).
pub trait AttributeStore {
    /// Look up a metadata field for a stored entry.
    fn field(&self, native_id: NativeId, key: &str) -> Option<Value>;

    /// Look up a label group for a stored entry.
    fn labels(&self, native_id: NativeId, group: &str) -> Option<Value>;
}

/// The identifier used for logging and outcome keying:
/// `<natural-key>#<resolved-identity>`. Always computable, even for records
/// that have not been persisted yet.
pub fn loggable_id(natural_key: &str, identity: &str) -> String {
    format!("{natural_key}#{identity}")
}

/// Resolves record identities against an optional attribute store.
pub struct IdentityResolver<'a> {
    store: Option<&'a dyn AttributeStore>,
}

impl<'a> IdentityResolver<'a> {
    /// Create a resolver. Without a store, resolution falls back from the
    /// sync-id attribute straight to the natural key.
    pub fn new(store: Option<&'a dyn AttributeStore>) -> Self {
        Self { store }
    }

    /// Resolve the identity of a record, in priority order: explicit
    /// sync-id attribute, attribute-store lookup by native id, natural key.
    pub fn resolve(&self, record: &Record) -> Identity {
        if let Some(identity) = record.sync_id().and_then(identity_text) {
            return identity;
        }

        if let (Some(native_id), Some(store)) = (record.native_id, self.store) {
            if let Some(identity) = store
                .field(native_id, SYNC_ID_KEY)
                .as_ref()
                .and_then(identity_text)
            {
                return identity;
            }
        }

        record.natural_key.clone()
    }

    /// The loggable identifier of a record.
    pub fn loggable_id(&self, record: &Record) -> String {
        loggable_id(&record.natural_key, &self.resolve(record))
    }
}

/// Turn an attribute value into identity text. Empty and non-scalar values
/// do not qualify as identities.
fn identity_text(value: &Value) -> Option<Identity> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
