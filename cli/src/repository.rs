//! Concrete repositories: the source export file and the destination store.

use crate::store::JsonStore;
use converge_engine::{RawRecord, Repository, RepositoryError};
use serde_json::Value;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Reads a JSON array of raw records from a file.
pub struct SourceFileRepository {
    path: PathBuf,
}

impl SourceFileRepository {
    /// Repository over the given export file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Repository for SourceFileRepository {
    fn find_all(&self) -> Result<Vec<RawRecord>, RepositoryError> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|err| RepositoryError::Io(format!("{}: {err}", self.path.display())))?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|err| RepositoryError::Malformed(err.to_string()))?;
        match value {
            Value::Array(items) => Ok(items),
            _ => Err(RepositoryError::Malformed(
                "expected a JSON array of records".into(),
            )),
        }
    }
}

/// Reads the current entries of the destination store.
pub struct StoreRepository {
    store: Rc<RefCell<JsonStore>>,
}

impl StoreRepository {
    /// Repository over a shared store handle.
    pub fn new(store: Rc<RefCell<JsonStore>>) -> Self {
        Self { store }
    }
}

impl Repository for StoreRepository {
    fn find_all(&self) -> Result<Vec<RawRecord>, RepositoryError> {
        self.store
            .borrow()
            .entries()
            .map(|entry| {
                serde_json::to_value(entry).map_err(|err| RepositoryError::Malformed(err.to_string()))
            })
            .collect()
    }
}
