//! Converge CLI - the command layer and the concrete collaborators around
//! the reconciliation engine.
//!
//! The engine stays free of I/O; everything here is the outer surface: a
//! JSON-file source repository, a JSON-file destination store with its
//! persister and attachment handling, transformers, an indicatif progress
//! bar, and report output.

pub mod config;
pub mod error;
pub mod persister;
pub mod progress;
pub mod report;
pub mod repository;
pub mod store;
pub mod transformer;

pub use error::CliError;
