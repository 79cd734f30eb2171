//! The import orchestrator: fetch, transform, sync, wrap.
//!
//! The importer drives the two repositories and transformers, hands the
//! normalized collections to the syncer, and wraps the sync outcome into an
//! import outcome. Transformation failures are logged and exclude the
//! record from the run; fetch failures are fatal.

use crate::outcome::{FatalError, ImportOutcome};
use crate::persist::Persister;
use crate::progress::Progress;
use crate::repository::{Repository, RepositoryError};
use crate::request::{ImportRequest, SyncRequest};
use crate::syncer::Syncer;
use crate::transform::Transformer;
use crate::Record;
use std::time::Instant;

/// Sequences repository fetches and transformation around one sync run.
pub struct Importer<P> {
    source_repository: Box<dyn Repository>,
    source_transformer: Box<dyn Transformer>,
    destination_repository: Box<dyn Repository>,
    destination_transformer: Box<dyn Transformer>,
    syncer: Syncer<P>,
}

impl<P: Persister> Importer<P> {
    /// Wire up an importer from its collaborators.
    pub fn new(
        source_repository: Box<dyn Repository>,
        source_transformer: Box<dyn Transformer>,
        destination_repository: Box<dyn Repository>,
        destination_transformer: Box<dyn Transformer>,
        syncer: Syncer<P>,
    ) -> Self {
        Self {
            source_repository,
            source_transformer,
            destination_repository,
            destination_transformer,
            syncer,
        }
    }

    /// Run one import. Never returns an error: fatal failures are captured
    /// into the outcome with error status.
    pub fn import(&mut self, request: ImportRequest, progress: &mut dyn Progress) -> ImportOutcome {
        let started = Instant::now();

        let new_records = match fetch_side(
            "source",
            self.source_repository.as_ref(),
            self.source_transformer.as_ref(),
            request.dry_run,
        ) {
            Ok(records) => records,
            Err(err) => {
                return ImportOutcome::fatal(
                    FatalError::new("fetch", err.to_string()),
                    started.elapsed().as_secs_f64(),
                )
            }
        };

        let existing_records = match fetch_side(
            "destination",
            self.destination_repository.as_ref(),
            self.destination_transformer.as_ref(),
            request.dry_run,
        ) {
            Ok(records) => records,
            Err(err) => {
                return ImportOutcome::fatal(
                    FatalError::new("fetch", err.to_string()),
                    started.elapsed().as_secs_f64(),
                )
            }
        };

        tracing::info!("starting the syncing process");
        let sync_started = Instant::now();
        let sync_request = SyncRequest::new(new_records, existing_records)
            .with_dry_run(request.dry_run)
            .with_deletion_enabled(request.deletion_enabled);
        let mut sync_outcome = self.syncer.sync(sync_request, progress);
        sync_outcome.generation_time = sync_started.elapsed().as_secs_f64();
        tracing::info!(
            seconds = sync_outcome.generation_time,
            "syncing process done"
        );

        ImportOutcome::from_sync(sync_outcome, started.elapsed().as_secs_f64())
    }
}

/// Fetch one side and normalize every record, dropping the ones that fail
/// to transform.
fn fetch_side(
    side: &str,
    repository: &dyn Repository,
    transformer: &dyn Transformer,
    dry_run: bool,
) -> Result<Vec<Record>, RepositoryError> {
    let fetch_started = Instant::now();
    tracing::info!(side, "fetching records");
    let raw_records = repository.find_all()?;
    tracing::info!(
        side,
        count = raw_records.len(),
        seconds = fetch_started.elapsed().as_secs_f64(),
        "records fetched"
    );

    let mut records = Vec::with_capacity(raw_records.len());
    for raw in raw_records {
        match transformer.transform(raw, dry_run) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::error!(side, error = %err, "record transformation failed");
            }
        }
    }
    tracing::info!(side, count = records.len(), "records transformed");

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::ComparisonConfig;
    use crate::outcome::{ImportStatus, SyncStatus};
    use crate::persist::PersistError;
    use crate::progress::NoopProgress;
    use crate::transform::TransformError;
    use crate::{NativeId, RawRecord, UpdateReasons};
    use serde_json::json;

    struct FixedRepository(Vec<RawRecord>);

    impl Repository for FixedRepository {
        fn find_all(&self) -> Result<Vec<RawRecord>, RepositoryError> {
            Ok(self.0.clone())
        }
    }

    struct FailingRepository;

    impl Repository for FailingRepository {
        fn find_all(&self) -> Result<Vec<RawRecord>, RepositoryError> {
            Err(RepositoryError::Io("connection refused".into()))
        }
    }

    /// Expects `{"slug": ..., "title": ...}`; anything without a slug is
    /// rejected.
    struct SlugTransformer;

    impl Transformer for SlugTransformer {
        fn transform(&self, raw: RawRecord, _dry_run: bool) -> Result<Record, TransformError> {
            let slug = raw
                .get("slug")
                .and_then(|v| v.as_str())
                .ok_or_else(|| TransformError::new("missing slug"))?;
            let mut record = Record::new(slug);
            if let Some(title) = raw.get("title") {
                record = record.with_field("title", title.clone());
            }
            if let Some(id) = raw.get("id").and_then(|v| v.as_u64()) {
                record = record.with_native_id(id);
            }
            Ok(record)
        }
    }

    #[derive(Default)]
    struct CountingPersister {
        creates: usize,
    }

    impl Persister for CountingPersister {
        fn create(&mut self, _: &Record, _: bool) -> Result<NativeId, PersistError> {
            self.creates += 1;
            Ok(self.creates as NativeId)
        }
        fn update(
            &mut self,
            _: &Record,
            id: NativeId,
            _: &UpdateReasons,
            _: bool,
        ) -> Result<NativeId, PersistError> {
            Ok(id)
        }
        fn delete(&mut self, _: &Record, _: bool) -> Result<(), PersistError> {
            Ok(())
        }
    }

    fn importer(
        source: Vec<RawRecord>,
        destination: Vec<RawRecord>,
    ) -> Importer<CountingPersister> {
        Importer::new(
            Box::new(FixedRepository(source)),
            Box::new(SlugTransformer),
            Box::new(FixedRepository(destination)),
            Box::new(SlugTransformer),
            Syncer::new(CountingPersister::default(), ComparisonConfig::default()),
        )
    }

    #[test]
    fn full_pipeline_creates_missing_records() {
        let mut importer = importer(
            vec![json!({"slug": "a", "title": "T1"})],
            vec![],
        );

        let outcome = importer.import(ImportRequest::default(), &mut NoopProgress);

        assert_eq!(outcome.status, ImportStatus::Success);
        let sync = outcome.sync.as_ref().unwrap();
        assert_eq!(sync.status, SyncStatus::Success);
        assert_eq!(sync.created_items, vec!["a#a".to_string()]);
        assert!(sync.generation_time >= 0.0);
        assert!(outcome.duration >= sync.generation_time);
    }

    #[test]
    fn untransformable_records_are_dropped_not_fatal() {
        let mut importer = importer(
            vec![
                json!({"title": "no slug here"}),
                json!({"slug": "b", "title": "T1"}),
            ],
            vec![],
        );

        let outcome = importer.import(ImportRequest::default(), &mut NoopProgress);

        assert_eq!(outcome.status, ImportStatus::Success);
        let sync = outcome.sync.as_ref().unwrap();
        assert_eq!(sync.new_items, vec!["b#b".to_string()]);
        assert_eq!(sync.created_items, vec!["b#b".to_string()]);
    }

    #[test]
    fn fetch_failure_is_a_fatal_import_outcome() {
        let mut importer = Importer::new(
            Box::new(FailingRepository),
            Box::new(SlugTransformer),
            Box::new(FixedRepository(vec![])),
            Box::new(SlugTransformer),
            Syncer::new(CountingPersister::default(), ComparisonConfig::default()),
        );

        let outcome = importer.import(ImportRequest::default(), &mut NoopProgress);

        assert_eq!(outcome.status, ImportStatus::Error);
        assert_eq!(outcome.code, 500);
        assert!(outcome.sync.is_none());
        let error = outcome.error.as_ref().unwrap();
        assert_eq!(error.stage, "fetch");
        assert!(error.message.contains("connection refused"));
    }

    #[test]
    fn noop_sync_is_a_successful_import() {
        let mut importer = importer(
            vec![json!({"slug": "a", "title": "T1"})],
            vec![json!({"slug": "a", "title": "T1", "id": 7})],
        );

        let outcome = importer.import(ImportRequest::default(), &mut NoopProgress);

        assert_eq!(outcome.status, ImportStatus::Success);
        assert_eq!(outcome.sync.as_ref().unwrap().status, SyncStatus::Noop);
    }

    #[test]
    fn flags_flow_through_to_the_sync_request() {
        let mut importer = importer(
            vec![],
            vec![json!({"slug": "gone", "title": "T1", "id": 7})],
        );

        let request = ImportRequest {
            dry_run: true,
            deletion_enabled: true,
        };
        let outcome = importer.import(request, &mut NoopProgress);

        let sync = outcome.sync.as_ref().unwrap();
        assert_eq!(sync.deleted_items, vec!["gone#gone".to_string()]);
    }
}
