//! The reconciliation core: plan construction and execution.
//!
//! # Algorithm
//!
//! 1. Resolve identities and index the existing side once (O(N+M))
//! 2. Classify every new-side record as create, update, or skip
//! 3. Classify every unmatched existing-side record as delete or retained
//! 4. Execute all creates, then all updates, then all deletes, in plan
//!    order, recording per-item results and progress ticks
//!
//! Per-item persist failures never abort the batch. Only errors outside the
//! per-operation calls (plan construction, a failing delete) are fatal and
//! turn into an error-status outcome; the caller never sees a `Result`.

use crate::compare::{update_reasons, ComparisonConfig};
use crate::error::{Error, Result};
use crate::identity::{loggable_id, AttributeStore, IdentityResolver};
use crate::outcome::{FatalError, ItemError, SyncOutcome};
use crate::persist::Persister;
use crate::plan::{SyncPlan, UpdateEntry};
use crate::progress::Progress;
use crate::request::SyncRequest;
use crate::{Identity, Record};
use std::collections::{HashMap, HashSet};

/// Reconciles two record collections against a persister.
pub struct Syncer<P> {
    persister: P,
    config: ComparisonConfig,
    store: Option<Box<dyn AttributeStore>>,
}

impl<P: Persister> Syncer<P> {
    /// Create a syncer with the given persister and comparison keys.
    pub fn new(persister: P, config: ComparisonConfig) -> Self {
        Self {
            persister,
            config,
            store: None,
        }
    }

    /// Attach an external attribute store for identity lookups and
    /// comparison fallbacks.
    pub fn with_attribute_store(mut self, store: Box<dyn AttributeStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Recover the persister, consuming the syncer.
    pub fn into_persister(self) -> P {
        self.persister
    }

    /// Run one reconciliation. Never returns an error: fatal failures are
    /// captured into the outcome with error status.
    pub fn sync(&mut self, request: SyncRequest, progress: &mut dyn Progress) -> SyncOutcome {
        let SyncRequest {
            new_records,
            existing_records,
            dry_run,
            deletion_enabled,
        } = request;

        let mut outcome = SyncOutcome::new();

        tracing::info!(
            new = new_records.len(),
            existing = existing_records.len(),
            "analysing sync request"
        );
        let plan = match self.prepare(new_records, existing_records, deletion_enabled, &mut outcome)
        {
            Ok(plan) => plan,
            Err(err) => {
                outcome.set_fatal(FatalError::new("analysis", err.to_string()));
                return outcome;
            }
        };

        let op_count = plan.op_count();
        tracing::info!(
            operations = op_count,
            creates = plan.to_create.len(),
            updates = plan.to_update.len(),
            deletes = plan.to_delete.len(),
            skipped = outcome.skipped_items.len(),
            "sync request analysed"
        );

        if plan.is_empty() {
            outcome.set_noop();
            return outcome;
        }

        if let Err(err) = self.execute(plan, dry_run, op_count, &mut outcome, progress) {
            outcome.set_fatal(FatalError::new("execution", err.to_string()));
            return outcome;
        }
        tracing::info!("sync plan executed");

        outcome
    }

    /// Classify both collections into a plan, recording the inventories and
    /// the skipped/retained items on the outcome as a side effect.
    fn prepare(
        &self,
        new_records: Vec<Record>,
        existing_records: Vec<Record>,
        deletion_enabled: bool,
        outcome: &mut SyncOutcome,
    ) -> Result<SyncPlan> {
        let resolver = IdentityResolver::new(self.store.as_deref());

        // Resolve existing identities once and index them; first match wins
        // for duplicate identities.
        let existing: Vec<(Identity, Record)> = existing_records
            .into_iter()
            .map(|record| (resolver.resolve(&record), record))
            .collect();
        let mut index: HashMap<&Identity, usize> = HashMap::with_capacity(existing.len());
        for (i, (identity, _)) in existing.iter().enumerate() {
            index.entry(identity).or_insert(i);
        }

        outcome.new_items = new_records
            .iter()
            .map(|record| resolver.loggable_id(record))
            .collect();
        outcome.existing_items = existing
            .iter()
            .map(|(identity, record)| loggable_id(&record.natural_key, identity))
            .collect();

        let mut plan = SyncPlan::default();
        let mut new_identities: HashSet<Identity> = HashSet::with_capacity(outcome.new_items.len());

        for record in new_records {
            let identity = resolver.resolve(&record);
            let matched = index.get(&identity).copied();
            new_identities.insert(identity);

            let Some(i) = matched else {
                plan.to_create.push(record);
                continue;
            };

            let (existing_identity, existing_record) = &existing[i];
            let reasons = update_reasons(
                &record,
                existing_record,
                &self.config,
                self.store.as_deref(),
            );
            if reasons.is_empty() {
                outcome.add_skipped_item(resolver.loggable_id(&record));
            } else {
                let existing_id = existing_record.native_id.ok_or_else(|| {
                    Error::MissingNativeId(loggable_id(
                        &existing_record.natural_key,
                        existing_identity,
                    ))
                })?;
                plan.to_update.push(UpdateEntry {
                    record,
                    existing_id,
                    reasons,
                });
            }
        }

        for (identity, record) in existing {
            if new_identities.contains(&identity) {
                continue;
            }
            if deletion_enabled {
                plan.to_delete.push(record);
            } else {
                outcome.add_retained_item(loggable_id(&record.natural_key, &identity));
            }
        }

        Ok(plan)
    }

    /// Execute the plan phase by phase: creates, updates, deletes.
    fn execute(
        &mut self,
        plan: SyncPlan,
        dry_run: bool,
        op_count: usize,
        outcome: &mut SyncOutcome,
        progress: &mut dyn Progress,
    ) -> Result<()> {
        let resolver = IdentityResolver::new(self.store.as_deref());
        progress.init(&format!("executing {op_count} operations"), op_count as u64);

        for mut record in plan.to_create {
            let id_to_log = resolver.loggable_id(&record);
            match self.persister.create(&record, dry_run) {
                Ok(native_id) => {
                    record.assign_native_id(native_id);
                    outcome.add_created_item(resolver.loggable_id(&record));
                }
                Err(err) => {
                    tracing::warn!(item = %id_to_log, error = %err, "create failed");
                    outcome.add_errored_item(id_to_log, ItemError::new("create", err));
                }
            }
            progress.tick();
        }

        for entry in plan.to_update {
            let UpdateEntry {
                record,
                existing_id,
                reasons,
            } = entry;
            let id_to_log = resolver.loggable_id(&record);
            match self.persister.update(&record, existing_id, &reasons, dry_run) {
                Ok(_) => outcome.add_updated_item(id_to_log, reasons),
                Err(err) => {
                    tracing::warn!(item = %id_to_log, error = %err, "update failed");
                    outcome
                        .add_errored_item(id_to_log, ItemError::new("update", err).with_reasons(reasons));
                }
            }
            progress.tick();
        }

        for record in plan.to_delete {
            self.persister.delete(&record, dry_run)?;
            outcome.add_deleted_item(resolver.loggable_id(&record));
            progress.tick();
        }

        progress.finish();
        Ok(())
    }
}
