// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable history store, keyed by target database identity.

use crate::journal::Journal;
use crate::state::{HistoryEntry, HistoryError, HistoryRecord, HistoryState};
use molt_core::{Clock, HistoryEntryId, IdGen, MigrationPlan, Schema, SystemClock, UuidIdGen};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name for a target's journal: a sanitized prefix for readability
/// plus a content hash of the full identity for uniqueness.
pub fn history_file_name(target: &str) -> String {
    let sanitized: String = target
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(40)
        .collect();
    let digest = format!("{:x}", Sha256::digest(target.as_bytes()));
    format!("{}-{}.jsonl", sanitized, &digest[..16])
}

/// Durable record of which plans have been applied to one target.
pub struct HistoryStore<C: Clock = SystemClock> {
    target: String,
    journal: Journal,
    state: HistoryState,
    clock: C,
    id_gen: UuidIdGen,
}

impl HistoryStore<SystemClock> {
    /// Open (or create) the store for a target under the history directory.
    pub fn open(history_dir: &Path, target: &str) -> Result<Self, HistoryError> {
        Self::open_with_clock(history_dir, target, SystemClock)
    }
}

impl<C: Clock> HistoryStore<C> {
    /// Open with an explicit clock (tests use [`molt_core::FakeClock`]).
    pub fn open_with_clock(
        history_dir: &Path,
        target: &str,
        clock: C,
    ) -> Result<Self, HistoryError> {
        let path = history_dir.join(history_file_name(target));
        let (journal, records) = Journal::open(&path)?;

        let mut state = HistoryState::default();
        for record in &records {
            state.apply_record(record)?;
        }
        info!(
            target_db = target,
            entries = state.entries().len(),
            path = %path.display(),
            "opened history store",
        );

        Ok(Self {
            target: target.to_string(),
            journal,
            state,
            clock,
            id_gen: UuidIdGen,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn journal_path(&self) -> &Path {
        self.journal.path()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        self.state.entries()
    }

    pub fn entry(&self, id: &HistoryEntryId) -> Option<&HistoryEntry> {
        self.state.entry(id)
    }

    /// Whether a plan with this checksum has been fully applied and sealed.
    pub fn has_been_applied(&self, checksum: &str) -> bool {
        self.state.has_been_applied(checksum)
    }

    /// The sealed entry holding this checksum, if any.
    pub fn sealed_entry_by_checksum(&self, checksum: &str) -> Option<&HistoryEntry> {
        self.state.sealed_entry_by_checksum(checksum)
    }

    /// Reconstruct the schema produced by all sealed plans, for use as the
    /// differ's `current` input when live introspection is unavailable.
    pub fn latest_applied_schema(&self) -> Result<Schema, HistoryError> {
        self.state.latest_applied_schema()
    }

    /// Record the start of a plan application. Returns the new entry's id.
    pub fn record_plan_start(
        &mut self,
        plan: &MigrationPlan,
    ) -> Result<HistoryEntryId, HistoryError> {
        let entry_id = HistoryEntryId::new(self.id_gen.next());
        self.write(HistoryRecord::PlanStarted {
            entry_id: entry_id.clone(),
            checksum: plan.checksum().to_string(),
            steps: plan.steps().to_vec(),
            at: self.clock.now(),
        })?;
        Ok(entry_id)
    }

    /// Persist the about-to-apply marker for a step.
    pub fn record_step_started(
        &mut self,
        id: &HistoryEntryId,
        step_index: usize,
    ) -> Result<(), HistoryError> {
        self.write(HistoryRecord::StepStarted {
            entry_id: id.clone(),
            step_index,
            at: self.clock.now(),
        })
    }

    pub fn record_step_applied(
        &mut self,
        id: &HistoryEntryId,
        step_index: usize,
    ) -> Result<(), HistoryError> {
        self.write(HistoryRecord::StepApplied {
            entry_id: id.clone(),
            step_index,
            at: self.clock.now(),
        })
    }

    pub fn record_step_failed(
        &mut self,
        id: &HistoryEntryId,
        step_index: usize,
        error: &str,
    ) -> Result<(), HistoryError> {
        self.write(HistoryRecord::StepFailed {
            entry_id: id.clone(),
            step_index,
            error: error.to_string(),
            at: self.clock.now(),
        })
    }

    /// Seal a fully applied plan; the entry is immutable afterwards.
    pub fn seal_plan(&mut self, id: &HistoryEntryId) -> Result<(), HistoryError> {
        self.write(HistoryRecord::PlanSealed {
            entry_id: id.clone(),
            at: self.clock.now(),
        })
    }

    /// Mark a run that stopped without a step failure (cancellation,
    /// deadline) as failed.
    pub fn abandon_plan(&mut self, id: &HistoryEntryId, reason: &str) -> Result<(), HistoryError> {
        self.write(HistoryRecord::PlanAbandoned {
            entry_id: id.clone(),
            reason: reason.to_string(),
            at: self.clock.now(),
        })
    }

    /// Mark an entry whose applied steps have been reverted.
    pub fn mark_rolled_back(&mut self, id: &HistoryEntryId) -> Result<(), HistoryError> {
        self.write(HistoryRecord::PlanRolledBack {
            entry_id: id.clone(),
            at: self.clock.now(),
        })
    }

    /// Validate against state, then append durably.
    ///
    /// An append error after the state transition leaves memory ahead of
    /// disk; callers must treat that as fatal for the current run.
    fn write(&mut self, record: HistoryRecord) -> Result<(), HistoryError> {
        self.state.apply_record(&record)?;
        self.journal.append(&record)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
