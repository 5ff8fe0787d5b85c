// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized history state from journal replay

use chrono::{DateTime, Utc};
use molt_core::{apply_steps, ApplyError, HistoryEntryId, MigrationStep, Schema};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors from history state transitions and reconstruction
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("unknown history entry: {0}")]
    UnknownEntry(HistoryEntryId),
    #[error("step index {index} out of range for entry {id} ({len} steps)")]
    StepIndexOutOfRange {
        id: HistoryEntryId,
        index: usize,
        len: usize,
    },
    #[error("invalid transition for entry {id}: {message}")]
    InvalidTransition { id: HistoryEntryId, message: String },
    #[error("sealed history does not replay onto an empty schema: {0}")]
    Fold(#[from] ApplyError),
    #[error("journal error: {0}")]
    Journal(#[from] crate::journal::JournalError),
}

/// One record in a target's history journal.
///
/// Each entry is a single line of JSON; the journal is replayed in order to
/// rebuild [`HistoryState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryRecord {
    /// An executor began applying a plan.
    PlanStarted {
        entry_id: HistoryEntryId,
        checksum: String,
        steps: Vec<MigrationStep>,
        at: DateTime<Utc>,
    },
    /// About-to-apply marker, persisted before the step executes.
    StepStarted {
        entry_id: HistoryEntryId,
        step_index: usize,
        at: DateTime<Utc>,
    },
    StepApplied {
        entry_id: HistoryEntryId,
        step_index: usize,
        at: DateTime<Utc>,
    },
    StepFailed {
        entry_id: HistoryEntryId,
        step_index: usize,
        error: String,
        at: DateTime<Utc>,
    },
    /// All steps applied; the entry is immutable from here on.
    PlanSealed {
        entry_id: HistoryEntryId,
        at: DateTime<Utc>,
    },
    /// The run stopped without a step failure (cancellation, deadline).
    PlanAbandoned {
        entry_id: HistoryEntryId,
        reason: String,
        at: DateTime<Utc>,
    },
    /// A caller reverted the entry's applied steps.
    PlanRolledBack {
        entry_id: HistoryEntryId,
        at: DateTime<Utc>,
    },
}

impl HistoryRecord {
    pub fn entry_id(&self) -> &HistoryEntryId {
        match self {
            HistoryRecord::PlanStarted { entry_id, .. }
            | HistoryRecord::StepStarted { entry_id, .. }
            | HistoryRecord::StepApplied { entry_id, .. }
            | HistoryRecord::StepFailed { entry_id, .. }
            | HistoryRecord::PlanSealed { entry_id, .. }
            | HistoryRecord::PlanAbandoned { entry_id, .. }
            | HistoryRecord::PlanRolledBack { entry_id, .. } => entry_id,
        }
    }
}

/// Application status of one step within an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepState {
    /// Not reached yet
    Pending,
    /// About-to-apply marker persisted; the step may or may not have hit
    /// the backend (crash window)
    Started,
    /// Step committed
    Applied,
    /// Step failed with an error
    Failed(String),
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepState::Pending => write!(f, "pending"),
            StepState::Started => write!(f, "started"),
            StepState::Applied => write!(f, "applied"),
            StepState::Failed(_) => write!(f, "failed"),
        }
    }
}

/// Terminal and in-flight status of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Applying,
    Applied,
    Failed,
    RolledBack,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStatus::Applying => write!(f, "applying"),
            EntryStatus::Applied => write!(f, "applied"),
            EntryStatus::Failed => write!(f, "failed"),
            EntryStatus::RolledBack => write!(f, "rolled back"),
        }
    }
}

/// One plan application attempt, materialized from journal records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryEntryId,
    pub checksum: String,
    pub steps: Vec<MigrationStep>,
    pub step_states: Vec<StepState>,
    pub status: EntryStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl HistoryEntry {
    /// Indexes of steps that committed, in plan order.
    pub fn applied_step_indexes(&self) -> Vec<usize> {
        self.step_states
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == StepState::Applied)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Materialized state of one target's migration history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryState {
    entries: Vec<HistoryEntry>,
}

impl HistoryState {
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &HistoryEntryId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// The sealed entry with this checksum, if one exists.
    pub fn sealed_entry_by_checksum(&self, checksum: &str) -> Option<&HistoryEntry> {
        self.entries
            .iter()
            .find(|e| e.status == EntryStatus::Applied && e.checksum == checksum)
    }

    /// Whether a plan with this checksum has been fully applied and sealed.
    pub fn has_been_applied(&self, checksum: &str) -> bool {
        self.sealed_entry_by_checksum(checksum).is_some()
    }

    /// Fold all sealed plans' steps onto the empty schema, in seal order.
    ///
    /// Failed and rolled-back entries contribute nothing; their applied
    /// steps stay inspectable on the entry itself.
    pub fn latest_applied_schema(&self) -> Result<Schema, HistoryError> {
        let mut schema = Schema::empty();
        for entry in &self.entries {
            if entry.status == EntryStatus::Applied {
                apply_steps(&mut schema, &entry.steps)?;
            }
        }
        Ok(schema)
    }

    /// Apply one journal record.
    pub fn apply_record(&mut self, record: &HistoryRecord) -> Result<(), HistoryError> {
        match record {
            HistoryRecord::PlanStarted {
                entry_id,
                checksum,
                steps,
                at,
            } => {
                self.entries.push(HistoryEntry {
                    id: entry_id.clone(),
                    checksum: checksum.clone(),
                    step_states: vec![StepState::Pending; steps.len()],
                    steps: steps.clone(),
                    status: EntryStatus::Applying,
                    started_at: *at,
                    finished_at: None,
                    error: None,
                });
                Ok(())
            }
            HistoryRecord::StepStarted {
                entry_id,
                step_index,
                ..
            } => {
                let entry = self.applying_entry_mut(entry_id)?;
                set_step_state(entry, *step_index, StepState::Started)
            }
            HistoryRecord::StepApplied {
                entry_id,
                step_index,
                ..
            } => {
                let entry = self.applying_entry_mut(entry_id)?;
                set_step_state(entry, *step_index, StepState::Applied)
            }
            HistoryRecord::StepFailed {
                entry_id,
                step_index,
                error,
                at,
            } => {
                let entry = self.applying_entry_mut(entry_id)?;
                set_step_state(entry, *step_index, StepState::Failed(error.clone()))?;
                entry.status = EntryStatus::Failed;
                entry.error = Some(error.clone());
                entry.finished_at = Some(*at);
                Ok(())
            }
            HistoryRecord::PlanSealed { entry_id, at } => {
                let entry = self.applying_entry_mut(entry_id)?;
                if let Some(state) = entry.step_states.iter().find(|s| **s != StepState::Applied) {
                    return Err(HistoryError::InvalidTransition {
                        id: entry_id.clone(),
                        message: format!("cannot seal with a step still {}", state),
                    });
                }
                entry.status = EntryStatus::Applied;
                entry.finished_at = Some(*at);
                Ok(())
            }
            HistoryRecord::PlanAbandoned {
                entry_id,
                reason,
                at,
            } => {
                let entry = self.applying_entry_mut(entry_id)?;
                entry.status = EntryStatus::Failed;
                entry.error = Some(reason.clone());
                entry.finished_at = Some(*at);
                Ok(())
            }
            HistoryRecord::PlanRolledBack { entry_id, at } => {
                let entry = self
                    .entries
                    .iter_mut()
                    .find(|e| &e.id == entry_id)
                    .ok_or_else(|| HistoryError::UnknownEntry(entry_id.clone()))?;
                if entry.status == EntryStatus::Applying {
                    return Err(HistoryError::InvalidTransition {
                        id: entry_id.clone(),
                        message: "cannot roll back an entry still applying".to_string(),
                    });
                }
                entry.status = EntryStatus::RolledBack;
                entry.finished_at = Some(*at);
                Ok(())
            }
        }
    }

    fn applying_entry_mut(
        &mut self,
        id: &HistoryEntryId,
    ) -> Result<&mut HistoryEntry, HistoryError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| HistoryError::UnknownEntry(id.clone()))?;
        if entry.status != EntryStatus::Applying {
            return Err(HistoryError::InvalidTransition {
                id: id.clone(),
                message: format!("entry is {} and immutable", entry.status),
            });
        }
        Ok(entry)
    }
}

fn set_step_state(
    entry: &mut HistoryEntry,
    index: usize,
    state: StepState,
) -> Result<(), HistoryError> {
    let len = entry.step_states.len();
    let slot = entry
        .step_states
        .get_mut(index)
        .ok_or(HistoryError::StepIndexOutOfRange {
            id: entry.id.clone(),
            index,
            len,
        })?;
    *slot = state;
    Ok(())
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
