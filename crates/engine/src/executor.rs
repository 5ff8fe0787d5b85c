// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan executor
//!
//! Drives a plan through `Pending → Applying → {Applied | Failed}`:
//! validates every step against the connector's capabilities before any
//! mutation, takes the exclusive plan lock, persists an about-to-apply
//! marker before each step and an outcome after it, and stops at the first
//! failure without reverting committed steps. Cancellation and the advisory
//! deadline are honored only at step boundaries.

use crate::error::ExecuteError;
use chrono::{DateTime, Duration, Utc};
use molt_connectors::{Connector, PlanLock};
use molt_core::{CancelToken, Clock, EngineConfig, HistoryEntryId, MigrationPlan};
use molt_storage::{HistoryStore, StepState};
use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, warn};

/// State machine position of one plan application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanState {
    Pending,
    Applying,
    Applied,
    Failed,
}

/// Whether to execute steps or only render them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Apply,
    /// Walk the same transitions, render previews, persist nothing, take no
    /// lock.
    DryRun,
}

/// Outcome of one step within a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub index: usize,
    pub description: String,
    pub preview: String,
    pub state: StepState,
}

/// What happened to a plan application, in both success and failure shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// History entry for this attempt; `None` for dry runs.
    pub entry_id: Option<HistoryEntryId>,
    pub checksum: String,
    pub dry_run: bool,
    pub state: PlanState,
    pub steps: Vec<StepReport>,
    /// The failing step's error, or the cancellation/deadline reason.
    pub error: Option<String>,
}

/// Applies migration plans through a connector, recording progress in the
/// history store.
pub struct Executor<C: Connector, K: Clock> {
    connector: C,
    history: HistoryStore<K>,
    clock: K,
    allow_destructive: bool,
    deadline_secs: Option<u64>,
}

impl<C, K> Executor<C, K>
where
    C: Connector,
    K: Clock + Clone,
{
    pub fn new(connector: C, history: HistoryStore<K>, clock: K, config: &EngineConfig) -> Self {
        Self {
            connector,
            history,
            clock,
            allow_destructive: config.allow_destructive,
            deadline_secs: config.deadline_secs,
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn history(&self) -> &HistoryStore<K> {
        &self.history
    }

    /// Apply (or dry-run) a plan.
    ///
    /// Validation failures return an error before any mutation. Once the
    /// first step commits, failures surface through the report's `Failed`
    /// state instead, with every prior outcome preserved.
    pub async fn apply(
        &mut self,
        plan: &MigrationPlan,
        mode: ExecutionMode,
        cancel: &CancelToken,
    ) -> Result<ExecutionReport, ExecuteError> {
        // Pending: no mutation happens before these checks pass.
        if !plan.verify_checksum()? {
            return Err(ExecuteError::ChecksumMismatch);
        }
        if self.history.has_been_applied(plan.checksum()) {
            return Err(ExecuteError::AlreadyApplied(plan.checksum().to_string()));
        }
        let capabilities = self.connector.capabilities();
        for (index, step) in plan.steps().iter().enumerate() {
            capabilities
                .check(step, self.allow_destructive)
                .map_err(|reason| ExecuteError::UnsupportedStep {
                    index,
                    step: step.describe(),
                    reason,
                })?;
        }

        let mut steps: Vec<StepReport> = plan
            .steps()
            .iter()
            .enumerate()
            .map(|(index, step)| StepReport {
                index,
                description: step.describe(),
                preview: self.connector.render_preview(step),
                state: StepState::Pending,
            })
            .collect();

        if mode == ExecutionMode::DryRun {
            return Ok(ExecutionReport {
                entry_id: None,
                checksum: plan.checksum().to_string(),
                dry_run: true,
                state: PlanState::Applied,
                steps,
                error: None,
            });
        }

        let lock = self.connector.acquire_lock().await?;
        let result = self.apply_locked(plan, cancel, &mut steps).await;
        self.release(lock).await;

        let (entry_id, state, error) = result?;
        Ok(ExecutionReport {
            entry_id: Some(entry_id),
            checksum: plan.checksum().to_string(),
            dry_run: false,
            state,
            steps,
            error,
        })
    }

    /// Revert the applied steps of a previously recorded plan, in reverse
    /// order. Caller-initiated; never happens automatically.
    ///
    /// Every applied step must be invertible or the whole revert is refused
    /// before any mutation.
    pub async fn revert(&mut self, plan: &MigrationPlan) -> Result<(), ExecuteError> {
        let entry = self
            .history
            .entries()
            .iter()
            .rev()
            .find(|e| e.checksum == plan.checksum())
            .ok_or_else(|| ExecuteError::UnknownPlan(plan.checksum().to_string()))?;
        let entry_id = entry.id.clone();

        let mut to_revert = Vec::new();
        for index in entry.applied_step_indexes().into_iter().rev() {
            let step = &entry.steps[index];
            if !step.is_invertible() {
                return Err(ExecuteError::NotInvertible(step.describe()));
            }
            to_revert.push(step.clone());
        }

        let lock = self.connector.acquire_lock().await?;
        let result = async {
            for step in &to_revert {
                let span = info_span!("revert_step", step = %step.kind());
                let _guard = span.enter();
                self.connector.revert_step(step).await?;
                info!(step = %step.describe(), "reverted");
            }
            Ok::<_, ExecuteError>(())
        }
        .await;
        self.release(lock).await;
        result?;

        self.history.mark_rolled_back(&entry_id)?;
        Ok(())
    }

    async fn apply_locked(
        &mut self,
        plan: &MigrationPlan,
        cancel: &CancelToken,
        steps: &mut [StepReport],
    ) -> Result<(HistoryEntryId, PlanState, Option<String>), ExecuteError> {
        let entry_id = self.history.record_plan_start(plan)?;
        let deadline = self.deadline();
        info!(entry = %entry_id.short(8), plan = %plan, "applying plan");

        for (index, step) in plan.steps().iter().enumerate() {
            if cancel.is_cancelled() {
                let reason = "cancelled by caller";
                self.history.abandon_plan(&entry_id, reason)?;
                return Ok((entry_id, PlanState::Failed, Some(reason.to_string())));
            }
            if let Some(deadline) = deadline {
                if self.clock.now() >= deadline {
                    let reason = "deadline exceeded";
                    self.history.abandon_plan(&entry_id, reason)?;
                    return Ok((entry_id, PlanState::Failed, Some(reason.to_string())));
                }
            }

            let span = info_span!("step", index, kind = %step.kind());
            let _guard = span.enter();

            // The journal marker is the containment strategy for backends
            // that cannot run this step inside a transaction: a crash
            // mid-step is diagnosable from the dangling Started marker.
            if !self.connector.capabilities().is_transactional(step.kind()) {
                warn!(step = %step.describe(), "step runs outside a transaction on this backend");
            }

            self.history.record_step_started(&entry_id, index)?;
            let start = std::time::Instant::now();
            match self.connector.apply_step(step).await {
                Ok(()) => {
                    self.history.record_step_applied(&entry_id, index)?;
                    steps[index].state = StepState::Applied;
                    info!(
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        step = %step.describe(),
                        "applied"
                    );
                }
                Err(e) => {
                    let message = e.to_string();
                    self.history.record_step_failed(&entry_id, index, &message)?;
                    steps[index].state = StepState::Failed(message.clone());
                    error!(
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        step = %step.describe(),
                        error = %message,
                        "step failed; later steps not attempted"
                    );
                    return Ok((entry_id, PlanState::Failed, Some(message)));
                }
            }
        }

        self.history.seal_plan(&entry_id)?;
        info!(entry = %entry_id.short(8), "plan sealed");
        Ok((entry_id, PlanState::Applied, None))
    }

    /// Release the plan lock; a failure here must not mask the run's result.
    async fn release(&self, lock: PlanLock) {
        if let Err(e) = self.connector.release_lock(lock).await {
            error!(error = %e, "failed to release plan lock");
        }
    }

    fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline_secs
            .map(|secs| self.clock.now() + Duration::seconds(secs as i64))
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
