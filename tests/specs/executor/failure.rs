// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure containment: what a halted plan leaves behind.

use crate::prelude::*;
use molt_connectors::FakeConnector;
use molt_core::test_support::{int_col, table_with_id, text_col};
use molt_core::{CancelToken, EngineConfig, FakeClock, MigrationPlan, MigrationStep};
use molt_engine::{ExecutionMode, PlanState};
use molt_storage::{EntryStatus, HistoryStore, StepState};

fn three_step_plan() -> MigrationPlan {
    MigrationPlan::new(vec![
        MigrationStep::CreateTable {
            table: table_with_id("users"),
        },
        MigrationStep::AddColumn {
            table: "users".to_string(),
            column: text_col("email").nullable(),
        },
        MigrationStep::AddColumn {
            table: "users".to_string(),
            column: int_col("age").nullable(),
        },
    ])
    .unwrap()
}

#[tokio::test]
async fn failing_second_step_leaves_one_applied_one_failed_one_untouched() {
    let connector = FakeConnector::new().fail_apply_at(1);
    let (mut executor, _dir) = executor_for(connector.clone(), EngineConfig::default());

    let report = executor
        .apply(&three_step_plan(), ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.state, PlanState::Failed);
    let entry = executor.history().entry(&report.entry_id.unwrap()).unwrap();
    assert_eq!(entry.status, EntryStatus::Failed);
    assert_eq!(entry.step_states[0], StepState::Applied);
    assert!(matches!(entry.step_states[1], StepState::Failed(_)));
    assert_eq!(entry.step_states[2], StepState::Pending);

    // The third step never reached the backend.
    assert_eq!(connector.applied_steps().len(), 2);
}

#[tokio::test]
async fn partial_application_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let connector = FakeConnector::new().fail_apply_at(1);
    let clock = FakeClock::new();
    let entry_id;

    {
        let history =
            HistoryStore::open_with_clock(dir.path(), "spec://target", clock.clone()).unwrap();
        let mut executor =
            molt_engine::Executor::new(connector, history, clock.clone(), &EngineConfig::default());
        let report = executor
            .apply(&three_step_plan(), ExecutionMode::Apply, &CancelToken::new())
            .await
            .unwrap();
        entry_id = report.entry_id.unwrap();
        // Process "crashes" here; only the journal survives.
    }

    let reopened = HistoryStore::open_with_clock(dir.path(), "spec://target", clock).unwrap();
    let entry = reopened.entry(&entry_id).unwrap();
    assert_eq!(entry.status, EntryStatus::Failed);
    assert_eq!(entry.step_states[0], StepState::Applied);
    assert!(matches!(entry.step_states[1], StepState::Failed(_)));
    assert_eq!(entry.step_states[2], StepState::Pending);
}

#[tokio::test]
async fn cancellation_between_steps_preserves_prior_outcomes() {
    let connector = FakeConnector::new();
    let (mut executor, _dir) = executor_for(connector.clone(), EngineConfig::default());
    let cancel = CancelToken::new();
    cancel.cancel();

    let report = executor
        .apply(&three_step_plan(), ExecutionMode::Apply, &cancel)
        .await
        .unwrap();

    assert_eq!(report.state, PlanState::Failed);
    assert_eq!(report.error.as_deref(), Some("cancelled by caller"));
    assert!(connector.applied_steps().is_empty());
    assert!(!connector.is_locked());
}
