// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! History integrity: checksums, duplicate detection, durability.

use crate::prelude::*;
use molt_connectors::MemoryConnector;
use molt_core::{CancelToken, EngineConfig, FakeClock, Schema};
use molt_engine::{plan, ExecuteError, ExecutionMode};
use molt_storage::HistoryStore;

#[tokio::test]
async fn has_been_applied_flips_at_seal_time() {
    let desired = schema_of(vec![top()]);
    let plan = plan(&Schema::empty(), &desired).unwrap();

    let connector = MemoryConnector::default();
    let (mut executor, _dir) = executor_for(connector, EngineConfig::default());

    assert!(!executor.history().has_been_applied(plan.checksum()));
    executor
        .apply(&plan, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap();
    assert!(executor.history().has_been_applied(plan.checksum()));
}

#[tokio::test]
async fn reapplying_a_sealed_checksum_is_rejected() {
    let desired = schema_of(vec![top()]);
    let plan = plan(&Schema::empty(), &desired).unwrap();

    let connector = MemoryConnector::default();
    let (mut executor, _dir) = executor_for(connector, EngineConfig::default());

    executor
        .apply(&plan, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap();
    let err = executor
        .apply(&plan, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap_err();

    let ExecuteError::AlreadyApplied(checksum) = err else {
        panic!("expected AlreadyApplied, got {:?}", err);
    };
    assert_eq!(checksum, plan.checksum());
}

#[tokio::test]
async fn sealed_history_survives_restart_and_still_rejects_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let desired = schema_of(vec![top()]);
    let plan = plan(&Schema::empty(), &desired).unwrap();
    let clock = FakeClock::new();

    {
        let history =
            HistoryStore::open_with_clock(dir.path(), "spec://target", clock.clone()).unwrap();
        let mut executor = molt_engine::Executor::new(
            MemoryConnector::default(),
            history,
            clock.clone(),
            &EngineConfig::default(),
        );
        executor
            .apply(&plan, ExecutionMode::Apply, &CancelToken::new())
            .await
            .unwrap();
    }

    let history = HistoryStore::open_with_clock(dir.path(), "spec://target", clock.clone()).unwrap();
    assert!(history.has_been_applied(plan.checksum()));
    assert_eq!(history.latest_applied_schema().unwrap(), desired);

    let mut executor = molt_engine::Executor::new(
        MemoryConnector::new(desired),
        history,
        clock,
        &EngineConfig::default(),
    );
    let err = executor
        .apply(&plan, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ExecuteError::AlreadyApplied(_)));
}

#[tokio::test]
async fn different_targets_keep_independent_histories() {
    let dir = tempfile::tempdir().unwrap();
    let desired = schema_of(vec![top()]);
    let plan = plan(&Schema::empty(), &desired).unwrap();
    let clock = FakeClock::new();

    let history_a =
        HistoryStore::open_with_clock(dir.path(), "spec://alpha", clock.clone()).unwrap();
    let mut executor = molt_engine::Executor::new(
        MemoryConnector::default(),
        history_a,
        clock.clone(),
        &EngineConfig::default(),
    );
    executor
        .apply(&plan, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap();

    let history_b = HistoryStore::open_with_clock(dir.path(), "spec://beta", clock).unwrap();
    assert!(!history_b.has_been_applied(plan.checksum()));
}
