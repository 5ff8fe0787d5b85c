// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-initiated reversal.

use crate::prelude::*;
use molt_connectors::{Connector, MemoryConnector};
use molt_core::{CancelToken, EngineConfig};
use molt_engine::{plan, ExecuteError, ExecutionMode, PlanState};
use molt_storage::EntryStatus;

#[tokio::test]
async fn revert_returns_the_schema_to_its_prior_state() {
    let current = schema_of(vec![top()]);
    let desired = schema_of(vec![top(), middle()]);
    let plan = plan(&current, &desired).unwrap();

    let connector = MemoryConnector::new(current.clone());
    let (mut executor, _dir) = executor_for(connector.clone(), EngineConfig::default());

    executor
        .apply(&plan, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(connector.introspect().await.unwrap(), desired);

    executor.revert(&plan).await.unwrap();
    assert_eq!(connector.introspect().await.unwrap(), current);
    assert_eq!(
        executor.history().entries()[0].status,
        EntryStatus::RolledBack
    );
}

#[tokio::test]
async fn reverted_checksum_may_be_applied_again() {
    let current = schema_of(vec![top()]);
    let desired = schema_of(vec![top(), bottom()]);
    let plan = plan(&current, &desired).unwrap();

    let connector = MemoryConnector::new(current);
    let (mut executor, _dir) = executor_for(connector.clone(), EngineConfig::default());

    executor
        .apply(&plan, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap();
    executor.revert(&plan).await.unwrap();

    let report = executor
        .apply(&plan, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(report.state, PlanState::Applied);
    assert_eq!(connector.introspect().await.unwrap(), desired);
}

#[tokio::test]
async fn revert_refuses_plans_with_lost_data() {
    let current = schema_of(vec![top(), bottom()]);
    let desired = schema_of(vec![top()]);
    let plan = plan(&current, &desired).unwrap();

    let config = EngineConfig {
        allow_destructive: true,
        ..EngineConfig::default()
    };
    let connector = MemoryConnector::new(current);
    let (mut executor, _dir) = executor_for(connector.clone(), config);

    executor
        .apply(&plan, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap();

    let err = executor.revert(&plan).await.unwrap_err();
    assert!(matches!(err, ExecuteError::NotInvertible(_)));

    // Nothing moved: Bottom is still gone, the entry still sealed.
    assert!(connector.introspect().await.unwrap().table("Bottom").is_none());
    assert_eq!(executor.history().entries()[0].status, EntryStatus::Applied);
}
