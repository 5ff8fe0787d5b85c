// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applying plans against the in-memory reference backend.

use crate::prelude::*;
use molt_connectors::{Connector, MemoryConnector};
use molt_core::{CancelToken, EngineConfig, Schema};
use molt_engine::{plan, ExecutionMode, PlanState};
use similar_asserts::assert_eq;

#[tokio::test]
async fn applying_a_plan_reaches_the_desired_schema() {
    let current = schema_of(vec![top()]);
    let desired = schema_of(vec![top(), middle()]);
    let plan = plan(&current, &desired).unwrap();

    let connector = MemoryConnector::new(current);
    let (mut executor, _dir) = executor_for(connector.clone(), EngineConfig::default());

    let report = executor
        .apply(&plan, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.state, PlanState::Applied);
    assert_eq!(connector.introspect().await.unwrap(), desired);
    assert_eq!(executor.history().latest_applied_schema().unwrap(), desired);
}

#[tokio::test]
async fn dry_run_previews_without_touching_the_backend() {
    let current = schema_of(vec![top()]);
    let desired = schema_of(vec![top(), middle()]);
    let plan = plan(&current, &desired).unwrap();

    let connector = MemoryConnector::new(current.clone());
    let (mut executor, _dir) = executor_for(connector.clone(), EngineConfig::default());

    let report = executor
        .apply(&plan, ExecutionMode::DryRun, &CancelToken::new())
        .await
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.steps.len(), 2);
    assert_eq!(
        report.steps[0].preview,
        "CREATE TABLE \"Middle\" (\n  \"id\" INTEGER NOT NULL,\n  \"middle_unique\" TEXT UNIQUE,\n  \"top_id\" INTEGER NOT NULL,\n  \"bottom_id\" INTEGER,\n  PRIMARY KEY (\"id\")\n);"
    );
    assert_eq!(
        report.steps[1].preview,
        "ALTER TABLE \"Middle\" ADD CONSTRAINT \"Middle_top_fk\" FOREIGN KEY (\"top_id\") REFERENCES \"Top\" (\"id\");"
    );

    // The backend and the history are untouched.
    assert_eq!(connector.introspect().await.unwrap(), current);
    assert!(executor.history().entries().is_empty());
}

#[tokio::test]
async fn history_fold_supports_follow_up_diffs() {
    // Apply plan 1, then use the history store as the differ's `current`
    // input for plan 2 (no live introspection needed).
    let v1 = schema_of(vec![top()]);
    let v2 = schema_of(vec![top(), bottom()]);

    let connector = MemoryConnector::new(Schema::empty());
    let (mut executor, _dir) = executor_for(connector.clone(), EngineConfig::default());

    let first = plan(&Schema::empty(), &v1).unwrap();
    executor
        .apply(&first, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap();

    let recorded = executor.history().latest_applied_schema().unwrap();
    assert_eq!(recorded, v1);

    let second = plan(&recorded, &v2).unwrap();
    executor
        .apply(&second, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(connector.introspect().await.unwrap(), v2);
    assert_eq!(executor.history().latest_applied_schema().unwrap(), v2);
}

#[tokio::test]
async fn empty_plan_applies_and_seals_cleanly() {
    let schema = schema_of(vec![top()]);
    let plan = plan(&schema, &schema).unwrap();
    assert!(plan.is_empty());

    let connector = MemoryConnector::new(schema);
    let (mut executor, _dir) = executor_for(connector, EngineConfig::default());

    let report = executor
        .apply(&plan, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(report.state, PlanState::Applied);
    assert!(executor.history().has_been_applied(plan.checksum()));
}
