// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::state::{EntryStatus, StepState};
use molt_core::test_support::{int_col, table_with_id};
use molt_core::{FakeClock, MigrationStep};

fn sample_plan() -> MigrationPlan {
    MigrationPlan::new(vec![
        MigrationStep::CreateTable {
            table: table_with_id("users"),
        },
        MigrationStep::AddColumn {
            table: "users".to_string(),
            column: int_col("age").nullable(),
        },
    ])
    .unwrap()
}

fn open_store(dir: &Path) -> HistoryStore<FakeClock> {
    HistoryStore::open_with_clock(dir, "postgres://localhost/app", FakeClock::new()).unwrap()
}

#[test]
fn record_full_application_and_seal() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(dir.path());
    let plan = sample_plan();

    let id = store.record_plan_start(&plan).unwrap();
    for i in 0..plan.len() {
        store.record_step_started(&id, i).unwrap();
        store.record_step_applied(&id, i).unwrap();
    }
    store.seal_plan(&id).unwrap();

    let entry = store.entry(&id).unwrap();
    assert_eq!(entry.status, EntryStatus::Applied);
    assert!(store.has_been_applied(plan.checksum()));
}

#[test]
fn has_been_applied_is_false_before_seal() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(dir.path());
    let plan = sample_plan();

    let id = store.record_plan_start(&plan).unwrap();
    assert!(!store.has_been_applied(plan.checksum()));
    store.record_step_started(&id, 0).unwrap();
    assert!(!store.has_been_applied(plan.checksum()));
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let plan = sample_plan();
    let id;

    {
        let mut store = open_store(dir.path());
        id = store.record_plan_start(&plan).unwrap();
        store.record_step_started(&id, 0).unwrap();
        store.record_step_applied(&id, 0).unwrap();
        store.record_step_started(&id, 1).unwrap();
        // Crash before step 1 commits.
    }

    let store = open_store(dir.path());
    let entry = store.entry(&id).unwrap();
    assert_eq!(entry.status, EntryStatus::Applying);
    assert_eq!(
        entry.step_states,
        vec![StepState::Applied, StepState::Started]
    );
}

#[test]
fn latest_applied_schema_reconstructs_from_sealed_plans() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(dir.path());
    let plan = sample_plan();

    let id = store.record_plan_start(&plan).unwrap();
    for i in 0..plan.len() {
        store.record_step_started(&id, i).unwrap();
        store.record_step_applied(&id, i).unwrap();
    }
    store.seal_plan(&id).unwrap();

    let schema = store.latest_applied_schema().unwrap();
    assert!(schema.table("users").unwrap().column("age").is_some());
}

#[test]
fn failed_plan_is_excluded_from_fold_but_listed() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(dir.path());
    let plan = sample_plan();

    let id = store.record_plan_start(&plan).unwrap();
    store.record_step_started(&id, 0).unwrap();
    store.record_step_failed(&id, 0, "relation exists").unwrap();

    assert!(store.latest_applied_schema().unwrap().is_empty());
    let entry = store.entry(&id).unwrap();
    assert_eq!(entry.status, EntryStatus::Failed);
    assert_eq!(entry.error.as_deref(), Some("relation exists"));
}

#[test]
fn abandon_and_rollback_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(dir.path());
    let plan = sample_plan();

    let id = store.record_plan_start(&plan).unwrap();
    store.record_step_started(&id, 0).unwrap();
    store.record_step_applied(&id, 0).unwrap();
    store.abandon_plan(&id, "cancelled by caller").unwrap();
    assert_eq!(store.entry(&id).unwrap().status, EntryStatus::Failed);

    store.mark_rolled_back(&id).unwrap();
    assert_eq!(store.entry(&id).unwrap().status, EntryStatus::RolledBack);

    // Rolled-back entries no longer satisfy duplicate detection.
    assert!(!store.has_been_applied(plan.checksum()));
}

#[test]
fn entries_are_listed_in_start_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(dir.path());

    let first = store.record_plan_start(&sample_plan()).unwrap();
    let second = store
        .record_plan_start(&MigrationPlan::new(vec![]).unwrap())
        .unwrap();

    let ids: Vec<_> = store.entries().iter().map(|e| e.id.clone()).collect();
    assert_eq!(ids, vec![first, second]);
}

#[test]
fn timestamps_come_from_the_clock() {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    clock.advance(chrono::Duration::seconds(42));
    let mut store =
        HistoryStore::open_with_clock(dir.path(), "db://t", clock.clone()).unwrap();

    let id = store.record_plan_start(&sample_plan()).unwrap();
    let entry = store.entry(&id).unwrap();
    assert_eq!(
        entry.started_at,
        chrono::DateTime::<chrono::Utc>::UNIX_EPOCH + chrono::Duration::seconds(42)
    );
}

#[test]
fn stores_for_different_targets_do_not_collide() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = HistoryStore::open(dir.path(), "postgres://host/a").unwrap();
    let b = HistoryStore::open(dir.path(), "postgres://host/b").unwrap();

    let plan = sample_plan();
    let id = a.record_plan_start(&plan).unwrap();
    for i in 0..plan.len() {
        a.record_step_started(&id, i).unwrap();
        a.record_step_applied(&id, i).unwrap();
    }
    a.seal_plan(&id).unwrap();

    assert!(a.has_been_applied(plan.checksum()));
    assert!(!b.has_been_applied(plan.checksum()));
    assert_ne!(a.journal_path(), b.journal_path());
}

#[test]
fn file_name_is_sanitized_and_stable() {
    let name = history_file_name("postgres://host:5432/app db");
    assert!(name.ends_with(".jsonl"));
    assert!(!name.contains(':'));
    assert!(!name.contains('/'));
    assert!(!name.contains(' '));
    assert_eq!(name, history_file_name("postgres://host:5432/app db"));
    assert_ne!(name, history_file_name("postgres://host:5432/other"));
}
