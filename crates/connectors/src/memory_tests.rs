// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use molt_core::test_support::{int_col, table_with_id, text_col};
use molt_core::{MigrationStep, Table};

fn connector_with_users() -> MemoryConnector {
    MemoryConnector::new(Schema::empty().with_table(
        table_with_id("users").with_column(text_col("email")),
    ))
}

#[tokio::test]
async fn apply_step_mutates_schema() {
    let connector = connector_with_users();
    connector
        .apply_step(&MigrationStep::AddColumn {
            table: "users".to_string(),
            column: int_col("age").nullable(),
        })
        .await
        .unwrap();

    let schema = connector.schema();
    assert!(schema.table("users").unwrap().column("age").is_some());
}

#[tokio::test]
async fn failed_step_leaves_schema_untouched() {
    let connector = connector_with_users();
    let before = connector.schema();

    let err = connector
        .apply_step(&MigrationStep::DropTable {
            table: Table::new("ghost"),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ConnectorError::StateMismatch(_)));
    assert_eq!(connector.schema(), before);
}

#[tokio::test]
async fn revert_applies_the_inverse() {
    let connector = connector_with_users();
    let before = connector.schema();
    let step = MigrationStep::AddColumn {
        table: "users".to_string(),
        column: int_col("age").nullable(),
    };

    connector.apply_step(&step).await.unwrap();
    connector.revert_step(&step).await.unwrap();
    assert_eq!(connector.schema(), before);
}

#[tokio::test]
async fn revert_of_drop_fails_not_invertible() {
    let connector = connector_with_users();
    let err = connector
        .revert_step(&MigrationStep::DropColumn {
            table: "users".to_string(),
            column: text_col("email"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectorError::NotInvertible(_)));

    // Nothing changed: the column is still there.
    assert!(connector.schema().table("users").unwrap().column("email").is_some());
}

#[tokio::test]
async fn introspect_returns_current_schema() {
    let connector = connector_with_users();
    let schema = connector.introspect().await.unwrap();
    assert_eq!(schema, connector.schema());
}

#[tokio::test]
async fn lock_is_exclusive() {
    let connector = connector_with_users();
    let lock = connector.acquire_lock().await.unwrap();
    assert!(connector.is_locked());

    let err = connector.acquire_lock().await.unwrap_err();
    assert!(matches!(err, ConnectorError::LockHeld));

    connector.release_lock(lock).await.unwrap();
    assert!(!connector.is_locked());

    // Free again after release.
    let lock = connector.acquire_lock().await.unwrap();
    connector.release_lock(lock).await.unwrap();
}

#[tokio::test]
async fn release_of_unknown_lock_fails() {
    let connector = connector_with_users();
    let lock = connector.acquire_lock().await.unwrap();
    connector.release_lock(lock).await.unwrap();

    let stale = PlanLock::new(99);
    let err = connector.release_lock(stale).await.unwrap_err();
    assert!(matches!(err, ConnectorError::UnknownLock(99)));
}

#[tokio::test]
async fn clones_share_state() {
    let connector = connector_with_users();
    let clone = connector.clone();
    clone
        .apply_step(&MigrationStep::AddColumn {
            table: "users".to_string(),
            column: int_col("age").nullable(),
        })
        .await
        .unwrap();
    assert!(connector.schema().table("users").unwrap().column("age").is_some());
}

#[test]
fn preview_renders_ddl() {
    let connector = connector_with_users();
    let preview = connector.render_preview(&MigrationStep::DropTable {
        table: Table::new("users"),
    });
    assert_eq!(preview, "DROP TABLE \"users\";");
}

#[test]
fn reports_full_capabilities() {
    let connector = MemoryConnector::default();
    assert_eq!(connector.connector_type(), "memory");
    for kind in crate::ALL_STEP_KINDS {
        assert!(connector.capabilities().supports(kind));
    }
}

#[tokio::test]
async fn default_starts_empty() {
    let connector = MemoryConnector::default();
    assert!(connector.introspect().await.unwrap().is_empty());
}
