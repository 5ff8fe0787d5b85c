// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reference diff scenarios, end to end.

use crate::prelude::*;
use molt_core::test_support::{fk, int_col, text_col};
use molt_core::{MigrationStep, StepKind};
use molt_engine::{diff, plan};

#[test]
fn adding_a_linked_table_creates_then_links() {
    let current = schema_of(vec![top()]);
    let desired = schema_of(vec![top(), middle()]);

    let steps = diff(&current, &desired).unwrap();
    let kinds: Vec<StepKind> = steps.iter().map(|s| s.kind()).collect();
    assert_eq!(kinds, vec![StepKind::CreateTable, StepKind::AddForeignKey]);

    assert_eq!(steps[0].table_name(), "Middle");
    let MigrationStep::AddForeignKey { table, foreign_key } = &steps[1] else {
        panic!("expected AddForeignKey, got {:?}", steps[1]);
    };
    assert_eq!(table, "Middle");
    assert_eq!(foreign_key.columns, vec!["top_id".to_string()]);
    assert_eq!(foreign_key.referenced_table, "Top");
    assert_eq!(foreign_key.referenced_columns, vec!["id".to_string()]);
}

#[test]
fn dropping_a_linked_column_unlinks_first() {
    let linked_middle = middle().with_foreign_key(fk("Middle_bottom_fk", "bottom_id", "Bottom", "id"));
    let current = schema_of(vec![top(), linked_middle, bottom()]);

    let trimmed_middle = molt_core::Table::new("Middle")
        .with_column(int_col("id"))
        .with_column(text_col("middle_unique").nullable().unique())
        .with_column(int_col("top_id"))
        .with_primary_key(vec!["id".to_string()])
        .with_foreign_key(fk("Middle_top_fk", "top_id", "Top", "id"));
    let desired = schema_of(vec![top(), trimmed_middle]);

    let kinds: Vec<StepKind> = diff(&current, &desired)
        .unwrap()
        .iter()
        .map(|s| s.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            StepKind::DropForeignKey, // Middle_bottom_fk
            StepKind::DropColumn,     // Middle.bottom_id
            StepKind::DropTable,      // Bottom
        ]
    );
}

#[test]
fn diff_of_identical_schemas_is_empty() {
    let schema = schema_of(vec![top(), middle(), bottom()]);
    assert!(diff(&schema, &schema).unwrap().is_empty());
}

#[test]
fn plans_for_the_same_inputs_share_a_checksum() {
    let current = schema_of(vec![top()]);
    let desired = schema_of(vec![top(), middle()]);

    let a = plan(&current, &desired).unwrap();
    let b = plan(&current, &desired).unwrap();
    assert_eq!(a.checksum(), b.checksum());

    let c = plan(&desired, &current).unwrap();
    assert_ne!(a.checksum(), c.checksum());
}
