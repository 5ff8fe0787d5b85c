// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::schema::{Column, ColumnType, ForeignKey, Index, Schema, Table};

// ── Schema factory functions ────────────────────────────────────────────────

pub fn int_col(name: &str) -> Column {
    Column::new(name, ColumnType::Integer)
}

pub fn text_col(name: &str) -> Column {
    Column::new(name, ColumnType::Text)
}

/// A table with an integer `id` primary key.
pub fn table_with_id(name: &str) -> Table {
    Table::new(name)
        .with_column(int_col("id"))
        .with_primary_key(vec!["id".to_string()])
}

pub fn index_on(name: &str, columns: &[&str]) -> Index {
    Index::new(name, columns.iter().map(|c| c.to_string()).collect())
}

pub fn fk(name: &str, column: &str, referenced_table: &str, referenced_column: &str) -> ForeignKey {
    ForeignKey::new(
        name,
        vec![column.to_string()],
        referenced_table,
        vec![referenced_column.to_string()],
    )
}

pub fn schema_of(tables: Vec<Table>) -> Schema {
    Schema { tables }
}
