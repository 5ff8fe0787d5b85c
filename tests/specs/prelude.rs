// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the behavioral specs.

use molt_connectors::Connector;
use molt_core::test_support::{fk, int_col, table_with_id, text_col};
use molt_core::{EngineConfig, FakeClock, Schema, Table};
use molt_engine::Executor;
use molt_storage::HistoryStore;
use tempfile::TempDir;

/// `Top(id, top_unique?)`
pub fn top() -> Table {
    table_with_id("Top").with_column(text_col("top_unique").nullable().unique())
}

/// `Middle(id, middle_unique?, top_id, bottom_id?)` with a foreign key to `Top`.
pub fn middle() -> Table {
    table_with_id("Middle")
        .with_column(text_col("middle_unique").nullable().unique())
        .with_column(int_col("top_id"))
        .with_column(int_col("bottom_id").nullable())
        .with_foreign_key(fk("Middle_top_fk", "top_id", "Top", "id"))
}

/// `Bottom(id)`
pub fn bottom() -> Table {
    table_with_id("Bottom")
}

pub fn schema_of(tables: Vec<Table>) -> Schema {
    Schema { tables }
}

/// An executor over the given connector, backed by a temp-dir history store.
///
/// Returns the temp dir so the caller keeps it alive for the test's
/// duration.
pub fn executor_for<C: Connector>(
    connector: C,
    config: EngineConfig,
) -> (Executor<C, FakeClock>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    let history =
        HistoryStore::open_with_clock(dir.path(), "spec://target", clock.clone()).unwrap();
    (Executor::new(connector, history, clock, &config), dir)
}
