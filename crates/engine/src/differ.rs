// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema differ: pure, deterministic step-sequence computation.
//!
//! `diff(current, desired)` emits the steps that transform `current` into
//! `desired`, in dependency-safe application order:
//!
//! 1. `CreateTable` (new tables can be referenced by later foreign keys)
//! 2. `AddColumn` / `AlterColumn` / `AlterTable`
//! 3. index additions, then foreign-key additions (an in-place replacement
//!    drops the old definition immediately before creating the new one)
//! 4. foreign-key removals, then index removals
//! 5. `DropColumn`
//! 6. `DropTable`
//!
//! Within each group, steps are sorted by (table name, element name, kind),
//! so identical inputs always produce byte-identical output. Renames are
//! never inferred: a column that disappears while a similar one appears is
//! emitted as Drop + Add.

use molt_core::{MigrationPlan, MigrationStep, PlanError, Schema, SchemaError, Table};
use thiserror::Error;

/// Errors computing a plan.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("invalid schema: {0}")]
    InvalidSchema(#[from] SchemaError),
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Steps collected per ordering group during the walk.
#[derive(Default)]
struct Groups {
    create_tables: Vec<MigrationStep>,
    column_changes: Vec<MigrationStep>,
    /// Units of adjacent steps: a plain addition, or [drop-old, create-new]
    /// for an in-place replacement. Kept as units so replacements stay
    /// adjacent after sorting.
    index_additions: Vec<Vec<MigrationStep>>,
    foreign_key_additions: Vec<Vec<MigrationStep>>,
    foreign_key_removals: Vec<MigrationStep>,
    index_removals: Vec<MigrationStep>,
    drop_columns: Vec<MigrationStep>,
    drop_tables: Vec<MigrationStep>,
}

impl Groups {
    fn into_steps(mut self) -> Vec<MigrationStep> {
        sort_steps(&mut self.create_tables);
        sort_steps(&mut self.column_changes);
        sort_units(&mut self.index_additions);
        sort_units(&mut self.foreign_key_additions);
        sort_steps(&mut self.foreign_key_removals);
        sort_steps(&mut self.index_removals);
        sort_steps(&mut self.drop_columns);
        sort_steps(&mut self.drop_tables);

        let mut steps = self.create_tables;
        steps.extend(self.column_changes);
        steps.extend(self.index_additions.into_iter().flatten());
        steps.extend(self.foreign_key_additions.into_iter().flatten());
        steps.extend(self.foreign_key_removals);
        steps.extend(self.index_removals);
        steps.extend(self.drop_columns);
        steps.extend(self.drop_tables);
        steps
    }
}

fn sort_steps(steps: &mut [MigrationStep]) {
    steps.sort_by(|a, b| {
        (a.table_name(), a.element(), a.kind()).cmp(&(b.table_name(), b.element(), b.kind()))
    });
}

fn sort_units(units: &mut [Vec<MigrationStep>]) {
    units.sort_by(|a, b| {
        let key = |unit: &[MigrationStep]| {
            unit.last()
                .map(|s| (s.table_name().to_string(), s.element().to_string()))
                .unwrap_or_default()
        };
        key(a).cmp(&key(b))
    });
}

/// Compute the ordered step sequence transforming `current` into `desired`.
///
/// Pure and deterministic; validates both inputs and fails fast with no
/// side effects. Diffing identical schemas yields the empty sequence.
pub fn diff(current: &Schema, desired: &Schema) -> Result<Vec<MigrationStep>, DiffError> {
    current.validate()?;
    desired.validate()?;

    let mut groups = Groups::default();

    for table in &desired.tables {
        match current.table(&table.name) {
            None => {
                // New table: columns, primary key, and indexes travel in the
                // CreateTable payload; foreign keys become separate steps so
                // they can point at tables created later in the plan.
                let mut created = table.clone();
                let foreign_keys = std::mem::take(&mut created.foreign_keys);
                groups
                    .create_tables
                    .push(MigrationStep::CreateTable { table: created });
                for foreign_key in foreign_keys {
                    groups.foreign_key_additions.push(vec![
                        MigrationStep::AddForeignKey {
                            table: table.name.clone(),
                            foreign_key,
                        },
                    ]);
                }
            }
            Some(existing) => diff_table(existing, table, &mut groups),
        }
    }

    for table in &current.tables {
        if desired.table(&table.name).is_none() {
            groups.drop_tables.push(MigrationStep::DropTable {
                table: table.clone(),
            });
        }
    }

    Ok(groups.into_steps())
}

/// Compute a checksummed plan from the diff of two schemas.
pub fn plan(current: &Schema, desired: &Schema) -> Result<MigrationPlan, DiffError> {
    Ok(MigrationPlan::new(diff(current, desired)?)?)
}

fn diff_table(current: &Table, desired: &Table, groups: &mut Groups) {
    let table = desired.name.clone();

    for column in &desired.columns {
        match current.column(&column.name) {
            None => groups.column_changes.push(MigrationStep::AddColumn {
                table: table.clone(),
                column: column.clone(),
            }),
            Some(existing) if existing != column => {
                groups.column_changes.push(MigrationStep::AlterColumn {
                    table: table.clone(),
                    from: existing.clone(),
                    to: column.clone(),
                });
            }
            Some(_) => {}
        }
    }
    for column in &current.columns {
        if desired.column(&column.name).is_none() {
            groups.drop_columns.push(MigrationStep::DropColumn {
                table: table.clone(),
                column: column.clone(),
            });
        }
    }

    if current.primary_key != desired.primary_key {
        groups.column_changes.push(MigrationStep::AlterTable {
            table: table.clone(),
            from_primary_key: current.primary_key.clone(),
            to_primary_key: desired.primary_key.clone(),
        });
    }

    for index in &desired.indexes {
        match current.index(&index.name) {
            None => groups.index_additions.push(vec![MigrationStep::CreateIndex {
                table: table.clone(),
                index: index.clone(),
            }]),
            Some(existing) if existing != index => {
                groups.index_additions.push(vec![
                    MigrationStep::DropIndex {
                        table: table.clone(),
                        index: existing.clone(),
                    },
                    MigrationStep::CreateIndex {
                        table: table.clone(),
                        index: index.clone(),
                    },
                ]);
            }
            Some(_) => {}
        }
    }
    for index in &current.indexes {
        if desired.index(&index.name).is_none() {
            groups.index_removals.push(MigrationStep::DropIndex {
                table: table.clone(),
                index: index.clone(),
            });
        }
    }

    for foreign_key in &desired.foreign_keys {
        match current.foreign_key(&foreign_key.name) {
            None => groups
                .foreign_key_additions
                .push(vec![MigrationStep::AddForeignKey {
                    table: table.clone(),
                    foreign_key: foreign_key.clone(),
                }]),
            Some(existing) if existing != foreign_key => {
                groups.foreign_key_additions.push(vec![
                    MigrationStep::DropForeignKey {
                        table: table.clone(),
                        foreign_key: existing.clone(),
                    },
                    MigrationStep::AddForeignKey {
                        table: table.clone(),
                        foreign_key: foreign_key.clone(),
                    },
                ]);
            }
            Some(_) => {}
        }
    }
    for foreign_key in &current.foreign_keys {
        if desired.foreign_key(&foreign_key.name).is_none() {
            groups.foreign_key_removals.push(MigrationStep::DropForeignKey {
                table: table.clone(),
                foreign_key: foreign_key.clone(),
            });
        }
    }
}

#[cfg(test)]
#[path = "differ_tests.rs"]
mod tests;
