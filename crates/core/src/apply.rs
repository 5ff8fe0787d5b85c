// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure application of migration steps onto a schema value.
//!
//! This is the structural semantics of the step vocabulary, shared by the
//! history fold (rebuilding the last applied schema from sealed plans), the
//! in-memory connector, and the round-trip tests. Applying a step against a
//! schema that does not match the step's preconditions is an error, never a
//! silent no-op.

use crate::schema::Schema;
use crate::step::MigrationStep;
use thiserror::Error;

/// Errors applying a step to a schema value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("table `{0}` already exists")]
    TableExists(String),
    #[error("table `{0}` not found")]
    TableNotFound(String),
    #[error("column `{column}` already exists on `{table}`")]
    ColumnExists { table: String, column: String },
    #[error("column `{column}` not found on `{table}`")]
    ColumnNotFound { table: String, column: String },
    #[error("column `{column}` on `{table}` does not match the step's expected definition")]
    ColumnMismatch { table: String, column: String },
    #[error("primary key of `{table}` does not match the step's expected definition")]
    PrimaryKeyMismatch { table: String },
    #[error("index `{index}` already exists on `{table}`")]
    IndexExists { table: String, index: String },
    #[error("index `{index}` not found on `{table}`")]
    IndexNotFound { table: String, index: String },
    #[error("foreign key `{foreign_key}` already exists on `{table}`")]
    ForeignKeyExists { table: String, foreign_key: String },
    #[error("foreign key `{foreign_key}` not found on `{table}`")]
    ForeignKeyNotFound { table: String, foreign_key: String },
}

/// Apply a single step to a schema in place.
pub fn apply_step(schema: &mut Schema, step: &MigrationStep) -> Result<(), ApplyError> {
    match step {
        MigrationStep::CreateTable { table } => {
            if schema.table(&table.name).is_some() {
                return Err(ApplyError::TableExists(table.name.clone()));
            }
            schema.tables.push(table.clone());
            Ok(())
        }
        MigrationStep::DropTable { table } => {
            let before = schema.tables.len();
            schema.tables.retain(|t| t.name != table.name);
            if schema.tables.len() == before {
                return Err(ApplyError::TableNotFound(table.name.clone()));
            }
            Ok(())
        }
        MigrationStep::AddColumn { table, column } => {
            let t = schema
                .table_mut(table)
                .ok_or_else(|| ApplyError::TableNotFound(table.clone()))?;
            if t.column(&column.name).is_some() {
                return Err(ApplyError::ColumnExists {
                    table: table.clone(),
                    column: column.name.clone(),
                });
            }
            t.columns.push(column.clone());
            Ok(())
        }
        MigrationStep::DropColumn { table, column } => {
            let t = schema
                .table_mut(table)
                .ok_or_else(|| ApplyError::TableNotFound(table.clone()))?;
            let before = t.columns.len();
            t.columns.retain(|c| c.name != column.name);
            if t.columns.len() == before {
                return Err(ApplyError::ColumnNotFound {
                    table: table.clone(),
                    column: column.name.clone(),
                });
            }
            Ok(())
        }
        MigrationStep::AlterColumn { table, from, to } => {
            let t = schema
                .table_mut(table)
                .ok_or_else(|| ApplyError::TableNotFound(table.clone()))?;
            let existing = t
                .columns
                .iter_mut()
                .find(|c| c.name == from.name)
                .ok_or_else(|| ApplyError::ColumnNotFound {
                    table: table.clone(),
                    column: from.name.clone(),
                })?;
            // The step carries the expected before-image; a mismatch means
            // the schema drifted since the plan was computed.
            if *existing != *from {
                return Err(ApplyError::ColumnMismatch {
                    table: table.clone(),
                    column: from.name.clone(),
                });
            }
            *existing = to.clone();
            Ok(())
        }
        MigrationStep::AlterTable {
            table,
            from_primary_key,
            to_primary_key,
        } => {
            let t = schema
                .table_mut(table)
                .ok_or_else(|| ApplyError::TableNotFound(table.clone()))?;
            if &t.primary_key != from_primary_key {
                return Err(ApplyError::PrimaryKeyMismatch {
                    table: table.clone(),
                });
            }
            t.primary_key = to_primary_key.clone();
            Ok(())
        }
        MigrationStep::CreateIndex { table, index } => {
            let t = schema
                .table_mut(table)
                .ok_or_else(|| ApplyError::TableNotFound(table.clone()))?;
            if t.index(&index.name).is_some() {
                return Err(ApplyError::IndexExists {
                    table: table.clone(),
                    index: index.name.clone(),
                });
            }
            t.indexes.push(index.clone());
            Ok(())
        }
        MigrationStep::DropIndex { table, index } => {
            let t = schema
                .table_mut(table)
                .ok_or_else(|| ApplyError::TableNotFound(table.clone()))?;
            let before = t.indexes.len();
            t.indexes.retain(|i| i.name != index.name);
            if t.indexes.len() == before {
                return Err(ApplyError::IndexNotFound {
                    table: table.clone(),
                    index: index.name.clone(),
                });
            }
            Ok(())
        }
        MigrationStep::AddForeignKey { table, foreign_key } => {
            let t = schema
                .table_mut(table)
                .ok_or_else(|| ApplyError::TableNotFound(table.clone()))?;
            if t.foreign_key(&foreign_key.name).is_some() {
                return Err(ApplyError::ForeignKeyExists {
                    table: table.clone(),
                    foreign_key: foreign_key.name.clone(),
                });
            }
            t.foreign_keys.push(foreign_key.clone());
            Ok(())
        }
        MigrationStep::DropForeignKey { table, foreign_key } => {
            let t = schema
                .table_mut(table)
                .ok_or_else(|| ApplyError::TableNotFound(table.clone()))?;
            let before = t.foreign_keys.len();
            t.foreign_keys.retain(|fk| fk.name != foreign_key.name);
            if t.foreign_keys.len() == before {
                return Err(ApplyError::ForeignKeyNotFound {
                    table: table.clone(),
                    foreign_key: foreign_key.name.clone(),
                });
            }
            Ok(())
        }
    }
}

/// Apply a whole step sequence in order, stopping at the first failure.
pub fn apply_steps(schema: &mut Schema, steps: &[MigrationStep]) -> Result<(), ApplyError> {
    for step in steps {
        apply_step(schema, step)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "apply_tests.rs"]
mod tests;
