// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed vocabulary of atomic migration steps.
//!
//! Each variant is self-contained: it carries the full before/after payload
//! needed to render the forward operation and, where the step is invertible,
//! the backward one. Steps are immutable once produced by the differ.

use crate::schema::{Column, ForeignKey, Index, Table};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One atomic structural change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MigrationStep {
    /// Create a table with its columns, primary key, and indexes.
    ///
    /// Foreign keys of a new table are emitted as separate [`MigrationStep::AddForeignKey`]
    /// steps so they can reference tables created later in the same plan.
    CreateTable { table: Table },

    /// Drop a table. The full definition is carried for diagnostics and
    /// previews; the contained data is gone, so this step is not invertible.
    DropTable { table: Table },

    AddColumn { table: String, column: Column },

    /// Drop a column. Carries the dropped definition; not invertible (data loss).
    DropColumn { table: String, column: Column },

    /// Change a column's type, nullability, default, or uniqueness in place.
    AlterColumn {
        table: String,
        from: Column,
        to: Column,
    },

    /// Change table-level properties: the primary-key column set.
    AlterTable {
        table: String,
        from_primary_key: Option<Vec<String>>,
        to_primary_key: Option<Vec<String>>,
    },

    CreateIndex { table: String, index: Index },

    DropIndex { table: String, index: Index },

    AddForeignKey {
        table: String,
        foreign_key: ForeignKey,
    },

    DropForeignKey {
        table: String,
        foreign_key: ForeignKey,
    },
}

/// Tag-only variant of [`MigrationStep`] for capability queries and protocol
/// DTOs (strips associated data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    CreateTable,
    DropTable,
    AddColumn,
    DropColumn,
    AlterColumn,
    AlterTable,
    CreateIndex,
    DropIndex,
    AddForeignKey,
    DropForeignKey,
}

impl From<&MigrationStep> for StepKind {
    fn from(step: &MigrationStep) -> Self {
        match step {
            MigrationStep::CreateTable { .. } => StepKind::CreateTable,
            MigrationStep::DropTable { .. } => StepKind::DropTable,
            MigrationStep::AddColumn { .. } => StepKind::AddColumn,
            MigrationStep::DropColumn { .. } => StepKind::DropColumn,
            MigrationStep::AlterColumn { .. } => StepKind::AlterColumn,
            MigrationStep::AlterTable { .. } => StepKind::AlterTable,
            MigrationStep::CreateIndex { .. } => StepKind::CreateIndex,
            MigrationStep::DropIndex { .. } => StepKind::DropIndex,
            MigrationStep::AddForeignKey { .. } => StepKind::AddForeignKey,
            MigrationStep::DropForeignKey { .. } => StepKind::DropForeignKey,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::CreateTable => write!(f, "create_table"),
            StepKind::DropTable => write!(f, "drop_table"),
            StepKind::AddColumn => write!(f, "add_column"),
            StepKind::DropColumn => write!(f, "drop_column"),
            StepKind::AlterColumn => write!(f, "alter_column"),
            StepKind::AlterTable => write!(f, "alter_table"),
            StepKind::CreateIndex => write!(f, "create_index"),
            StepKind::DropIndex => write!(f, "drop_index"),
            StepKind::AddForeignKey => write!(f, "add_foreign_key"),
            StepKind::DropForeignKey => write!(f, "drop_foreign_key"),
        }
    }
}

impl MigrationStep {
    pub fn kind(&self) -> StepKind {
        self.into()
    }

    /// Name of the table the step touches.
    pub fn table_name(&self) -> &str {
        match self {
            MigrationStep::CreateTable { table } | MigrationStep::DropTable { table } => {
                &table.name
            }
            MigrationStep::AddColumn { table, .. }
            | MigrationStep::DropColumn { table, .. }
            | MigrationStep::AlterColumn { table, .. }
            | MigrationStep::AlterTable { table, .. }
            | MigrationStep::CreateIndex { table, .. }
            | MigrationStep::DropIndex { table, .. }
            | MigrationStep::AddForeignKey { table, .. }
            | MigrationStep::DropForeignKey { table, .. } => table,
        }
    }

    /// Name of the element within the table (the secondary sort key; the
    /// table name itself for table-level steps).
    pub fn element(&self) -> &str {
        match self {
            MigrationStep::CreateTable { table } | MigrationStep::DropTable { table } => {
                &table.name
            }
            MigrationStep::AlterTable { table, .. } => table,
            MigrationStep::AddColumn { column, .. } | MigrationStep::DropColumn { column, .. } => {
                &column.name
            }
            MigrationStep::AlterColumn { to, .. } => &to.name,
            MigrationStep::CreateIndex { index, .. } | MigrationStep::DropIndex { index, .. } => {
                &index.name
            }
            MigrationStep::AddForeignKey { foreign_key, .. }
            | MigrationStep::DropForeignKey { foreign_key, .. } => &foreign_key.name,
        }
    }

    /// Whether applying this step can discard data.
    ///
    /// Dropping a table or column always loses whatever the structure held.
    /// An alter only counts when it changes the column type (value coercion
    /// can truncate); nullability and default changes keep existing values.
    pub fn is_destructive(&self) -> bool {
        match self {
            MigrationStep::DropTable { .. } | MigrationStep::DropColumn { .. } => true,
            MigrationStep::AlterColumn { from, to, .. } => from.tpe != to.tpe,
            _ => false,
        }
    }

    /// The inverse step, for kinds that can be reverted without restoring
    /// lost data. `None` marks the step as not invertible.
    pub fn invert(&self) -> Option<MigrationStep> {
        match self {
            MigrationStep::CreateTable { table } => Some(MigrationStep::DropTable {
                table: table.clone(),
            }),
            MigrationStep::AddColumn { table, column } => Some(MigrationStep::DropColumn {
                table: table.clone(),
                column: column.clone(),
            }),
            MigrationStep::AlterColumn { table, from, to } => Some(MigrationStep::AlterColumn {
                table: table.clone(),
                from: to.clone(),
                to: from.clone(),
            }),
            MigrationStep::AlterTable {
                table,
                from_primary_key,
                to_primary_key,
            } => Some(MigrationStep::AlterTable {
                table: table.clone(),
                from_primary_key: to_primary_key.clone(),
                to_primary_key: from_primary_key.clone(),
            }),
            MigrationStep::CreateIndex { table, index } => Some(MigrationStep::DropIndex {
                table: table.clone(),
                index: index.clone(),
            }),
            MigrationStep::DropIndex { table, index } => Some(MigrationStep::CreateIndex {
                table: table.clone(),
                index: index.clone(),
            }),
            MigrationStep::AddForeignKey { table, foreign_key } => {
                Some(MigrationStep::DropForeignKey {
                    table: table.clone(),
                    foreign_key: foreign_key.clone(),
                })
            }
            MigrationStep::DropForeignKey { table, foreign_key } => {
                Some(MigrationStep::AddForeignKey {
                    table: table.clone(),
                    foreign_key: foreign_key.clone(),
                })
            }
            // Recreating the structure would not bring the data back.
            MigrationStep::DropTable { .. } | MigrationStep::DropColumn { .. } => None,
        }
    }

    pub fn is_invertible(&self) -> bool {
        !matches!(
            self,
            MigrationStep::DropTable { .. } | MigrationStep::DropColumn { .. }
        )
    }

    /// Short human-readable description for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            MigrationStep::CreateTable { table } => format!("create table `{}`", table.name),
            MigrationStep::DropTable { table } => format!("drop table `{}`", table.name),
            MigrationStep::AddColumn { table, column } => {
                format!("add column `{}` to `{}`", column.name, table)
            }
            MigrationStep::DropColumn { table, column } => {
                format!("drop column `{}` from `{}`", column.name, table)
            }
            MigrationStep::AlterColumn { table, to, .. } => {
                format!("alter column `{}` on `{}`", to.name, table)
            }
            MigrationStep::AlterTable { table, .. } => {
                format!("alter primary key of `{}`", table)
            }
            MigrationStep::CreateIndex { table, index } => {
                format!("create index `{}` on `{}`", index.name, table)
            }
            MigrationStep::DropIndex { table, index } => {
                format!("drop index `{}` on `{}`", index.name, table)
            }
            MigrationStep::AddForeignKey { table, foreign_key } => format!(
                "add foreign key `{}` on `{}` referencing `{}`",
                foreign_key.name, table, foreign_key.referenced_table
            ),
            MigrationStep::DropForeignKey { table, foreign_key } => {
                format!("drop foreign key `{}` from `{}`", foreign_key.name, table)
            }
        }
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
