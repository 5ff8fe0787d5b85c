// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Intermediate schema representation: tables, columns, indexes, foreign keys.
//!
//! This is the exchange type between the schema source (declarative definition
//! or live introspection), the differ, and the connectors. Pure data: the only
//! behavior is validation, lookup, and equality. Equality ignores declaration
//! order; the stored order is preserved because generated DDL follows it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Errors from schema validation (malformed intermediate representation).
///
/// Validation is fail-fast: the first violation found is returned and no
/// partial state is created anywhere downstream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate table `{0}`")]
    DuplicateTable(String),
    #[error("duplicate column `{column}` in table `{table}`")]
    DuplicateColumn { table: String, column: String },
    #[error("{context} on table `{table}` references unknown column `{column}`")]
    UnknownColumn {
        table: String,
        column: String,
        /// What referenced the column: "primary key", "index `x`", "foreign key `y`"
        context: String,
    },
    #[error("foreign key `{name}` on `{table}` references unknown table `{referenced_table}`")]
    UnknownReferencedTable {
        table: String,
        name: String,
        referenced_table: String,
    },
    #[error(
        "foreign key `{name}` on `{table}` references unknown column `{referenced_table}.{column}`"
    )]
    UnknownReferencedColumn {
        table: String,
        name: String,
        referenced_table: String,
        column: String,
    },
    #[error(
        "foreign key `{name}` on `{table}` has {local} local column(s) but {referenced} referenced column(s)"
    )]
    ForeignKeyArity {
        table: String,
        name: String,
        local: usize,
        referenced: usize,
    },
}

/// Scalar column type families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    BigInt,
    Float,
    Boolean,
    Text,
    Bytes,
    DateTime,
    Json,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::BigInt => write!(f, "bigint"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Bytes => write!(f, "bytes"),
            ColumnType::DateTime => write!(f, "datetime"),
            ColumnType::Json => write!(f, "json"),
        }
    }
}

/// Referential action of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferentialAction::NoAction => write!(f, "no action"),
            ReferentialAction::Restrict => write!(f, "restrict"),
            ReferentialAction::Cascade => write!(f, "cascade"),
            ReferentialAction::SetNull => write!(f, "set null"),
            ReferentialAction::SetDefault => write!(f, "set default"),
        }
    }
}

/// A single column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub tpe: ColumnType,
    #[serde(default)]
    pub nullable: bool,
    /// Default-value expression rendered verbatim by the connector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub unique: bool,
}

impl Column {
    /// A required, non-unique column with no default.
    pub fn new(name: impl Into<String>, tpe: ColumnType) -> Self {
        Self {
            name: name.into(),
            tpe,
            nullable: false,
            default: None,
            unique: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }
}

/// A secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

impl Index {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// A foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    #[serde(default)]
    pub on_delete: ReferentialAction,
}

impl ForeignKey {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        referenced_table: impl Into<String>,
        referenced_columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            referenced_table: referenced_table.into(),
            referenced_columns,
            on_delete: ReferentialAction::default(),
        }
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }
}

/// A table: named, with ordered columns and sets of indexes and foreign keys.
///
/// Column order matters for generated DDL but not for equality; see the
/// manual `PartialEq` below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            primary_key: None,
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn with_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn with_primary_key(mut self, columns: Vec<String>) -> Self {
        self.primary_key = Some(columns);
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.name == name)
    }
}

/// Anything in the schema model addressed by a unique name.
trait Named {
    fn name(&self) -> &str;
}

impl Named for Column {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Index {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ForeignKey {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Table {
    fn name(&self) -> &str {
        &self.name
    }
}

fn sorted_by_name<T: Named>(items: &[T]) -> Vec<&T> {
    let mut v: Vec<&T> = items.iter().collect();
    v.sort_by(|a, b| a.name().cmp(b.name()));
    v
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.primary_key == other.primary_key
            && sorted_by_name(&self.columns) == sorted_by_name(&other.columns)
            && sorted_by_name(&self.indexes) == sorted_by_name(&other.indexes)
            && sorted_by_name(&self.foreign_keys) == sorted_by_name(&other.foreign_keys)
    }
}

impl Eq for Table {}

/// A full schema: an unordered set of uniquely named tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub tables: Vec<Table>,
}

impl Schema {
    /// The empty schema (the fold origin for history reconstruction).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Validate structural invariants: unique table names, unique column
    /// names per table, and every index / primary key / foreign key
    /// resolving to existing columns (and, for foreign keys, an existing
    /// table with matching column arity).
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut table_names = BTreeSet::new();
        for table in &self.tables {
            if !table_names.insert(table.name.as_str()) {
                return Err(SchemaError::DuplicateTable(table.name.clone()));
            }
        }

        for table in &self.tables {
            let mut column_names = BTreeSet::new();
            for column in &table.columns {
                if !column_names.insert(column.name.as_str()) {
                    return Err(SchemaError::DuplicateColumn {
                        table: table.name.clone(),
                        column: column.name.clone(),
                    });
                }
            }

            if let Some(pk) = &table.primary_key {
                for column in pk {
                    if !column_names.contains(column.as_str()) {
                        return Err(SchemaError::UnknownColumn {
                            table: table.name.clone(),
                            column: column.clone(),
                            context: "primary key".to_string(),
                        });
                    }
                }
            }

            for index in &table.indexes {
                for column in &index.columns {
                    if !column_names.contains(column.as_str()) {
                        return Err(SchemaError::UnknownColumn {
                            table: table.name.clone(),
                            column: column.clone(),
                            context: format!("index `{}`", index.name),
                        });
                    }
                }
            }

            for fk in &table.foreign_keys {
                if fk.columns.len() != fk.referenced_columns.len() {
                    return Err(SchemaError::ForeignKeyArity {
                        table: table.name.clone(),
                        name: fk.name.clone(),
                        local: fk.columns.len(),
                        referenced: fk.referenced_columns.len(),
                    });
                }
                for column in &fk.columns {
                    if !column_names.contains(column.as_str()) {
                        return Err(SchemaError::UnknownColumn {
                            table: table.name.clone(),
                            column: column.clone(),
                            context: format!("foreign key `{}`", fk.name),
                        });
                    }
                }
                let Some(referenced) = self.table(&fk.referenced_table) else {
                    return Err(SchemaError::UnknownReferencedTable {
                        table: table.name.clone(),
                        name: fk.name.clone(),
                        referenced_table: fk.referenced_table.clone(),
                    });
                };
                for column in &fk.referenced_columns {
                    if referenced.column(column).is_none() {
                        return Err(SchemaError::UnknownReferencedColumn {
                            table: table.name.clone(),
                            name: fk.name.clone(),
                            referenced_table: fk.referenced_table.clone(),
                            column: column.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        sorted_by_name(&self.tables) == sorted_by_name(&other.tables)
    }
}

impl Eq for Schema {}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
