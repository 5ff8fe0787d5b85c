// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DDL text rendering for previews.
//!
//! Renders the generic SQL flavor shown in dry runs. Connectors whose
//! dialect matches (the postgres connector does) execute this text directly;
//! others treat it as documentation of what `apply_step` will do.

use molt_core::{Column, ColumnType, ForeignKey, Index, MigrationStep, ReferentialAction, Table};

fn ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn ident_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| ident(n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn sql_type(tpe: ColumnType) -> &'static str {
    match tpe {
        ColumnType::Integer => "INTEGER",
        ColumnType::BigInt => "BIGINT",
        ColumnType::Float => "DOUBLE PRECISION",
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::Text => "TEXT",
        ColumnType::Bytes => "BYTEA",
        ColumnType::DateTime => "TIMESTAMPTZ",
        ColumnType::Json => "JSONB",
    }
}

fn column_def(column: &Column) -> String {
    let mut def = format!("{} {}", ident(&column.name), sql_type(column.tpe));
    if !column.nullable {
        def.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default {
        def.push_str(" DEFAULT ");
        def.push_str(default);
    }
    if column.unique {
        def.push_str(" UNIQUE");
    }
    def
}

fn render_create_index(table: &str, index: &Index) -> String {
    format!(
        "CREATE {}INDEX {} ON {} ({});",
        if index.unique { "UNIQUE " } else { "" },
        ident(&index.name),
        ident(table),
        ident_list(&index.columns),
    )
}

fn render_add_foreign_key(table: &str, fk: &ForeignKey) -> String {
    let mut stmt = format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        ident(table),
        ident(&fk.name),
        ident_list(&fk.columns),
        ident(&fk.referenced_table),
        ident_list(&fk.referenced_columns),
    );
    let action = match fk.on_delete {
        ReferentialAction::NoAction => None,
        ReferentialAction::Restrict => Some("RESTRICT"),
        ReferentialAction::Cascade => Some("CASCADE"),
        ReferentialAction::SetNull => Some("SET NULL"),
        ReferentialAction::SetDefault => Some("SET DEFAULT"),
    };
    if let Some(action) = action {
        stmt.push_str(" ON DELETE ");
        stmt.push_str(action);
    }
    stmt.push(';');
    stmt
}

fn render_create_table(table: &Table) -> Vec<String> {
    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("  {}", column_def(c)))
        .collect();
    if let Some(pk) = &table.primary_key {
        lines.push(format!("  PRIMARY KEY ({})", ident_list(pk)));
    }
    let mut stmts = vec![format!(
        "CREATE TABLE {} (\n{}\n);",
        ident(&table.name),
        lines.join(",\n")
    )];
    for index in &table.indexes {
        stmts.push(render_create_index(&table.name, index));
    }
    stmts
}

fn render_alter_column(table: &str, from: &Column, to: &Column) -> Vec<String> {
    let mut stmts = Vec::new();
    let target = format!("ALTER TABLE {} ALTER COLUMN {}", ident(table), ident(&to.name));

    if from.tpe != to.tpe {
        stmts.push(format!("{} SET DATA TYPE {};", target, sql_type(to.tpe)));
    }
    if from.nullable != to.nullable {
        if to.nullable {
            stmts.push(format!("{} DROP NOT NULL;", target));
        } else {
            stmts.push(format!("{} SET NOT NULL;", target));
        }
    }
    if from.default != to.default {
        match &to.default {
            Some(default) => stmts.push(format!("{} SET DEFAULT {};", target, default)),
            None => stmts.push(format!("{} DROP DEFAULT;", target)),
        }
    }
    if from.unique != to.unique {
        let constraint = ident(&format!("{}_{}_key", table, to.name));
        if to.unique {
            stmts.push(format!(
                "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({});",
                ident(table),
                constraint,
                ident(&to.name),
            ));
        } else {
            stmts.push(format!(
                "ALTER TABLE {} DROP CONSTRAINT {};",
                ident(table),
                constraint,
            ));
        }
    }

    stmts
}

/// Render one step as individually executable DDL statements.
///
/// Most steps are a single statement; `CreateTable` with embedded indexes
/// and multi-clause `AlterColumn` produce several, to run inside one
/// transaction.
pub fn render_statements(step: &MigrationStep) -> Vec<String> {
    match step {
        MigrationStep::CreateTable { table } => render_create_table(table),
        MigrationStep::DropTable { table } => vec![format!("DROP TABLE {};", ident(&table.name))],
        MigrationStep::AddColumn { table, column } => vec![format!(
            "ALTER TABLE {} ADD COLUMN {};",
            ident(table),
            column_def(column),
        )],
        MigrationStep::DropColumn { table, column } => vec![format!(
            "ALTER TABLE {} DROP COLUMN {};",
            ident(table),
            ident(&column.name),
        )],
        MigrationStep::AlterColumn { table, from, to } => render_alter_column(table, from, to),
        MigrationStep::AlterTable {
            table,
            from_primary_key,
            to_primary_key,
        } => {
            let mut stmts = Vec::new();
            if from_primary_key.is_some() {
                stmts.push(format!(
                    "ALTER TABLE {} DROP CONSTRAINT {};",
                    ident(table),
                    ident(&format!("{}_pkey", table)),
                ));
            }
            if let Some(pk) = to_primary_key {
                stmts.push(format!(
                    "ALTER TABLE {} ADD PRIMARY KEY ({});",
                    ident(table),
                    ident_list(pk),
                ));
            }
            stmts
        }
        MigrationStep::CreateIndex { table, index } => vec![render_create_index(table, index)],
        MigrationStep::DropIndex { index, .. } => {
            vec![format!("DROP INDEX {};", ident(&index.name))]
        }
        MigrationStep::AddForeignKey { table, foreign_key } => {
            vec![render_add_foreign_key(table, foreign_key)]
        }
        MigrationStep::DropForeignKey { table, foreign_key } => vec![format!(
            "ALTER TABLE {} DROP CONSTRAINT {};",
            ident(table),
            ident(&foreign_key.name),
        )],
    }
}

/// Render one step as a block of DDL text (the dry-run preview form).
pub fn render_step(step: &MigrationStep) -> String {
    render_statements(step).join("\n")
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
