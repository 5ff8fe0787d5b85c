// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Destructive-change classification.
//!
//! Walks a plan and reports the steps that can lose data or fail against
//! existing rows. The executor refuses plans with destructive steps unless
//! the caller opted in; the warnings here are what callers show before
//! asking for that opt-in.

use molt_core::{MigrationPlan, MigrationStep};
use serde::{Deserialize, Serialize};

/// One warning about a potentially lossy step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestructiveWarning {
    pub step_index: usize,
    pub message: String,
}

/// Collect warnings for every step of a plan that can lose data or fail on
/// existing rows.
pub fn check_destructive(plan: &MigrationPlan) -> Vec<DestructiveWarning> {
    let mut warnings = Vec::new();
    for (step_index, step) in plan.steps().iter().enumerate() {
        let message = match step {
            MigrationStep::DropTable { table } => Some(format!(
                "dropping table `{}` discards all of its rows",
                table.name
            )),
            MigrationStep::DropColumn { table, column } => Some(format!(
                "dropping column `{}` on `{}` discards its values",
                column.name, table
            )),
            MigrationStep::AlterColumn { table, from, to } => {
                if from.tpe != to.tpe {
                    Some(format!(
                        "changing `{}`.`{}` from {} to {} may truncate or reject existing values",
                        table, to.name, from.tpe, to.tpe
                    ))
                } else if from.nullable && !to.nullable && to.default.is_none() {
                    Some(format!(
                        "making `{}`.`{}` required without a default fails if null values exist",
                        table, to.name
                    ))
                } else {
                    None
                }
            }
            _ => None,
        };
        if let Some(message) = message {
            warnings.push(DestructiveWarning {
                step_index,
                message,
            });
        }
    }
    warnings
}

#[cfg(test)]
#[path = "destructive_tests.rs"]
mod tests;
