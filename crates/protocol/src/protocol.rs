// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response vocabulary for the command surface.

use molt_core::{MigrationPlan, Schema};
use molt_engine::{DestructiveWarning, ExecutionReport};
use molt_storage::HistoryEntry;
use serde::{Deserialize, Serialize};

/// Request from a caller to the engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Diff two schemas into a checksummed plan
    ComputePlan { current: Schema, desired: Schema },

    /// Apply a plan (or preview it with `dry_run`)
    ApplyPlan {
        plan: MigrationPlan,
        #[serde(default)]
        dry_run: bool,
        #[serde(default)]
        allow_destructive: bool,
    },

    /// Revert a previously applied plan's steps, in reverse order
    RevertPlan { plan: MigrationPlan },

    /// List the target's history entries
    ListHistory,
}

/// Response from the engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Pong,

    Hello { version: String },

    /// The computed plan and what it might destroy
    Plan {
        plan: MigrationPlan,
        warnings: Vec<DestructiveWarning>,
    },

    /// Outcome of an apply or dry run, with per-step states
    Report { report: ExecutionReport },

    /// Acknowledges a completed revert
    Reverted { checksum: String },

    History { entries: Vec<HistoryEntry> },

    /// Any operation failure, as a caller-facing message
    Error { message: String },
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
