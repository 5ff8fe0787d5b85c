// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor errors

use molt_connectors::{ConnectorError, UnsupportedReason};
use molt_core::PlanError;
use molt_storage::HistoryError;
use thiserror::Error;

/// Errors that can occur while applying or reverting a plan.
///
/// Validation errors (`AlreadyApplied`, `UnsupportedStep`,
/// `ChecksumMismatch`, `NotInvertible`, `UnknownPlan`) are raised before any
/// mutation. Once a step has committed, failures are reported through the
/// execution report instead, so partial outcomes stay visible.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("plan checksum does not match its steps")]
    ChecksumMismatch,

    #[error("plan {0} has already been applied")]
    AlreadyApplied(String),

    #[error("step {index} ({step}) is unsupported: {reason}")]
    UnsupportedStep {
        index: usize,
        step: String,
        reason: UnsupportedReason,
    },

    #[error("no history entry found for plan {0}")]
    UnknownPlan(String),

    #[error("step is not invertible: {0}")]
    NotInvertible(String),

    #[error("connector error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("history error: {0}")]
    History(#[from] HistoryError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}
