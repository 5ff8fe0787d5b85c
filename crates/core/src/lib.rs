// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! molt-core: schema model, step vocabulary, and plan types for the molt
//! migration engine

pub mod apply;
pub mod cancel;
pub mod clock;
pub mod config;
pub mod id;
pub mod plan;
pub mod schema;
pub mod step;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use apply::{apply_step, apply_steps, ApplyError};
pub use cancel::CancelToken;
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use id::{HistoryEntryId, IdGen, SeqIdGen, UuidIdGen};
pub use plan::{MigrationPlan, PlanError};
pub use schema::{
    Column, ColumnType, ForeignKey, Index, ReferentialAction, Schema, SchemaError, Table,
};
pub use step::{MigrationStep, StepKind};
