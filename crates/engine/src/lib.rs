// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! molt migration engine: schema differ and plan executor

mod destructive;
mod differ;
mod error;
mod executor;

pub use destructive::{check_destructive, DestructiveWarning};
pub use differ::{diff, plan, DiffError};
pub use error::ExecuteError;
pub use executor::{ExecutionMode, ExecutionReport, Executor, PlanState, StepReport};
