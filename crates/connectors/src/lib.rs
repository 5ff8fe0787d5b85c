// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Backend connectors for the molt migration engine
//!
//! A connector translates migration steps into backend-native operations,
//! reports what it supports via a capability query, and holds the exclusive
//! plan lock for its target.

mod capability;
mod connector;
pub mod memory;
mod render;

#[cfg(feature = "pg")]
pub mod postgres;

pub use capability::{Capabilities, UnsupportedReason, ALL_STEP_KINDS};
pub use connector::{Connector, ConnectorError, PlanLock};
pub use memory::MemoryConnector;
pub use render::{render_statements, render_step};

#[cfg(feature = "pg")]
pub use postgres::PostgresConnector;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ConnectorCall, FakeConnector};
