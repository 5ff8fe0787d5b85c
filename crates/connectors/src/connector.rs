// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The connector trait: backend-agnostic step execution.

use crate::capability::Capabilities;
use async_trait::async_trait;
use molt_core::{ApplyError, MigrationStep, Schema};
use thiserror::Error;

/// Errors from connector operations
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Revert requested on a step that cannot be inverted.
    #[error("step is not invertible: {0}")]
    NotInvertible(String),

    /// Another plan application holds the exclusive lock on this target.
    #[error("plan lock is held by another migration run")]
    LockHeld,

    /// Releasing a lock that this connector did not hand out.
    #[error("unknown plan lock token {0}")]
    UnknownLock(u64),

    /// The target's structure does not match the step's preconditions.
    #[error("schema state mismatch: {0}")]
    StateMismatch(#[from] ApplyError),

    /// Backend-specific execution failure.
    #[error("backend error: {0}")]
    Backend(String),

    #[cfg(feature = "pg")]
    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),
}

/// Token for a held exclusive plan lock.
///
/// Returned by [`Connector::acquire_lock`] and consumed by
/// [`Connector::release_lock`]; the executor threads it through so release
/// happens on every exit path, including failures.
#[derive(Debug, PartialEq, Eq)]
pub struct PlanLock {
    token: u64,
}

impl PlanLock {
    pub(crate) fn new(token: u64) -> Self {
        Self { token }
    }

    pub fn token(&self) -> u64 {
        self.token
    }
}

/// Adapter for executing migration steps against one backend family.
///
/// Implementations must make each step atomic from the caller's perspective
/// wherever the backend's transactional-DDL support allows, and report
/// non-transactional step kinds via [`Connector::capabilities`] so the
/// executor can choose a containment strategy.
#[async_trait]
pub trait Connector: Clone + Send + Sync + 'static {
    /// Backend family name, e.g. "memory" or "postgres".
    fn connector_type(&self) -> &'static str;

    /// What this backend can execute, and how.
    fn capabilities(&self) -> Capabilities;

    /// Execute one step against the live target.
    async fn apply_step(&self, step: &MigrationStep) -> Result<(), ConnectorError>;

    /// Execute the inverse of a step, where one exists.
    ///
    /// Fails with [`ConnectorError::NotInvertible`] otherwise; no state
    /// changes in that case.
    async fn revert_step(&self, step: &MigrationStep) -> Result<(), ConnectorError>;

    /// Human-readable rendering of what `apply_step` would execute.
    fn render_preview(&self, step: &MigrationStep) -> String;

    /// Describe the target's current structure.
    async fn introspect(&self) -> Result<Schema, ConnectorError>;

    /// Take the exclusive plan lock for this target.
    ///
    /// Fails with [`ConnectorError::LockHeld`] if another run holds it.
    async fn acquire_lock(&self) -> Result<PlanLock, ConnectorError>;

    /// Release a lock previously returned by [`Connector::acquire_lock`].
    async fn release_lock(&self, lock: PlanLock) -> Result<(), ConnectorError>;
}
