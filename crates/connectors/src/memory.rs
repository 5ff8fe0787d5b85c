// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory reference connector.
//!
//! Applies steps to a schema value held behind a mutex. Full capabilities,
//! fully transactional (each step either lands or leaves the schema
//! untouched). Used by the round-trip tests and anywhere a real backend is
//! not wanted.

use crate::capability::Capabilities;
use crate::connector::{Connector, ConnectorError, PlanLock};
use crate::render::render_step;
use async_trait::async_trait;
use molt_core::{apply_step, MigrationStep, Schema};
use parking_lot::Mutex;
use std::sync::Arc;

struct MemoryState {
    schema: Schema,
    /// Token of the currently held plan lock, if any.
    lock: Option<u64>,
    next_lock_token: u64,
}

/// Connector over an in-memory schema value.
#[derive(Clone)]
pub struct MemoryConnector {
    inner: Arc<Mutex<MemoryState>>,
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new(Schema::empty())
    }
}

impl MemoryConnector {
    /// Start from the given schema (the simulated current database state).
    pub fn new(schema: Schema) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryState {
                schema,
                lock: None,
                next_lock_token: 1,
            })),
        }
    }

    /// Snapshot of the current schema.
    pub fn schema(&self) -> Schema {
        self.inner.lock().schema.clone()
    }

    /// Whether the plan lock is currently held.
    pub fn is_locked(&self) -> bool {
        self.inner.lock().lock.is_some()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    fn connector_type(&self) -> &'static str {
        "memory"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::full()
    }

    async fn apply_step(&self, step: &MigrationStep) -> Result<(), ConnectorError> {
        let mut state = self.inner.lock();
        // apply_step checks preconditions before mutating; a failed step
        // leaves the schema untouched.
        apply_step(&mut state.schema, step)?;
        Ok(())
    }

    async fn revert_step(&self, step: &MigrationStep) -> Result<(), ConnectorError> {
        let inverse = step
            .invert()
            .ok_or_else(|| ConnectorError::NotInvertible(step.describe()))?;
        let mut state = self.inner.lock();
        apply_step(&mut state.schema, &inverse)?;
        Ok(())
    }

    fn render_preview(&self, step: &MigrationStep) -> String {
        render_step(step)
    }

    async fn introspect(&self) -> Result<Schema, ConnectorError> {
        Ok(self.schema())
    }

    async fn acquire_lock(&self) -> Result<PlanLock, ConnectorError> {
        let mut state = self.inner.lock();
        if state.lock.is_some() {
            return Err(ConnectorError::LockHeld);
        }
        let token = state.next_lock_token;
        state.next_lock_token += 1;
        state.lock = Some(token);
        Ok(PlanLock::new(token))
    }

    async fn release_lock(&self, lock: PlanLock) -> Result<(), ConnectorError> {
        let mut state = self.inner.lock();
        if state.lock != Some(lock.token()) {
            return Err(ConnectorError::UnknownLock(lock.token()));
        }
        state.lock = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
