// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake connector for testing

use crate::capability::Capabilities;
use crate::connector::{Connector, ConnectorError, PlanLock};
use async_trait::async_trait;
use molt_core::{MigrationStep, Schema, StepKind};
use parking_lot::Mutex;
use std::sync::Arc;

/// Recorded connector call
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorCall {
    Apply(MigrationStep),
    Revert(MigrationStep),
    Introspect,
    AcquireLock,
    ReleaseLock(u64),
}

struct FakeState {
    calls: Vec<ConnectorCall>,
    capabilities: Capabilities,
    /// Zero-based apply indexes that fail with a backend error.
    fail_apply_at: Vec<usize>,
    applies_seen: usize,
    schema: Schema,
    lock: Option<u64>,
    next_lock_token: u64,
}

/// Fake connector: records calls, optionally fails scripted steps.
#[derive(Clone)]
pub struct FakeConnector {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeConnector {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                capabilities: Capabilities::full(),
                fail_apply_at: Vec::new(),
                applies_seen: 0,
                schema: Schema::empty(),
                lock: None,
                next_lock_token: 1,
            })),
        }
    }
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the capability set reported to the executor.
    pub fn with_capabilities(self, capabilities: Capabilities) -> Self {
        self.inner.lock().capabilities = capabilities;
        self
    }

    /// Drop support for one step kind.
    pub fn without_support_for(self, kind: StepKind) -> Self {
        {
            let mut state = self.inner.lock();
            state.capabilities = state.capabilities.clone().without(kind);
        }
        self
    }

    /// Make the n-th apply call (zero-based) fail with a backend error.
    pub fn fail_apply_at(self, index: usize) -> Self {
        self.inner.lock().fail_apply_at.push(index);
        self
    }

    /// Set the schema returned by introspection.
    pub fn with_schema(self, schema: Schema) -> Self {
        self.inner.lock().schema = schema;
        self
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ConnectorCall> {
        self.inner.lock().calls.clone()
    }

    /// Steps passed to `apply_step`, in order.
    pub fn applied_steps(&self) -> Vec<MigrationStep> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ConnectorCall::Apply(step) => Some(step.clone()),
                _ => None,
            })
            .collect()
    }

    /// Steps passed to `revert_step`, in order.
    pub fn reverted_steps(&self) -> Vec<MigrationStep> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ConnectorCall::Revert(step) => Some(step.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether the plan lock is currently held.
    pub fn is_locked(&self) -> bool {
        self.inner.lock().lock.is_some()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    fn connector_type(&self) -> &'static str {
        "fake"
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.lock().capabilities.clone()
    }

    async fn apply_step(&self, step: &MigrationStep) -> Result<(), ConnectorError> {
        let mut state = self.inner.lock();
        state.calls.push(ConnectorCall::Apply(step.clone()));
        let index = state.applies_seen;
        state.applies_seen += 1;
        if state.fail_apply_at.contains(&index) {
            return Err(ConnectorError::Backend(format!(
                "scripted failure at step {}",
                index
            )));
        }
        Ok(())
    }

    async fn revert_step(&self, step: &MigrationStep) -> Result<(), ConnectorError> {
        if !step.is_invertible() {
            return Err(ConnectorError::NotInvertible(step.describe()));
        }
        self.inner
            .lock()
            .calls
            .push(ConnectorCall::Revert(step.clone()));
        Ok(())
    }

    fn render_preview(&self, step: &MigrationStep) -> String {
        crate::render::render_step(step)
    }

    async fn introspect(&self) -> Result<Schema, ConnectorError> {
        let mut state = self.inner.lock();
        state.calls.push(ConnectorCall::Introspect);
        Ok(state.schema.clone())
    }

    async fn acquire_lock(&self) -> Result<PlanLock, ConnectorError> {
        let mut state = self.inner.lock();
        state.calls.push(ConnectorCall::AcquireLock);
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
        state.calls.push(ConnectorCall::ReleaseLock(lock.token()));
        if state.lock != Some(lock.token()) {
            return Err(ConnectorError::UnknownLock(lock.token()));
        }
        state.lock = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
