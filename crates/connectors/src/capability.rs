// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capability model: what a backend can execute, and how.
//!
//! The executor validates every step of a plan against the connector's
//! capabilities before the first mutation, so an unsupported plan never
//! touches the target.

use molt_core::{MigrationStep, StepKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Every step kind in the vocabulary.
pub const ALL_STEP_KINDS: [StepKind; 10] = [
    StepKind::CreateTable,
    StepKind::DropTable,
    StepKind::AddColumn,
    StepKind::DropColumn,
    StepKind::AlterColumn,
    StepKind::AlterTable,
    StepKind::CreateIndex,
    StepKind::DropIndex,
    StepKind::AddForeignKey,
    StepKind::DropForeignKey,
];

/// Why a step was refused by [`Capabilities::check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnsupportedReason {
    /// The backend cannot execute this step kind at all.
    Kind(StepKind),
    /// The step can lose data and the caller did not opt in.
    DestructiveNotAllowed(StepKind),
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedReason::Kind(kind) => {
                write!(f, "backend does not support {}", kind)
            }
            UnsupportedReason::DestructiveNotAllowed(kind) => {
                write!(
                    f,
                    "{} can lose data; pass allow_destructive to run it",
                    kind
                )
            }
        }
    }
}

/// What a connector can execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Step kinds the backend can execute at all.
    supported: BTreeSet<StepKind>,
    /// Step kinds that run inside a transaction. A kind present in
    /// `supported` but absent here executes, just not atomically; the
    /// executor can pick a containment strategy accordingly.
    transactional: BTreeSet<StepKind>,
    /// Destructive steps need the caller's explicit opt-in.
    destructive_requires_opt_in: bool,
}

impl Capabilities {
    /// Everything supported, everything transactional, destructive steps
    /// gated behind the opt-in flag.
    pub fn full() -> Self {
        Self {
            supported: ALL_STEP_KINDS.into_iter().collect(),
            transactional: ALL_STEP_KINDS.into_iter().collect(),
            destructive_requires_opt_in: true,
        }
    }

    /// Remove support for a step kind entirely.
    pub fn without(mut self, kind: StepKind) -> Self {
        self.supported.remove(&kind);
        self.transactional.remove(&kind);
        self
    }

    /// Keep a kind executable but outside any transaction.
    pub fn non_transactional(mut self, kind: StepKind) -> Self {
        self.transactional.remove(&kind);
        self
    }

    /// Let destructive steps run without the opt-in flag.
    pub fn allow_destructive_freely(mut self) -> Self {
        self.destructive_requires_opt_in = false;
        self
    }

    pub fn supports(&self, kind: StepKind) -> bool {
        self.supported.contains(&kind)
    }

    pub fn is_transactional(&self, kind: StepKind) -> bool {
        self.transactional.contains(&kind)
    }

    /// Validate one step. Returns the refusal reason, if any.
    pub fn check(
        &self,
        step: &MigrationStep,
        allow_destructive: bool,
    ) -> Result<(), UnsupportedReason> {
        let kind = step.kind();
        if !self.supports(kind) {
            return Err(UnsupportedReason::Kind(kind));
        }
        if self.destructive_requires_opt_in && step.is_destructive() && !allow_destructive {
            return Err(UnsupportedReason::DestructiveNotAllowed(kind));
        }
        Ok(())
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
#[path = "capability_tests.rs"]
mod tests;
