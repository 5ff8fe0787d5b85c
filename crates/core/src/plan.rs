// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Migration plans: an ordered step sequence plus its content checksum.
//!
//! The checksum is SHA-256 over the canonical JSON serialization of the
//! steps and serves as the plan's identity in the history store.

use crate::step::MigrationStep;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Errors constructing or checking a plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to serialize steps for checksum: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// An ordered, checksummed sequence of migration steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationPlan {
    steps: Vec<MigrationStep>,
    checksum: String,
}

impl MigrationPlan {
    /// Build a plan from a step sequence, computing its checksum.
    pub fn new(steps: Vec<MigrationStep>) -> Result<Self, PlanError> {
        let checksum = checksum_of(&steps)?;
        Ok(Self { steps, checksum })
    }

    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Recompute the checksum and compare against the stored one.
    ///
    /// A deserialized plan whose steps were edited after the checksum was
    /// computed fails this check.
    pub fn verify_checksum(&self) -> Result<bool, PlanError> {
        Ok(checksum_of(&self.steps)? == self.checksum)
    }
}

impl fmt::Display for MigrationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "plan {} ({} steps)",
            &self.checksum[..12.min(self.checksum.len())],
            self.steps.len()
        )
    }
}

/// SHA-256 hex digest over the canonical JSON serialization of the steps.
fn checksum_of(steps: &[MigrationStep]) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_string(steps)?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(format!("{:x}", digest))
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
