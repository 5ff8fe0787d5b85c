// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Engine settings a caller can persist next to its project.
///
/// Everything has a conservative default: destructive steps refused, no
/// deadline, history under `.molt/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Allow plans containing destructive steps (drop table/column, lossy
    /// alters). Off by default.
    pub allow_destructive: bool,
    /// Advisory deadline for a plan application, checked between steps.
    pub deadline_secs: Option<u64>,
    /// Directory holding per-target history journals.
    pub history_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allow_destructive: false,
            deadline_secs: None,
            history_dir: PathBuf::from(".molt/history"),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Load from a file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
