// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Task runner port.
//!
//! A task runner turns a prompt into `(text, exit code)` by driving an
//! external AI command-line tool. Agents only see the [`TaskRunner`]
//! trait; [`SubprocessRunner`] is the production adapter.

mod backend;
mod subprocess;

pub use backend::{backend_config, is_known_backend, BackendConfig, PromptStyle, TierModels, DEFAULT_BACKEND};
pub use subprocess::SubprocessRunner;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RunnerError;

/// Model tier, one per agent role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Coordinator,
    Manager,
    Worker,
}

impl ModelTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coordinator => "coordinator",
            Self::Manager => "manager",
            Self::Worker => "worker",
        }
    }
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a runner invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// Combined stdout followed by stderr.
    pub output: String,
    /// Process exit code, `-1` when killed by a signal.
    pub exit_code: i32,
}

impl RunOutput {
    pub fn new(output: impl Into<String>, exit_code: i32) -> Self {
        Self {
            output: output.into(),
            exit_code,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait implemented by everything that can execute a prompt.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// Run `prompt` for `tier` in `cwd`, bounded by `timeout`.
    async fn run(
        &self,
        prompt: &str,
        tier: ModelTier,
        cwd: &Path,
        timeout: Duration,
    ) -> Result<RunOutput, RunnerError>;

    /// Build the argv for an interactive session of `tier`.
    fn build_interactive_command(
        &self,
        tier: ModelTier,
        system_prompt: Option<&Path>,
    ) -> Result<Vec<String>, RunnerError>;
}
