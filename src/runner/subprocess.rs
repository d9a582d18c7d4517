// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Subprocess adapter for the task runner port.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::error::RunnerError;

use super::backend::{backend_config, BackendConfig};
use super::{ModelTier, RunOutput, TaskRunner};

/// Runs prompts by spawning an AI command-line tool.
#[derive(Debug, Clone)]
pub struct SubprocessRunner {
    backend: BackendConfig,
}

impl SubprocessRunner {
    /// Runner for a named backend; unknown names resolve to the default.
    pub fn new(backend_name: &str) -> Self {
        Self {
            backend: backend_config(backend_name),
        }
    }

    pub fn with_backend(backend: BackendConfig) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &BackendConfig {
        &self.backend
    }
}

#[async_trait]
impl TaskRunner for SubprocessRunner {
    #[cfg_attr(feature = "telemetry", instrument(skip(self, prompt, cwd, tier), fields(backend = %self.backend.name, tier = %tier)))]
    async fn run(
        &self,
        prompt: &str,
        tier: ModelTier,
        cwd: &Path,
        timeout_duration: Duration,
    ) -> Result<RunOutput, RunnerError> {
        let (args, use_stdin) = self.backend.batch_args(prompt, tier);
        let preview: String = prompt.chars().take(80).collect();
        info!(
            command = %self.backend.command,
            model = %self.backend.models.for_tier(tier),
            "Running batch prompt: {}...",
            preview
        );

        let mut cmd = Command::new(&self.backend.command);
        cmd.args(&args)
            .current_dir(cwd)
            .stdin(if use_stdin { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| RunnerError::Spawn {
            command: self.backend.command.clone(),
            reason: e.to_string(),
        })?;

        if use_stdin {
            if let Some(mut stdin) = child.stdin.take() {
                let input = prompt.to_string();
                // Written concurrently with output collection.
                tokio::spawn(async move {
                    if let Err(e) = stdin.write_all(input.as_bytes()).await {
                        debug!(error = %e, "Runner closed stdin early");
                    }
                });
            }
        }

        match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                let exit_code = output.status.code().unwrap_or(-1);
                debug!(exit_code, bytes = text.len(), "Runner finished");
                Ok(RunOutput::new(text, exit_code))
            }
            Ok(Err(e)) => Err(RunnerError::from(e)),
            Err(_) => {
                warn!(timeout_ms = timeout_duration.as_millis() as u64, "Runner timed out");
                Err(RunnerError::Timeout(timeout_duration.as_millis() as u64))
            }
        }
    }

    fn build_interactive_command(
        &self,
        tier: ModelTier,
        system_prompt: Option<&Path>,
    ) -> Result<Vec<String>, RunnerError> {
        let mut argv = vec![
            self.backend.command.clone(),
            "--model".to_string(),
            self.backend.models.for_tier(tier).to_string(),
        ];

        if let Some(path) = system_prompt {
            if !path.exists() {
                return Err(RunnerError::SystemPromptNotFound(path.to_path_buf()));
            }
            argv.push("--system".to_string());
            argv.push(path.display().to_string());
        }

        info!(command = %self.backend.command, tier = %tier, "Built interactive command");
        Ok(argv)
    }
}
