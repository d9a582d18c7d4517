// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Built-in AI tool backends.

use super::ModelTier;

/// Backend used when none is configured or the configured one is unknown.
pub const DEFAULT_BACKEND: &str = "claude";

const BACKEND_NAMES: &[&str] = &["claude", "gemini", "copilot", "opencode", "claude-opus"];

/// How a batch prompt reaches the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// `-p` flag, prompt on stdin.
    Stdin,
    /// `--prompt <text>` argument.
    Arg,
    /// Batch sub-command, prompt on stdin.
    SubcommandStdin,
}

/// Model name per tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierModels {
    pub coordinator: String,
    pub manager: String,
    pub worker: String,
}

impl TierModels {
    fn new(coordinator: &str, manager: &str, worker: &str) -> Self {
        Self {
            coordinator: coordinator.to_string(),
            manager: manager.to_string(),
            worker: worker.to_string(),
        }
    }

    pub fn for_tier(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Coordinator => &self.coordinator,
            ModelTier::Manager => &self.manager,
            ModelTier::Worker => &self.worker,
        }
    }
}

/// Command line shape of one AI tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub name: String,
    pub command: String,
    pub models: TierModels,
    /// Arguments placed right after the command in batch mode.
    pub batch_subcommand: Vec<String>,
    pub prompt_style: PromptStyle,
}

impl BackendConfig {
    /// Look up a built-in backend by name.
    pub fn builtin(name: &str) -> Option<Self> {
        let (command, models, subcommand, style) = match name {
            "claude" => ("claude", TierModels::new("opus", "sonnet", "haiku"), "", PromptStyle::Stdin),
            "gemini" => (
                "gemini",
                TierModels::new("gemini-3.0-pro", "gemini-3.0-flash", "gemini-3.0-flash"),
                "",
                PromptStyle::Arg,
            ),
            "copilot" => (
                "copilot",
                TierModels::new("gpt-5.2", "gpt-5.2-mini", "gpt-5.2-mini"),
                "",
                PromptStyle::Stdin,
            ),
            "opencode" => (
                "opencode",
                TierModels::new("kimi/kimi-k2.5", "kimi/kimi-k2.5", "kimi/kimi-k2.5"),
                "run -q",
                PromptStyle::SubcommandStdin,
            ),
            "claude-opus" => ("claude", TierModels::new("opus", "opus", "opus"), "", PromptStyle::Stdin),
            _ => return None,
        };

        Some(Self {
            name: name.to_string(),
            command: command.to_string(),
            models,
            batch_subcommand: subcommand.split_whitespace().map(String::from).collect(),
            prompt_style: style,
        })
    }

    /// Batch-mode argv (without the command) and whether the prompt goes to stdin.
    pub fn batch_args(&self, prompt: &str, tier: ModelTier) -> (Vec<String>, bool) {
        let mut args = self.batch_subcommand.clone();
        let use_stdin = match self.prompt_style {
            PromptStyle::Stdin => {
                args.push("-p".to_string());
                true
            }
            PromptStyle::Arg => {
                args.push("--prompt".to_string());
                args.push(prompt.to_string());
                false
            }
            PromptStyle::SubcommandStdin => true,
        };

        args.push("--model".to_string());
        args.push(self.models.for_tier(tier).to_string());

        match self.command.as_str() {
            "claude" => args.push("--dangerously-skip-permissions".to_string()),
            "gemini" => args.push("--yolo".to_string()),
            _ => {}
        }

        (args, use_stdin)
    }
}

pub fn is_known_backend(name: &str) -> bool {
    BACKEND_NAMES.contains(&name)
}

/// Resolve a backend by name, falling back to [`DEFAULT_BACKEND`].
pub fn backend_config(name: &str) -> BackendConfig {
    BackendConfig::builtin(&name.to_lowercase())
        .or_else(|| BackendConfig::builtin(DEFAULT_BACKEND))
        .unwrap_or_else(|| BackendConfig {
            name: DEFAULT_BACKEND.to_string(),
            command: DEFAULT_BACKEND.to_string(),
            models: TierModels::new("opus", "sonnet", "haiku"),
            batch_subcommand: Vec::new(),
            prompt_style: PromptStyle::Stdin,
        })
}
