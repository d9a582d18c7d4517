// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for the yadon agents.
//!
//! Library code returns these typed errors; the binary wraps them in
//! `anyhow` at the top level. Transport errors live next to the IPC code
//! in [`crate::orchestrate::ipc::IpcError`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while invoking an external AI tool.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn {command}: {reason}")]
    Spawn { command: String, reason: String },

    #[error("Runner timed out after {0}ms")]
    Timeout(u64),

    #[error("IO error talking to runner: {0}")]
    Io(String),

    #[error("System prompt not found: {}", .0.display())]
    SystemPromptNotFound(PathBuf),
}

impl RunnerError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<std::io::Error> for RunnerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error reading config: {0}")]
    IoError(String),

    #[error("YAML parsing error: {0}")]
    YamlError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::YamlError(err.to_string())
    }
}

/// The decomposition output held no parseable JSON document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No JSON document found in output: {reason}")]
pub struct ExtractError {
    pub reason: String,
}
