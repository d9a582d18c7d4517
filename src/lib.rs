// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Yadon - hierarchical multi-agent task orchestration over local IPC.
//!
//! A manager endpoint decomposes a task into phases and fans the subtasks
//! out to a fixed pool of worker endpoints. Every endpoint speaks the same
//! one-request-per-connection JSON protocol over a Unix domain socket, and
//! the actual work is delegated to an external coding-assistant CLI.
//!
//! # Architecture
//!
//! - [`config`] - Configuration loading and environment overrides
//! - [`error`] - Error types for the runner, config and decomposition layers
//! - [`orchestrate`] - Endpoint loop, IPC protocol, manager and worker roles
//! - [`runner`] - Task runner port and the subprocess adapter
//! - [`telemetry`] - Tracing subscriber setup
//! - [`template`] - Prompt and notification templating
//!
//! # Example
//!
//! ```rust,ignore
//! use yadon::orchestrate::{IpcClient, TaskMessage, generate_task_id};
//!
//! let client = IpcClient::new("/tmp/yadon-agent-yadoran.sock", "cli");
//! let task = TaskMessage::new(generate_task_id(), "cli", "add a README", "/work");
//! let result = client.send_task(task, std::time::Duration::from_secs(300)).await?;
//! println!("{}", result.summary());
//! ```

pub mod config;
pub mod error;
pub mod orchestrate;
pub mod runner;
pub mod telemetry;
pub mod template;

pub use config::{load_config, AgentsConfig};
pub use error::{ConfigError, ExtractError, RunnerError};
pub use orchestrate::{AgentServer, Manager, Worker};
pub use runner::{ModelTier, SubprocessRunner, TaskRunner};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
