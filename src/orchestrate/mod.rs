// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Multi-agent orchestration.
//!
//! # Architecture
//!
//! - **Manager**: receives a task, asks the task runner to decompose it into
//!   ordered phases, fans each phase out to workers, and aggregates the
//!   results into a single report.
//!
//! - **Worker**: executes one task at a time through the task runner.
//!
//! - **AgentServer**: the generic endpoint loop both roles run behind. One
//!   request per connection, handled serially.
//!
//! ```text
//! task ──► Manager ──decompose──► [implement] ──► [docs] ──► [review] ──► report
//!                                  │  │  │          │           │
//!                                  ▼  ▼  ▼          ▼           ▼
//!                                 yadon-1..N      yadon-1     yadon-1
//! ```
//!
//! Phases run strictly one after another. Subtasks inside a phase run in
//! parallel, at most one per worker.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use yadon::config::AgentsConfig;
//! use yadon::orchestrate::{AgentServer, Manager};
//! use yadon::runner::SubprocessRunner;
//!
//! let config = Arc::new(AgentsConfig::default());
//! let runner = Arc::new(SubprocessRunner::new(&config.backend));
//! let manager = Manager::new(Arc::clone(&config), runner, ".");
//! let path = manager.socket_path().to_path_buf();
//! AgentServer::new(Arc::new(manager), path).serve().await?;
//! ```

mod agent;
mod aggregate;
mod decompose;
pub mod ipc;
mod manager;
mod notify;
mod types;
mod worker;

pub use agent::{resolve_project_dir, AgentHandler, TaskGuard, TaskSlot};
pub use aggregate::{aggregate, Aggregate};
pub use decompose::{
    build_decompose_prompt, extract_json, fallback_phases, parse_decomposition, DEFAULT_PHASE,
};
pub use ipc::{
    agent_socket_path, generate_task_id, subtask_id, AgentServer, AgentState, IpcClient,
    IpcError, IpcResult, Message, ResultMessage, StatusQuery, StatusResponse, StopHandle,
    TaskMessage, TaskStatus,
};
pub use manager::{Manager, WORKER_STOPPED, WORKER_UNREACHABLE};
pub use notify::{
    summarize_for_bubble, truncate_chars, BubbleKind, Notifier, SharedNotifier, TracingNotifier,
    DEFAULT_BUBBLE_DURATION, PHASE_BUBBLE_DURATION,
};
pub use types::{AgentIdentity, Decomposition, Phase, Subtask};
pub use worker::{summarize_output, Worker, EMPTY_OUTPUT_SUMMARY};
