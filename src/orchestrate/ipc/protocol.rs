// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Wire protocol for agent endpoints.
//!
//! Every exchange is exactly one JSON document each way. The requester
//! writes its document and half-closes; the responder reads to EOF, writes
//! a single response document, and closes.

use std::collections::BTreeMap;

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{IpcError, IpcResult};

// ============================================================================
// Identifiers
// ============================================================================

/// Generate a task ID of the form `task-<YYYYmmdd-HHMMSS>-<4 hex>`.
pub fn generate_task_id() -> String {
    let ts = Local::now().format("%Y%m%d-%H%M%S");
    let short = Uuid::new_v4().simple().to_string();
    format!("task-{}-{}", ts, &short[..4])
}

/// Derive the ID of one dispatched subtask from its parent task.
pub fn subtask_id(parent_id: &str, phase_name: &str, index: usize) -> String {
    format!("{}-{}-sub{}", parent_id, phase_name, index)
}

// ============================================================================
// Enumerations
// ============================================================================

/// Outcome of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Success,
    Error,
    PartialError,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::PartialError => "partial_error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load state reported by a status probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Idle,
    Busy,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Busy => "busy",
        }
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Body of a task request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    /// What to do.
    pub instruction: String,
    /// Directory to work in. Empty means "the endpoint's own project dir".
    #[serde(default)]
    pub project_dir: String,
}

/// A unit of work sent to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMessage {
    /// Opaque task ID.
    pub id: String,
    /// Sender identity.
    #[serde(rename = "from")]
    pub from_agent: String,
    pub payload: TaskPayload,
}

impl TaskMessage {
    pub fn new(
        id: impl Into<String>,
        from_agent: impl Into<String>,
        instruction: impl Into<String>,
        project_dir: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            from_agent: from_agent.into(),
            payload: TaskPayload {
                instruction: instruction.into(),
                project_dir: project_dir.into(),
            },
        }
    }
}

/// Body of a task result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPayload {
    /// Full output text.
    pub output: String,
    /// Length-bounded projection of `output`.
    pub summary: String,
}

/// Outcome of executing a [`TaskMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMessage {
    pub id: String,
    /// Responder identity.
    #[serde(rename = "from")]
    pub from_agent: String,
    pub status: TaskStatus,
    pub payload: ResultPayload,
}

impl ResultMessage {
    pub fn new(
        id: impl Into<String>,
        from_agent: impl Into<String>,
        status: TaskStatus,
        output: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            from_agent: from_agent.into(),
            status,
            payload: ResultPayload {
                output: output.into(),
                summary: summary.into(),
            },
        }
    }

    pub fn output(&self) -> &str {
        &self.payload.output
    }

    pub fn summary(&self) -> &str {
        &self.payload.summary
    }
}

/// Liveness/load probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "from")]
    pub from_agent: String,
}

impl StatusQuery {
    pub fn new(from_agent: impl Into<String>) -> Self {
        Self {
            from_agent: from_agent.into(),
        }
    }
}

/// Answer to a [`StatusQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "from")]
    pub from_agent: String,
    pub state: AgentState,
    /// ID of the in-flight task, `null` when idle.
    pub current_task: Option<String>,
    /// Sub-endpoint states, present only on supervising endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<BTreeMap<String, String>>,
}

impl StatusResponse {
    pub fn new(from_agent: impl Into<String>, current_task: Option<String>) -> Self {
        let state = if current_task.is_some() {
            AgentState::Busy
        } else {
            AgentState::Idle
        };
        Self {
            from_agent: from_agent.into(),
            state,
            current_task,
            workers: None,
        }
    }

    pub fn with_workers(mut self, workers: BTreeMap<String, String>) -> Self {
        self.workers = Some(workers);
        self
    }
}

/// Protocol-level failure reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "from")]
    pub from_agent: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(from_agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            from_agent: from_agent.into(),
            message: message.into(),
        }
    }
}

/// Every document that can travel over an agent socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Task(TaskMessage),
    Result(ResultMessage),
    Status(StatusQuery),
    StatusResponse(StatusResponse),
    Error(ErrorResponse),
}

impl Message {
    /// The `type` discriminator of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Task(_) => "task",
            Self::Result(_) => "result",
            Self::Status(_) => "status",
            Self::StatusResponse(_) => "status_response",
            Self::Error(_) => "error",
        }
    }

    /// Identity of whoever produced this message.
    pub fn from_agent(&self) -> &str {
        match self {
            Self::Task(m) => &m.from_agent,
            Self::Result(m) => &m.from_agent,
            Self::Status(m) => &m.from_agent,
            Self::StatusResponse(m) => &m.from_agent,
            Self::Error(m) => &m.from_agent,
        }
    }
}

impl From<TaskMessage> for Message {
    fn from(msg: TaskMessage) -> Self {
        Self::Task(msg)
    }
}

impl From<ResultMessage> for Message {
    fn from(msg: ResultMessage) -> Self {
        Self::Result(msg)
    }
}

impl From<StatusQuery> for Message {
    fn from(msg: StatusQuery) -> Self {
        Self::Status(msg)
    }
}

impl From<StatusResponse> for Message {
    fn from(msg: StatusResponse) -> Self {
        Self::StatusResponse(msg)
    }
}

impl From<ErrorResponse> for Message {
    fn from(msg: ErrorResponse) -> Self {
        Self::Error(msg)
    }
}

// ============================================================================
// Serialization
// ============================================================================

/// Encode a message as UTF-8 JSON bytes (no framing).
pub fn encode(msg: &Message) -> IpcResult<Vec<u8>> {
    serde_json::to_vec(msg).map_err(|e| IpcError::Serialization(e.to_string()))
}

/// Decode one complete message.
///
/// The `type` discriminator is read first; the rest of the document is
/// then decoded into the matching shape. A missing or unrecognised
/// discriminator is reported as [`IpcError::UnknownType`].
pub fn decode(bytes: &[u8]) -> IpcResult<Message> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let kind = value
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or("")
        .to_string();

    let msg = match kind.as_str() {
        "task" => Message::Task(serde_json::from_value(value)?),
        "result" => Message::Result(serde_json::from_value(value)?),
        "status" => Message::Status(serde_json::from_value(value)?),
        "status_response" => Message::StatusResponse(serde_json::from_value(value)?),
        "error" => Message::Error(serde_json::from_value(value)?),
        _ => return Err(IpcError::UnknownType(kind)),
    };
    Ok(msg)
}
