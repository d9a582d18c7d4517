// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! IPC between agent endpoints.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   task    ┌─────────────────┐   task    ┌──────────────┐
//! │    caller    │──────────►│  manager server │──────────►│ worker server│ ×N
//! │ (CLI/client) │◄──────────│  (AgentServer)  │◄──────────│ (AgentServer)│
//! └──────────────┘  result   └─────────────────┘  result   └──────────────┘
//! ```
//!
//! # Protocol
//!
//! Each connection carries exactly one request and one response, both a
//! single JSON object with a `type` discriminator. There is no framing: the
//! requester half-closes its write side after the request, the responder
//! reads to EOF, answers, and closes.
//!
//! Requests:
//! - `task` - execute an instruction
//! - `status` - report idle/busy
//!
//! Responses:
//! - `result` - outcome of a task
//! - `status_response` - load state (plus worker states on the manager)
//! - `error` - the request could not be served
//!
//! Transport is Unix domain sockets at `<dir>/<prefix>-agent-<name>.sock`.

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;
pub mod transport;

pub use error::{IpcError, IpcResult};

pub use client::{send_message, IpcClient};
pub use protocol::{
    decode, encode, generate_task_id, subtask_id, AgentState, ErrorResponse, Message,
    ResultMessage, StatusQuery, StatusResponse, TaskMessage, TaskStatus,
};
pub use server::{AgentServer, StopHandle};
pub use transport::agent_socket_path;
