// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! IPC error types for agent endpoints.

use std::io;
use thiserror::Error;

/// Errors that can occur in the IPC subsystem.
#[derive(Debug, Error)]
pub enum IpcError {
    /// Failed to bind the listening socket.
    #[error("Failed to bind IPC endpoint {path}: {reason}")]
    BindFailed { path: String, reason: String },

    /// Failed to connect to a peer endpoint.
    #[error("Failed to connect to IPC endpoint {path}: {reason}")]
    ConnectFailed { path: String, reason: String },

    /// Failed to read from the IPC stream.
    #[error("Failed to read from IPC stream: {0}")]
    ReadFailed(String),

    /// Failed to write to the IPC stream.
    #[error("Failed to write to IPC stream: {0}")]
    WriteFailed(String),

    /// The bytes received were not a valid JSON document.
    #[error("Malformed IPC message: {0}")]
    Malformed(String),

    /// A request carried a `type` this endpoint does not serve.
    #[error("Unknown message type: {0}")]
    UnknownType(String),

    /// The peer answered with a message of the wrong kind.
    #[error("Unexpected response from {from}: expected {expected}, got {actual}")]
    UnexpectedResponse {
        from: String,
        expected: &'static str,
        actual: String,
    },

    /// Deadline expired.
    #[error("IPC operation timed out after {0}ms")]
    Timeout(u64),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// General transport error.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl IpcError {
    /// Create an IPC error from an IO error with context.
    pub fn from_io_error(context: &str, err: io::Error) -> Self {
        IpcError::Transport(format!("{}: {}", context, err))
    }

    /// Whether this error is a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<serde_json::Error> for IpcError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() {
            IpcError::Malformed(err.to_string())
        } else {
            IpcError::Serialization(err.to_string())
        }
    }
}

/// Result type for IPC operations.
pub type IpcResult<T> = Result<T, IpcError>;
