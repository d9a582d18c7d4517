// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! One-shot IPC client.
//!
//! Each call dials the endpoint, writes one request, half-closes, reads the
//! single response and drops the connection. Connect, send and receive share
//! one deadline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use super::error::{IpcError, IpcResult};
use super::protocol::{decode, encode, Message, ResultMessage, StatusQuery, StatusResponse, TaskMessage};
use super::transport;

/// Send one message and wait for exactly one response.
pub async fn send_message(path: &Path, msg: &Message, timeout: Duration) -> IpcResult<Message> {
    let bytes = encode(msg)?;

    let exchange = async {
        let mut stream = transport::connect(path).await.map_err(|e| IpcError::ConnectFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        transport::write_message(&mut stream, &bytes)
            .await
            .map_err(|e| IpcError::WriteFailed(e.to_string()))?;

        let response = transport::read_message(&mut stream)
            .await
            .map_err(|e| IpcError::ReadFailed(e.to_string()))?;

        decode(&response)
    };

    match tokio::time::timeout(timeout, exchange).await {
        Ok(result) => {
            if let Ok(reply) = &result {
                debug!(path = %path.display(), request = msg.kind(), response = reply.kind(), "IPC exchange complete");
            }
            result
        }
        Err(_) => Err(IpcError::Timeout(timeout.as_millis() as u64)),
    }
}

/// Typed client bound to one endpoint address.
#[derive(Debug, Clone)]
pub struct IpcClient {
    /// Path to the peer's socket.
    socket_path: PathBuf,
    /// Identity placed in the `from` field of outgoing queries.
    from_agent: String,
}

impl IpcClient {
    pub fn new(socket_path: impl AsRef<Path>, from_agent: impl Into<String>) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            from_agent: from_agent.into(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Whether the endpoint's address exists on disk.
    pub fn is_present(&self) -> bool {
        self.socket_path.exists()
    }

    /// Send a task and wait for its result.
    ///
    /// Any response other than a `result` document is an error.
    pub async fn send_task(&self, task: TaskMessage, timeout: Duration) -> IpcResult<ResultMessage> {
        let reply = send_message(&self.socket_path, &Message::Task(task), timeout).await?;
        match reply {
            Message::Result(result) => Ok(result),
            other => Err(unexpected(&other, "result")),
        }
    }

    /// Probe the endpoint's load state.
    pub async fn query_status(&self, timeout: Duration) -> IpcResult<StatusResponse> {
        let query = StatusQuery::new(self.from_agent.clone());
        let reply = send_message(&self.socket_path, &Message::Status(query), timeout).await?;
        match reply {
            Message::StatusResponse(status) => Ok(status),
            other => Err(unexpected(&other, "status_response")),
        }
    }
}

fn unexpected(reply: &Message, expected: &'static str) -> IpcError {
    let actual = match reply {
        Message::Error(err) => format!("error ({})", err.message),
        other => other.kind().to_string(),
    };
    IpcError::UnexpectedResponse {
        from: reply.from_agent().to_string(),
        expected,
        actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrate::ipc::protocol::{ErrorResponse, TaskStatus};

    async fn serve_once(path: PathBuf, reply: Vec<u8>) -> tokio::task::JoinHandle<Vec<u8>> {
        let listener = transport::bind(&path).await.expect("bind failed");
        tokio::spawn(async move {
            let mut stream = listener.accept().await.expect("accept failed");
            let request = transport::read_message(&mut stream).await.expect("read failed");
            transport::write_message(&mut stream, &reply).await.expect("write failed");
            request
        })
    }

    #[tokio::test]
    async fn test_send_task_receives_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worker.sock");
        let reply = encode(&Message::Result(ResultMessage::new(
            "t-1",
            "yadon-1",
            TaskStatus::Success,
            "done",
            "done",
        )))
        .unwrap();
        let server = serve_once(path.clone(), reply).await;

        let client = IpcClient::new(&path, "yadoran");
        let result = client
            .send_task(TaskMessage::new("t-1", "yadoran", "do it", "/p"), Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(result.status, TaskStatus::Success);
        assert_eq!(result.from_agent, "yadon-1");

        let request = decode(&server.await.unwrap()).unwrap();
        assert_eq!(request.kind(), "task");
    }

    #[tokio::test]
    async fn test_error_reply_is_unexpected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worker.sock");
        let reply = encode(&Message::Error(ErrorResponse::new("yadon-1", "boom"))).unwrap();
        let _server = serve_once(path.clone(), reply).await;

        let client = IpcClient::new(&path, "yadoran");
        let err = client
            .send_task(TaskMessage::new("t", "yadoran", "x", ""), Duration::from_secs(2))
            .await
            .unwrap_err();
        match err {
            IpcError::UnexpectedResponse { expected, actual, .. } => {
                assert_eq!(expected, "result");
                assert!(actual.contains("boom"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connect_refused_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let client = IpcClient::new(dir.path().join("nobody.sock"), "cli");
        assert!(!client.is_present());
        let err = client.query_status(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, IpcError::ConnectFailed { .. }));
    }

    #[tokio::test]
    async fn test_silent_peer_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silent.sock");
        let listener = transport::bind(&path).await.unwrap();
        let _hold = tokio::spawn(async move {
            let _stream = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = IpcClient::new(&path, "cli");
        let err = client.query_status(Duration::from_millis(100)).await.unwrap_err();
        assert!(err.is_timeout());
    }
}
