// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Generic agent endpoint.
//!
//! The server owns one listening socket. It accepts a connection, reads a
//! single request, dispatches it to the injected [`AgentHandler`], writes a
//! single response and closes the connection before accepting the next
//! one. At most one request is in progress per endpoint.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UnixStream;
use tracing::{debug, error, info, warn, Instrument};

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::orchestrate::agent::AgentHandler;

use super::error::{IpcError, IpcResult};
use super::protocol::{decode, encode, ErrorResponse, Message};
use super::transport::{self, IpcListener};

const DEFAULT_ACCEPT_POLL: Duration = Duration::from_secs(1);
const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(600);

/// Cloneable handle that asks a running server to stop.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    /// Idempotent. The loop notices within one accept poll interval.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// One agent endpoint bound to one socket path.
pub struct AgentServer<H: AgentHandler> {
    handler: Arc<H>,
    socket_path: PathBuf,
    running: Arc<AtomicBool>,
    accept_poll: Duration,
    connection_timeout: Duration,
}

impl<H: AgentHandler> AgentServer<H> {
    pub fn new(handler: Arc<H>, socket_path: impl AsRef<Path>) -> Self {
        Self {
            handler,
            socket_path: socket_path.as_ref().to_path_buf(),
            running: Arc::new(AtomicBool::new(false)),
            accept_poll: DEFAULT_ACCEPT_POLL,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }

    /// Override the accept poll interval and the per-connection read deadline.
    pub fn with_timeouts(mut self, accept_poll: Duration, connection_timeout: Duration) -> Self {
        self.accept_poll = accept_poll;
        self.connection_timeout = connection_timeout;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Ask the loop to exit. Safe to call repeatedly or before [`serve`](Self::serve).
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Bind and serve until stopped.
    ///
    /// Only a bind failure is returned as an error; everything that goes
    /// wrong on an individual connection is answered and logged.
    pub async fn serve(&self) -> IpcResult<()> {
        let listener = transport::bind(&self.socket_path)
            .await
            .map_err(|e| IpcError::BindFailed {
                path: self.socket_path.display().to_string(),
                reason: e.to_string(),
            })?;

        self.running.store(true, Ordering::SeqCst);
        let span = tracing::info_span!("agent", agent = %self.handler.name());
        info!(parent: &span, socket = %self.socket_path.display(), "Agent listening");

        self.accept_loop(&listener).instrument(span.clone()).await;

        if let Err(e) = transport::cleanup(&self.socket_path) {
            warn!(parent: &span, error = %e, "Failed to remove socket file");
        }
        info!(parent: &span, "Agent stopped");
        Ok(())
    }

    async fn accept_loop(&self, listener: &IpcListener) {
        while self.is_running() {
            let stream = match tokio::time::timeout(self.accept_poll, listener.accept()).await {
                Err(_) => continue,
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => {
                    if self.is_running() {
                        error!(error = %e, "Accept failed, shutting down");
                    }
                    break;
                }
            };

            self.handle_connection(stream).await;
        }
    }

    #[cfg_attr(feature = "telemetry", instrument(skip_all))]
    async fn handle_connection(&self, mut stream: UnixStream) {
        let response = match self.read_request(&mut stream).await {
            Ok(request) => self.dispatch(request).await,
            Err(e) => {
                warn!(error = %e, "Rejecting request");
                Message::Error(ErrorResponse::new(self.handler.name(), error_text(&e)))
            }
        };

        if let Err(e) = self.write_response(&mut stream, &response).await {
            debug!(error = %e, "Could not deliver response");
        }
    }

    async fn read_request(&self, stream: &mut UnixStream) -> IpcResult<Message> {
        let bytes = tokio::time::timeout(self.connection_timeout, transport::read_message(stream))
            .await
            .map_err(|_| IpcError::Timeout(self.connection_timeout.as_millis() as u64))?
            .map_err(|e| IpcError::ReadFailed(e.to_string()))?;
        decode(&bytes)
    }

    async fn dispatch(&self, request: Message) -> Message {
        let name = self.handler.name().to_string();
        let kind = request.kind();
        let handler = Arc::clone(&self.handler);

        // The handler runs on its own task so a panic becomes an error reply.
        let outcome = match request {
            Message::Task(task) => {
                info!(task_id = %task.id, from = %task.from_agent, "Task received");
                tokio::spawn(async move { Message::Result(handler.handle_task(task).await) }.in_current_span())
                    .await
            }
            Message::Status(query) => {
                debug!(from = %query.from_agent, "Status query");
                tokio::spawn(
                    async move { Message::StatusResponse(handler.handle_status(query).await) }.in_current_span(),
                )
                .await
            }
            _ => {
                return Message::Error(ErrorResponse::new(
                    name,
                    error_text(&IpcError::UnknownType(kind.to_string())),
                ))
            }
        };

        outcome.unwrap_or_else(|e| {
            error!(error = %e, request = kind, "Handler failed");
            Message::Error(ErrorResponse::new(name, format!("connection handling error: {}", e)))
        })
    }

    async fn write_response(&self, stream: &mut UnixStream, response: &Message) -> IpcResult<()> {
        let bytes = encode(response)?;
        tokio::time::timeout(self.connection_timeout, transport::write_message(stream, &bytes))
            .await
            .map_err(|_| IpcError::Timeout(self.connection_timeout.as_millis() as u64))?
            .map_err(|e| IpcError::WriteFailed(e.to_string()))
    }
}

/// Text of the `error` reply for a request that could not be served.
fn error_text(err: &IpcError) -> String {
    match err {
        IpcError::Malformed(detail) => format!("JSON parse error: {}", detail),
        IpcError::UnknownType(kind) => format!("unknown message type: {}", kind),
        other => format!("connection handling error: {}", other),
    }
}
