// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Unix-socket transport helpers for agent endpoints.
//!
//! One request and one response per connection. The end of a message is
//! signalled by shutting down the write half of the stream.

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixSocket, UnixStream};

use super::error::{IpcError, IpcResult};

/// Pending-connection queue length for agent listeners.
pub const LISTEN_BACKLOG: u32 = 5;

/// Well-known socket address for an agent identity.
pub fn agent_socket_path(dir: &Path, prefix: &str, name: &str) -> PathBuf {
    dir.join(format!("{}-agent-{}.sock", prefix, name))
}

pub struct IpcListener {
    inner: UnixListener,
    path: PathBuf,
}

/// Bind a listener at `path`, replacing any stale file left behind.
pub async fn bind(path: &Path) -> io::Result<IpcListener> {
    if path.exists() {
        let _ = std::fs::remove_file(path);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let socket = UnixSocket::new_stream()?;
    socket.bind(path)?;
    let inner = socket.listen(LISTEN_BACKLOG)?;
    Ok(IpcListener {
        inner,
        path: path.to_path_buf(),
    })
}

pub async fn connect(path: &Path) -> io::Result<UnixStream> {
    UnixStream::connect(path).await
}

impl IpcListener {
    pub async fn accept(&self) -> io::Result<UnixStream> {
        let (stream, _addr) = self.inner.accept().await?;
        Ok(stream)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read everything the peer sends until it half-closes.
pub async fn read_message(stream: &mut UnixStream) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(buf)
}

/// Write one complete message and half-close the write side.
pub async fn write_message(stream: &mut UnixStream, bytes: &[u8]) -> io::Result<()> {
    stream.write_all(bytes).await?;
    stream.flush().await?;
    stream.shutdown().await
}

/// Remove the socket file at `path`. No-op when absent.
pub fn cleanup(path: &Path) -> IpcResult<()> {
    if path.exists() {
        std::fs::remove_file(path).map_err(|e| {
            IpcError::from_io_error(&format!("removing {}", path.display()), e)
        })?;
    }
    Ok(())
}
