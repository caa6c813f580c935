// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands (spec §4.6, §4.8).

use std::path::PathBuf;
use std::time::Duration;

use oj_daemon::env;
use oj_wire::{read_frame, write_frame, Request, Response};
use thiserror::Error;
use tokio::io::BufReader;
use tokio::net::UnixStream;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// Timeout for a single request/response round trip.
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("OJ_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(10))
}

/// Total time to wait for a freshly spawned daemon to start accepting
/// connections (spec §4.8: "retries the socket for up to ~2 s").
pub fn timeout_connect() -> Duration {
    parse_duration_ms("OJ_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(2))
}

/// Polling interval while waiting for the daemon socket to appear.
pub fn poll_interval() -> Duration {
    parse_duration_ms("OJ_CONNECT_POLL_MS").unwrap_or(Duration::from_millis(50))
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running")]
    DaemonNotRunning,

    #[error("failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("timed out waiting for the daemon to start")]
    DaemonStartTimeout,

    #[error(
        "daemon version {daemon} does not match cli version {client}; run `oj shutdown` then retry"
    )]
    VersionMismatch { daemon: String, client: String },

    #[error("{0}")]
    Rejected(String),

    #[error("unexpected response from daemon")]
    UnexpectedResponse,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wire(#[from] oj_wire::WireError),

    #[error(transparent)]
    Lifecycle(#[from] oj_daemon::lifecycle::LifecycleError),
}

/// A connection to the daemon's socket, good for exactly one request.
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connect to an already-running daemon. No auto-start.
    pub fn connect() -> Result<Self, ClientError> {
        let socket_path = env::socket_path()?;
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self { socket_path })
    }

    /// Connect, auto-starting a detached daemon if one is not reachable
    /// (spec §4.8). Performs the version handshake after connecting; a
    /// mismatch is returned as an error rather than triggering a restart,
    /// to avoid upgrade oscillation.
    pub async fn connect_or_start() -> Result<Self, ClientError> {
        let client = match Self::connect() {
            Ok(client) if probe_socket(&client.socket_path) => client,
            _ => {
                cleanup_stale_socket()?;
                let child = crate::autostart::spawn_daemon()?;
                Self::connect_with_retry(child).await?
            }
        };
        client.check_version().await?;
        Ok(client)
    }

    /// Connect for the `shutdown` command, which bypasses the version
    /// check (spec §4.8).
    pub fn connect_for_shutdown() -> Result<Self, ClientError> {
        Self::connect()
    }

    async fn connect_with_retry(mut child: std::process::Child) -> Result<Self, ClientError> {
        let socket_path = env::socket_path()?;
        let deadline = std::time::Instant::now() + timeout_connect();

        while std::time::Instant::now() < deadline {
            if let Ok(Some(status)) = child.try_wait() {
                return Err(ClientError::DaemonStartFailed(format!("exited with {status}")));
            }
            if probe_socket(&socket_path) {
                return Ok(Self { socket_path });
            }
            tokio::time::sleep(poll_interval()).await;
        }
        Err(ClientError::DaemonStartTimeout)
    }

    async fn check_version(&self) -> Result<(), ClientError> {
        let client_version = env!("CARGO_PKG_VERSION").to_string();
        let response = self.send(&Request::Version).await?;
        let data: oj_wire::VersionData = response.decode().ok_or(ClientError::UnexpectedResponse)?;
        if data.version != client_version {
            return Err(ClientError::VersionMismatch { daemon: data.version, client: client_version });
        }
        Ok(())
    }

    /// Send a request and return the decoded response envelope.
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = tokio::time::timeout(timeout_ipc(), UnixStream::connect(&self.socket_path))
            .await
            .map_err(|_| ClientError::DaemonStartTimeout)??;
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        tokio::time::timeout(timeout_ipc(), write_frame(&mut write_half, request))
            .await
            .map_err(|_| ClientError::DaemonStartTimeout)??;

        let response = tokio::time::timeout(timeout_ipc(), read_frame::<_, Response>(&mut reader))
            .await
            .map_err(|_| ClientError::DaemonStartTimeout)??
            .ok_or(ClientError::UnexpectedResponse)?;
        Ok(response)
    }

    /// Send a request, subscribe-style: returns the reader half positioned
    /// right after the ack frame, so the caller can keep reading event
    /// frames from it.
    pub async fn send_and_keep_open(
        &self,
        request: &Request,
    ) -> Result<(Response, BufReader<tokio::net::unix::OwnedReadHalf>), ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        write_frame(&mut write_half, request).await?;
        let response =
            read_frame::<_, Response>(&mut reader).await?.ok_or(ClientError::UnexpectedResponse)?;
        Ok((response, reader))
    }

    /// Send a request and decode its `data` as `T`, surfacing a daemon-side
    /// rejection as [`ClientError::Rejected`].
    pub async fn send_decode<T: for<'de> serde::Deserialize<'de>>(
        &self,
        request: &Request,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        if !response.success {
            return Err(ClientError::Rejected(response.error.unwrap_or_default()));
        }
        response.decode().ok_or(ClientError::UnexpectedResponse)
    }
}

/// Probe whether a Unix socket is accepting connections.
pub fn probe_socket(socket_path: &std::path::Path) -> bool {
    std::os::unix::net::UnixStream::connect(socket_path).is_ok()
}

/// Remove a stale socket/pid file pair left behind by a crashed daemon.
pub fn cleanup_stale_socket() -> Result<(), ClientError> {
    let socket_path = env::socket_path()?;
    let pid_path = env::pid_path()?;
    if socket_path.exists() && !probe_socket(&socket_path) {
        let _ = std::fs::remove_file(&socket_path);
        let _ = std::fs::remove_file(&pid_path);
    }
    Ok(())
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
