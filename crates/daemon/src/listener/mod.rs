// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The socket listener (spec §4.7 step 9): one accept loop, one task per
//! connection. A connection handles exactly one request and closes, except
//! `subscribe`, which parks it in the event bus until the peer disconnects,
//! and `shutdown`, which triggers the daemon-wide shutdown sequence after
//! its ack is written.
//!
//! No read timeout is applied to a subscriber connection: the client sends
//! nothing further after subscribing, and applying one would wrongly
//! disconnect an idle subscriber (spec §4.6).

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use oj_wire::{read_frame, write_frame, Request, Response};
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;

use crate::manager::Manager;
use crate::protocol::{self, ConnAction};

/// Bind the socket at `path` with mode 0600 (spec §4.6, §5).
pub fn bind(path: &Path) -> std::io::Result<UnixListener> {
    let listener = UnixListener::bind(path)?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(listener)
}

/// Accept connections until `shutdown` is cancelled. Each connection gets
/// its own task; `shutdown` also fires when a connection's request is
/// `shutdown` (spec §4.6).
pub async fn serve(manager: Manager, listener: UnixListener, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("listener: shutdown requested, no longer accepting connections");
                return;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let manager = manager.clone();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            handle_connection(manager, stream, shutdown).await;
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "listener: accept failed");
                    }
                }
            }
        }
    }
}

async fn handle_connection(manager: Manager, stream: UnixStream, shutdown: CancellationToken) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let request = match read_frame::<_, serde_json::Value>(&mut reader).await {
        Ok(Some(value)) => match serde_json::from_value::<Request>(value.clone()) {
            Ok(request) => request,
            Err(_) => {
                // The exact prefix "unknown request type" is load-bearing:
                // it is how a client distinguishes a daemon that rejects a
                // request it sent from every other failure (spec §4.6, §6).
                let kind = value.get("type").and_then(|v| v.as_str()).unwrap_or("<missing>");
                let response = Response::err(format!("unknown request type: {kind}"));
                let _ = write_frame(&mut write_half, &response).await;
                return;
            }
        },
        Ok(None) => return,
        Err(e) => {
            tracing::debug!(error = %e, "connection: failed to read request frame");
            return;
        }
    };

    let (response, action) = protocol::dispatch(&manager, request).await;
    if write_frame(&mut write_half, &response).await.is_err() {
        return;
    }

    match action {
        ConnAction::None => {}
        ConnAction::Shutdown => {
            tracing::info!("shutdown requested over the socket");
            shutdown.cancel();
        }
        ConnAction::Subscribe { workdir } => {
            pump_events(manager, workdir, write_half).await;
        }
    }
}

async fn pump_events(
    manager: Manager,
    workdir: Option<String>,
    mut write_half: tokio::net::unix::OwnedWriteHalf,
) {
    let (id, mut rx) = manager.bus().subscribe(workdir);
    while let Some(event) = rx.recv().await {
        if write_frame(&mut write_half, &event).await.is_err() {
            break;
        }
    }
    manager.bus().unsubscribe(id);
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
