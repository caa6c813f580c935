// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detached daemon auto-start (spec §4.8): forking a copy of `ojd` and
//! handing the handle back to [`crate::client::DaemonClient`] for the
//! connect-with-retry loop.

use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::client::ClientError;

/// Locate the `ojd` binary: `$OJ_DAEMON_BINARY` override, else a sibling of
/// the running `oj` executable, else rely on `$PATH`.
fn find_ojd_binary() -> PathBuf {
    if let Ok(path) = std::env::var("OJ_DAEMON_BINARY") {
        return PathBuf::from(path);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("ojd");
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from("ojd")
}

/// Spawn `ojd` detached (new process group, no inherited stdio) and return
/// the child handle so the caller can detect an early exit while polling
/// the socket. `process_group(0)` makes the child its own group leader, the
/// safe-Rust equivalent of a `setsid()`-based daemonize, so it survives this
/// process exiting.
pub fn spawn_daemon() -> Result<std::process::Child, ClientError> {
    let ojd_path = find_ojd_binary();
    Command::new(&ojd_path)
        .process_group(0)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(e.to_string()))
}
