// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! XDG-conventioned path resolution (spec §6): the runtime directory holds
//! the socket and pid file, the state directory holds the database, daemon
//! log, and per-run log files. Both are created with user-only (0700)
//! permissions.

use std::path::{Path, PathBuf};

use crate::lifecycle::LifecycleError;

const APP: &str = "oj";

/// `$OJ_RUNTIME_DIR` > `$XDG_RUNTIME_DIR/oj` > `$TMPDIR/oj-<uid>` (tests
/// pin `OJ_RUNTIME_DIR`, since `XDG_RUNTIME_DIR` is not guaranteed present
/// outside a logind session).
pub fn runtime_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("OJ_RUNTIME_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_RUNTIME_DIR") {
        return Ok(PathBuf::from(xdg).join(APP));
    }
    let tmp = std::env::var("TMPDIR").unwrap_or_else(|_| "/tmp".to_string());
    // SAFETY-free: geteuid is a plain libc-free syscall wrapper via nix, used
    // only to namespace the fallback directory per user.
    let uid = nix::unistd::getuid();
    Ok(PathBuf::from(tmp).join(format!("{APP}-{uid}")))
}

/// `$OJ_STATE_DIR` > `$XDG_STATE_HOME/oj` > `~/.local/state/oj`.
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("OJ_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join(APP));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoHome)?;
    Ok(PathBuf::from(home).join(".local/state").join(APP))
}

pub fn socket_path() -> Result<PathBuf, LifecycleError> {
    Ok(runtime_dir()?.join("daemon.sock"))
}

pub fn pid_path() -> Result<PathBuf, LifecycleError> {
    Ok(runtime_dir()?.join("daemon.pid"))
}

pub fn db_path() -> Result<PathBuf, LifecycleError> {
    Ok(state_dir()?.join("state.db"))
}

pub fn daemon_log_path() -> Result<PathBuf, LifecycleError> {
    Ok(state_dir()?.join("daemon.log"))
}

pub fn logs_dir() -> Result<PathBuf, LifecycleError> {
    Ok(state_dir()?.join("logs"))
}

pub fn stdout_log_path(logs_dir: &Path, run_id: &str) -> PathBuf {
    logs_dir.join(format!("{run_id}.stdout.log"))
}

pub fn stderr_log_path(logs_dir: &Path, run_id: &str) -> PathBuf {
    logs_dir.join(format!("{run_id}.stderr.log"))
}

/// Create `dir` (and parents) with mode 0700 if it does not already exist.
pub fn ensure_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::create_dir_all(dir)?;
    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
