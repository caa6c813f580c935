// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Graceful shutdown (spec §4.7): stop every running job, record a clean
//! exit, and remove the files this instance owns. The caller is
//! responsible for having already stopped the accept loop before calling
//! this (step 1 of the sequence), since that is a property of the listener
//! task, not the manager.

use std::path::Path;

use crate::manager::Manager;

use super::LifecycleError;

pub async fn shutdown(manager: &Manager, socket_path: &Path, pid_path: &Path) -> Result<(), LifecycleError> {
    let stopped = manager.stop_all().await;
    tracing::info!(stopped, "stop_all completed during shutdown");

    manager.mark_shutdown_clean().await?;

    for path in [socket_path, pid_path] {
        if let Err(source) = std::fs::remove_file(path) {
            if source.kind() != std::io::ErrorKind::NotFound {
                return Err(LifecycleError::Io { path: path.to_path_buf(), source });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "shutdown_tests.rs"]
mod tests;
