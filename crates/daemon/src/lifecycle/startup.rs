// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bootstrap (spec §4.7): directories, database, reconciliation, and the
//! stale-socket check, in that order. Binding the listener itself and
//! writing the pid file happen in `main`, once the socket path this
//! function returns is known to be safe to claim.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use oj_storage::{Store, KEY_INSTANCE_ID, KEY_SHUTDOWN_CLEAN};

use super::{Bootstrap, LifecycleError};
use crate::executor::Executor;
use crate::manager::Manager;
use crate::process_tree::ProcessTree;
use crate::{env, event_bus::EventBus, lifecycle::reconcile};

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> LifecycleError + '_ {
    move |source| LifecycleError::Io { path: path.to_path_buf(), source }
}

pub async fn bootstrap(
    executor: Arc<dyn Executor>,
    tree: Arc<dyn ProcessTree>,
) -> Result<Bootstrap, LifecycleError> {
    let runtime_dir = env::runtime_dir()?;
    let state_dir = env::state_dir()?;
    let logs_dir = env::logs_dir()?;
    env::ensure_private_dir(&runtime_dir).map_err(io_err(&runtime_dir))?;
    env::ensure_private_dir(&state_dir).map_err(io_err(&state_dir))?;
    env::ensure_private_dir(&logs_dir).map_err(io_err(&logs_dir))?;

    let socket_path = env::socket_path()?;
    let pid_path = env::pid_path()?;
    reject_if_already_running(&socket_path).await?;

    let store = Store::open(&env::db_path()?).await?;
    let prior_shutdown_clean = store.get_state(KEY_SHUTDOWN_CLEAN).await?.as_deref() == Some("true");
    if !prior_shutdown_clean {
        tracing::warn!(
            "previous shutdown was not clean; runs still marked running will be treated as orphans"
        );
    }
    let instance_id = new_instance_id();
    store.set_state(KEY_SHUTDOWN_CLEAN, "false").await?;
    store.set_state(KEY_INSTANCE_ID, &instance_id).await?;

    let bus = Arc::new(EventBus::new());
    let manager = Manager::new(store, executor, Arc::clone(&tree), bus, instance_id, logs_dir);
    manager.load_from_store().await?;
    reconcile::reconcile(&manager, &tree).await?;

    Ok(Bootstrap { manager, socket_path, pid_path })
}

/// If a socket already exists at `path`, determine whether a daemon is
/// actually listening on it (refuse to start) or it is stale (remove it).
async fn reject_if_already_running(path: &Path) -> Result<(), LifecycleError> {
    if !path.exists() {
        return Ok(());
    }
    let probe = tokio::time::timeout(Duration::from_millis(200), tokio::net::UnixStream::connect(path)).await;
    match probe {
        Ok(Ok(_)) => Err(LifecycleError::AlreadyRunning(path.to_path_buf())),
        _ => {
            std::fs::remove_file(path).map_err(io_err(path))?;
            Ok(())
        }
    }
}

fn new_instance_id() -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);
    format!("{}-{:x}", std::process::id(), nanos)
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
