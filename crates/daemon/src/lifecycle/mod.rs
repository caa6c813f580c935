// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-wide bootstrap, reconciliation, and shutdown (spec §4.7).

pub mod reconcile;
pub mod shutdown;
pub mod startup;

use std::path::PathBuf;

use oj_core::CoreError;
use thiserror::Error;

use crate::manager::Manager;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine the home directory (no $HOME)")]
    NoHome,

    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("another daemon is already listening on {0}")]
    AlreadyRunning(PathBuf),

    #[error(transparent)]
    Storage(#[from] oj_storage::StorageError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Everything the daemon binary needs after a successful bootstrap.
pub struct Bootstrap {
    pub manager: Manager,
    pub socket_path: PathBuf,
    pub pid_path: PathBuf,
}

pub use shutdown::shutdown;
pub use startup::bootstrap;
