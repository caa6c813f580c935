// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy shared by every request handler (spec §7).
//!
//! Variants here are the ones a client can observe over the wire; crate-
//! local errors (e.g. `oj-storage`'s `sqlx::Error` wrapper) convert into
//! [`CoreError::DatabaseFailure`] / [`CoreError::ExecutorFailure`] at the
//! daemon's adapter boundary via `#[from]`.

use thiserror::Error;

use crate::id::{JobId, RunId};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("job {0} not found")]
    JobNotFound(JobId),

    #[error("run {0} not found")]
    RunNotFound(RunId),

    #[error("job {0} is already running")]
    AlreadyRunning(JobId),

    #[error("job {0} is currently running and cannot be removed")]
    RunningCannotRemove(JobId),

    #[error("run {0} is currently running and cannot be removed")]
    RunningRunCannotRemove(RunId),

    #[error("failed to stop job {job}: pids still alive: {survivors:?}")]
    StopFailed { job: JobId, survivors: Vec<u32> },

    #[error(
        "daemon version {daemon} does not match client version {client}; run `oj shutdown` and retry"
    )]
    VersionMismatch { daemon: String, client: String },

    #[error("database error: {0}")]
    DatabaseFailure(String),

    #[error("failed to start process: {0}")]
    ExecutorFailure(String),

    #[error("{0}")]
    ProtocolError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
