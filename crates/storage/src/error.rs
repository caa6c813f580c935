// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("malformed command_json for job {job_id}: {source}")]
    MalformedCommand { job_id: String, source: serde_json::Error },

    #[error("malformed ports_json for run {run_id}: {source}")]
    MalformedPorts { run_id: String, source: serde_json::Error },
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for oj_core::CoreError {
    fn from(err: StorageError) -> Self {
        oj_core::CoreError::DatabaseFailure(err.to_string())
    }
}
