// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The persistence store (spec §4.3): a `sqlx::SqlitePool` against the
//! three-table schema in `migrations/0001_init.sql`, exposing CRUD plus the
//! two specialized queries bootstrap needs (`load_all_*`, `find_orphan_runs`).

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use oj_core::job::{Job, PortInfo, Run, RunStatus};
use oj_core::{JobId, RunId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use crate::error::{StorageError, StorageResult};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Key under which the daemon's randomly generated instance id is stored.
pub const KEY_INSTANCE_ID: &str = "instance_id";
/// Key recording whether the previous shutdown completed cleanly.
pub const KEY_SHUTDOWN_CLEAN: &str = "shutdown_clean";

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if absent) the database at `path`, apply pragmas and
    /// migrations.
    pub async fn open(path: &Path) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        MIGRATOR.run(&pool).await?;
        Ok(Self { pool })
    }

    /// In-memory store, for tests.
    pub async fn open_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;
        MIGRATOR.run(&pool).await?;
        Ok(Self { pool })
    }

    // ── daemon_state ─────────────────────────────────────────────────

    pub async fn get_state(&self, key: &str) -> StorageResult<Option<String>> {
        let row = sqlx::query("SELECT value FROM daemon_state WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    pub async fn set_state(&self, key: &str, value: &str) -> StorageResult<()> {
        sqlx::query(
            "INSERT INTO daemon_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ── jobs ─────────────────────────────────────────────────────────

    pub async fn upsert_job(&self, job: &Job) -> StorageResult<()> {
        let command_json = serde_json::to_string(&job.command)
            .map_err(|source| StorageError::MalformedCommand { job_id: job.id.to_string(), source })?;
        sqlx::query(
            "INSERT INTO jobs (
                id, command_json, command_signature, workdir, description, blocked,
                next_run_seq, created_at, current_run_id, run_count, success_count,
                failure_count, success_total_duration_ms, failure_total_duration_ms,
                min_duration_ms, max_duration_ms
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)
             ON CONFLICT(id) DO UPDATE SET
                command_json = excluded.command_json,
                command_signature = excluded.command_signature,
                workdir = excluded.workdir,
                description = excluded.description,
                blocked = excluded.blocked,
                next_run_seq = excluded.next_run_seq,
                current_run_id = excluded.current_run_id,
                run_count = excluded.run_count,
                success_count = excluded.success_count,
                failure_count = excluded.failure_count,
                success_total_duration_ms = excluded.success_total_duration_ms,
                failure_total_duration_ms = excluded.failure_total_duration_ms,
                min_duration_ms = excluded.min_duration_ms,
                max_duration_ms = excluded.max_duration_ms",
        )
        .bind(job.id.as_str())
        .bind(command_json)
        .bind(&job.command_signature)
        .bind(&job.workdir)
        .bind(&job.description)
        .bind(job.blocked)
        .bind(job.next_run_seq as i64)
        .bind(job.created_at.to_rfc3339())
        .bind(job.current_run_id.as_ref().map(|id| id.to_string()))
        .bind(job.run_count as i64)
        .bind(job.success_count as i64)
        .bind(job.failure_count as i64)
        .bind(job.success_total_duration_ms)
        .bind(job.failure_total_duration_ms)
        .bind(job.min_duration_ms)
        .bind(job.max_duration_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deletes the job row; `runs` cascade via the foreign key.
    pub async fn delete_job(&self, id: &JobId) -> StorageResult<()> {
        sqlx::query("DELETE FROM jobs WHERE id = ?1").bind(id.as_str()).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn load_all_jobs(&self) -> StorageResult<Vec<Job>> {
        let rows = sqlx::query("SELECT * FROM jobs").fetch_all(&self.pool).await?;
        rows.iter().map(job_from_row).collect()
    }

    // ── runs ─────────────────────────────────────────────────────────

    pub async fn upsert_run(&self, run: &Run) -> StorageResult<()> {
        let ports_json = serde_json::to_string(&run.ports)
            .map_err(|source| StorageError::MalformedPorts { run_id: run.id.to_string(), source })?;
        sqlx::query(
            "INSERT INTO runs (
                id, job_id, pid, status, exit_code, stdout_path, stderr_path,
                started_at, stopped_at, daemon_instance_id, ports_json
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)
             ON CONFLICT(id) DO UPDATE SET
                pid = excluded.pid,
                status = excluded.status,
                exit_code = excluded.exit_code,
                stopped_at = excluded.stopped_at,
                ports_json = excluded.ports_json",
        )
        .bind(run.id.as_str())
        .bind(run.job_id.as_str())
        .bind(run.pid as i64)
        .bind(run.status.to_string())
        .bind(run.exit_code)
        .bind(&run.stdout_path)
        .bind(&run.stderr_path)
        .bind(run.started_at.to_rfc3339())
        .bind(run.stopped_at.map(|t| t.to_rfc3339()))
        .bind(&run.daemon_instance_id)
        .bind(ports_json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_run(&self, id: &RunId) -> StorageResult<()> {
        sqlx::query("DELETE FROM runs WHERE id = ?1").bind(id.as_str()).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn load_all_runs(&self) -> StorageResult<Vec<Run>> {
        let rows = sqlx::query("SELECT * FROM runs").fetch_all(&self.pool).await?;
        rows.iter().map(run_from_row).collect()
    }

    pub async fn runs_for_job(&self, job_id: &JobId) -> StorageResult<Vec<Run>> {
        let rows = sqlx::query("SELECT * FROM runs WHERE job_id = ?1")
            .bind(job_id.as_str())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(run_from_row).collect()
    }

    /// Runs marked `running` in persistence, joined with their job's
    /// command, for bootstrap reconciliation (spec §4.7 step 5).
    pub async fn find_orphan_runs(&self) -> StorageResult<Vec<(Run, Vec<String>)>> {
        let rows = sqlx::query(
            "SELECT runs.*, jobs.command_json AS job_command_json
             FROM runs JOIN jobs ON runs.job_id = jobs.id
             WHERE runs.status = 'running'",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| {
                let run = run_from_row(row)?;
                let command_json: String = row.try_get("job_command_json")?;
                let command: Vec<String> = serde_json::from_str(&command_json)
                    .map_err(|source| StorageError::MalformedCommand {
                        job_id: run.job_id.to_string(),
                        source,
                    })?;
                Ok((run, command))
            })
            .collect()
    }

    /// Marks a run stopped with no exit code (orphan / killed-by-daemon
    /// path) and decrements the owning job's `current_run_id` if it still
    /// points at this run.
    pub async fn mark_run_stopped(&self, run_id: &RunId, now: DateTime<Utc>) -> StorageResult<()> {
        sqlx::query(
            "UPDATE runs SET status = 'stopped', stopped_at = ?2 WHERE id = ?1 AND status = 'running'",
        )
        .bind(run_id.as_str())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "UPDATE jobs SET current_run_id = NULL WHERE current_run_id = ?1",
        )
        .bind(run_id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn job_from_row(row: &sqlx::sqlite::SqliteRow) -> StorageResult<Job> {
    let id: String = row.try_get("id")?;
    let command_json: String = row.try_get("command_json")?;
    let command: Vec<String> = serde_json::from_str(&command_json)
        .map_err(|source| StorageError::MalformedCommand { job_id: id.clone(), source })?;
    let current_run_id: Option<String> = row.try_get("current_run_id")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Job {
        id: JobId::from(id),
        command,
        command_signature: row.try_get("command_signature")?,
        workdir: row.try_get("workdir")?,
        description: row.try_get("description")?,
        blocked: row.try_get("blocked")?,
        next_run_seq: row.try_get::<i64, _>("next_run_seq")? as u64,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        current_run_id: current_run_id.map(RunId::from),
        run_count: row.try_get::<i64, _>("run_count")? as u64,
        success_count: row.try_get::<i64, _>("success_count")? as u64,
        failure_count: row.try_get::<i64, _>("failure_count")? as u64,
        success_total_duration_ms: row.try_get("success_total_duration_ms")?,
        failure_total_duration_ms: row.try_get("failure_total_duration_ms")?,
        min_duration_ms: row.try_get("min_duration_ms")?,
        max_duration_ms: row.try_get("max_duration_ms")?,
    })
}

fn run_from_row(row: &sqlx::sqlite::SqliteRow) -> StorageResult<Run> {
    let id: String = row.try_get("id")?;
    let job_id: String = row.try_get("job_id")?;
    let status: String = row.try_get("status")?;
    let started_at: String = row.try_get("started_at")?;
    let stopped_at: Option<String> = row.try_get("stopped_at")?;
    let ports_json: String = row.try_get("ports_json")?;
    let ports: Vec<PortInfo> = serde_json::from_str(&ports_json)
        .map_err(|source| StorageError::MalformedPorts { run_id: id.clone(), source })?;

    Ok(Run {
        id: RunId::from(id),
        job_id: JobId::from(job_id),
        pid: row.try_get::<i64, _>("pid")? as u32,
        status: if status == "running" { RunStatus::Running } else { RunStatus::Stopped },
        exit_code: row.try_get("exit_code")?,
        stdout_path: row.try_get("stdout_path")?,
        stderr_path: row.try_get("stderr_path")?,
        started_at: DateTime::parse_from_rfc3339(&started_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        stopped_at: stopped_at
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|t| t.with_timezone(&Utc)),
        daemon_instance_id: row.try_get("daemon_instance_id")?,
        ports,
    })
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
