// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Job and Run data model (spec §3.1).

use crate::id::{JobId, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a [`Run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Stopped,
}

crate::simple_display! {
    RunStatus {
        Running => "running",
        Stopped => "stopped",
    }
}

/// A single execution of a [`Job`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub job_id: JobId,
    /// OS process id of the root child; `0` once stopped.
    pub pid: u32,
    pub status: RunStatus,
    /// Present iff `status == Stopped` and the process exited normally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub stdout_path: String,
    pub stderr_path: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<DateTime<Utc>>,
    /// Identity of the daemon that spawned this run; used to detect orphans.
    pub daemon_instance_id: String,
    /// Last observed listening ports for this run's process subtree.
    #[serde(default)]
    pub ports: Vec<PortInfo>,
}

impl Run {
    pub fn is_running(&self) -> bool {
        matches!(self.status, RunStatus::Running)
    }

    /// Duration of the run in milliseconds, if it has a known end time.
    pub fn duration_ms(&self) -> Option<i64> {
        self.stopped_at
            .map(|stopped| (stopped - self.started_at).num_milliseconds())
    }
}

crate::builder! {
    pub struct RunBuilder => Run {
        into {
            stdout_path: String = "/tmp/test.stdout.log",
            stderr_path: String = "/tmp/test.stderr.log",
            daemon_instance_id: String = "test-instance",
        }
        set {
            pid: u32 = 123,
            status: RunStatus = RunStatus::Running,
            exit_code: Option<i32> = None,
            ports: Vec<PortInfo> = Vec::new(),
            job_id: JobId = JobId::from("tes"),
        }
        option {
            stopped_at: DateTime<Utc> = None,
        }
        computed {
            id: RunId = RunId::from("test-1"),
            started_at: DateTime<Utc> = Utc::now(),
        }
    }
}

/// A listening socket discovered under a run's process subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    pub port: u16,
    pub protocol: String,
    pub address: String,
    pub pid: u32,
}

/// A command a user runs repeatedly from a particular working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub command: Vec<String>,
    pub command_signature: String,
    pub workdir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Semantically opaque to the core; round-tripped only (spec §9).
    #[serde(default)]
    pub blocked: bool,
    pub next_run_seq: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_run_id: Option<RunId>,

    pub run_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub success_total_duration_ms: i64,
    pub failure_total_duration_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_duration_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration_ms: Option<i64>,
}

impl Job {
    pub fn is_running(&self) -> bool {
        self.current_run_id.is_some()
    }

    /// Average duration, in milliseconds, across successful runs only.
    pub fn avg_success_duration_ms(&self) -> Option<f64> {
        if self.success_count == 0 {
            None
        } else {
            Some(self.success_total_duration_ms as f64 / self.success_count as f64)
        }
    }

    /// Percentage of completed runs (success+failure, excluding killed) that succeeded.
    pub fn success_rate(&self) -> Option<f64> {
        let completed = self.success_count + self.failure_count;
        if completed == 0 {
            None
        } else {
            Some(self.success_count as f64 / completed as f64 * 100.0)
        }
    }

    /// Apply the outcome of a just-finished run to the cached statistics
    /// (spec §4.4 Wait-for-exit step 5).
    pub fn record_run_outcome(&mut self, exit_code: Option<i32>, duration_ms: i64) {
        self.run_count += 1;
        match exit_code {
            Some(0) => {
                self.success_count += 1;
                self.success_total_duration_ms += duration_ms;
                self.min_duration_ms = Some(match self.min_duration_ms {
                    Some(min) => min.min(duration_ms),
                    None => duration_ms,
                });
                self.max_duration_ms = Some(match self.max_duration_ms {
                    Some(max) => max.max(duration_ms),
                    None => duration_ms,
                });
            }
            Some(_) => {
                self.failure_count += 1;
                self.failure_total_duration_ms += duration_ms;
            }
            None => {
                // Killed by signal: counts toward run_count only.
            }
        }
    }

    /// Undo the contribution of a single run's outcome (used by RemoveRun).
    pub fn remove_run_contribution(&mut self, exit_code: Option<i32>, duration_ms: i64) {
        self.run_count = self.run_count.saturating_sub(1);
        match exit_code {
            Some(0) => {
                self.success_count = self.success_count.saturating_sub(1);
                self.success_total_duration_ms -= duration_ms;
            }
            Some(_) => {
                self.failure_count = self.failure_count.saturating_sub(1);
                self.failure_total_duration_ms -= duration_ms;
            }
            None => {}
        }
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            workdir: String = "/tmp",
        }
        set {
            command: Vec<String> = vec!["true".to_string()],
            command_signature: String = "sig".to_string(),
            blocked: bool = false,
            next_run_seq: u64 = 1,
            run_count: u64 = 0,
            success_count: u64 = 0,
            failure_count: u64 = 0,
            success_total_duration_ms: i64 = 0,
            failure_total_duration_ms: i64 = 0,
        }
        option {
            description: String = None,
            current_run_id: RunId = None,
            min_duration_ms: i64 = None,
            max_duration_ms: i64 = None,
        }
        computed {
            id: JobId = JobId::from("tes"),
            created_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
