// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `await <job>`, `await-any`, `await-all` (spec §6): block until the
//! target run(s) finish and exit with their exit code, or 124 on timeout.
//!
//! `await-any`/`await-all` have no job arguments in the spec's CLI surface;
//! they operate over every currently-running job, mirroring `stop_all`'s
//! scope.

use std::time::Duration;

use clap::Args;
use oj_wire::{JobData, JobsData, Request};

use crate::client::DaemonClient;
use crate::exit_error::ExitError;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Args, Debug)]
pub struct AwaitArgs {
    pub job_id: String,
}

#[derive(Args, Debug)]
pub struct AwaitManyArgs {
    /// Give up and exit 124 after this many seconds; default waits forever.
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Poll until `job_id` is no longer running, then return its most recent
/// exit code (`None` means killed-by-signal).
async fn wait_for_job(
    client: &DaemonClient,
    job_id: &str,
    deadline: Option<std::time::Instant>,
) -> Result<Option<i32>, ExitError> {
    loop {
        let data: JobData = client
            .send_decode(&Request::GetJob { job_id: job_id.to_string() })
            .await
            .map_err(|e| ExitError::new(1, e.to_string()))?;
        if !data.job.is_running() {
            let runs: oj_wire::RunsData = client
                .send_decode(&Request::Runs { job_id: job_id.to_string() })
                .await
                .map_err(|e| ExitError::new(1, e.to_string()))?;
            return Ok(runs.runs.first().and_then(|r| r.exit_code));
        }
        if let Some(deadline) = deadline {
            if std::time::Instant::now() >= deadline {
                return Err(ExitError::new(124, format!("timed out waiting for job {job_id}")));
            }
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

pub async fn await_job(client: &DaemonClient, args: AwaitArgs) -> Result<(), ExitError> {
    let exit_code = wait_for_job(client, &args.job_id, None).await?;
    exit_with(exit_code)
}

pub async fn await_any(client: &DaemonClient, args: AwaitManyArgs) -> Result<(), ExitError> {
    let deadline = args.timeout.map(|s| std::time::Instant::now() + Duration::from_secs(s));
    let running = running_job_ids(client).await?;
    if running.is_empty() {
        return Ok(());
    }

    loop {
        for job_id in &running {
            let data: JobData = client
                .send_decode(&Request::GetJob { job_id: job_id.clone() })
                .await
                .map_err(|e| ExitError::new(1, e.to_string()))?;
            if !data.job.is_running() {
                let runs: oj_wire::RunsData = client
                    .send_decode(&Request::Runs { job_id: job_id.clone() })
                    .await
                    .map_err(|e| ExitError::new(1, e.to_string()))?;
                return exit_with(runs.runs.first().and_then(|r| r.exit_code));
            }
        }
        if let Some(deadline) = deadline {
            if std::time::Instant::now() >= deadline {
                return Err(ExitError::new(124, "timed out waiting for any job".to_string()));
            }
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

pub async fn await_all(client: &DaemonClient, args: AwaitManyArgs) -> Result<(), ExitError> {
    let deadline = args.timeout.map(|s| std::time::Instant::now() + Duration::from_secs(s));
    let running = running_job_ids(client).await?;

    let mut worst: Option<i32> = Some(0);
    for job_id in running {
        match wait_for_job(client, &job_id, deadline).await? {
            Some(0) => {}
            code => {
                if worst == Some(0) {
                    worst = code;
                }
            }
        }
    }
    exit_with(worst)
}

async fn running_job_ids(client: &DaemonClient) -> Result<Vec<String>, ExitError> {
    let data: JobsData = client
        .send_decode(&Request::List { workdir: None })
        .await
        .map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(data.jobs.into_iter().filter(|j| j.is_running()).map(|j| j.id.to_string()).collect())
}

fn exit_with(exit_code: Option<i32>) -> Result<(), ExitError> {
    match exit_code {
        Some(0) => Ok(()),
        Some(code) => Err(ExitError::new(code, String::new())),
        None => Err(ExitError::new(1, "run was killed (no exit code)".to_string())),
    }
}
