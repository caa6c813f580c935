// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bootstrap reconciliation (spec §3.3 invariant 6, §4.7 step 5): every run
//! loaded from persistence as `running` is checked against the live kernel
//! process table before the daemon starts serving requests.
//!
//! This implementation never reattaches to a surviving child (see
//! DESIGN.md's "reattach vs. kill-on-unclean-restart" decision): a run whose
//! pid still matches the stored command is killed and marked stopped rather
//! than adopted, because cross-restart reattachment cannot recover a real
//! exit code or capture further output into the existing log files anyway.

use std::sync::Arc;

use nix::sys::signal::Signal;
use oj_core::job::Run;
use oj_core::CoreResult;

use crate::manager::Manager;
use crate::process_tree::{ProcessInfo, ProcessTree};

/// Tolerance on process start-time comparison (spec §3.3 invariant 6).
const START_TIME_TOLERANCE_SECS: i64 = 2;

pub async fn reconcile(manager: &Manager, tree: &Arc<dyn ProcessTree>) -> CoreResult<()> {
    for run in manager.running_runs_snapshot() {
        reconcile_one(manager, tree, &run).await?;
    }
    Ok(())
}

async fn reconcile_one(manager: &Manager, tree: &Arc<dyn ProcessTree>, run: &Run) -> CoreResult<()> {
    let job = match manager.get_job(&run.job_id) {
        Ok(job) => job,
        Err(_) => return manager.force_stop_run(&run.id, true).await,
    };

    match tree.process_info(run.pid) {
        None => {
            tracing::info!(run_id = %run.id, pid = run.pid, "orphan run: process no longer exists");
            manager.force_stop_run(&run.id, true).await
        }
        Some(info) if matches_stored_command(&info, run, job.command.first().map(String::as_str)) => {
            tracing::warn!(run_id = %run.id, pid = run.pid, "run survived a restart; killing rather than reattaching");
            tree.kill_group(run.pid, Signal::SIGKILL);
            manager.force_stop_run(&run.id, true).await
        }
        Some(_) => {
            tracing::info!(run_id = %run.id, pid = run.pid, "pid has been reused by an unrelated process; leaving it alone");
            manager.force_stop_run(&run.id, false).await
        }
    }
}

/// `argv0` is compared by suffix rather than exact equality: the kernel may
/// report the resolved executable path (`/bin/sh`) while the stored command
/// names the bare program (`sh`).
fn matches_stored_command(info: &ProcessInfo, run: &Run, argv0: Option<&str>) -> bool {
    let started = run.started_at.timestamp();
    let time_ok = (info.start_time_secs - started).abs() <= START_TIME_TOLERANCE_SECS;
    let argv_ok = argv0.is_none_or(|expected| info.argv0.ends_with(expected));
    time_ok && argv_ok
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
