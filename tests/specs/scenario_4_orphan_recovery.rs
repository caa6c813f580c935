// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario 4 (spec §8): SIGKILL the daemon mid-run, restart it, and expect
//! bootstrap reconciliation to mark the orphaned run stopped with no
//! surviving process and no success/failure credit.

use std::time::Duration;

use crate::support::TestEnv;

#[test]
fn orphan_recovery_after_daemon_crash() {
    let env = TestEnv::new();

    let added = env.oj_json(&["add", "--", "sleep", "60"]);
    let job_id = added["job"]["id"].as_str().unwrap().to_string();

    env.wait_for_stats(&job_id, Duration::from_secs(5), |_| true);
    let pid = env.oj_json(&["runs", &job_id]).as_array().unwrap()[0]["pid"].as_u64().unwrap();

    env.kill_daemon();

    // Restarting the daemon (any command auto-starts it) should run
    // bootstrap reconciliation and mark the orphaned run stopped.
    let stats = env.wait_for_stats(&job_id, Duration::from_secs(10), |s| !s["current_run_id"].is_string());
    assert_eq!(stats["run_count"], 1);
    assert_eq!(stats["success_count"], 0);
    assert_eq!(stats["failure_count"], 0);

    // The orphaned child should not have survived the crash+reconcile cycle.
    let alive = std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    assert!(!alive, "orphaned run's process should not survive reconciliation");
}
