// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario 3 (spec §8): a SIGTERM-ignoring job escalates to SIGKILL after
//! the graceful timeout; the run ends with no exit code and is counted in
//! `run_count` but neither `success_count` nor `failure_count`.

use std::time::Duration;

use crate::support::TestEnv;

#[test]
fn stop_escalates_to_sigkill() {
    let env = TestEnv::new();

    let added = env.oj_json(&["add", "--", "sh", "-c", "trap '' TERM; sleep 60"]);
    let job_id = added["job"]["id"].as_str().unwrap().to_string();

    env.run_ok(&["stop", &job_id], &[]);

    // Graceful timeout is 10s (manager::GRACEFUL_TIMEOUT); give generous
    // headroom for the escalation and process teardown.
    env.wait_for_stats(&job_id, Duration::from_secs(20), |s| s["run_count"] == 1);

    let stats = env.oj_json(&["stats", &job_id]);
    assert_eq!(stats["run_count"], 1);
    assert_eq!(stats["success_count"], 0);
    assert_eq!(stats["failure_count"], 0);

    let runs = env.oj_json(&["runs", &job_id]);
    let runs = runs.as_array().unwrap();
    assert_eq!(runs[0]["exit_code"], serde_json::Value::Null);
}
