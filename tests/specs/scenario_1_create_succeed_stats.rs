// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario 1 (spec §8): add a job that exits 0, wait for it, check stats.

use std::time::Duration;

use crate::support::TestEnv;

#[test]
fn create_succeed_stats() {
    let env = TestEnv::new();

    let added = env.oj_json(&["add", "--", "true"]);
    assert_eq!(added["action"], "created");
    let job_id = added["job"]["id"].as_str().unwrap().to_string();

    env.run_ok(&["await", &job_id], &[]);

    let stats = env.wait_for_stats(&job_id, Duration::from_secs(5), |s| s["run_count"] == 1);
    assert_eq!(stats["run_count"], 1);
    assert_eq!(stats["success_count"], 1);
    assert_eq!(stats["failure_count"], 0);
}
