// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario 2 (spec §8): re-adding the same command/workdir dedupes onto
//! the same job and starts a new run instead of creating a second job.

use std::time::Duration;

use crate::support::TestEnv;

#[test]
fn deduplication_advances_run_sequence() {
    let env = TestEnv::new();

    let first = env.oj_json(&["add", "--", "true"]);
    assert_eq!(first["action"], "created");
    let job_id = first["job"]["id"].as_str().unwrap().to_string();
    env.run_ok(&["await", &job_id], &[]);

    let second = env.oj_json(&["add", "--", "true"]);
    assert_eq!(second["action"], "started");
    assert_eq!(second["job"]["id"], job_id, "dedupes onto the same job id");
    env.run_ok(&["await", &job_id], &[]);

    env.wait_for_stats(&job_id, Duration::from_secs(5), |s| s["run_count"] == 2);

    let runs = env.oj_json(&["runs", &job_id]);
    let runs = runs.as_array().expect("runs is a json array");
    assert_eq!(runs.len(), 2);
    // Newest-first.
    let started_at = |v: &serde_json::Value| v["started_at"].as_str().unwrap().to_string();
    assert!(started_at(&runs[0]) >= started_at(&runs[1]));
}
