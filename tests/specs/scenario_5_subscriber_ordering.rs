// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario 5 (spec §8): a subscriber observes job_added, run_started,
//! run_stopped, job_stopped, in order, all bearing the job id that a second
//! client's add+stop produced.

use std::io::{BufRead, BufReader};
use std::process::Stdio;
use std::time::Duration;

use crate::support::TestEnv;

#[test]
fn subscriber_observes_events_in_order() {
    let env = TestEnv::new();

    // Prime the daemon so the subscriber connects to an already-running
    // instance instead of racing the auto-start spawn.
    env.run_ok(&["ping"], &[]);

    let mut subscriber = env
        .raw_oj_command()
        .args(["events"])
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn oj events");
    let mut lines = BufReader::new(subscriber.stdout.take().unwrap()).lines();

    // Give the subscribe request time to register before the other client
    // acts, or its early events could be missed.
    std::thread::sleep(Duration::from_millis(300));

    let added = env.oj_json(&["add", "--", "sleep", "5"]);
    let job_id = added["job"]["id"].as_str().unwrap().to_string();
    env.run_ok(&["stop", &job_id], &[]);
    env.wait_for_stats(&job_id, Duration::from_secs(15), |s| s["run_count"] == 1);

    let mut observed = Vec::new();
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while observed.len() < 4 && std::time::Instant::now() < deadline {
        if let Some(Ok(line)) = lines.next() {
            observed.push(line);
        }
    }
    let _ = subscriber.kill();
    let _ = subscriber.wait();

    assert!(observed.len() >= 4, "expected at least 4 events, got {observed:?}");
    let kinds: Vec<&str> = observed.iter().map(|l| l.split_whitespace().next().unwrap()).collect();
    assert_eq!(&kinds[..4], &["job_added", "run_started", "run_stopped", "job_stopped"]);
    for line in &observed[..4] {
        assert!(line.ends_with(&job_id), "event {line} should carry job id {job_id}");
    }
}
