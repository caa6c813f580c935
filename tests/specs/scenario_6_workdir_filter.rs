// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario 6 (spec §8): a subscriber scoped to one workdir sees nothing
//! from a job created in a different workdir.

use std::io::{BufRead, BufReader};
use std::process::Stdio;
use std::time::Duration;

use crate::support::TestEnv;

#[test]
fn subscriber_does_not_see_events_from_other_workdirs() {
    let env = TestEnv::new();
    let other = env.other_workdir();

    env.run_ok(&["ping"], &[]);

    let mut subscriber = env
        .raw_oj_command_in(env.workdir())
        .args(["events"])
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn oj events");
    let stdout = subscriber.stdout.take().unwrap();

    std::thread::sleep(Duration::from_millis(300));

    let other_str = other.to_string_lossy().into_owned();
    let added = env.oj_json(&["add", "-w", &other_str, "--", "true"]);
    let job_id = added["job"]["id"].as_str().unwrap().to_string();
    env.wait_for_stats(&job_id, Duration::from_secs(5), |s| s["run_count"] == 1);

    // Nothing from the other workdir's job should arrive within a
    // reasonable window; the bus would have delivered it near-instantly
    // if the filter were broken.
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let mut lines = BufReader::new(stdout).lines();
        if let Some(Ok(line)) = lines.next() {
            let _ = tx.send(line);
        }
    });
    let leaked = rx.recv_timeout(Duration::from_secs(2));

    let _ = subscriber.kill();
    let _ = subscriber.wait();

    assert!(leaked.is_err(), "subscriber should not have received: {leaked:?}");
}
