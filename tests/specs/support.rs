// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::process::Output;
use std::time::{Duration, Instant};

use assert_cmd::Command;
use serde_json::Value;

/// An isolated daemon/client environment: its own runtime dir, state dir,
/// and workdir, torn down (daemon shut down) when the test finishes.
pub struct TestEnv {
    root: tempfile::TempDir,
    workdir: std::path::PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(root.path().join("run")).unwrap();
        std::fs::create_dir_all(root.path().join("state")).unwrap();
        let workdir = root.path().join("work");
        std::fs::create_dir_all(&workdir).unwrap();
        Self { root, workdir }
    }

    pub fn workdir(&self) -> &std::path::Path {
        &self.workdir
    }

    /// A second, distinct working directory under this environment's root,
    /// for tests that need two different job/subscriber scopes against the
    /// same daemon.
    pub fn other_workdir(&self) -> std::path::PathBuf {
        let dir = self.root.path().join("other-work");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// A fresh `oj` invocation with this environment's isolated dirs wired
    /// in and color output disabled.
    pub fn oj(&self) -> Command {
        let mut cmd = Command::cargo_bin("oj").expect("oj binary built");
        cmd.current_dir(&self.workdir)
            .env("OJ_RUNTIME_DIR", self.root.path().join("run"))
            .env("OJ_STATE_DIR", self.root.path().join("state"))
            .env("OJ_DAEMON_BINARY", assert_cmd::cargo::cargo_bin("ojd"))
            .env("NO_COLOR", "1");
        cmd
    }

    /// Run `oj <args> -o json`, assert success, and parse stdout as JSON.
    pub fn oj_json(&self, args: &[&str]) -> Value {
        let output = self.run_ok(args, &["-o", "json"]);
        serde_json::from_slice(&output.stdout).expect("valid json on stdout")
    }

    /// A raw `std::process::Command` with the same env wiring as [`Self::oj`],
    /// for callers that need to `spawn()` a long-lived child (e.g. `events`)
    /// instead of waiting for it to exit.
    pub fn raw_oj_command(&self) -> std::process::Command {
        self.raw_oj_command_in(&self.workdir)
    }

    pub fn raw_oj_command_in(&self, dir: &std::path::Path) -> std::process::Command {
        let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin("oj"));
        cmd.current_dir(dir)
            .env("OJ_RUNTIME_DIR", self.root.path().join("run"))
            .env("OJ_STATE_DIR", self.root.path().join("state"))
            .env("OJ_DAEMON_BINARY", assert_cmd::cargo::cargo_bin("ojd"))
            .env("NO_COLOR", "1");
        cmd
    }

    pub fn run_ok(&self, args: &[&str], extra: &[&str]) -> Output {
        let mut cmd = self.oj();
        cmd.args(args).args(extra);
        let assert = cmd.assert().success();
        assert.get_output().clone()
    }

    /// Poll `oj stats <job>` (as JSON) until `predicate` holds or `timeout`
    /// elapses, for assertions about an in-flight run without a fixed sleep.
    pub fn wait_for_stats(
        &self,
        job_id: &str,
        timeout: Duration,
        predicate: impl Fn(&Value) -> bool,
    ) -> Value {
        let deadline = Instant::now() + timeout;
        loop {
            let data = self.oj_json(&["stats", job_id]);
            if predicate(&data) {
                return data;
            }
            if Instant::now() >= deadline {
                panic!("timed out waiting for stats condition on job {job_id}: {data}");
            }
            std::thread::sleep(Duration::from_millis(100));
        }
    }

    /// SIGKILL the running daemon process directly, simulating a crash
    /// that skips the graceful shutdown path (spec §8 scenario 4).
    pub fn kill_daemon(&self) {
        let pid_path = self.root.path().join("run").join("daemon.pid");
        let pid = std::fs::read_to_string(&pid_path)
            .expect("daemon.pid should exist for a running daemon")
            .trim()
            .to_string();
        let status = std::process::Command::new("kill")
            .args(["-KILL", &pid])
            .status()
            .expect("invoke kill(1)");
        assert!(status.success(), "kill -KILL {pid} should succeed");

        // Wait for the pid to actually disappear before continuing.
        let deadline = Instant::now() + Duration::from_secs(5);
        while std::process::Command::new("kill")
            .args(["-0", &pid])
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
        {
            if Instant::now() >= deadline {
                panic!("daemon pid {pid} did not die after SIGKILL");
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        let _ = self.oj().arg("shutdown").output();
    }
}
