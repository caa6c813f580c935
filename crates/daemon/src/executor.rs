// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The process executor (spec §4.1): spawns a child in its own process
//! group with its output redirected to the two log files, and exposes
//! pid/wait/is_alive on the returned handle. `RealExecutor` is used by the
//! daemon binary; `FakeExecutor` gives tests deterministic, filesystem-free
//! handles.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("command must not be empty")]
    EmptyCommand,
    #[error("failed to open log file {path}: {source}")]
    LogFile { path: PathBuf, source: std::io::Error },
    #[error("failed to spawn {program}: {source}")]
    Spawn { program: String, source: std::io::Error },
}

/// Everything the executor needs to start one run (spec §4.1).
pub struct SpawnSpec {
    pub command: Vec<String>,
    pub workdir: String,
    pub env: HashMap<String, String>,
    pub stdout_path: PathBuf,
    pub stderr_path: PathBuf,
}

/// The outcome of `ProcessHandle::wait`.
///
/// `exit_code` is `Some` only when the process exited normally; a process
/// killed by a signal (including our own stop-sequence) reports `None`,
/// which Wait-for-exit (spec §4.4) treats as "killed" rather than
/// "failed".
pub struct WaitOutcome {
    pub exit_code: Option<i32>,
}

#[async_trait]
pub trait ProcessHandle: Send + Sync {
    fn pid(&self) -> u32;
    async fn wait(&mut self) -> WaitOutcome;
    fn is_alive(&self) -> bool;
}

#[async_trait]
pub trait Executor: Send + Sync + 'static {
    async fn start(&self, spec: SpawnSpec) -> Result<Box<dyn ProcessHandle>, ExecutorError>;
}

/// A real child process, spawned in its own process group so the daemon
/// can signal the whole subtree as a unit (spec §4.1).
pub struct RealExecutor;

#[async_trait]
impl Executor for RealExecutor {
    async fn start(&self, spec: SpawnSpec) -> Result<Box<dyn ProcessHandle>, ExecutorError> {
        if spec.command.is_empty() {
            return Err(ExecutorError::EmptyCommand);
        }
        let stdout = open_truncated(&spec.stdout_path)?;
        let stderr = open_truncated(&spec.stderr_path)?;

        let program = &spec.command[0];
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(&spec.command[1..])
            .current_dir(&spec.workdir)
            .env_clear()
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            // New process group so the whole subtree can be signaled as one
            // unit via the negated pid (spec §4.1, §4.4 stop sequence).
            .process_group(0);

        let child =
            cmd.spawn().map_err(|source| ExecutorError::Spawn { program: program.clone(), source })?;
        let pid = child.id().unwrap_or(0);
        Ok(Box::new(RealHandle { child, pid }))
    }
}

fn open_truncated(path: &Path) -> Result<std::fs::File, ExecutorError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|source| ExecutorError::LogFile { path: path.to_path_buf(), source })?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|source| ExecutorError::LogFile { path: path.to_path_buf(), source })
}

struct RealHandle {
    child: tokio::process::Child,
    pid: u32,
}

#[async_trait]
impl ProcessHandle for RealHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    async fn wait(&mut self) -> WaitOutcome {
        match self.child.wait().await {
            Ok(status) => WaitOutcome { exit_code: status.code() },
            Err(_) => WaitOutcome { exit_code: None },
        }
    }

    fn is_alive(&self) -> bool {
        crate::process_tree::is_alive(self.pid)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    //! A deterministic in-memory executor for manager/bootstrap tests: no
    //! real process is spawned, and each handle's exit is controlled by the
    //! test via [`FakeExecutor::complete`] (immediate exit) or left pending
    //! to simulate a long-running / undead process.

    use super::*;
    use std::collections::HashMap as Map;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::oneshot;

    pub struct SpawnRecord {
        pub command: Vec<String>,
        pub workdir: String,
        pub pid: u32,
    }

    #[derive(Default)]
    pub struct FakeExecutor {
        next_pid: AtomicU32,
        spawned: parking_lot::Mutex<Vec<SpawnRecord>>,
        pending: parking_lot::Mutex<Map<u32, oneshot::Sender<Option<i32>>>>,
    }

    impl FakeExecutor {
        pub fn new() -> Self {
            Self { next_pid: AtomicU32::new(10_000), ..Default::default() }
        }

        pub fn spawned(&self) -> Vec<String> {
            self.spawned.lock().iter().map(|r| r.command.join(" ")).collect()
        }

        /// Resolve the handle for `pid` as if the process exited with
        /// `exit_code` (`None` = killed by signal).
        pub fn complete(&self, pid: u32, exit_code: Option<i32>) {
            if let Some(tx) = self.pending.lock().remove(&pid) {
                let _ = tx.send(exit_code);
            }
        }
    }

    #[async_trait]
    impl Executor for FakeExecutor {
        async fn start(&self, spec: SpawnSpec) -> Result<Box<dyn ProcessHandle>, ExecutorError> {
            if spec.command.is_empty() {
                return Err(ExecutorError::EmptyCommand);
            }
            for path in [&spec.stdout_path, &spec.stderr_path] {
                if let Some(parent) = path.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                let _ = std::fs::OpenOptions::new().create(true).write(true).truncate(true).open(path);
            }
            let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
            self.spawned.lock().push(SpawnRecord {
                command: spec.command.clone(),
                workdir: spec.workdir,
                pid,
            });
            let (tx, rx) = oneshot::channel::<Option<i32>>();
            self.pending.lock().insert(pid, tx);
            Ok(Box::new(FakeHandle { pid, rx: Some(rx) }))
        }
    }

    /// A handle whose exit is driven by [`FakeExecutor::complete`].
    pub struct FakeHandle {
        pid: u32,
        rx: Option<oneshot::Receiver<Option<i32>>>,
    }

    #[async_trait]
    impl ProcessHandle for FakeHandle {
        fn pid(&self) -> u32 {
            self.pid
        }

        async fn wait(&mut self) -> WaitOutcome {
            match self.rx.take() {
                Some(rx) => WaitOutcome { exit_code: rx.await.unwrap_or(None) },
                None => WaitOutcome { exit_code: None },
            }
        }

        fn is_alive(&self) -> bool {
            self.rx.is_some()
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
