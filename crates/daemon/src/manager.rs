// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job manager (spec §4.4): the authoritative in-memory index of jobs
//! and runs, enforcing every invariant in spec §3.3 and owning the
//! supervision tasks and event emission. All reads/writes of the index are
//! serialized by a single `parking_lot::RwLock`; long-running work (the
//! stop sequence's polling waits, waiting for a process to exit) is always
//! done without the lock held.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use nix::sys::signal::Signal;
use oj_core::job::{Job, PortInfo, Run, RunStatus};
use oj_core::{command_signature, CoreError, CoreResult, Event, EventKind, JobId, RunId};
use oj_storage::Store;
use parking_lot::RwLock;

use crate::executor::{Executor, ExecutorError, SpawnSpec};
use crate::process_tree::ProcessTree;
use crate::{env, event_bus::EventBus};

/// SIGTERM → wait → SIGKILL escalation timeouts (spec §4.4, §5).
pub const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(10);
pub const FORCE_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

impl From<ExecutorError> for CoreError {
    fn from(e: ExecutorError) -> Self {
        CoreError::ExecutorFailure(e.to_string())
    }
}

#[derive(Default)]
struct Index {
    jobs: HashMap<JobId, Job>,
    runs: HashMap<RunId, Run>,
}

/// Outcome of [`Manager::add`] (spec §4.4 `Add`).
pub use oj_wire::AddAction;

pub struct Manager {
    index: Arc<RwLock<Index>>,
    store: Store,
    executor: Arc<dyn Executor>,
    tree: Arc<dyn ProcessTree>,
    bus: Arc<EventBus>,
    instance_id: String,
    logs_dir: PathBuf,
}

impl Clone for Manager {
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
            store: self.store.clone(),
            executor: Arc::clone(&self.executor),
            tree: Arc::clone(&self.tree),
            bus: Arc::clone(&self.bus),
            instance_id: self.instance_id.clone(),
            logs_dir: self.logs_dir.clone(),
        }
    }
}

impl Manager {
    pub fn new(
        store: Store,
        executor: Arc<dyn Executor>,
        tree: Arc<dyn ProcessTree>,
        bus: Arc<EventBus>,
        instance_id: String,
        logs_dir: PathBuf,
    ) -> Self {
        Self { index: Arc::new(RwLock::new(Index::default())), store, executor, tree, bus, instance_id, logs_dir }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    // ── bootstrap / reconciliation support ──────────────────────────

    /// Load persisted jobs and runs into the index verbatim, with no
    /// reconciliation. Reconciliation (spec §4.7 step 5) runs separately
    /// in `lifecycle::reconcile` once the index is populated, since it
    /// needs process-tree access the manager also exposes.
    pub async fn load_from_store(&self) -> CoreResult<()> {
        let jobs = self.store.load_all_jobs().await?;
        let runs = self.store.load_all_runs().await?;
        let mut index = self.index.write();
        for job in jobs {
            index.jobs.insert(job.id.clone(), job);
        }
        for run in runs {
            index.runs.insert(run.id.clone(), run);
        }
        Ok(())
    }

    /// Every run currently recorded `running` in the index, for bootstrap
    /// reconciliation to probe.
    pub fn running_runs_snapshot(&self) -> Vec<Run> {
        self.index.read().runs.values().filter(|r| r.is_running()).cloned().collect()
    }

    /// Force a run to `stopped` with no exit code, bypassing the normal
    /// wait-for-exit path. Used by bootstrap reconciliation for orphans
    /// and kill-on-unclean-restart survivors (spec §4.7 step 5).
    pub async fn force_stop_run(&self, run_id: &RunId, killed: bool) -> CoreResult<()> {
        let now = Utc::now();
        let (job, run, counts) = {
            let mut index = self.index.write();
            let Some(run) = index.runs.get_mut(run_id) else { return Ok(()) };
            if !run.is_running() {
                return Ok(());
            }
            run.status = RunStatus::Stopped;
            run.stopped_at = Some(now);
            run.pid = 0;
            let duration_ms = run.duration_ms().unwrap_or(0);
            let run_snapshot = run.clone();
            let job_id = run.job_id.clone();

            #[allow(clippy::expect_used)]
            let job = index.jobs.get_mut(&job_id).expect("run references a live job");
            if job.current_run_id.as_ref() == Some(run_id) {
                job.current_run_id = None;
            }
            if killed {
                job.record_run_outcome(None, duration_ms);
            }
            let job_snapshot = job.clone();
            let counts = counts(&index);
            (job_snapshot, run_snapshot, counts)
        };
        self.store.upsert_run(&run).await?;
        self.store.upsert_job(&job).await?;
        self.bus.publish(
            Event::new(EventKind::RunStopped, job.clone(), counts).with_run(run.clone()),
        );
        self.bus.publish(Event::new(EventKind::JobStopped, job, counts));
        Ok(())
    }

    // ── queries ──────────────────────────────────────────────────────

    pub fn get_job(&self, job_id: &JobId) -> CoreResult<Job> {
        self.index.read().jobs.get(job_id).cloned().ok_or_else(|| CoreError::JobNotFound(job_id.clone()))
    }

    pub fn list(&self, workdir: Option<&str>) -> Vec<Job> {
        let index = self.index.read();
        let mut jobs: Vec<Job> = index
            .jobs
            .values()
            .filter(|j| workdir.is_none_or(|w| j.workdir == w))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| {
            let a_key = latest_start(&index, a).unwrap_or(a.created_at);
            let b_key = latest_start(&index, b).unwrap_or(b.created_at);
            b_key.cmp(&a_key)
        });
        jobs
    }

    pub fn runs(&self, job_id: &JobId) -> CoreResult<Vec<Run>> {
        let index = self.index.read();
        if !index.jobs.contains_key(job_id) {
            return Err(CoreError::JobNotFound(job_id.clone()));
        }
        let mut runs: Vec<Run> = index.runs.values().filter(|r| &r.job_id == job_id).cloned().collect();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(runs)
    }

    pub fn stats(&self, job_id: &JobId) -> CoreResult<Job> {
        self.get_job(job_id)
    }

    pub fn version_info(&self) -> (String, usize) {
        let index = self.index.read();
        let running = index.jobs.values().filter(|j| j.is_running()).count();
        (env!("CARGO_PKG_VERSION").to_string(), running)
    }

    // ── mutations ────────────────────────────────────────────────────

    /// Add-or-start-or-note-already-running (spec §4.4 `Add`). Never
    /// errors on duplicate-while-running.
    pub async fn add(
        &self,
        command: Vec<String>,
        workdir: String,
        env: HashMap<String, String>,
        description: Option<String>,
        blocked: Option<bool>,
    ) -> CoreResult<(Job, AddAction)> {
        if command.is_empty() {
            return Err(CoreError::ProtocolError("command must not be empty".to_string()));
        }
        let signature = command_signature(&command);
        let existing = {
            let index = self.index.read();
            index.jobs.values().find(|j| j.command_signature == signature && j.workdir == workdir).cloned()
        };

        match existing {
            Some(job) if job.is_running() => {
                let job = self.maybe_update_description(&job.id, description).await?;
                Ok((job, AddAction::AlreadyRunning))
            }
            Some(job) => {
                self.maybe_update_description(&job.id, description).await?;
                let job = self.start_run(&job.id, env, true).await?;
                Ok((job, AddAction::Started))
            }
            None => {
                let job = self.create_job(command, workdir, signature, description, blocked).await?;
                let job = self.start_run(&job.id, env, false).await?;
                Ok((job, AddAction::Created))
            }
        }
    }

    /// As [`Manager::add`], but never starts a run (spec §4.4 `Create`).
    pub async fn create(
        &self,
        command: Vec<String>,
        workdir: String,
        description: Option<String>,
        blocked: Option<bool>,
    ) -> CoreResult<Job> {
        if command.is_empty() {
            return Err(CoreError::ProtocolError("command must not be empty".to_string()));
        }
        let signature = command_signature(&command);
        let existing = {
            let index = self.index.read();
            index.jobs.values().find(|j| j.command_signature == signature && j.workdir == workdir).cloned()
        };
        match existing {
            Some(job) => self.maybe_update_description(&job.id, description).await,
            None => self.create_job(command, workdir, signature, description, blocked).await,
        }
    }

    pub async fn start(&self, job_id: &JobId, env: HashMap<String, String>) -> CoreResult<Job> {
        let running = {
            let index = self.index.read();
            let job = index.jobs.get(job_id).ok_or_else(|| CoreError::JobNotFound(job_id.clone()))?;
            job.is_running()
        };
        if running {
            return Err(CoreError::AlreadyRunning(job_id.clone()));
        }
        self.start_run(job_id, env, true).await
    }

    pub async fn restart(&self, job_id: &JobId, env: HashMap<String, String>) -> CoreResult<Job> {
        {
            let index = self.index.read();
            if !index.jobs.contains_key(job_id) {
                return Err(CoreError::JobNotFound(job_id.clone()));
            }
        }
        self.stop_sequence(job_id, false).await?;
        self.start_run(job_id, env, true).await
    }

    pub async fn stop(&self, job_id: &JobId, force: bool) -> CoreResult<(u32, bool)> {
        let pid = {
            let index = self.index.read();
            let job = index.jobs.get(job_id).ok_or_else(|| CoreError::JobNotFound(job_id.clone()))?;
            job.current_run_id.as_ref().and_then(|rid| index.runs.get(rid)).map(|r| r.pid).unwrap_or(0)
        };
        self.stop_sequence(job_id, force).await?;
        Ok((pid, force))
    }

    pub async fn signal(&self, job_id: &JobId, sig: Signal) -> CoreResult<u32> {
        let pid = {
            let index = self.index.read();
            let job = index.jobs.get(job_id).ok_or_else(|| CoreError::JobNotFound(job_id.clone()))?;
            job.current_run_id.as_ref().and_then(|rid| index.runs.get(rid)).map(|r| r.pid)
        };
        let pid = pid.ok_or_else(|| no_running_run(job_id))?;
        self.tree.kill_group(pid, sig);
        Ok(pid)
    }

    /// Stop every running job concurrently; returns the number that were
    /// running when this call began (spec §4.4 `StopAll`).
    pub async fn stop_all(&self) -> usize {
        let running: Vec<JobId> = {
            let index = self.index.read();
            index.jobs.values().filter(|j| j.is_running()).map(|j| j.id.clone()).collect()
        };
        let count = running.len();
        let mut set = tokio::task::JoinSet::new();
        for id in running {
            let manager = self.clone();
            set.spawn(async move { manager.stop_sequence(&id, false).await });
        }
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Err(e)) => tracing::warn!(error = %e, "stop_all: a job failed to stop cleanly"),
                Err(e) => tracing::warn!(error = %e, "stop_all: supervisor task panicked"),
                Ok(Ok(())) => {}
            }
        }
        count
    }

    pub async fn remove(&self, job_id: &JobId) -> CoreResult<u32> {
        let (pid, run_ids) = {
            let index = self.index.read();
            let job = index.jobs.get(job_id).ok_or_else(|| CoreError::JobNotFound(job_id.clone()))?;
            if job.is_running() {
                return Err(CoreError::RunningCannotRemove(job_id.clone()));
            }
            let pid = job
                .current_run_id
                .as_ref()
                .and_then(|rid| index.runs.get(rid))
                .map(|r| r.pid)
                .unwrap_or(0);
            let run_ids: Vec<RunId> = index.runs.values().filter(|r| &r.job_id == job_id).map(|r| r.id.clone()).collect();
            (pid, run_ids)
        };
        for run_id in &run_ids {
            self.delete_run_logs(run_id);
        }
        self.store.delete_job(job_id).await?;

        let (job_snapshot, counts) = {
            let mut index = self.index.write();
            let job_snapshot = index.jobs.remove(job_id);
            for run_id in &run_ids {
                index.runs.remove(run_id);
            }
            let counts = counts(&index);
            (job_snapshot, counts)
        };
        if let Some(job_snapshot) = job_snapshot {
            self.bus.publish(Event::new(EventKind::JobRemoved, job_snapshot, counts));
        }
        Ok(pid)
    }

    pub async fn remove_run(&self, run_id: &RunId) -> CoreResult<()> {
        let job_id = run_id.job_id();
        let run = {
            let index = self.index.read();
            let run = index.runs.get(run_id).cloned().ok_or_else(|| CoreError::RunNotFound(run_id.clone()))?;
            if run.is_running() {
                return Err(CoreError::RunningRunCannotRemove(run_id.clone()));
            }
            run
        };
        self.delete_run_logs(run_id);
        self.store.delete_run(run_id).await?;

        let (job_snapshot, counts) = {
            let mut index = self.index.write();
            index.runs.remove(run_id);
            let duration_ms = run.duration_ms().unwrap_or(0);
            if let Some(job) = index.jobs.get_mut(&job_id) {
                job.remove_run_contribution(run.exit_code, duration_ms);
            }
            let job_snapshot = index.jobs.get(&job_id).cloned();
            let counts = counts(&index);
            (job_snapshot, counts)
        };
        if let Some(job_snapshot) = job_snapshot {
            self.store.upsert_job(&job_snapshot).await?;
            self.bus.publish(Event::new(EventKind::RunRemoved, job_snapshot.clone(), counts).with_run(run));
            self.bus.publish(Event::new(EventKind::JobUpdated, job_snapshot, counts));
        }
        Ok(())
    }

    pub async fn ports(&self, job_id: &JobId) -> CoreResult<Vec<PortInfo>> {
        let (run_id, pid) = {
            let index = self.index.read();
            let job = index.jobs.get(job_id).ok_or_else(|| CoreError::JobNotFound(job_id.clone()))?;
            match job.current_run_id.clone() {
                Some(rid) => {
                    let pid = index.runs.get(&rid).map(|r| r.pid).unwrap_or(0);
                    (rid, pid)
                }
                None => return Ok(Vec::new()),
            }
        };
        let ports = self.tree.listening_ports(pid);
        self.update_cached_ports(&run_id, ports.clone()).await?;
        Ok(ports)
    }

    pub fn is_running(&self, job_id: &JobId) -> bool {
        self.index.read().jobs.get(job_id).map(|j| j.is_running()).unwrap_or(false)
    }

    /// Record that this shutdown completed gracefully (spec §4.7 shutdown
    /// step 4), so the next bootstrap's reconciliation knows every run it
    /// finds still marked `running` really is an orphan.
    pub async fn mark_shutdown_clean(&self) -> CoreResult<()> {
        self.store.set_state(oj_storage::KEY_SHUTDOWN_CLEAN, "true").await?;
        Ok(())
    }

    // ── internal procedures ──────────────────────────────────────────

    async fn maybe_update_description(&self, job_id: &JobId, description: Option<String>) -> CoreResult<Job> {
        let description = match description {
            Some(d) if !d.is_empty() => d,
            _ => return self.get_job(job_id),
        };
        let (job, changed, counts) = {
            let mut index = self.index.write();
            let job = index.jobs.get_mut(job_id).ok_or_else(|| CoreError::JobNotFound(job_id.clone()))?;
            let changed = job.description.as_deref() != Some(description.as_str());
            if changed {
                job.description = Some(description);
            }
            let counts = counts(&index);
            #[allow(clippy::expect_used)]
            let job = index.jobs.get(job_id).cloned().expect("just updated");
            (job, changed, counts)
        };
        if changed {
            self.store.upsert_job(&job).await?;
            self.bus.publish(Event::new(EventKind::JobUpdated, job.clone(), counts));
        }
        Ok(job)
    }

    async fn create_job(
        &self,
        command: Vec<String>,
        workdir: String,
        signature: String,
        description: Option<String>,
        blocked: Option<bool>,
    ) -> CoreResult<Job> {
        let id = {
            let index = self.index.read();
            JobId::generate(&index.jobs.keys().cloned().collect())
        };
        let job = Job {
            id,
            command,
            command_signature: signature,
            workdir,
            description,
            blocked: blocked.unwrap_or(false),
            next_run_seq: 1,
            created_at: Utc::now(),
            current_run_id: None,
            run_count: 0,
            success_count: 0,
            failure_count: 0,
            success_total_duration_ms: 0,
            failure_total_duration_ms: 0,
            min_duration_ms: None,
            max_duration_ms: None,
        };
        self.store.upsert_job(&job).await?;
        let (job, counts) = {
            let mut index = self.index.write();
            index.jobs.insert(job.id.clone(), job.clone());
            (job, counts(&index))
        };
        self.bus.publish(Event::new(EventKind::JobAdded, job.clone(), counts));
        Ok(job)
    }

    /// Start-run (spec §4.4): compute the run id, spawn the child, record
    /// the run, and hand its lifetime off to a supervisor task.
    ///
    /// `emit_job_started` is false for the create-and-start path, where
    /// `job_added` already covers the transition and `job_started` must not
    /// also fire (spec §4.4 step 7, §8 scenarios 1 and 5).
    async fn start_run(&self, job_id: &JobId, env: HashMap<String, String>, emit_job_started: bool) -> CoreResult<Job> {
        let (run_id, command, workdir) = {
            let mut index = self.index.write();
            let job = index.jobs.get_mut(job_id).ok_or_else(|| CoreError::JobNotFound(job_id.clone()))?;
            let seq = job.next_run_seq;
            job.next_run_seq += 1;
            (RunId::new(job_id, seq), job.command.clone(), job.workdir.clone())
        };

        let stdout_path = env::stdout_log_path(&self.logs_dir, run_id.as_str());
        let stderr_path = env::stderr_log_path(&self.logs_dir, run_id.as_str());
        let spec = SpawnSpec { command, workdir, env, stdout_path: stdout_path.clone(), stderr_path: stderr_path.clone() };

        let handle = self.executor.start(spec).await?;
        let pid = handle.pid();

        let run = Run {
            id: run_id.clone(),
            job_id: job_id.clone(),
            pid,
            status: RunStatus::Running,
            exit_code: None,
            stdout_path: stdout_path.display().to_string(),
            stderr_path: stderr_path.display().to_string(),
            started_at: Utc::now(),
            stopped_at: None,
            daemon_instance_id: self.instance_id.clone(),
            ports: Vec::new(),
        };

        self.store.upsert_run(&run).await?;

        let (job, counts) = {
            let mut index = self.index.write();
            index.runs.insert(run_id.clone(), run.clone());
            #[allow(clippy::expect_used)]
            let job = index.jobs.get_mut(job_id).expect("job exists, locked continuously since lookup above");
            job.current_run_id = Some(run_id.clone());
            let counts = counts(&index);
            (job.clone(), counts)
        };
        self.store.upsert_job(&job).await?;

        if emit_job_started {
            self.bus.publish(Event::new(EventKind::JobStarted, job.clone(), counts).with_run(run.clone()));
        }
        self.bus.publish(Event::new(EventKind::RunStarted, job.clone(), counts).with_run(run));

        self.spawn_supervisor(run_id, handle);
        Ok(job)
    }

    fn spawn_supervisor(&self, run_id: RunId, mut handle: Box<dyn crate::executor::ProcessHandle>) {
        let manager = self.clone();
        tokio::spawn(async move {
            let outcome = handle.wait().await;
            manager.complete_run(run_id, outcome.exit_code).await;
        });
    }

    /// Wait-for-exit (spec §4.4): apply a finished run's outcome to state.
    async fn complete_run(&self, run_id: RunId, exit_code: Option<i32>) {
        let now = Utc::now();
        let result: CoreResult<(Job, Run, (usize, usize))> = (|| {
            let mut index = self.index.write();
            let run = index.runs.get_mut(&run_id).ok_or_else(|| CoreError::RunNotFound(run_id.clone()))?;
            run.status = RunStatus::Stopped;
            run.stopped_at = Some(now);
            run.exit_code = exit_code;
            run.pid = 0;
            run.ports.clear();
            let duration_ms = run.duration_ms().unwrap_or(0);
            let run_snapshot = run.clone();
            let job_id = run.job_id.clone();

            let job = index.jobs.get_mut(&job_id).ok_or_else(|| CoreError::JobNotFound(job_id.clone()))?;
            // A newer run may already have taken over; only clear the
            // pointer if it still refers to this one (spec §4.4, §4.9).
            if job.current_run_id.as_ref() == Some(&run_id) {
                job.current_run_id = None;
            }
            job.record_run_outcome(exit_code, duration_ms);
            let job_snapshot = job.clone();
            Ok((job_snapshot, run_snapshot, counts(&index)))
        })();

        let Ok((job, run, event_counts)) = result else { return };

        if let Err(e) = self.store.upsert_run(&run).await {
            tracing::error!(run_id = %run.id, error = %e, "failed to persist run completion");
        }
        if let Err(e) = self.store.upsert_job(&job).await {
            tracing::error!(job_id = %job.id, error = %e, "failed to persist job stats");
        }

        self.bus.publish(Event::new(EventKind::RunStopped, job.clone(), event_counts).with_run(run));
        self.bus.publish(Event::new(EventKind::JobStopped, job, event_counts));
    }

    /// The stop sequence (spec §4.4): snapshot the pid/tree with the lock
    /// held, then signal and poll with the lock released.
    async fn stop_sequence(&self, job_id: &JobId, force: bool) -> CoreResult<()> {
        let pid = {
            let index = self.index.read();
            let job = index.jobs.get(job_id).ok_or_else(|| CoreError::JobNotFound(job_id.clone()))?;
            match job.current_run_id.as_ref().and_then(|rid| index.runs.get(rid)) {
                Some(run) => run.pid,
                None => return Ok(()),
            }
        };
        if pid == 0 {
            return Ok(());
        }

        let pids = self.tree.descendants(pid);

        if force {
            self.tree.kill_group(pid, Signal::SIGKILL);
            let survivors = self.wait_until_gone(&pids, FORCE_TIMEOUT).await;
            if !survivors.is_empty() {
                self.tree.kill_all(&survivors, Signal::SIGKILL);
            }
        } else {
            self.tree.kill_group(pid, Signal::SIGTERM);
            let survivors = self.wait_until_gone(&pids, GRACEFUL_TIMEOUT).await;
            if !survivors.is_empty() {
                self.tree.kill_group(pid, Signal::SIGKILL);
                let survivors = self.wait_until_gone(&survivors, FORCE_TIMEOUT).await;
                if !survivors.is_empty() {
                    self.tree.kill_all(&survivors, Signal::SIGKILL);
                }
            }
        }

        let survivors = self.tree.alive(&pids);
        if !survivors.is_empty() {
            return Err(CoreError::StopFailed { job: job_id.clone(), survivors });
        }
        Ok(())
    }

    async fn wait_until_gone(&self, pids: &[u32], timeout: Duration) -> Vec<u32> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let alive = self.tree.alive(pids);
            if alive.is_empty() || tokio::time::Instant::now() >= deadline {
                return alive;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn update_cached_ports(&self, run_id: &RunId, ports: Vec<PortInfo>) -> CoreResult<()> {
        let update: Option<(Job, Run, (usize, usize))> = {
            let mut index = self.index.write();
            let Some(run) = index.runs.get_mut(run_id) else { return Ok(()) };
            if run.ports == ports {
                return Ok(());
            }
            run.ports = ports;
            let run_snapshot = run.clone();
            let job_id = run.job_id.clone();
            let job = index.jobs.get(&job_id).cloned();
            job.map(|job| (job, run_snapshot, counts(&index)))
        };
        if let Some((job, run, event_counts)) = update {
            self.store.upsert_run(&run).await?;
            self.bus.publish(
                Event::new(EventKind::PortsUpdated, job, event_counts)
                    .with_run(run.clone())
                    .with_ports(run.ports),
            );
        }
        Ok(())
    }

    fn delete_run_logs(&self, run_id: &RunId) {
        let _ = std::fs::remove_file(env::stdout_log_path(&self.logs_dir, run_id.as_str()));
        let _ = std::fs::remove_file(env::stderr_log_path(&self.logs_dir, run_id.as_str()));
    }
}

fn counts(index: &Index) -> (usize, usize) {
    let running = index.jobs.values().filter(|j| j.is_running()).count();
    (index.jobs.len(), running)
}

fn latest_start(index: &Index, job: &Job) -> Option<chrono::DateTime<Utc>> {
    index.runs.values().filter(|r| r.job_id == job.id).map(|r| r.started_at).max()
}

fn no_running_run(job_id: &JobId) -> CoreError {
    CoreError::ProtocolError(format!("job {job_id} has no running run"))
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
