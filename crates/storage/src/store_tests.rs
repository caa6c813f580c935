// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_core::job::{Job, Run, RunStatus};

async fn store() -> Store {
    Store::open_in_memory().await.expect("open in-memory store")
}

#[tokio::test]
async fn daemon_state_roundtrips() {
    let store = store().await;
    assert_eq!(store.get_state(KEY_INSTANCE_ID).await.unwrap(), None);
    store.set_state(KEY_INSTANCE_ID, "abc").await.unwrap();
    assert_eq!(store.get_state(KEY_INSTANCE_ID).await.unwrap(), Some("abc".to_string()));
    store.set_state(KEY_INSTANCE_ID, "def").await.unwrap();
    assert_eq!(store.get_state(KEY_INSTANCE_ID).await.unwrap(), Some("def".to_string()));
}

#[tokio::test]
async fn job_upsert_and_load_roundtrips() {
    let store = store().await;
    let job = Job::builder().workdir("/w").command(vec!["true".into()]).build();
    store.upsert_job(&job).await.unwrap();

    let loaded = store.load_all_jobs().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, job.id);
    assert_eq!(loaded[0].workdir, "/w");
    assert_eq!(loaded[0].command, vec!["true".to_string()]);
}

#[tokio::test]
async fn job_upsert_is_idempotent_update() {
    let store = store().await;
    let mut job = Job::builder().build();
    store.upsert_job(&job).await.unwrap();
    job.blocked = true;
    job.run_count = 5;
    store.upsert_job(&job).await.unwrap();

    let loaded = store.load_all_jobs().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded[0].blocked);
    assert_eq!(loaded[0].run_count, 5);
}

#[tokio::test]
async fn deleting_job_cascades_to_runs() {
    let store = store().await;
    let job = Job::builder().build();
    store.upsert_job(&job).await.unwrap();
    let run = Run::builder().job_id(job.id.clone()).build();
    store.upsert_run(&run).await.unwrap();

    store.delete_job(&job.id).await.unwrap();

    assert!(store.load_all_jobs().await.unwrap().is_empty());
    assert!(store.load_all_runs().await.unwrap().is_empty());
}

#[tokio::test]
async fn find_orphan_runs_returns_running_runs_with_command() {
    let store = store().await;
    let job = Job::builder().command(vec!["sleep".into(), "60".into()]).build();
    store.upsert_job(&job).await.unwrap();
    let running = Run::builder().job_id(job.id.clone()).status(RunStatus::Running).build();
    let stopped = Run::builder().job_id(job.id.clone()).status(RunStatus::Stopped).build();
    store.upsert_run(&running).await.unwrap();
    store.upsert_run(&stopped).await.unwrap();

    let orphans = store.find_orphan_runs().await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].0.id, running.id);
    assert_eq!(orphans[0].1, vec!["sleep".to_string(), "60".to_string()]);
}

#[tokio::test]
async fn mark_run_stopped_clears_current_run_id() {
    let store = store().await;
    let run = Run::builder().status(RunStatus::Running).build();
    let job = Job::builder().current_run_id(run.id.clone()).build();
    store.upsert_job(&job).await.unwrap();
    store.upsert_run(&run).await.unwrap();

    store.mark_run_stopped(&run.id, chrono::Utc::now()).await.unwrap();

    let runs = store.load_all_runs().await.unwrap();
    assert_eq!(runs[0].status, RunStatus::Stopped);
    assert!(runs[0].exit_code.is_none());
    let jobs = store.load_all_jobs().await.unwrap();
    assert_eq!(jobs[0].current_run_id, None);
}
