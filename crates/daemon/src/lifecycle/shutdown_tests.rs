use std::sync::Arc;

use oj_core::test_support::running_job_with_run;
use oj_storage::{Store, KEY_SHUTDOWN_CLEAN};

use super::*;
use crate::event_bus::EventBus;
use crate::executor::fake::FakeExecutor;
use crate::process_tree::fake::FakeProcessTree;

#[tokio::test]
async fn shutdown_stops_running_jobs_and_marks_clean() {
    let store = Store::open_in_memory().await.unwrap();
    let (mut job, mut run) = running_job_with_run();
    run.pid = 55555;
    job.current_run_id = Some(run.id.clone());
    store.upsert_job(&job).await.unwrap();
    store.upsert_run(&run).await.unwrap();

    let fake_tree = FakeProcessTree::new();
    fake_tree.register_child(run.pid, run.pid);
    let manager = Manager::new(
        store.clone(),
        Arc::new(FakeExecutor::new()),
        Arc::new(fake_tree),
        Arc::new(EventBus::new()),
        "test-instance".to_string(),
        std::env::temp_dir(),
    );
    manager.load_from_store().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("daemon.sock");
    let pid_path = dir.path().join("daemon.pid");
    std::fs::write(&socket_path, b"").unwrap();
    std::fs::write(&pid_path, b"1").unwrap();

    shutdown(&manager, &socket_path, &pid_path).await.unwrap();

    assert!(!socket_path.exists());
    assert!(!pid_path.exists());
    assert_eq!(store.get_state(KEY_SHUTDOWN_CLEAN).await.unwrap().as_deref(), Some("true"));
}

#[tokio::test]
async fn shutdown_tolerates_missing_socket_and_pid_files() {
    let store = Store::open_in_memory().await.unwrap();
    let manager = Manager::new(
        store,
        Arc::new(FakeExecutor::new()),
        Arc::new(FakeProcessTree::new()),
        Arc::new(EventBus::new()),
        "test-instance".to_string(),
        std::env::temp_dir(),
    );

    let dir = tempfile::tempdir().unwrap();
    let result = shutdown(&manager, &dir.path().join("daemon.sock"), &dir.path().join("daemon.pid")).await;
    assert!(result.is_ok());
}
