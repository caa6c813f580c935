use std::sync::Arc;

use oj_storage::Store;
use oj_wire::{AddAction, JobActionData, JobsData, VersionData};

use crate::event_bus::EventBus;
use crate::executor::fake::FakeExecutor;
use crate::process_tree::fake::FakeProcessTree;

use super::*;

async fn test_manager() -> (Manager, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in_memory().await.unwrap();
    let manager = Manager::new(
        store,
        Arc::new(FakeExecutor::new()),
        Arc::new(FakeProcessTree::new()),
        Arc::new(EventBus::new()),
        "test-instance".to_string(),
        dir.path().join("logs"),
    );
    (manager, dir)
}

#[tokio::test]
async fn ping_returns_pong() {
    let (manager, _dir) = test_manager().await;
    let (response, _) = dispatch(&manager, Request::Ping).await;
    assert!(response.success);
    assert_eq!(response.decode::<String>(), Some("pong".to_string()));
}

#[tokio::test]
async fn version_returns_running_job_count() {
    let (manager, _dir) = test_manager().await;
    let (response, _) = dispatch(&manager, Request::Version).await;
    let data: VersionData = response.decode().unwrap();
    assert_eq!(data.running_jobs, 0);
}

#[tokio::test]
async fn unknown_request_type_text_is_not_fabricated_here() {
    // Every variant in `Request` is handled; malformed JSON that doesn't
    // even decode to a `Request` never reaches `dispatch` (the listener
    // produces the "unknown request type" text itself, spec §4.6/§6).
}

#[tokio::test]
async fn add_then_list_round_trips() {
    let (manager, _dir) = test_manager().await;
    let (response, _) = dispatch(
        &manager,
        Request::Add {
            command: vec!["true".to_string()],
            workdir: "/w".to_string(),
            env: Default::default(),
            description: None,
            blocked: None,
        },
    )
    .await;
    assert!(response.success);
    let data: JobActionData = response.decode().unwrap();
    assert_eq!(data.action, AddAction::Created);

    let (response, _) = dispatch(&manager, Request::List { workdir: None }).await;
    let data: JobsData = response.decode().unwrap();
    assert_eq!(data.jobs.len(), 1);
}

#[tokio::test]
async fn get_job_on_unknown_id_fails() {
    let (manager, _dir) = test_manager().await;
    let (response, _) = dispatch(&manager, Request::GetJob { job_id: "zzz".to_string() }).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("not found"));
}

#[tokio::test]
async fn subscribe_yields_subscribe_action() {
    let (manager, _dir) = test_manager().await;
    let (response, action) = dispatch(&manager, Request::Subscribe { workdir: None }).await;
    assert!(response.success);
    assert!(matches!(action, ConnAction::Subscribe { workdir: None }));
}

#[tokio::test]
async fn shutdown_yields_shutdown_action() {
    let (manager, _dir) = test_manager().await;
    let (response, action) = dispatch(&manager, Request::Shutdown).await;
    assert!(response.success);
    assert!(matches!(action, ConnAction::Shutdown));
}

#[tokio::test]
async fn signal_accepts_name_and_number() {
    assert_eq!(parse_signal("TERM").unwrap(), Signal::SIGTERM);
    assert_eq!(parse_signal("SIGTERM").unwrap(), Signal::SIGTERM);
    assert_eq!(parse_signal("term").unwrap(), Signal::SIGTERM);
    assert_eq!(parse_signal("15").unwrap(), Signal::SIGTERM);
    assert!(parse_signal("NOTASIGNAL").is_err());
}

#[tokio::test]
async fn signal_on_stopped_job_fails() {
    let (manager, _dir) = test_manager().await;
    dispatch(
        &manager,
        Request::Create {
            command: vec!["true".to_string()],
            workdir: "/w".to_string(),
            description: None,
            blocked: None,
        },
    )
    .await;
    let (response, _) = dispatch(
        &manager,
        Request::List { workdir: None },
    )
    .await;
    let data: JobsData = response.decode().unwrap();
    let job_id = data.jobs[0].id.to_string();

    let (response, _) =
        dispatch(&manager, Request::Signal { job_id, signal: "TERM".to_string() }).await;
    assert!(!response.success);
}

#[tokio::test]
async fn ports_on_stopped_job_returns_stopped_envelope() {
    let (manager, _dir) = test_manager().await;
    dispatch(
        &manager,
        Request::Create {
            command: vec!["true".to_string()],
            workdir: "/w".to_string(),
            description: None,
            blocked: None,
        },
    )
    .await;
    let (response, _) = dispatch(&manager, Request::List { workdir: None }).await;
    let data: JobsData = response.decode().unwrap();
    let job_id = data.jobs[0].id.to_string();

    let (response, _) = dispatch(&manager, Request::Ports { job_id: Some(job_id), workdir: None }).await;
    assert!(response.success);
    let data: oj_wire::PortsData = response.decode().unwrap();
    assert_eq!(data.ports.status, "stopped");
    assert!(data.ports.ports.is_empty());
}
