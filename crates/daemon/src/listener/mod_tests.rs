use std::sync::Arc;

use oj_storage::Store;
use oj_wire::{Request, Response};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use crate::event_bus::EventBus;
use crate::executor::fake::FakeExecutor;
use crate::process_tree::fake::FakeProcessTree;

use super::*;

async fn test_setup() -> (Manager, tempfile::TempDir, std::path::PathBuf) {
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
    let socket_path = dir.path().join("daemon.sock");
    (manager, dir, socket_path)
}

async fn roundtrip(socket_path: &std::path::Path, request: &Request) -> Response {
    let mut stream = UnixStream::connect(socket_path).await.unwrap();
    let mut writer_buf = serde_json::to_vec(request).unwrap();
    writer_buf.push(b'\n');
    stream.write_all(&writer_buf).await.unwrap();
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line).await.unwrap();
    serde_json::from_str(line.trim_end()).unwrap()
}

#[tokio::test]
async fn ping_over_the_socket() {
    let (manager, _dir, socket_path) = test_setup().await;
    let listener = bind(&socket_path).unwrap();
    let shutdown = CancellationToken::new();
    let server = tokio::spawn(serve(manager, listener, shutdown.clone()));

    let response = roundtrip(&socket_path, &Request::Ping).await;
    assert!(response.success);
    assert_eq!(response.decode::<String>(), Some("pong".to_string()));

    shutdown.cancel();
    let _ = server.await;
}

#[tokio::test]
async fn unknown_request_type_has_load_bearing_prefix() {
    let (manager, _dir, socket_path) = test_setup().await;
    let listener = bind(&socket_path).unwrap();
    let shutdown = CancellationToken::new();
    let server = tokio::spawn(serve(manager, listener, shutdown.clone()));

    let mut stream = UnixStream::connect(&socket_path).await.unwrap();
    stream.write_all(b"{\"type\":\"frobnicate\"}\n").await.unwrap();
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line).await.unwrap();
    let response: Response = serde_json::from_str(line.trim_end()).unwrap();
    assert!(!response.success);
    assert!(response.error.unwrap().starts_with("unknown request type"));

    shutdown.cancel();
    let _ = server.await;
}

#[tokio::test]
async fn shutdown_request_cancels_the_listener() {
    let (manager, _dir, socket_path) = test_setup().await;
    let listener = bind(&socket_path).unwrap();
    let shutdown = CancellationToken::new();
    let server = tokio::spawn(serve(manager, listener, shutdown.clone()));

    let response = roundtrip(&socket_path, &Request::Shutdown).await;
    assert!(response.success);

    tokio::time::timeout(std::time::Duration::from_secs(2), server).await.unwrap().unwrap();
}

#[tokio::test]
async fn subscriber_receives_events_for_its_workdir() {
    let (manager, _dir, socket_path) = test_setup().await;
    let listener = bind(&socket_path).unwrap();
    let shutdown = CancellationToken::new();
    let server = tokio::spawn(serve(manager.clone(), listener, shutdown.clone()));

    let mut stream = UnixStream::connect(&socket_path).await.unwrap();
    let req = Request::Subscribe { workdir: Some("/w".to_string()) };
    let mut buf = serde_json::to_vec(&req).unwrap();
    buf.push(b'\n');
    stream.write_all(&buf).await.unwrap();

    let (read_half, _write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();
    reader.read_line(&mut line).await.unwrap();
    let ack: Response = serde_json::from_str(line.trim_end()).unwrap();
    assert!(ack.success);

    manager
        .add(vec!["true".to_string()], "/w".to_string(), Default::default(), None, None)
        .await
        .unwrap();

    line.clear();
    tokio::time::timeout(std::time::Duration::from_secs(2), reader.read_line(&mut line))
        .await
        .unwrap()
        .unwrap();
    let event: oj_core::Event = serde_json::from_str(line.trim_end()).unwrap();
    assert_eq!(event.kind, oj_core::EventKind::JobAdded);

    shutdown.cancel();
    let _ = server.await;
}
