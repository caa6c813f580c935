// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Odd Jobs Daemon (ojd): per-user background-job supervisor (spec §1).
//!
//! Not meant to be run directly; the `oj` CLI auto-starts it detached the
//! first time a client can't reach the socket (spec §4.8).

use std::sync::Arc;

use oj_daemon::lifecycle::{self, LifecycleError};
use oj_daemon::{env, executor::RealExecutor, listener, process_tree::SysProcessTree};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = setup_logging()?;

    info!(version = env!("CARGO_PKG_VERSION"), "starting ojd");

    let executor = Arc::new(RealExecutor);
    let tree = Arc::new(SysProcessTree);

    let bootstrap = match lifecycle::bootstrap(executor, tree).await {
        Ok(b) => b,
        Err(LifecycleError::AlreadyRunning(path)) => {
            eprintln!("ojd is already running (socket in use: {})", path.display());
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "failed to bootstrap daemon");
            return Err(e.into());
        }
    };

    let listener_socket = listener::bind(&bootstrap.socket_path)?;
    std::fs::write(&bootstrap.pid_path, std::process::id().to_string())?;

    let shutdown = CancellationToken::new();

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let serve_shutdown = shutdown.clone();
    let server = tokio::spawn(listener::serve(bootstrap.manager.clone(), listener_socket, serve_shutdown));

    println!("READY");
    info!(socket = %bootstrap.socket_path.display(), "daemon ready");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
        _ = shutdown.cancelled() => info!("shutdown requested over the socket"),
    }
    shutdown.cancel();
    let _ = server.await;

    lifecycle::shutdown(&bootstrap.manager, &bootstrap.socket_path, &bootstrap.pid_path).await?;
    info!("daemon stopped");
    Ok(())
}

fn setup_logging() -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_path = env::daemon_log_path()?;
    #[allow(clippy::expect_used)]
    let dir = log_path.parent().expect("daemon_log_path always has a parent").to_path_buf();
    std::fs::create_dir_all(&dir).map_err(|source| LifecycleError::Io { path: dir.clone(), source })?;

    #[allow(clippy::expect_used)]
    let file_name = log_path.file_name().expect("daemon_log_path always has a file name");
    let file_appender = tracing_appender::rolling::daily(&dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    Ok(guard)
}
