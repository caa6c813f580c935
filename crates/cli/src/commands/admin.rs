// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ping`, `shutdown`, `events` (spec §4.6, §6).

use clap::Args;
use oj_core::Event;
use oj_wire::{read_frame, Request};

use crate::client::DaemonClient;

pub async fn ping(client: &DaemonClient) -> anyhow::Result<()> {
    let response = client.send(&Request::Ping).await?;
    let pong: String = response.decode().ok_or_else(|| anyhow::anyhow!("unexpected response"))?;
    println!("{pong}");
    Ok(())
}

pub async fn shutdown(client: &DaemonClient) -> anyhow::Result<()> {
    client.send(&Request::Shutdown).await?;
    println!("daemon is shutting down");
    Ok(())
}

#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Subscribe to every job's events, not just the current directory's.
    #[arg(short = 'a', long)]
    pub all: bool,
}

pub async fn events(client: &DaemonClient, args: EventsArgs) -> anyhow::Result<()> {
    let workdir = if args.all {
        None
    } else {
        Some(std::env::current_dir()?.to_string_lossy().into_owned())
    };
    let (ack, mut reader) = client.send_and_keep_open(&Request::Subscribe { workdir }).await?;
    if !ack.success {
        anyhow::bail!(ack.error.unwrap_or_else(|| "subscribe rejected".to_string()));
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            frame = read_frame::<_, Event>(&mut reader) => {
                match frame? {
                    Some(event) => println!("{} {}", event.kind, event.job_id),
                    None => break,
                }
            }
            _ = &mut ctrl_c => break,
        }
    }
    Ok(())
}
