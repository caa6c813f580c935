// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job creation & execution commands (spec §4.4, §6): `add`, `create`,
//! `run`, `start`, `restart`, `stop`, `signal`, `remove`.

use std::collections::HashMap;

use clap::Args;
use oj_wire::{AddAction, JobActionData, JobData, RemoveData, Request, SignalData, StopData};

use crate::client::DaemonClient;
use crate::commands::{parse_env_var, resolve_workdir};
use crate::output::{format_or_json, OutputFormat};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Command and its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
    /// Working directory to key the job on (defaults to the current directory).
    #[arg(short = 'w', long)]
    pub workdir: Option<String>,
    /// Environment variables to pass to the child (`KEY=VALUE`, repeatable).
    #[arg(short = 'e', long = "env", value_parser = parse_env_var)]
    pub env: Vec<(String, String)>,
    /// Human-readable description, stored and updatable in place.
    #[arg(short = 'd', long)]
    pub description: Option<String>,
    /// Opaque flag round-tripped by the core (spec §9); meaning is
    /// interpreted by higher layers.
    #[arg(long)]
    pub blocked: bool,
}

fn env_map(pairs: &[(String, String)]) -> HashMap<String, String> {
    pairs.iter().cloned().collect()
}

pub async fn add(client: &DaemonClient, args: AddArgs, format: OutputFormat) -> anyhow::Result<()> {
    let workdir = resolve_workdir(args.workdir)?;
    let request = Request::Add {
        command: args.command,
        workdir,
        env: env_map(&args.env),
        description: args.description,
        blocked: Some(args.blocked),
    };
    let data: JobActionData = client.send_decode(&request).await?;
    format_or_json(format, &data, || print_action(&data))
}

pub async fn create(
    client: &DaemonClient,
    args: AddArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let workdir = resolve_workdir(args.workdir)?;
    let request = Request::Create {
        command: args.command,
        workdir,
        description: args.description,
        blocked: Some(args.blocked),
    };
    let data: JobData = client.send_decode(&request).await?;
    format_or_json(format, &data, || println!("created job {} (not started)", data.job.id))
}

fn print_action(data: &JobActionData) {
    let action = match data.action {
        AddAction::Created => "created",
        AddAction::Started => "started",
        AddAction::AlreadyRunning => "already running",
    };
    println!("{} job {}", action, data.job.id);
}

#[derive(Args, Debug)]
pub struct JobIdArgs {
    pub job_id: String,
}

#[derive(Args, Debug)]
pub struct StartArgs {
    pub job_id: String,
    #[arg(short = 'e', long = "env", value_parser = parse_env_var)]
    pub env: Vec<(String, String)>,
}

pub async fn start(
    client: &DaemonClient,
    args: StartArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let request = Request::Start { job_id: args.job_id, env: env_map(&args.env) };
    let data: JobData = client.send_decode(&request).await?;
    format_or_json(format, &data, || println!("started job {} (run {})", data.job.id, run_id(&data)))
}

pub async fn restart(
    client: &DaemonClient,
    args: StartArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let request = Request::Restart { job_id: args.job_id, env: env_map(&args.env) };
    let data: JobData = client.send_decode(&request).await?;
    format_or_json(format, &data, || println!("restarted job {} (run {})", data.job.id, run_id(&data)))
}

fn run_id(data: &JobData) -> String {
    data.job.current_run_id.as_ref().map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

#[derive(Args, Debug)]
pub struct StopArgs {
    pub job_id: String,
    /// Skip straight to SIGKILL instead of the graceful SIGTERM escalation.
    #[arg(short = 'f', long)]
    pub force: bool,
}

pub async fn stop(client: &DaemonClient, args: StopArgs, format: OutputFormat) -> anyhow::Result<()> {
    let request = Request::Stop { job_id: args.job_id, force: args.force };
    let data: StopData = client.send_decode(&request).await?;
    format_or_json(format, &data, || println!("stopped job {} (pid {})", data.job_id, data.pid))
}

#[derive(Args, Debug)]
pub struct SignalArgs {
    pub job_id: String,
    /// Signal name (`TERM`, `SIGTERM`) or number.
    pub signal: String,
}

pub async fn signal(
    client: &DaemonClient,
    args: SignalArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let request = Request::Signal { job_id: args.job_id, signal: args.signal };
    let data: SignalData = client.send_decode(&request).await?;
    format_or_json(format, &data, || {
        println!("sent {} to job {} (pid {})", data.signal, data.job_id, data.pid)
    })
}

pub async fn remove(
    client: &DaemonClient,
    args: JobIdArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let request = Request::Remove { job_id: args.job_id };
    let data: RemoveData = client.send_decode(&request).await?;
    format_or_json(format, &data, || println!("removed job {}", data.job_id))
}
