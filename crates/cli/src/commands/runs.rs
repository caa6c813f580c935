// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `runs <job>`, `runs delete <run>` (spec §4.4 `Runs`/`RemoveRun`, §6).

use clap::{Args, Subcommand};
use oj_core::job::Run;
use oj_wire::{RemoveRunData, Request, RunsData};

use crate::client::DaemonClient;
use crate::color;
use crate::output::{format_time_ago, handle_list, format_or_json, OutputFormat};

#[derive(Args, Debug)]
pub struct RunsArgs {
    #[command(subcommand)]
    pub command: Option<RunsCommand>,
    /// Job id to list runs for (omit only when using `delete`).
    pub job_id: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum RunsCommand {
    /// Delete a single run's record and log files.
    Delete { run_id: String },
}

pub async fn runs(client: &DaemonClient, args: RunsArgs, format: OutputFormat) -> anyhow::Result<()> {
    match args.command {
        Some(RunsCommand::Delete { run_id }) => delete(client, run_id, format).await,
        None => {
            let job_id =
                args.job_id.ok_or_else(|| anyhow::anyhow!("usage: oj runs <job> | oj runs delete <run>"))?;
            list(client, job_id, format).await
        }
    }
}

async fn list(client: &DaemonClient, job_id: String, format: OutputFormat) -> anyhow::Result<()> {
    let data: RunsData = client.send_decode(&Request::Runs { job_id }).await?;
    handle_list(format, &data.runs, "no runs", render_table)
}

async fn delete(client: &DaemonClient, run_id: String, format: OutputFormat) -> anyhow::Result<()> {
    let data: RemoveRunData = client.send_decode(&Request::RemoveRun { run_id }).await?;
    format_or_json(format, &data, || println!("deleted run {}", data.run_id))
}

fn render_table(runs: &[Run], out: &mut dyn std::io::Write) {
    let _ = writeln!(out, "{:<8}  {:<9}  {:<6}  {:<8}  {}", "RUN", "STATUS", "EXIT", "STARTED", "PID");
    for run in runs {
        let status = if run.is_running() { "running" } else { "stopped" };
        let exit = run.exit_code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
        let failed = !run.is_running() && run.exit_code != Some(0);
        let _ = writeln!(
            out,
            "{:<8}  {:<9}  {:<6}  {:<8}  {}",
            run.id,
            color::status(status, run.is_running(), failed),
            exit,
            format_time_ago(run.started_at),
            run.pid
        );
    }
}
