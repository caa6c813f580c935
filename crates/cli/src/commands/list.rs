// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `list` (spec §4.4 `List`, §6).

use clap::Args;
use oj_core::job::Job;
use oj_wire::{JobsData, Request};

use crate::client::DaemonClient;
use crate::color;
use crate::output::{format_time_ago, handle_list, OutputFormat};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show jobs across every workdir (default: only the current directory).
    #[arg(short = 'a', long)]
    pub all: bool,
    /// Filter to a specific workdir instead of the current directory.
    #[arg(short = 'w', long, conflicts_with = "all")]
    pub workdir: Option<String>,
}

pub async fn list(client: &DaemonClient, args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let workdir = if args.all {
        None
    } else {
        match args.workdir {
            Some(w) => Some(w),
            None => Some(std::env::current_dir()?.to_string_lossy().into_owned()),
        }
    };
    let data: JobsData = client.send_decode(&Request::List { workdir }).await?;
    handle_list(format, &data.jobs, "no jobs", render_table)
}

fn render_table(jobs: &[Job], out: &mut dyn std::io::Write) {
    let _ = writeln!(out, "{:<4}  {:<9}  {:<6}  {:<8}  {}", "ID", "STATUS", "RUNS", "CREATED", "COMMAND");
    for job in jobs {
        let status = if job.is_running() { "running" } else { "stopped" };
        let command = job.command.join(" ");
        let _ = writeln!(
            out,
            "{:<4}  {:<9}  {:<6}  {:<8}  {}",
            job.id,
            color::status(status, job.is_running(), job.failure_count > 0),
            job.run_count,
            format_time_ago(job.created_at),
            command
        );
    }
}
