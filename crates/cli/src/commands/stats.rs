// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stats <job>` (spec §4.4 `Stats`, §6).

use clap::Args;
use oj_wire::{JobData, Request};

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args, Debug)]
pub struct StatsArgs {
    pub job_id: String,
}

pub async fn stats(client: &DaemonClient, args: StatsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let data: JobData = client.send_decode(&Request::Stats { job_id: args.job_id }).await?;
    format_or_json(format, &data, || print_text(&data))
}

fn print_text(data: &JobData) {
    let job = &data.job;
    println!("job:              {}", job.id);
    println!("command:          {}", job.command.join(" "));
    println!("workdir:          {}", job.workdir);
    println!("status:           {}", if job.is_running() { "running" } else { "stopped" });
    println!("run_count:        {}", job.run_count);
    println!("success_count:    {}", job.success_count);
    println!("failure_count:    {}", job.failure_count);
    match job.success_rate() {
        Some(rate) => println!("success_rate:     {rate:.1}%"),
        None => println!("success_rate:     n/a"),
    }
    match job.avg_success_duration_ms() {
        Some(avg) => println!("avg_duration_ms:  {avg:.0}"),
        None => println!("avg_duration_ms:  n/a"),
    }
    if let Some(min) = job.min_duration_ms {
        println!("min_duration_ms:  {min}");
    }
    if let Some(max) = job.max_duration_ms {
        println!("max_duration_ms:  {max}");
    }
}
