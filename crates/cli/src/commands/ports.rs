// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ports [<job>]` (spec §4.4 `Ports`/`PortsAll`, §6).

use clap::Args;
use oj_wire::{JobPorts, PortsAllData, PortsData, Request};

use crate::client::DaemonClient;
use crate::output::{format_or_json, handle_list, OutputFormat};

#[derive(Args, Debug)]
pub struct PortsArgs {
    pub job_id: Option<String>,
    /// List ports for running jobs across every workdir.
    #[arg(short = 'a', long)]
    pub all: bool,
    #[arg(short = 'w', long, conflicts_with = "all")]
    pub workdir: Option<String>,
}

pub async fn ports(client: &DaemonClient, args: PortsArgs, format: OutputFormat) -> anyhow::Result<()> {
    match args.job_id {
        Some(job_id) => {
            let data: PortsData = client.send_decode(&Request::Ports { job_id: Some(job_id), workdir: None }).await?;
            format_or_json(format, &data.ports, || print_one(&data.ports))
        }
        None => {
            let workdir = if args.all {
                None
            } else {
                match args.workdir {
                    Some(w) => Some(w),
                    None => Some(std::env::current_dir()?.to_string_lossy().into_owned()),
                }
            };
            let data: PortsAllData = client.send_decode(&Request::Ports { job_id: None, workdir }).await?;
            handle_list(format, &data.ports, "no running jobs with open ports", render_table)
        }
    }
}

fn print_one(entry: &JobPorts) {
    if entry.status == "stopped" {
        println!("job {} is not running", entry.job_id);
        return;
    }
    if entry.ports.is_empty() {
        println!("job {} has no listening ports", entry.job_id);
        return;
    }
    for port in &entry.ports {
        println!("{:<6}  {:<5}  {}", port.port, port.protocol, port.address);
    }
}

fn render_table(entries: &[JobPorts], out: &mut dyn std::io::Write) {
    let _ = writeln!(out, "{:<4}  {:<6}  {:<5}  {}", "JOB", "PORT", "PROTO", "ADDRESS");
    for entry in entries {
        for port in &entry.ports {
            let _ = writeln!(out, "{:<4}  {:<6}  {:<5}  {}", entry.job_id, port.port, port.protocol, port.address);
        }
    }
}
