// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! oj — Odd Jobs CLI: the per-user background-job supervisor's client.

mod autostart;
mod client;
mod color;
mod commands;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "oj", version, about = "Odd Jobs - a per-user background-job supervisor")]
struct Cli {
    /// Output format.
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a job: starts it if new or stopped, never errors if already running.
    Add(commands::job_actions::AddArgs),
    /// Create a job without starting it.
    Create(commands::job_actions::AddArgs),
    /// Add a job and wait for it to finish, exiting with its exit code.
    Run(commands::job_actions::AddArgs),
    /// Start a stopped job.
    Start(commands::job_actions::StartArgs),
    /// Stop (if running) then start a job.
    Restart(commands::job_actions::StartArgs),
    /// Stop a running job.
    Stop(commands::job_actions::StopArgs),
    /// Send a signal to a running job's process group.
    Signal(commands::job_actions::SignalArgs),
    /// Remove a job (must not be running).
    Remove(commands::job_actions::JobIdArgs),
    /// List jobs.
    List(commands::list::ListArgs),
    /// List or delete runs of a job.
    Runs(commands::runs::RunsArgs),
    /// Show a job's statistics.
    Stats(commands::stats::StatsArgs),
    /// Show listening ports for a job, or all running jobs.
    Ports(commands::ports::PortsArgs),
    /// Print a job's stdout log.
    Stdout(commands::logs::StreamArgs),
    /// Print a job's stderr log.
    Stderr(commands::logs::StreamArgs),
    /// Stream stdout/stderr for every running job in the current directory.
    Logs,
    /// Wait for a job to stop, exiting with its exit code.
    Await(commands::await_cmd::AwaitArgs),
    /// Wait for any currently running job to stop.
    #[command(name = "await-any")]
    AwaitAny(commands::await_cmd::AwaitManyArgs),
    /// Wait for every currently running job to stop.
    #[command(name = "await-all")]
    AwaitAll(commands::await_cmd::AwaitManyArgs),
    /// Subscribe to the daemon's event stream.
    Events(commands::admin::EventsArgs),
    /// Check that the daemon is alive.
    Ping,
    /// Ask the daemon to shut down gracefully.
    Shutdown,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e.downcast_ref::<ExitError>().map_or(1, |err| err.code);
        let message = e.to_string();
        if !message.is_empty() {
            eprintln!("Error: {message}");
        }
        std::process::exit(code);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    // `shutdown` bypasses the version handshake (spec §4.8); every other
    // command auto-starts the daemon and checks versions first.
    if matches!(cli.command, Commands::Shutdown) {
        return match DaemonClient::connect_for_shutdown() {
            Ok(client) => commands::admin::shutdown(&client).await,
            Err(crate::client::ClientError::DaemonNotRunning) => {
                println!("daemon is not running");
                Ok(())
            }
            Err(e) => Err(e.into()),
        };
    }

    let client = DaemonClient::connect_or_start().await?;

    match cli.command {
        Commands::Add(args) => commands::job_actions::add(&client, args, format).await?,
        Commands::Create(args) => commands::job_actions::create(&client, args, format).await?,
        Commands::Run(args) => run_and_await(&client, args, format).await?,
        Commands::Start(args) => commands::job_actions::start(&client, args, format).await?,
        Commands::Restart(args) => commands::job_actions::restart(&client, args, format).await?,
        Commands::Stop(args) => commands::job_actions::stop(&client, args, format).await?,
        Commands::Signal(args) => commands::job_actions::signal(&client, args, format).await?,
        Commands::Remove(args) => commands::job_actions::remove(&client, args, format).await?,
        Commands::List(args) => commands::list::list(&client, args, format).await?,
        Commands::Runs(args) => commands::runs::runs(&client, args, format).await?,
        Commands::Stats(args) => commands::stats::stats(&client, args, format).await?,
        Commands::Ports(args) => commands::ports::ports(&client, args, format).await?,
        Commands::Stdout(args) => commands::logs::stdout(&client, args).await?,
        Commands::Stderr(args) => commands::logs::stderr(&client, args).await?,
        Commands::Logs => commands::logs::logs(&client).await?,
        Commands::Await(args) => commands::await_cmd::await_job(&client, args).await?,
        Commands::AwaitAny(args) => commands::await_cmd::await_any(&client, args).await?,
        Commands::AwaitAll(args) => commands::await_cmd::await_all(&client, args).await?,
        Commands::Events(args) => commands::admin::events(&client, args).await?,
        Commands::Ping => commands::admin::ping(&client).await?,
        Commands::Shutdown => unreachable!("handled above"),
    }
    Ok(())
}

/// `run` (spec §6): a thin `add` + `await` combinator.
async fn run_and_await(
    client: &DaemonClient,
    args: commands::job_actions::AddArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let workdir = commands::resolve_workdir(args.workdir.clone())?;
    commands::job_actions::add(client, args, format).await?;
    let data: oj_wire::JobsData =
        client.send_decode(&oj_wire::Request::List { workdir: Some(workdir) }).await?;
    let job_id = data
        .jobs
        .first()
        .map(|j| j.id.to_string())
        .ok_or_else(|| anyhow::anyhow!("job vanished immediately after being added"))?;
    commands::await_cmd::await_job(client, commands::await_cmd::AwaitArgs { job_id })
        .await
        .map_err(anyhow::Error::from)
}
