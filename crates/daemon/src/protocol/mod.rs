// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request dispatch (spec §4.6): a flat match from [`oj_wire::Request`] to
//! [`oj_wire::Response`] plus a [`ConnAction`] telling the caller whether the
//! connection should now become a subscriber or the daemon should shut down.
//! Every handler acquires the manager's lock only as long as the operation
//! it calls needs it; dispatch itself never holds anything across an await
//! beyond what `Manager` already does internally.

use std::str::FromStr;

use nix::sys::signal::Signal;
use oj_core::{CoreError, JobId, RunId};
use oj_wire::{
    JobActionData, JobData, JobPorts, JobsData, PortsAllData, PortsData, RemoveData, RemoveRunData,
    Request, Response, RunsData, SignalData, StopAllData, StopData, VersionData,
};

use crate::manager::Manager;

/// What the listener should do with the connection after this response is
/// written.
pub enum ConnAction {
    /// Respond and close, the default for every one-shot request.
    None,
    /// Park the connection in the event bus (spec §4.6 `subscribe`).
    Subscribe { workdir: Option<String> },
    /// Respond, then begin graceful shutdown (spec §4.6 `shutdown`).
    Shutdown,
}

pub async fn dispatch(manager: &Manager, request: Request) -> (Response, ConnAction) {
    let kind = request.kind();
    let result = handle(manager, request).await;
    match result {
        Ok((response, action)) => (response, action),
        Err(e) => {
            tracing::debug!(request = kind, error = %e, "request failed");
            (Response::err(e.to_string()), ConnAction::None)
        }
    }
}

async fn handle(manager: &Manager, request: Request) -> Result<(Response, ConnAction), CoreError> {
    let action = ConnAction::None;
    let response = match request {
        Request::Ping => Response::ok("pong"),

        Request::Version => {
            let (version, running_jobs) = manager.version_info();
            Response::ok(VersionData { version, running_jobs })
        }

        Request::List { workdir } => {
            let jobs = manager.list(workdir.as_deref());
            Response::ok(JobsData { jobs })
        }

        Request::Add { command, workdir, env, description, blocked } => {
            let (job, action) = manager.add(command, workdir, env, description, blocked).await?;
            Response::ok(JobActionData { job, action })
        }

        Request::Create { command, workdir, description, blocked } => {
            let job = manager.create(command, workdir, description, blocked).await?;
            Response::ok(JobData { job })
        }

        Request::Start { job_id, env } => {
            let job = manager.start(&JobId::from(job_id), env).await?;
            Response::ok(JobData { job })
        }

        Request::Restart { job_id, env } => {
            let job = manager.restart(&JobId::from(job_id), env).await?;
            Response::ok(JobData { job })
        }

        Request::Stop { job_id, force } => {
            let job_id = JobId::from(job_id);
            let (pid, force) = manager.stop(&job_id, force).await?;
            Response::ok(StopData { job_id: job_id.to_string(), pid, force })
        }

        Request::Signal { job_id, signal } => {
            let job_id = JobId::from(job_id);
            let sig = parse_signal(&signal)?;
            let pid = manager.signal(&job_id, sig).await?;
            Response::ok(SignalData { job_id: job_id.to_string(), pid, signal })
        }

        Request::Remove { job_id } => {
            let job_id = JobId::from(job_id);
            let pid = manager.remove(&job_id).await?;
            Response::ok(RemoveData { job_id: job_id.to_string(), pid })
        }

        Request::RemoveRun { run_id } => {
            let run_id = RunId::from(run_id);
            manager.remove_run(&run_id).await?;
            Response::ok(RemoveRunData { run_id: run_id.to_string() })
        }

        Request::StopAll => {
            let stopped = manager.stop_all().await;
            Response::ok(StopAllData { stopped })
        }

        Request::GetJob { job_id } => {
            let job = manager.get_job(&JobId::from(job_id))?;
            Response::ok(JobData { job })
        }

        Request::Runs { job_id } => {
            let runs = manager.runs(&JobId::from(job_id))?;
            Response::ok(RunsData { runs })
        }

        Request::Stats { job_id } => {
            let job = manager.stats(&JobId::from(job_id))?;
            Response::ok(JobData { job })
        }

        Request::Ports { job_id, workdir } => match job_id {
            Some(job_id) => {
                let job_id = JobId::from(job_id);
                let job = manager.get_job(&job_id)?;
                let ports = if job.is_running() {
                    JobPorts::running(job_id.to_string(), manager.ports(&job_id).await?)
                } else {
                    JobPorts::stopped(job_id.to_string())
                };
                Response::ok(PortsData { ports })
            }
            None => {
                let mut ports = Vec::new();
                for job in manager.list(workdir.as_deref()) {
                    if job.is_running() {
                        let live = manager.ports(&job.id).await?;
                        ports.push(JobPorts::running(job.id.to_string(), live));
                    }
                }
                Response::ok(PortsAllData { ports })
            }
        },

        Request::Subscribe { workdir } => {
            return Ok((Response::ack(), ConnAction::Subscribe { workdir }));
        }

        Request::Shutdown => {
            return Ok((Response::ack(), ConnAction::Shutdown));
        }
    };
    Ok((response, action))
}

/// Parse a signal given by name (`TERM`, `SIGTERM`, case-insensitive) or
/// number (spec §6 `signal <name-or-number>`).
fn parse_signal(input: &str) -> Result<Signal, CoreError> {
    if let Ok(n) = input.parse::<i32>() {
        return Signal::try_from(n).map_err(|_| CoreError::ProtocolError(format!("invalid signal number: {n}")));
    }
    let upper = input.to_uppercase();
    let name = if upper.starts_with("SIG") { upper } else { format!("SIG{upper}") };
    Signal::from_str(&name).map_err(|_| CoreError::ProtocolError(format!("invalid signal name: {input}")))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
