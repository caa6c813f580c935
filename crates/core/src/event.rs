// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job/run state-change events fanned out to subscribed clients (spec §4.5).
//!
//! Every state-mutating [`crate::job`] operation builds one of these while
//! holding the manager's lock, so the snapshot it carries is always
//! consistent with the mutation that produced it; the event is then handed
//! to the bus for asynchronous delivery.

use serde::{Deserialize, Serialize};

use crate::id::JobId;
use crate::job::{Job, PortInfo, Run};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    JobAdded,
    JobStarted,
    JobStopped,
    JobUpdated,
    JobRemoved,
    RunStarted,
    RunStopped,
    RunRemoved,
    PortsUpdated,
}

crate::simple_display! {
    EventKind {
        JobAdded => "job_added",
        JobStarted => "job_started",
        JobStopped => "job_stopped",
        JobUpdated => "job_updated",
        JobRemoved => "job_removed",
        RunStarted => "run_started",
        RunStopped => "run_stopped",
        RunRemoved => "run_removed",
        PortsUpdated => "ports_updated",
    }
}

/// A single state-change notification, as delivered to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub job_id: JobId,
    /// Full job snapshot as of the moment the event was emitted.
    pub job: Job,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<Run>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<PortInfo>>,
    pub job_count: usize,
    pub running_job_count: usize,
}

impl Event {
    pub fn new(kind: EventKind, job: Job, counts: (usize, usize)) -> Self {
        Self {
            kind,
            job_id: job.id.clone(),
            job,
            run: None,
            ports: None,
            job_count: counts.0,
            running_job_count: counts.1,
        }
    }

    pub fn with_run(mut self, run: Run) -> Self {
        self.run = Some(run);
        self
    }

    pub fn with_ports(mut self, ports: Vec<PortInfo>) -> Self {
        self.ports = Some(ports);
        self
    }

    /// The workdir this event belongs to, used by subscriber filtering.
    pub fn workdir(&self) -> &str {
        &self.job.workdir
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
