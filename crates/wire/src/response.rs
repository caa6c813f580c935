// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Response envelope and payload catalog (spec §4.6).
//!
//! `data` is a `serde_json::Value`: the caller already knows, from the
//! `Request` variant it sent, which of the structs below to decode it as.
//! This avoids an untagged `data` enum, whose variants would otherwise
//! overlap structurally (e.g. `Stop` and `Signal` both carry a `job_id` and
//! a `pid`) and make deserialization ambiguous.

use oj_core::job::{Job, PortInfo, Run};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of an `add` request (spec §4.4 `Add`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddAction {
    Created,
    Started,
    AlreadyRunning,
}

/// Live or stopped-envelope port listing for one job (spec §4.6 `ports`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPorts {
    pub job_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub ports: Vec<PortInfo>,
}

impl JobPorts {
    pub fn stopped(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: "stopped".to_string(),
            message: Some("job is not running".to_string()),
            ports: Vec::new(),
        }
    }

    pub fn running(job_id: impl Into<String>, ports: Vec<PortInfo>) -> Self {
        Self { job_id: job_id.into(), status: "running".to_string(), message: None, ports }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionData {
    pub version: String,
    pub running_jobs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsData {
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobData {
    pub job: Job,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobActionData {
    pub job: Job,
    pub action: AddAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopData {
    pub job_id: String,
    pub pid: u32,
    pub force: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalData {
    pub job_id: String,
    pub pid: u32,
    pub signal: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveData {
    pub job_id: String,
    pub pid: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRunData {
    pub run_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopAllData {
    pub stopped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunsData {
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortsData {
    pub ports: JobPorts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortsAllData {
    pub ports: Vec<JobPorts>,
}

/// `{success, error?, data?}` (spec §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Response {
    pub fn ok(data: impl Serialize) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(serde_json::to_value(data).unwrap_or(Value::Null)),
        }
    }

    /// Success with no data, used for `subscribe`'s initial ack and for
    /// `shutdown`.
    pub fn ack() -> Self {
        Self { success: true, error: None, data: None }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self { success: false, error: Some(message.into()), data: None }
    }

    /// Decode `data` into `T`, for callers that already know the expected
    /// shape from the request they sent.
    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> Option<T> {
        self.data.clone().and_then(|v| serde_json::from_value(v).ok())
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
