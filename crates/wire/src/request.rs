// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request catalog (spec §4.6, §6). One variant per request type; the
//! internally-tagged `type`/`payload` shape matches a frame's `{type,
//! payload}` envelope directly under serde's `tag`/`content` attributes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Request {
    Ping,
    Version,
    List {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        workdir: Option<String>,
    },
    Add {
        command: Vec<String>,
        workdir: String,
        #[serde(default)]
        env: HashMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        blocked: Option<bool>,
    },
    Create {
        command: Vec<String>,
        workdir: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        blocked: Option<bool>,
    },
    Start {
        job_id: String,
        #[serde(default)]
        env: HashMap<String, String>,
    },
    Restart {
        job_id: String,
        #[serde(default)]
        env: HashMap<String, String>,
    },
    Stop {
        job_id: String,
        #[serde(default)]
        force: bool,
    },
    Signal {
        job_id: String,
        signal: String,
    },
    Remove {
        job_id: String,
    },
    RemoveRun {
        run_id: String,
    },
    StopAll,
    GetJob {
        job_id: String,
    },
    Runs {
        job_id: String,
    },
    Stats {
        job_id: String,
    },
    Ports {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        job_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        workdir: Option<String>,
    },
    Subscribe {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        workdir: Option<String>,
    },
    Shutdown,
}

impl Request {
    /// The `type` discriminant, as it appears on the wire, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Ping => "ping",
            Request::Version => "version",
            Request::List { .. } => "list",
            Request::Add { .. } => "add",
            Request::Create { .. } => "create",
            Request::Start { .. } => "start",
            Request::Restart { .. } => "restart",
            Request::Stop { .. } => "stop",
            Request::Signal { .. } => "signal",
            Request::Remove { .. } => "remove",
            Request::RemoveRun { .. } => "remove_run",
            Request::StopAll => "stop_all",
            Request::GetJob { .. } => "get_job",
            Request::Runs { .. } => "runs",
            Request::Stats { .. } => "stats",
            Request::Ports { .. } => "ports",
            Request::Subscribe { .. } => "subscribe",
            Request::Shutdown => "shutdown",
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
