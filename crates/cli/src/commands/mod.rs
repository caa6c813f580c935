// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations (spec §6).

pub mod admin;
pub mod await_cmd;
pub mod job_actions;
pub mod list;
pub mod logs;
pub mod ports;
pub mod runs;
pub mod stats;

/// Parse `KEY=VALUE` for `--env` repeatable flags.
pub fn parse_env_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) => Ok((k.to_string(), v.to_string())),
        None => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// Resolve the workdir for a command: `--workdir` if given, else the
/// canonicalized current directory.
pub fn resolve_workdir(workdir: Option<String>) -> anyhow::Result<String> {
    match workdir {
        Some(w) => Ok(w),
        None => {
            let cwd = std::env::current_dir()?;
            Ok(cwd.to_string_lossy().into_owned())
        }
    }
}
