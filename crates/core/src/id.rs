// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job and run identifiers.
//!
//! Job ids are short, user-facing, random base-62 strings generated with an
//! explicit collision check against the caller's current id set (spec §3.2).
//! Run ids are derived deterministically as `<job_id>-<seq>` and never
//! collide by construction, since `seq` is monotone per job.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Length of a generated job id, in characters.
pub const JOB_ID_LEN: usize = 3;

const ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Returns a string slice truncated to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    if s.len() <= n {
        s
    } else {
        &s[..n]
    }
}

/// Unique identifier for a [`crate::job::Job`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generate a random job id that does not collide with `existing`.
    ///
    /// Retries with a fresh candidate on collision; the id space
    /// (62^3 = 238,328 combinations) makes repeated collisions vanishingly
    /// unlikely for the lifetime of a single daemon.
    pub fn generate(existing: &HashSet<JobId>) -> Self {
        let alphabet: Vec<char> = ALPHABET.chars().collect();
        loop {
            let candidate = nanoid::nanoid!(JOB_ID_LEN, &alphabet);
            let candidate = JobId(candidate);
            if !existing.contains(&candidate) {
                return candidate;
            }
        }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        JobId(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        JobId(s)
    }
}

impl std::borrow::Borrow<str> for JobId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a [`crate::job::Run`], derived as `<job_id>-<seq>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the run id for `job_id`'s `seq`'th run.
    pub fn new(job_id: &JobId, seq: u64) -> Self {
        RunId(format!("{}-{}", job_id.as_str(), seq))
    }

    /// Recover the owning job id by stripping the trailing `-<seq>`.
    pub fn job_id(&self) -> JobId {
        match self.0.rsplit_once('-') {
            Some((job, _seq)) => JobId(job.to_string()),
            None => JobId(self.0.clone()),
        }
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        RunId(s.to_string())
    }
}

impl From<String> for RunId {
    fn from(s: String) -> Self {
        RunId(s)
    }
}

impl std::borrow::Borrow<str> for RunId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
