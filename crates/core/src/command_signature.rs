// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stable hashing of a job's argv array, used to deduplicate jobs by
//! `(command_signature, workdir)`.

use sha2::{Digest, Sha256};

/// Compute a stable signature for `command`.
///
/// The signature is a hex-encoded SHA-256 digest over the argv tokens
/// joined by a byte that cannot appear inside a single argv token (NUL),
/// so `["a", "bc"]` and `["ab", "c"]` never collide.
pub fn command_signature(command: &[String]) -> String {
    let mut hasher = Sha256::new();
    for (i, token) in command.iter().enumerate() {
        if i > 0 {
            hasher.update([0u8]);
        }
        hasher.update(token.as_bytes());
    }
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[path = "command_signature_tests.rs"]
mod tests;
