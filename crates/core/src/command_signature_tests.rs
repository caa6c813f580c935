// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn same_command_same_signature() {
    let a = vec!["echo".to_string(), "hi".to_string()];
    let b = vec!["echo".to_string(), "hi".to_string()];
    assert_eq!(command_signature(&a), command_signature(&b));
}

#[test]
fn different_commands_differ() {
    let a = vec!["echo".to_string(), "hi".to_string()];
    let b = vec!["echo".to_string(), "bye".to_string()];
    assert_ne!(command_signature(&a), command_signature(&b));
}

#[test]
fn token_boundary_is_not_ambiguous() {
    let a = vec!["ab".to_string(), "c".to_string()];
    let b = vec!["a".to_string(), "bc".to_string()];
    assert_ne!(command_signature(&a), command_signature(&b));
}

#[test]
fn signature_is_hex() {
    let sig = command_signature(&["true".to_string()]);
    assert_eq!(sig.len(), 64);
    assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
}
