// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn terminal_statuses() {
    assert!(Status::Success.is_terminal());
    assert!(Status::Failed.is_terminal());
    assert!(Status::Exception.is_terminal());
    assert!(!Status::Pending.is_terminal());
    assert!(!Status::Running.is_terminal());
}

#[test]
fn display_matches_wire_literal() {
    assert_eq!(Status::Success.to_string(), "success");
    assert_eq!(Status::Exception.to_string(), "exception");
}

#[test]
fn serializes_lowercase() {
    let json = serde_json::to_string(&Status::Running).unwrap();
    assert_eq!(json, "\"running\"");
}

#[test]
fn default_is_unknown() {
    assert_eq!(Status::default(), Status::Unknown);
}
