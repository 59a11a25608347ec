// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job and pass status.

use crate::simple_display;
use serde::{Deserialize, Serialize};

/// Status of a job, or of a single pass through a stage.
///
/// Transitions are monotone within one pass: a job only moves forward
/// through `PENDING -> RUNNING -> {SUCCESS, FAILED, EXCEPTION}`. A retried
/// pass resets to `PENDING` but keeps its id and persisted credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Unknown,
    Pending,
    Running,
    Success,
    Failed,
    Exception,
}

simple_display! {
    Status {
        Unknown => "unknown",
        Pending => "pending",
        Running => "running",
        Success => "success",
        Failed => "failed",
        Exception => "exception",
    }
}

impl Status {
    /// Whether this status represents a pass that has finished (successfully
    /// or not) rather than one still in flight.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Success | Status::Failed | Status::Exception)
    }

    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Unknown
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
