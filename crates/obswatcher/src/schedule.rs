// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsing a job's `utctime` into a scheduling mode (§4.3): run once now,
//! run once at a given instant, or poll forever on an interval.

use chrono::{DateTime, Utc};
use mash_core::MashError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Schedule {
    Immediate,
    At(DateTime<Utc>),
    Nonstop,
}

/// `"now"` runs once immediately; `"always"` polls forever; anything else
/// must parse as RFC 3339 and schedules a single run at that instant.
pub fn parse_schedule(utctime: &str) -> Result<Schedule, MashError> {
    match utctime {
        "now" => Ok(Schedule::Immediate),
        "always" => Ok(Schedule::Nonstop),
        other => DateTime::parse_from_rfc3339(other)
            .map(|dt| Schedule::At(dt.with_timezone(&Utc)))
            .map_err(|e| MashError::Validation(format!("invalid utctime {other:?}: {e}"))),
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
