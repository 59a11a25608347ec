// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The listener (status) message a stage publishes for its successor (§6):
//! `{<stage>_result: {id, status, ...}}`.

use mash_core::{JobId, StageName};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upstream status as carried on the listener queue. Distinct from
/// [`mash_core::Status`]: the wire only ever speaks `success`/`error`/
/// `exception`, never the in-flight states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerStatus {
    Success,
    Error,
    Exception,
}

impl ListenerStatus {
    pub fn is_success(self) -> bool {
        matches!(self, ListenerStatus::Success)
    }
}

/// A status message as published to `<stage>.listener_<id>` (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub id: JobId,
    pub status: ListenerStatus,
    /// Stage-declared arguments beyond id/status, e.g. `cloud_image_name`,
    /// `source_regions` — shape varies per stage (§4.5 step 1).
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

impl StatusMessage {
    /// The envelope key this message is wrapped under, e.g. `upload_result`.
    pub fn result_key(stage: StageName) -> String {
        format!("{stage}_result")
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
