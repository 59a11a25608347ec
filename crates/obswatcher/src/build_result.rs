// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-job build-result state (§3) a watcher mutates across passes and
//! persists to its job file.

use crate::conditions::ConditionResult;
use mash_core::simple_display;
use serde::{Deserialize, Serialize};

/// The build-result-specific status vocabulary (§3): narrower than
/// [`mash_core::Status`], which covers every stage's pass lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildJobStatus {
    Prepared,
    Success,
    Failed,
}

simple_display! {
    BuildJobStatus {
        Prepared => "prepared",
        Success => "success",
        Failed => "failed",
    }
}

/// `{version, packages_checksum, conditions[], job_status, image_source}` (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResultState {
    pub version: String,
    pub packages_checksum: String,
    #[serde(default)]
    pub conditions: Vec<SerializableCondition>,
    pub job_status: BuildJobStatus,
    #[serde(default)]
    pub image_source: Vec<String>,
}

/// [`ConditionResult`] flattened to its boolean status for persistence; the
/// condition definition itself lives on the submitted job document, not the
/// mutable build-result state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableCondition {
    pub status: bool,
}

impl From<&ConditionResult> for SerializableCondition {
    fn from(result: &ConditionResult) -> Self {
        Self { status: result.status }
    }
}

impl BuildResultState {
    pub fn prepared() -> Self {
        Self {
            version: "unknown".to_string(),
            packages_checksum: "unknown".to_string(),
            conditions: Vec::new(),
            job_status: BuildJobStatus::Prepared,
            image_source: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "build_result_tests.rs"]
mod tests;
