// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The persisted per-job state a [`crate::service::ListenerService`] carries
//! across passes (C6, §4.6): everything `run_job` needs besides the stage
//! body itself, plus what's saved to disk so a restart can resume exactly
//! where a job left off.

use mash_core::{Account, JobId, Status};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One job admitted into a stage's listener service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageJobRecord {
    pub id: JobId,
    pub cloud: String,
    pub utctime: String,
    pub last_service: mash_core::StageName,
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub iteration_count: u64,
    #[serde(default)]
    pub status: Status,
    /// Opaque per-account credentials, requested once and held for the
    /// lifetime of a nonstop job's repeated passes (§4.5 step 2).
    #[serde(default)]
    pub credentials: HashMap<String, Value>,
    /// EC2: job-level subnet override, carried from the admitted stage
    /// document into every pass's [`mash_adapters::JobContext`].
    #[serde(default)]
    pub subnet: Option<String>,
    #[serde(default)]
    pub use_root_swap: bool,
}

impl StageJobRecord {
    pub fn account_names(&self) -> Vec<String> {
        self.accounts.iter().map(|a| a.name.clone()).collect()
    }

    /// Whether this job stays admitted after a pass completes (§4.5 step 5).
    pub fn is_nonstop(&self) -> bool {
        self.utctime == "always"
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
