// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The abstract per-job object every stage implements (C6, §4.6).

use async_trait::async_trait;
use mash_core::{Account, JobId, MashError, StageName};
use serde_json::Value;

/// Everything a stage job's `run_job` needs to act: the id, the accounts it
/// targets, and whatever the previous stage left in its status message.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub id: JobId,
    pub stage: StageName,
    pub accounts: Vec<Account>,
    pub iteration_count: u64,
    /// Opaque per-account credentials, populated by the framework before
    /// `run_job` is invoked, if this stage declared it needs them.
    pub credentials: std::collections::HashMap<String, Value>,
    /// Fields the prior stage's status message carried (`status_msg` in
    /// §4.6), e.g. `cloud_image_name`, `source_regions`.
    pub upstream_fields: serde_json::Map<String, Value>,
    /// EC2: job-level subnet override for the uploader's helper instance.
    pub subnet: Option<String>,
    /// EC2: swap the helper image for the target account's `root_swap_ami`.
    pub use_root_swap: bool,
}

/// What `run_job` hands back to the framework: fields to publish on this
/// stage's own status message for the next stage (§4.6 step d).
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub fields: serde_json::Map<String, Value>,
}

impl RunOutcome {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

/// A stage's pluggable execution body. One implementation per (stage,
/// cloud) pair; `NoOp` fills pairs a cloud doesn't need (§4.6, §9).
#[async_trait]
pub trait StageJob: Send + Sync {
    /// Whether this stage body needs credentials before `run_job` runs
    /// (§4.5 step 2). GCE replication, for example, declares `false`.
    fn requires_credentials(&self) -> bool {
        true
    }

    async fn run_job(&self, ctx: &JobContext) -> Result<RunOutcome, MashError>;
}

#[cfg(test)]
#[path = "stage_job_tests.rs"]
mod tests;
