// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The stand-in stage body for a (stage, cloud) pair the cloud doesn't need
//! — e.g. GCE has no separate publish stage (§4.6, §9).

use async_trait::async_trait;
use mash_core::MashError;

use crate::stage_job::{JobContext, RunOutcome, StageJob};

/// Succeeds immediately, carrying the upstream fields through unchanged
/// (the round-trip property in §8: "a stage whose run_job is NoOp forwards
/// the prior status unchanged").
pub struct NoOp;

#[async_trait]
impl StageJob for NoOp {
    fn requires_credentials(&self) -> bool {
        false
    }

    async fn run_job(&self, ctx: &JobContext) -> Result<RunOutcome, MashError> {
        Ok(RunOutcome {
            fields: ctx.upstream_fields.clone(),
        })
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
