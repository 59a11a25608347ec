// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue-naming conventions shared by every stage service (§4.1).

use mash_core::{JobId, StageName};

/// `<service>.service` — the stage's durable main inbox.
pub fn service_queue(stage: StageName) -> String {
    format!("{stage}.service")
}

/// `<service>.listener_<jobId>` — bound on admission, unbound on deletion.
pub fn listener_queue(stage: StageName, id: JobId) -> String {
    format!("{stage}.listener_{id}")
}

/// `credentials.<jobId>` — short-lived reply channel for one credentials
/// request.
pub fn credentials_queue(id: JobId) -> String {
    format!("credentials.{id}")
}

/// The credentials courier's durable main inbox for `credentials_request`
/// messages (§4.7). Account lifecycle messages (`add_account`,
/// `delete_account`) and the job creator's pre-flight check use their own
/// dedicated queues, declared by `mash-credentials`.
pub const CREDENTIALS_SERVICE_QUEUE: &str = "credentials.service";

/// `<stage>.job_delete` — published by the job creator to every pipeline
/// stage on job deletion (§4.4 step 6), regardless of which ones actually
/// admitted the job.
pub fn job_delete_queue(stage: StageName) -> String {
    format!("{stage}.job_delete")
}

/// `jobcreator.listener_<jobId>` — the job creator's own listener queue, the
/// destination for an `invalid_config` notice a stage publishes back when a
/// job document it was fanned fails to admit (§4.5 "on factory error,
/// publish invalid_config... and drop").
pub fn job_creator_listener_queue(id: JobId) -> String {
    format!("jobcreator.listener_{id}")
}

#[cfg(test)]
#[path = "queue_names_tests.rs"]
mod tests;
