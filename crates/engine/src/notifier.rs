// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-visible success/failure notifications (§7): sent once a job reaches
//! its `last_service` and that stage's pass finishes. Real delivery
//! (SMTP, etc.) is out of scope; `LoggingNotifier` is the one implementation
//! carried here.

use async_trait::async_trait;
use mash_core::{JobId, StageName};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_success(&self, id: JobId, stage: StageName);
    async fn notify_failure(&self, id: JobId, stage: StageName, message: &str);
}

/// Logs the outcome instead of sending anything. Every stage service uses
/// this until a real transport (email, webhook) is wired in.
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify_success(&self, id: JobId, stage: StageName) {
        tracing::info!(job_id = %id, %stage, "job reached its last service successfully");
    }

    async fn notify_failure(&self, id: JobId, stage: StageName, message: &str) {
        tracing::warn!(job_id = %id, %stage, %message, "job failed");
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
