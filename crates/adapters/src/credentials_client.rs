// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The stage-side client for requesting credentials from the courier (C7,
//! §4.5 step 2, §4.7). One reply queue is bound per request rather than
//! reused across a job's lifetime, so a stale reply from an earlier
//! connection can never be delivered into a later request (see DESIGN.md's
//! "credentials queue drain on reconnect" decision).

use mash_core::{JobId, MashError};
use mash_transport::{credentials_queue, Broker, CREDENTIALS_SERVICE_QUEUE};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct CredentialsClient {
    broker: Arc<dyn Broker>,
    timeout: Duration,
}

impl CredentialsClient {
    pub fn new(broker: Arc<dyn Broker>, timeout: Duration) -> Self {
        Self { broker, timeout }
    }

    /// Request credentials for `accounts` on behalf of `job_id`, bounded by
    /// the configured timeout. Times out into [`MashError::CredentialsTimeout`]
    /// (§7), which the caller turns into an `EXCEPTION` status (§4.5 step 2).
    pub async fn request(
        &self,
        job_id: JobId,
        provider: &str,
        accounts: &[String],
    ) -> Result<HashMap<String, Value>, MashError> {
        let reply_queue = credentials_queue(job_id);
        self.broker
            .bind_queue(&reply_queue)
            .await
            .map_err(|e| MashError::Transport(e.to_string()))?;

        let request = json!({
            "job_id": job_id,
            "provider": provider,
            "accounts": accounts,
            "reply_to": reply_queue,
        });
        self.broker
            .publish(CREDENTIALS_SERVICE_QUEUE, request)
            .await
            .map_err(|e| MashError::Transport(e.to_string()))?;

        let result = tokio::time::timeout(self.timeout, self.broker.recv(&reply_queue)).await;

        let _ = self.broker.unbind_queue(&reply_queue).await;

        match result {
            Ok(Ok(reply)) => parse_reply(reply),
            Ok(Err(e)) => Err(MashError::Transport(e.to_string())),
            Err(_elapsed) => Err(MashError::CredentialsTimeout(self.timeout)),
        }
    }
}

fn parse_reply(reply: Value) -> Result<HashMap<String, Value>, MashError> {
    reply
        .get("credentials")
        .and_then(|c| c.as_object())
        .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .ok_or_else(|| MashError::Validation("credentials reply missing `credentials` object".to_string()))
}

#[cfg(test)]
#[path = "credentials_client_tests.rs"]
mod tests;
