// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messages exchanged with the credentials courier (§4.7): the job
//! creator's pre-flight account check, the stage-side credentials
//! request/reply pair, and the rejection notice sent back when either
//! fails.

use mash_core::AccountProvider;
use serde::{Deserialize, Serialize};

/// Published by the job creator before fanning a job out to its stages, to
/// confirm every referenced account (and group member) exists and belongs
/// to `requesting_user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialsJobCheckRequest {
    pub id: String,
    pub provider: AccountProvider,
    #[serde(default)]
    pub provider_accounts: Vec<String>,
    #[serde(default)]
    pub provider_groups: Vec<String>,
    pub requesting_user: String,
    /// Queue the courier publishes an [`InvalidConfigMessage`] to on
    /// failure. Success is silent — acknowledged by the job creator simply
    /// observing no rejection (§4.7).
    pub reply_to: String,
}

/// Published back to the originator (job creator or stage) when a check or
/// factory step fails, naming the job and the offending account names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidConfigMessage {
    pub id: String,
    pub reason: String,
    #[serde(default)]
    pub missing_accounts: Vec<String>,
}

/// A stage's request for the opaque credentials of `accounts`, published to
/// the courier's service queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialsRequestMessage {
    pub job_id: String,
    pub provider: AccountProvider,
    pub accounts: Vec<String>,
    pub reply_to: String,
}

/// The courier's reply, published on the request's `reply_to` queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialsReplyMessage {
    pub credentials: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
#[path = "credentials_messages_tests.rs"]
mod tests;
