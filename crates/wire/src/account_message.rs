// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Account lifecycle messages (§6), forwarded by the job creator's listener
//! queue to the credentials courier.

use mash_core::account::CloudAccountOverrides;
use mash_core::AccountProvider;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddAccountMessage {
    pub account_name: String,
    pub credentials: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub group: Option<String>,
    pub provider: AccountProvider,
    pub requesting_user: String,
    #[serde(flatten)]
    pub overrides: CloudAccountOverrides,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAccountMessage {
    pub account_name: String,
    pub provider: AccountProvider,
    pub requesting_user: String,
}

#[cfg(test)]
#[path = "account_message_tests.rs"]
mod tests;
