// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The credentials courier's message handlers (§4.7). Each handler is a
//! pure function of one incoming message against the shared store, so the
//! broker-consuming loop in [`CredentialsService::run`] stays a thin
//! dispatcher — the same split the teacher keeps between an adapter trait
//! and the router that drives it.

use crate::queues::{ADD_ACCOUNT_QUEUE, DELETE_ACCOUNT_QUEUE, JOB_CHECK_QUEUE};
use crate::store::AccountStore;
use mash_core::MashError;
use mash_transport::{Broker, CREDENTIALS_SERVICE_QUEUE};
use mash_wire::{
    AddAccountMessage, CredentialsJobCheckRequest, CredentialsReplyMessage,
    CredentialsRequestMessage, DeleteAccountMessage, InvalidConfigMessage,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct CredentialsService {
    store: Arc<AccountStore>,
    broker: Arc<dyn Broker>,
}

impl CredentialsService {
    pub fn new(broker: Arc<dyn Broker>) -> Self {
        Self { store: Arc::new(AccountStore::new()), broker }
    }

    pub fn store(&self) -> &Arc<AccountStore> {
        &self.store
    }

    /// Bind every queue this service consumes. Idempotent (`bind_queue`
    /// is idempotent on the broker).
    pub async fn bind_queues(&self) -> Result<(), MashError> {
        for queue in [ADD_ACCOUNT_QUEUE, DELETE_ACCOUNT_QUEUE, JOB_CHECK_QUEUE, CREDENTIALS_SERVICE_QUEUE] {
            self.broker
                .bind_queue(queue)
                .await
                .map_err(|e| MashError::Transport(e.to_string()))?;
        }
        Ok(())
    }

    pub fn handle_add_account(&self, msg: AddAccountMessage) {
        info!(account = %msg.account_name, user = %msg.requesting_user, "add_account");
        self.store.add_account(msg);
    }

    pub fn handle_delete_account(&self, msg: DeleteAccountMessage) {
        info!(account = %msg.account_name, user = %msg.requesting_user, "delete_account");
        self.store.delete_account(msg);
    }

    /// Handles `credentials_job_check`: expand groups, verify ownership,
    /// and publish `invalid_config` on the request's `reply_to` queue if
    /// anything is missing (§4.4 step 3, §4.7).
    pub async fn handle_job_check(&self, req: CredentialsJobCheckRequest) -> Result<(), MashError> {
        let resolved = self.store.expand_accounts(&req.provider_accounts, &req.provider_groups, &req.requesting_user);
        let missing = self.store.check_ownership(&resolved, req.provider, &req.requesting_user);
        if missing.is_empty() {
            return Ok(());
        }
        warn!(id = %req.id, missing = missing.len(), "credentials_job_check failed");
        let notice = InvalidConfigMessage {
            id: req.id,
            reason: "one or more accounts do not exist or are not owned by the requesting user".to_string(),
            missing_accounts: missing.into_iter().map(|m| m.name).collect(),
        };
        self.broker
            .publish(&req.reply_to, serde_json::to_value(notice)?)
            .await
            .map_err(|e| MashError::Transport(e.to_string()))
    }

    /// Handles `credentials_request`: materialise the opaque credentials
    /// for the requested accounts and publish them on `reply_to` (§4.7).
    pub async fn handle_credentials_request(&self, req: CredentialsRequestMessage) -> Result<(), MashError> {
        let credentials = self.store.credentials_for(&req.accounts);
        let reply = CredentialsReplyMessage { credentials };
        self.broker
            .publish(&req.reply_to, serde_json::to_value(reply)?)
            .await
            .map_err(|e| MashError::Transport(e.to_string()))
    }

    /// Receive and dispatch exactly one message from whichever queue has
    /// one ready, in priority order. Exposed for tests and for composing
    /// a real run loop; the binary entry point wraps this in an
    /// unconditional `loop`.
    pub async fn run_once(&self) -> Result<(), MashError> {
        tokio::select! {
            msg = self.broker.recv(ADD_ACCOUNT_QUEUE) => {
                let msg = msg.map_err(|e| MashError::Transport(e.to_string()))?;
                self.handle_add_account(serde_json::from_value(msg)?);
                Ok(())
            }
            msg = self.broker.recv(DELETE_ACCOUNT_QUEUE) => {
                let msg = msg.map_err(|e| MashError::Transport(e.to_string()))?;
                self.handle_delete_account(serde_json::from_value(msg)?);
                Ok(())
            }
            msg = self.broker.recv(JOB_CHECK_QUEUE) => {
                let msg = msg.map_err(|e| MashError::Transport(e.to_string()))?;
                self.handle_job_check(serde_json::from_value(msg)?).await
            }
            msg = self.broker.recv(CREDENTIALS_SERVICE_QUEUE) => {
                let msg = msg.map_err(|e| MashError::Transport(e.to_string()))?;
                self.handle_credentials_request(serde_json::from_value(msg)?).await
            }
        }
    }

    /// Bind every queue, then dispatch messages until the broker is closed.
    pub async fn run(&self) -> Result<(), MashError> {
        self.bind_queues().await?;
        loop {
            self.run_once().await?;
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
