// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job creator's message handlers (§4.4): admission of a submitted job
//! document, per-stage document fan-out, job deletion, and account
//! lifecycle forwarding to the credentials courier.

use crate::directory::AccountDirectory;
use crate::queues::{job_delete_queue, listener_queue, JOB_DELETE_QUEUE, JOB_DOCUMENT_QUEUE};
use crate::stage_documents::{build_credentials_check, build_stage_documents};
use mash_core::config::CloudDataConfig;
use mash_core::{JobDocument, JobId, MashError, StageDocument, StageName, PIPELINE_ORDER};
use mash_transport::{service_queue, Broker};
use mash_wire::{AddAccountMessage, DeleteAccountMessage, StageEnvelope};
use std::sync::Arc;
use tracing::{info, warn};

pub struct JobCreatorService {
    directory: Arc<AccountDirectory>,
    broker: Arc<dyn Broker>,
    cloud_data: CloudDataConfig,
}

impl JobCreatorService {
    pub fn new(broker: Arc<dyn Broker>, cloud_data: CloudDataConfig) -> Self {
        Self { directory: Arc::new(AccountDirectory::new()), broker, cloud_data }
    }

    pub fn directory(&self) -> &Arc<AccountDirectory> {
        &self.directory
    }

    pub async fn bind_queues(&self) -> Result<(), MashError> {
        self.broker
            .bind_queue(JOB_DOCUMENT_QUEUE)
            .await
            .map_err(|e| MashError::Transport(e.to_string()))?;
        self.broker
            .bind_queue(JOB_DELETE_QUEUE)
            .await
            .map_err(|e| MashError::Transport(e.to_string()))
    }

    /// Admits a submitted job document (§4.4 steps 1-5): assign an id if
    /// absent, resolve target accounts, publish the credentials bootstrap
    /// check, then fan out one document per stage up to `last_service`.
    /// Returns the assigned id.
    pub async fn handle_job_document(&self, mut doc: JobDocument) -> Result<JobId, MashError> {
        let id = doc.id.unwrap_or_else(JobId::new);
        doc.id = Some(id);

        let accounts = self.directory.resolve_target_accounts(&doc)?;

        let reply_to = listener_queue(id);
        self.broker
            .bind_queue(&reply_to)
            .await
            .map_err(|e| MashError::Transport(e.to_string()))?;
        let check = build_credentials_check(&doc, id, reply_to)?;
        self.broker
            .publish(mash_credentials::JOB_CHECK_QUEUE, serde_json::to_value(check)?)
            .await
            .map_err(|e| MashError::Transport(e.to_string()))?;

        let stage_documents = build_stage_documents(&doc, id, &accounts, &self.cloud_data)?;
        for (stage, stage_document) in stage_documents {
            self.publish_stage_document(stage, stage_document).await?;
        }

        info!(%id, last_service = %doc.last_service, "admitted job");
        Ok(id)
    }

    async fn publish_stage_document(&self, stage: StageName, document: StageDocument) -> Result<(), MashError> {
        let envelope = StageEnvelope::wrap(stage, serde_json::to_value(document)?);
        self.broker
            .publish(&service_queue(stage), serde_json::to_value(envelope)?)
            .await
            .map_err(|e| MashError::Transport(e.to_string()))
    }

    /// Fans a `job_delete` out to every stage in the pipeline so each can
    /// forget the job, regardless of which ones actually admitted it
    /// (§4.4 step 6).
    pub async fn handle_job_delete(&self, id: JobId) -> Result<(), MashError> {
        let payload = serde_json::json!({"id": id});
        for stage in PIPELINE_ORDER {
            self.broker
                .publish(&job_delete_queue(stage), payload.clone())
                .await
                .map_err(|e| MashError::Transport(e.to_string()))?;
        }
        Ok(())
    }

    /// Account lifecycle messages are mirrored into this service's own
    /// directory and forwarded verbatim to the credentials courier (§4.4).
    pub async fn handle_add_account(&self, msg: AddAccountMessage) -> Result<(), MashError> {
        self.directory.add_account(msg.clone());
        self.broker
            .publish(mash_credentials::ADD_ACCOUNT_QUEUE, serde_json::to_value(msg)?)
            .await
            .map_err(|e| MashError::Transport(e.to_string()))
    }

    pub async fn handle_delete_account(&self, msg: DeleteAccountMessage) -> Result<(), MashError> {
        self.directory.delete_account(msg.clone());
        self.broker
            .publish(mash_credentials::DELETE_ACCOUNT_QUEUE, serde_json::to_value(msg)?)
            .await
            .map_err(|e| MashError::Transport(e.to_string()))
    }

    /// Receive and dispatch one message from whichever queue has one
    /// ready. Validation failures are logged and dropped (§4.4: "Reject on
    /// malformed JSON... or schema error").
    pub async fn run_once(&self) -> Result<(), MashError> {
        tokio::select! {
            raw = self.broker.recv(JOB_DOCUMENT_QUEUE) => {
                let raw = raw.map_err(|e| MashError::Transport(e.to_string()))?;
                let doc: JobDocument = serde_json::from_value(raw)?;
                match self.handle_job_document(doc).await {
                    Ok(_) => {}
                    Err(err @ MashError::Validation(_)) => {
                        warn!(error = %err, "rejected malformed job document");
                    }
                    Err(err) => return Err(err),
                }
            }
            raw = self.broker.recv(JOB_DELETE_QUEUE) => {
                let raw = raw.map_err(|e| MashError::Transport(e.to_string()))?;
                let id: JobId = serde_json::from_value(raw["id"].clone())?;
                self.handle_job_delete(id).await?;
            }
        }
        Ok(())
    }

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
