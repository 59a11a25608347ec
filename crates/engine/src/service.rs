// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Listener Service Framework (C5, §4.5) every non-OBS pipeline stage
//! runs: admits `<stage>_job` documents fanned out by the job creator,
//! drives one [`StageJob`] pass per message on the job's listener queue, and
//! forwards the result to the next stage (or notifies, at `last_service`).

use crate::notifier::Notifier;
use crate::record::StageJobRecord;
use mash_adapters::{build_stage_job, CredentialsClient, JobContext, StageJob};
use mash_core::config::CloudDataConfig;
use mash_core::{JobId, MashError, Status, StageDocument, StageName};
use mash_storage::{JobStore, StorageError};
use mash_transport::{
    job_creator_listener_queue, job_delete_queue, listener_queue, service_queue, Broker,
};
use mash_wire::{InvalidConfigMessage, ListenerStatus, StageEnvelope, StatusMessage};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

fn storage_err(e: StorageError) -> MashError {
    MashError::Validation(e.to_string())
}

fn exception_fields(err: &impl std::fmt::Display) -> serde_json::Map<String, Value> {
    let mut fields = serde_json::Map::new();
    fields.insert("msg".to_string(), Value::String(err.to_string()));
    fields
}

fn to_listener_status(status: Status) -> ListenerStatus {
    match status {
        Status::Success => ListenerStatus::Success,
        Status::Failed => ListenerStatus::Error,
        Status::Pending | Status::Running | Status::Unknown | Status::Exception => {
            ListenerStatus::Exception
        }
    }
}

pub struct ListenerService {
    stage: StageName,
    broker: Arc<dyn Broker>,
    cloud_data: CloudDataConfig,
    store: JobStore,
    credentials: CredentialsClient,
    notifier: Arc<dyn Notifier>,
    /// Job table (§5 "process-wide, max_instances=1 per job id"). A job's
    /// presence here is what entitles its task's next pass to publish its
    /// result; `job_delete` removes the entry without aborting the task, so
    /// an in-flight pass simply finds its output discarded once it finishes.
    tasks: Mutex<HashMap<JobId, JoinHandle<()>>>,
}

impl ListenerService {
    pub fn new(
        stage: StageName,
        broker: Arc<dyn Broker>,
        cloud_data: CloudDataConfig,
        job_dir: impl Into<PathBuf>,
        credentials_timeout: Duration,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            stage,
            credentials: CredentialsClient::new(Arc::clone(&broker), credentials_timeout),
            broker,
            cloud_data,
            store: JobStore::new(job_dir),
            notifier,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn bind_queues(&self) -> Result<(), MashError> {
        self.broker
            .bind_queue(&service_queue(self.stage))
            .await
            .map_err(|e| MashError::Transport(e.to_string()))?;
        self.broker
            .bind_queue(&job_delete_queue(self.stage))
            .await
            .map_err(|e| MashError::Transport(e.to_string()))
    }

    /// Resume every job persisted from before a restart. A factory failure
    /// here would mean the job's `cloud` became invalid after admission
    /// already validated it; log and skip rather than treat it as fatal.
    pub async fn resume(self: &Arc<Self>) {
        for record in self.store.scan::<StageJobRecord>() {
            let job = match build_stage_job(self.stage, &record.cloud, &self.cloud_data) {
                Ok(job) => job,
                Err(err) => {
                    warn!(job_id = %record.id, error = %err, "dropping unresumable job on restart");
                    continue;
                }
            };
            if let Err(err) = self.broker.bind_queue(&listener_queue(self.stage, record.id)).await {
                warn!(job_id = %record.id, error = %err, "failed to rebind listener queue on resume");
                continue;
            }
            info!(job_id = %record.id, stage = %self.stage, "resuming stage listener");
            self.spawn_job(job, record);
        }
    }

    /// Admit a `<stage>_job` stage document (§4.5 admission): build the
    /// stage body, bind the job's listener queue, persist, and spawn its
    /// pass loop. A factory error is reported to the job creator and the
    /// job is dropped without being admitted.
    pub async fn handle_job_document(
        self: &Arc<Self>,
        envelope: &StageEnvelope,
    ) -> Result<JobId, MashError> {
        let payload = envelope
            .payload_for(self.stage)
            .ok_or_else(|| MashError::Validation(format!("envelope carries no {} payload", self.stage)))?;
        let document: StageDocument = serde_json::from_value(payload.clone())?;

        if self.tasks.lock().contains_key(&document.id) {
            return Err(MashError::JobAlreadyExists(document.id.to_string()));
        }

        let stage_job = match build_stage_job(self.stage, &document.cloud, &self.cloud_data) {
            Ok(job) => job,
            Err(err) => {
                self.publish_invalid_config(document.id, &err.to_string()).await;
                return Err(err);
            }
        };

        let record = StageJobRecord {
            id: document.id,
            cloud: document.cloud,
            utctime: document.utctime,
            last_service: document.last_service,
            accounts: document.accounts,
            iteration_count: 0,
            status: Status::Pending,
            credentials: HashMap::new(),
            subnet: document.subnet,
            use_root_swap: document.use_root_swap,
        };

        self.broker
            .bind_queue(&listener_queue(self.stage, record.id))
            .await
            .map_err(|e| MashError::Transport(e.to_string()))?;
        self.store.persist(record.id, &record).map_err(storage_err)?;
        let id = record.id;
        self.spawn_job(stage_job, record);
        Ok(id)
    }

    async fn publish_invalid_config(&self, id: JobId, reason: &str) {
        let notice = InvalidConfigMessage { id: id.to_string(), reason: reason.to_string(), missing_accounts: Vec::new() };
        let Ok(payload) = serde_json::to_value(&notice) else { return };
        if let Err(err) = self.broker.publish(&job_creator_listener_queue(id), payload).await {
            warn!(job_id = %id, error = %err, "failed to publish invalid_config to the job creator");
        }
    }

    /// `<stage>_job_delete` (§4.5 cancellation). Removes the job table entry
    /// and unbinds the listener queue, but does not abort the task: a pass
    /// already in flight completes and its output is discarded (§5).
    pub async fn handle_job_delete(&self, id: JobId) -> Result<(), MashError> {
        self.tasks.lock().remove(&id);
        let _ = self.broker.unbind_queue(&listener_queue(self.stage, id)).await;
        self.store.delete(id).map_err(storage_err)
    }

    fn spawn_job(self: &Arc<Self>, stage_job: Box<dyn StageJob>, record: StageJobRecord) {
        let id = record.id;
        let service = Arc::clone(self);
        let handle = tokio::spawn(async move { service.run_job_loop(stage_job, record).await });
        self.tasks.lock().insert(id, handle);
    }

    /// Drives passes for one job: block for the next listener message, run
    /// one pass, forward the result, repeat while the job stays admitted
    /// (§4.5 steps 1-5). Ends the task when the job is retired or deleted.
    async fn run_job_loop(self: Arc<Self>, stage_job: Box<dyn StageJob>, mut record: StageJobRecord) {
        loop {
            let queue = listener_queue(self.stage, record.id);
            let raw = match self.broker.recv(&queue).await {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(job_id = %record.id, error = %err, "listener queue closed under a live job");
                    return;
                }
            };

            let upstream = match parse_upstream(self.stage, raw) {
                Ok(upstream) => upstream,
                Err(err) => {
                    warn!(job_id = %record.id, error = %err, "malformed listener message");
                    self.deliver(&record, ListenerStatus::Exception, exception_fields(&err)).await;
                    self.finish(&record).await;
                    return;
                }
            };

            if !upstream.status.is_success() {
                self.deliver(&record, upstream.status, upstream.fields).await;
                self.finish(&record).await;
                return;
            }

            if stage_job.requires_credentials() && record.credentials.is_empty() {
                match self
                    .credentials
                    .request(record.id, &record.cloud, &record.account_names())
                    .await
                {
                    Ok(creds) => record.credentials = creds,
                    Err(err) => {
                        warn!(job_id = %record.id, error = %err, "credentials request failed");
                        self.deliver(&record, ListenerStatus::Exception, exception_fields(&err)).await;
                        self.finish(&record).await;
                        return;
                    }
                }
            }

            record.iteration_count += 1;
            let ctx = JobContext {
                id: record.id,
                stage: self.stage,
                accounts: record.accounts.clone(),
                iteration_count: record.iteration_count,
                credentials: record.credentials.clone(),
                upstream_fields: upstream.fields,
                subnet: record.subnet.clone(),
                use_root_swap: record.use_root_swap,
            };

            let (status, fields) = match stage_job.run_job(&ctx).await {
                Ok(outcome) => (Status::Success, outcome.fields),
                Err(err) => {
                    warn!(job_id = %record.id, error = %err, "stage job raised an exception");
                    (Status::Exception, exception_fields(&err))
                }
            };
            record.status = status;

            // `job_delete` may have landed while this pass was running. Its
            // output is discarded rather than published or persisted (§5).
            if !self.tasks.lock().contains_key(&record.id) {
                return;
            }

            self.deliver(&record, to_listener_status(status), fields).await;

            if record.is_nonstop() {
                if let Err(err) = self.store.persist(record.id, &record) {
                    warn!(job_id = %record.id, error = %err, "failed to persist nonstop job state");
                }
                continue;
            }

            self.finish(&record).await;
            return;
        }
    }

    /// Publish the pass result to the next stage's listener queue, or — if
    /// this job has no next stage — notify the user directly (§4.5 step 4,
    /// §7).
    async fn deliver(&self, record: &StageJobRecord, status: ListenerStatus, fields: serde_json::Map<String, Value>) {
        if record.last_service == self.stage {
            if status.is_success() {
                self.notifier.notify_success(record.id, self.stage).await;
            } else {
                let message = fields
                    .get("msg")
                    .and_then(Value::as_str)
                    .unwrap_or("stage failed")
                    .to_string();
                self.notifier.notify_failure(record.id, self.stage, &message).await;
            }
            return;
        }

        let Some(next) = self.stage.next() else {
            warn!(job_id = %record.id, stage = %self.stage, "no next stage for a non-terminal job");
            return;
        };

        let message = StatusMessage { id: record.id, status, fields };
        let mut envelope = serde_json::Map::new();
        match serde_json::to_value(&message) {
            Ok(value) => {
                envelope.insert(StatusMessage::result_key(next), value);
            }
            Err(err) => {
                warn!(job_id = %record.id, error = %err, "failed to encode stage result");
                return;
            }
        }

        if let Err(err) = self
            .broker
            .publish(&listener_queue(next, record.id), Value::Object(envelope))
            .await
        {
            warn!(job_id = %record.id, error = %err, "failed to publish stage result downstream");
        }
    }

    /// Job retention (§4.5 step 5): forget the job unless this was a
    /// successful pass of a nonstop job, which `run_job_loop` keeps admitted.
    async fn finish(&self, record: &StageJobRecord) {
        self.tasks.lock().remove(&record.id);
        if let Err(err) = self.store.delete(record.id) {
            warn!(job_id = %record.id, error = %err, "failed to delete retired job state");
        }
    }

    pub async fn run_once(self: &Arc<Self>) -> Result<(), MashError> {
        tokio::select! {
            raw = self.broker.recv(&service_queue(self.stage)) => {
                let raw = raw.map_err(|e| MashError::Transport(e.to_string()))?;
                let envelope: StageEnvelope = serde_json::from_value(raw)?;
                match self.handle_job_document(&envelope).await {
                    Ok(_) => {}
                    Err(err @ MashError::Validation(_)) | Err(err @ MashError::JobAlreadyExists(_)) => {
                        warn!(error = %err, stage = %self.stage, "rejected stage job document");
                    }
                    Err(err) => return Err(err),
                }
            }
            raw = self.broker.recv(&job_delete_queue(self.stage)) => {
                let raw = raw.map_err(|e| MashError::Transport(e.to_string()))?;
                let id: JobId = serde_json::from_value(raw["id"].clone())?;
                self.handle_job_delete(id).await?;
            }
        }
        Ok(())
    }

    pub async fn run(self: &Arc<Self>) -> Result<(), MashError> {
        self.bind_queues().await?;
        self.resume().await;
        loop {
            self.run_once().await?;
        }
    }
}

struct Upstream {
    status: ListenerStatus,
    fields: serde_json::Map<String, Value>,
}

/// Parse the `<stage>_result` status message this stage's own listener
/// queue carries (§4.5 step 1). The result key names the *receiving* stage,
/// matching what the previous stage published.
fn parse_upstream(stage: StageName, raw: Value) -> Result<Upstream, MashError> {
    let key = StatusMessage::result_key(stage);
    let value = raw
        .get(&key)
        .ok_or_else(|| MashError::Validation(format!("listener message missing `{key}`")))?;
    let message: StatusMessage = serde_json::from_value(value.clone())?;
    Ok(Upstream {
        status: message.status,
        fields: message.fields,
    })
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
