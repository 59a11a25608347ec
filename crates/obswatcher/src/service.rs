// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build-Result Watcher (C3): admits `obs_job` documents, spawns one
//! polling task per job, and publishes to the uploader's listener queue on
//! a complied pass (§4.3).

use crate::build_result::BuildResultState;
use crate::client::BuildServiceClient;
use crate::schedule::{parse_schedule, Schedule};
use crate::watcher::{run_pass, ObsJob};
use mash_core::{Condition, JobId, MashError, StageDocument, StageName};
use mash_storage::{DoneStore, JobStore, StorageError};
use mash_transport::{job_delete_queue, listener_queue, service_queue, Broker};
use mash_wire::{ListenerStatus, StageEnvelope, StatusMessage};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
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

/// On-disk representation of an admitted watcher: its immutable job
/// description, the schedule derived from `utctime`, and its last observed
/// build-result state (§4.2: restart must resume exactly the jobs that were
/// admitted before the process died).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedJob {
    job: ObsJob,
    schedule: Schedule,
    state: BuildResultState,
}

pub struct ObsWatcherService {
    broker: Arc<dyn Broker>,
    client: Arc<dyn BuildServiceClient>,
    store: JobStore,
    done: DoneStore,
    poll_interval: Duration,
    download_dir: PathBuf,
    tasks: Mutex<HashMap<JobId, JoinHandle<()>>>,
}

impl ObsWatcherService {
    pub fn new(
        broker: Arc<dyn Broker>,
        client: Arc<dyn BuildServiceClient>,
        job_dir: impl Into<PathBuf>,
        done_dir: impl Into<PathBuf>,
        poll_interval: Duration,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            broker,
            client,
            store: JobStore::new(job_dir),
            done: DoneStore::new(done_dir),
            poll_interval,
            download_dir: download_dir.into(),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn bind_queues(&self) -> Result<(), MashError> {
        self.broker
            .bind_queue(&service_queue(StageName::Obs))
            .await
            .map_err(|e| MashError::Transport(e.to_string()))?;
        self.broker
            .bind_queue(&job_delete_queue(StageName::Obs))
            .await
            .map_err(|e| MashError::Transport(e.to_string()))
    }

    /// Resume every watcher persisted from before a restart (§4.2).
    pub fn resume(self: &Arc<Self>) {
        for persisted in self.store.scan::<PersistedJob>() {
            info!(job_id = %persisted.job.id, "resuming obs watcher");
            self.spawn_watcher(persisted.job, persisted.schedule, persisted.state);
        }
    }

    /// Admit an `obs_job` stage document: parse its fields, persist the
    /// initial state, and spawn its polling task.
    pub fn handle_job_document(self: &Arc<Self>, envelope: &StageEnvelope) -> Result<JobId, MashError> {
        let payload = envelope
            .payload_for(StageName::Obs)
            .ok_or_else(|| MashError::Validation("envelope carries no obs_job payload".to_string()))?;
        let document: StageDocument = serde_json::from_value(payload.clone())?;

        if self.tasks.lock().contains_key(&document.id) {
            return Err(MashError::JobAlreadyExists(document.id.to_string()));
        }

        let image = field_string(&document, "image")?;
        let project = field_string(&document, "project")?;
        let conditions: Vec<Condition> = match document.fields.get("conditions") {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Vec::new(),
        };
        let schedule = parse_schedule(&document.utctime)?;

        let job = ObsJob {
            id: document.id,
            project,
            package: image,
            conditions,
            nonstop: matches!(schedule, Schedule::Nonstop),
        };

        let state = BuildResultState::prepared();
        self.store
            .persist(job.id, &PersistedJob { job: job.clone(), schedule, state: state.clone() })
            .map_err(storage_err)?;
        self.spawn_watcher(job.clone(), schedule, state);
        Ok(job.id)
    }

    /// `<stage>_job_delete`: stop the watcher and forget the job (§4.3, §4.5
    /// cancellation). Idempotent.
    pub fn handle_job_delete(&self, id: JobId) -> Result<(), MashError> {
        if let Some(handle) = self.tasks.lock().remove(&id) {
            handle.abort();
        }
        self.store.delete(id).map_err(storage_err)
    }

    fn spawn_watcher(self: &Arc<Self>, job: ObsJob, schedule: Schedule, initial_state: BuildResultState) {
        let id = job.id;
        let service = Arc::clone(self);
        let handle = tokio::spawn(async move { service.run_watcher(job, schedule, initial_state).await });
        self.tasks.lock().insert(id, handle);
    }

    async fn run_watcher(self: Arc<Self>, job: ObsJob, schedule: Schedule, mut state: BuildResultState) {
        if let Schedule::At(when) = schedule {
            let now = chrono::Utc::now();
            if when > now {
                tokio::time::sleep((when - now).to_std().unwrap_or(Duration::ZERO)).await;
            }
        }

        loop {
            let outcome = match run_pass(&job, self.client.as_ref(), &self.download_dir).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(job_id = %job.id, error = %err, "obs pass aborted by a configuration error");
                    let _ = self.store.delete(job.id);
                    self.tasks.lock().remove(&job.id);
                    return;
                }
            };
            state = outcome.state;

            if let Some(image_source) = &outcome.publish {
                if let Err(err) = self.publish_success(job.id, image_source).await {
                    warn!(job_id = %job.id, error = %err, "failed to publish obs result downstream");
                }
            }

            if outcome.retire {
                if let Err(err) = self.done.retire(job.id, &state) {
                    warn!(job_id = %job.id, error = %err, "failed to retire obs watcher");
                }
                let _ = self.store.delete(job.id);
                self.tasks.lock().remove(&job.id);
                return;
            }

            let _ = self
                .store
                .persist(job.id, &PersistedJob { job: job.clone(), schedule, state: state.clone() });

            if !job.nonstop {
                // A one-shot job that did not comply stays admitted but is
                // never polled again; only `job_delete` or a later restart
                // of the service, re-admitting it, moves it forward.
                return;
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn publish_success(&self, id: JobId, image_source: &[String]) -> Result<(), MashError> {
        let status = StatusMessage {
            id,
            status: ListenerStatus::Success,
            fields: serde_json::Map::from_iter([(
                "image_source".to_string(),
                serde_json::to_value(image_source)?,
            )]),
        };
        let mut envelope = serde_json::Map::new();
        envelope.insert(StatusMessage::result_key(StageName::Upload), serde_json::to_value(status)?);
        self.broker
            .publish(&listener_queue(StageName::Upload, id), Value::Object(envelope))
            .await
            .map_err(|e| MashError::Transport(e.to_string()))
    }

    pub async fn run_once(self: &Arc<Self>) -> Result<(), MashError> {
        tokio::select! {
            raw = self.broker.recv(&service_queue(StageName::Obs)) => {
                let raw = raw.map_err(|e| MashError::Transport(e.to_string()))?;
                let envelope: StageEnvelope = serde_json::from_value(raw)?;
                match self.handle_job_document(&envelope) {
                    Ok(_) => {}
                    Err(err @ MashError::Validation(_)) | Err(err @ MashError::JobAlreadyExists(_)) => {
                        warn!(error = %err, "rejected obs job document");
                    }
                    Err(err) => return Err(err),
                }
            }
            raw = self.broker.recv(&job_delete_queue(StageName::Obs)) => {
                let raw = raw.map_err(|e| MashError::Transport(e.to_string()))?;
                let id: JobId = serde_json::from_value(raw["id"].clone())?;
                self.handle_job_delete(id)?;
            }
        }
        Ok(())
    }

    pub async fn run(self: &Arc<Self>) -> Result<(), MashError> {
        self.bind_queues().await?;
        self.resume();
        loop {
            self.run_once().await?;
        }
    }
}

fn field_string(document: &StageDocument, key: &str) -> Result<String, MashError> {
    document
        .fields
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| MashError::Validation(format!("obs_job missing `{key}`")))
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
