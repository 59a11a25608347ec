// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One admitted build-result job and the state machine that runs one pass
//! over it (§4.3 steps 1-7), driven by a [`BuildServiceClient`].

use crate::build_result::{BuildJobStatus, BuildResultState, SerializableCondition};
use crate::client::{is_image_file, packages_checksum, BuildServiceClient};
use crate::conditions::{conditions_complied, evaluate_conditions};
use mash_core::{Condition, JobId, MashError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A job the watcher is polling, derived from the `obs_job` stage document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObsJob {
    pub id: JobId,
    pub project: String,
    pub package: String,
    pub conditions: Vec<Condition>,
    /// `utctime == "always"`: the watcher keeps polling after a success pass
    /// instead of retiring (§3).
    pub nonstop: bool,
}

/// The result of one pass over a job (§4.3 steps 1-7).
pub struct PassOutcome {
    pub state: BuildResultState,
    /// `Some(paths)` iff this pass complied and downloaded artefacts;
    /// the caller publishes them to the uploader's listener queue.
    pub publish: Option<Vec<String>>,
    /// Whether the caller should retire this job (remove its job file,
    /// serialise final state, stop scheduling further passes).
    pub retire: bool,
}

/// Run one pass of the watcher's state machine for `job` (§4.3 steps 1-7).
/// Never returns `Err` for a remote/lock fault — those are folded into a
/// `Failed` [`BuildResultState`] per §4.3's failure semantics ("any
/// transport or remote fault sets job_status=failed for the pass but never
/// removes the watcher"). Only a malformed condition expression
/// ([`mash_core::version::VersionExpressionError`]) propagates, since that is a
/// configuration error on the job itself, not a transient remote fault.
pub async fn run_pass(
    job: &ObsJob,
    client: &dyn BuildServiceClient,
    download_dir: &Path,
) -> Result<PassOutcome, MashError> {
    if let Err(err) = client.lock(&job.project, &job.package).await {
        tracing::warn!(job_id = %job.id, error = %err, "obs lock failed, retrying next tick");
        return Ok(failed_outcome());
    }

    let outcome = run_locked(job, client, download_dir).await;
    let _ = client.unlock(&job.project, &job.package).await;
    outcome
}

async fn run_locked(
    job: &ObsJob,
    client: &dyn BuildServiceClient,
    download_dir: &Path,
) -> Result<PassOutcome, MashError> {
    let packages = match client.fetch_metadata(&job.project, &job.package).await {
        Ok(packages) => packages,
        Err(err) => {
            tracing::warn!(job_id = %job.id, error = %err, "obs metadata fetch failed, retrying next tick");
            return Ok(failed_outcome());
        }
    };

    let version = packages
        .iter()
        .find(|p| p.name == job.package)
        .map(|p| p.version.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let checksum = packages_checksum(&packages);
    let conditions = evaluate_conditions(&job.conditions, &version, &packages)?;
    let complied = conditions_complied(&version, &conditions);

    if !complied {
        return Ok(PassOutcome {
            state: BuildResultState {
                version,
                packages_checksum: checksum,
                conditions: conditions.iter().map(SerializableCondition::from).collect(),
                job_status: BuildJobStatus::Prepared,
                image_source: Vec::new(),
            },
            publish: None,
            retire: false,
        });
    }

    match download_images(job, client, download_dir).await {
        Ok(image_source) => Ok(PassOutcome {
            state: BuildResultState {
                version,
                packages_checksum: checksum,
                conditions: conditions.iter().map(SerializableCondition::from).collect(),
                job_status: BuildJobStatus::Success,
                image_source: image_source.clone(),
            },
            publish: Some(image_source),
            retire: !job.nonstop,
        }),
        Err(err) => {
            tracing::warn!(job_id = %job.id, error = %err, "obs image download failed, retrying next tick");
            Ok(PassOutcome {
                state: BuildResultState {
                    version,
                    packages_checksum: checksum,
                    conditions: conditions.iter().map(SerializableCondition::from).collect(),
                    job_status: BuildJobStatus::Failed,
                    image_source: Vec::new(),
                },
                publish: None,
                retire: false,
            })
        }
    }
}

async fn download_images(
    job: &ObsJob,
    client: &dyn BuildServiceClient,
    download_dir: &Path,
) -> Result<Vec<String>, MashError> {
    let binaries = client.fetch_binaries(&job.project, &job.package).await?;
    let mut paths = Vec::new();
    for entry in binaries.iter().filter(|b| is_image_file(&b.name)) {
        let path = client.download(&job.project, &job.package, entry, download_dir).await?;
        paths.push(path.display().to_string());
    }
    Ok(paths)
}

fn failed_outcome() -> PassOutcome {
    PassOutcome {
        state: BuildResultState {
            version: "unknown".to_string(),
            packages_checksum: "unknown".to_string(),
            conditions: Vec::new(),
            job_status: BuildJobStatus::Failed,
            image_source: Vec::new(),
        },
        publish: None,
        retire: false,
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
