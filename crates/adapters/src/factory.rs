// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cloud-to-job-body factory (§4.5 admission, §9 "dynamic routing tables ->
//! static dispatch maps"). Replaces the teacher's per-job adapter registry
//! (`RuntimeRouter`) with a construction-time match, since the (stage,
//! cloud) space is small and fixed.

use mash_core::config::CloudDataConfig;
use mash_core::{MashError, StageName};

use crate::azure::AzureUploadJob;
use crate::ec2::{Ec2PublishJob, Ec2ReplicateJob, Ec2UploadJob};
use crate::noop::NoOp;
use crate::stage_job::StageJob;

/// Construct the stage body for `cloud` at `stage`, using the configured
/// per-cloud data tables. Unknown cloud names are a validation error
/// (§4.5 "on factory error, publish invalid_config... and drop").
pub fn build_stage_job(
    stage: StageName,
    cloud: &str,
    cloud_data: &CloudDataConfig,
) -> Result<Box<dyn StageJob>, MashError> {
    match (stage, cloud) {
        (StageName::Upload, "ec2") => Ok(Box::new(Ec2UploadJob {
            cloud_data: cloud_data.ec2.clone(),
        })),
        (StageName::Replicate, "ec2") => Ok(Box::new(Ec2ReplicateJob {
            cloud_data: cloud_data.ec2.clone(),
        })),
        (StageName::Publish, "ec2") => Ok(Box::new(Ec2PublishJob {
            cloud_data: cloud_data.ec2.clone(),
        })),
        (StageName::Upload, "azure") => Ok(Box::new(AzureUploadJob)),
        // Every other (stage, cloud) pair — including every stage for
        // gce/oci/aliyun, and ec2/azure's remaining stages — has no
        // cloud-specific body implemented here and runs as a no-op that
        // forwards the prior status unchanged.
        (_, "ec2" | "azure" | "gce" | "oci" | "aliyun") => Ok(Box::new(NoOp)),
        (_, other) => Err(MashError::Validation(format!("unknown cloud: {other:?}"))),
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
