// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage Job Runtime bodies (C6) and the credentials client stage services
//! use to reach the courier (C7's counterpart, §4.5 step 2).
//!
//! [`StageJob`] is the trait every (stage, cloud) pair implements;
//! [`build_stage_job`] is the construction-time dispatch table that picks
//! one. [`ec2`] and [`azure`] hold the clouds with dedicated region
//! resolution; every other pair runs as [`NoOp`].

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod azure;
mod credentials_client;
mod ec2;
mod factory;
mod noop;
mod stage_job;

pub use azure::{AzureRegionEntry, AzureUploadJob};
pub use credentials_client::CredentialsClient;
pub use mash_transport::CREDENTIALS_SERVICE_QUEUE;
pub use ec2::{
    Ec2PublishJob, Ec2ReplicateJob, Ec2UploadJob, PublishRegionEntry, UploaderRegionEntry,
};
pub use factory::build_stage_job;
pub use noop::NoOp;
pub use stage_job::{JobContext, RunOutcome, StageJob};

pub mod azure_regions {
    pub use crate::azure::resolve_uploader_target_regions;
}

pub mod ec2_regions {
    pub use crate::ec2::{
        resolve_publish_regions, resolve_replication_target_regions, resolve_test_regions,
        resolve_uploader_target_regions,
    };
}
