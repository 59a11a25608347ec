// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build-Result Watcher (C3): polls the Open Build Service for a qualifying
//! build, checks it against the job's conditions, and downloads the
//! resulting images into the pipeline once they comply (§4.3).

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod build_result;
mod client;
mod conditions;
mod schedule;
mod service;
mod watcher;

pub use build_result::{BuildJobStatus, BuildResultState, SerializableCondition};
pub use client::{BinaryEntry, BuildServiceClient, FakeBuildServiceClient, PackageInfo};
pub use conditions::{conditions_complied, evaluate_conditions, ConditionResult};
pub use schedule::{parse_schedule, Schedule};
pub use service::ObsWatcherService;
pub use watcher::{run_pass, ObsJob, PassOutcome};
