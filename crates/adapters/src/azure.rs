// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Azure region resolution (§4.4 step 4, §8 scenario 2). Unlike EC2, Azure
//! accounts carry their own region/resource-group/container directly —
//! there is no partition table to expand.

use async_trait::async_trait;
use mash_core::{Account, MashError};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::stage_job::{JobContext, RunOutcome, StageJob};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AzureRegionEntry {
    pub account: String,
    pub resource_group: String,
    pub container_name: String,
    pub storage_account: String,
}

fn entry_for(account: &Account) -> Result<(String, AzureRegionEntry), MashError> {
    let overrides = &account.overrides;
    let region = overrides
        .region
        .clone()
        .ok_or_else(|| MashError::Validation(format!("account {} has no azure region", account.name)))?;
    let resource_group = overrides.resource_group.clone().ok_or_else(|| {
        MashError::Validation(format!("account {} has no azure resource_group", account.name))
    })?;
    let container_name = overrides.container_name.clone().ok_or_else(|| {
        MashError::Validation(format!("account {} has no azure container_name", account.name))
    })?;
    let storage_account = overrides.storage_account.clone().ok_or_else(|| {
        MashError::Validation(format!("account {} has no azure storage_account", account.name))
    })?;
    Ok((
        region,
        AzureRegionEntry {
            account: account.name.clone(),
            resource_group,
            container_name,
            storage_account,
        },
    ))
}

/// The uploader's `target_regions`, keyed by each account's declared region.
pub fn resolve_uploader_target_regions(
    accounts: &[Account],
) -> Result<BTreeMap<String, AzureRegionEntry>, MashError> {
    accounts.iter().map(entry_for).collect()
}

pub struct AzureUploadJob;

#[async_trait]
impl StageJob for AzureUploadJob {
    async fn run_job(&self, ctx: &JobContext) -> Result<RunOutcome, MashError> {
        let target_regions = resolve_uploader_target_regions(&ctx.accounts)?;
        Ok(RunOutcome::empty().with_field(
            "target_regions",
            serde_json::to_value(target_regions)?,
        ))
    }
}

#[cfg(test)]
#[path = "azure_tests.rs"]
mod tests;
