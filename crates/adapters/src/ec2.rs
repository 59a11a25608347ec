// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! EC2 region and helper-image resolution (§4.4 step 4, §8 scenario 1),
//! grounded on the partition/region/helper-image expansion the job creator's
//! original EC2 utilities performed.

use async_trait::async_trait;
use mash_core::config::Ec2CloudData;
use mash_core::{Account, MashError};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::stage_job::{JobContext, RunOutcome, StageJob};

/// One entry of the uploader's `target_regions` map: the home region an
/// account uploads its helper-instance image into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploaderRegionEntry {
    pub account: String,
    pub helper_image: String,
    pub subnet: Option<String>,
}

/// One entry of the publisher's `publish_regions` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishRegionEntry {
    pub account: String,
    pub helper_image: String,
    pub target_regions: Vec<String>,
}

fn partition_of(account: &Account) -> Result<&str, MashError> {
    account
        .overrides
        .partition
        .as_deref()
        .ok_or_else(|| MashError::Validation(format!("account {} has no ec2 partition", account.name)))
}

fn home_region(account: &Account, data: &Ec2CloudData) -> Result<String, MashError> {
    let partition = partition_of(account)?;
    data.partitions
        .get(partition)
        .and_then(|regions| regions.first())
        .cloned()
        .ok_or_else(|| {
            MashError::Validation(format!("no regions configured for ec2 partition {partition}"))
        })
}

fn helper_image(account: &Account, data: &Ec2CloudData, use_root_swap: bool) -> Result<String, MashError> {
    if use_root_swap {
        return account.overrides.root_swap_ami.clone().ok_or_else(|| {
            MashError::Validation(format!(
                "root_swap_ami is required for account {}, when using root swap",
                account.name
            ))
        });
    }
    let region = home_region(account, data)?;
    data.helper_images
        .get(&region)
        .cloned()
        .ok_or_else(|| MashError::Validation(format!("no helper image configured for region {region}")))
}

/// Every region an account replicates into: its partition's full region
/// list plus any per-account additional regions (§8 scenario 1: `test-aws`
/// with partition `aws` [ap-northeast-1, ap-northeast-2] and an additional
/// region `ap-northeast-3` replicates into all three).
pub fn resolve_replication_target_regions(
    account: &Account,
    data: &Ec2CloudData,
) -> Result<Vec<String>, MashError> {
    let partition = partition_of(account)?;
    let mut regions = data
        .partitions
        .get(partition)
        .cloned()
        .ok_or_else(|| {
            MashError::Validation(format!("no regions configured for ec2 partition {partition}"))
        })?;
    for extra in &account.overrides.additional_regions {
        regions.push(extra.name.clone());
    }
    Ok(regions)
}

/// The uploader's `target_regions`: one entry per account, keyed by that
/// account's home region. `job_subnet` overrides every account's own subnet
/// when set (§4.4 step 4).
pub fn resolve_uploader_target_regions(
    accounts: &[Account],
    data: &Ec2CloudData,
    job_subnet: Option<&str>,
    use_root_swap: bool,
) -> Result<BTreeMap<String, UploaderRegionEntry>, MashError> {
    let mut map = BTreeMap::new();
    for account in accounts {
        let region = home_region(account, data)?;
        let subnet = job_subnet
            .map(str::to_string)
            .or_else(|| account.overrides.subnet.clone());
        let entry = UploaderRegionEntry {
            account: account.name.clone(),
            helper_image: helper_image(account, data, use_root_swap)?,
            subnet,
        };
        map.insert(region, entry);
    }
    Ok(map)
}

/// The tester's `test_regions`: one entry per account, keyed by its home
/// region (§4.4 step 4: "the tester receives `test_regions: {region ->
/// account}`").
pub fn resolve_test_regions(
    accounts: &[Account],
    data: &Ec2CloudData,
) -> Result<BTreeMap<String, String>, MashError> {
    let mut map = BTreeMap::new();
    for account in accounts {
        map.insert(home_region(account, data)?, account.name.clone());
    }
    Ok(map)
}

/// The publisher's `publish_regions`: one entry per account naming every
/// region it should publish into.
pub fn resolve_publish_regions(
    accounts: &[Account],
    data: &Ec2CloudData,
    use_root_swap: bool,
) -> Result<Vec<PublishRegionEntry>, MashError> {
    accounts
        .iter()
        .map(|account| {
            Ok(PublishRegionEntry {
                account: account.name.clone(),
                helper_image: helper_image(account, data, use_root_swap)?,
                target_regions: resolve_replication_target_regions(account, data)?,
            })
        })
        .collect()
}

pub struct Ec2UploadJob {
    pub cloud_data: Ec2CloudData,
}

#[async_trait]
impl StageJob for Ec2UploadJob {
    async fn run_job(&self, ctx: &JobContext) -> Result<RunOutcome, MashError> {
        let target_regions = resolve_uploader_target_regions(
            &ctx.accounts,
            &self.cloud_data,
            ctx.subnet.as_deref(),
            ctx.use_root_swap,
        )?;
        Ok(RunOutcome::empty().with_field(
            "target_regions",
            serde_json::to_value(target_regions)?,
        ))
    }
}

pub struct Ec2ReplicateJob {
    pub cloud_data: Ec2CloudData,
}

#[async_trait]
impl StageJob for Ec2ReplicateJob {
    async fn run_job(&self, ctx: &JobContext) -> Result<RunOutcome, MashError> {
        let mut per_account = BTreeMap::new();
        for account in &ctx.accounts {
            per_account.insert(
                account.name.clone(),
                resolve_replication_target_regions(account, &self.cloud_data)?,
            );
        }
        Ok(RunOutcome::empty().with_field("target_regions", serde_json::to_value(per_account)?))
    }
}

pub struct Ec2PublishJob {
    pub cloud_data: Ec2CloudData,
}

#[async_trait]
impl StageJob for Ec2PublishJob {
    async fn run_job(&self, ctx: &JobContext) -> Result<RunOutcome, MashError> {
        let publish_regions = resolve_publish_regions(&ctx.accounts, &self.cloud_data, ctx.use_root_swap)?;
        Ok(RunOutcome::empty().with_field("publish_regions", serde_json::to_value(publish_regions)?))
    }
}

#[cfg(test)]
#[path = "ec2_tests.rs"]
mod tests;
