// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-stage document construction (§4.4 step 4), grounded in the original
//! `BaseJob.get_*_message` methods: one document per stage in the fixed
//! ordering, each carrying the job's base `{id, utctime}` plus whatever
//! fields that stage needs.

use mash_core::config::CloudDataConfig;
use mash_core::{Account, JobDocument, MashError, StageDocument, StageName};
use serde_json::json;
use std::collections::BTreeMap;

/// Build one [`StageDocument`] per stage from [`StageName::Obs`] up to and
/// including `doc.last_service`, in pipeline order. `accounts` must already
/// be resolved (group-expanded, deduped) by [`crate::AccountDirectory`].
pub fn build_stage_documents(
    doc: &JobDocument,
    id: mash_core::JobId,
    accounts: &[Account],
    cloud_data: &CloudDataConfig,
) -> Result<Vec<(StageName, StageDocument)>, MashError> {
    StageName::up_to(doc.last_service)
        .iter()
        .map(|&stage| Ok((stage, build_one(stage, doc, id, accounts, cloud_data)?)))
        .collect()
}

fn build_one(
    stage: StageName,
    doc: &JobDocument,
    id: mash_core::JobId,
    accounts: &[Account],
    cloud_data: &CloudDataConfig,
) -> Result<StageDocument, MashError> {
    let mut fields = BTreeMap::new();

    match stage {
        StageName::Obs => {
            fields.insert("image".to_string(), json!(doc.image));
            fields.insert("project".to_string(), json!(doc.project));
            if !doc.conditions.is_empty() {
                fields.insert("conditions".to_string(), serde_json::to_value(&doc.conditions)?);
            }
        }
        StageName::Upload => {
            fields.insert("cloud_image_name".to_string(), json!(doc.cloud_image_name));
            fields.insert("image_description".to_string(), json!(doc.image_description));
            match doc.cloud.as_str() {
                "ec2" => {
                    let regions = mash_adapters::ec2_regions::resolve_uploader_target_regions(
                        accounts,
                        &cloud_data.ec2,
                        doc.subnet.as_deref(),
                        doc.use_root_swap,
                    )?;
                    fields.insert("target_regions".to_string(), serde_json::to_value(regions)?);
                }
                "azure" => {
                    let regions = mash_adapters::azure_regions::resolve_uploader_target_regions(accounts)?;
                    fields.insert("target_regions".to_string(), serde_json::to_value(regions)?);
                }
                _ => {}
            }
        }
        StageName::Test => {
            fields.insert("tests".to_string(), json!(doc.tests));
            fields.insert("distro".to_string(), json!(doc.distro));
            if doc.cloud == "ec2" {
                let regions = mash_adapters::ec2_regions::resolve_test_regions(accounts, &cloud_data.ec2)?;
                fields.insert("test_regions".to_string(), serde_json::to_value(regions)?);
            }
        }
        StageName::Replicate => {
            fields.insert("image_description".to_string(), json!(doc.image_description));
            if doc.cloud == "ec2" {
                let mut per_account = BTreeMap::new();
                for account in accounts {
                    per_account.insert(
                        account.name.clone(),
                        mash_adapters::ec2_regions::resolve_replication_target_regions(account, &cloud_data.ec2)?,
                    );
                }
                fields.insert("source_regions".to_string(), serde_json::to_value(per_account)?);
            }
        }
        StageName::Publish => {
            if doc.cloud == "ec2" {
                let regions = mash_adapters::ec2_regions::resolve_publish_regions(
                    accounts,
                    &cloud_data.ec2,
                    doc.use_root_swap,
                )?;
                fields.insert("publish_regions".to_string(), serde_json::to_value(regions)?);
            }
        }
        StageName::Deprecate => {
            fields.insert("old_cloud_image_name".to_string(), json!(doc.old_cloud_image_name));
            if doc.cloud == "ec2" {
                let mut per_account = BTreeMap::new();
                for account in accounts {
                    per_account.insert(
                        account.name.clone(),
                        mash_adapters::ec2_regions::resolve_replication_target_regions(account, &cloud_data.ec2)?,
                    );
                }
                fields.insert("deprecation_regions".to_string(), serde_json::to_value(per_account)?);
            }
        }
        StageName::Create => {}
    }

    Ok(StageDocument {
        id,
        cloud: doc.cloud.clone(),
        utctime: doc.utctime.clone(),
        last_service: doc.last_service,
        accounts: accounts.to_vec(),
        fields,
        subnet: doc.subnet.clone(),
        use_root_swap: doc.use_root_swap,
    })
}

/// The credentials bootstrap document published ahead of the pipeline
/// stages (§4.4 step 5), requesting the courier verify every resolved
/// account up front.
pub fn build_credentials_check(
    doc: &JobDocument,
    id: mash_core::JobId,
    reply_to: String,
) -> Result<mash_wire::CredentialsJobCheckRequest, MashError> {
    let provider = mash_core::AccountProvider::parse(&doc.cloud)
        .ok_or_else(|| MashError::Validation(format!("unknown cloud: {:?}", doc.cloud)))?;
    Ok(mash_wire::CredentialsJobCheckRequest {
        id: id.to_string(),
        provider,
        provider_accounts: doc.cloud_accounts.iter().map(|a| a.name.clone()).collect(),
        provider_groups: doc.cloud_groups.clone(),
        requesting_user: doc.requesting_user.clone(),
        reply_to,
    })
}

#[cfg(test)]
#[path = "stage_documents_tests.rs"]
mod tests;
