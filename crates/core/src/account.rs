// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cloud accounts and the groups that name collections of them.
//!
//! Accounts and groups are namespaced per `requesting_user`; a job may never
//! reference an account or group outside its own submitter's namespace.

use crate::simple_display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountProvider {
    Ec2,
    Gce,
    Azure,
    Oci,
    Aliyun,
}

simple_display! {
    AccountProvider {
        Ec2 => "ec2",
        Gce => "gce",
        Azure => "azure",
        Oci => "oci",
        Aliyun => "aliyun",
    }
}

impl AccountProvider {
    /// Parse the `cloud` string carried on a job document into its typed
    /// provider. Unlike `StageName::parse`, this is not derived from the
    /// `Display` table since a job's `cloud` field is validated before any
    /// account exists to compare against.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ec2" => Some(Self::Ec2),
            "gce" => Some(Self::Gce),
            "azure" => Some(Self::Azure),
            "oci" => Some(Self::Oci),
            "aliyun" => Some(Self::Aliyun),
            _ => None,
        }
    }
}

/// A named additional EC2 region an account replicates/uploads into, beyond
/// its partition's base region table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalRegion {
    pub name: String,
    pub helper_image: String,
}

/// Provider-specific overrides carried on an account. Only the fields
/// relevant to the account's `provider` are populated by the job creator;
/// the others stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudAccountOverrides {
    /// EC2: the partition the base account lives in (`aws`, `aws-us-gov`, `aws-cn`).
    pub partition: Option<String>,
    /// EC2: extra regions beyond the partition's base table.
    #[serde(default)]
    pub additional_regions: Vec<AdditionalRegion>,
    /// Azure: target region name.
    pub region: Option<String>,
    /// Azure: resource group the image is published under.
    pub resource_group: Option<String>,
    /// Azure: storage container name for the uploaded VHD.
    pub container_name: Option<String>,
    /// Azure: storage account name.
    pub storage_account: Option<String>,
    /// Any provider: helper image id to swap the job's own root volume into
    /// instead of the provider's default helper image.
    pub root_swap_ami: Option<String>,
    /// EC2: the account's default subnet for the uploader's helper instance,
    /// overridden per job by `JobDocument::subnet` when set.
    pub subnet: Option<String>,
}

/// A single cloud account a job may target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub provider: AccountProvider,
    pub requesting_user: String,
    #[serde(default)]
    pub overrides: CloudAccountOverrides,
}

/// A named collection of account names, owned by one user's namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub owner: String,
    pub members: Vec<String>,
}

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;
