// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The submitter-facing job document and the condition language it carries.

use crate::account::{Account, CloudAccountOverrides};
use crate::id::JobId;
use crate::simple_display;
use crate::stage::StageName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Single,
    Periodic,
}

simple_display! {
    NotificationType {
        Single => "single",
        Periodic => "periodic",
    }
}

/// A package-version gate on when the build-result watcher considers a
/// release ready to enter the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// `{"image": "1.42.1"}` — gate on the derived image version.
    Image { image: String },
    /// `{"package": ["name", "op", "version", release?]}` — gate on a
    /// specific package's installed version/release.
    Package {
        package: (String, String, String, Option<String>),
    },
}

/// A reference to a target account: either an explicit account entry or the
/// name of a group to expand at job-creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudAccountRef {
    pub name: String,
    #[serde(flatten)]
    pub overrides: CloudAccountOverrides,
}

/// The document a client submits to kick off a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDocument {
    /// Assigned by the job creator (UUIDv4) if the submitter omits it.
    #[serde(default)]
    pub id: Option<JobId>,
    pub cloud: String,
    pub utctime: String,
    pub last_service: StageName,
    pub requesting_user: String,
    pub image: String,
    pub cloud_image_name: String,
    #[serde(default)]
    pub old_cloud_image_name: Option<String>,
    #[serde(default)]
    pub image_description: Option<String>,
    pub project: String,
    pub distro: String,
    #[serde(default)]
    pub tests: Vec<String>,
    #[serde(default)]
    pub cloud_accounts: Vec<CloudAccountRef>,
    #[serde(default)]
    pub cloud_groups: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub notification_email: Option<String>,
    #[serde(default)]
    pub notification_type: Option<NotificationType>,
    /// EC2: overrides every target account's subnet for the uploader's
    /// helper instance, in place of the account's own default.
    #[serde(default)]
    pub subnet: Option<String>,
    /// EC2: swap the uploader/publisher's helper image for the target
    /// account's `root_swap_ami`. It is a validation error to set this on an
    /// account with no `root_swap_ami` configured.
    #[serde(default)]
    pub use_root_swap: bool,
}

impl JobDocument {
    /// A nonstop job re-enters the pipeline on every qualifying upstream
    /// build rather than running once.
    pub fn is_nonstop(&self) -> bool {
        self.utctime == "always"
    }
}

/// The per-stage document the job creator derives from a [`JobDocument`] and
/// publishes to one stage's service queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDocument {
    pub id: JobId,
    pub cloud: String,
    pub utctime: String,
    pub last_service: StageName,
    /// Resolved target accounts for this job, after group expansion and
    /// dedup by account name.
    pub accounts: Vec<Account>,
    /// Stage-specific payload, e.g. `target_regions` for the uploader,
    /// `publish_regions` for the publisher. Kept as an untyped map because
    /// its shape differs per stage and per cloud (§4.4).
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// Carried from the originating [`JobDocument`] onto every per-stage
    /// document so a stage body can re-derive its cloud-specific fields
    /// without the job creator baking them in up front.
    #[serde(default)]
    pub subnet: Option<String>,
    #[serde(default)]
    pub use_root_swap: bool,
}

#[cfg(test)]
#[path = "job_doc_tests.rs"]
mod tests;
