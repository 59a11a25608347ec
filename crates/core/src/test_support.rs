// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-only builders, enabled via `#[cfg(test)]` or the `test-support`
//! feature so other crates can build fixtures without hand-writing every
//! field of a [`JobDocument`].

use crate::id::JobId;
use crate::job_doc::{Condition, JobDocument, NotificationType};
use crate::stage::StageName;

crate::builder! {
    pub struct JobDocumentBuilder => JobDocument {
        into {
            cloud: String = "ec2",
            utctime: String = "now",
            requesting_user: String = "alice",
            image: String = "test-image",
            cloud_image_name: String = "test-image-1.0",
            project: String = "test:project",
            distro: String = "sles",
        }
        set {
            last_service: StageName = StageName::Create,
            tests: Vec<String> = Vec::new(),
            cloud_accounts: Vec<crate::job_doc::CloudAccountRef> = Vec::new(),
            cloud_groups: Vec<String> = Vec::new(),
            conditions: Vec<Condition> = Vec::new(),
            use_root_swap: bool = false,
        }
        option {
            notification_email: String = None,
            old_cloud_image_name: String = None,
            image_description: String = None,
            subnet: String = None,
        }
        computed {
            id: Option<JobId> = None,
            notification_type: Option<NotificationType> = None,
        }
    }
}

#[cfg(test)]
#[path = "test_support_tests.rs"]
mod tests;
