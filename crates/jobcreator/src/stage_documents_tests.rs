// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mash_core::account::CloudAccountOverrides;
use mash_core::config::Ec2CloudData;
use mash_core::{AccountProvider, JobId};
use std::collections::HashMap;

fn scenario_one_accounts() -> Vec<Account> {
    vec![Account {
        name: "test-aws".to_string(),
        provider: AccountProvider::Ec2,
        requesting_user: "alice".to_string(),
        overrides: CloudAccountOverrides {
            partition: Some("aws".to_string()),
            ..Default::default()
        },
    }]
}

fn scenario_one_cloud_data() -> CloudDataConfig {
    CloudDataConfig {
        ec2: Ec2CloudData {
            partitions: HashMap::from([("aws".to_string(), vec!["ap-northeast-1".to_string()])]),
            helper_images: HashMap::from([("ap-northeast-1".to_string(), "ami-383c1956".to_string())]),
        },
    }
}

fn scenario_one_doc(last_service: StageName) -> JobDocument {
    JobDocument {
        id: None,
        cloud: "ec2".to_string(),
        utctime: "now".to_string(),
        last_service,
        requesting_user: "alice".to_string(),
        image: "test-image".to_string(),
        cloud_image_name: "test-image-1.0.0".to_string(),
        old_cloud_image_name: Some("test-image-0.9.0".to_string()),
        image_description: Some("a test image".to_string()),
        project: "Test:Project".to_string(),
        distro: "sles".to_string(),
        tests: vec!["test_basic".to_string()],
        cloud_accounts: vec![],
        cloud_groups: vec![],
        conditions: vec![],
        notification_email: None,
        notification_type: None,
        subnet: None,
        use_root_swap: false,
    }
}

#[test]
fn builds_one_document_per_stage_up_to_last_service() {
    let doc = scenario_one_doc(StageName::Replicate);
    let stages = build_stage_documents(&doc, JobId::new(), &scenario_one_accounts(), &scenario_one_cloud_data()).unwrap();
    let names: Vec<_> = stages.iter().map(|(s, _)| *s).collect();
    assert_eq!(names, vec![StageName::Obs, StageName::Upload, StageName::Test, StageName::Replicate]);
}

#[test]
fn upload_document_carries_ec2_target_regions() {
    let doc = scenario_one_doc(StageName::Upload);
    let stages = build_stage_documents(&doc, JobId::new(), &scenario_one_accounts(), &scenario_one_cloud_data()).unwrap();
    let (_, upload_doc) = stages.iter().find(|(s, _)| *s == StageName::Upload).unwrap();
    let target_regions = &upload_doc.fields["target_regions"];
    assert_eq!(target_regions["ap-northeast-1"]["account"], "test-aws");
}

#[test]
fn test_document_carries_ec2_test_regions_and_the_test_list() {
    let doc = scenario_one_doc(StageName::Test);
    let stages = build_stage_documents(&doc, JobId::new(), &scenario_one_accounts(), &scenario_one_cloud_data()).unwrap();
    let (_, test_doc) = stages.iter().find(|(s, _)| *s == StageName::Test).unwrap();
    assert_eq!(test_doc.fields["test_regions"]["ap-northeast-1"], "test-aws");
    assert_eq!(test_doc.fields["tests"], serde_json::json!(["test_basic"]));
}

#[test]
fn create_stage_has_no_extra_fields() {
    let doc = scenario_one_doc(StageName::Create);
    let stages = build_stage_documents(&doc, JobId::new(), &scenario_one_accounts(), &scenario_one_cloud_data()).unwrap();
    let (_, create_doc) = stages.last().unwrap();
    assert!(create_doc.fields.is_empty());
}

#[test]
fn credentials_check_names_every_resolved_account_reference() {
    let mut doc = scenario_one_doc(StageName::Create);
    doc.cloud_accounts.push(mash_core::CloudAccountRef {
        name: "test-aws".to_string(),
        overrides: Default::default(),
    });
    doc.cloud_groups.push("release-team".to_string());
    let request = build_credentials_check(&doc, JobId::new(), "jobcreator.listener_1".to_string()).unwrap();
    assert_eq!(request.provider_accounts, vec!["test-aws".to_string()]);
    assert_eq!(request.provider_groups, vec!["release-team".to_string()]);
    assert_eq!(request.reply_to, "jobcreator.listener_1");
}
