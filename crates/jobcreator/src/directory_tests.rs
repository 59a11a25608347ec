// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mash_core::account::CloudAccountOverrides;
use mash_core::{AccountProvider, CloudAccountRef, StageName};
use serde_json::json;

fn add_msg(name: &str, user: &str, group: Option<&str>) -> AddAccountMessage {
    AddAccountMessage {
        account_name: name.to_string(),
        credentials: json!({}).as_object().unwrap().clone(),
        group: group.map(str::to_string),
        provider: AccountProvider::Ec2,
        requesting_user: user.to_string(),
        overrides: CloudAccountOverrides {
            partition: Some("aws".to_string()),
            ..Default::default()
        },
    }
}

fn base_doc() -> JobDocument {
    JobDocument {
        id: None,
        cloud: "ec2".to_string(),
        utctime: "now".to_string(),
        last_service: StageName::Create,
        requesting_user: "alice".to_string(),
        image: "test-image".to_string(),
        cloud_image_name: "test-image-1.0.0".to_string(),
        old_cloud_image_name: None,
        image_description: None,
        project: "Test:Project".to_string(),
        distro: "sles".to_string(),
        tests: vec![],
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
fn resolves_explicit_cloud_accounts_with_inline_overrides() {
    let directory = AccountDirectory::new();
    let mut doc = base_doc();
    doc.cloud_accounts.push(CloudAccountRef {
        name: "test-aws".to_string(),
        overrides: CloudAccountOverrides {
            partition: Some("aws".to_string()),
            ..Default::default()
        },
    });
    let accounts = directory.resolve_target_accounts(&doc).unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].overrides.partition.as_deref(), Some("aws"));
}

#[test]
fn resolves_group_members_and_dedupes_against_explicit_accounts() {
    let directory = AccountDirectory::new();
    directory.add_account(add_msg("test-aws", "alice", Some("release-team")));
    directory.add_account(add_msg("test-aws-gov", "alice", Some("release-team")));

    let mut doc = base_doc();
    doc.cloud_accounts.push(CloudAccountRef {
        name: "test-aws".to_string(),
        overrides: Default::default(),
    });
    doc.cloud_groups.push("release-team".to_string());

    let accounts = directory.resolve_target_accounts(&doc).unwrap();
    let names: Vec<_> = accounts.iter().map(|a| a.name.clone()).collect();
    assert_eq!(names, vec!["test-aws".to_string(), "test-aws-gov".to_string()]);
}

#[test]
fn unknown_group_is_a_validation_error() {
    let directory = AccountDirectory::new();
    let mut doc = base_doc();
    doc.cloud_groups.push("bogus".to_string());
    let err = directory.resolve_target_accounts(&doc).unwrap_err();
    assert!(matches!(err, MashError::Validation(_)));
}

#[test]
fn unknown_cloud_is_a_validation_error() {
    let directory = AccountDirectory::new();
    let mut doc = base_doc();
    doc.cloud = "bogus".to_string();
    let err = directory.resolve_target_accounts(&doc).unwrap_err();
    assert!(matches!(err, MashError::Validation(_)));
}

#[test]
fn deleted_account_no_longer_resolves_as_a_group_member() {
    let directory = AccountDirectory::new();
    directory.add_account(add_msg("test-aws", "alice", Some("release-team")));
    directory.delete_account(DeleteAccountMessage {
        account_name: "test-aws".to_string(),
        provider: AccountProvider::Ec2,
        requesting_user: "alice".to_string(),
    });

    let mut doc = base_doc();
    doc.cloud_groups.push("release-team".to_string());
    let err = directory.resolve_target_accounts(&doc).unwrap_err();
    assert!(matches!(err, MashError::Validation(_)));
}
