// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mash_core::AccountProvider;
use serde_json::json;

fn add_msg(name: &str, user: &str, group: Option<&str>) -> AddAccountMessage {
    AddAccountMessage {
        account_name: name.to_string(),
        credentials: json!({"access_key": format!("{name}-key")}).as_object().unwrap().clone(),
        group: group.map(str::to_string),
        provider: AccountProvider::Ec2,
        requesting_user: user.to_string(),
        overrides: Default::default(),
    }
}

#[test]
fn check_ownership_passes_for_known_accounts() {
    let store = AccountStore::new();
    store.add_account(add_msg("test-aws", "alice", None));
    let missing = store.check_ownership(&["test-aws".to_string()], AccountProvider::Ec2, "alice");
    assert!(missing.is_empty());
}

#[test]
fn check_ownership_flags_unknown_and_cross_user_accounts() {
    let store = AccountStore::new();
    store.add_account(add_msg("test-aws", "alice", None));
    let missing = store.check_ownership(
        &["test-aws".to_string(), "bogus".to_string()],
        AccountProvider::Ec2,
        "bob",
    );
    assert_eq!(missing.len(), 2);
}

#[test]
fn expand_accounts_unions_group_members_and_dedupes() {
    let store = AccountStore::new();
    store.add_account(add_msg("test-aws", "alice", Some("release-team")));
    store.add_account(add_msg("test-aws-gov", "alice", Some("release-team")));
    let resolved = store.expand_accounts(
        &["test-aws".to_string()],
        &["release-team".to_string()],
        "alice",
    );
    assert_eq!(resolved, vec!["test-aws".to_string(), "test-aws-gov".to_string()]);
}

#[test]
fn expand_accounts_ignores_groups_owned_by_another_user() {
    let store = AccountStore::new();
    store.add_account(add_msg("test-aws", "alice", Some("release-team")));
    let resolved = store.expand_accounts(&[], &["release-team".to_string()], "bob");
    assert!(resolved.is_empty());
}

#[test]
fn credentials_for_returns_only_known_accounts() {
    let store = AccountStore::new();
    store.add_account(add_msg("test-aws", "alice", None));
    let credentials = store.credentials_for(&["test-aws".to_string(), "bogus".to_string()]);
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials["test-aws"]["access_key"], json!("test-aws-key"));
}

#[test]
fn delete_account_is_idempotent() {
    let store = AccountStore::new();
    let msg = DeleteAccountMessage {
        account_name: "never-existed".to_string(),
        provider: AccountProvider::Ec2,
        requesting_user: "alice".to_string(),
    };
    store.delete_account(msg);
}

#[test]
fn delete_account_removes_it_from_its_group() {
    let store = AccountStore::new();
    store.add_account(add_msg("test-aws", "alice", Some("release-team")));
    store.delete_account(DeleteAccountMessage {
        account_name: "test-aws".to_string(),
        provider: AccountProvider::Ec2,
        requesting_user: "alice".to_string(),
    });
    let resolved = store.expand_accounts(&[], &["release-team".to_string()], "alice");
    assert!(resolved.is_empty());
}
