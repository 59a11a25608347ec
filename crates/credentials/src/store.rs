// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The backing store of account credentials (§4.7). Accounts and groups are
//! namespaced per `requesting_user`; this is the only place the opaque
//! credential values are ever materialised.

use mash_core::AccountProvider;
use mash_wire::{AddAccountMessage, DeleteAccountMessage};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct AccountRecord {
    provider: AccountProvider,
    requesting_user: String,
    credentials: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
struct GroupRecord {
    owner: String,
    members: Vec<String>,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, AccountRecord>,
    groups: HashMap<String, GroupRecord>,
}

/// In-memory account/group store, mirroring the teacher's pattern of a
/// single `parking_lot::Mutex`-guarded map owned by one service.
#[derive(Default)]
pub struct AccountStore {
    inner: Mutex<Inner>,
}

/// An account referenced by a job check or credentials request that does
/// not exist, or exists under a different user's namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAccount {
    pub name: String,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, msg: AddAccountMessage) {
        let mut inner = self.inner.lock();
        if let Some(group) = &msg.group {
            let entry = inner.groups.entry(group.clone()).or_insert_with(|| GroupRecord {
                owner: msg.requesting_user.clone(),
                members: Vec::new(),
            });
            if !entry.members.contains(&msg.account_name) {
                entry.members.push(msg.account_name.clone());
            }
        }
        inner.accounts.insert(
            msg.account_name.clone(),
            AccountRecord {
                provider: msg.provider,
                requesting_user: msg.requesting_user,
                credentials: msg.credentials,
            },
        );
    }

    /// Idempotent: deleting an account this store never held is not an
    /// error (mirrors job deletion's idempotency elsewhere in the system).
    pub fn delete_account(&self, msg: DeleteAccountMessage) {
        let mut inner = self.inner.lock();
        inner.accounts.remove(&msg.account_name);
        for group in inner.groups.values_mut() {
            group.members.retain(|name| name != &msg.account_name);
        }
    }

    fn owned_by(&self, inner: &Inner, name: &str, user: &str) -> bool {
        inner
            .accounts
            .get(name)
            .is_some_and(|record| record.requesting_user == user)
    }

    /// Expand `groups` to their member account names under `user`'s
    /// namespace, union with `accounts`, dedupe by name. Groups owned by a
    /// different user do not expand (their members are simply absent,
    /// which surfaces as a missing-account failure downstream).
    pub fn expand_accounts(&self, accounts: &[String], groups: &[String], user: &str) -> Vec<String> {
        let inner = self.inner.lock();
        let mut resolved = Vec::new();
        for name in accounts {
            if !resolved.contains(name) {
                resolved.push(name.clone());
            }
        }
        for group_name in groups {
            if let Some(group) = inner.groups.get(group_name) {
                if group.owner != user {
                    continue;
                }
                for member in &group.members {
                    if !resolved.contains(member) {
                        resolved.push(member.clone());
                    }
                }
            }
        }
        resolved
    }

    /// Verify every account in `accounts` exists, belongs to `user`, and
    /// matches `provider`. Returns the names that fail any of those checks.
    pub fn check_ownership(&self, accounts: &[String], provider: AccountProvider, user: &str) -> Vec<MissingAccount> {
        let inner = self.inner.lock();
        accounts
            .iter()
            .filter(|name| {
                !inner.accounts.get(name.as_str()).is_some_and(|record| {
                    record.requesting_user == user && record.provider == provider
                })
            })
            .map(|name| MissingAccount { name: name.clone() })
            .collect()
    }

    /// Materialise the opaque credentials for `accounts`. Returns the
    /// subset found; callers are responsible for treating an incomplete
    /// result as a validation failure if every name was expected to exist.
    pub fn credentials_for(&self, accounts: &[String]) -> serde_json::Map<String, serde_json::Value> {
        let inner = self.inner.lock();
        accounts
            .iter()
            .filter_map(|name| {
                inner
                    .accounts
                    .get(name)
                    .map(|record| (name.clone(), serde_json::Value::Object(record.credentials.clone())))
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
