// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job creator's own mirror of account and group data (§4.4 step 3).
//! Kept in sync with the same `add_account`/`delete_account` messages the
//! credentials courier's `AccountStore` consumes — both services need this
//! data independently, one to materialise credentials, the other to resolve
//! target accounts and derive per-stage region payloads.

use mash_core::{Account, JobDocument, MashError};
use mash_wire::{AddAccountMessage, DeleteAccountMessage};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    groups: HashMap<(String, String), Vec<String>>,
}

#[derive(Default)]
pub struct AccountDirectory {
    inner: Mutex<Inner>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, msg: AddAccountMessage) {
        let mut inner = self.inner.lock();
        if let Some(group) = &msg.group {
            let key = (msg.requesting_user.clone(), group.clone());
            let members = inner.groups.entry(key).or_default();
            if !members.contains(&msg.account_name) {
                members.push(msg.account_name.clone());
            }
        }
        inner.accounts.insert(
            msg.account_name.clone(),
            Account {
                name: msg.account_name,
                provider: msg.provider,
                requesting_user: msg.requesting_user,
                overrides: msg.overrides,
            },
        );
    }

    pub fn delete_account(&self, msg: DeleteAccountMessage) {
        let mut inner = self.inner.lock();
        inner.accounts.remove(&msg.account_name);
        for members in inner.groups.values_mut() {
            members.retain(|name| name != &msg.account_name);
        }
    }

    /// Resolve `doc`'s `cloud_accounts`/`cloud_groups` into one deduped
    /// account list (§4.4 step 3). Accounts named directly in the document
    /// carry their overrides inline; group members are looked up in this
    /// directory and must already exist under the same `requesting_user`.
    pub fn resolve_target_accounts(&self, doc: &JobDocument) -> Result<Vec<Account>, MashError> {
        let provider = mash_core::AccountProvider::parse(&doc.cloud)
            .ok_or_else(|| MashError::Validation(format!("unknown cloud: {:?}", doc.cloud)))?;

        let inner = self.inner.lock();
        let mut accounts = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for account_ref in &doc.cloud_accounts {
            if seen.insert(account_ref.name.clone()) {
                accounts.push(Account {
                    name: account_ref.name.clone(),
                    provider,
                    requesting_user: doc.requesting_user.clone(),
                    overrides: account_ref.overrides.clone(),
                });
            }
        }

        for group_name in &doc.cloud_groups {
            let key = (doc.requesting_user.clone(), group_name.clone());
            let members = inner
                .groups
                .get(&key)
                .ok_or_else(|| MashError::Validation(format!("unknown group: {group_name:?}")))?;
            for member in members {
                if seen.insert(member.clone()) {
                    let account = inner.accounts.get(member).cloned().ok_or_else(|| {
                        MashError::Validation(format!("group {group_name} names unknown account {member}"))
                    })?;
                    accounts.push(account);
                }
            }
        }

        Ok(accounts)
    }
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod tests;
