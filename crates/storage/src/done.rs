// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The OBS watcher's "done" directory: retired watchers' final state,
//! written once and never re-admitted (§4.3 step 5, §6).

use crate::store::{JobStore, StorageError};
use mash_core::JobId;
use serde::Serialize;

/// Wraps a [`JobStore`] pointed at the done directory. Retirement is
/// write-only: nothing ever scans this directory back into a running
/// watcher.
pub struct DoneStore {
    inner: JobStore,
}

impl DoneStore {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            inner: JobStore::new(dir),
        }
    }

    pub fn retire<T: Serialize>(&self, id: JobId, final_state: &T) -> Result<(), StorageError> {
        self.inner.persist(id, final_state)
    }
}

#[cfg(test)]
#[path = "done_tests.rs"]
mod tests;
