// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job persistence (C2): atomic write-temp-then-rename job files, scanned
//! back in on service start so a restart resumes exactly the jobs that were
//! admitted before it died.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod done;
mod store;

pub use done::DoneStore;
pub use store::{JobStore, StorageError};
