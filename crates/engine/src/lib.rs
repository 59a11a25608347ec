// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener Service Framework (C5) and Stage Job Runtime wiring (C6): the
//! process every pipeline stage but OBS runs, admitting `<stage>_job`
//! documents and driving one [`StageJob`][mash_adapters::StageJob] pass per
//! incoming listener message (§4.5, §4.6).

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod notifier;
mod record;
mod service;

pub use notifier::{LoggingNotifier, Notifier};
pub use record::StageJobRecord;
pub use service::ListenerService;
