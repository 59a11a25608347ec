// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message Transport (C1): a typed publish/consume seam every stage service
//! depends on, so none of them hold a concrete broker connection.
//!
//! [`Broker`] is the trait boundary, mirroring the teacher's adapter-trait-
//! then-concrete-implementation shape. [`InProcessBroker`] is the only
//! implementation shipped here: an in-memory exchange simulator sufficient
//! for a single-process deployment and for tests. Swapping in a real AMQP
//! client later means implementing [`Broker`] against it; nothing upstream
//! changes.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod broker;
mod error;
mod in_process;
mod queue_names;

pub use broker::Broker;
pub use error::TransportError;
pub use in_process::InProcessBroker;
pub use queue_names::{
    credentials_queue, job_creator_listener_queue, job_delete_queue, listener_queue, service_queue,
    CREDENTIALS_SERVICE_QUEUE,
};
