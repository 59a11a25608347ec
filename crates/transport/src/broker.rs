// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The broker seam every stage service depends on instead of a concrete
//! transport connection (§4.1, §9 "global broker singletons -> passed-in
//! connection handles").

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// Publish/consume over named, durable queues. A message published before a
/// queue is bound is retained (durable); `recv` blocks until one is
/// available.
///
/// Acks are implicit in this trait: a message is considered acknowledged the
/// instant `recv` returns it, matching `InProcessBroker`'s at-least-once
/// contract (a real AMQP-backed implementation would defer the ack until the
/// caller durably records the resulting state change, per §4.1).
#[async_trait]
pub trait Broker: Send + Sync {
    /// Declare `queue`, creating it if absent. Idempotent.
    async fn bind_queue(&self, queue: &str) -> Result<(), TransportError>;

    /// Remove `queue` and drop any messages still queued on it. Idempotent:
    /// unbinding an absent queue is not an error.
    async fn unbind_queue(&self, queue: &str) -> Result<(), TransportError>;

    /// Publish `payload` to `queue`. Retried once internally on a transient
    /// failure before surfacing a [`TransportError`] to the caller (§4.1).
    async fn publish(&self, queue: &str, payload: Value) -> Result<(), TransportError>;

    /// Await the next message on `queue`. Returns `Err(QueueNotBound)` if
    /// the queue was never bound (callers must `bind_queue` first).
    async fn recv(&self, queue: &str) -> Result<Value, TransportError>;
}
