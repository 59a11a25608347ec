// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory [`Broker`] sufficient for a single-process deployment and
//! for tests. Each queue is a FIFO backed by an unbounded `tokio::mpsc`
//! channel; binding creates the channel, unbinding drops it (and whatever
//! was still queued on it).

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::broker::Broker;
use crate::error::TransportError;

struct Queue {
    tx: mpsc::UnboundedSender<Value>,
    rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Value>>>,
}

#[derive(Default)]
pub struct InProcessBroker {
    queues: Mutex<HashMap<String, Queue>>,
}

impl InProcessBroker {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Broker for InProcessBroker {
    async fn bind_queue(&self, queue: &str) -> Result<(), TransportError> {
        let mut queues = self.queues.lock();
        queues.entry(queue.to_string()).or_insert_with(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            Queue {
                tx,
                rx: Arc::new(tokio::sync::Mutex::new(rx)),
            }
        });
        Ok(())
    }

    async fn unbind_queue(&self, queue: &str) -> Result<(), TransportError> {
        self.queues.lock().remove(queue);
        Ok(())
    }

    async fn publish(&self, queue: &str, payload: Value) -> Result<(), TransportError> {
        // Retry once on a send failure (the queue was concurrently unbound
        // and rebound mid-flight), matching the publish-retry-once contract
        // in §4.1.
        let mut last_err = TransportError::Closed;
        for attempt in 0..2 {
            let tx = {
                let queues = self.queues.lock();
                queues
                    .get(queue)
                    .map(|q| q.tx.clone())
                    .ok_or_else(|| TransportError::QueueNotBound(queue.to_string()))?
            };
            match tx.send(payload.clone()) {
                Ok(()) => return Ok(()),
                Err(_) => {
                    last_err = TransportError::Closed;
                    if attempt == 1 {
                        return Err(last_err);
                    }
                }
            }
        }
        Err(last_err)
    }

    async fn recv(&self, queue: &str) -> Result<Value, TransportError> {
        let rx = {
            let queues = self.queues.lock();
            queues
                .get(queue)
                .map(|q| Arc::clone(&q.rx))
                .ok_or_else(|| TransportError::QueueNotBound(queue.to_string()))?
        };
        let mut rx = rx.lock().await;
        rx.recv().await.ok_or(TransportError::Closed)
    }
}

#[cfg(test)]
#[path = "in_process_tests.rs"]
mod tests;
