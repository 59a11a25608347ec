// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no queue bound with name {0:?}")]
    QueueNotBound(String),
    #[error("broker connection closed")]
    Closed,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
