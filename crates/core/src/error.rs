// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared error taxonomy every stage service classifies its failures
//! into (§7). Each variant carries its own handling rule; see the doc
//! comment on each for what the framework does with it.

use crate::version::VersionExpressionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MashError {
    /// A submitted document failed schema validation. The framework rejects
    /// the message and notifies the originator; it is never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// The broker connection failed mid-operation. Logged, retried once,
    /// then the current pass is marked failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The target cloud or build service is unreachable. The pass is marked
    /// failed; a nonstop job remains admitted for the next tick.
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// The credentials courier did not reply within the configured deadline.
    /// The pass becomes `EXCEPTION` and is forwarded to cleanup.
    #[error("credentials request timed out after {0:?}")]
    CredentialsTimeout(std::time::Duration),

    /// Configuration failed to load or validate at startup. The service
    /// logs and exits non-zero.
    #[error("fatal configuration error: {0}")]
    FatalConfig(String),

    /// Admission of a job id already held by this service. Warned and
    /// ignored; not a fatal condition.
    #[error("job already exists: {0}")]
    JobAlreadyExists(String),

    /// Deletion of a job id this service does not hold. Warned and ignored;
    /// deletion is idempotent.
    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("ambiguous version expression: {0}")]
    VersionExpression(#[from] VersionExpressionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
