// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-service file logging (§6: "one log file per service"). One process
//! runs one service (or, for `mashd all`, every service sharing one log),
//! so there is exactly one appender to set up per invocation.

use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialise a non-blocking file appender at `<log_dir>/<service>.log` and
/// install it as the global subscriber. The returned guard must be held for
/// the process lifetime — dropping it stops the background flush worker.
pub fn init(log_dir: &Path, service: &str) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::never(log_dir, format!("{service}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
