// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mashd` — one thin entry point per pipeline service (§6): reads the
//! shared YAML configuration, sets up per-service file logging, and starts
//! the Listener Service Framework (or the job creator / credentials
//! courier / build-result watcher) wired to an in-process broker.
//!
//! Every subcommand shares the same exit-code contract: `0` on a clean
//! `SIGINT`/`Ctrl-C` shutdown, `1` on a configuration error or an
//! unexpected service exception.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod logging;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mash_core::config::Config;
use mash_core::{MashError, StageName};
use mash_engine::{ListenerService, LoggingNotifier};
use mash_obswatcher::{FakeBuildServiceClient, ObsWatcherService};
use mash_transport::{Broker, InProcessBroker};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "mashd", version, about = "MASH pipeline service entry points")]
struct Cli {
    /// Path to the shared YAML configuration file.
    #[arg(long, default_value = "/etc/mash/config.yaml")]
    config: PathBuf,

    /// Acknowledge that `obs` (or `all`) runs against the in-memory fake
    /// build-service client rather than a real OBS connection. No real
    /// `BuildServiceClient` is implemented; this flag exists so that fact
    /// can't be missed rather than silently shipped.
    #[arg(long)]
    fake_build_service: bool,

    #[command(subcommand)]
    service: Service,
}

#[derive(Subcommand, Clone, Copy)]
enum Service {
    /// Build-Result Watcher (C3).
    Obs,
    /// Job Creator (C4).
    JobCreator,
    /// Upload stage (C5/C6).
    Upload,
    /// Test stage (C5/C6).
    Test,
    /// Replicate stage (C5/C6).
    Replicate,
    /// Publish stage (C5/C6).
    Publish,
    /// Deprecate stage (C5/C6).
    Deprecate,
    /// Create stage (C5/C6).
    Create,
    /// Credentials Courier (C7).
    Credentials,
    /// Every service in one process, sharing one in-process broker.
    All,
}

impl Service {
    fn log_name(self) -> &'static str {
        match self {
            Service::Obs => "obs",
            Service::JobCreator => "jobcreator",
            Service::Upload => "upload",
            Service::Test => "test",
            Service::Replicate => "replicate",
            Service::Publish => "publish",
            Service::Deprecate => "deprecate",
            Service::Create => "create",
            Service::Credentials => "credentials",
            Service::All => "mashd",
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let _log_guard = logging::init(&config.log_dir, cli.service.log_name())?;

    info!(service = cli.service.log_name(), "starting");
    let broker: Arc<dyn Broker> = Arc::new(InProcessBroker::new());

    tokio::select! {
        result = dispatch(cli.service, cli.fake_build_service, config, broker) => result.map_err(|e| anyhow!("{e}")),
        _ = tokio::signal::ctrl_c() => {
            info!("received interrupt, shutting down");
            Ok(())
        }
    }
}

async fn dispatch(
    service: Service,
    fake_build_service: bool,
    config: Config,
    broker: Arc<dyn Broker>,
) -> Result<(), MashError> {
    match service {
        Service::Obs => run_obs(fake_build_service, config, broker).await,
        Service::JobCreator => run_job_creator(config, broker).await,
        Service::Credentials => run_credentials(broker).await,
        Service::All => run_all(fake_build_service, config, broker).await,
        Service::Upload => run_stage(StageName::Upload, config, broker).await,
        Service::Test => run_stage(StageName::Test, config, broker).await,
        Service::Replicate => run_stage(StageName::Replicate, config, broker).await,
        Service::Publish => run_stage(StageName::Publish, config, broker).await,
        Service::Deprecate => run_stage(StageName::Deprecate, config, broker).await,
        Service::Create => run_stage(StageName::Create, config, broker).await,
    }
}

async fn run_stage(stage: StageName, config: Config, broker: Arc<dyn Broker>) -> Result<(), MashError> {
    let service = Arc::new(ListenerService::new(
        stage,
        broker,
        config.cloud_data,
        config.job_dir(&stage.to_string()),
        Duration::from_secs(config.credentials.request_timeout_secs),
        Arc::new(LoggingNotifier),
    ));
    service.run().await
}

async fn run_obs(fake_build_service: bool, config: Config, broker: Arc<dyn Broker>) -> Result<(), MashError> {
    if !fake_build_service {
        return Err(MashError::FatalConfig(
            "obs requires --fake-build-service: no real BuildServiceClient is implemented yet"
                .to_string(),
        ));
    }
    let client = Arc::new(FakeBuildServiceClient::new());
    let done_dir = config.state_dir.join("obs_jobs_done");
    let service = Arc::new(ObsWatcherService::new(
        broker,
        client,
        config.job_dir("obs"),
        done_dir,
        Duration::from_secs(config.obs.poll_interval_secs),
        config.obs.download_dir.clone(),
    ));
    service.run().await
}

async fn run_job_creator(config: Config, broker: Arc<dyn Broker>) -> Result<(), MashError> {
    mash_jobcreator::JobCreatorService::new(broker, config.cloud_data).run().await
}

async fn run_credentials(broker: Arc<dyn Broker>) -> Result<(), MashError> {
    mash_credentials::CredentialsService::new(broker).run().await
}

/// Runs every service as its own task sharing one broker — the
/// single-binary deployment an in-process broker is meant for, since its
/// queues live only in one process's memory. Every service loop runs until
/// it errors, so the first failure is surfaced as soon as it happens rather
/// than waiting on whichever task happens to be spawned first; dropping the
/// `JoinSet` on the way out aborts the rest.
async fn run_all(fake_build_service: bool, config: Config, broker: Arc<dyn Broker>) -> Result<(), MashError> {
    let stages = [
        StageName::Upload,
        StageName::Test,
        StageName::Replicate,
        StageName::Publish,
        StageName::Deprecate,
        StageName::Create,
    ];

    let mut set = tokio::task::JoinSet::new();
    set.spawn(run_obs(fake_build_service, config.clone(), Arc::clone(&broker)));
    set.spawn(run_job_creator(config.clone(), Arc::clone(&broker)));
    set.spawn(run_credentials(Arc::clone(&broker)));
    for stage in stages {
        set.spawn(run_stage(stage, config.clone(), Arc::clone(&broker)));
    }

    while let Some(result) = set.join_next().await {
        result.map_err(|e| MashError::Transport(e.to_string()))??;
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
