// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn every_service_has_a_distinct_log_name() {
    let names: Vec<&str> = [
        Service::Obs,
        Service::JobCreator,
        Service::Upload,
        Service::Test,
        Service::Replicate,
        Service::Publish,
        Service::Deprecate,
        Service::Create,
        Service::Credentials,
        Service::All,
    ]
    .iter()
    .map(|s| s.log_name())
    .collect();
    let unique: std::collections::HashSet<_> = names.iter().collect();
    assert_eq!(names.len(), unique.len());
}

#[test]
fn parses_a_stage_subcommand_with_explicit_config_path() {
    let cli = Cli::try_parse_from(["mashd", "--config", "/tmp/mash.yaml", "upload"]).unwrap();
    assert_eq!(cli.config, PathBuf::from("/tmp/mash.yaml"));
    assert!(matches!(cli.service, Service::Upload));
}

#[test]
fn defaults_to_etc_mash_config_when_unset() {
    let cli = Cli::try_parse_from(["mashd", "credentials"]).unwrap();
    assert_eq!(cli.config, PathBuf::from("/etc/mash/config.yaml"));
}

#[test]
fn rejects_an_unknown_subcommand() {
    assert!(Cli::try_parse_from(["mashd", "not-a-service"]).is_err());
}

#[test]
fn fake_build_service_defaults_to_false_and_can_be_set() {
    let cli = Cli::try_parse_from(["mashd", "obs"]).unwrap();
    assert!(!cli.fake_build_service);

    let cli = Cli::try_parse_from(["mashd", "--fake-build-service", "obs"]).unwrap();
    assert!(cli.fake_build_service);
}

fn test_config() -> mash_core::config::Config {
    mash_core::config::Config {
        state_dir: PathBuf::from("/tmp/mash-test-state"),
        log_dir: PathBuf::from("/tmp/mash-test-logs"),
        broker: Default::default(),
        obs: mash_core::config::ObsConfig {
            poll_interval_secs: 5,
            download_dir: PathBuf::from("/tmp/mash-test-downloads"),
        },
        credentials: mash_core::config::CredentialsConfig { request_timeout_secs: 30 },
        cloud_data: Default::default(),
    }
}

#[tokio::test]
async fn obs_without_the_fake_flag_is_a_fatal_config_error() {
    let broker: Arc<dyn Broker> = Arc::new(InProcessBroker::new());
    let err = run_obs(false, test_config(), broker).await.unwrap_err();
    assert!(matches!(err, MashError::FatalConfig(_)));
}
