// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration shared by every stage service (§6). One YAML file is read
//! at startup; each service only consumes the sections it needs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerKind {
    InProcess,
}

impl Default for BrokerKind {
    fn default() -> Self {
        BrokerKind::InProcess
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerConfig {
    #[serde(default)]
    pub kind: BrokerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObsConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    pub download_dir: PathBuf,
}

fn default_poll_interval_secs() -> u64 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// EC2 region/helper-image tables shared by the job creator and the
/// uploader/publisher/replicator stage bodies (§6, scenario 1).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ec2CloudData {
    /// partition name -> ordered list of region names in that partition.
    #[serde(default)]
    pub partitions: HashMap<String, Vec<String>>,
    /// region name -> helper image id used to launch the uploader instance.
    #[serde(default)]
    pub helper_images: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudDataConfig {
    #[serde(default)]
    pub ec2: Ec2CloudData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub state_dir: PathBuf,
    pub log_dir: PathBuf,
    #[serde(default)]
    pub broker: BrokerConfig,
    pub obs: ObsConfig,
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub cloud_data: CloudDataConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Directory this stage service keeps its admitted-job files in.
    pub fn job_dir(&self, stage: &str) -> PathBuf {
        self.state_dir.join(format!("{stage}_jobs"))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
