// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The remote build service seam (§4.3 [ADDED]), grounded in
//! `original_source/mash/services/obs/build_result.py`'s `osc`/
//! `get_binarylist`/`get_binary_file` calls. `FakeBuildServiceClient` backs
//! every test in this crate; a real implementation would shell out to `osc`
//! or call the Open Build Service's REST API.

use async_trait::async_trait;
use mash_core::MashError;
use md5::{Digest, Md5};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One package's build metadata, as reported by the build service's binary
/// list for a project/package/repo/arch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub release: String,
    pub arch: String,
}

impl PackageInfo {
    /// The string hashed into `packages_checksum`: `name-version-release.arch`.
    fn checksum_key(&self) -> String {
        format!("{}-{}-{}.{}", self.name, self.version, self.release, self.arch)
    }
}

/// One file available in a build's binary list, with the remote's last
/// modification time so the download preserves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryEntry {
    pub name: String,
    pub mtime: u64,
}

/// A file matching the image/sha256 naming the watcher downloads, per
/// `_match_image_file`.
pub fn is_image_file(name: &str) -> bool {
    name.ends_with(".iso") || name.ends_with(".xz") || name.ends_with(".sha256")
}

/// `md5(sorted(checksum_key for each package))`, matching the teacher's
/// deterministic checksum over a build's full package list.
pub fn packages_checksum(packages: &[PackageInfo]) -> String {
    let mut keys: Vec<_> = packages.iter().map(PackageInfo::checksum_key).collect();
    keys.sort();
    let joined = keys.join(",");
    format!("{:x}", Md5::digest(joined.as_bytes()))
}

/// The remote build service: package locking, metadata/binary lookup, and
/// artefact download.
#[async_trait]
pub trait BuildServiceClient: Send + Sync {
    /// Acquire the cooperative package lock. Fails if another actor holds it.
    async fn lock(&self, project: &str, package: &str) -> Result<(), MashError>;

    async fn unlock(&self, project: &str, package: &str) -> Result<(), MashError>;

    /// The package's full binary metadata list (used to derive the image
    /// version and the packages checksum).
    async fn fetch_metadata(&self, project: &str, package: &str) -> Result<Vec<PackageInfo>, MashError>;

    /// The binary file listing for the `images` repo, remote mtimes included.
    async fn fetch_binaries(&self, project: &str, package: &str) -> Result<Vec<BinaryEntry>, MashError>;

    /// Download one binary into `target_dir`, preserving `entry`'s mtime.
    /// Returns the local path.
    async fn download(
        &self,
        project: &str,
        package: &str,
        entry: &BinaryEntry,
        target_dir: &Path,
    ) -> Result<PathBuf, MashError>;
}

/// An in-memory stand-in for the build service, configured per project/package
/// with a canned response. Lock state is shared across clones via `Arc`.
#[derive(Clone, Default)]
pub struct FakeBuildServiceClient {
    locks: Arc<Mutex<HashMap<(String, String), bool>>>,
    metadata: Arc<Mutex<HashMap<(String, String), Vec<PackageInfo>>>>,
    binaries: Arc<Mutex<HashMap<(String, String), Vec<BinaryEntry>>>>,
}

impl FakeBuildServiceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_metadata(&self, project: &str, package: &str, packages: Vec<PackageInfo>) {
        self.metadata
            .lock()
            .insert((project.to_string(), package.to_string()), packages);
    }

    pub fn set_binaries(&self, project: &str, package: &str, binaries: Vec<BinaryEntry>) {
        self.binaries
            .lock()
            .insert((project.to_string(), package.to_string()), binaries);
    }

    /// Simulate another actor already holding the lock for this package.
    pub fn hold_lock_externally(&self, project: &str, package: &str) {
        self.locks
            .lock()
            .insert((project.to_string(), package.to_string()), true);
    }

    pub fn is_locked(&self, project: &str, package: &str) -> bool {
        self.locks
            .lock()
            .get(&(project.to_string(), package.to_string()))
            .copied()
            .unwrap_or(false)
    }
}

#[async_trait]
impl BuildServiceClient for FakeBuildServiceClient {
    async fn lock(&self, project: &str, package: &str) -> Result<(), MashError> {
        let key = (project.to_string(), package.to_string());
        let mut locks = self.locks.lock();
        if *locks.get(&key).unwrap_or(&false) {
            return Err(MashError::RemoteUnavailable(format!(
                "{project}/{package} is locked by another actor"
            )));
        }
        locks.insert(key, true);
        Ok(())
    }

    async fn unlock(&self, project: &str, package: &str) -> Result<(), MashError> {
        self.locks
            .lock()
            .insert((project.to_string(), package.to_string()), false);
        Ok(())
    }

    async fn fetch_metadata(&self, project: &str, package: &str) -> Result<Vec<PackageInfo>, MashError> {
        Ok(self
            .metadata
            .lock()
            .get(&(project.to_string(), package.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_binaries(&self, project: &str, package: &str) -> Result<Vec<BinaryEntry>, MashError> {
        Ok(self
            .binaries
            .lock()
            .get(&(project.to_string(), package.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn download(
        &self,
        _project: &str,
        _package: &str,
        entry: &BinaryEntry,
        target_dir: &Path,
    ) -> Result<PathBuf, MashError> {
        Ok(target_dir.join(&entry.name))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
