// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic per-job file persistence for one stage's job directory.
//!
//! Each admitted job is one file, named by its id, written via a
//! `<id>.json.tmp` sibling and `fs::rename` so a crash never leaves a
//! partially written document on disk. On start the directory is scanned
//! and every well-formed file is re-admitted; corrupt files are skipped and
//! logged, matching the teacher's breadcrumb-scan idiom.

use mash_core::JobId;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create job directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Owns one stage's on-disk job directory.
pub struct JobStore {
    dir: PathBuf,
}

impl JobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: JobId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Write a job document atomically, creating the directory if absent.
    /// Overwrites any existing file for the same id.
    pub fn persist<T: Serialize>(&self, id: JobId, job: &T) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(id);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(job)?;
        fs::write(&tmp_path, json.as_bytes())?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Remove a job's file. Idempotent: removing an id with no file is not
    /// an error (§7 `JobNotFound` is warned, not propagated, by the caller).
    pub fn delete(&self, id: JobId) -> Result<(), StorageError> {
        let path = self.path_for(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Scan the directory and deserialize every `*.json` file found.
    /// Corrupt files are skipped and reported via `tracing::warn!`, never
    /// propagated — persistence failures must not prevent a restart from
    /// admitting the jobs it can read.
    pub fn scan<T: DeserializeOwned>(&self) -> Vec<T> {
        let mut jobs = Vec::new();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return jobs,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<T>(&content) {
                    Ok(job) => jobs.push(job),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping corrupt job file");
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read job file");
                }
            }
        }

        jobs
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
