// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-stage job document envelope (§6): `obs_job`, `uploader_job`,
//! `testing_job`, `replication_job`, `publisher_job`, `deprecation_job`,
//! `create_job`, `credentials_job`.

use mash_core::StageName;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The envelope key a stage document is wrapped under on the wire, e.g.
/// `{"uploader_job": {...}}`.
pub fn stage_document_key(stage: StageName) -> &'static str {
    match stage {
        StageName::Obs => "obs_job",
        StageName::Upload => "uploader_job",
        StageName::Test => "testing_job",
        StageName::Replicate => "replication_job",
        StageName::Publish => "publisher_job",
        StageName::Deprecate => "deprecation_job",
        StageName::Create => "create_job",
    }
}

/// A stage document as received off the wire: a single-key object whose key
/// names the stage and whose value is the stage-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageEnvelope(pub serde_json::Map<String, Value>);

impl StageEnvelope {
    /// Wrap a payload under the envelope key for `stage`.
    pub fn wrap(stage: StageName, payload: Value) -> Self {
        let mut map = serde_json::Map::new();
        map.insert(stage_document_key(stage).to_string(), payload);
        Self(map)
    }

    /// Extract the payload for `stage`, if this envelope carries it.
    pub fn payload_for(&self, stage: StageName) -> Option<&Value> {
        self.0.get(stage_document_key(stage))
    }
}

#[cfg(test)]
#[path = "stage_envelope_tests.rs"]
mod tests;
