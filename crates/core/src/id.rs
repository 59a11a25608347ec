// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifiers.
//!
//! Every job is identified by a UUIDv4. The job creator assigns one when a
//! submitted document omits `id`; every downstream stage treats the id as
//! opaque and never re-derives or mutates it.

use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a job, stable across every stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a new random v4 id. Used by the job creator when a submitted
    /// document has no `id`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id from its string form, as received on the wire.
    pub fn parse(s: &str) -> Result<Self, InvalidJobId> {
        Uuid::from_str(s)
            .map(Self)
            .map_err(|_| InvalidJobId(s.to_string()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for JobId {
    fn from(u: Uuid) -> Self {
        Self(u)
    }
}

impl serde::Serialize for JobId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for JobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        JobId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// The string did not parse as a UUID.
#[derive(Debug, Clone)]
pub struct InvalidJobId(pub String);

impl fmt::Display for InvalidJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid job id: {}", self.0)
    }
}

impl std::error::Error for InvalidJobId {}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
