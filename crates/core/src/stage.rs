// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed pipeline stage ordering.

use crate::simple_display;
use serde::{Deserialize, Serialize};

/// One stage of the release pipeline. Every stage runs as its own service
/// process, bound to exactly one position in [`PIPELINE_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageName {
    Obs,
    Upload,
    Test,
    Replicate,
    Publish,
    Deprecate,
    Create,
}

simple_display! {
    StageName {
        Obs => "obs",
        Upload => "upload",
        Test => "test",
        Replicate => "replicate",
        Publish => "publish",
        Deprecate => "deprecate",
        Create => "create",
    }
}

/// The pipeline's fixed stage ordering. A job's `last_service` must name one
/// of these; stages are published to in this order up to and including it.
pub const PIPELINE_ORDER: [StageName; 7] = [
    StageName::Obs,
    StageName::Upload,
    StageName::Test,
    StageName::Replicate,
    StageName::Publish,
    StageName::Deprecate,
    StageName::Create,
];

impl StageName {
    /// Parse a stage name as it appears in `last_service` or a routing key.
    pub fn parse(s: &str) -> Option<Self> {
        PIPELINE_ORDER.iter().copied().find(|st| st.to_string() == s)
    }

    /// Position of this stage in the fixed ordering, 0-based.
    pub fn index(self) -> usize {
        PIPELINE_ORDER
            .iter()
            .position(|&st| st == self)
            .expect("every StageName variant appears in PIPELINE_ORDER")
    }

    /// The stage immediately following this one, or `None` at the end of the
    /// pipeline.
    pub fn next(self) -> Option<Self> {
        PIPELINE_ORDER.get(self.index() + 1).copied()
    }

    /// Every stage up to and including `last_service`, in pipeline order.
    pub fn up_to(last_service: Self) -> &'static [StageName] {
        &PIPELINE_ORDER[..=last_service.index()]
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
