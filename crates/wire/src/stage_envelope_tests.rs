// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn wrap_uses_stage_specific_key() {
    let envelope = StageEnvelope::wrap(StageName::Upload, json!({"id": "abc"}));
    assert!(envelope.0.contains_key("uploader_job"));
}

#[test]
fn payload_for_round_trips() {
    let envelope = StageEnvelope::wrap(StageName::Publish, json!({"id": "abc"}));
    assert_eq!(
        envelope.payload_for(StageName::Publish),
        Some(&json!({"id": "abc"}))
    );
    assert_eq!(envelope.payload_for(StageName::Create), None);
}

#[test]
fn every_stage_has_a_distinct_key() {
    let keys: Vec<_> = mash_core::PIPELINE_ORDER
        .iter()
        .map(|&s| stage_document_key(s))
        .collect();
    let mut unique = keys.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(keys.len(), unique.len());
}
