// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::client::{BinaryEntry, FakeBuildServiceClient, PackageInfo};
use mash_core::Condition;
use tempfile::tempdir;

fn job(conditions: Vec<Condition>, nonstop: bool) -> ObsJob {
    ObsJob {
        id: JobId::new(),
        project: "Virtualization:Appliances:Images:Testing".to_string(),
        package: "test-image".to_string(),
        conditions,
        nonstop,
    }
}

#[tokio::test]
async fn complied_pass_downloads_images_and_retires_a_one_shot_job() {
    let client = FakeBuildServiceClient::new();
    client.set_metadata(
        "Virtualization:Appliances:Images:Testing",
        "test-image",
        vec![PackageInfo { name: "test-image".into(), version: "1.42.1".into(), release: "0".into(), arch: "x86_64".into() }],
    );
    client.set_binaries(
        "Virtualization:Appliances:Images:Testing",
        "test-image",
        vec![
            BinaryEntry { name: "test-image.raw.xz".into(), mtime: 100 },
            BinaryEntry { name: "test-image.raw.xz.sha256".into(), mtime: 100 },
            BinaryEntry { name: "test-image.spec".into(), mtime: 100 },
        ],
    );
    let dir = tempdir().unwrap();
    let job = job(vec![Condition::Image { image: "1.42.1".to_string() }], false);

    let outcome = run_pass(&job, &client, dir.path()).await.unwrap();

    assert_eq!(outcome.state.job_status, BuildJobStatus::Success);
    assert!(outcome.retire);
    assert_eq!(outcome.publish.as_ref().unwrap().len(), 2);
    assert!(!client.is_locked(&job.project, &job.package));
}

#[tokio::test]
async fn nonstop_job_complied_pass_does_not_retire() {
    let client = FakeBuildServiceClient::new();
    client.set_metadata(
        "Virtualization:Appliances:Images:Testing",
        "test-image",
        vec![PackageInfo { name: "test-image".into(), version: "1.42.1".into(), release: "0".into(), arch: "x86_64".into() }],
    );
    client.set_binaries("Virtualization:Appliances:Images:Testing", "test-image", vec![]);
    let dir = tempdir().unwrap();
    let job = job(vec![], true);

    let outcome = run_pass(&job, &client, dir.path()).await.unwrap();
    assert_eq!(outcome.state.job_status, BuildJobStatus::Success);
    assert!(!outcome.retire);
}

#[tokio::test]
async fn unsatisfied_condition_stays_prepared_and_does_not_publish() {
    let client = FakeBuildServiceClient::new();
    client.set_metadata(
        "Virtualization:Appliances:Images:Testing",
        "test-image",
        vec![PackageInfo { name: "test-image".into(), version: "1.0.0".into(), release: "0".into(), arch: "x86_64".into() }],
    );
    let dir = tempdir().unwrap();
    let job = job(vec![Condition::Image { image: "1.42.1".to_string() }], false);

    let outcome = run_pass(&job, &client, dir.path()).await.unwrap();
    assert_eq!(outcome.state.job_status, BuildJobStatus::Prepared);
    assert!(outcome.publish.is_none());
    assert!(!outcome.retire);
}

#[tokio::test]
async fn lock_held_by_another_actor_fails_the_pass_without_touching_the_lock() {
    let client = FakeBuildServiceClient::new();
    client.hold_lock_externally("Virtualization:Appliances:Images:Testing", "test-image");
    let dir = tempdir().unwrap();
    let job = job(vec![], false);

    let outcome = run_pass(&job, &client, dir.path()).await.unwrap();
    assert_eq!(outcome.state.job_status, BuildJobStatus::Failed);
    assert!(client.is_locked(&job.project, &job.package));
}

#[tokio::test]
async fn bare_equals_condition_propagates_a_version_expression_error() {
    let client = FakeBuildServiceClient::new();
    let dir = tempdir().unwrap();
    let job = job(
        vec![Condition::Package { package: ("kernel-default".to_string(), "=".to_string(), "4.13.1".to_string(), None) }],
        false,
    );

    let err = run_pass(&job, &client, dir.path()).await.unwrap_err();
    assert!(matches!(err, MashError::VersionExpression(_)));
    assert!(!client.is_locked(&job.project, &job.package));
}
