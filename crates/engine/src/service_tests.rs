// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::notifier::Notifier;
use mash_core::StageName;
use mash_transport::InProcessBroker;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex as SyncMutex;
use tempfile::TempDir;

fn stage_envelope(
    id: JobId,
    stage: StageName,
    cloud: &str,
    utctime: &str,
    last_service: StageName,
) -> StageEnvelope {
    let document = StageDocument {
        id,
        cloud: cloud.to_string(),
        utctime: utctime.to_string(),
        last_service,
        accounts: Vec::new(),
        fields: Default::default(),
        subnet: None,
        use_root_swap: false,
    };
    StageEnvelope::wrap(stage, serde_json::to_value(document).unwrap())
}

#[derive(Default)]
struct RecordingNotifier {
    successes: AtomicUsize,
    failures: AtomicUsize,
    last_failure_message: SyncMutex<Option<String>>,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_success(&self, _id: JobId, _stage: StageName) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    async fn notify_failure(&self, _id: JobId, _stage: StageName, message: &str) {
        self.failures.fetch_add(1, Ordering::SeqCst);
        *self.last_failure_message.lock() = Some(message.to_string());
    }
}

struct Harness {
    service: Arc<ListenerService>,
    broker: Arc<dyn Broker>,
    notifier: Arc<RecordingNotifier>,
    _job_dir: TempDir,
}

fn harness(stage: StageName) -> Harness {
    let broker: Arc<dyn Broker> = Arc::new(InProcessBroker::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let job_dir = TempDir::new().unwrap();
    let service = Arc::new(ListenerService::new(
        stage,
        Arc::clone(&broker),
        CloudDataConfig::default(),
        job_dir.path(),
        Duration::from_millis(50),
        notifier.clone(),
    ));
    Harness { service, broker, notifier, _job_dir: job_dir }
}

async fn yield_a_few() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn a_noop_pass_forwards_upstream_fields_and_retires_a_one_shot_job() {
    let Harness { service, broker, .. } = harness(StageName::Test);

    let id = JobId::new();
    broker.bind_queue(&listener_queue(StageName::Replicate, id)).await.unwrap();
    let envelope = stage_envelope(id, StageName::Test, "ec2", "now", StageName::Replicate);
    let assigned = service.handle_job_document(&envelope).await.unwrap();
    assert_eq!(assigned, id);

    let upstream = StatusMessage {
        id,
        status: ListenerStatus::Success,
        fields: serde_json::Map::from_iter([("cloud_image_name".to_string(), json!("ami-1"))]),
    };
    let mut raw = serde_json::Map::new();
    raw.insert(StatusMessage::result_key(StageName::Test), serde_json::to_value(&upstream).unwrap());
    broker.publish(&listener_queue(StageName::Test, id), Value::Object(raw)).await.unwrap();

    let forwarded = broker.recv(&listener_queue(StageName::Replicate, id)).await.unwrap();
    assert_eq!(forwarded["test_result"]["status"], json!("success"));
    assert_eq!(forwarded["test_result"]["cloud_image_name"], json!("ami-1"));

    yield_a_few().await;
    assert!(!service.tasks.lock().contains_key(&id));
    assert!(service.store.scan::<StageJobRecord>().is_empty());
}

#[tokio::test]
async fn reaching_last_service_notifies_instead_of_publishing() {
    let Harness { service, broker, notifier, .. } = harness(StageName::Create);

    let id = JobId::new();
    let envelope = stage_envelope(id, StageName::Create, "ec2", "now", StageName::Create);
    service.handle_job_document(&envelope).await.unwrap();

    let upstream = StatusMessage { id, status: ListenerStatus::Success, fields: serde_json::Map::new() };
    let mut raw = serde_json::Map::new();
    raw.insert(StatusMessage::result_key(StageName::Create), serde_json::to_value(&upstream).unwrap());
    broker.publish(&listener_queue(StageName::Create, id), Value::Object(raw)).await.unwrap();

    yield_a_few().await;
    assert_eq!(notifier.successes.load(Ordering::SeqCst), 1);
    assert!(!service.tasks.lock().contains_key(&id));
}

#[tokio::test]
async fn a_failing_upstream_status_is_forwarded_unchanged_and_the_job_is_dropped() {
    let Harness { service, broker, .. } = harness(StageName::Test);

    let id = JobId::new();
    broker.bind_queue(&listener_queue(StageName::Replicate, id)).await.unwrap();
    let envelope = stage_envelope(id, StageName::Test, "ec2", "now", StageName::Replicate);
    service.handle_job_document(&envelope).await.unwrap();

    let upstream = StatusMessage {
        id,
        status: ListenerStatus::Error,
        fields: serde_json::Map::from_iter([("msg".to_string(), json!("upload failed"))]),
    };
    let mut raw = serde_json::Map::new();
    raw.insert(StatusMessage::result_key(StageName::Test), serde_json::to_value(&upstream).unwrap());
    broker.publish(&listener_queue(StageName::Test, id), Value::Object(raw)).await.unwrap();

    let forwarded = broker.recv(&listener_queue(StageName::Replicate, id)).await.unwrap();
    assert_eq!(forwarded["test_result"]["status"], json!("error"));
    assert_eq!(forwarded["test_result"]["msg"], json!("upload failed"));

    yield_a_few().await;
    assert!(!service.tasks.lock().contains_key(&id));
    assert!(service.store.scan::<StageJobRecord>().is_empty());
}

#[tokio::test]
async fn a_nonstop_job_stays_admitted_across_passes() {
    let Harness { service, broker, .. } = harness(StageName::Test);

    let id = JobId::new();
    broker.bind_queue(&listener_queue(StageName::Replicate, id)).await.unwrap();
    let envelope = stage_envelope(id, StageName::Test, "ec2", "always", StageName::Replicate);
    service.handle_job_document(&envelope).await.unwrap();

    let upstream = StatusMessage { id, status: ListenerStatus::Success, fields: serde_json::Map::new() };
    let mut raw = serde_json::Map::new();
    raw.insert(StatusMessage::result_key(StageName::Test), serde_json::to_value(&upstream).unwrap());
    broker.publish(&listener_queue(StageName::Test, id), Value::Object(raw)).await.unwrap();

    broker.recv(&listener_queue(StageName::Replicate, id)).await.unwrap();
    yield_a_few().await;

    assert!(service.tasks.lock().contains_key(&id));
    assert!(!service.store.scan::<StageJobRecord>().is_empty());
}

#[tokio::test]
async fn duplicate_admission_is_rejected() {
    let Harness { service, .. } = harness(StageName::Test);

    let id = JobId::new();
    let envelope = stage_envelope(id, StageName::Test, "ec2", "now", StageName::Replicate);
    service.handle_job_document(&envelope).await.unwrap();

    let err = service.handle_job_document(&envelope).await.unwrap_err();
    assert!(matches!(err, MashError::JobAlreadyExists(_)));
}

#[tokio::test]
async fn an_unknown_cloud_is_rejected_and_reported_to_the_job_creator() {
    let Harness { service, broker, .. } = harness(StageName::Test);

    let id = JobId::new();
    broker.bind_queue(&mash_transport::job_creator_listener_queue(id)).await.unwrap();
    let envelope = stage_envelope(id, StageName::Test, "not-a-cloud", "now", StageName::Replicate);
    let err = service.handle_job_document(&envelope).await.unwrap_err();
    assert!(matches!(err, MashError::Validation(_)));
    assert!(!service.tasks.lock().contains_key(&id));

    let notice = broker.recv(&mash_transport::job_creator_listener_queue(id)).await.unwrap();
    assert_eq!(notice["id"], json!(id.to_string()));
}

#[tokio::test]
async fn job_delete_forgets_the_job_without_aborting_it() {
    let Harness { service, broker, .. } = harness(StageName::Test);

    let id = JobId::new();
    let envelope = stage_envelope(id, StageName::Test, "ec2", "always", StageName::Replicate);
    service.handle_job_document(&envelope).await.unwrap();
    assert!(service.tasks.lock().contains_key(&id));

    service.handle_job_delete(id).await.unwrap();
    assert!(!service.tasks.lock().contains_key(&id));
    assert!(service.store.scan::<StageJobRecord>().is_empty());

    // The listener queue was unbound along with the job table entry.
    let outcome = broker.publish(&listener_queue(StageName::Test, id), json!({})).await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn a_malformed_listener_message_reports_the_real_parse_error() {
    let Harness { service, broker, notifier, .. } = harness(StageName::Create);

    let id = JobId::new();
    let envelope = stage_envelope(id, StageName::Create, "ec2", "now", StageName::Create);
    service.handle_job_document(&envelope).await.unwrap();

    // Carries no `create_result` key, so `parse_upstream` rejects it.
    broker.publish(&listener_queue(StageName::Create, id), json!({"unrelated": true})).await.unwrap();

    yield_a_few().await;
    assert_eq!(notifier.failures.load(Ordering::SeqCst), 1);
    let message = notifier.last_failure_message.lock().clone().unwrap();
    assert!(message.contains("create_result"), "expected the missing-key message, got: {message}");
    assert!(!service.tasks.lock().contains_key(&id));
}

#[tokio::test]
async fn a_credentials_timeout_reports_the_real_error() {
    let Harness { service, broker, notifier, .. } = harness(StageName::Upload);

    let id = JobId::new();
    let envelope = stage_envelope(id, StageName::Upload, "ec2", "now", StageName::Upload);
    service.handle_job_document(&envelope).await.unwrap();

    // Nothing ever answers the credentials request, so the bounded wait
    // inside `CredentialsClient::request` times out.
    let upstream = StatusMessage { id, status: ListenerStatus::Success, fields: serde_json::Map::new() };
    let mut raw = serde_json::Map::new();
    raw.insert(StatusMessage::result_key(StageName::Upload), serde_json::to_value(&upstream).unwrap());
    broker.publish(&listener_queue(StageName::Upload, id), Value::Object(raw)).await.unwrap();

    yield_a_few().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(notifier.failures.load(Ordering::SeqCst), 1);
    let message = notifier.last_failure_message.lock().clone().unwrap();
    assert!(message.to_lowercase().contains("credentials"), "expected a credentials-timeout message, got: {message}");
    assert!(!service.tasks.lock().contains_key(&id));
}

#[tokio::test]
async fn a_run_job_failure_reports_the_real_validation_error() {
    let Harness { service, broker, notifier, .. } = harness(StageName::Upload);

    let id = JobId::new();
    broker.bind_queue(mash_transport::CREDENTIALS_SERVICE_QUEUE).await.unwrap();

    // An ec2 account with no configured partition makes `run_job` fail
    // validation instead of resolving a helper image.
    let account = mash_core::Account {
        name: "acct-a".to_string(),
        provider: mash_core::AccountProvider::Ec2,
        requesting_user: "alice".to_string(),
        overrides: Default::default(),
    };
    let document = StageDocument {
        id,
        cloud: "ec2".to_string(),
        utctime: "now".to_string(),
        last_service: StageName::Upload,
        accounts: vec![account],
        fields: Default::default(),
        subnet: None,
        use_root_swap: false,
    };
    let envelope = StageEnvelope::wrap(StageName::Upload, serde_json::to_value(document).unwrap());
    service.handle_job_document(&envelope).await.unwrap();

    let upstream = StatusMessage { id, status: ListenerStatus::Success, fields: serde_json::Map::new() };
    let mut raw = serde_json::Map::new();
    raw.insert(StatusMessage::result_key(StageName::Upload), serde_json::to_value(&upstream).unwrap());
    broker.publish(&listener_queue(StageName::Upload, id), Value::Object(raw)).await.unwrap();

    let request = broker.recv(mash_transport::CREDENTIALS_SERVICE_QUEUE).await.unwrap();
    let reply_to = request["reply_to"].as_str().unwrap().to_string();
    broker.bind_queue(&reply_to).await.unwrap();
    broker.publish(&reply_to, json!({"credentials": {"acct-a": {"key": "value"}}})).await.unwrap();

    yield_a_few().await;
    assert_eq!(notifier.failures.load(Ordering::SeqCst), 1);
    let message = notifier.last_failure_message.lock().clone().unwrap();
    assert!(message.contains("acct-a"), "expected the missing-partition message, got: {message}");
    assert!(!service.tasks.lock().contains_key(&id));
}

#[tokio::test]
async fn resume_respawns_every_persisted_job() {
    let Harness { service, .. } = harness(StageName::Test);

    let id = JobId::new();
    let record = StageJobRecord {
        id,
        cloud: "ec2".to_string(),
        utctime: "always".to_string(),
        last_service: StageName::Replicate,
        accounts: Vec::new(),
        iteration_count: 0,
        status: Status::Pending,
        credentials: HashMap::new(),
        subnet: None,
        use_root_swap: false,
    };
    service.store.persist(id, &record).unwrap();

    service.resume().await;
    tokio::task::yield_now().await;
    assert!(service.tasks.lock().contains_key(&id));
}
