//! Integration tests for the flow log pipeline.
//!
//! These tests use the real Pipeline, provisioner, loader and decoder but mock
//! the storage and index backends (ObjectStore and IndexProvider).

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;

use flowlog_indexer::deadline::Deadline;
use flowlog_indexer::errors::PipelineError;
use flowlog_indexer::loader::FlowLogLoader;
use flowlog_indexer::orchestrator::{ObjectOutcome, Pipeline, ProcessingStep};
use flowlog_indexer::provisioner::IndexProvisioner;
use flowlog_indexer::source::ObjectStore;
use flowlog_indexer::trigger::Notification;
use flowlog_indexer_repository::{BulkOperationSummary, IndexProvider, IndexProviderError};
use flowlog_indexer_shared::FlowLogRecord;

const HEADER: &str = "version account-id interface-id srcaddr dstaddr srcport dstport protocol packets bytes start end action log-status type";

const OK_ROW: &str = "2 123456789012 eni-0a1b2c3d 10.0.1.5 10.0.2.9 443 49152 6 10 8400 1700000000 1700000060 ACCEPT OK IPv4";

const NODATA_ROW: &str = "2 123456789012 eni-0a1b2c3d 10.0.1.5 10.0.2.9 443 49152 6 10 8400 1700000000 1700000060 ACCEPT NODATA IPv4";

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn flow_log(rows: &[&str]) -> Vec<u8> {
    let mut text = format!("{}\n", HEADER);
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    gzip(&text)
}

// Mock object store backed by a map of (bucket, key) to content
struct MockObjectStore {
    objects: HashMap<(String, String), Vec<u8>>,
    fetches: Mutex<Vec<(String, String, String)>>,
    delay: Option<Duration>,
}

impl MockObjectStore {
    fn new() -> Self {
        Self {
            objects: HashMap::new(),
            fetches: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    fn with_object(mut self, bucket: &str, key: &str, content: Vec<u8>) -> Self {
        self.objects
            .insert((bucket.to_string(), key.to_string()), content);
        self
    }

    fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn fetch(&self, bucket: &str, key: &str, region: &str) -> Result<Bytes, PipelineError> {
        self.fetches
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string(), region.to_string()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|content| Bytes::from(content.clone()))
            .ok_or_else(|| {
                PipelineError::retrieval(format!("NoSuchKey: {} in bucket {}", key, bucket))
            })
    }
}

// Mock index provider that keeps indices and documents in memory
struct MockIndexProvider {
    indices: Mutex<HashSet<String>>,
    create_calls: Mutex<Vec<String>>,
    bulk_calls: Mutex<Vec<(String, Vec<FlowLogRecord>)>>,
    flush_calls: Mutex<Vec<String>>,
    acknowledge_create: bool,
}

impl MockIndexProvider {
    fn new() -> Self {
        Self {
            indices: Mutex::new(HashSet::new()),
            create_calls: Mutex::new(Vec::new()),
            bulk_calls: Mutex::new(Vec::new()),
            flush_calls: Mutex::new(Vec::new()),
            acknowledge_create: true,
        }
    }

    fn unacknowledged() -> Self {
        Self {
            acknowledge_create: false,
            ..Self::new()
        }
    }

    fn created(&self) -> Vec<String> {
        self.create_calls.lock().unwrap().clone()
    }

    fn documents(&self) -> Vec<FlowLogRecord> {
        self.bulk_calls
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, records)| records.clone())
            .collect()
    }

    fn bulk_count(&self) -> usize {
        self.bulk_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl IndexProvider for MockIndexProvider {
    async fn index_exists(&self, index: &str) -> Result<bool, IndexProviderError> {
        Ok(self.indices.lock().unwrap().contains(index))
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<bool, IndexProviderError> {
        assert_eq!(body["mappings"]["properties"]["srcaddr"]["type"], "ip");
        self.create_calls.lock().unwrap().push(index.to_string());
        if self.acknowledge_create {
            self.indices.lock().unwrap().insert(index.to_string());
        }
        Ok(self.acknowledge_create)
    }

    async fn bulk_index(
        &self,
        index: &str,
        records: &[FlowLogRecord],
    ) -> Result<BulkOperationSummary, IndexProviderError> {
        self.bulk_calls
            .lock()
            .unwrap()
            .push((index.to_string(), records.to_vec()));
        Ok(BulkOperationSummary::all_succeeded(records.len()))
    }

    async fn flush(&self, index: &str) -> Result<(), IndexProviderError> {
        self.flush_calls.lock().unwrap().push(index.to_string());
        Ok(())
    }
}

fn processing_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

fn pipeline(store: Arc<MockObjectStore>, provider: Arc<MockIndexProvider>) -> Pipeline {
    Pipeline::new(
        store,
        IndexProvisioner::new(provider.clone()),
        FlowLogLoader::new(provider),
        "flowlogs",
    )
    .with_clock(processing_date)
}

fn deadline() -> Deadline {
    Deadline::after(Duration::from_secs(60))
}

#[tokio::test]
async fn test_only_eligible_row_is_indexed() {
    let store = Arc::new(MockObjectStore::new().with_object(
        "vpc-logs",
        "a.log.gz",
        flow_log(&[OK_ROW, NODATA_ROW]),
    ));
    let provider = Arc::new(MockIndexProvider::new());
    let pipeline = pipeline(store, provider.clone());

    let report = pipeline
        .run(&[Notification::new("vpc-logs", "a.log.gz", "eu-west-1")], deadline())
        .await;

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.indexed(), 1);

    let object = &report.objects[0];
    assert_eq!(object.index.as_deref(), Some("flowlogs-vpc-logs-2024-01-15"));
    match &object.outcome {
        ObjectOutcome::Done(summary) => {
            assert_eq!(summary.parsed, 2);
            assert_eq!(summary.dropped, 1);
            assert_eq!(summary.indexed, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let documents = provider.documents();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].log_status, "OK");
    assert_eq!(documents[0].srcaddr, "10.0.1.5");
    assert_eq!(provider.created(), vec!["flowlogs-vpc-logs-2024-01-15".to_string()]);
    assert_eq!(
        *provider.flush_calls.lock().unwrap(),
        vec!["flowlogs-vpc-logs-2024-01-15".to_string()]
    );
}

#[tokio::test]
async fn test_non_gzip_object_fails_before_provisioning() {
    let store = Arc::new(MockObjectStore::new().with_object(
        "vpc-logs",
        "plain.log",
        format!("{}\n{}\n", HEADER, OK_ROW).into_bytes(),
    ));
    let provider = Arc::new(MockIndexProvider::new());
    let pipeline = pipeline(store, provider.clone());

    let report = pipeline
        .run(&[Notification::new("vpc-logs", "plain.log", "eu-west-1")], deadline())
        .await;

    assert_eq!(report.failed(), 1);
    match &report.objects[0].outcome {
        ObjectOutcome::Failed { step, error } => {
            assert_eq!(*step, ProcessingStep::Decoding);
            assert!(matches!(error, PipelineError::DecompressionError(_)));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(provider.created().is_empty());
    assert_eq!(provider.bulk_count(), 0);
}

#[tokio::test]
async fn test_unacknowledged_index_creation_skips_loading() {
    let store = Arc::new(MockObjectStore::new().with_object(
        "vpc-logs",
        "a.log.gz",
        flow_log(&[OK_ROW]),
    ));
    let provider = Arc::new(MockIndexProvider::unacknowledged());
    let pipeline = pipeline(store, provider.clone());

    let report = pipeline
        .run(&[Notification::new("vpc-logs", "a.log.gz", "eu-west-1")], deadline())
        .await;

    match &report.objects[0].outcome {
        ObjectOutcome::Failed { step, error } => {
            assert_eq!(*step, ProcessingStep::Provisioning);
            assert!(matches!(error, PipelineError::IndexProvisionError(_)));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(provider.bulk_count(), 0);
    assert!(provider.flush_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_object_does_not_stop_the_batch() {
    let store = Arc::new(
        MockObjectStore::new()
            .with_object("vpc-logs", "good-1.log.gz", flow_log(&[OK_ROW]))
            .with_object("vpc-logs", "good-2.log.gz", flow_log(&[OK_ROW, OK_ROW])),
    );
    let provider = Arc::new(MockIndexProvider::new());
    let pipeline = pipeline(store.clone(), provider.clone());

    let report = pipeline
        .run(
            &[
                Notification::new("vpc-logs", "good-1.log.gz", "eu-west-1"),
                Notification::new("vpc-logs", "missing.log.gz", "eu-west-1"),
                Notification::new("vpc-logs", "good-2.log.gz", "eu-west-1"),
            ],
            deadline(),
        )
        .await;

    assert_eq!(report.objects.len(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.indexed(), 3);
    match &report.objects[1].outcome {
        ObjectOutcome::Failed { step, .. } => assert_eq!(*step, ProcessingStep::Retrieving),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(report.objects[1].index, None);
    assert_eq!(store.fetch_count(), 3);

    // Same bucket and day: the index is created once
    assert_eq!(provider.created().len(), 1);
    assert_eq!(provider.bulk_count(), 2);
}

#[tokio::test]
async fn test_object_without_eligible_records_writes_nothing() {
    let store = Arc::new(MockObjectStore::new().with_object(
        "vpc-logs",
        "idle.log.gz",
        flow_log(&[NODATA_ROW, NODATA_ROW]),
    ));
    let provider = Arc::new(MockIndexProvider::new());
    let pipeline = pipeline(store, provider.clone());

    let report = pipeline
        .run(&[Notification::new("vpc-logs", "idle.log.gz", "eu-west-1")], deadline())
        .await;

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.indexed(), 0);
    assert_eq!(provider.bulk_count(), 0);
    assert!(provider.flush_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_index_per_bucket_and_region_routing() {
    let store = Arc::new(
        MockObjectStore::new()
            .with_object("logs-eu", "a.log.gz", flow_log(&[OK_ROW]))
            .with_object("logs-us", "b.log.gz", flow_log(&[OK_ROW])),
    );
    let provider = Arc::new(MockIndexProvider::new());
    let pipeline = pipeline(store.clone(), provider.clone());

    let report = pipeline
        .run(
            &[
                Notification::new("logs-eu", "a.log.gz", "eu-west-1"),
                Notification::new("logs-us", "b.log.gz", "us-east-1"),
            ],
            deadline(),
        )
        .await;

    assert_eq!(report.succeeded(), 2);
    assert_eq!(
        provider.created(),
        vec![
            "flowlogs-logs-eu-2024-01-15".to_string(),
            "flowlogs-logs-us-2024-01-15".to_string()
        ]
    );
    let regions: Vec<String> = store
        .fetches
        .lock()
        .unwrap()
        .iter()
        .map(|(_, _, region)| region.clone())
        .collect();
    assert_eq!(regions, vec!["eu-west-1".to_string(), "us-east-1".to_string()]);
}

#[tokio::test]
async fn test_malformed_notification_is_reported() {
    let store = Arc::new(MockObjectStore::new());
    let provider = Arc::new(MockIndexProvider::new());
    let pipeline = pipeline(store.clone(), provider);

    let report = pipeline
        .run(&[Notification::new("vpc-logs", "", "eu-west-1")], deadline())
        .await;

    match &report.objects[0].outcome {
        ObjectOutcome::Failed { step, error } => {
            assert_eq!(*step, ProcessingStep::Retrieving);
            assert!(error.to_string().contains("object key"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(store.fetch_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_retrieval_hits_deadline() {
    let mut store = MockObjectStore::new().with_object("vpc-logs", "a.log.gz", flow_log(&[OK_ROW]));
    store.delay = Some(Duration::from_secs(120));
    let store = Arc::new(store);
    let provider = Arc::new(MockIndexProvider::new());
    let pipeline = pipeline(store, provider.clone());

    let report = pipeline
        .run(
            &[Notification::new("vpc-logs", "a.log.gz", "eu-west-1")],
            Deadline::after(Duration::from_secs(5)),
        )
        .await;

    match &report.objects[0].outcome {
        ObjectOutcome::Failed { step, error } => {
            assert_eq!(*step, ProcessingStep::Retrieving);
            assert!(error.to_string().contains("deadline exceeded"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(provider.created().is_empty());
}
