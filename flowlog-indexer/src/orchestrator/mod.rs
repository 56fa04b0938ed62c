//! Orchestrator module for the flow log pipeline.
//!
//! Runs every notified object through retrieval, decoding, index provisioning and
//! loading. A failing object is reported and skipped; the next one still runs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::{Serialize, Serializer};
use tracing::{debug, error, info, instrument};

use flowlog_indexer_repository::index_name;

use crate::deadline::Deadline;
use crate::errors::PipelineError;
use crate::loader::{FlowLogLoader, LoadSummary};
use crate::provisioner::IndexProvisioner;
use crate::source::{decode, ObjectStore};
use crate::trigger::Notification;

/// Default bound for a single step when the caller deadline is further away.
const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(30);

/// Steps an object goes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStep {
    Retrieving,
    Decoding,
    Provisioning,
    Loading,
}

impl fmt::Display for ProcessingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Retrieving => "retrieving",
            Self::Decoding => "decoding",
            Self::Provisioning => "provisioning",
            Self::Loading => "loading",
        };
        f.write_str(name)
    }
}

/// Terminal state of one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ObjectOutcome {
    /// Every step succeeded.
    Done(LoadSummary),
    /// Processing stopped at `step`.
    Failed {
        step: ProcessingStep,
        #[serde(serialize_with = "serialize_display")]
        error: PipelineError,
    },
}

/// Outcome of one notified object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectReport {
    pub bucket: String,
    pub key: String,
    /// Destination index, once it has been derived.
    pub index: Option<String>,
    #[serde(flatten)]
    pub outcome: ObjectOutcome,
}

impl ObjectReport {
    /// Whether the object reached `Done`.
    pub fn is_done(&self) -> bool {
        matches!(self.outcome, ObjectOutcome::Done(_))
    }
}

/// Per-object outcomes of one invocation, in notification order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvocationReport {
    pub objects: Vec<ObjectReport>,
}

impl InvocationReport {
    /// Number of objects that were fully loaded.
    pub fn succeeded(&self) -> usize {
        self.objects.iter().filter(|o| o.is_done()).count()
    }

    /// Number of objects that failed at some step.
    pub fn failed(&self) -> usize {
        self.objects.len() - self.succeeded()
    }

    /// Documents written across all objects.
    pub fn indexed(&self) -> usize {
        self.objects
            .iter()
            .filter_map(|o| match &o.outcome {
                ObjectOutcome::Done(summary) => Some(summary.indexed),
                ObjectOutcome::Failed { .. } => None,
            })
            .sum()
    }
}

fn serialize_display<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Pipeline that coordinates the per-object steps.
///
/// The pipeline:
/// - Fetches each object from storage
/// - Decodes it into flow log records
/// - Provisions the dated destination index
/// - Loads the eligible records and flushes
pub struct Pipeline {
    store: Arc<dyn ObjectStore>,
    provisioner: IndexProvisioner,
    loader: FlowLogLoader,
    index_prefix: String,
    step_timeout: Duration,
    clock: Clock,
}

impl Pipeline {
    /// Create a new pipeline with the given components.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        provisioner: IndexProvisioner,
        loader: FlowLogLoader,
        index_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provisioner,
            loader,
            index_prefix: index_prefix.into(),
            step_timeout: DEFAULT_STEP_TIMEOUT,
            clock: Box::new(|| Utc::now().date_naive()),
        }
    }

    /// Bound every step by `timeout` in addition to the invocation deadline.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// Replace the source of the processing date used in index names.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Process every notification in order.
    ///
    /// Failures are isolated per object; the report lists one entry per
    /// notification whatever happened to the others.
    #[instrument(skip(self, notifications, deadline), fields(object_count = notifications.len()))]
    pub async fn run(&self, notifications: &[Notification], deadline: Deadline) -> InvocationReport {
        let mut report = InvocationReport::default();

        for notification in notifications {
            report.objects.push(self.process(notification, deadline).await);
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            indexed = report.indexed(),
            "Invocation complete"
        );
        report
    }

    /// Process a single object through every step.
    #[instrument(skip(self, notification, deadline), fields(bucket = %notification.bucket, key = %notification.key))]
    pub async fn process(&self, notification: &Notification, deadline: Deadline) -> ObjectReport {
        let mut index = None;
        let outcome = match self.process_object(notification, deadline, &mut index).await {
            Ok(summary) => {
                info!(
                    index = ?index,
                    indexed = summary.indexed,
                    dropped = summary.dropped,
                    "Object loaded"
                );
                ObjectOutcome::Done(summary)
            }
            Err(e) => {
                let step = e.step();
                error!(step = %step, index = ?index, error = %e, "Object failed");
                ObjectOutcome::Failed { step, error: e }
            }
        };

        ObjectReport {
            bucket: notification.bucket.clone(),
            key: notification.key.clone(),
            index,
            outcome,
        }
    }

    async fn process_object(
        &self,
        notification: &Notification,
        deadline: Deadline,
        index: &mut Option<String>,
    ) -> Result<LoadSummary, PipelineError> {
        notification.validate()?;
        let Notification { bucket, key, region } = notification;

        debug!(step = %ProcessingStep::Retrieving, "Entering step");
        let raw = self
            .step_deadline(deadline)
            .run(self.store.fetch(bucket, key, region), || {
                PipelineError::retrieval(format!(
                    "deadline exceeded downloading item {:?} in bucket {:?}",
                    key, bucket
                ))
            })
            .await?;

        debug!(step = %ProcessingStep::Decoding, "Entering step");
        let records = decode(&raw)?;

        debug!(step = %ProcessingStep::Provisioning, "Entering step");
        let name = index_name(&self.index_prefix, bucket, (self.clock)());
        *index = Some(name.clone());
        self.provisioner
            .ensure_index(&name, self.step_deadline(deadline))
            .await?;

        debug!(step = %ProcessingStep::Loading, "Entering step");
        self.loader
            .load(&name, records, self.step_deadline(deadline))
            .await
    }

    fn step_deadline(&self, deadline: Deadline) -> Deadline {
        deadline.min(Deadline::after(self.step_timeout))
    }
}
