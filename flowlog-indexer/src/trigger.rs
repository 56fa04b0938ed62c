//! Conversion of S3 object-created events into pipeline notifications.

use aws_lambda_events::event::s3::{S3Event, S3EventRecord};
use tracing::warn;

use crate::errors::PipelineError;

/// One object the pipeline has to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Bucket the object was written to.
    pub bucket: String,
    /// URL-decoded object key.
    pub key: String,
    /// Region of the bucket.
    pub region: String,
}

impl Notification {
    /// Create a notification from already decoded parts.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            region: region.into(),
        }
    }

    /// Build a notification from one S3 event record.
    ///
    /// Missing values are left empty and rejected later by [`Notification::validate`],
    /// so that the object still shows up in the invocation report.
    pub fn from_record(record: &S3EventRecord) -> Self {
        let raw_key = record.s3.object.key.clone().unwrap_or_default();
        Self {
            bucket: record.s3.bucket.name.clone().unwrap_or_default(),
            key: decode_key(&raw_key),
            region: record.aws_region.clone().unwrap_or_default(),
        }
    }

    /// Check that the notification names a bucket, a key and a region.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let missing: Vec<&str> = [
            ("bucket name", &self.bucket),
            ("object key", &self.key),
            ("region", &self.region),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::retrieval(format!(
                "notification is missing {}",
                missing.join(", ")
            )))
        }
    }
}

/// Extract one notification per record of an S3 event, in event order.
pub fn notifications(event: &S3Event) -> Vec<Notification> {
    event.records.iter().map(Notification::from_record).collect()
}

/// Decode an object key as S3 encodes it in event notifications.
///
/// Spaces arrive as `+` and every other reserved byte is percent-encoded. A key
/// that does not decode to UTF-8 is used verbatim.
fn decode_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            warn!(key = %raw, error = %e, "Object key is not valid percent-encoded UTF-8");
            raw.to_string()
        }
    }
}
