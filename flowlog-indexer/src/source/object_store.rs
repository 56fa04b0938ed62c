//! Object storage access.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use aws_types::SdkConfig;
use bytes::Bytes;
use tracing::{debug, instrument};

use crate::errors::PipelineError;

/// Abstraction over the storage the flow log objects land in.
///
/// Production reads from S3; tests substitute an in-memory store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the complete content of an object.
    ///
    /// # Arguments
    ///
    /// * `bucket` - Bucket holding the object
    /// * `key` - Object key, already URL-decoded
    /// * `region` - Region the bucket lives in
    ///
    /// # Returns
    ///
    /// * `Ok(Bytes)` - The whole object body
    /// * `Err(PipelineError::RetrievalError)` - If the object could not be read
    async fn fetch(&self, bucket: &str, key: &str, region: &str) -> Result<Bytes, PipelineError>;
}

/// S3-backed object store.
///
/// Requests go to the region named by each notification. One client is built per
/// region and reused for the rest of the process lifetime.
pub struct S3ObjectStore {
    sdk_config: SdkConfig,
    clients: Mutex<HashMap<String, Client>>,
}

impl S3ObjectStore {
    /// Create a store whose clients share the credentials of `sdk_config`.
    pub fn new(sdk_config: SdkConfig) -> Self {
        Self {
            sdk_config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn client_for(&self, region: &str) -> Client {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        clients
            .entry(region.to_string())
            .or_insert_with(|| {
                debug!(region = %region, "Creating S3 client");
                let conf = aws_sdk_s3::config::Builder::from(&self.sdk_config)
                    .region(Region::new(region.to_string()))
                    .build();
                Client::from_conf(conf)
            })
            .clone()
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self))]
    async fn fetch(&self, bucket: &str, key: &str, region: &str) -> Result<Bytes, PipelineError> {
        let client = self.client_for(region);

        let response = client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                PipelineError::retrieval(format!(
                    "unable to download item {:?} in bucket {:?}: {}",
                    key,
                    bucket,
                    DisplayErrorContext(&e)
                ))
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| {
                PipelineError::retrieval(format!(
                    "unable to read body of item {:?} in bucket {:?}: {}",
                    key, bucket, e
                ))
            })?
            .into_bytes();

        debug!(size = body.len(), "Object downloaded");
        Ok(body)
    }
}
