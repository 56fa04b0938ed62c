//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `IndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use aws_types::SdkConfig;
use opensearch::{
    auth::Credentials,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts, IndicesFlushParts},
    BulkOperation, BulkOperations, BulkParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use flowlog_indexer_shared::FlowLogRecord;

use crate::errors::IndexProviderError;
use crate::interfaces::IndexProvider;
use crate::types::BulkOperationSummary;

/// Service name used when signing requests for Amazon OpenSearch Service.
const AWS_SERVICE_NAME: &str = "es";

/// OpenSearch provider implementation.
///
/// Holds a single client that is reused for every request of an invocation.
///
/// # Example
///
/// ```ignore
/// use flowlog_indexer_repository::{index_settings, IndexProvider, OpenSearchProvider};
///
/// let provider = OpenSearchProvider::new("http://localhost:9200")?;
/// if !provider.index_exists("flowlogs-bucket-2024-01-01").await? {
///     provider
///         .create_index("flowlogs-bucket-2024-01-01", &index_settings())
///         .await?;
/// }
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
}

impl OpenSearchProvider {
    /// Create a new provider for an unauthenticated OpenSearch endpoint.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(IndexProviderError)` - If the URL is invalid or transport setup fails
    pub fn new(url: &str) -> Result<Self, IndexProviderError> {
        let parsed_url = Url::parse(url).map_err(|e| IndexProviderError::connection(e.to_string()))?;

        let transport = TransportBuilder::new(SingleNodeConnectionPool::new(parsed_url))
            .disable_proxy()
            .build()
            .map_err(|e| IndexProviderError::connection(e.to_string()))?;

        info!(url = %url, "Created OpenSearch provider");

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }

    /// Create a new provider whose requests are signed with AWS SigV4.
    ///
    /// The credentials provider and region are taken from `sdk_config`, so the
    /// config must carry both.
    ///
    /// # Arguments
    ///
    /// * `url` - The Amazon OpenSearch Service domain endpoint
    /// * `sdk_config` - AWS configuration holding the signing credentials and region
    pub fn with_aws_auth(url: &str, sdk_config: &SdkConfig) -> Result<Self, IndexProviderError> {
        let parsed_url = Url::parse(url).map_err(|e| IndexProviderError::connection(e.to_string()))?;

        let credentials = Credentials::try_from(sdk_config.clone())
            .map_err(|e| IndexProviderError::connection(e.to_string()))?;

        let transport = TransportBuilder::new(SingleNodeConnectionPool::new(parsed_url))
            .auth(credentials)
            .service_name(AWS_SERVICE_NAME)
            .build()
            .map_err(|e| IndexProviderError::connection(e.to_string()))?;

        info!(
            url = %url,
            region = ?sdk_config.region(),
            "Created SigV4-signed OpenSearch provider"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }

    /// Build the bulk request body: one index action per record.
    fn bulk_body(records: &[FlowLogRecord]) -> Result<BulkOperations, IndexProviderError> {
        let mut operations = BulkOperations::new();
        for record in records {
            operations
                .push(BulkOperation::index(record))
                .map_err(|e| IndexProviderError::serialization(e.to_string()))?;
        }
        Ok(operations)
    }
}

#[async_trait]
impl IndexProvider for OpenSearchProvider {
    async fn index_exists(&self, index: &str) -> Result<bool, IndexProviderError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| IndexProviderError::exists_check(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => {
                error!(index = %index, status = status, "Index exists request failed");
                Err(IndexProviderError::exists_check(format!(
                    "Unexpected status {} checking index {}",
                    status, index
                )))
            }
        }
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<bool, IndexProviderError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(body.clone())
            .send()
            .await
            .map_err(|e| IndexProviderError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Create index request failed");
            return Err(IndexProviderError::index_creation(format!(
                "Create index {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        let response_body = response
            .json::<Value>()
            .await
            .map_err(|e| IndexProviderError::parse(e.to_string()))?;

        let acknowledged = response_body
            .get("acknowledged")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        debug!(index = %index, acknowledged = acknowledged, "Create index response received");
        Ok(acknowledged)
    }

    async fn bulk_index(
        &self,
        index: &str,
        records: &[FlowLogRecord],
    ) -> Result<BulkOperationSummary, IndexProviderError> {
        let body = Self::bulk_body(records)?;

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(vec![body])
            .send()
            .await
            .map_err(|e| IndexProviderError::bulk_index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Bulk request failed");
            return Err(IndexProviderError::bulk_index(format!(
                "Bulk request to {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        let response_body = response
            .json::<Value>()
            .await
            .map_err(|e| IndexProviderError::parse(e.to_string()))?;

        let summary = BulkOperationSummary::from_response(records.len(), &response_body);
        debug!(
            index = %index,
            total = summary.total,
            failed = summary.failed,
            "Bulk request completed"
        );
        Ok(summary)
    }

    async fn flush(&self, index: &str) -> Result<(), IndexProviderError> {
        let response = self
            .client
            .indices()
            .flush(IndicesFlushParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| IndexProviderError::flush(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Flush request failed");
            return Err(IndexProviderError::flush(format!(
                "Flush of {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        debug!(index = %index, "Index flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = OpenSearchProvider::new("not a url");
        assert!(matches!(
            result,
            Err(IndexProviderError::ConnectionError(_))
        ));
    }

    #[test]
    fn test_new_accepts_valid_url() {
        assert!(OpenSearchProvider::new("http://localhost:9200").is_ok());
    }

    #[test]
    fn test_bulk_body_accepts_records() {
        let records = vec![FlowLogRecord::default(), FlowLogRecord::default()];
        assert!(OpenSearchProvider::bulk_body(&records).is_ok());
    }
}
