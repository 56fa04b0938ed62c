//! Index provider trait definition.
//!
//! This module defines the abstract interface for the index operations the
//! pipeline needs, allowing different backend implementations (OpenSearch,
//! Elasticsearch, in-memory fakes for tests).

use async_trait::async_trait;
use serde_json::Value;

use flowlog_indexer_shared::FlowLogRecord;

use crate::errors::IndexProviderError;
use crate::types::BulkOperationSummary;

/// Abstracts the underlying search index implementation.
///
/// The pipeline only ever needs four capabilities from the backend: check whether
/// an index exists, create an index with settings and mappings, write a batch of
/// records, and flush an index. Implementations are shared across objects within
/// one invocation and must be safe for sequential reuse.
///
/// All methods return `Result<T, IndexProviderError>` for consistent error handling
/// across different backend implementations.
#[async_trait]
pub trait IndexProvider: Send + Sync {
    /// Check whether the named index exists.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The index exists
    /// * `Ok(false)` - The index does not exist
    /// * `Err(IndexProviderError)` - If the check could not be completed
    async fn index_exists(&self, index: &str) -> Result<bool, IndexProviderError>;

    /// Create the named index with the given settings and mappings body.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The backend acknowledged the creation
    /// * `Ok(false)` - The backend answered but did not acknowledge it
    /// * `Err(IndexProviderError)` - If the request failed
    async fn create_index(&self, index: &str, body: &Value) -> Result<bool, IndexProviderError>;

    /// Write all records to the index in a single bulk request.
    ///
    /// No document identifiers are assigned; the backend generates them.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkOperationSummary)` - Item counts reported by the backend
    /// * `Err(IndexProviderError)` - If the bulk request failed entirely
    async fn bulk_index(
        &self,
        index: &str,
        records: &[FlowLogRecord],
    ) -> Result<BulkOperationSummary, IndexProviderError>;

    /// Flush the index so that recently written documents are durable.
    async fn flush(&self, index: &str) -> Result<(), IndexProviderError>;
}
