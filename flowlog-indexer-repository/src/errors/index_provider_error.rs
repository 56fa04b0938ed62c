//! Index provider error types.
//!
//! This module defines the unified error type returned by every `IndexProvider`
//! operation, from transport setup to individual index requests.

use thiserror::Error;

/// Unified errors from index provider operations.
///
/// Each variant identifies the request that failed so callers can map provider
/// failures onto their own pipeline steps (provisioning, bulk write, flush).
#[derive(Debug, Clone, Error)]
pub enum IndexProviderError {
    /// Failed to build the client or reach the search backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The index existence check failed.
    #[error("Index exists check error: {0}")]
    ExistsCheckError(String),

    /// Failed to create the index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Bulk indexing request failed or some items were rejected.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// Failed to flush the index.
    #[error("Flush error: {0}")]
    FlushError(String),

    /// Failed to serialize a document for the backend.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Failed to parse a response from the backend.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl IndexProviderError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an existence check error.
    pub fn exists_check(msg: impl Into<String>) -> Self {
        Self::ExistsCheckError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a bulk index error.
    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    /// Create a flush error.
    pub fn flush(msg: impl Into<String>) -> Self {
        Self::FlushError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
