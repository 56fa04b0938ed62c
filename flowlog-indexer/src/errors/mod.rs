//! Error types for the flow log pipeline.

use thiserror::Error;

use crate::orchestrator::ProcessingStep;

/// Errors that can occur while processing a single object.
///
/// Every variant is scoped to one object: the orchestrator logs it, records it
/// in the invocation report and moves on to the next notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The object could not be fetched from storage.
    #[error("Retrieval error: {0}")]
    RetrievalError(String),

    /// The object is not a valid gzip stream.
    #[error("Decompression error: {0}")]
    DecompressionError(String),

    /// The decompressed text is not a valid flow log table.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The destination index could not be confirmed or created.
    #[error("Index provision error: {0}")]
    IndexProvisionError(String),

    /// The bulk write failed or the backend rejected documents.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// The post-write flush failed.
    #[error("Flush error: {0}")]
    FlushError(String),
}

impl PipelineError {
    /// Create a retrieval error.
    pub fn retrieval(msg: impl Into<String>) -> Self {
        Self::RetrievalError(msg.into())
    }

    /// Create a decompression error.
    pub fn decompression(msg: impl Into<String>) -> Self {
        Self::DecompressionError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an index provision error.
    pub fn index_provision(msg: impl Into<String>) -> Self {
        Self::IndexProvisionError(msg.into())
    }

    /// Create a bulk index error.
    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    /// Create a flush error.
    pub fn flush(msg: impl Into<String>) -> Self {
        Self::FlushError(msg.into())
    }

    /// The processing step this error terminates.
    pub fn step(&self) -> ProcessingStep {
        match self {
            Self::RetrievalError(_) => ProcessingStep::Retrieving,
            Self::DecompressionError(_) | Self::ParseError(_) => ProcessingStep::Decoding,
            Self::IndexProvisionError(_) => ProcessingStep::Provisioning,
            Self::BulkIndexError(_) | Self::FlushError(_) => ProcessingStep::Loading,
        }
    }
}
