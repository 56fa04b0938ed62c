//! # Flow Log Indexer
//!
//! Loads gzip-compressed VPC flow log objects from S3 into dated OpenSearch
//! indices, one invocation per S3 object-created event.
//!
//! ## Architecture
//!
//! The indexer follows the Source-Processor-Loader pattern:
//!
//! 1. **Trigger**: Turns an S3 event into notifications
//! 2. **Source**: Fetches each object and decodes it into records
//! 3. **Processor**: Keeps the records eligible for indexing
//! 4. **Provisioner**: Creates the destination index on first use
//! 5. **Loader**: Bulk indexes the records and flushes
//! 6. **Orchestrator**: Runs the steps per object and reports outcomes
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`trigger`]: S3 event conversion
//! - [`source`]: Object retrieval and decoding
//! - [`processor`]: Record eligibility filtering
//! - [`provisioner`]: Index provisioning
//! - [`loader`]: Bulk indexing into OpenSearch
//! - [`orchestrator`]: Per-object pipeline and invocation report
//! - [`deadline`]: Invocation deadline for network calls
//! - [`errors`]: Error types for the pipeline

pub mod config;
pub mod deadline;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod provisioner;
pub mod source;
pub mod trigger;

pub use config::{Config, Dependencies};
pub use deadline::Deadline;
pub use errors::PipelineError;
pub use orchestrator::{InvocationReport, Pipeline};

use thiserror::Error;

/// Errors that abort a whole invocation.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Lambda runtime error.
    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::RuntimeError(msg.into())
    }
}
