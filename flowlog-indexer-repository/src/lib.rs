//! # Flow Log Indexer Repository
//!
//! This crate provides the trait and implementation used to talk to the
//! search index. It includes definitions for errors, the `IndexProvider`
//! interface, the fixed index mapping, and a concrete implementation for
//! OpenSearch (including Amazon OpenSearch Service with SigV4 signing).

pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use errors::IndexProviderError;
pub use interfaces::IndexProvider;
pub use opensearch::{index_name, index_settings, OpenSearchProvider};
pub use types::BulkOperationSummary;
