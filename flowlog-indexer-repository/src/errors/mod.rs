//! Error types for the flow log indexer repository.
//!
//! This module provides a unified error type for all index provider operations.

mod index_provider_error;

pub use index_provider_error::IndexProviderError;
