//! OpenSearch implementation of the index provider.
//!
//! This module provides a concrete implementation of `IndexProvider`
//! using OpenSearch as the backend, along with the fixed index mapping.

mod index_config;
mod provider;

pub use index_config::{index_name, index_settings};
pub use provider::OpenSearchProvider;
