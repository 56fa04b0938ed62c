//! Interface definitions for the index provider.
//!
//! This module defines the abstract `IndexProvider` trait that allows
//! the pipeline to run against OpenSearch or an in-memory fake.

mod index_provider;

pub use index_provider::IndexProvider;
