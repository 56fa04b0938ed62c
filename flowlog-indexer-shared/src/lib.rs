//! # Flow Log Indexer Shared
//!
//! This crate defines the record model shared by the flow log indexer crates.
//! A [`FlowLogRecord`] is one line of a VPC flow log file, decoded from the
//! space-delimited source format and serialized as a search document.

pub mod types;

pub use types::flow_log_record::FlowLogRecord;
