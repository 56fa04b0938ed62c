//! This module defines the core data structures used across the flow log indexer.
//! It re-exports specific types like `FlowLogRecord`.

pub mod flow_log_record;

pub use flow_log_record::FlowLogRecord;
