//! Processor module for the flow log pipeline.
//!
//! Selects the records that are eligible for indexing.

mod record_filter;

pub use record_filter::{select_eligible, FilteredRecords};
