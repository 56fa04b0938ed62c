//! Eligibility filtering of parsed flow log records.

use tracing::debug;

use flowlog_indexer_shared::FlowLogRecord;

/// Records split by eligibility.
#[derive(Debug, Default)]
pub struct FilteredRecords {
    /// Records to index, in their original order.
    pub eligible: Vec<FlowLogRecord>,
    /// Number of records that were dropped.
    pub dropped: usize,
}

/// Keep the records that pass [`FlowLogRecord::is_eligible`].
///
/// Ineligible records are discarded; only their count survives.
pub fn select_eligible(records: Vec<FlowLogRecord>) -> FilteredRecords {
    let total = records.len();
    let eligible: Vec<FlowLogRecord> = records.into_iter().filter(FlowLogRecord::is_eligible).collect();
    let dropped = total - eligible.len();

    debug!(
        eligible = eligible.len(),
        dropped = dropped,
        "Filtered flow log records"
    );

    FilteredRecords { eligible, dropped }
}
