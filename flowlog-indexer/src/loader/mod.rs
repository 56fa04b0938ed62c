//! Loader module for the flow log pipeline.
//!
//! Writes the eligible records of one object into its index with a single bulk
//! request and flushes the index afterwards.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, instrument};

use flowlog_indexer_repository::IndexProvider;
use flowlog_indexer_shared::FlowLogRecord;

use crate::deadline::Deadline;
use crate::errors::PipelineError;
use crate::processor::select_eligible;

/// Counts for one loaded object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Records decoded from the object.
    pub parsed: usize,
    /// Records that passed the filter.
    pub eligible: usize,
    /// Records the filter dropped.
    pub dropped: usize,
    /// Documents written to the index.
    pub indexed: usize,
}

/// Loader that bulk indexes flow log records.
pub struct FlowLogLoader {
    provider: Arc<dyn IndexProvider>,
}

impl FlowLogLoader {
    /// Create a new loader with the given provider.
    pub fn new(provider: Arc<dyn IndexProvider>) -> Self {
        Self { provider }
    }

    /// Load the eligible records of one object into `index`.
    ///
    /// With no eligible records nothing is sent. Otherwise one bulk request is
    /// issued and, when every document was accepted, the index is flushed.
    /// Documents accepted before a failure stay in the index.
    ///
    /// # Returns
    ///
    /// * `Ok(LoadSummary)` - All eligible records were written and flushed
    /// * `Err(PipelineError::BulkIndexError)` - If the write failed or documents were rejected
    /// * `Err(PipelineError::FlushError)` - If the flush failed
    #[instrument(skip(self, records, deadline), fields(record_count = records.len()))]
    pub async fn load(
        &self,
        index: &str,
        records: Vec<FlowLogRecord>,
        deadline: Deadline,
    ) -> Result<LoadSummary, PipelineError> {
        let parsed = records.len();
        let filtered = select_eligible(records);

        let mut summary = LoadSummary {
            parsed,
            eligible: filtered.eligible.len(),
            dropped: filtered.dropped,
            indexed: 0,
        };

        if filtered.eligible.is_empty() {
            debug!(dropped = summary.dropped, "No eligible records to index");
            return Ok(summary);
        }

        let bulk = deadline
            .run(
                async {
                    self.provider
                        .bulk_index(index, &filtered.eligible)
                        .await
                        .map_err(|e| PipelineError::bulk_index(e.to_string()))
                },
                || {
                    PipelineError::bulk_index(format!(
                        "deadline exceeded writing {} documents to {}",
                        summary.eligible, index
                    ))
                },
            )
            .await?;

        if bulk.failed > 0 {
            error!(
                succeeded = bulk.succeeded,
                failed = bulk.failed,
                first_error = ?bulk.first_error,
                "Bulk write rejected documents"
            );
            return Err(PipelineError::bulk_index(format!(
                "{} of {} documents rejected by {}: {}",
                bulk.failed,
                bulk.total,
                index,
                bulk.first_error.as_deref().unwrap_or("unknown error")
            )));
        }

        deadline
            .run(
                async {
                    self.provider
                        .flush(index)
                        .await
                        .map_err(|e| PipelineError::flush(e.to_string()))
                },
                || PipelineError::flush(format!("deadline exceeded flushing {}", index)),
            )
            .await?;

        summary.indexed = bulk.succeeded;
        info!(
            indexed = summary.indexed,
            dropped = summary.dropped,
            "Loaded records into index"
        );
        Ok(summary)
    }
}
