//! Response types for index provider operations.

use serde_json::Value;

/// Summary of a bulk write.
///
/// OpenSearch answers a bulk request with a per-item status even when the request
/// as a whole succeeds. This struct keeps the aggregate counts and the first item
/// error message so callers can decide whether the write is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOperationSummary {
    /// Total number of items in the request.
    pub total: usize,
    /// Number of items the backend accepted.
    pub succeeded: usize,
    /// Number of items the backend rejected.
    pub failed: usize,
    /// Reason of the first rejected item, if any.
    pub first_error: Option<String>,
}

impl BulkOperationSummary {
    /// Build a summary where every item succeeded.
    pub fn all_succeeded(total: usize) -> Self {
        Self {
            total,
            succeeded: total,
            failed: 0,
            first_error: None,
        }
    }

    /// Build a summary from a bulk API response body.
    ///
    /// Items are counted as failed when their operation result carries an `error`
    /// object. When the response has no `items` array, the `errors` flag alone
    /// decides: `false` means every submitted item succeeded.
    pub fn from_response(total: usize, body: &Value) -> Self {
        let Some(items) = body.get("items").and_then(Value::as_array) else {
            let has_errors = body.get("errors").and_then(Value::as_bool).unwrap_or(false);
            return if has_errors {
                Self {
                    total,
                    succeeded: 0,
                    failed: total,
                    first_error: Some("bulk response reported errors".to_string()),
                }
            } else {
                Self::all_succeeded(total)
            };
        };

        let mut failed = 0;
        let mut first_error = None;
        for item in items {
            // Each item is a single-key object: {"index": {...}}
            let error = item
                .as_object()
                .and_then(|op| op.values().next())
                .and_then(|result| result.get("error"));
            if let Some(error) = error {
                failed += 1;
                if first_error.is_none() {
                    first_error = Some(
                        error
                            .get("reason")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| error.to_string()),
                    );
                }
            }
        }

        Self {
            total,
            succeeded: total.saturating_sub(failed),
            failed,
            first_error,
        }
    }
}
