//! OpenSearch index naming, settings and mappings.
//!
//! Flow log indices are created per source bucket and per processing day. Every
//! index shares the same fixed settings and mappings defined here.

use chrono::NaiveDate;
use serde_json::{json, Value};

/// Date format used in index names.
const INDEX_DATE_FORMAT: &str = "%Y-%m-%d";

/// Build the name of the index that receives records from `bucket` on `date`.
///
/// The name is `{prefix}-{bucket}-{YYYY-MM-DD}`. The date is the processing day,
/// not the day the records were captured.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use flowlog_indexer_repository::index_name;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(index_name("flowlogs", "vpc-logs", date), "flowlogs-vpc-logs-2024-03-09");
/// ```
pub fn index_name(prefix: &str, bucket: &str, date: NaiveDate) -> String {
    format!("{}-{}-{}", prefix, bucket, date.format(INDEX_DATE_FORMAT))
}

/// Get the index settings and mappings for a flow log index.
///
/// The configuration includes:
/// - **date** fields in epoch seconds for the capture window (`start`, `end`)
/// - **ip** fields for the interface and packet level addresses
/// - **integer** fields for ports and counters
///
/// Every other field is left to dynamic mapping.
///
/// # Sharding Configuration
///
/// - 1 primary shard
/// - 0 replicas
pub fn index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0
        },
        "mappings": {
            "properties": {
                "start": { "type": "date", "format": "epoch_second" },
                "end": { "type": "date", "format": "epoch_second" },
                "srcaddr": { "type": "ip" },
                "dstaddr": { "type": "ip" },
                "pkt-srcaddr": { "type": "ip" },
                "pkt-dstaddr": { "type": "ip" },
                "bytes": { "type": "integer" },
                "packets": { "type": "integer" },
                "dstport": { "type": "integer" },
                "srcport": { "type": "integer" }
            }
        }
    })
}
