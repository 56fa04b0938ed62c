//! Flow log record types.
//!
//! This module defines the structure of a single flow log line. The same type is
//! decoded from the source file (column names come from the file header) and
//! serialized as the document stored in the search index.

use serde::{Deserialize, Serialize};

/// Log status of a record that carries captured traffic.
pub const LOG_STATUS_OK: &str = "OK";

/// Traffic type accepted for indexing.
pub const TRAFFIC_TYPE_IPV4: &str = "IPv4";

/// Action of a record whose traffic was let through.
pub const ACTION_ACCEPT: &str = "ACCEPT";

/// One parsed flow log line.
///
/// Field names on the wire (both the source header and the indexed JSON document)
/// are the hyphenated flow log field identifiers, e.g. `account-id` or `pkt-srcaddr`.
/// Every field except `version` is kept as text because the producer may write `-`
/// for values that are absent or not applicable. Columns missing from the source
/// header leave their field at the default value.
///
/// # Fields
///
/// - `version`: Flow log format version
/// - `srcaddr` / `dstaddr`: IPv4 source and destination addresses
/// - `srcport` / `dstport`: Source and destination ports
/// - `packets` / `bytes`: Packet and byte counts for the capture window
/// - `start` / `end`: Capture window bounds, in epoch seconds
/// - `action`: `ACCEPT` or `REJECT`
/// - `log_status`: `OK`, `NODATA` or `SKIPDATA`
/// - `traffic_type`: `IPv4`, `IPv6` or `EFA`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowLogRecord {
    pub version: u32,
    #[serde(rename = "account-id")]
    pub account_id: String,
    #[serde(rename = "interface-id")]
    pub interface_id: String,
    pub srcaddr: String,
    pub dstaddr: String,
    pub srcport: String,
    pub dstport: String,
    pub protocol: String,
    pub packets: String,
    pub bytes: String,
    pub start: String,
    pub end: String,
    pub action: String,
    #[serde(rename = "log-status")]
    pub log_status: String,
    #[serde(rename = "instance-id")]
    pub instance_id: String,
    #[serde(rename = "pkt-srcaddr")]
    pub pkt_srcaddr: String,
    #[serde(rename = "pkt-dstaddr")]
    pub pkt_dstaddr: String,
    #[serde(rename = "subnet-id")]
    pub subnet_id: String,
    #[serde(rename = "type")]
    pub traffic_type: String,
    #[serde(rename = "vpc-id")]
    pub vpc_id: String,
}

impl FlowLogRecord {
    /// Whether this record may be written to the search index.
    ///
    /// A record is eligible only when its log status is `OK`, its traffic type is
    /// `IPv4` and its action is `ACCEPT`. Comparisons are exact and case-sensitive,
    /// so records with missing fields are never eligible.
    pub fn is_eligible(&self) -> bool {
        self.log_status == LOG_STATUS_OK
            && self.traffic_type == TRAFFIC_TYPE_IPV4
            && self.action == ACTION_ACCEPT
    }
}
