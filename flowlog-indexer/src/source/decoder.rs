//! Gzip and space-delimited table decoding.

use std::io::Read;

use flate2::read::MultiGzDecoder;
use tracing::{debug, instrument};

use flowlog_indexer_shared::FlowLogRecord;

use crate::errors::PipelineError;

/// Flow log columns are separated by a single space.
const FIELD_DELIMITER: u8 = b' ';

/// Decode a raw flow log object into records.
///
/// The input is gunzipped in full, then read as a table whose first row names
/// the columns. Columns are matched to record fields by header name in any
/// order; unknown columns are ignored and absent ones leave the field empty.
///
/// # Returns
///
/// * `Ok(Vec<FlowLogRecord>)` - Records in file order
/// * `Err(PipelineError::DecompressionError)` - If the input is not valid gzip
/// * `Err(PipelineError::ParseError)` - If a row is malformed
#[instrument(skip(raw), fields(compressed_size = raw.len()))]
pub fn decode(raw: &[u8]) -> Result<Vec<FlowLogRecord>, PipelineError> {
    let text = gunzip(raw)?;
    let records = parse(&text)?;
    debug!(
        decompressed_size = text.len(),
        record_count = records.len(),
        "Decoded flow log object"
    );
    Ok(records)
}

fn gunzip(raw: &[u8]) -> Result<Vec<u8>, PipelineError> {
    if raw.is_empty() {
        return Err(PipelineError::decompression("empty object is not a gzip stream"));
    }

    let mut text = Vec::new();
    MultiGzDecoder::new(raw)
        .read_to_end(&mut text)
        .map_err(|e| PipelineError::decompression(e.to_string()))?;
    Ok(text)
}

fn parse(text: &[u8]) -> Result<Vec<FlowLogRecord>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .has_headers(true)
        .from_reader(text);

    reader
        .deserialize::<FlowLogRecord>()
        .map(|row| row.map_err(|e| PipelineError::parse(e.to_string())))
        .collect()
}
