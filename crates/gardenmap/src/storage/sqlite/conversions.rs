//! SQLite row conversion functions.
//!
//! Pure functions for converting between stored payload text and records.
//! These are testable in isolation without database access.

use gardenmap_core::record::Record;
use serde_json::Value;

/// Column values for inserting one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRow {
    pub id: Option<String>,
    pub payload: String,
}

/// Encodes a record for insertion.
pub fn encode_row(record: &Record) -> serde_json::Result<EncodedRow> {
    Ok(EncodedRow {
        id: id_column(record),
        payload: encode_payload(record)?,
    })
}

/// Identity column value: the canonical JSON text of `id`, or NULL.
pub fn id_column(record: &Record) -> Option<String> {
    record.id().map(|id| id.to_key())
}

pub fn encode_payload(record: &Record) -> serde_json::Result<String> {
    serde_json::to_string(record)
}

/// Decodes a stored payload. Returns `None` when the text is not a JSON
/// object.
pub fn decode_payload(text: &str) -> Option<Record> {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|value| Record::try_from(value).ok())
}
