//! Collection operations shared by every storage backend.
//!
//! These are pure functions over an in-memory `Vec<Record>`. The file backend
//! applies them to the decoded document between its read and its write; the
//! table backend mirrors the same rules in SQL.

use super::types::{Record, RecordId};

/// What an upsert did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The record at this position was replaced or merged.
    Updated(usize),
    /// No record matched and the incoming record was appended.
    Appended,
}

impl UpsertOutcome {
    pub fn is_update(&self) -> bool {
        matches!(self, UpsertOutcome::Updated(_))
    }
}

/// Position of the first record whose identity equals `id`.
pub fn find_first(records: &[Record], id: &RecordId) -> Option<usize> {
    records.iter().position(|r| r.has_id(id))
}

fn position_of(records: &[Record], record: &Record) -> Option<usize> {
    record.id().and_then(|id| find_first(records, &id))
}

/// Replaces the first record with the same identity wholesale, or appends.
///
/// A record without an identity is always appended.
pub fn upsert_record(records: &mut Vec<Record>, record: Record) -> UpsertOutcome {
    match position_of(records, &record) {
        Some(index) => {
            records[index] = record;
            UpsertOutcome::Updated(index)
        }
        None => {
            records.push(record);
            UpsertOutcome::Appended
        }
    }
}

/// Merges into the first record with the same identity, or appends.
///
/// The stored fields are kept unless `record` carries the same field, in which
/// case the incoming value wins.
pub fn merge_upsert_record(records: &mut Vec<Record>, record: Record) -> UpsertOutcome {
    match position_of(records, &record) {
        Some(index) => {
            records[index] = records[index].merged_with(&record);
            UpsertOutcome::Updated(index)
        }
        None => {
            records.push(record);
            UpsertOutcome::Appended
        }
    }
}

/// Applies [`merge_upsert_record`] to each incoming record in order.
/// Returns how many of them merged into a stored record.
pub fn merge_upsert_records(records: &mut Vec<Record>, incoming: &[Record]) -> usize {
    incoming
        .iter()
        .map(|record| merge_upsert_record(records, record.clone()))
        .filter(UpsertOutcome::is_update)
        .count()
}

/// Removes every record whose identity is in `ids`. Returns how many went.
pub fn remove_by_ids(records: &mut Vec<Record>, ids: &[RecordId]) -> usize {
    let before = records.len();
    records.retain(|r| !ids.iter().any(|id| r.has_id(id)));
    before - records.len()
}
