use crate::record::{PlantList, Record, RecordId};

use super::Result;

/// Storage contract shared by every backend.
///
/// Operations are synchronous and may block on a lock or on disk I/O.
/// Implementations keep no cached copy of the collection: every call reads
/// the backing resource again, and every write is durable before returning.
pub trait RecordStore: Send + Sync {
    /// Returns every record in storage order. A missing or empty store
    /// yields an empty list.
    fn list_all(&self) -> Result<Vec<Record>>;

    /// Appends records in the given order. Ids are not checked for
    /// uniqueness.
    fn append(&self, records: &[Record]) -> Result<()>;

    /// Replaces the first record with the same id wholesale, or appends the
    /// record when none matches.
    fn upsert_one(&self, record: &Record) -> Result<()>;

    /// Merges each record into the first stored record with the same id
    /// (incoming fields win), or appends it unmerged when none matches.
    /// The whole batch commits or none of it does.
    fn upsert_many(&self, records: &[Record]) -> Result<()>;

    /// Removes every record whose id is in `ids`. An empty `ids` slice
    /// returns immediately without touching the backing resource.
    fn delete_by_ids(&self, ids: &[RecordId]) -> Result<()>;

    /// Returns the collection wrapped in its `{ "plantlist": [...] }` envelope.
    fn list_wrapped(&self) -> Result<PlantList> {
        self.list_all().map(PlantList::new)
    }
}
