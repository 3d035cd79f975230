use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use gardenmap_core::record::{
    merge_upsert_records, remove_by_ids, upsert_record, PlantList, Record, RecordId,
};
use gardenmap_core::storage::{RecordStore, Result, StorageError};
use tempfile::NamedTempFile;

use super::lock::{FileLock, FileLockGuard};

/// Record store backed by a single JSON document.
///
/// Reads are forgiving: a missing or malformed document reads as an empty
/// collection so that a damaged file never takes the service down. Writes
/// go to a temporary file in the same directory which is synced and then
/// renamed over the document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: FileLock,
}

impl JsonFileStore {
    /// Opens the store, creating the document (and its directory) when
    /// missing. An existing document is left untouched.
    pub fn new(path: impl Into<PathBuf>, lock_timeout: Duration) -> Result<Self> {
        let path = path.into();

        if let Some(dir) = parent_dir(&path) {
            fs::create_dir_all(dir).map_err(|e| io_error("create directory for", &path, e))?;
        }

        let store = Self {
            lock: FileLock::for_resource(&path, lock_timeout),
            path,
        };

        let guard = store.lock.acquire()?;
        if !store.path.exists() {
            store.write(&guard, Vec::new())?;
            tracing::info!(
                path = %store.path.display(),
                lock = %store.lock.path().display(),
                "Created empty JSON store"
            );
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self, _guard: &FileLockGuard) -> Result<Vec<Record>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "JSON store missing, reading as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(io_error("read", &self.path, e)),
        };

        let decoded = PlantList::decode_lenient(&bytes);
        if decoded.malformed {
            tracing::warn!(path = %self.path.display(), "Malformed JSON store, reading as empty");
        }
        if decoded.skipped > 0 {
            tracing::warn!(
                path = %self.path.display(),
                skipped = decoded.skipped,
                "Skipped non-object records"
            );
        }

        Ok(decoded.list.into_records())
    }

    fn write(&self, _guard: &FileLockGuard, records: Vec<Record>) -> Result<()> {
        let dir = parent_dir(&self.path).unwrap_or(Path::new("."));
        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|e| io_error("create temp file for", &self.path, e))?;

        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &PlantList::new(records)).map_err(|e| {
                if e.is_io() {
                    StorageError::Io(format!("write {}: {e}", self.path.display()))
                } else {
                    StorageError::Corrupt(format!("encode {}: {e}", self.path.display()))
                }
            })?;
            writer
                .flush()
                .map_err(|e| io_error("flush", &self.path, e))?;
        }

        tmp.as_file()
            .sync_all()
            .map_err(|e| io_error("sync", &self.path, e))?;

        // The temp file is removed on drop if the rename fails.
        tmp.persist(&self.path)
            .map_err(|e| io_error("replace", &self.path, e.error))?;

        sync_dir(dir);
        Ok(())
    }

    /// Read-modify-write under one lock acquisition. `apply` returns how
    /// many stored records it replaced, merged or removed.
    fn modify<F>(&self, operation: &'static str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Record>) -> usize,
    {
        let guard = self.lock.acquire()?;
        let mut records = self.read(&guard)?;
        let before = records.len();

        let touched = apply(&mut records);

        tracing::debug!(
            path = %self.path.display(),
            operation,
            before,
            after = records.len(),
            touched,
            "Writing JSON store"
        );
        self.write(&guard, records)
    }
}

impl RecordStore for JsonFileStore {
    fn list_all(&self) -> Result<Vec<Record>> {
        let guard = self.lock.acquire()?;
        self.read(&guard)
    }

    fn append(&self, records: &[Record]) -> Result<()> {
        self.modify("append", |list| {
            list.extend_from_slice(records);
            0
        })
    }

    fn upsert_one(&self, record: &Record) -> Result<()> {
        self.modify("upsert_one", |list| {
            usize::from(upsert_record(list, record.clone()).is_update())
        })
    }

    fn upsert_many(&self, records: &[Record]) -> Result<()> {
        self.modify("upsert_many", |list| merge_upsert_records(list, records))
    }

    fn delete_by_ids(&self, ids: &[RecordId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.modify("delete_by_ids", |list| remove_by_ids(list, ids))
    }
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|dir| !dir.as_os_str().is_empty())
}

fn io_error(action: &str, path: &Path, err: io::Error) -> StorageError {
    StorageError::Io(format!("{action} {}: {err}", path.display()))
}

/// Makes the rename durable. Best effort: not every platform can open a
/// directory for syncing.
fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}
