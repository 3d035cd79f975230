//! SQLite error mapping.
//!
//! Maps `rusqlite::Error` to `StorageError` from `gardenmap_core::storage`.
//! Lock contention becomes `Busy` so callers can tell it apart from real
//! I/O failures.

use gardenmap_core::storage::StorageError;
use rusqlite::ErrorCode;

/// Maps a rusqlite error to a StorageError.
///
/// # Error Mapping
///
/// - `SQLITE_BUSY` / `SQLITE_LOCKED` → `StorageError::Busy`
/// - Conversion failures → `StorageError::Corrupt`
/// - All other errors → `StorageError::Io`
pub fn map_rusqlite_error(err: rusqlite::Error, table: &str) -> StorageError {
    match &err {
        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if matches!(
                sqlite_err.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ) =>
        {
            StorageError::Busy(format!("table {table}: {err}"))
        }

        rusqlite::Error::ToSqlConversionFailure(_)
        | rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..) => {
            StorageError::Corrupt(format!("table {table}: {err}"))
        }

        _ => StorageError::Io(format!("table {table}: {err}")),
    }
}
