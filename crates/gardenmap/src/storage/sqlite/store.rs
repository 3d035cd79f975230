//! SQLite record store.
//!
//! Implements `RecordStore` from `gardenmap_core::storage` over one table per
//! namespace.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gardenmap_core::record::{Record, RecordId};
use gardenmap_core::storage::{RecordStore, Result, StorageError};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, TransactionBehavior};

use super::conversions::{decode_payload, encode_payload, encode_row, EncodedRow};
use super::error::map_rusqlite_error;
use super::schema::{validate_namespace, Queries};

/// Ids bound per `DELETE` statement. Stays well below SQLite's host
/// parameter limit.
const DELETE_CHUNK_SIZE: usize = 500;

/// Wraps a serde error for use inside rusqlite closures.
fn wrap_err(e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(e))
}

/// SQLite-based record store for one namespace.
///
/// The database runs in WAL mode, so readers are never blocked by a writer.
/// A connection is opened per operation. Writers take the database write lock up front
/// (`BEGIN IMMEDIATE`) and wait at most `busy_timeout` for it.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
    table: String,
    busy_timeout: Duration,
    queries: Queries,
}

impl SqliteStore {
    /// Opens the store for `namespace`, creating the database file and the
    /// table when missing.
    pub fn open(
        db_path: impl Into<PathBuf>,
        namespace: &str,
        busy_timeout: Duration,
    ) -> Result<Self> {
        validate_namespace(namespace)?;
        let db_path = db_path.into();

        if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                StorageError::Io(format!("create directory {}: {e}", dir.display()))
            })?;
        }

        let store = Self {
            db_path,
            table: namespace.to_string(),
            busy_timeout,
            queries: Queries::for_table(namespace),
        };

        store.with_connection(|conn| {
            // WAL is persistent: set once per database file.
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })?;
            conn.execute_batch(&store.queries.create_table)
        })?;

        tracing::debug!(
            path = %store.db_path.display(),
            table = %store.table,
            "Opened SQLite store"
        );

        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }

    /// Runs `op` on a fresh connection that is closed afterwards.
    fn with_connection<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<T>,
    {
        let mut conn = self
            .connect()
            .map_err(|e| map_rusqlite_error(e, &self.table))?;
        op(&mut conn).map_err(|e| map_rusqlite_error(e, &self.table))
    }

    /// Runs `op` inside an immediate transaction and commits it.
    fn write<T, F>(&self, operation: &'static str, op: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> rusqlite::Result<T>,
    {
        tracing::debug!(table = %self.table, operation, "Writing SQLite store");

        self.with_connection(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let value = op(&tx)?;
            tx.commit()?;
            Ok(value)
        })
    }

    fn encode_rows(records: &[Record]) -> Result<Vec<EncodedRow>> {
        records
            .iter()
            .map(|record| encode_row(record).map_err(|e| StorageError::Corrupt(e.to_string())))
            .collect()
    }

    /// Finds the first row holding `id`: its insertion key and raw payload.
    fn select_first(
        &self,
        tx: &rusqlite::Transaction<'_>,
        id: Option<&str>,
    ) -> rusqlite::Result<Option<(i64, Option<String>)>> {
        let Some(id) = id else {
            return Ok(None);
        };

        tx.query_row(&self.queries.select_first_by_id, [id], |row| {
            let key: i64 = row.get(0)?;
            let payload = row.get_ref(1)?.as_str().ok().map(str::to_owned);
            Ok((key, payload))
        })
        .optional()
    }
}

impl RecordStore for SqliteStore {
    fn list_all(&self) -> Result<Vec<Record>> {
        let payloads = self.with_connection(|conn| {
            let mut stmt = conn.prepare(&self.queries.select_all)?;
            let rows = stmt.query_map([], |row| {
                Ok(row.get_ref(0)?.as_str().ok().map(str::to_owned))
            })?;
            rows.collect::<rusqlite::Result<Vec<Option<String>>>>()
        })?;

        let total = payloads.len();
        let records: Vec<Record> = payloads
            .iter()
            .filter_map(|payload| payload.as_deref().and_then(decode_payload))
            .collect();

        if records.len() < total {
            tracing::warn!(
                table = %self.table,
                skipped = total - records.len(),
                "Skipped undecodable rows"
            );
        }

        Ok(records)
    }

    fn append(&self, records: &[Record]) -> Result<()> {
        let rows = Self::encode_rows(records)?;

        self.write("append", |tx| {
            let mut stmt = tx.prepare(&self.queries.insert)?;
            for row in &rows {
                stmt.execute(params![row.id, row.payload])?;
            }
            Ok(())
        })
    }

    fn upsert_one(&self, record: &Record) -> Result<()> {
        let row = encode_row(record).map_err(|e| StorageError::Corrupt(e.to_string()))?;

        self.write("upsert_one", |tx| {
            match self.select_first(tx, row.id.as_deref())? {
                Some((key, _)) => tx.execute(&self.queries.update_payload, params![row.payload, key])?,
                None => tx.execute(&self.queries.insert, params![row.id, row.payload])?,
            };
            Ok(())
        })
    }

    fn upsert_many(&self, records: &[Record]) -> Result<()> {
        let rows = Self::encode_rows(records)?;

        self.write("upsert_many", |tx| {
            for (record, row) in records.iter().zip(&rows) {
                match self.select_first(tx, row.id.as_deref())? {
                    Some((key, stored)) => {
                        let existing = stored
                            .as_deref()
                            .and_then(decode_payload)
                            .unwrap_or_default();
                        let merged = encode_payload(&existing.merged_with(record)).map_err(wrap_err)?;
                        tx.execute(&self.queries.update_payload, params![merged, key])?;
                    }
                    None => {
                        tx.execute(&self.queries.insert, params![row.id, row.payload])?;
                    }
                }
            }
            Ok(())
        })
    }

    fn delete_by_ids(&self, ids: &[RecordId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let keys: Vec<String> = ids.iter().map(RecordId::to_key).collect();

        let removed = self.write("delete_by_ids", |tx| {
            let mut removed = 0;
            for chunk in keys.chunks(DELETE_CHUNK_SIZE) {
                let sql = Queries::delete_by_ids(&self.table, chunk.len());
                removed += tx.prepare_cached(&sql)?.execute(params_from_iter(chunk))?;
            }
            Ok(removed)
        })?;

        tracing::debug!(table = %self.table, requested = ids.len(), removed, "Deleted rows");
        Ok(())
    }
}
