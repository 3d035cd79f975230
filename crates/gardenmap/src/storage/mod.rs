//! Storage backend implementations.
//!
//! This module provides concrete implementations of the `RecordStore` trait
//! defined in `gardenmap_core::storage`. The backend is chosen at startup
//! from [`Config::backend`].
//!
//! - `json`: one JSON document per collection, guarded by an advisory lock
//!   on a sidecar `.lock` file and replaced atomically on every write.
//! - `sqlite`: one table per collection in a shared SQLite database.

#[cfg(test)]
pub(crate) mod contract;
pub mod json;
pub mod sqlite;

use std::sync::Arc;

use gardenmap_core::storage::{RecordStore, Result};

use crate::config::{Config, StorageBackend};

pub use json::JsonFileStore;
pub use sqlite::SqliteStore;

pub const PALETTE_TABLE: &str = "palette";
pub const GARDEN_TABLE: &str = "garden";

/// The two collections the service keeps.
#[derive(Clone)]
pub struct Stores {
    pub palette: Arc<dyn RecordStore>,
    pub garden: Arc<dyn RecordStore>,
}

/// Opens both collections on the configured backend.
pub fn open_stores(config: &Config) -> Result<Stores> {
    let timeout = config.lock_timeout();

    match config.backend {
        StorageBackend::Json => {
            let palette = JsonFileStore::new(&config.palette_path, timeout)?;
            let garden = JsonFileStore::new(&config.garden_path, timeout)?;
            tracing::info!(
                palette = %palette.path().display(),
                garden = %garden.path().display(),
                "Opened JSON record stores"
            );
            Ok(Stores {
                palette: Arc::new(palette),
                garden: Arc::new(garden),
            })
        }
        StorageBackend::Sqlite => {
            let palette = SqliteStore::open(&config.db_path, PALETTE_TABLE, timeout)?;
            let garden = SqliteStore::open(&config.db_path, GARDEN_TABLE, timeout)?;
            tracing::info!(
                db = %palette.db_path().display(),
                palette = palette.table(),
                garden = garden.table(),
                "Opened SQLite record stores"
            );
            Ok(Stores {
                palette: Arc::new(palette),
                garden: Arc::new(garden),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gardenmap_core::record::Record;
    use serde_json::json;

    fn config(dir: &std::path::Path, backend: StorageBackend) -> Config {
        Config {
            backend,
            palette_path: dir.join("plants.json"),
            garden_path: dir.join("garden.json"),
            db_path: dir.join("gardenmap.db"),
            lock_timeout_ms: 1_000,
            max_body_bytes: 1024,
        }
    }

    fn assert_collections_are_separate(stores: &Stores) {
        let plant = Record::try_from(json!({"id": "rose"})).unwrap();
        stores.palette.append(&[plant.clone()]).unwrap();

        assert_eq!(stores.palette.list_all().unwrap(), vec![plant]);
        assert!(stores.garden.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_open_json_stores() {
        let dir = tempfile::tempdir().unwrap();
        let stores = open_stores(&config(dir.path(), StorageBackend::Json)).unwrap();

        assert!(dir.path().join("plants.json").exists());
        assert!(dir.path().join("garden.json").exists());
        assert_collections_are_separate(&stores);
    }

    #[test]
    fn test_open_sqlite_stores() {
        let dir = tempfile::tempdir().unwrap();
        let stores = open_stores(&config(dir.path(), StorageBackend::Sqlite)).unwrap();

        assert!(dir.path().join("gardenmap.db").exists());
        assert_collections_are_separate(&stores);
    }
}
