use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

/// Which `RecordStore` implementation backs the palette and the garden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// One JSON document per collection.
    #[default]
    Json,
    /// One table per collection in a shared SQLite database.
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Sqlite => f.write_str("sqlite"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown storage backend {0:?} (expected \"json\" or \"sqlite\")")]
    UnknownBackend(String),

    #[error("invalid value {value:?} for {name}: expected a non-negative integer")]
    InvalidNumber { name: &'static str, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Storage backend (default: json)
    pub backend: StorageBackend,
    /// Palette document for the json backend (default: "plants.json")
    pub palette_path: PathBuf,
    /// Garden document for the json backend (default: "garden.json")
    pub garden_path: PathBuf,
    /// Database file for the sqlite backend (default: "gardenmap.db")
    pub db_path: PathBuf,
    /// Lock wait bound in milliseconds (default: 5000)
    pub lock_timeout_ms: u64,
    /// Request body limit in bytes (default: 40 MiB)
    pub max_body_bytes: usize,
}

pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 40 * 1024 * 1024;

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `GARDENMAP_STORAGE` - `json` or `sqlite` (default: json)
    /// - `GARDENMAP_PALETTE_PATH` - palette document (default: "plants.json")
    /// - `GARDENMAP_DATA_PATH` - garden document (default: "garden.json")
    /// - `GARDENMAP_DB_PATH` - SQLite database (default: "gardenmap.db")
    /// - `GARDENMAP_LOCK_TIMEOUT_MS` - lock wait bound (default: 5000)
    /// - `GARDENMAP_MAX_BODY_BYTES` - request body limit (default: 41943040)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let path = |name: &str, default: &str| {
            lookup(name)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        let backend = match lookup("GARDENMAP_STORAGE") {
            Some(value) => value.parse()?,
            None => StorageBackend::default(),
        };

        Ok(Self {
            backend,
            palette_path: path("GARDENMAP_PALETTE_PATH", "plants.json"),
            garden_path: path("GARDENMAP_DATA_PATH", "garden.json"),
            db_path: path("GARDENMAP_DB_PATH", "gardenmap.db"),
            lock_timeout_ms: number(&lookup, "GARDENMAP_LOCK_TIMEOUT_MS", DEFAULT_LOCK_TIMEOUT_MS)?,
            max_body_bytes: number(&lookup, "GARDENMAP_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
        })
    }

    /// Get the lock timeout as a Duration.
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

fn number<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}
