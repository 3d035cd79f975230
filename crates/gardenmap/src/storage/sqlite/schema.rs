//! SQLite schema definitions and per-namespace SQL statements.
//!
//! Table names cannot be bound as parameters, so every statement is built
//! once per store from a validated namespace.

use gardenmap_core::storage::{Result, StorageError};

/// Checks that `namespace` is a plain identifier usable as a table name.
pub fn validate_namespace(namespace: &str) -> Result<()> {
    let mut chars = namespace.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid && !namespace.to_ascii_lowercase().starts_with("sqlite_") {
        Ok(())
    } else {
        Err(StorageError::InvalidNamespace(namespace.to_string()))
    }
}

/// Statements for one namespace table.
///
/// Columns: `insertion_key` keeps storage order, `id` holds the canonical
/// JSON text of the record identity (nullable, not unique), `payload_json`
/// holds the full record.
#[derive(Debug, Clone)]
pub struct Queries {
    pub create_table: String,
    pub select_all: String,
    pub select_first_by_id: String,
    pub insert: String,
    pub update_payload: String,
}

impl Queries {
    /// Builds the statements for `table`, which must already be validated.
    pub fn for_table(table: &str) -> Self {
        Self {
            create_table: format!(
                r#"
CREATE TABLE IF NOT EXISTS "{table}" (
    insertion_key INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT,
    payload_json TEXT NOT NULL
);
"#
            ),
            select_all: format!(
                r#"SELECT payload_json FROM "{table}" ORDER BY insertion_key ASC"#
            ),
            select_first_by_id: format!(
                r#"SELECT insertion_key, payload_json FROM "{table}" WHERE id = ?1 ORDER BY insertion_key ASC LIMIT 1"#
            ),
            insert: format!(r#"INSERT INTO "{table}" (id, payload_json) VALUES (?1, ?2)"#),
            update_payload: format!(
                r#"UPDATE "{table}" SET payload_json = ?1 WHERE insertion_key = ?2"#
            ),
        }
    }

    /// `DELETE` for `count` ids. `count` must be at least one.
    pub fn delete_by_ids(table: &str, count: usize) -> String {
        let placeholders = vec!["?"; count].join(", ");
        format!(r#"DELETE FROM "{table}" WHERE id IN ({placeholders})"#)
    }
}
