//! Pure functions for mapping storage errors to HTTP status codes.

use super::StorageError;

/// Maps a [`StorageError`] to an HTTP status code.
///
/// - `Busy` -> 503 (Service Unavailable)
/// - `Io` -> 500 (Internal Server Error)
/// - `Corrupt` -> 500 (Internal Server Error)
/// - `InvalidNamespace` -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use gardenmap_core::storage::{storage_error_to_status_code, StorageError};
///
/// let error = StorageError::Busy("file lock".to_string());
/// assert_eq!(storage_error_to_status_code(&error), 503);
/// ```
pub fn storage_error_to_status_code(error: &StorageError) -> u16 {
    match error {
        StorageError::Busy(_) => 503,
        StorageError::Io(_) => 500,
        StorageError::Corrupt(_) => 500,
        StorageError::InvalidNamespace(_) => 500,
    }
}
