use thiserror::Error;

/// Errors that can occur during record store operations.
///
/// "Not found" is deliberately absent: updates of unknown ids insert and
/// deletes of unknown ids do nothing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The lock or transaction could not be acquired in time. Retry later.
    #[error("Resource busy: {0}")]
    Busy(String),
    /// Reading or writing the backing resource failed.
    #[error("I/O failure: {0}")]
    Io(String),
    /// A payload could not be encoded or decoded.
    #[error("Corrupt payload: {0}")]
    Corrupt(String),
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),
}

impl StorageError {
    pub fn is_busy(&self) -> bool {
        matches!(self, StorageError::Busy(_))
    }
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, StorageError>;
