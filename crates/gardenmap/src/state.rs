//! Application state shared by all request handlers.

use std::sync::Arc;

use gardenmap_core::storage::RecordStore;

use crate::{config::DEFAULT_MAX_BODY_BYTES, storage::Stores};

/// Shared application state.
///
/// Cloned for each request handler. Holds the palette and garden stores as
/// trait objects so handlers never depend on the active backend.
#[derive(Clone)]
pub struct AppState {
    /// Plant palette.
    pub palette: Arc<dyn RecordStore>,
    /// Placed garden items.
    pub garden: Arc<dyn RecordStore>,
    /// Request body limit in bytes.
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(stores: Stores) -> Self {
        Self {
            palette: stores.palette,
            garden: stores.garden,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}
