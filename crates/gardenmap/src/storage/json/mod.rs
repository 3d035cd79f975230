//! Flat-file JSON storage backend.
//!
//! One JSON document per namespace, holding the `{ "plantlist": [...] }`
//! envelope. Every operation runs under a [`lock::FileLock`] and every
//! write replaces the document atomically.

pub mod lock;
mod store;

pub use store::JsonFileStore;
