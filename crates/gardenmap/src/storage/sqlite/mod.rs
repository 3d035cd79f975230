//! SQLite storage backend.
//!
//! Each namespace is one table in a shared database file. Every operation
//! opens its own connection and commits before returning, so nothing is held
//! open between calls.

mod conversions;
mod error;
mod schema;
mod store;

pub use store::SqliteStore;
