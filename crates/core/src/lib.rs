//! Core record model and storage contract for gardenmap.
//!
//! Everything in this crate is pure: the record types, the collection
//! operations shared by every backend, request validation, and the storage
//! trait that backends in the `gardenmap` crate implement.

pub mod record;
pub mod storage;
