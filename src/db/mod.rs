//! SQLite persistence for the ledger.
//!
//! Aggregates are stored whole, one JSON document per key, next to the few
//! columns used for lookups. Each event's writes and the ingest cursor
//! commit together.

pub mod migrations;
pub mod repo;

pub use migrations::{init_db, schema_version};
pub use repo::Repository;
