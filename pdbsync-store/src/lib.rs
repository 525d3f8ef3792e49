//! SQLite storage layer for peeringdb-sync.
//!
//! A [`Store`] owns one connection shared by every synchronization task. It
//! applies the DDL produced by the schema registry, computes per-table
//! watermarks from the stored `updated` column, and writes fetched batches
//! inside a single transaction per table.
//!
//! Foreign keys are declared by the schema but not enforced: a dependent
//! record may reference a row the remote side never sent.

mod batch;
mod error;
mod sql;
mod store;

pub use batch::{BatchObserver, BatchSummary, WriteMode};
pub use error::{StoreError, StoreResult};
pub use store::{Store, delete_database};

pub use rusqlite::types::Value as SqlValue;
