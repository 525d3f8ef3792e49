//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Table name rejected before being placed in a statement.
    #[error("invalid table name: {0:?}")]
    InvalidTable(String),

    /// Table missing from the database file.
    #[error("table `{0}` does not exist, initialize the database first")]
    UnknownTable(String),

    /// A stored value could not be read back.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A thread panicked while holding the connection.
    #[error("store connection lock poisoned")]
    LockPoisoned,
}
