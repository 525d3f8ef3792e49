//! Core type definitions for peeringdb-sync.
//!
//! This crate defines the plain data types shared by every other crate:
//! - [`Record`]: one object returned by the remote catalog (id, updated, status, attributes)
//! - [`Value`]: a scalar ready to be bound to a storage column
//! - [`Timestamp`]: second-precision Unix time, the unit of the per-table watermark
//!
//! Nothing here knows about SQL or HTTP.

mod record;
mod timestamp;
mod value;

pub use record::{DELETED_STATUS, Record};
pub use timestamp::Timestamp;
pub use value::Value;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("record is missing mandatory field `{0}`")]
    MissingField(&'static str),

    #[error("record field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}
