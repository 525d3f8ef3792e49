//! Schema registry for peeringdb-sync.
//!
//! Describes everything the synchronization engine needs to know about the
//! local store without touching it:
//! - [`Column`] / [`ColumnType`]: one column, its SQL type and constraints
//! - [`Table`]: ordered columns, uniqueness constraints, DDL and the
//!   record-to-column-values mapping
//! - [`Schema`]: all tables plus secondary indexes
//! - [`EntityType`]: one synchronizable kind, its remote resource and the
//!   entity types it depends on
//! - [`Catalog`]: a validated schema + entity type list; [`Catalog::peeringdb`]
//!   is the built-in PeeringDB declaration
//!
//! The registry is read-only once built; the engine only ever reads column
//! names and maps records through it.

mod catalog;
mod column;
mod entity;
mod schema;
mod table;

pub use catalog::Catalog;
pub use column::{Column, ColumnType};
pub use entity::EntityType;
pub use schema::{Index, Schema};
pub use table::Table;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while validating a catalog declaration.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("entity type `{entity}` refers to unknown table `{table}`")]
    UnknownTable { entity: String, table: String },

    #[error("table `{table}` lacks mandatory column `{column}`")]
    MissingColumn { table: String, column: &'static str },

    #[error("table `{0}` must declare `id` as its first column")]
    IdNotFirst(String),

    #[error("entity type `{0}` is declared twice")]
    DuplicateEntity(String),
}
