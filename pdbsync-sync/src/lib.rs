//! Dependency-ordered incremental synchronization for peeringdb-sync.
//!
//! # Architecture
//!
//! - **Source**: [`RecordSource`] returns the records of one entity type
//!   changed since a timestamp ([`PeeringDbClient`] over HTTP,
//!   [`MemorySource`] in memory)
//! - **Engine**: [`SyncEngine::sync_entity`] derives the table's watermark,
//!   fetches, then writes the batch and drops tombstones in one transaction
//! - **Scheduler**: [`Scheduler`] runs one [`Task`] per entity type, each
//!   starting once its predecessors have finished
//! - **Progress**: [`ProgressReporter`] receives per-batch counts
//!
//! # Example
//!
//! ```no_run
//! use pdbsync_schema::Catalog;
//! use pdbsync_store::Store;
//! use pdbsync_sync::{PeeringDbClient, SourceConfig, SyncEngine};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::peeringdb();
//! let store = Store::open("peeringdb.db")?;
//! store.init_schema(catalog.schema())?;
//!
//! let source = PeeringDbClient::new(SourceConfig::default())?;
//! let report = SyncEngine::new(store, Arc::new(source), catalog).run().await?;
//! println!("{} entity types synchronized", report.results.len());
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
pub mod progress;
mod scheduler;
pub mod source;

pub use engine::{EntityReport, SyncConfig, SyncEngine};
pub use error::{SyncError, SyncResult, TaskFailure};
pub use progress::{CountingProgress, LogProgress, NoopProgress, ProgressFactory, ProgressReporter};
pub use scheduler::{RunReport, Scheduler, Task};
pub use source::{MemorySource, PeeringDbClient, RecordSource, SourceConfig};
