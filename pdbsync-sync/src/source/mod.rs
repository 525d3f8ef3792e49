//! Where records come from.

mod memory;
mod peeringdb;

pub use memory::MemorySource;
pub use peeringdb::{PeeringDbClient, SourceConfig};

use crate::error::SyncResult;
use async_trait::async_trait;
use pdbsync_schema::EntityType;
use pdbsync_types::{Record, Timestamp};

/// A remote catalog queried by "changed since".
///
/// Implementations are shared by every synchronization task and must be safe
/// to call concurrently. Deleted objects are returned with the `deleted`
/// status, never omitted.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Returns every record of `entity` created, updated or deleted after
    /// `since`. [`Timestamp::EPOCH`] asks for everything.
    async fn fetch(&self, entity: &EntityType, since: Timestamp) -> SyncResult<Vec<Record>>;
}
