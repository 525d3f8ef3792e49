use super::RecordSource;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use pdbsync_schema::EntityType;
use pdbsync_types::{Record, Timestamp};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// In-memory [`RecordSource`] keyed by entity type name.
///
/// Returns the stored records whose `updated` is after the requested
/// watermark, in insertion order. Entity types without records return an
/// empty list.
#[derive(Debug, Default)]
pub struct MemorySource {
    records: RwLock<HashMap<String, Vec<Record>>>,
    delays: HashMap<String, Duration>,
    failures: HashMap<String, String>,
    requests: RwLock<Vec<(String, Timestamp)>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_records(mut self, entity: &str, records: impl IntoIterator<Item = Record>) -> Self {
        self.records
            .get_mut()
            .entry(entity.to_string())
            .or_default()
            .extend(records);
        self
    }

    /// Delays every fetch of `entity`.
    #[must_use]
    pub fn with_delay(mut self, entity: &str, delay: Duration) -> Self {
        self.delays.insert(entity.to_string(), delay);
        self
    }

    /// Makes every fetch of `entity` fail with a network error.
    #[must_use]
    pub fn with_failure(mut self, entity: &str, message: &str) -> Self {
        self.failures.insert(entity.to_string(), message.to_string());
        self
    }

    /// Appends records, as if they changed remotely.
    pub async fn push(&self, entity: &str, records: impl IntoIterator<Item = Record>) {
        self.records
            .write()
            .await
            .entry(entity.to_string())
            .or_default()
            .extend(records);
    }

    /// Every `(entity, since)` pair fetched so far.
    pub async fn requests(&self) -> Vec<(String, Timestamp)> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn fetch(&self, entity: &EntityType, since: Timestamp) -> SyncResult<Vec<Record>> {
        if let Some(delay) = self.delays.get(&entity.name) {
            tokio::time::sleep(*delay).await;
        }
        self.requests.write().await.push((entity.name.clone(), since));

        if let Some(message) = self.failures.get(&entity.name) {
            return Err(SyncError::Network(message.clone()));
        }

        Ok(self
            .records
            .read()
            .await
            .get(&entity.name)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.updated() > since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
