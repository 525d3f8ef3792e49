//! Per-entity incremental synchronization.

use crate::error::{SyncError, SyncResult};
use crate::progress::{NoopProgress, ProgressFactory, ProgressObserver};
use crate::scheduler::{RunReport, Scheduler, Task};
use crate::source::RecordSource;
use pdbsync_schema::{Catalog, EntityType};
use pdbsync_store::{BatchSummary, Store, StoreResult, WriteMode};
use pdbsync_types::Timestamp;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Engine settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(with = "write_mode_serde")]
    pub write_mode: WriteMode,
}

mod write_mode_serde {
    use pdbsync_store::WriteMode;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(mode: &WriteMode, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(mode)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<WriteMode, D::Error> {
        String::deserialize(d)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// What one entity synchronization did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityReport {
    pub entity: String,
    /// Watermark the records were requested with.
    pub since: Timestamp,
    /// Records returned by the source.
    pub fetched: usize,
    pub summary: BatchSummary,
}

/// Synchronizes the entity types of a catalog from a record source into a
/// store.
///
/// Cloning is cheap; clones share the store, the source and the catalog.
#[derive(Clone)]
pub struct SyncEngine {
    store: Store,
    source: Arc<dyn RecordSource>,
    catalog: Arc<Catalog>,
    config: SyncConfig,
    progress: Arc<dyn ProgressFactory>,
}

impl SyncEngine {
    /// Creates a new engine with the default configuration and no progress
    /// output.
    pub fn new(store: Store, source: Arc<dyn RecordSource>, catalog: Catalog) -> Self {
        Self {
            store,
            source,
            catalog: Arc::new(catalog),
            config: SyncConfig::default(),
            progress: Arc::new(NoopProgress),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressFactory>) -> Self {
        self.progress = progress;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Brings one entity type's table up to date.
    ///
    /// The records changed since the table's watermark are fetched, then
    /// written and tombstones removed in a single transaction that is
    /// committed before this returns. When nothing changed no transaction is
    /// opened.
    pub async fn sync_entity(&self, entity: &EntityType) -> SyncResult<EntityReport> {
        let table = self
            .catalog
            .table_for(entity)
            .cloned()
            .ok_or_else(|| SyncError::UnknownEntity(entity.name.clone()))?;

        let table_name = table.name.clone();
        let since = self.blocking(move |store| store.since_date(&table_name)).await?;

        let records = self.source.fetch(entity, since).await?;
        if records.is_empty() {
            info!("No {} to sync since {}", entity.display_name, since);
            return Ok(EntityReport {
                entity: entity.name.clone(),
                since,
                fetched: 0,
                summary: BatchSummary::default(),
            });
        }

        let fetched = records.len();
        let progress = self.progress.reporter(entity);
        progress.set_total(fetched);

        let mode = self.config.write_mode;
        let reporter = Arc::clone(&progress);
        let summary = self
            .blocking(move |store| {
                store.apply_batch(&table, &records, since, mode, &ProgressObserver(&*reporter))
            })
            .await?;
        progress.complete();

        info!(
            entity = %entity.name,
            inserted = summary.inserted,
            updated = summary.updated,
            deleted = summary.deleted,
            "{} synchronized",
            entity.display_name
        );
        Ok(EntityReport {
            entity: entity.name.clone(),
            since,
            fetched,
            summary,
        })
    }

    /// [`SyncEngine::sync_entity`] by entity type name.
    pub async fn sync_named(&self, name: &str) -> SyncResult<EntityReport> {
        let entity = self
            .catalog
            .entity(name)
            .cloned()
            .ok_or_else(|| SyncError::UnknownEntity(name.to_string()))?;
        self.sync_entity(&entity).await
    }

    /// One task per entity type of the catalog, wired after the catalog's
    /// dependency declaration.
    pub fn scheduler(&self) -> Scheduler<EntityReport> {
        let mut scheduler = Scheduler::new();
        for declared in self.catalog.entities() {
            let depends_on: Vec<&str> = declared.depends_on.iter().map(String::as_str).collect();
            let engine = self.clone();
            let entity = declared.clone();
            scheduler.add(Task::new(&declared.name, &depends_on, move || async move {
                engine.sync_entity(&entity).await
            }));
        }
        scheduler
    }

    /// Synchronizes every entity type of the catalog.
    pub async fn run(&self) -> SyncResult<RunReport<EntityReport>> {
        self.scheduler().run().await
    }

    /// Runs a store operation on the blocking thread pool.
    async fn blocking<T, F>(&self, operation: F) -> SyncResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Store) -> StoreResult<T> + Send + 'static,
    {
        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || operation(&store)).await {
            Ok(result) => Ok(result?),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(SyncError::Aborted(e.to_string())),
        }
    }
}
