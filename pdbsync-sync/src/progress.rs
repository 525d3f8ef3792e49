//! Progress reporting for entity batches.
//!
//! Reporters are fire-and-forget: every call returns immediately and none of
//! them can fail.

use pdbsync_schema::EntityType;
use pdbsync_store::BatchObserver;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::info;

/// Receives the progress of one entity batch.
pub trait ProgressReporter: Send + Sync {
    /// Number of records about to be written.
    fn set_total(&self, total: usize);
    /// One record written.
    fn increment(&self);
    /// The batch committed.
    fn complete(&self);
}

/// Hands out one reporter per synchronized entity type.
pub trait ProgressFactory: Send + Sync {
    fn reporter(&self, entity: &EntityType) -> Arc<dyn ProgressReporter>;
}

impl<F> ProgressFactory for F
where
    F: Fn(&EntityType) -> Arc<dyn ProgressReporter> + Send + Sync,
{
    fn reporter(&self, entity: &EntityType) -> Arc<dyn ProgressReporter> {
        self(entity)
    }
}

/// Forwards store callbacks to a reporter.
pub(crate) struct ProgressObserver<'a>(pub &'a dyn ProgressReporter);

impl BatchObserver for ProgressObserver<'_> {
    fn record_applied(&self) {
        self.0.increment();
    }
}

// ── Noop ─────────────────────────────────────────────────────────

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn set_total(&self, _total: usize) {}
    fn increment(&self) {}
    fn complete(&self) {}
}

impl ProgressFactory for NoopProgress {
    fn reporter(&self, _entity: &EntityType) -> Arc<dyn ProgressReporter> {
        Arc::new(NoopProgress)
    }
}

// ── Log ──────────────────────────────────────────────────────────

/// Logs each tenth of a batch through `tracing`.
#[derive(Debug, Default)]
pub struct LogProgress {
    label: String,
    total: AtomicUsize,
    done: AtomicUsize,
    logged_tenths: AtomicUsize,
}

impl LogProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// A factory labelling each reporter with the entity's display name.
    pub fn factory() -> impl ProgressFactory {
        |entity: &EntityType| -> Arc<dyn ProgressReporter> {
            Arc::new(LogProgress::new(entity.display_name.clone()))
        }
    }
}

impl ProgressReporter for LogProgress {
    fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        info!("Synchronizing {} {}", total, self.label);
    }

    fn increment(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            return;
        }
        let tenths = (done * 10 / total).min(10);
        if self.logged_tenths.fetch_max(tenths, Ordering::Relaxed) < tenths {
            info!("{}: {}% ({}/{})", self.label, tenths * 10, done, total);
        }
    }

    fn complete(&self) {
        info!(
            "{}: done, {} record(s) written",
            self.label,
            self.done.load(Ordering::Relaxed)
        );
    }
}

// ── Counting ─────────────────────────────────────────────────────

/// Records every event it receives.
#[derive(Debug, Default)]
pub struct CountingProgress {
    total: AtomicUsize,
    increments: AtomicUsize,
    completed: AtomicBool,
}

impl CountingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn increments(&self) -> usize {
        self.increments.load(Ordering::SeqCst)
    }

    pub fn is_complete(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }
}

impl ProgressReporter for CountingProgress {
    fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
    }

    fn increment(&self) {
        self.increments.fetch_add(1, Ordering::SeqCst);
    }

    fn complete(&self) {
        self.completed.store(true, Ordering::SeqCst);
    }
}
