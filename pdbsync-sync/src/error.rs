//! Error types for the sync layer.

use pdbsync_store::StoreError;
use std::fmt;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport failure talking to the record source.
    #[error("network error: {0}")]
    Network(String),

    /// The record source answered with an error status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The record source answered with a body that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A fetched record lacks a mandatory attribute.
    #[error("invalid record: {0}")]
    Record(#[from] pdbsync_types::Error),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Entity type not part of the catalog.
    #[error("unknown entity type: {0}")]
    UnknownEntity(String),

    /// A blocking store operation did not run to completion.
    #[error("store task aborted: {0}")]
    Aborted(String),

    /// Two tasks share a name.
    #[error("task `{0}` is declared twice")]
    DuplicateTask(String),

    /// A task waits on a task that does not exist.
    #[error("task `{task}` depends on unknown task `{dependency}`")]
    UnknownDependency { task: String, dependency: String },

    /// The dependency declaration is not acyclic.
    #[error("dependency cycle among tasks: {}", .0.join(", "))]
    DependencyCycle(Vec<String>),

    /// One or more tasks failed or panicked; every other task still ran.
    #[error("{} task(s) failed: {}", .0.len(), TaskFailure::list(.0))]
    TasksFailed(Vec<TaskFailure>),
}

/// One failed task of a scheduler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task: String,
    pub reason: String,
}

impl TaskFailure {
    fn list(failures: &[Self]) -> String {
        failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.task, self.reason)
    }
}
