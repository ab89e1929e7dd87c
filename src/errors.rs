use std::io;

use thiserror::Error;

use crate::types::StoreId;

/// Error type for storage, configuration, and batch execution failures.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The store could not be opened or read.
    #[error("record store '{store_id}' is unavailable: {reason}")]
    StoreUnavailable {
        /// Store that failed.
        store_id: StoreId,
        /// Underlying cause.
        reason: String,
    },
    /// The store loaded, but its contents violate an invariant (e.g. duplicate keys).
    #[error("record store '{store_id}' returned inconsistent state: {details}")]
    StoreInconsistent {
        /// Store that failed.
        store_id: StoreId,
        /// What was inconsistent.
        details: String,
    },
    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Malformed JSON in data or config files.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A scoring thread panicked.
    #[error("scoring worker {worker} failed: {reason}")]
    WorkerFailed {
        /// Index of the failed worker.
        worker: usize,
        /// Failure description.
        reason: String,
    },
}
