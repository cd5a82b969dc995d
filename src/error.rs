// Tollgate — Top-level error types
//
// Aggregates store errors and the I/O and serialization failures of the
// command-line front end into a single error enum for the application boundary.

use thiserror::Error;

/// Top-level error type for all Tollgate operations.
#[derive(Debug, Error)]
pub enum TollgateError {
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TollgateError>;
