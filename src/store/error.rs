// Tollgate — Store error types
//
// Every fault raised below the registry collapses into one of four kinds.
// Driver errors are mapped to `Fault` at the graph store boundary.

use std::path::PathBuf;

use thiserror::Error;

use super::graph::NodeId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Consumer store at {path} could not be opened: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Consumer node {node} is missing required property '{property}'")]
    MissingField { node: NodeId, property: &'static str },

    #[error("Graph store fault: {0}")]
    Fault(#[from] rusqlite::Error),

    #[error("Consumer store not initialized")]
    NotInitialized,
}

impl StoreError {
    /// True for errors that only concern a single persisted record.
    pub fn is_record_local(&self) -> bool {
        matches!(self, StoreError::MissingField { .. })
    }
}
