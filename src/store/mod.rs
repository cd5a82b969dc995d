// Tollgate — Store Module
//
// Consumer persistence: a transactional property-graph store on SQLite, the
// codec between consumer records and graph nodes, the startup bulk loader,
// and the cached registry that the broker talks to.

mod codec;
mod error;
mod graph;
mod loader;
mod models;
mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use codec::{from_node, to_node, CONSUMER_TYPE};
pub use error::StoreError;
pub use graph::{GraphStore, NodeId, NodeReader, ReadSection, StoreTransaction, WriteSection, TYPE_PROPERTY};
pub use loader::{BulkLoader, LoadOutcome, LoadReport, SkippedNode};
pub use models::{Consumer, ConsumerSummary};
pub use registry::{ConsumerRegistry, ConsumerStore};
