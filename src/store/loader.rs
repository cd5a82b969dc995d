// Tollgate — Bulk Loader
//
// Warms the consumer cache at startup. Every consumer node is decoded under
// one read section; a node missing a required property is logged and skipped,
// while any other store fault aborts the whole load.

use std::collections::HashMap;

use tracing::Dispatch;

use super::codec::{self, CONSUMER_TYPE, KEY, NAME};
use super::graph::{GraphStore, NodeId, NodeReader, TYPE_PROPERTY};
use super::models::Consumer;
use super::StoreError;

/// A persisted node that could not be turned into a consumer.
#[derive(Debug)]
pub struct SkippedNode {
    pub node: NodeId,
    /// Whatever name and key the node still carries, for diagnostics.
    pub name: Option<String>,
    pub key: Option<String>,
    pub reason: StoreError,
}

/// Result of decoding one node during a bulk load.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Consumer),
    Skipped(SkippedNode),
}

/// Summary of a completed bulk load.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedNode>,
}

/// Decode one node, turning record-local failures into a skip.
pub fn decode<R>(reader: &R, node: NodeId) -> Result<LoadOutcome, StoreError>
where
    R: NodeReader + ?Sized,
{
    match codec::from_node(reader, node) {
        Ok(consumer) => Ok(LoadOutcome::Loaded(consumer)),
        Err(reason) if reason.is_record_local() => Ok(LoadOutcome::Skipped(SkippedNode {
            node,
            name: reader.get_property(node, NAME)?,
            key: reader.get_property(node, KEY)?,
            reason,
        })),
        Err(e) => Err(e),
    }
}

pub struct BulkLoader<'a> {
    store: &'a GraphStore,
    dispatch: &'a Dispatch,
}

impl<'a> BulkLoader<'a> {
    pub fn new(store: &'a GraphStore, dispatch: &'a Dispatch) -> Self {
        Self { store, dispatch }
    }

    /// Read every consumer node into a map keyed by consumer key.
    ///
    /// When several nodes share a key the newest node wins.
    pub fn load(&self) -> Result<(HashMap<String, Consumer>, LoadReport), StoreError> {
        tracing::dispatcher::with_default(self.dispatch, || self.load_all())
    }

    fn load_all(&self) -> Result<(HashMap<String, Consumer>, LoadReport), StoreError> {
        let section = self.store.enter_read()?;
        let nodes = section.find_nodes_by_property(TYPE_PROPERTY, CONSUMER_TYPE)?;

        let mut consumers = HashMap::with_capacity(nodes.len());
        let mut report = LoadReport::default();

        for node in nodes {
            match decode(&section, node)? {
                LoadOutcome::Loaded(consumer) => {
                    let key = consumer.key().to_string();
                    if consumers.insert(key, consumer).is_some() {
                        tracing::warn!(
                            node = %node,
                            "Duplicate consumer key in store; keeping the newest node"
                        );
                    }
                }
                LoadOutcome::Skipped(skipped) => {
                    tracing::error!(
                        node = %skipped.node,
                        name = skipped.name.as_deref(),
                        key = skipped.key.as_deref(),
                        error = %skipped.reason,
                        "Could not load consumer"
                    );
                    report.skipped.push(skipped);
                }
            }
        }
        section.leave();

        report.loaded = consumers.len();
        tracing::info!(
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "Consumer cache loaded"
        );

        Ok((consumers, report))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
