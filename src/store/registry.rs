// Tollgate — Consumer Registry
//
// The authoritative consumer set. Reads are served from an in-memory cache;
// every mutation runs as one transaction inside the store's write section,
// and the cache is updated only after that transaction commits.
// Key design decision: the cache has its own lock, so lookups never wait on
// a store read and never observe a half-applied mutation.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::RwLock;
use tracing::Dispatch;

use super::codec;
use super::graph::GraphStore;
use super::loader::{BulkLoader, LoadReport};
use super::models::Consumer;
use super::StoreError;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// The operations a trust broker needs to validate and administer consumers.
pub trait ConsumerStore {
    /// The consumer registered under `key`, if any.
    fn lookup(&self, key: &str) -> Option<Consumer>;

    /// Every registered consumer, ordered by key.
    fn list_all(&self) -> Vec<Consumer>;

    /// Insert the consumer, or fully replace the one with the same key.
    fn add_or_update(&self, consumer: Consumer) -> Result<Consumer, StoreError>;

    /// Same as `add_or_update`; a replacement is never a partial merge.
    fn update(&self, consumer: Consumer) -> Result<Consumer, StoreError> {
        self.add_or_update(consumer)
    }

    /// Remove the consumer under `key`, returning it if it was registered.
    fn remove(&self, key: &str) -> Result<Option<Consumer>, StoreError>;
}

// ─── Graph-backed Implementation ─────────────────────────────────────────────

pub struct ConsumerRegistry {
    store: GraphStore,
    cache: RwLock<HashMap<String, Consumer>>,
    dispatch: Dispatch,
    report: LoadReport,
}

impl ConsumerRegistry {
    /// Open the store at `path` and load every consumer it holds.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::new(GraphStore::open(path)?)
    }

    /// Build a registry over an open store, logging to the current dispatcher.
    pub fn new(store: GraphStore) -> Result<Self, StoreError> {
        let dispatch = tracing::dispatcher::get_default(|current| current.clone());
        Self::with_dispatch(store, dispatch)
    }

    /// Build a registry over an open store, logging to `dispatch`.
    ///
    /// Malformed consumer nodes are skipped and listed in `load_report()`;
    /// any other store fault fails construction.
    pub fn with_dispatch(store: GraphStore, dispatch: Dispatch) -> Result<Self, StoreError> {
        let (consumers, report) = BulkLoader::new(&store, &dispatch).load()?;

        Ok(Self {
            store,
            cache: RwLock::new(consumers),
            dispatch,
            report,
        })
    }

    /// What the startup bulk load found.
    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Close the backing store. Cached lookups keep working; mutations fail
    /// with `NotInitialized`.
    pub fn close(&self) -> Result<(), StoreError> {
        self.logged(|| {
            self.store.close()?;
            tracing::info!("Consumer registry closed");
            Ok(())
        })
    }

    fn logged<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl ConsumerStore for ConsumerRegistry {
    fn lookup(&self, key: &str) -> Option<Consumer> {
        self.cache.read().get(key).cloned()
    }

    fn list_all(&self) -> Vec<Consumer> {
        let mut consumers: Vec<Consumer> = self.cache.read().values().cloned().collect();
        consumers.sort_by(|a, b| a.key().cmp(b.key()));
        consumers
    }

    fn add_or_update(&self, consumer: Consumer) -> Result<Consumer, StoreError> {
        self.logged(|| {
            let mut section = self.store.enter_write()?;

            let (replaced, node) = section
                .run_in_transaction(|tx| {
                    let replaced = codec::delete_by_key(tx, consumer.key())?;
                    let node = codec::to_node(tx, &consumer)?;
                    Ok((replaced, node))
                })
                .map_err(|e| {
                    tracing::warn!(key = %consumer.key(), error = %e, "Consumer write rolled back");
                    e
                })?;

            // Still inside the write section: cache order matches commit order.
            self.cache
                .write()
                .insert(consumer.key().to_string(), consumer.clone());
            section.leave();

            tracing::info!(
                key = %consumer.key(),
                node = %node,
                replaced,
                "Consumer stored"
            );

            Ok(consumer)
        })
    }

    fn remove(&self, key: &str) -> Result<Option<Consumer>, StoreError> {
        self.logged(|| {
            let mut section = self.store.enter_write()?;

            let deleted = section
                .run_in_transaction(|tx| codec::delete_by_key(tx, key))
                .map_err(|e| {
                    tracing::warn!(key = %key, error = %e, "Consumer removal rolled back");
                    e
                })?;

            let removed = self.cache.write().remove(key);
            section.leave();

            if removed.is_some() || deleted > 0 {
                tracing::info!(key = %key, nodes = deleted, "Consumer removed");
            } else {
                tracing::debug!(key = %key, "No consumer to remove");
            }

            Ok(removed)
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
