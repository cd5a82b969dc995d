// Tollgate — Graph Store
//
// A small property-graph engine on top of SQLite. Nodes carry a type marker
// and scalar string properties, one value per property key. All access goes
// through scoped critical sections: any number of readers, or exactly one
// writer. Mutations exist only on a transaction opened from a write section.

use std::fmt;
use std::path::Path;

use chrono::Utc;
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use super::StoreError;

/// Property that holds a node's type marker.
pub const TYPE_PROPERTY: &str = "type";

/// Identity of a node inside one graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ─── Read Access ─────────────────────────────────────────────────────────────

/// Read-only node queries, valid under either critical section.
pub trait NodeReader {
    /// All nodes whose `key` property equals `value`, in creation order.
    fn find_nodes_by_property(&self, key: &str, value: &str) -> Result<Vec<NodeId>, StoreError>;

    /// The value of one property, or `None` if the node does not carry it.
    fn get_property(&self, node: NodeId, key: &str) -> Result<Option<String>, StoreError>;
}

fn query_nodes(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<Vec<NodeId>> {
    let mut stmt = conn.prepare_cached(
        "SELECT node_id FROM node_properties
         WHERE key = ?1 AND value = ?2
         ORDER BY node_id ASC",
    )?;

    let rows = stmt.query_map(params![key, value], |row| row.get(0).map(NodeId))?;

    let mut nodes = Vec::new();
    for row in rows {
        nodes.push(row?);
    }
    Ok(nodes)
}

fn query_property(conn: &Connection, node: NodeId, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM node_properties WHERE node_id = ?1 AND key = ?2",
        params![node.0, key],
        |row| row.get(0),
    )
    .optional()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A lockable, transactional graph store.
///
/// The connection sits behind its own mutex so that shared read sections can
/// run statements from several threads; the section lock decides who may be
/// inside the store at all.
pub struct GraphStore {
    sections: RwLock<()>,
    conn: Mutex<Option<Connection>>,
}

impl GraphStore {
    /// Open (or create) a graph store at the given path.
    ///
    /// Any failure to open the file or bring its schema up to date makes the
    /// store unavailable.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| unavailable(path, e))?;
        run_migrations(&conn).map_err(|e| unavailable(path, e))?;

        tracing::debug!(path = %path.display(), "Graph store opened");
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory store (for testing only).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let path = Path::new(":memory:");
        let conn = Connection::open_in_memory().map_err(|e| unavailable(path, e))?;
        run_migrations(&conn).map_err(|e| unavailable(path, e))?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            sections: RwLock::new(()),
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Enter the shared read section. Blocks while a writer is inside.
    pub fn enter_read(&self) -> Result<ReadSection<'_>, StoreError> {
        let guard = self.sections.read();
        if self.conn.lock().is_none() {
            return Err(StoreError::NotInitialized);
        }
        Ok(ReadSection {
            store: self,
            _guard: guard,
        })
    }

    /// Enter the exclusive write section. Blocks until every reader and
    /// writer has left.
    pub fn enter_write(&self) -> Result<WriteSection<'_>, StoreError> {
        let guard = self.sections.write();
        if self.conn.lock().is_none() {
            return Err(StoreError::NotInitialized);
        }
        Ok(WriteSection {
            store: self,
            _guard: guard,
        })
    }

    pub fn is_open(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Release the underlying connection. Later attempts to enter a section
    /// fail with `NotInitialized`. Closing twice is a no-op.
    pub fn close(&self) -> Result<(), StoreError> {
        let _section = self.sections.write();
        let Some(conn) = self.conn.lock().take() else {
            return Ok(());
        };

        conn.close().map_err(|(_, e)| StoreError::Fault(e))?;
        tracing::debug!("Graph store closed");
        Ok(())
    }

    /// Run raw SQL against the backing database (for fault injection in tests).
    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let conn = conn.as_ref().ok_or(StoreError::NotInitialized)?;
        conn.execute_batch(sql)?;
        Ok(())
    }
}

fn unavailable(path: &Path, source: rusqlite::Error) -> StoreError {
    StoreError::Unavailable {
        path: path.to_path_buf(),
        source,
    }
}

/// Create the node and property tables if they are missing.
fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS nodes (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS node_properties (
            node_id     INTEGER NOT NULL,
            key         TEXT NOT NULL,
            value       TEXT NOT NULL,
            PRIMARY KEY (node_id, key),
            FOREIGN KEY(node_id) REFERENCES nodes(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_node_properties_key_value
            ON node_properties(key, value);
        ",
    )?;

    tracing::debug!("Graph store migrations completed successfully");
    Ok(())
}

// ─── Critical Sections ───────────────────────────────────────────────────────

/// A held shared read section. Leaving is dropping.
pub struct ReadSection<'s> {
    store: &'s GraphStore,
    _guard: RwLockReadGuard<'s, ()>,
}

impl ReadSection<'_> {
    pub fn leave(self) {}

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let conn = self.store.conn.lock();
        let conn = conn.as_ref().ok_or(StoreError::NotInitialized)?;
        Ok(f(conn)?)
    }
}

impl NodeReader for ReadSection<'_> {
    fn find_nodes_by_property(&self, key: &str, value: &str) -> Result<Vec<NodeId>, StoreError> {
        self.with_conn(|conn| query_nodes(conn, key, value))
    }

    fn get_property(&self, node: NodeId, key: &str) -> Result<Option<String>, StoreError> {
        self.with_conn(|conn| query_property(conn, node, key))
    }
}

/// A held exclusive write section. Leaving is dropping.
pub struct WriteSection<'s> {
    store: &'s GraphStore,
    _guard: RwLockWriteGuard<'s, ()>,
}

impl WriteSection<'_> {
    /// Run a unit of work in one transaction.
    ///
    /// The transaction commits only if the closure returns `Ok`. An error from
    /// the closure, a failed commit, or a panic rolls every mutation back.
    pub fn run_in_transaction<T, F>(&mut self, unit_of_work: F) -> Result<T, StoreError>
    where
        F: FnOnce(&StoreTransaction<'_>) -> Result<T, StoreError>,
    {
        let mut conn = self.store.conn.lock();
        let conn = conn.as_mut().ok_or(StoreError::NotInitialized)?;

        let txn = StoreTransaction {
            tx: conn.transaction()?,
        };
        let value = unit_of_work(&txn)?;
        txn.tx.commit()?;

        Ok(value)
    }

    pub fn leave(self) {}
}

// ─── Transaction ─────────────────────────────────────────────────────────────

/// The mutation scope handed to a unit of work.
pub struct StoreTransaction<'c> {
    tx: Transaction<'c>,
}

impl StoreTransaction<'_> {
    /// Allocate a node and tag it with the given type marker.
    pub fn create_node(&self, node_type: &str) -> Result<NodeId, StoreError> {
        self.tx.execute(
            "INSERT INTO nodes (created_at) VALUES (?1)",
            params![Utc::now().to_rfc3339()],
        )?;
        let node = NodeId(self.tx.last_insert_rowid());
        self.set_property(node, TYPE_PROPERTY, node_type)?;
        Ok(node)
    }

    /// Delete a node with all of its properties. Returns true if it existed.
    pub fn delete_node(&self, node: NodeId) -> Result<bool, StoreError> {
        self.tx.execute(
            "DELETE FROM node_properties WHERE node_id = ?1",
            params![node.0],
        )?;
        let affected = self
            .tx
            .execute("DELETE FROM nodes WHERE id = ?1", params![node.0])?;
        Ok(affected > 0)
    }

    /// Set a property, replacing any previous value for the same key.
    pub fn set_property(&self, node: NodeId, key: &str, value: &str) -> Result<(), StoreError> {
        self.tx.execute(
            "INSERT INTO node_properties (node_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(node_id, key) DO UPDATE SET value = excluded.value",
            params![node.0, key, value],
        )?;
        Ok(())
    }

    /// Drop a single property (for corrupting nodes in tests). Returns true if it was set.
    #[cfg(test)]
    pub(crate) fn remove_property(&self, node: NodeId, key: &str) -> Result<bool, StoreError> {
        let affected = self.tx.execute(
            "DELETE FROM node_properties WHERE node_id = ?1 AND key = ?2",
            params![node.0, key],
        )?;
        Ok(affected > 0)
    }
}

impl NodeReader for StoreTransaction<'_> {
    fn find_nodes_by_property(&self, key: &str, value: &str) -> Result<Vec<NodeId>, StoreError> {
        Ok(query_nodes(&self.tx, key, value)?)
    }

    fn get_property(&self, node: NodeId, key: &str) -> Result<Option<String>, StoreError> {
        Ok(query_property(&self.tx, node, key)?)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
