// Tollgate — Consumer node codec
//
// Maps a consumer record onto a graph node and back. The persisted vocabulary
// is fixed: a `Consumer` type marker plus five string properties. Flags are
// the literals "true"/"false"; anything else reads as false.

use super::graph::{NodeId, NodeReader, StoreTransaction, TYPE_PROPERTY};
use super::models::Consumer;
use super::StoreError;

/// Type marker carried by every consumer node.
pub const CONSUMER_TYPE: &str = "Consumer";

pub const NAME: &str = "name";
pub const KEY: &str = "key";
pub const SECRET: &str = "secret";
pub const PROVISIONAL: &str = "provisional";
pub const TRUSTED: &str = "trusted";

fn encode_flag(flag: bool) -> &'static str {
    if flag {
        "true"
    } else {
        "false"
    }
}

fn decode_flag(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Create a new consumer node holding every field of the record.
pub fn to_node(tx: &StoreTransaction<'_>, consumer: &Consumer) -> Result<NodeId, StoreError> {
    let node = tx.create_node(CONSUMER_TYPE)?;
    tx.set_property(node, NAME, &consumer.name)?;
    tx.set_property(node, KEY, consumer.key())?;
    tx.set_property(node, SECRET, consumer.secret())?;
    tx.set_property(node, PROVISIONAL, encode_flag(consumer.provisional))?;
    tx.set_property(node, TRUSTED, encode_flag(consumer.trusted))?;
    Ok(node)
}

/// Rebuild a consumer from its node.
///
/// `key`, `secret` and `name` are required; the first one missing is reported
/// as `MissingField`. The flags are optional and default to false.
pub fn from_node<R>(reader: &R, node: NodeId) -> Result<Consumer, StoreError>
where
    R: NodeReader + ?Sized,
{
    let required = |property: &'static str| -> Result<String, StoreError> {
        reader
            .get_property(node, property)?
            .ok_or(StoreError::MissingField { node, property })
    };

    let key = required(KEY)?;
    let secret = required(SECRET)?;
    let name = required(NAME)?;

    let provisional = decode_flag(reader.get_property(node, PROVISIONAL)?.as_deref());
    let trusted = decode_flag(reader.get_property(node, TRUSTED)?.as_deref());

    Ok(Consumer::new(key, secret, name)
        .with_provisional(provisional)
        .with_trusted(trusted))
}

/// Delete every consumer node whose key matches. Returns how many went away.
///
/// Nodes of other types that happen to carry a `key` property are left alone.
pub fn delete_by_key(tx: &StoreTransaction<'_>, key: &str) -> Result<usize, StoreError> {
    let mut deleted = 0;
    for node in tx.find_nodes_by_property(KEY, key)? {
        if tx.get_property(node, TYPE_PROPERTY)?.as_deref() != Some(CONSUMER_TYPE) {
            continue;
        }
        if tx.delete_node(node)? {
            deleted += 1;
        }
    }
    Ok(deleted)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::graph::GraphStore;

    fn store_with(consumer: &Consumer) -> (GraphStore, NodeId) {
        let store = GraphStore::open_in_memory().unwrap();
        let node = store
            .enter_write()
            .unwrap()
            .run_in_transaction(|tx| to_node(tx, consumer))
            .unwrap();
        (store, node)
    }

    /// A node with hand-written properties, bypassing `to_node`.
    fn raw_node(store: &GraphStore, properties: &[(&str, &str)]) -> NodeId {
        store
            .enter_write()
            .unwrap()
            .run_in_transaction(|tx| {
                let node = tx.create_node(CONSUMER_TYPE)?;
                for (key, value) in properties {
                    tx.set_property(node, key, value)?;
                }
                Ok(node)
            })
            .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_every_field() {
        let records = [
            Consumer::new("abc123", "s3cr3t", "Test App"),
            Consumer::new("k2", "s2", "Approved")
                .with_provisional(false)
                .with_trusted(true),
            Consumer::new("k3", "s3", "Odd one").with_trusted(true),
            Consumer::new("k4", "", "Empty secret").with_provisional(false),
        ];

        for original in &records {
            let (store, node) = store_with(original);
            let section = store.enter_read().unwrap();
            let decoded = from_node(&section, node).unwrap();
            assert_eq!(&decoded, original);
        }
    }

    #[test]
    fn test_to_node_writes_type_marker_and_literal_flags() {
        let consumer = Consumer::new("abc123", "s3cr3t", "Test App");
        let (store, node) = store_with(&consumer);
        let section = store.enter_read().unwrap();

        let get = |key: &str| section.get_property(node, key).unwrap();
        assert_eq!(get(TYPE_PROPERTY).as_deref(), Some(CONSUMER_TYPE));
        assert_eq!(get(PROVISIONAL).as_deref(), Some("true"));
        assert_eq!(get(TRUSTED).as_deref(), Some("false"));
    }

    #[test]
    fn test_only_exact_true_literal_decodes_true() {
        let store = GraphStore::open_in_memory().unwrap();

        for literal in ["True", "TRUE", "1", "yes", " true", ""] {
            let node = raw_node(
                &store,
                &[(KEY, literal), (SECRET, "s"), (NAME, "n"), (PROVISIONAL, literal), (TRUSTED, literal)],
            );
            let section = store.enter_read().unwrap();
            let consumer = from_node(&section, node).unwrap();
            assert!(!consumer.provisional, "{:?} must decode to false", literal);
            assert!(!consumer.trusted, "{:?} must decode to false", literal);
        }

        let node = raw_node(
            &store,
            &[(KEY, "t"), (SECRET, "s"), (NAME, "n"), (PROVISIONAL, "true"), (TRUSTED, "true")],
        );
        let section = store.enter_read().unwrap();
        let consumer = from_node(&section, node).unwrap();
        assert!(consumer.provisional);
        assert!(consumer.trusted);
    }

    #[test]
    fn test_absent_flags_decode_false() {
        let store = GraphStore::open_in_memory().unwrap();
        let node = raw_node(&store, &[(KEY, "k"), (SECRET, "s"), (NAME, "n")]);

        let section = store.enter_read().unwrap();
        let consumer = from_node(&section, node).unwrap();
        assert!(!consumer.provisional);
        assert!(!consumer.trusted);
    }

    #[test]
    fn test_missing_required_property_is_named() {
        let store = GraphStore::open_in_memory().unwrap();
        let cases = [
            (vec![(SECRET, "s"), (NAME, "n")], KEY),
            (vec![(KEY, "k"), (NAME, "n")], SECRET),
            (vec![(KEY, "k"), (SECRET, "s")], NAME),
        ];

        for (properties, missing) in cases {
            let node = raw_node(&store, &properties);
            let section = store.enter_read().unwrap();
            match from_node(&section, node) {
                Err(StoreError::MissingField { node: at, property }) => {
                    assert_eq!(at, node);
                    assert_eq!(property, missing);
                }
                other => panic!("Expected MissingField({}), got {:?}", missing, other),
            }
        }
    }

    #[test]
    fn test_delete_by_key_removes_only_matching_nodes() {
        let store = GraphStore::open_in_memory().unwrap();
        raw_node(&store, &[(KEY, "dup"), (SECRET, "a"), (NAME, "A")]);
        raw_node(&store, &[(KEY, "dup"), (SECRET, "b"), (NAME, "B")]);
        let keep = raw_node(&store, &[(KEY, "other"), (SECRET, "c"), (NAME, "C")]);

        let deleted = store
            .enter_write()
            .unwrap()
            .run_in_transaction(|tx| delete_by_key(tx, "dup"))
            .unwrap();
        assert_eq!(deleted, 2);

        let section = store.enter_read().unwrap();
        assert_eq!(
            section.find_nodes_by_property(TYPE_PROPERTY, CONSUMER_TYPE).unwrap(),
            vec![keep]
        );
    }

    #[test]
    fn test_delete_by_key_ignores_other_node_types() {
        let store = GraphStore::open_in_memory().unwrap();
        raw_node(&store, &[(KEY, "dup"), (SECRET, "a"), (NAME, "A")]);
        let widget = store
            .enter_write()
            .unwrap()
            .run_in_transaction(|tx| {
                let node = tx.create_node("Widget")?;
                tx.set_property(node, KEY, "dup")?;
                Ok(node)
            })
            .unwrap();

        let deleted = store
            .enter_write()
            .unwrap()
            .run_in_transaction(|tx| delete_by_key(tx, "dup"))
            .unwrap();
        assert_eq!(deleted, 1);

        let section = store.enter_read().unwrap();
        assert_eq!(section.find_nodes_by_property(KEY, "dup").unwrap(), vec![widget]);
        assert_eq!(
            section.get_property(widget, TYPE_PROPERTY).unwrap().as_deref(),
            Some("Widget")
        );
    }
}
