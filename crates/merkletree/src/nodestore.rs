use std::collections::HashSet;

use tracing::trace;

use crate::node::Node;
use crate::storage::Storage;
use crate::{Hash32, MerkletreeError, Result, EMPTY_HASH};

/// Content-addressed node store over a namespaced [`Storage`].
///
/// Record key = `prefix + hex(node key)`. Records are never rewritten, so a
/// key that is already present is skipped on commit.
pub struct NodeStore<S: Storage> {
    storage: S,
    prefix: String,
    known: HashSet<Hash32>,
}

impl<S: Storage> NodeStore<S> {
    pub fn new(storage: S, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
            known: HashSet::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn record_key(&self, key: &Hash32) -> String {
        format!("{}{}", self.prefix, hex::encode(key))
    }

    pub fn get_node(&self, key: &Hash32) -> Result<Node> {
        if *key == EMPTY_HASH {
            return Ok(Node::Empty);
        }
        let bytes = self
            .storage
            .get(&self.record_key(key))
            .map_err(|e| MerkletreeError::Storage(e.to_string()))?
            .ok_or_else(|| MerkletreeError::NodeNotFound(hex::encode(key)))?;
        Node::from_bytes(&bytes)
    }

    /// Write a batch of `(key, node)` pairs, skipping empties and known keys
    pub fn commit(&mut self, batch: Vec<(Hash32, Node)>) -> Result<()> {
        for (key, node) in batch {
            if key == EMPTY_HASH || self.known.contains(&key) {
                continue;
            }
            let record_key = self.record_key(&key);
            let exists = self
                .storage
                .get(&record_key)
                .map_err(|e| MerkletreeError::Storage(e.to_string()))?
                .is_some();
            if exists {
                trace!(key = %hex::encode(key), "nodestore: dedup");
            } else {
                self.storage
                    .put(&record_key, &node.to_bytes())
                    .map_err(|e| MerkletreeError::Storage(e.to_string()))?;
            }
            self.known.insert(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    #[test]
    fn test_prefix_namespacing() {
        let storage = InMemoryStorage::new();
        let mut a = NodeStore::new(storage.clone(), "alice:");
        let b = NodeStore::new(storage.clone(), "bob:");

        let node = Node::Internal { child0: [0u8; 32], child1: [0u8; 32] };
        let key = node.key().unwrap();
        a.commit(vec![(key, node.clone())]).unwrap();

        assert_eq!(a.get_node(&key).unwrap(), node);
        assert!(matches!(b.get_node(&key), Err(MerkletreeError::NodeNotFound(_))));
        assert!(storage.get(&format!("alice:{}", hex::encode(key))).unwrap().is_some());
    }

    #[test]
    fn test_empty_never_persisted() {
        let storage = InMemoryStorage::new();
        let mut store = NodeStore::new(storage.clone(), "");
        store.commit(vec![(EMPTY_HASH, Node::Empty)]).unwrap();
        assert!(storage.is_empty());
        assert_eq!(store.get_node(&EMPTY_HASH).unwrap(), Node::Empty);
    }

    #[test]
    fn test_duplicate_commit_writes_once() {
        let storage = InMemoryStorage::new();
        let mut store = NodeStore::new(storage.clone(), "x:");
        let node = Node::Internal { child0: [0u8; 32], child1: [0u8; 32] };
        let key = node.key().unwrap();
        store.commit(vec![(key, node.clone()), (key, node)]).unwrap();
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_corrupt_record() {
        let mut storage = InMemoryStorage::new();
        let store = NodeStore::new(storage.clone(), "");
        let key = [7u8; 32];
        storage.put(&hex::encode(key), &[1, 2, 3]).unwrap();
        assert!(matches!(store.get_node(&key), Err(MerkletreeError::CorruptNode(3))));
    }
}
