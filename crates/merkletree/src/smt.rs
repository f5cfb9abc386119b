use tracing::{debug, warn};

use crate::config::TreeConfig;
use crate::node::Node;
use crate::nodestore::NodeStore;
use crate::proof::Proof;
use crate::storage::Storage;
use crate::types::hash_to_hex;
use crate::{Entry, Hash32, MerkletreeError, Result, EMPTY_HASH};

/// Sparse Merkle tree over a content-addressed node store.
///
/// Leaves hang at the shallowest level where their `hi` prefix is unique, so
/// the root depends only on the set of entries, not on insertion order.
/// Single writer: `insert` takes `&mut self`, reads take `&self`.
pub struct SparseMerkleTree<S: Storage> {
    store: NodeStore<S>,
    root: Hash32,
    max_levels: usize,
}

impl<S: Storage> SparseMerkleTree<S> {
    /// Empty tree
    pub fn new(storage: S, config: &TreeConfig) -> Result<Self> {
        Self::with_root(storage, config, EMPTY_HASH)
    }

    /// Reopen a tree whose nodes are already in `storage` under the same prefix
    pub fn with_root(storage: S, config: &TreeConfig, root: Hash32) -> Result<Self> {
        config.validate()?;
        let tree = Self {
            store: NodeStore::new(storage, config.key_prefix.clone()),
            root,
            max_levels: config.max_levels as usize,
        };
        // fail early on a root the store does not know
        tree.store.get_node(&root)?;
        Ok(tree)
    }

    pub fn root(&self) -> Hash32 {
        self.root
    }

    pub fn max_levels(&self) -> u32 {
        self.max_levels as u32
    }

    pub fn key_prefix(&self) -> &str {
        self.store.prefix()
    }

    pub fn storage(&self) -> &S {
        self.store.storage()
    }

    pub fn get_node(&self, key: &Hash32) -> Result<Node> {
        self.store.get_node(key)
    }

    /// Insert an entry under its `hi`.
    ///
    /// Re-inserting an existing `hi` fails with `MaxLevelsReached`. On error
    /// nothing is written and the root is unchanged.
    pub fn insert(&mut self, entry: &Entry) -> Result<()> {
        let hi = entry.hi()?;
        let leaf = Node::Leaf(*entry);
        let leaf_key = leaf.key()?;
        let mut batch = vec![(leaf_key, leaf)];
        let mut siblings: Vec<Hash32> = Vec::new();

        let mut next = self.root;
        let mut lvl = 0;
        let bottom = loop {
            if lvl >= self.max_levels {
                warn!(hi = %hash_to_hex(&hi), lvl, "smt: insert exhausted max levels");
                return Err(MerkletreeError::MaxLevelsReached);
            }
            match self.store.get_node(&next)? {
                Node::Empty => break leaf_key,
                Node::Leaf(old) => {
                    break self.split_leaf(&hi, leaf_key, &old, next, lvl, &mut siblings, &mut batch)?
                }
                Node::Internal { child0, child1 } => {
                    if path_bit(&hi, lvl) {
                        siblings.push(child0);
                        next = child1;
                    } else {
                        siblings.push(child1);
                        next = child0;
                    }
                    lvl += 1;
                }
            }
        };

        let root = rebuild(&hi, bottom, &siblings, &mut batch)?;
        self.store.commit(batch)?;
        self.root = root;

        debug!(
            hi = %hash_to_hex(&hi),
            depth = siblings.len(),
            root = %hash_to_hex(&root),
            "smt: entry inserted"
        );
        Ok(())
    }

    /// Push an existing leaf down until its path diverges from `hi`.
    /// Returns the key of the new internal node holding both leaves.
    #[allow(clippy::too_many_arguments)]
    fn split_leaf(
        &self,
        hi: &Hash32,
        new_key: Hash32,
        old: &Entry,
        old_key: Hash32,
        mut lvl: usize,
        siblings: &mut Vec<Hash32>,
        batch: &mut Vec<(Hash32, Node)>,
    ) -> Result<Hash32> {
        let old_hi = old.hi()?;
        let Some(split) = first_divergence(hi, &old_hi, lvl, self.max_levels) else {
            warn!(hi = %hash_to_hex(hi), lvl, "smt: no divergence within max levels");
            return Err(MerkletreeError::MaxLevelsReached);
        };
        siblings.resize(siblings.len() + (split - lvl), EMPTY_HASH);

        let node = if path_bit(hi, split) {
            Node::Internal { child0: old_key, child1: new_key }
        } else {
            Node::Internal { child0: new_key, child1: old_key }
        };
        let key = node.key()?;
        batch.push((key, node));
        Ok(key)
    }

    /// Entry stored under `hi`
    pub fn get_entry(&self, hi: &Hash32) -> Result<Entry> {
        let mut next = self.root;
        for lvl in 0..self.max_levels {
            match self.store.get_node(&next)? {
                Node::Empty => return Err(MerkletreeError::EntryNotFound),
                Node::Leaf(entry) => {
                    return if entry.hi()? == *hi {
                        Ok(entry)
                    } else {
                        Err(MerkletreeError::HiMismatch)
                    };
                }
                Node::Internal { child0, child1 } => {
                    next = if path_bit(hi, lvl) { child1 } else { child0 };
                }
            }
        }
        Err(MerkletreeError::EntryNotFound)
    }

    /// Existence or non-existence proof for `hi` against the current root
    pub fn generate_proof(&self, hi: &Hash32) -> Result<Proof> {
        let mut siblings: Vec<Hash32> = Vec::new();
        let mut not_empty = Vec::new();
        let mut next = self.root;

        for lvl in 0..self.max_levels {
            match self.store.get_node(&next)? {
                Node::Empty => {
                    debug!(hi = %hash_to_hex(hi), lvl, "smt: non-existence proof (empty)");
                    return Ok(Proof::non_existence(&not_empty, siblings, None));
                }
                Node::Leaf(entry) => {
                    let leaf_hi = entry.hi()?;
                    if leaf_hi == *hi {
                        debug!(hi = %hash_to_hex(hi), lvl, "smt: existence proof");
                        return Ok(Proof::existence(&not_empty, siblings));
                    }
                    // a leaf that insert could not split away from `hi` is not attached
                    if first_divergence(hi, &leaf_hi, lvl, self.max_levels).is_none() {
                        debug!(hi = %hash_to_hex(hi), lvl, "smt: non-existence proof (unsplittable leaf)");
                        return Ok(Proof::non_existence(&not_empty, siblings, None));
                    }
                    debug!(hi = %hash_to_hex(hi), lvl, "smt: non-existence proof (aux leaf)");
                    return Ok(Proof::non_existence(&not_empty, siblings, Some((leaf_hi, entry.hv()?))));
                }
                Node::Internal { child0, child1 } => {
                    let sibling = if path_bit(hi, lvl) {
                        next = child1;
                        child0
                    } else {
                        next = child0;
                        child1
                    };
                    not_empty.push(sibling != EMPTY_HASH);
                    if sibling != EMPTY_HASH {
                        siblings.push(sibling);
                    }
                }
            }
        }
        Err(MerkletreeError::EntryNotFound)
    }
}

/// Fold `bottom` up through the buffered siblings, deepest first
fn rebuild(
    hi: &Hash32,
    bottom: Hash32,
    siblings: &[Hash32],
    batch: &mut Vec<(Hash32, Node)>,
) -> Result<Hash32> {
    let mut current = bottom;
    for (lvl, sibling) in siblings.iter().enumerate().rev() {
        let node = if path_bit(hi, lvl) {
            Node::Internal { child0: *sibling, child1: current }
        } else {
            Node::Internal { child0: current, child1: *sibling }
        };
        current = node.key()?;
        batch.push((current, node));
    }
    Ok(current)
}

/// First level in `from..` where `a` and `b` take different branches and a
/// two-leaf internal node still fits under `max_levels`
fn first_divergence(a: &Hash32, b: &Hash32, from: usize, max_levels: usize) -> Option<usize> {
    (from..max_levels.saturating_sub(1)).find(|&lvl| path_bit(a, lvl) != path_bit(b, lvl))
}

/// Bit `lvl` of `hi`, least-significant bit of the big-endian value first
pub(crate) fn path_bit(hi: &Hash32, lvl: usize) -> bool {
    let byte_index = 31 - (lvl / 8);
    let bit_index = lvl % 8;
    ((hi[byte_index] >> bit_index) & 1) == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use crate::FieldElement;

    fn entry(a: u64, b: u64, c: u64, d: u64) -> Entry {
        Entry::from_elements([
            FieldElement::from(a),
            FieldElement::from(b),
            FieldElement::from(c),
            FieldElement::from(d),
        ])
    }

    fn tree(max_levels: u32) -> SparseMerkleTree<InMemoryStorage> {
        SparseMerkleTree::new(InMemoryStorage::new(), &TreeConfig::new(max_levels, "t:")).unwrap()
    }

    #[test]
    fn test_path_bit_lsb_first() {
        let mut h = [0u8; 32];
        h[31] = 0b0000_0101;
        h[30] = 0b1000_0000;
        assert!(path_bit(&h, 0));
        assert!(!path_bit(&h, 1));
        assert!(path_bit(&h, 2));
        assert!(path_bit(&h, 15));
        assert!(!path_bit(&h, 16));
    }

    #[test]
    fn test_empty_tree() {
        let t = tree(140);
        assert_eq!(t.root(), EMPTY_HASH);
    }

    #[test]
    fn test_single_leaf_is_root() {
        let mut t = tree(140);
        let e = entry(12, 45, 78, 41);
        t.insert(&e).unwrap();
        assert_eq!(t.root(), Node::Leaf(e).key().unwrap());
        assert_eq!(t.get_entry(&e.hi().unwrap()).unwrap(), e);
    }

    #[test]
    fn test_two_leaves_split_at_root() {
        let mut t = tree(140);
        let a = entry(1, 0, 1, 0);
        let b = entry(2, 0, 2, 0);
        t.insert(&a).unwrap();
        t.insert(&b).unwrap();

        match t.get_node(&t.root()).unwrap() {
            Node::Internal { child0, child1 } => {
                assert!(child0 != EMPTY_HASH || child1 != EMPTY_HASH);
            }
            other => panic!("expected internal root, got {other:?}"),
        }
        assert_eq!(t.get_entry(&a.hi().unwrap()).unwrap(), a);
        assert_eq!(t.get_entry(&b.hi().unwrap()).unwrap(), b);
    }

    #[test]
    fn test_duplicate_hi_rejected() {
        let mut t = tree(140);
        let a = entry(1, 2, 3, 4);
        t.insert(&a).unwrap();
        let root = t.root();

        // same index half, different value half
        let b = entry(9, 9, 3, 4);
        assert!(matches!(t.insert(&b), Err(MerkletreeError::MaxLevelsReached)));
        assert!(matches!(t.insert(&a), Err(MerkletreeError::MaxLevelsReached)));
        assert_eq!(t.root(), root);
    }

    #[test]
    fn test_lookup_errors() {
        let mut t = tree(140);
        assert!(matches!(t.get_entry(&[0u8; 32]), Err(MerkletreeError::EntryNotFound)));

        let a = entry(1, 2, 3, 4);
        t.insert(&a).unwrap();
        // the only leaf sits at the root, so any other key lands on it
        let other = entry(0, 0, 5, 6).hi().unwrap();
        assert!(matches!(t.get_entry(&other), Err(MerkletreeError::HiMismatch)));
    }

    #[test]
    fn test_failed_insert_writes_nothing() {
        let storage = InMemoryStorage::new();
        let mut t = SparseMerkleTree::new(storage.clone(), &TreeConfig::new(140, "")).unwrap();
        t.insert(&entry(1, 2, 3, 4)).unwrap();
        let before = storage.len();
        assert!(t.insert(&entry(5, 6, 3, 4)).is_err());
        assert_eq!(storage.len(), before);
    }

    #[test]
    fn test_reopen_with_root() {
        let storage = InMemoryStorage::new();
        let cfg = TreeConfig::new(140, "alice:");
        let mut t = SparseMerkleTree::new(storage.clone(), &cfg).unwrap();
        for i in 0..5 {
            t.insert(&entry(0, i, 0, i)).unwrap();
        }
        let root = t.root();
        drop(t);

        let reopened = SparseMerkleTree::with_root(storage.clone(), &cfg, root).unwrap();
        assert_eq!(reopened.get_entry(&entry(0, 3, 0, 3).hi().unwrap()).unwrap(), entry(0, 3, 0, 3));

        let wrong_prefix = TreeConfig::new(140, "bob:");
        assert!(matches!(
            SparseMerkleTree::with_root(storage, &wrong_prefix, root),
            Err(MerkletreeError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_proof_skips_unsplittable_leaf() {
        // two levels: a leaf at the root can only split on bit 0
        let mut t = tree(2);
        let a = entry(1, 2, 3, 4);
        t.insert(&a).unwrap();
        let a_hi = a.hi().unwrap();

        let same_bit = (0..64)
            .map(|i| entry(0, 0, i, 7))
            .find(|e| path_bit(&e.hi().unwrap(), 0) == path_bit(&a_hi, 0))
            .unwrap();
        let other_bit = (0..64)
            .map(|i| entry(0, 0, i, 7))
            .find(|e| path_bit(&e.hi().unwrap(), 0) != path_bit(&a_hi, 0))
            .unwrap();

        let (hi, hv) = (same_bit.hi().unwrap(), same_bit.hv().unwrap());
        let proof = t.generate_proof(&hi).unwrap();
        assert!(!proof.is_existence());
        assert!(proof.aux().is_none());
        assert_eq!(proof.flags(), 0x01);
        assert!(!proof.verify(&t.root(), &hi, &hv));
        assert!(matches!(t.insert(&same_bit), Err(MerkletreeError::MaxLevelsReached)));

        let (hi, hv) = (other_bit.hi().unwrap(), other_bit.hv().unwrap());
        let proof = t.generate_proof(&hi).unwrap();
        assert_eq!(proof.flags(), 0x03);
        assert!(proof.verify(&t.root(), &hi, &hv));
        t.insert(&other_bit).unwrap();
        assert!(t.generate_proof(&hi).unwrap().verify(&t.root(), &hi, &hv));
    }

    #[test]
    fn test_first_divergence_bound() {
        let a = [0u8; 32];
        let mut b = [0u8; 32];
        b[31] = 0b0000_0100;
        assert_eq!(first_divergence(&a, &b, 0, 140), Some(2));
        assert_eq!(first_divergence(&a, &b, 0, 4), Some(2));
        // the split node at level 2 would put leaves at level 3
        assert_eq!(first_divergence(&a, &b, 0, 3), None);
        assert_eq!(first_divergence(&a, &a, 0, 140), None);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            SparseMerkleTree::new(InMemoryStorage::new(), &TreeConfig::new(0, "")),
            Err(MerkletreeError::InvalidMaxLevels { .. })
        ));
    }
}
