//! Tree nodes and their on-store encoding
//!
//! Stored values carry no tag byte: an internal node is exactly 64 bytes
//! (two child keys), a leaf exactly 128 bytes (the entry). Any other length
//! is a corrupt record.

use crate::crypto;
use crate::entry::ENTRY_BYTES;
use crate::{Entry, Hash32, MerkletreeError, Result, EMPTY_HASH};

const INTERNAL_BYTES: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Empty,
    Internal { child0: Hash32, child1: Hash32 },
    Leaf(Entry),
}

impl Node {
    /// Content hash, which is also the store key
    pub fn key(&self) -> Result<Hash32> {
        match self {
            Node::Empty => Ok(EMPTY_HASH),
            Node::Internal { child0, child1 } => crypto::hash_internal(child0, child1),
            Node::Leaf(entry) => crypto::hash_leaf(&entry.hi()?, &entry.hv()?),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Node::Empty => Vec::new(),
            Node::Internal { child0, child1 } => {
                let mut out = Vec::with_capacity(INTERNAL_BYTES);
                out.extend_from_slice(child0);
                out.extend_from_slice(child1);
                out
            }
            Node::Leaf(entry) => entry.to_bytes().to_vec(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            INTERNAL_BYTES => {
                let mut child0 = [0u8; 32];
                let mut child1 = [0u8; 32];
                child0.copy_from_slice(&bytes[..32]);
                child1.copy_from_slice(&bytes[32..]);
                Ok(Node::Internal { child0, child1 })
            }
            ENTRY_BYTES => Ok(Node::Leaf(Entry::from_bytes(bytes)?)),
            len => Err(MerkletreeError::CorruptNode(len)),
        }
    }
}
