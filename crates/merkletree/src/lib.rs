//! Content-addressed sparse Merkle tree for identity claims
//!
//! Entries are four BN254 field elements. Each entry sits at the path given
//! by its hash-index `hi = H(e2, e3)`; leaves and internal nodes are keyed by
//! their Poseidon content hash, so the node store is a plain
//! content-addressed map shared safely between identities.

mod config;
mod crypto;
mod entry;
mod field;
mod node;
mod nodestore;
mod proof;
mod smt;
mod storage;
mod types;

pub use config::{TreeConfig, DEFAULT_MAX_LEVELS};
pub use crypto::{hash_elems, hash_internal, hash_leaf, poseidon};
pub use entry::{Entry, ELEMENT_BYTES, ENTRY_BYTES};
pub use field::{modulus_bytes, FieldElement};
pub use node::Node;
pub use nodestore::NodeStore;
pub use proof::{check_proof, AuxLeaf, Proof, BITMAP_BYTES, MAX_PROOF_LEVELS};
pub use smt::SparseMerkleTree;
pub use storage::{FileBackedStorage, InMemoryStorage, Storage, StorageError};
pub use types::{hash_from_hex, hash_serde, hash_to_hex, Hash32, EMPTY_HASH};

use light_poseidon::PoseidonError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MerkletreeError {
    #[error("Value is outside the finite field")]
    OutOfField,

    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    BadLength { expected: usize, actual: usize },

    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Max levels reached")]
    MaxLevelsReached,

    #[error("Entry not found")]
    EntryNotFound,

    #[error("Leaf hi does not match the requested hi")]
    HiMismatch,

    #[error("Max levels must be in 1..={max}, got {got}")]
    InvalidMaxLevels { got: u32, max: usize },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Corrupt node record of {0} bytes")]
    CorruptNode(usize),

    #[error("Invalid proof")]
    InvalidProof,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Hash error: {0}")]
    Hash(#[from] PoseidonError),
}

pub type Result<T> = std::result::Result<T, MerkletreeError>;
