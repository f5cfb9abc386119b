//! Typed identity claims packed into sparse Merkle tree entries
//!
//! Each claim kind has a fixed byte layout over the four entry elements.
//! The last 12 bytes of `e3` carry the version and type tag, so every claim
//! lands in the tree at a position determined by its kind and index fields.

pub mod claim;
pub mod id;
pub mod kinds;
pub mod schema;
pub mod store;

pub use claim::{parse_claim, Claim};
pub use id::{Id, ID_BYTES};
pub use kinds::*;
pub use schema::{claim_type_tag, claim_version, ClaimType, CLAIM_TYPE_BYTES, CLAIM_VERSION_BYTES};
pub use store::{ClaimProof, ClaimStore};

use merkletree::MerkletreeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Unknown claim type: {0}")]
    UnknownClaimType(u64),

    #[error("Batch insert failed at claim {index}: {source}")]
    Batch {
        index: usize,
        #[source]
        source: MerkletreeError,
    },

    #[error("Tree error: {0}")]
    Tree(#[from] MerkletreeError),
}

pub type Result<T> = std::result::Result<T, ClaimsError>;
