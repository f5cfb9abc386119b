//! Typed views over a claim entry, one module per claim kind

mod assign_name;
mod authorize_eth_key;
mod authorize_ksign_babyjub;
mod authorize_ksign_secp256k1;
mod basic;
mod link_object_identity;
mod set_root_key;

pub use assign_name::{hash_name, AssignName, NAME_HASH_BYTES};
pub use authorize_eth_key::{AuthorizeEthKey, ETH_ADDR_BYTES};
pub use authorize_ksign_babyjub::AuthorizeKSignBabyJub;
pub use authorize_ksign_secp256k1::{AuthorizeKSignSecp256k1, SECP256K1_COMPRESSED_BYTES};
pub use basic::{Basic, BASIC_DATA_BYTES, BASIC_INDEX_BYTES};
pub use link_object_identity::LinkObjectIdentity;
pub use set_root_key::SetRootKey;

use merkletree::{Entry, FieldElement, Hash32};

use crate::schema::ClaimType;
use crate::{ClaimsError, Result};

/// Conversion between a claim kind and its entry.
///
/// `from_entry` never fails: it slices whatever bytes are there and does not
/// check the type tag. Use [`crate::parse_claim`] to dispatch on the tag.
pub trait ClaimEntry: Sized {
    const TYPE: ClaimType;

    fn from_entry(entry: &Entry) -> Self;
    fn to_entry(&self) -> Entry;
    fn version(&self) -> u32;
}

/// A value that must occupy a whole element
fn check_element(value: &Hash32, what: &str) -> Result<()> {
    FieldElement::from_bytes(value)
        .map(|_| ())
        .map_err(|_| ClaimsError::InvalidField(format!("{what} is not a field element")))
}
