//! Claim header (type tag + version) and entry byte packing
//!
//! Every claim keeps the last 12 bytes of `e3` for its header:
//! `e3[20..24)` version (u32 BE), `e3[24..32)` claim type tag (u64 BE).
//! Byte 0 of each element stays zero so packed elements are below the prime.

use merkletree::{Entry, FieldElement, ELEMENT_BYTES};
use serde::{Deserialize, Serialize};

pub const CLAIM_TYPE_BYTES: usize = 8;
pub const CLAIM_VERSION_BYTES: usize = 4;

const TYPE_START: usize = ELEMENT_BYTES - CLAIM_TYPE_BYTES;
const VERSION_START: usize = TYPE_START - CLAIM_VERSION_BYTES;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimType {
    Basic,
    AuthorizeKSignBabyJub,
    SetRootKey,
    AssignName,
    AuthorizeKSignSecp256k1,
    LinkObjectIdentity,
    AuthorizeEthKey,
}

impl ClaimType {
    pub const fn tag(self) -> u64 {
        match self {
            ClaimType::Basic => 0,
            ClaimType::AuthorizeKSignBabyJub => 1,
            ClaimType::SetRootKey => 2,
            ClaimType::AssignName => 3,
            ClaimType::AuthorizeKSignSecp256k1 => 4,
            ClaimType::LinkObjectIdentity => 5,
            ClaimType::AuthorizeEthKey => 9,
        }
    }

    pub fn from_tag(tag: u64) -> Option<Self> {
        match tag {
            0 => Some(ClaimType::Basic),
            1 => Some(ClaimType::AuthorizeKSignBabyJub),
            2 => Some(ClaimType::SetRootKey),
            3 => Some(ClaimType::AssignName),
            4 => Some(ClaimType::AuthorizeKSignSecp256k1),
            5 => Some(ClaimType::LinkObjectIdentity),
            9 => Some(ClaimType::AuthorizeEthKey),
            _ => None,
        }
    }
}

/// Raw claim type tag of an entry
pub fn claim_type_tag(entry: &Entry) -> u64 {
    u64::from_be_bytes(read(entry, 3, TYPE_START))
}

/// Version counter of an entry
pub fn claim_version(entry: &Entry) -> u32 {
    u32::from_be_bytes(read(entry, 3, VERSION_START))
}

/// Copy `N` bytes of element `element` starting at `start`
pub(crate) fn read<const N: usize>(entry: &Entry, element: usize, start: usize) -> [u8; N] {
    let bytes = entry.element_bytes(element);
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[start..start + N]);
    out
}

/// Byte-level builder for a claim entry
pub(crate) struct EntryBuilder {
    elements: [[u8; ELEMENT_BYTES]; 4],
}

impl EntryBuilder {
    pub(crate) fn new(claim_type: ClaimType, version: u32) -> Self {
        let mut elements = [[0u8; ELEMENT_BYTES]; 4];
        elements[3][TYPE_START..].copy_from_slice(&claim_type.tag().to_be_bytes());
        elements[3][VERSION_START..TYPE_START].copy_from_slice(&version.to_be_bytes());
        Self { elements }
    }

    pub(crate) fn put(mut self, element: usize, start: usize, bytes: &[u8]) -> Self {
        self.elements[element][start..start + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// Callers only place full 32-byte values that were checked against the
    /// prime, so the reduction never changes a value.
    pub(crate) fn build(self) -> Entry {
        Entry::from_elements(self.elements.map(|e| FieldElement::from_be_bytes_mod_order(&e)))
    }
}
