use merkletree::Entry;

use super::ClaimEntry;
use crate::schema::{claim_version, read, ClaimType, EntryBuilder};
use crate::{ClaimsError, Id, Result};

pub const NAME_HASH_BYTES: usize = 31;

/// First 31 bytes of BLAKE3(name)
pub fn hash_name(name: &str) -> [u8; NAME_HASH_BYTES] {
    let digest = blake3::hash(name.as_bytes());
    let mut out = [0u8; NAME_HASH_BYTES];
    out.copy_from_slice(&digest.as_bytes()[..NAME_HASH_BYTES]);
    out
}

/// Binds a human-readable name to an identity.
///
/// Layout: `e2[1..32)` name hash, `e1[1..32)` id. The name itself is not
/// recoverable from the entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignName {
    version: u32,
    name_hash: [u8; NAME_HASH_BYTES],
    id: Id,
}

impl AssignName {
    pub fn new(name: &str, id: Id) -> Result<Self> {
        if name.is_empty() {
            return Err(ClaimsError::InvalidField("name must not be empty".into()));
        }
        Ok(Self { version: 0, name_hash: hash_name(name), id })
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn name_hash(&self) -> &[u8; NAME_HASH_BYTES] {
        &self.name_hash
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Whether this claim binds `name`
    pub fn is_name(&self, name: &str) -> bool {
        hash_name(name) == self.name_hash
    }
}

impl ClaimEntry for AssignName {
    const TYPE: ClaimType = ClaimType::AssignName;

    fn from_entry(entry: &Entry) -> Self {
        Self {
            version: claim_version(entry),
            name_hash: read(entry, 2, 1),
            id: Id::from(read::<31>(entry, 1, 1)),
        }
    }

    fn to_entry(&self) -> Entry {
        EntryBuilder::new(Self::TYPE, self.version)
            .put(2, 1, &self.name_hash)
            .put(1, 1, self.id.as_bytes())
            .build()
    }

    fn version(&self) -> u32 {
        self.version
    }
}
