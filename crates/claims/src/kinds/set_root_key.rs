use merkletree::{Entry, Hash32};

use super::{check_element, ClaimEntry};
use crate::schema::{claim_version, read, ClaimType, EntryBuilder};
use crate::{Id, Result};

/// Commits the root of another identity's tree.
///
/// Layout: `e3[16..20)` era, `e2[1..32)` id, `e1` root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetRootKey {
    version: u32,
    era: u32,
    id: Id,
    root_key: Hash32,
}

impl SetRootKey {
    pub fn new(id: Id, root_key: Hash32) -> Result<Self> {
        check_element(&root_key, "root key")?;
        Ok(Self { version: 0, era: 0, id, root_key })
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_era(mut self, era: u32) -> Self {
        self.era = era;
        self
    }

    pub fn era(&self) -> u32 {
        self.era
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn root_key(&self) -> &Hash32 {
        &self.root_key
    }
}

impl ClaimEntry for SetRootKey {
    const TYPE: ClaimType = ClaimType::SetRootKey;

    fn from_entry(entry: &Entry) -> Self {
        Self {
            version: claim_version(entry),
            era: u32::from_be_bytes(read(entry, 3, 16)),
            id: Id::from(read::<31>(entry, 2, 1)),
            root_key: entry.element_bytes(1),
        }
    }

    fn to_entry(&self) -> Entry {
        EntryBuilder::new(Self::TYPE, self.version)
            .put(3, 16, &self.era.to_be_bytes())
            .put(2, 1, self.id.as_bytes())
            .put(1, 0, &self.root_key)
            .build()
    }

    fn version(&self) -> u32 {
        self.version
    }
}
