use merkletree::{Entry, Hash32};

use super::{check_element, ClaimEntry};
use crate::schema::{claim_version, read, ClaimType, EntryBuilder};
use crate::{Id, Result};

/// Links an external object (by hash) to an identity.
///
/// Layout: `e3[14..18)` object type, `e3[18..20)` object index,
/// `e2[1..32)` id, `e1` object hash, `e0` auxiliary data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkObjectIdentity {
    version: u32,
    object_type: u32,
    object_index: u16,
    id: Id,
    object_hash: Hash32,
    aux_data: Hash32,
}

impl LinkObjectIdentity {
    pub fn new(
        object_type: u32,
        object_index: u16,
        id: Id,
        object_hash: Hash32,
        aux_data: Hash32,
    ) -> Result<Self> {
        check_element(&object_hash, "object hash")?;
        check_element(&aux_data, "aux data")?;
        Ok(Self {
            version: 0,
            object_type,
            object_index,
            id,
            object_hash,
            aux_data,
        })
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn object_type(&self) -> u32 {
        self.object_type
    }

    pub fn object_index(&self) -> u16 {
        self.object_index
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn object_hash(&self) -> &Hash32 {
        &self.object_hash
    }

    pub fn aux_data(&self) -> &Hash32 {
        &self.aux_data
    }
}

impl ClaimEntry for LinkObjectIdentity {
    const TYPE: ClaimType = ClaimType::LinkObjectIdentity;

    fn from_entry(entry: &Entry) -> Self {
        Self {
            version: claim_version(entry),
            object_type: u32::from_be_bytes(read(entry, 3, 14)),
            object_index: u16::from_be_bytes(read(entry, 3, 18)),
            id: Id::from(read::<31>(entry, 2, 1)),
            object_hash: entry.element_bytes(1),
            aux_data: entry.element_bytes(0),
        }
    }

    fn to_entry(&self) -> Entry {
        EntryBuilder::new(Self::TYPE, self.version)
            .put(3, 14, &self.object_type.to_be_bytes())
            .put(3, 18, &self.object_index.to_be_bytes())
            .put(2, 1, self.id.as_bytes())
            .put(1, 0, &self.object_hash)
            .put(0, 0, &self.aux_data)
            .build()
    }

    fn version(&self) -> u32 {
        self.version
    }
}
