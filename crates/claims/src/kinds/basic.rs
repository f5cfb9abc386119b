use merkletree::Entry;

use super::ClaimEntry;
use crate::schema::{claim_version, read, ClaimType, EntryBuilder};

pub const BASIC_INDEX_BYTES: usize = 50;
pub const BASIC_DATA_BYTES: usize = 62;

/// Free-form claim: 50 bytes in the index half, 62 in the value half
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Basic {
    version: u32,
    index: [u8; BASIC_INDEX_BYTES],
    data: [u8; BASIC_DATA_BYTES],
}

impl Basic {
    pub fn new(index: [u8; BASIC_INDEX_BYTES], data: [u8; BASIC_DATA_BYTES]) -> Self {
        Self { version: 0, index, data }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn index(&self) -> &[u8; BASIC_INDEX_BYTES] {
        &self.index
    }

    pub fn data(&self) -> &[u8; BASIC_DATA_BYTES] {
        &self.data
    }
}

impl ClaimEntry for Basic {
    const TYPE: ClaimType = ClaimType::Basic;

    fn from_entry(entry: &Entry) -> Self {
        let mut index = [0u8; BASIC_INDEX_BYTES];
        index[..19].copy_from_slice(&read::<19>(entry, 3, 1));
        index[19..].copy_from_slice(&read::<31>(entry, 2, 1));
        let mut data = [0u8; BASIC_DATA_BYTES];
        data[..31].copy_from_slice(&read::<31>(entry, 1, 1));
        data[31..].copy_from_slice(&read::<31>(entry, 0, 1));
        Self { version: claim_version(entry), index, data }
    }

    fn to_entry(&self) -> Entry {
        EntryBuilder::new(Self::TYPE, self.version)
            .put(3, 1, &self.index[..19])
            .put(2, 1, &self.index[19..])
            .put(1, 1, &self.data[..31])
            .put(0, 1, &self.data[31..])
            .build()
    }

    fn version(&self) -> u32 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::claim_type_tag;

    #[test]
    fn test_basic_roundtrip() {
        let mut index = [0u8; BASIC_INDEX_BYTES];
        let mut data = [0u8; BASIC_DATA_BYTES];
        for (i, b) in index.iter_mut().enumerate() {
            *b = i as u8 + 1;
        }
        for (i, b) in data.iter_mut().enumerate() {
            *b = 0xff - i as u8;
        }
        let claim = Basic::new(index, data).with_version(3);
        let entry = claim.to_entry();

        assert_eq!(claim_type_tag(&entry), ClaimType::Basic.tag());
        assert_eq!(entry.element_bytes(3)[1], 1);
        assert_eq!(entry.element_bytes(2)[1], 20);
        assert_eq!(Basic::from_entry(&entry), claim);
    }

    #[test]
    fn test_index_and_data_halves() {
        let a = Basic::new([1u8; BASIC_INDEX_BYTES], [2u8; BASIC_DATA_BYTES]);
        let b = Basic::new([1u8; BASIC_INDEX_BYTES], [3u8; BASIC_DATA_BYTES]);
        // same index: same tree position
        assert_eq!(a.to_entry().hi().unwrap(), b.to_entry().hi().unwrap());
        assert_ne!(a.to_entry().hv().unwrap(), b.to_entry().hv().unwrap());
    }
}
