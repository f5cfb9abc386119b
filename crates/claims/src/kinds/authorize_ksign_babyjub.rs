use merkletree::{Entry, Hash32};

use super::{check_element, ClaimEntry};
use crate::schema::{claim_version, read, ClaimType, EntryBuilder};
use crate::{ClaimsError, Result};

/// Authorizes a BabyJubjub signing key.
///
/// Layout: `e3[19]` sign of x, `e2` the y coordinate (big-endian).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizeKSignBabyJub {
    version: u32,
    sign: bool,
    ay: Hash32,
}

impl AuthorizeKSignBabyJub {
    pub fn new(sign: bool, ay: Hash32) -> Result<Self> {
        check_element(&ay, "babyjub y")?;
        Ok(Self { version: 0, sign, ay })
    }

    /// From a compressed point: little-endian y, top bit holds the sign of x
    pub fn from_compressed(public_key: &[u8]) -> Result<Self> {
        let mut le: [u8; 32] = public_key.try_into().map_err(|_| {
            ClaimsError::InvalidField(format!(
                "compressed babyjub key must be 32 bytes, got {}",
                public_key.len()
            ))
        })?;
        let sign = le[31] & 0x80 != 0;
        le[31] &= 0x7f;
        le.reverse();
        Self::new(sign, le)
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn sign(&self) -> bool {
        self.sign
    }

    pub fn ay(&self) -> &Hash32 {
        &self.ay
    }

    pub fn compressed(&self) -> [u8; 32] {
        let mut out = self.ay;
        out.reverse();
        if self.sign {
            out[31] |= 0x80;
        }
        out
    }
}

impl ClaimEntry for AuthorizeKSignBabyJub {
    const TYPE: ClaimType = ClaimType::AuthorizeKSignBabyJub;

    fn from_entry(entry: &Entry) -> Self {
        Self {
            version: claim_version(entry),
            sign: read::<1>(entry, 3, 19)[0] != 0,
            ay: entry.element_bytes(2),
        }
    }

    fn to_entry(&self) -> Entry {
        EntryBuilder::new(Self::TYPE, self.version)
            .put(3, 19, &[self.sign as u8])
            .put(2, 0, &self.ay)
            .build()
    }

    fn version(&self) -> u32 {
        self.version
    }
}
