use merkletree::Entry;

use super::ClaimEntry;
use crate::schema::{claim_version, read, ClaimType, EntryBuilder};
use crate::{ClaimsError, Result};

pub const SECP256K1_COMPRESSED_BYTES: usize = 33;

/// Authorizes a secp256k1 signing key (compressed SEC1).
///
/// Layout: `e3[17..20)` first 3 key bytes, `e2[2..32)` the remaining 30.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizeKSignSecp256k1 {
    version: u32,
    public_key: [u8; SECP256K1_COMPRESSED_BYTES],
}

impl AuthorizeKSignSecp256k1 {
    pub fn new(public_key: &[u8]) -> Result<Self> {
        let public_key: [u8; SECP256K1_COMPRESSED_BYTES] = public_key.try_into().map_err(|_| {
            ClaimsError::InvalidField(format!(
                "compressed secp256k1 key must be {SECP256K1_COMPRESSED_BYTES} bytes, got {}",
                public_key.len()
            ))
        })?;
        if public_key[0] != 0x02 && public_key[0] != 0x03 {
            return Err(ClaimsError::InvalidField(format!(
                "bad compressed key prefix {:#04x}",
                public_key[0]
            )));
        }
        Ok(Self { version: 0, public_key })
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn public_key(&self) -> &[u8; SECP256K1_COMPRESSED_BYTES] {
        &self.public_key
    }
}

impl ClaimEntry for AuthorizeKSignSecp256k1 {
    const TYPE: ClaimType = ClaimType::AuthorizeKSignSecp256k1;

    fn from_entry(entry: &Entry) -> Self {
        let mut public_key = [0u8; SECP256K1_COMPRESSED_BYTES];
        public_key[..3].copy_from_slice(&read::<3>(entry, 3, 17));
        public_key[3..].copy_from_slice(&read::<30>(entry, 2, 2));
        Self { version: claim_version(entry), public_key }
    }

    fn to_entry(&self) -> Entry {
        EntryBuilder::new(Self::TYPE, self.version)
            .put(3, 17, &self.public_key[..3])
            .put(2, 2, &self.public_key[3..])
            .build()
    }

    fn version(&self) -> u32 {
        self.version
    }
}
