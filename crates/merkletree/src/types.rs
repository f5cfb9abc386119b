//! Core types for the claims tree

use crate::{MerkletreeError, Result};

/// 32-byte hash, big-endian encoding of a field element
pub type Hash32 = [u8; 32];

/// Key of the empty subtree. Never persisted.
pub const EMPTY_HASH: Hash32 = [0u8; 32];

/// Render a hash as `0x`-prefixed lowercase hex
pub fn hash_to_hex(hash: &Hash32) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse a hash from hex, with or without the `0x` prefix
pub fn hash_from_hex(s: &str) -> Result<Hash32> {
    let bytes = decode_hex(s)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| MerkletreeError::BadLength { expected: 32, actual: bytes.len() })
}

pub(crate) fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(s)?)
}

/// Serde adapter storing a [`Hash32`] as a `0x` hex string.
///
/// Use with `#[serde(with = "merkletree::hash_serde")]`.
pub mod hash_serde {
    use super::{hash_from_hex, hash_to_hex, Hash32};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &Hash32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hash_to_hex(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash32, D::Error> {
        let s = String::deserialize(deserializer)?;
        hash_from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_hex_roundtrip() {
        let mut h = [0u8; 32];
        h[0] = 0x12;
        h[31] = 0xab;
        let s = hash_to_hex(&h);
        assert!(s.starts_with("0x12"));
        assert_eq!(hash_from_hex(&s).unwrap(), h);
        assert_eq!(hash_from_hex(&s[2..]).unwrap(), h);
    }

    #[test]
    fn test_hash_from_hex_wrong_length() {
        assert!(matches!(
            hash_from_hex("0xabcd"),
            Err(MerkletreeError::BadLength { expected: 32, actual: 2 })
        ));
        assert!(matches!(hash_from_hex("0xzz"), Err(MerkletreeError::InvalidHex(_))));
    }
}
