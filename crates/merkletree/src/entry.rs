//! Generic 4x32-byte claim record stored at tree leaves

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto;
use crate::types::decode_hex;
use crate::{FieldElement, Hash32, MerkletreeError, Result};

/// Size of one serialized element
pub const ELEMENT_BYTES: usize = 32;
/// Size of the canonical entry wire form
pub const ENTRY_BYTES: usize = 4 * ELEMENT_BYTES;

/// Four field elements; `e2, e3` form the index, `e0, e1` the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Entry {
    elements: [FieldElement; 4],
}

impl Entry {
    /// Build from four big-endian 32-byte elements
    pub fn new(e0: [u8; 32], e1: [u8; 32], e2: [u8; 32], e3: [u8; 32]) -> Result<Self> {
        Ok(Self {
            elements: [
                FieldElement::from_bytes(&e0)?,
                FieldElement::from_bytes(&e1)?,
                FieldElement::from_bytes(&e2)?,
                FieldElement::from_bytes(&e3)?,
            ],
        })
    }

    pub fn from_elements(elements: [FieldElement; 4]) -> Self {
        Self { elements }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ENTRY_BYTES {
            return Err(MerkletreeError::BadLength { expected: ENTRY_BYTES, actual: bytes.len() });
        }
        let mut elements = [FieldElement::zero(); 4];
        for (element, chunk) in elements.iter_mut().zip(bytes.chunks_exact(ELEMENT_BYTES)) {
            let mut buf = [0u8; ELEMENT_BYTES];
            buf.copy_from_slice(chunk);
            *element = FieldElement::from_bytes(&buf)?;
        }
        Ok(Self { elements })
    }

    pub fn to_bytes(&self) -> [u8; ENTRY_BYTES] {
        let mut out = [0u8; ENTRY_BYTES];
        for (chunk, element) in out.chunks_exact_mut(ELEMENT_BYTES).zip(self.elements.iter()) {
            chunk.copy_from_slice(&element.to_bytes());
        }
        out
    }

    /// Accepts hex with or without `0x`
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(&decode_hex(s)?)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    pub fn elements(&self) -> &[FieldElement; 4] {
        &self.elements
    }

    pub fn element_bytes(&self, index: usize) -> [u8; 32] {
        self.elements[index].to_bytes()
    }

    /// Hash-index: the tree key
    pub fn hi(&self) -> Result<Hash32> {
        crypto::hash_elems(&self.elements[2], &self.elements[3])
    }

    /// Hash-value: digest of the payload half
    pub fn hv(&self) -> Result<Hash32> {
        crypto::hash_elems(&self.elements[0], &self.elements[1])
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Entry::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::modulus_bytes;

    fn entry(a: u64, b: u64, c: u64, d: u64) -> Entry {
        Entry::from_elements([a.into(), b.into(), c.into(), d.into()])
    }

    #[test]
    fn test_hex_roundtrip() {
        let e = entry(12, 45, 78, 41);
        let s = e.to_hex();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 2 + 256);
        assert_eq!(Entry::from_hex(&s).unwrap(), e);
    }

    #[test]
    fn test_bytes_layout() {
        let e = entry(1, 2, 3, 4);
        let b = e.to_bytes();
        assert_eq!(b[31], 1);
        assert_eq!(b[63], 2);
        assert_eq!(b[95], 3);
        assert_eq!(b[127], 4);
        assert_eq!(Entry::from_bytes(&b).unwrap(), e);
    }

    #[test]
    fn test_bad_length() {
        assert!(matches!(
            Entry::from_hex("0x0011"),
            Err(MerkletreeError::BadLength { expected: 128, actual: 2 })
        ));
        assert!(matches!(
            Entry::from_bytes(&[0u8; 129]),
            Err(MerkletreeError::BadLength { expected: 128, actual: 129 })
        ));
    }

    #[test]
    fn test_new_out_of_field() {
        let zero = [0u8; 32];
        assert!(matches!(
            Entry::new(zero, zero, zero, modulus_bytes()),
            Err(MerkletreeError::OutOfField)
        ));

        let mut bytes = [0u8; 128];
        bytes[32..64].copy_from_slice(&[0xff; 32]);
        assert!(matches!(Entry::from_bytes(&bytes), Err(MerkletreeError::OutOfField)));
    }

    #[test]
    fn test_hi_hv_split() {
        // same index half, different value half
        let a = entry(1, 2, 3, 4);
        let b = entry(5, 6, 3, 4);
        assert_eq!(a.hi().unwrap(), b.hi().unwrap());
        assert_ne!(a.hv().unwrap(), b.hv().unwrap());
    }

    #[test]
    fn test_serde_as_hex() {
        let e = entry(9, 8, 7, 6);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, format!("\"{}\"", e.to_hex()));
        let back: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
