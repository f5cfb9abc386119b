//! Elements of the BN254 scalar field (the base field of BabyJubjub).

use std::fmt;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};

use crate::{Hash32, MerkletreeError, Result};

/// Integer strictly below the field prime `p`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldElement(Fr);

impl FieldElement {
    pub fn zero() -> Self {
        Self(Fr::from(0u64))
    }

    /// Parse a 32-byte big-endian value. Values `>= p` are rejected, never reduced.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        if bytes.as_slice() >= modulus_bytes().as_slice() {
            return Err(MerkletreeError::OutOfField);
        }
        Ok(Self(Fr::from_be_bytes_mod_order(bytes)))
    }

    /// Big-endian bytes reduced modulo `p`. Identity for inputs already below `p`,
    /// e.g. anything of 31 bytes or fewer.
    pub fn from_be_bytes_mod_order(bytes: &[u8]) -> Self {
        Self(Fr::from_be_bytes_mod_order(bytes))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        let be = self.0.into_bigint().to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - be.len()..].copy_from_slice(&be);
        out
    }

    pub(crate) fn into_inner(self) -> Fr {
        self.0
    }
}

impl From<u64> for FieldElement {
    fn from(v: u64) -> Self {
        Self(Fr::from(v))
    }
}

impl From<Fr> for FieldElement {
    fn from(v: Fr) -> Self {
        Self(v)
    }
}

impl TryFrom<&Hash32> for FieldElement {
    type Error = MerkletreeError;

    fn try_from(hash: &Hash32) -> Result<Self> {
        Self::from_bytes(hash)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

/// Big-endian bytes of the field prime
pub fn modulus_bytes() -> [u8; 32] {
    let be = Fr::MODULUS.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - be.len()..].copy_from_slice(&be);
    out
}
