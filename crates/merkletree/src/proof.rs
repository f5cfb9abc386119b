//! Compact existence / non-existence proofs.
//!
//! Wire format:
//! `flags(1) ‖ levels(1) ‖ bitmap(30) ‖ siblings(32·k) ‖ [aux_hi(32) ‖ aux_hv(32)]`
//!
//! - flags bit0: non-existence, bit1: aux leaf attached (only with bit0)
//! - bitmap bit for level `i` is bit `i % 8` of byte `29 - i / 8`, set when the
//!   sibling at that level is not empty
//! - siblings: the non-empty ones, deepest level first. The deepest traversed
//!   level always has one, so its bitmap bit must be set

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto;
use crate::smt::path_bit;
use crate::types::decode_hex;
use crate::{Hash32, MerkletreeError, Result, EMPTY_HASH};

pub const BITMAP_BYTES: usize = 30;
pub const MAX_PROOF_LEVELS: usize = BITMAP_BYTES * 8;

const FLAG_NON_EXISTENCE: u8 = 0x01;
const FLAG_AUX_LEAF: u8 = 0x02;
const HEADER_BYTES: usize = 2 + BITMAP_BYTES;

/// Leaf found where the queried key would have been
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuxLeaf {
    pub hi: Hash32,
    pub hv: Hash32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    existence: bool,
    levels: u8,
    bitmap: [u8; BITMAP_BYTES],
    /// deepest level first
    siblings: Vec<Hash32>,
    aux: Option<AuxLeaf>,
}

impl Proof {
    /// `not_empty[i]` flags level `i`; `siblings` are in walk order (root first)
    pub(crate) fn existence(not_empty: &[bool], siblings: Vec<Hash32>) -> Self {
        Self::build(true, not_empty, siblings, None)
    }

    pub(crate) fn non_existence(
        not_empty: &[bool],
        siblings: Vec<Hash32>,
        aux: Option<(Hash32, Hash32)>,
    ) -> Self {
        Self::build(false, not_empty, siblings, aux.map(|(hi, hv)| AuxLeaf { hi, hv }))
    }

    fn build(
        existence: bool,
        not_empty: &[bool],
        mut siblings: Vec<Hash32>,
        aux: Option<AuxLeaf>,
    ) -> Self {
        let mut bitmap = [0u8; BITMAP_BYTES];
        for (lvl, _) in not_empty.iter().enumerate().filter(|(_, set)| **set) {
            set_bitmap_bit(&mut bitmap, lvl);
        }
        siblings.reverse();
        Self {
            existence,
            levels: not_empty.len() as u8,
            bitmap,
            siblings,
            aux,
        }
    }

    pub fn is_existence(&self) -> bool {
        self.existence
    }

    /// Number of levels walked before the terminal node
    pub fn levels(&self) -> u8 {
        self.levels
    }

    /// Non-empty siblings, deepest level first
    pub fn siblings(&self) -> &[Hash32] {
        &self.siblings
    }

    pub fn aux(&self) -> Option<&AuxLeaf> {
        self.aux.as_ref()
    }

    pub fn flags(&self) -> u8 {
        match (self.existence, self.aux.is_some()) {
            (true, _) => 0,
            (false, false) => FLAG_NON_EXISTENCE,
            (false, true) => FLAG_NON_EXISTENCE | FLAG_AUX_LEAF,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            HEADER_BYTES + 32 * self.siblings.len() + if self.aux.is_some() { 64 } else { 0 },
        );
        out.push(self.flags());
        out.push(self.levels);
        out.extend_from_slice(&self.bitmap);
        for sibling in &self.siblings {
            out.extend_from_slice(sibling);
        }
        if let Some(aux) = &self.aux {
            out.extend_from_slice(&aux.hi);
            out.extend_from_slice(&aux.hv);
        }
        out
    }

    /// Strict decode: every byte must be meaningful
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_BYTES {
            return Err(MerkletreeError::InvalidProof);
        }
        let flags = bytes[0];
        if flags & !(FLAG_NON_EXISTENCE | FLAG_AUX_LEAF) != 0 || flags == FLAG_AUX_LEAF {
            return Err(MerkletreeError::InvalidProof);
        }
        let levels = bytes[1];
        if levels as usize > MAX_PROOF_LEVELS {
            return Err(MerkletreeError::InvalidProof);
        }

        let mut bitmap = [0u8; BITMAP_BYTES];
        bitmap.copy_from_slice(&bytes[2..HEADER_BYTES]);
        let mut count = 0;
        for lvl in 0..MAX_PROOF_LEVELS {
            if bitmap_bit(&bitmap, lvl) {
                if lvl >= levels as usize {
                    return Err(MerkletreeError::InvalidProof);
                }
                count += 1;
            }
        }
        // a walk never ends below an empty sibling
        if levels > 0 && !bitmap_bit(&bitmap, levels as usize - 1) {
            return Err(MerkletreeError::InvalidProof);
        }

        let has_aux = flags & FLAG_AUX_LEAF != 0;
        let expected = HEADER_BYTES + 32 * count + if has_aux { 64 } else { 0 };
        if bytes.len() != expected {
            return Err(MerkletreeError::InvalidProof);
        }

        let body = &bytes[HEADER_BYTES..];
        let siblings: Vec<Hash32> = body
            .chunks_exact(32)
            .take(count)
            .map(|c| {
                let mut h = [0u8; 32];
                h.copy_from_slice(c);
                h
            })
            .collect();
        let aux = has_aux.then(|| {
            let tail = &body[32 * count..];
            let mut hi = [0u8; 32];
            let mut hv = [0u8; 32];
            hi.copy_from_slice(&tail[..32]);
            hv.copy_from_slice(&tail[32..]);
            AuxLeaf { hi, hv }
        });

        Ok(Self {
            existence: flags & FLAG_NON_EXISTENCE == 0,
            levels,
            bitmap,
            siblings,
            aux,
        })
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(&decode_hex(s)?)
    }

    /// Recompute the root this proof commits to for `(hi, hv)`.
    /// `hv` is ignored for non-existence proofs.
    pub fn root_from_proof(&self, hi: &Hash32, hv: &Hash32) -> Result<Hash32> {
        let levels = self.levels as usize;
        let mut current = match (&self.aux, self.existence) {
            (_, true) => crypto::hash_leaf(hi, hv)?,
            (Some(aux), false) => {
                let shares_path = (0..levels).all(|lvl| path_bit(&aux.hi, lvl) == path_bit(hi, lvl));
                if aux.hi == *hi || !shares_path {
                    return Err(MerkletreeError::InvalidProof);
                }
                crypto::hash_leaf(&aux.hi, &aux.hv)?
            }
            (None, false) => EMPTY_HASH,
        };

        let mut siblings = self.siblings.iter();
        for lvl in (0..levels).rev() {
            let sibling = if bitmap_bit(&self.bitmap, lvl) {
                *siblings.next().ok_or(MerkletreeError::InvalidProof)?
            } else {
                EMPTY_HASH
            };
            current = if path_bit(hi, lvl) {
                crypto::hash_internal_or_empty(&sibling, &current)?
            } else {
                crypto::hash_internal_or_empty(&current, &sibling)?
            };
        }
        if siblings.next().is_some() {
            return Err(MerkletreeError::InvalidProof);
        }
        Ok(current)
    }

    pub fn verify(&self, root: &Hash32, hi: &Hash32, hv: &Hash32) -> bool {
        matches!(self.root_from_proof(hi, hv), Ok(computed) if computed == *root)
    }
}

/// Check a wire-format proof. Malformed input is simply `false`.
pub fn check_proof(root: &Hash32, proof: &[u8], hi: &Hash32, hv: &Hash32) -> bool {
    match Proof::from_bytes(proof) {
        Ok(p) => p.verify(root, hi, hv),
        Err(_) => false,
    }
}

fn bitmap_bit(bitmap: &[u8; BITMAP_BYTES], lvl: usize) -> bool {
    (bitmap[BITMAP_BYTES - 1 - lvl / 8] >> (lvl % 8)) & 1 == 1
}

fn set_bitmap_bit(bitmap: &mut [u8; BITMAP_BYTES], lvl: usize) {
    bitmap[BITMAP_BYTES - 1 - lvl / 8] |= 1 << (lvl % 8);
}

impl fmt::Display for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Proof {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Proof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Proof::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
