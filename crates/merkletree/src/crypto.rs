//! Domain-separated Poseidon hashing

use ark_bn254::Fr;
use light_poseidon::{Poseidon, PoseidonHasher};

use crate::{FieldElement, Hash32, Result, EMPTY_HASH};

/// Trailing input that separates leaf keys from internal node keys
const DOMAIN_LEAF: u64 = 1;

/// Poseidon (circom parameters) over 1..=12 field elements
pub fn poseidon(inputs: &[FieldElement]) -> Result<FieldElement> {
    let mut hasher = Poseidon::<Fr>::new_circom(inputs.len())?;
    let frs: Vec<Fr> = inputs.iter().map(|e| e.into_inner()).collect();
    Ok(hasher.hash(&frs)?.into())
}

/// Hash two field elements (entry `hi` / `hv`)
pub fn hash_elems(a: &FieldElement, b: &FieldElement) -> Result<Hash32> {
    Ok(poseidon(&[*a, *b])?.to_bytes())
}

/// Internal node key
/// node = H(child0, child1)
pub fn hash_internal(child0: &Hash32, child1: &Hash32) -> Result<Hash32> {
    let left = FieldElement::from_bytes(child0)?;
    let right = FieldElement::from_bytes(child1)?;
    hash_elems(&left, &right)
}

/// Leaf key
/// leaf = H(hi, hv, 1)
pub fn hash_leaf(hi: &Hash32, hv: &Hash32) -> Result<Hash32> {
    let hi = FieldElement::from_bytes(hi)?;
    let hv = FieldElement::from_bytes(hv)?;
    Ok(poseidon(&[hi, hv, FieldElement::from(DOMAIN_LEAF)])?.to_bytes())
}

/// Internal node key as seen by the verifier: two empty children stay empty
pub fn hash_internal_or_empty(child0: &Hash32, child1: &Hash32) -> Result<Hash32> {
    if *child0 == EMPTY_HASH && *child1 == EMPTY_HASH {
        return Ok(EMPTY_HASH);
    }
    hash_internal(child0, child1)
}
