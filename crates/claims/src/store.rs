use merkletree::{
    hash_to_hex, Entry, Hash32, MerkletreeError, Proof, SparseMerkleTree, Storage, TreeConfig,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::claim::{parse_claim, Claim};
use crate::{ClaimsError, Result};

/// A claim entry, its proof and the root the proof was generated against
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimProof {
    pub entry: Entry,
    pub proof: Proof,
    #[serde(with = "merkletree::hash_serde")]
    pub root: Hash32,
}

impl ClaimProof {
    pub fn claim(&self) -> Result<Claim> {
        parse_claim(&self.entry)
    }
}

/// Claims of a single identity, held in its own tree.
pub struct ClaimStore<S: Storage> {
    tree: SparseMerkleTree<S>,
}

impl<S: Storage> ClaimStore<S> {
    pub fn new(storage: S, config: &TreeConfig) -> Result<Self> {
        Ok(Self { tree: SparseMerkleTree::new(storage, config)? })
    }

    /// Reopen an identity at a previously published root
    pub fn open(storage: S, config: &TreeConfig, root: Hash32) -> Result<Self> {
        Ok(Self { tree: SparseMerkleTree::with_root(storage, config, root)? })
    }

    pub fn tree(&self) -> &SparseMerkleTree<S> {
        &self.tree
    }

    pub fn root(&self) -> Hash32 {
        self.tree.root()
    }

    /// Add a claim, returning its `hi`
    pub fn add_claim(&mut self, claim: &Claim) -> Result<Hash32> {
        let entry = claim.to_entry();
        let hi = entry.hi()?;
        self.tree.insert(&entry)?;
        debug!(
            claim_type = ?claim.claim_type(),
            version = claim.version(),
            hi = %hash_to_hex(&hi),
            "claims: claim added"
        );
        Ok(hi)
    }

    /// Add claims in order and return the resulting root.
    ///
    /// Stops at the first failing claim; claims before it stay in the tree.
    pub fn add_claims_batch(&mut self, claims: &[Claim]) -> Result<Hash32> {
        for (index, claim) in claims.iter().enumerate() {
            if let Err(e) = self.tree.insert(&claim.to_entry()) {
                warn!(index, error = %e, "claims: batch insert stopped");
                return Err(ClaimsError::Batch { index, source: e });
            }
        }
        let root = self.tree.root();
        debug!(count = claims.len(), root = %hash_to_hex(&root), "claims: batch added");
        Ok(root)
    }

    /// Claim stored under `hi`
    pub fn get_claim(&self, hi: &Hash32) -> Result<Claim> {
        parse_claim(&self.tree.get_entry(hi)?)
    }

    /// Whether exactly this claim (index and value) is in the tree
    pub fn claim_exists(&self, claim: &Claim) -> Result<bool> {
        let entry = claim.to_entry();
        match self.tree.get_entry(&entry.hi()?) {
            Ok(stored) => Ok(stored == entry),
            Err(MerkletreeError::EntryNotFound) | Err(MerkletreeError::HiMismatch) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Proof for the position of `claim` against the current root.
    /// Absent claims yield a non-existence proof.
    pub fn claim_proof(&self, claim: &Claim) -> Result<ClaimProof> {
        let entry = claim.to_entry();
        let proof = self.tree.generate_proof(&entry.hi()?)?;
        Ok(ClaimProof { entry, proof, root: self.tree.root() })
    }

    /// Check that `proof.entry` is in the tree with root `proof.root`
    pub fn verify_claim_proof(proof: &ClaimProof) -> bool {
        if !proof.proof.is_existence() {
            return false;
        }
        match (proof.entry.hi(), proof.entry.hv()) {
            (Ok(hi), Ok(hv)) => proof.proof.verify(&proof.root, &hi, &hv),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{AssignName, AuthorizeEthKey};
    use crate::Id;
    use merkletree::{InMemoryStorage, EMPTY_HASH};

    fn store() -> ClaimStore<InMemoryStorage> {
        ClaimStore::new(InMemoryStorage::new(), &TreeConfig::new(140, "id1:")).unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let mut s = store();
        let claim: Claim = AssignName::new("erin", Id::from([5u8; 31])).unwrap().into();
        let hi = s.add_claim(&claim).unwrap();

        assert_ne!(s.root(), EMPTY_HASH);
        assert_eq!(s.get_claim(&hi).unwrap(), claim);
        assert!(s.claim_exists(&claim).unwrap());
    }

    #[test]
    fn test_same_index_other_value() {
        let mut s = store();
        let a: Claim = AssignName::new("frank", Id::from([1u8; 31])).unwrap().into();
        let b: Claim = AssignName::new("frank", Id::from([2u8; 31])).unwrap().into();
        s.add_claim(&a).unwrap();

        assert!(!s.claim_exists(&b).unwrap());
        assert!(matches!(
            s.add_claim(&b),
            Err(ClaimsError::Tree(MerkletreeError::MaxLevelsReached))
        ));
    }

    #[test]
    fn test_claim_proof() {
        let mut s = store();
        let claim: Claim = AuthorizeEthKey::new(&[0x11; 20], 0).unwrap().into();
        s.add_claim(&claim).unwrap();

        let proof = s.claim_proof(&claim).unwrap();
        assert!(ClaimStore::<InMemoryStorage>::verify_claim_proof(&proof));
        assert_eq!(proof.claim().unwrap(), claim);

        let absent: Claim = AuthorizeEthKey::new(&[0x22; 20], 0).unwrap().into();
        let proof = s.claim_proof(&absent).unwrap();
        assert!(!proof.proof.is_existence());
        assert!(!ClaimStore::<InMemoryStorage>::verify_claim_proof(&proof));
    }

    #[test]
    fn test_batch_stops_at_failure() {
        let mut s = store();
        let id = Id::from([3u8; 31]);
        let claims: Vec<Claim> = vec![
            AssignName::new("a", id).unwrap().into(),
            AssignName::new("b", id).unwrap().into(),
            AssignName::new("a", id).unwrap().into(),
            AssignName::new("c", id).unwrap().into(),
        ];
        let err = s.add_claims_batch(&claims).unwrap_err();
        assert!(matches!(err, ClaimsError::Batch { index: 2, .. }));
        assert!(s.claim_exists(&claims[1]).unwrap());
        assert!(!s.claim_exists(&claims[3]).unwrap());
    }
}
