use merkletree::Entry;

use crate::kinds::{
    AssignName, AuthorizeEthKey, AuthorizeKSignBabyJub, AuthorizeKSignSecp256k1, Basic,
    ClaimEntry, LinkObjectIdentity, SetRootKey,
};
use crate::schema::{claim_type_tag, ClaimType};
use crate::{ClaimsError, Result};

/// Any known claim kind
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Claim {
    Basic(Basic),
    AuthorizeKSignBabyJub(AuthorizeKSignBabyJub),
    SetRootKey(SetRootKey),
    AssignName(AssignName),
    AuthorizeKSignSecp256k1(AuthorizeKSignSecp256k1),
    LinkObjectIdentity(LinkObjectIdentity),
    AuthorizeEthKey(AuthorizeEthKey),
}

impl Claim {
    pub fn claim_type(&self) -> ClaimType {
        match self {
            Claim::Basic(_) => ClaimType::Basic,
            Claim::AuthorizeKSignBabyJub(_) => ClaimType::AuthorizeKSignBabyJub,
            Claim::SetRootKey(_) => ClaimType::SetRootKey,
            Claim::AssignName(_) => ClaimType::AssignName,
            Claim::AuthorizeKSignSecp256k1(_) => ClaimType::AuthorizeKSignSecp256k1,
            Claim::LinkObjectIdentity(_) => ClaimType::LinkObjectIdentity,
            Claim::AuthorizeEthKey(_) => ClaimType::AuthorizeEthKey,
        }
    }

    pub fn version(&self) -> u32 {
        match self {
            Claim::Basic(c) => c.version(),
            Claim::AuthorizeKSignBabyJub(c) => c.version(),
            Claim::SetRootKey(c) => c.version(),
            Claim::AssignName(c) => c.version(),
            Claim::AuthorizeKSignSecp256k1(c) => c.version(),
            Claim::LinkObjectIdentity(c) => c.version(),
            Claim::AuthorizeEthKey(c) => c.version(),
        }
    }

    pub fn to_entry(&self) -> Entry {
        match self {
            Claim::Basic(c) => c.to_entry(),
            Claim::AuthorizeKSignBabyJub(c) => c.to_entry(),
            Claim::SetRootKey(c) => c.to_entry(),
            Claim::AssignName(c) => c.to_entry(),
            Claim::AuthorizeKSignSecp256k1(c) => c.to_entry(),
            Claim::LinkObjectIdentity(c) => c.to_entry(),
            Claim::AuthorizeEthKey(c) => c.to_entry(),
        }
    }
}

/// Decode an entry by its type tag
pub fn parse_claim(entry: &Entry) -> Result<Claim> {
    let tag = claim_type_tag(entry);
    let claim_type = ClaimType::from_tag(tag).ok_or(ClaimsError::UnknownClaimType(tag))?;
    Ok(match claim_type {
        ClaimType::Basic => Basic::from_entry(entry).into(),
        ClaimType::AuthorizeKSignBabyJub => AuthorizeKSignBabyJub::from_entry(entry).into(),
        ClaimType::SetRootKey => SetRootKey::from_entry(entry).into(),
        ClaimType::AssignName => AssignName::from_entry(entry).into(),
        ClaimType::AuthorizeKSignSecp256k1 => AuthorizeKSignSecp256k1::from_entry(entry).into(),
        ClaimType::LinkObjectIdentity => LinkObjectIdentity::from_entry(entry).into(),
        ClaimType::AuthorizeEthKey => AuthorizeEthKey::from_entry(entry).into(),
    })
}

macro_rules! impl_from_kind {
    ($($kind:ident),*) => {
        $(
            impl From<$kind> for Claim {
                fn from(c: $kind) -> Self {
                    Claim::$kind(c)
                }
            }
        )*
    };
}

impl_from_kind!(
    Basic,
    AuthorizeKSignBabyJub,
    SetRootKey,
    AssignName,
    AuthorizeKSignSecp256k1,
    LinkObjectIdentity,
    AuthorizeEthKey
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EntryBuilder;
    use crate::Id;

    #[test]
    fn test_parse_dispatches_on_tag() {
        let id = Id::from([9u8; 31]);
        let mut pk = [0x21u8; 33];
        pk[0] = 0x02;
        let claims: Vec<Claim> = vec![
            Basic::new([1u8; 50], [2u8; 62]).into(),
            AuthorizeKSignBabyJub::new(true, [0u8; 32]).unwrap().into(),
            SetRootKey::new(id, [0u8; 32]).unwrap().with_era(1).into(),
            AssignName::new("dave", id).unwrap().with_version(2).into(),
            AuthorizeKSignSecp256k1::new(&pk).unwrap().into(),
            LinkObjectIdentity::new(1, 2, id, [0u8; 32], [0u8; 32]).unwrap().into(),
            AuthorizeEthKey::new(&[0xee; 20], 1).unwrap().into(),
        ];

        for claim in claims {
            let entry = claim.to_entry();
            assert_eq!(claim_type_tag(&entry), claim.claim_type().tag());
            assert_eq!(parse_claim(&entry).unwrap(), claim);
        }
    }

    #[test]
    fn test_unknown_tag() {
        let mut entry = EntryBuilder::new(ClaimType::Basic, 0).build().to_bytes();
        entry[127] = 6; // e3 low byte
        let entry = Entry::from_bytes(&entry).unwrap();
        assert!(matches!(parse_claim(&entry), Err(ClaimsError::UnknownClaimType(6))));
    }

    #[test]
    fn test_version_carried() {
        let claim: Claim = AuthorizeEthKey::new(&[1u8; 20], 0).unwrap().with_version(7).into();
        assert_eq!(claim.version(), 7);
        assert_eq!(parse_claim(&claim.to_entry()).unwrap().version(), 7);
    }
}
