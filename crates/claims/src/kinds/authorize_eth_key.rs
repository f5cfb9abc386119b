use merkletree::Entry;

use super::ClaimEntry;
use crate::schema::{claim_version, read, ClaimType, EntryBuilder};
use crate::{ClaimsError, Result};

pub const ETH_ADDR_BYTES: usize = 20;

/// Authorizes an Ethereum address with a caller-defined key type
///
/// Layout: `e3[16..20)` key type, `e2[12..32)` address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizeEthKey {
    version: u32,
    eth_addr: [u8; ETH_ADDR_BYTES],
    eth_key_type: u32,
}

impl AuthorizeEthKey {
    pub fn new(eth_addr: &[u8], eth_key_type: u32) -> Result<Self> {
        let eth_addr: [u8; ETH_ADDR_BYTES] = eth_addr.try_into().map_err(|_| {
            ClaimsError::InvalidField(format!(
                "eth address must be {ETH_ADDR_BYTES} bytes, got {}",
                eth_addr.len()
            ))
        })?;
        Ok(Self { version: 0, eth_addr, eth_key_type })
    }

    /// Address as `0x`-prefixed hex
    pub fn from_hex_addr(addr: &str, eth_key_type: u32) -> Result<Self> {
        let addr = addr.strip_prefix("0x").unwrap_or(addr);
        let bytes = hex::decode(addr).map_err(|e| ClaimsError::InvalidField(format!("eth address: {e}")))?;
        Self::new(&bytes, eth_key_type)
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn eth_addr(&self) -> &[u8; ETH_ADDR_BYTES] {
        &self.eth_addr
    }

    pub fn eth_key_type(&self) -> u32 {
        self.eth_key_type
    }
}

impl ClaimEntry for AuthorizeEthKey {
    const TYPE: ClaimType = ClaimType::AuthorizeEthKey;

    fn from_entry(entry: &Entry) -> Self {
        Self {
            version: claim_version(entry),
            eth_addr: read(entry, 2, 12),
            eth_key_type: u32::from_be_bytes(read(entry, 3, 16)),
        }
    }

    fn to_entry(&self) -> Entry {
        EntryBuilder::new(Self::TYPE, self.version)
            .put(3, 16, &self.eth_key_type.to_be_bytes())
            .put(2, 12, &self.eth_addr)
            .build()
    }

    fn version(&self) -> u32 {
        self.version
    }
}
