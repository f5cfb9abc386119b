use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ClaimsError, Result};

pub const ID_BYTES: usize = 31;

/// Identity identifier (31 bytes, fits in one field element)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Id([u8; ID_BYTES]);

impl Id {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let id: [u8; ID_BYTES] = bytes.try_into().map_err(|_| {
            ClaimsError::InvalidField(format!("id must be {ID_BYTES} bytes, got {}", bytes.len()))
        })?;
        Ok(Self(id))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| ClaimsError::InvalidField(format!("id: {e}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ID_BYTES] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl From<[u8; ID_BYTES]> for Id {
    fn from(bytes: [u8; ID_BYTES]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Id::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_length() {
        assert!(Id::from_bytes(&[1u8; 31]).is_ok());
        assert!(matches!(Id::from_bytes(&[1u8; 32]), Err(ClaimsError::InvalidField(_))));
        assert!(matches!(Id::from_bytes(&[]), Err(ClaimsError::InvalidField(_))));
    }

    #[test]
    fn test_id_hex() {
        let id = Id::from([0xab; 31]);
        let s = id.to_hex();
        assert_eq!(Id::from_hex(&s).unwrap(), id);
        assert!(Id::from_hex("0xnothex").is_err());
        assert!(Id::from_hex("0xabcd").is_err());
    }
}
