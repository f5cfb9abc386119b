use serde::{Deserialize, Serialize};

use crate::proof::MAX_PROOF_LEVELS;
use crate::{MerkletreeError, Result};

pub const DEFAULT_MAX_LEVELS: u32 = 140;

/// Per-identity tree settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Depth budget; a proof bitmap holds at most 240 levels
    pub max_levels: u32,
    /// Namespace prepended to every node key in the store
    pub key_prefix: String,
}

impl TreeConfig {
    pub fn new(max_levels: u32, key_prefix: impl Into<String>) -> Self {
        Self {
            max_levels,
            key_prefix: key_prefix.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_levels == 0 || self.max_levels as usize > MAX_PROOF_LEVELS {
            return Err(MerkletreeError::InvalidMaxLevels {
                got: self.max_levels,
                max: MAX_PROOF_LEVELS,
            });
        }
        Ok(())
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEVELS, "")
    }
}
