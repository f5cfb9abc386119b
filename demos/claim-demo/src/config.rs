use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use merkletree::{TreeConfig, DEFAULT_MAX_LEVELS};

#[derive(Clone, Debug)]
pub struct DemoConfig {
    pub tree: TreeConfig,
    pub store_path: Option<PathBuf>,
}

impl DemoConfig {
    pub fn from_env() -> Result<Self> {
        let max_levels = match std::env::var("SMT_MAX_LEVELS") {
            Ok(v) => v
                .parse::<u32>()
                .with_context(|| format!("SMT_MAX_LEVELS must be an integer, got {v:?}"))?,
            Err(_) => DEFAULT_MAX_LEVELS,
        };
        let key_prefix = std::env::var("SMT_KEY_PREFIX").unwrap_or_else(|_| "demo:".to_string());
        let store_path = std::env::var("SMT_STORE_PATH").ok().map(PathBuf::from);

        if key_prefix.contains(char::is_whitespace) {
            bail!("SMT_KEY_PREFIX must not contain whitespace");
        }

        let tree = TreeConfig::new(max_levels, key_prefix);
        tree.validate().context("Invalid SMT_MAX_LEVELS")?;

        Ok(Self { tree, store_path })
    }
}
