//! Mechanics configuration loader.

use std::path::Path;

use anyhow::Context;
use rogue_core::RogueConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`RogueConfig`] from TOML files.
///
/// Every field is optional; missing ones keep their defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<RogueConfig> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("invalid config in {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<RogueConfig> {
        let config: RogueConfig = toml::from_str(content).context("failed to parse config TOML")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use rogue_core::Tick;

    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config =
            ConfigLoader::parse("virtual_hat_interval = 0\noverflow_regrant = 3\n").unwrap();
        assert_eq!(config.virtual_hat_interval, Tick::ZERO);
        assert_eq!(config.overflow_regrant, 3);
        assert_eq!(config.seal_fate_icd, RogueConfig::DEFAULT_SEAL_FATE_ICD);
    }

    #[test]
    fn mistyped_fields_are_rejected() {
        assert!(ConfigLoader::parse("energy_refund_fraction = \"most\"").is_err());
    }
}
