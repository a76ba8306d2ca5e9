//! Data-driven rogue content and loaders.
//!
//! This crate houses the static spell data and provides loaders for RON/TOML data files:
//! - Ability catalogue (embedded RON)
//! - Aura catalogue (embedded RON)
//! - Character builds: profile plus stats (TOML)
//! - Mechanics configuration (TOML)
//!
//! Content is consumed through [`rogue_core::SpellOracle`] and never appears in combat state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{CharacterLoader, CharacterSpec, ConfigLoader, LoadResult, SpellLoader};
