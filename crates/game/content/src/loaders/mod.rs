//! Content loaders for reading rogue data from files.

pub mod character;
pub mod config;
pub mod spells;

pub use character::{CharacterLoader, CharacterSpec};
pub use config::ConfigLoader;
pub use spells::SpellLoader;

use std::path::Path;

use anyhow::Context;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
