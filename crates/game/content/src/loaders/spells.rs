//! Ability and aura catalogue loader.
//!
//! The catalogue ships embedded in the crate. A data directory can overlay
//! it: each row found in `abilities.ron` or `buffs.ron` there replaces the
//! embedded row of the same kind.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, bail};
use rogue_core::{AbilityKind, AbilitySpec, BuffDef, BuffKind, SpellBook};
use tracing::debug;

use crate::loaders::{LoadResult, read_file};

const ABILITIES_RON: &str = include_str!("../../data/abilities.ron");
const BUFFS_RON: &str = include_str!("../../data/buffs.ron");

/// Builds [`SpellBook`]s from RON data.
pub struct SpellLoader;

impl SpellLoader {
    /// The embedded catalogue.
    pub fn embedded() -> LoadResult<SpellBook> {
        let abilities = Self::parse_abilities(ABILITIES_RON).context("embedded abilities.ron")?;
        let buffs = Self::parse_buffs(BUFFS_RON).context("embedded buffs.ron")?;
        Ok(SpellBook::new(abilities, buffs))
    }

    /// The embedded catalogue overlaid with the files found in `dir`.
    ///
    /// Missing files are skipped; a file that exists but fails to parse is an
    /// error.
    pub fn with_overrides(dir: &Path) -> LoadResult<SpellBook> {
        let mut book = Self::embedded()?;

        let abilities_path = dir.join("abilities.ron");
        if abilities_path.is_file() {
            let content = read_file(&abilities_path)?;
            let specs = Self::parse_abilities(&content)
                .with_context(|| format!("invalid abilities in {}", abilities_path.display()))?;
            debug!(path = %abilities_path.display(), count = specs.len(), "ability overrides");
            for spec in specs {
                book.insert_ability(spec);
            }
        }

        let buffs_path = dir.join("buffs.ron");
        if buffs_path.is_file() {
            let content = read_file(&buffs_path)?;
            let defs = Self::parse_buffs(&content)
                .with_context(|| format!("invalid buffs in {}", buffs_path.display()))?;
            debug!(path = %buffs_path.display(), count = defs.len(), "aura overrides");
            for def in defs {
                book.insert_buff(def);
            }
        }

        Ok(book)
    }

    /// Parses a list of ability rows, rejecting duplicate kinds.
    pub fn parse_abilities(content: &str) -> LoadResult<Vec<AbilitySpec>> {
        let specs: Vec<AbilitySpec> =
            ron::from_str(content).context("failed to parse ability RON")?;
        let mut seen = BTreeSet::<AbilityKind>::new();
        for spec in &specs {
            if !seen.insert(spec.kind) {
                bail!("ability {} is defined twice", spec.kind);
            }
        }
        Ok(specs)
    }

    /// Parses a list of aura rows, rejecting duplicate kinds.
    pub fn parse_buffs(content: &str) -> LoadResult<Vec<BuffDef>> {
        let defs: Vec<BuffDef> = ron::from_str(content).context("failed to parse aura RON")?;
        let mut seen = BTreeSet::<BuffKind>::new();
        for def in &defs {
            if !seen.insert(def.kind) {
                bail!("aura {} is defined twice", def.kind);
            }
        }
        Ok(defs)
    }
}
