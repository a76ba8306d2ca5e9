//! Character build loader: a profile plus the stat snapshot it fights with.

use std::path::Path;

use anyhow::Context;
use rogue_core::{ActorStats, RogueProfile, Specialization, Tick, Weapon, WeaponKind};

use crate::loaders::{LoadResult, read_file};

/// One rogue as described by a character file.
///
/// ```toml
/// name = "mutilate"
///
/// [profile]
/// specialization = "assassination"
/// lethal_poison = "deadly"
///
/// [profile.passives]
/// seal_fate = true
///
/// [stats]
/// agility = 9000.0
/// main_hand = { kind = "dagger", min_damage = 1000.0, max_damage = 1500.0, swing_time = 1800 }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CharacterSpec {
    pub name: String,
    pub profile: RogueProfile,
    pub stats: ActorStats,
}

impl Default for CharacterSpec {
    fn default() -> Self {
        Self::preset(Specialization::default())
    }
}

impl CharacterSpec {
    /// Fully talented build of `specialization` with matching weapons.
    pub fn preset(specialization: Specialization) -> Self {
        let stats = match specialization {
            Specialization::Combat => {
                let sword = Weapon::new(WeaponKind::Sword, 1500.0, 2300.0, Tick::from_millis(2600));
                let dagger = Weapon::new(WeaponKind::Dagger, 1000.0, 1500.0, Tick::from_millis(1800));
                ActorStats::default().with_weapons(Some(sword), Some(dagger))
            }
            Specialization::Assassination | Specialization::Subtlety => ActorStats::default(),
        };
        Self {
            name: specialization.to_string(),
            profile: RogueProfile::talented(specialization),
            stats,
        }
    }
}

/// Loader for [`CharacterSpec`] from TOML files.
pub struct CharacterLoader;

impl CharacterLoader {
    pub fn load(path: &Path) -> LoadResult<CharacterSpec> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("invalid character in {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<CharacterSpec> {
        let spec: CharacterSpec =
            toml::from_str(content).context("failed to parse character TOML")?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use rogue_core::{LethalPoison, Position};

    use super::*;

    #[test]
    fn combat_preset_wields_a_sword() {
        let spec = CharacterSpec::preset(Specialization::Combat);
        assert_eq!(spec.name, "combat");
        assert_eq!(spec.stats.main_hand.map(|w| w.kind), Some(WeaponKind::Sword));
        assert!(spec.profile.passives.combat_potency.is_some());
    }

    #[test]
    fn character_file_overrides_only_what_it_names() {
        let spec = CharacterLoader::parse(
            r#"
            name = "front"

            [profile]
            specialization = "subtlety"
            lethal_poison = "wound"

            [stats]
            position = "front"
            crit_chance = 0.3
            "#,
        )
        .unwrap();

        assert_eq!(spec.name, "front");
        assert_eq!(spec.profile.specialization, Specialization::Subtlety);
        assert_eq!(spec.profile.lethal_poison, LethalPoison::Wound);
        assert_eq!(spec.stats.position, Position::Front);
        assert!((spec.stats.crit_chance - 0.3).abs() < 1e-12);
        assert_eq!(spec.stats.main_hand, ActorStats::default().main_hand);
        // no passives section: untalented
        assert!(!spec.profile.passives.seal_fate);
    }
}
