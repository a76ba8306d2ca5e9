//! Simulation settings read from a TOML file.
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Durations are written in milliseconds.

use std::path::{Path, PathBuf};

use anyhow::Context;
use rogue_core::{RogueConfig, Specialization, Tick, TargetProfile};

use crate::error::{Result, RuntimeError};
use crate::oracle::AttackTable;
use crate::rotation::Rotation;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub seed: u64,
    pub iterations: u64,
    pub fight_length: Tick,
    /// Spacing of the shared energy regeneration event.
    pub regen_interval: Tick,
    pub target: TargetProfile,
    pub attack_table: AttackTable,
    pub rogue: RogueConfig,
    pub rotation: RotationOverrides,
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    pub const DEFAULT_SEED: u64 = 0x5eed;
    pub const DEFAULT_ITERATIONS: u64 = 100;
    pub const DEFAULT_FIGHT_LENGTH: Tick = Tick::from_secs(300);
    pub const DEFAULT_REGEN_INTERVAL: Tick = Tick::from_millis(100);

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid simulation config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("failed to parse simulation config")
    }

    /// Rejects settings the driver cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(RuntimeError::NoIterations);
        }
        if self.fight_length.is_zero() || self.regen_interval.is_zero() {
            return Err(RuntimeError::EmptyFight);
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: Self::DEFAULT_SEED,
            iterations: Self::DEFAULT_ITERATIONS,
            fight_length: Self::DEFAULT_FIGHT_LENGTH,
            regen_interval: Self::DEFAULT_REGEN_INTERVAL,
            target: TargetProfile::default(),
            attack_table: AttackTable::default(),
            rogue: RogueConfig::default(),
            rotation: RotationOverrides::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Priority lists replacing the built-in preset of a specialization.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RotationOverrides {
    pub assassination: Option<Rotation>,
    pub combat: Option<Rotation>,
    pub subtlety: Option<Rotation>,
}

impl RotationOverrides {
    pub fn for_specialization(&self, specialization: Specialization) -> Rotation {
        let custom = match specialization {
            Specialization::Assassination => &self.assassination,
            Specialization::Combat => &self.combat,
            Specialization::Subtlety => &self.subtlety,
        };
        custom
            .clone()
            .unwrap_or_else(|| Rotation::preset(specialization))
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Also write the log to this file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rogue_core::AbilityKind;

    use super::*;

    #[test]
    fn empty_file_is_the_default() {
        assert_eq!(SimulationConfig::parse("").unwrap(), SimulationConfig::default());
    }

    #[test]
    fn sections_override_their_fields() {
        let config = SimulationConfig::parse(
            r#"
            seed = 7
            iterations = 3
            fight_length = 60000

            [target]
            health_fraction = 0.3

            [attack_table]
            parry = 0.0

            [rogue]
            energy_refund_fraction = 0.5

            [[rotation.combat]]
            ability = "sinister_strike"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.fight_length, Tick::from_secs(60));
        assert_eq!(config.target.health_fraction, 0.3);
        assert_eq!(config.attack_table.parry, 0.0);
        assert_eq!(config.attack_table.miss, AttackTable::DEFAULT_MISS);
        assert_eq!(config.rogue.energy_refund_fraction, 0.5);
        assert_eq!(config.logging.level, "debug");

        let combat = config.rotation.for_specialization(Specialization::Combat);
        assert_eq!(combat.entries().len(), 1);
        assert_eq!(combat.entries()[0].ability, AbilityKind::SinisterStrike);
        assert_eq!(
            config.rotation.for_specialization(Specialization::Subtlety),
            Rotation::preset(Specialization::Subtlety)
        );
    }

    #[test]
    fn bundled_sample_parses() {
        let config = SimulationConfig::parse(include_str!("../data/simulation.toml")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.iterations, 250);
        let combat = config.rotation.for_specialization(Specialization::Combat);
        assert_eq!(combat.entries().len(), 5);
        assert_eq!(
            combat.entries()[2].when,
            vec![
                crate::rotation::Condition::DebuffDown(rogue_core::BuffKind::RevealingStrike),
                crate::rotation::Condition::ComboPointsBelow(5),
            ]
        );
    }

    #[test]
    fn zero_iterations_are_rejected() {
        let config = SimulationConfig {
            iterations: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(RuntimeError::NoIterations)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(SimulationConfig::parse("seeds = 3").is_err());
    }
}
