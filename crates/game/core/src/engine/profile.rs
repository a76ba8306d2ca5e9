//! Character build: specialization, passives, set bonuses and poisons.
//!
//! Every passive is optional. An absent passive is untalented: its trigger
//! rule is not registered and the buffs it would drive are made inert.

use crate::state::{ActorId, Tick};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Specialization {
    #[default]
    Assassination,
    Combat,
    Subtlety,
}

impl Specialization {
    /// Chance per qualifying auto attack to advance the legendary dagger buffs.
    pub const fn legendary_chance(self) -> f64 {
        match self {
            Self::Assassination => 0.235,
            Self::Combat => 0.095,
            Self::Subtlety => 0.275,
        }
    }
}

/// Poison applied by weapon strikes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LethalPoison {
    #[default]
    Deadly,
    Wound,
    None,
}

/// Legendary dagger questline stage; each stage unlocks one more buff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LegendaryStage {
    #[default]
    None,
    Suffering,
    Nightmare,
    Destroyer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MasteryKind {
    /// Poison and Envenom damage.
    PotentPoisons,
    /// Chance of an extra main-hand strike.
    MainGauche,
    /// Finisher damage and Slice and Dice strength.
    Executioner,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mastery {
    pub kind: MasteryKind,
    /// Effect per mastery point, as a fraction.
    pub per_point: f64,
}

/// A chance-gated energy gain.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyProc {
    pub chance: f64,
    pub energy: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssassinsResolve {
    /// Damage bonus while wielding two daggers.
    pub damage: f64,
    pub max_energy: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vitality {
    pub regen_multiplier: f64,
    pub attack_power_multiplier: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelentlessStrikes {
    /// Chance per combo point spent.
    pub chance_per_point: f64,
    pub energy: f64,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Passives {
    // ===== assassination =====
    pub assassins_resolve: Option<AssassinsResolve>,
    /// Additive bonus to lethal poison proc chance.
    pub improved_poisons: Option<f64>,
    pub seal_fate: bool,
    pub venomous_wounds: Option<EnergyProc>,
    pub cut_to_the_chase: bool,
    /// Chance for Mutilate to grant Blindside.
    pub blindside: Option<f64>,
    /// Deadly Poison proc chance added while Envenom is up.
    pub envenom_poison_bonus: Option<f64>,

    // ===== combat =====
    /// Off-hand damage bonus.
    pub ambidexterity: Option<f64>,
    pub vitality: Option<Vitality>,
    pub combat_potency: Option<EnergyProc>,
    /// Cooldown reduction per combo point spent.
    pub restless_blades: Option<Tick>,
    pub bandits_guile: bool,

    // ===== subtlety =====
    pub master_of_subtlety: bool,
    pub find_weakness: bool,
    /// Chance per party crit to grant a combo point.
    pub honor_among_thieves: Option<f64>,
    /// Damage bonus against bleeding targets.
    pub sanguinary_vein: Option<f64>,
    /// Energy per second while Slice and Dice is up.
    pub energetic_recovery: Option<f64>,

    // ===== shared =====
    pub relentless_strikes: Option<RelentlessStrikes>,
    pub mastery: Option<Mastery>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RogueProfile {
    pub specialization: Specialization,
    pub passives: Passives,
    pub lethal_poison: LethalPoison,
    pub deadly_poison_chance: f64,
    /// Wound Poison procs per minute.
    pub wound_poison_ppm: f64,
    /// Chance for Sinister Strike to add a bonus point under Revealing Strike.
    pub revealing_strike_bonus_chance: f64,
    /// Energy delta applied to Ambush during Shadow Dance.
    pub shadow_dance_cost_delta: f64,
    /// Cost multiplier applied while the Tier 13 two-piece buff is up.
    pub tier13_2pc_cost_multiplier: f64,
    pub tier13_2pc: bool,
    pub tier13_4pc: bool,
    /// Shadow Dance extension granted by the Tier 13 four-piece.
    pub tier13_4pc_extension: Tick,
    pub legendary: LegendaryStage,
    /// Sinister Strike and Revealing Strike bonus at any legendary stage.
    pub legendary_strike_bonus: f64,
    /// Ally receiving Tricks of the Trade.
    pub tricks_target: Option<ActorId>,
}

impl RogueProfile {
    pub const DEFAULT_DEADLY_POISON_CHANCE: f64 = 0.30;
    pub const DEFAULT_WOUND_POISON_PPM: f64 = 21.43;
    pub const DEFAULT_REVEALING_STRIKE_BONUS_CHANCE: f64 = 0.20;
    pub const DEFAULT_SHADOW_DANCE_COST_DELTA: f64 = -20.0;
    pub const DEFAULT_TIER13_2PC_COST_MULTIPLIER: f64 = 0.80;
    pub const DEFAULT_TIER13_4PC_EXTENSION: Tick = Tick::from_secs(2);
    pub const DEFAULT_LEGENDARY_STRIKE_BONUS: f64 = 0.45;

    pub fn new(specialization: Specialization) -> Self {
        Self {
            specialization,
            passives: Passives::default(),
            lethal_poison: LethalPoison::Deadly,
            deadly_poison_chance: Self::DEFAULT_DEADLY_POISON_CHANCE,
            wound_poison_ppm: Self::DEFAULT_WOUND_POISON_PPM,
            revealing_strike_bonus_chance: Self::DEFAULT_REVEALING_STRIKE_BONUS_CHANCE,
            shadow_dance_cost_delta: Self::DEFAULT_SHADOW_DANCE_COST_DELTA,
            tier13_2pc_cost_multiplier: Self::DEFAULT_TIER13_2PC_COST_MULTIPLIER,
            tier13_2pc: false,
            tier13_4pc: false,
            tier13_4pc_extension: Self::DEFAULT_TIER13_4PC_EXTENSION,
            legendary: LegendaryStage::None,
            legendary_strike_bonus: Self::DEFAULT_LEGENDARY_STRIKE_BONUS,
            tricks_target: None,
        }
    }

    /// Passive set of a fully talented specialization.
    pub fn talented(specialization: Specialization) -> Self {
        let mut profile = Self::new(specialization);
        let passives = &mut profile.passives;
        passives.relentless_strikes = Some(RelentlessStrikes {
            chance_per_point: 0.20,
            energy: 25.0,
        });
        match specialization {
            Specialization::Assassination => {
                passives.assassins_resolve = Some(AssassinsResolve {
                    damage: 0.20,
                    max_energy: 20.0,
                });
                passives.improved_poisons = Some(0.10);
                passives.seal_fate = true;
                passives.venomous_wounds = Some(EnergyProc {
                    chance: 0.75,
                    energy: 10.0,
                });
                passives.cut_to_the_chase = true;
                passives.blindside = Some(0.30);
                passives.envenom_poison_bonus = Some(0.15);
                passives.mastery = Some(Mastery {
                    kind: MasteryKind::PotentPoisons,
                    per_point: 0.035,
                });
            }
            Specialization::Combat => {
                passives.ambidexterity = Some(0.75);
                passives.vitality = Some(Vitality {
                    regen_multiplier: 0.20,
                    attack_power_multiplier: 0.30,
                });
                passives.combat_potency = Some(EnergyProc {
                    chance: 0.20,
                    energy: 15.0,
                });
                passives.restless_blades = Some(Tick::from_secs(2));
                passives.bandits_guile = true;
                passives.mastery = Some(Mastery {
                    kind: MasteryKind::MainGauche,
                    per_point: 0.02,
                });
            }
            Specialization::Subtlety => {
                passives.master_of_subtlety = true;
                passives.find_weakness = true;
                passives.honor_among_thieves = Some(1.0);
                passives.sanguinary_vein = Some(0.25);
                passives.energetic_recovery = Some(4.0);
                passives.mastery = Some(Mastery {
                    kind: MasteryKind::Executioner,
                    per_point: 0.03,
                });
            }
        }
        profile
    }

    /// Fractional bonus granted by the mastery `kind`, or zero when the
    /// actor has a different mastery.
    pub fn mastery_bonus(&self, kind: MasteryKind, mastery_points: f64) -> f64 {
        match self.passives.mastery {
            Some(mastery) if mastery.kind == kind => mastery.per_point * mastery_points,
            _ => 0.0,
        }
    }
}

impl Default for RogueProfile {
    fn default() -> Self {
        Self::new(Specialization::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mastery_bonus_only_for_matching_kind() {
        let profile = RogueProfile::talented(Specialization::Combat);
        assert!((profile.mastery_bonus(MasteryKind::MainGauche, 10.0) - 0.2).abs() < 1e-12);
        assert_eq!(profile.mastery_bonus(MasteryKind::Executioner, 10.0), 0.0);
    }

    #[test]
    fn bare_profile_has_no_passives() {
        let profile = RogueProfile::new(Specialization::Subtlety);
        assert_eq!(profile.passives, Passives::default());
    }
}
