//! Actor statistics consumed by damage computation and regeneration.
//!
//! Stats are an input snapshot supplied by the driver (gear and talent
//! loading are out of scope). Buff-driven modifiers are layered on top at
//! query time by the owning actor.
mod energy;

pub use energy::EnergyPool;

use crate::state::{Position, Tick};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum WeaponKind {
    #[default]
    Dagger,
    Sword,
    Mace,
    Axe,
    Fist,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum WeaponSlot {
    MainHand,
    OffHand,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weapon {
    pub kind: WeaponKind,
    pub min_damage: f64,
    pub max_damage: f64,
    pub swing_time: Tick,
}

impl Weapon {
    pub const fn new(kind: WeaponKind, min_damage: f64, max_damage: f64, swing_time: Tick) -> Self {
        Self {
            kind,
            min_damage,
            max_damage,
            swing_time,
        }
    }

    /// Speed used by special attacks in place of the real swing time.
    pub fn normalized_speed(&self) -> f64 {
        match self.kind {
            WeaponKind::Dagger => 1.7,
            _ => 2.4,
        }
    }

    pub fn is_dagger(&self) -> bool {
        self.kind == WeaponKind::Dagger
    }
}

/// Static combat statistics of one actor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActorStats {
    pub agility: f64,
    /// Attack power from sources other than agility.
    pub attack_power: f64,
    pub crit_chance: f64,
    /// Melee haste as a fraction (0.1 = 10% faster).
    pub haste: f64,
    /// Mastery in points; the specialization decides what a point is worth.
    pub mastery: f64,
    pub hit: f64,
    pub expertise: f64,
    pub main_hand: Option<Weapon>,
    pub off_hand: Option<Weapon>,
    pub position: Position,
}

impl ActorStats {
    pub const ATTACK_POWER_PER_AGILITY: f64 = 2.0;

    pub fn weapon(&self, slot: WeaponSlot) -> Option<&Weapon> {
        match slot {
            WeaponSlot::MainHand => self.main_hand.as_ref(),
            WeaponSlot::OffHand => self.off_hand.as_ref(),
        }
    }

    pub fn has_dual_daggers(&self) -> bool {
        self.main_hand.is_some_and(|w| w.is_dagger()) && self.off_hand.is_some_and(|w| w.is_dagger())
    }

    /// Haste multiplier applied to swing and regeneration timings.
    pub fn haste_factor(&self) -> f64 {
        1.0 + self.haste.max(0.0)
    }

    #[must_use]
    pub fn with_weapons(mut self, main_hand: Option<Weapon>, off_hand: Option<Weapon>) -> Self {
        self.main_hand = main_hand;
        self.off_hand = off_hand;
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

impl Default for ActorStats {
    fn default() -> Self {
        let dagger = Weapon::new(WeaponKind::Dagger, 1000.0, 1500.0, Tick::from_millis(1800));
        Self {
            agility: 10_000.0,
            attack_power: 0.0,
            crit_chance: 0.15,
            haste: 0.0,
            mastery: 8.0,
            hit: 0.075,
            expertise: 0.075,
            main_hand: Some(dagger),
            off_hand: Some(dagger),
            position: Position::Back,
        }
    }
}
