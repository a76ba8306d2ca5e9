//! Static per-ability parameters.
//!
//! An [`AbilitySpec`] is loaded once per actor and shared by every cast of
//! that ability. It carries everything the pipeline needs that does not
//! depend on live state: cost, combo point generation, capability flags,
//! requirements, and the damage formulas. Per-kind behavior that cannot be
//! expressed as data lives in the hook table.

use bitflags::bitflags;

use crate::action::AbilityKind;
use crate::state::{BuffKind, CooldownKind, Position, RANKS, Tick};
use crate::stats::{WeaponKind, WeaponSlot};

bitflags! {
    /// Capability and classification flags of an ability.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
    pub struct AbilityFlags: u32 {
        const MAY_MISS                  = 1 << 0;
        const MAY_DODGE                 = 1 << 1;
        const MAY_PARRY                 = 1 << 2;
        const MAY_BLOCK                 = 1 << 3;
        const MAY_CRIT                  = 1 << 4;
        const TICK_MAY_CRIT             = 1 << 5;
        const HARMFUL                   = 1 << 6;
        /// Never chosen by the driver; only runs inside another pipeline.
        const BACKGROUND                = 1 << 7;
        /// Secondary cast; excluded from re-triggering proc rules.
        const PROC                      = 1 << 8;
        /// Yellow special attack (as opposed to white auto attacks).
        const SPECIAL                   = 1 << 9;
        const REPEATING                 = 1 << 10;
        const REQUIRES_COMBO_POINTS     = 1 << 11;
        const REQUIRES_STEALTH          = 1 << 12;
        const TRIGGERS_GCD              = 1 << 13;
        const CHANNELED                 = 1 << 14;
        const AOE                       = 1 << 15;
        const POISON                    = 1 << 16;
        const AFFECTED_BY_KILLING_SPREE = 1 << 17;
        /// Ticks of this effect can proc Venomous Wounds.
        const VENOMOUS_WOUNDS           = 1 << 18;

        /// Full attack table for a yellow melee special.
        const MELEE_SPECIAL = Self::MAY_MISS.bits()
            | Self::MAY_DODGE.bits()
            | Self::MAY_PARRY.bits()
            | Self::MAY_BLOCK.bits()
            | Self::MAY_CRIT.bits()
            | Self::HARMFUL.bits()
            | Self::SPECIAL.bits()
            | Self::TRIGGERS_GCD.bits()
            | Self::AFFECTED_BY_KILLING_SPREE.bits();

        const FINISHER = Self::MELEE_SPECIAL.bits() | Self::REQUIRES_COMBO_POINTS.bits();
    }
}

/// Gear an ability needs to be usable at all.
///
/// Checked once at actor construction; an unmet requirement disables the
/// ability for the rest of the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EquipmentRequirement {
    #[strum(serialize = "a main-hand weapon")]
    MainHandWeapon,
    #[strum(serialize = "a main-hand dagger")]
    MainHandDagger,
    #[strum(serialize = "dual daggers")]
    DualDaggers,
    #[strum(serialize = "an off-hand weapon")]
    OffHandWeapon,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum School {
    #[default]
    Physical,
    Nature,
}

/// Direct damage formula, evaluated once per cast.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DirectDamage {
    #[default]
    None,
    /// `weapon_damage * multiplier + bonus`.
    Weapon { multiplier: f64, bonus: f64 },
    /// `base + ap * ap_coefficient`.
    Flat { base: f64, ap_coefficient: f64 },
    /// `ranks[cp - 1] + ap * ap_per_point * cp`.
    ComboRanks { ranks: [f64; RANKS], ap_per_point: f64 },
    /// `cp * (base_per_point + ap * ap_per_point)`.
    PerComboPoint { base_per_point: f64, ap_per_point: f64 },
}

/// Number of ticks a periodic effect runs for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TickCount {
    Fixed(u32),
    /// `base + per_point * cp`.
    PerComboPoint { base: u32, per_point: u32 },
}

impl TickCount {
    pub fn resolve(self, combo_points: u8) -> u32 {
        match self {
            Self::Fixed(ticks) => ticks,
            Self::PerComboPoint { base, per_point } => base + per_point * u32::from(combo_points),
        }
    }
}

/// Per-tick damage formula, evaluated once per application.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TickDamage {
    #[default]
    None,
    Flat { base: f64, ap_coefficient: f64 },
    /// `base + per_point * cp + ap * ap_ranks[cp - 1]`.
    ComboRanks {
        base: f64,
        per_point: f64,
        ap_ranks: [f64; RANKS],
    },
    /// Spreads a fraction of the landed direct damage over the ticks.
    FractionOfDirect { fraction: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeriodicSpec {
    pub tick_time: Tick,
    pub ticks: TickCount,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: TickDamage,
    /// Self buff held while the effect runs and expired on its last tick.
    #[cfg_attr(feature = "serde", serde(default))]
    pub dependent_buff: Option<BuffKind>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooldownSpec {
    pub kind: CooldownKind,
    pub duration: Tick,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySpec {
    pub kind: AbilityKind,

    /// Energy cost before cost modifiers.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: f64,

    /// Combo points added on impact when the cast connects.
    #[cfg_attr(feature = "serde", serde(default))]
    pub adds_combo_points: u8,

    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: AbilityFlags,

    /// Position the actor must hold relative to the target.
    #[cfg_attr(feature = "serde", serde(default))]
    pub position: Option<Position>,

    /// Weapon swung by this ability, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub weapon: Option<WeaponSlot>,

    /// Weapon kind the swung weapon must be, checked on every `ready()`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub requires_weapon: Option<WeaponKind>,

    /// Gear checked once at construction.
    #[cfg_attr(feature = "serde", serde(default))]
    pub equipment: Option<EquipmentRequirement>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub school: School,

    #[cfg_attr(feature = "serde", serde(default))]
    pub direct: DirectDamage,

    #[cfg_attr(feature = "serde", serde(default))]
    pub periodic: Option<PeriodicSpec>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: Option<CooldownSpec>,

    /// Delay between execute and impact.
    #[cfg_attr(feature = "serde", serde(default))]
    pub travel_time: Tick,

    /// Ability this one is a sub-strike of.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent: Option<AbilityKind>,
}

impl AbilitySpec {
    pub fn new(kind: AbilityKind) -> Self {
        Self {
            kind,
            cost: 0.0,
            adds_combo_points: 0,
            flags: AbilityFlags::empty(),
            position: None,
            weapon: None,
            requires_weapon: None,
            equipment: None,
            school: School::Physical,
            direct: DirectDamage::None,
            periodic: None,
            cooldown: None,
            travel_time: Tick::ZERO,
            parent: None,
        }
    }

    #[must_use]
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn with_combo_points(mut self, points: u8) -> Self {
        self.adds_combo_points = points;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: AbilityFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn with_weapon(mut self, slot: WeaponSlot) -> Self {
        self.weapon = Some(slot);
        self
    }

    #[must_use]
    pub fn with_required_weapon(mut self, kind: WeaponKind) -> Self {
        self.requires_weapon = Some(kind);
        self
    }

    #[must_use]
    pub fn with_equipment(mut self, requirement: EquipmentRequirement) -> Self {
        self.equipment = Some(requirement);
        self
    }

    #[must_use]
    pub fn with_school(mut self, school: School) -> Self {
        self.school = school;
        self
    }

    #[must_use]
    pub fn with_direct(mut self, direct: DirectDamage) -> Self {
        self.direct = direct;
        self
    }

    #[must_use]
    pub fn with_periodic(mut self, periodic: PeriodicSpec) -> Self {
        self.periodic = Some(periodic);
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, kind: CooldownKind, duration: Tick) -> Self {
        self.cooldown = Some(CooldownSpec { kind, duration });
        self
    }

    #[must_use]
    pub fn with_travel_time(mut self, travel_time: Tick) -> Self {
        self.travel_time = travel_time;
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: AbilityKind) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn has(&self, flags: AbilityFlags) -> bool {
        self.flags.contains(flags)
    }

    pub fn is_finisher(&self) -> bool {
        self.has(AbilityFlags::REQUIRES_COMBO_POINTS)
    }

    /// Special attacks that do not come from a proc.
    pub fn is_player_special(&self) -> bool {
        self.has(AbilityFlags::SPECIAL) && !self.has(AbilityFlags::PROC)
    }

    /// Equipment the ability needs, including the implicit requirement of
    /// the weapon slot it swings.
    pub fn requirement(&self) -> Option<EquipmentRequirement> {
        self.equipment.or(match self.weapon {
            Some(WeaponSlot::MainHand) => Some(EquipmentRequirement::MainHandWeapon),
            Some(WeaponSlot::OffHand) => Some(EquipmentRequirement::OffHandWeapon),
            None => None,
        })
    }
}
