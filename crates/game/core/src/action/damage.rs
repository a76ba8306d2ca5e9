//! Damage composition for direct hits and periodic ticks.
//!
//! Formulas read the cast's combo point snapshot, never the live counter.
//! Multipliers are grouped the same way for direct and periodic damage:
//! weapon-style bonuses, ability-specific bonuses, target debuffs, and
//! actor-wide buffs, multiplied together.

use crate::action::{AbilityFlags, AbilityKind, AbilitySpec, CastState, DirectDamage, School, TickDamage};
use crate::combat::{apply_result, armor_reduction, weapon_damage};
use crate::engine::{LegendaryStage, MasteryKind, RogueActor};
use crate::env::SimEnv;
use crate::state::{ActorId, BuffKind, Tick, rank_of};
use crate::stats::{ActorStats, WeaponSlot};

/// Ambush bonus while a dagger is wielded in the main hand.
const AMBUSH_DAGGER_MULTIPLIER: f64 = 1.447;

/// Hemorrhage weapon damage while a dagger is wielded in the main hand.
const HEMORRHAGE_DAGGER_MULTIPLIER: f64 = 1.45;

impl RogueActor {
    /// Attack power including buffed agility and Vitality.
    pub fn attack_power(&self, now: Tick) -> f64 {
        let agility = self.stats.agility + self.buffs.agility_bonus(now);
        let base = agility * ActorStats::ATTACK_POWER_PER_AGILITY + self.stats.attack_power;
        let vitality = self
            .profile
            .passives
            .vitality
            .map_or(0.0, |vitality| vitality.attack_power_multiplier);
        base * (1.0 + vitality)
    }

    /// Final direct damage of a resolved cast: formula, multipliers, outcome
    /// scaling, then armor for physical attacks.
    pub(crate) fn direct_damage(
        &self,
        spec: &AbilitySpec,
        cast: &CastState,
        env: &mut SimEnv<'_>,
    ) -> f64 {
        if !cast.landed() {
            return 0.0;
        }
        let now = env.now();
        let combo_points = cast.combo_points;
        let attack_power = self.attack_power(now);

        let base = match spec.direct {
            DirectDamage::None => return 0.0,
            DirectDamage::Weapon { multiplier, bonus } => {
                let Some(slot) = spec.weapon else {
                    return 0.0;
                };
                let Some(weapon) = self.stats.weapon(slot) else {
                    return 0.0;
                };
                let normalized = !spec.has(AbilityFlags::REPEATING);
                let mut swing = weapon_damage(weapon, slot, attack_power, normalized, &mut *env.rng);
                if slot == WeaponSlot::OffHand {
                    swing *= 1.0 + self.profile.passives.ambidexterity.unwrap_or(0.0);
                }
                swing * multiplier + bonus
            }
            DirectDamage::Flat {
                base,
                ap_coefficient,
            } => base + attack_power * ap_coefficient,
            DirectDamage::ComboRanks {
                ranks,
                ap_per_point,
            } => match rank_of(combo_points, &ranks) {
                Some(rank) => rank + attack_power * ap_per_point * f64::from(combo_points),
                None => 0.0,
            },
            DirectDamage::PerComboPoint {
                base_per_point,
                ap_per_point,
            } => f64::from(combo_points) * (base_per_point + attack_power * ap_per_point),
        };

        let amount = apply_result(base * self.damage_multiplier(spec, cast.target, now), cast.result);
        match spec.school {
            School::Physical => amount * (1.0 - self.armor_mitigation(cast.target, env)),
            School::Nature => amount,
        }
    }

    /// Per-tick damage fixed at cast time, before each tick's outcome roll.
    /// Periodic damage ignores armor.
    pub(crate) fn tick_damage(&self, spec: &AbilitySpec, cast: &CastState, now: Tick) -> f64 {
        let Some(periodic) = spec.periodic else {
            return 0.0;
        };
        let combo_points = cast.combo_points;
        let attack_power = self.attack_power(now);

        let base = match periodic.damage {
            TickDamage::None => return 0.0,
            TickDamage::Flat {
                base,
                ap_coefficient,
            } => base + attack_power * ap_coefficient,
            TickDamage::ComboRanks {
                base,
                per_point,
                ap_ranks,
            } => {
                base + per_point * f64::from(combo_points)
                    + attack_power * rank_of(combo_points, &ap_ranks).unwrap_or(0.0)
            }
            TickDamage::FractionOfDirect { fraction } => {
                let ticks = periodic.ticks.resolve(combo_points);
                if ticks == 0 {
                    return 0.0;
                }
                // direct damage already carries every multiplier
                return cast.direct_damage * fraction / f64::from(ticks);
            }
        };
        base * self.damage_multiplier(spec, cast.target, now)
    }

    pub(crate) fn damage_multiplier(&self, spec: &AbilitySpec, target: ActorId, now: Tick) -> f64 {
        self.weapon_multiplier(spec, now)
            * self.action_multiplier(spec, now)
            * self.target_multiplier(spec, target, now)
            * self.player_multiplier(now)
    }

    fn weapon_multiplier(&self, spec: &AbilitySpec, now: Tick) -> f64 {
        let mut multiplier = 1.0;
        if spec.kind == AbilityKind::Hemorrhage && self.stats.main_hand.is_some_and(|w| w.is_dagger()) {
            multiplier *= HEMORRHAGE_DAGGER_MULTIPLIER;
        }
        if let Some(resolve) = self.profile.passives.assassins_resolve
            && self.stats.has_dual_daggers()
        {
            multiplier *= 1.0 + resolve.damage;
        }
        if spec.has(AbilityFlags::AFFECTED_BY_KILLING_SPREE)
            && self.buffs.up(BuffKind::KillingSpree, now)
        {
            multiplier *= 1.0 + self.buffs.value(BuffKind::KillingSpree, now);
        }
        multiplier
    }

    fn action_multiplier(&self, spec: &AbilitySpec, now: Tick) -> f64 {
        let mastery = self.stats.mastery;
        let mut multiplier = 1.0;
        if spec.is_finisher() {
            multiplier *= 1.0 + self.profile.mastery_bonus(MasteryKind::Executioner, mastery);
        }
        if spec.has(AbilityFlags::POISON) || spec.kind == AbilityKind::Envenom {
            multiplier *= 1.0 + self.profile.mastery_bonus(MasteryKind::PotentPoisons, mastery);
        }
        if spec.kind == AbilityKind::Ambush && self.stats.main_hand.is_some_and(|w| w.is_dagger()) {
            multiplier *= AMBUSH_DAGGER_MULTIPLIER;
        }
        if matches!(spec.kind, AbilityKind::Ambush | AbilityKind::Garrote) {
            multiplier *= 1.0 + self.buffs.value(BuffKind::Shadowstep, now);
        }
        if matches!(spec.kind, AbilityKind::SinisterStrike | AbilityKind::RevealingStrike)
            && self.profile.legendary != LegendaryStage::None
        {
            multiplier *= 1.0 + self.profile.legendary_strike_bonus;
        }
        multiplier
    }

    fn target_multiplier(&self, spec: &AbilitySpec, target: ActorId, now: Tick) -> f64 {
        let Some(data) = self.target(target) else {
            return 1.0;
        };
        let mut multiplier = 1.0;
        if spec.is_finisher() {
            multiplier *= 1.0 + data.debuffs.value(BuffKind::RevealingStrike, now);
        }
        multiplier *= 1.0 + data.debuffs.value(BuffKind::Vendetta, now);
        if let Some(vein) = self.profile.passives.sanguinary_vein
            && data.is_bleeding()
        {
            multiplier *= 1.0 + vein;
        }
        multiplier
    }

    fn player_multiplier(&self, now: Tick) -> f64 {
        let insight = self.buffs.value(BuffKind::ShallowInsight, now)
            + self.buffs.value(BuffKind::ModerateInsight, now)
            + self.buffs.value(BuffKind::DeepInsight, now);
        (1.0 + self.buffs.value(BuffKind::MasterOfSubtlety, now)) * (1.0 + insight)
    }

    /// Armor fraction removed from a physical hit, after Find Weakness.
    fn armor_mitigation(&self, target: ActorId, env: &SimEnv<'_>) -> f64 {
        let ignored = self
            .target(target)
            .map_or(0.0, |data| data.debuffs.value(BuffKind::FindWeakness, env.now()));
        let armor = env.targets.profile(target).armor * (1.0 - ignored).max(0.0);
        armor_reduction(armor, self.config.armor_constant)
    }

    pub(crate) fn crit_chance(&self) -> f64 {
        self.stats.crit_chance
    }
}
