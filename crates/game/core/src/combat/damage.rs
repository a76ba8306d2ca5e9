//! Damage formulas shared by every ability.

use crate::combat::HitResult;
use crate::env::RngOracle;
use crate::stats::{Weapon, WeaponSlot};

/// Damage multiplier on a critical strike.
pub const CRIT_MULTIPLIER: f64 = 2.0;

/// Fraction of damage that gets through a block.
pub const BLOCK_PASSTHROUGH: f64 = 0.7;

/// Base damage of a weapon swing, before multipliers.
///
/// Special attacks use the normalized weapon speed for the attack-power bonus;
/// auto attacks use the real swing time. Off-hand damage is halved.
pub fn weapon_damage(
    weapon: &Weapon,
    slot: WeaponSlot,
    attack_power: f64,
    normalized: bool,
    rng: &mut dyn RngOracle,
) -> f64 {
    let rolled = rng.uniform(weapon.min_damage, weapon.max_damage);
    let speed = if normalized {
        weapon.normalized_speed()
    } else {
        weapon.swing_time.as_secs_f64()
    };
    let base = rolled + attack_power / 14.0 * speed;
    match slot {
        WeaponSlot::MainHand => base,
        WeaponSlot::OffHand => base * 0.5,
    }
}

/// Fraction of physical damage removed by armor.
pub fn armor_reduction(armor: f64, armor_constant: f64) -> f64 {
    if armor <= 0.0 {
        return 0.0;
    }
    armor / (armor + armor_constant)
}

/// Applies the outcome's damage scaling.
pub fn apply_result(amount: f64, result: HitResult) -> f64 {
    match result {
        HitResult::Hit => amount,
        HitResult::Crit => amount * CRIT_MULTIPLIER,
        HitResult::Block => amount * BLOCK_PASSTHROUGH,
        HitResult::Miss | HitResult::Dodge | HitResult::Parry => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;
    use crate::state::Tick;
    use crate::stats::WeaponKind;

    #[test]
    fn offhand_swings_are_halved() {
        let weapon = Weapon::new(WeaponKind::Dagger, 100.0, 100.0, Tick::from_millis(1800));
        let mut rng = PcgRng::new(0);

        let main = weapon_damage(&weapon, WeaponSlot::MainHand, 1400.0, true, &mut rng);
        let off = weapon_damage(&weapon, WeaponSlot::OffHand, 1400.0, true, &mut rng);
        assert!((main - 270.0).abs() < 1e-9);
        assert!((off - 135.0).abs() < 1e-9);
    }

    #[test]
    fn avoided_outcomes_deal_nothing() {
        assert_eq!(apply_result(100.0, HitResult::Dodge), 0.0);
        assert_eq!(apply_result(100.0, HitResult::Crit), 200.0);
    }

    #[test]
    fn armor_reduction_is_bounded() {
        assert_eq!(armor_reduction(0.0, 100.0), 0.0);
        assert!(armor_reduction(1e9, 100.0) < 1.0);
    }
}
