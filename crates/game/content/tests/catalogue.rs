//! Rules encoded by the bundled ability rows.

use rogue_content::SpellLoader;
use rogue_core::{
    AbilityFlags, AbilityKind, DirectDamage, SpellBook, SpellOracle, TickCount, TickDamage,
    WeaponSlot,
};
use strum::IntoEnumIterator;

const GENERATORS: &[(AbilityKind, u8)] = &[
    (AbilityKind::SinisterStrike, 1),
    (AbilityKind::RevealingStrike, 1),
    (AbilityKind::Backstab, 1),
    (AbilityKind::Hemorrhage, 1),
    (AbilityKind::Mutilate, 2),
    (AbilityKind::Ambush, 2),
    (AbilityKind::Garrote, 1),
    (AbilityKind::Dispatch, 1),
    (AbilityKind::FanOfKnives, 1),
    (AbilityKind::ExposeArmor, 1),
    (AbilityKind::Shiv, 1),
];

const FINISHERS: &[AbilityKind] = &[
    AbilityKind::Eviscerate,
    AbilityKind::Envenom,
    AbilityKind::Rupture,
    AbilityKind::SliceAndDice,
    AbilityKind::Recuperate,
];

fn book() -> SpellBook {
    SpellLoader::embedded().unwrap()
}

#[test]
fn generators_grant_points_without_spending_them() {
    let book = book();
    for &(kind, points) in GENERATORS {
        let spec = book.ability(kind).unwrap();
        assert!(!spec.is_finisher(), "{kind} must not spend combo points");
        assert_eq!(spec.adds_combo_points, points, "{kind}");
    }
}

#[test]
fn finishers_spend_points_and_grant_none() {
    let book = book();
    for &kind in FINISHERS {
        let spec = book.ability(kind).unwrap();
        assert!(spec.is_finisher(), "{kind} must spend combo points");
        assert_eq!(spec.adds_combo_points, 0, "{kind}");
    }
}

#[test]
fn every_row_is_either_a_generator_a_finisher_or_neither() {
    let book = book();
    for kind in AbilityKind::iter() {
        let Some(spec) = book.ability(kind) else {
            continue;
        };
        let generator = GENERATORS.iter().any(|&(listed, _)| listed == kind);
        let finisher = FINISHERS.contains(&kind);
        assert_eq!(spec.is_finisher(), finisher, "{kind}");
        if !generator {
            assert_eq!(spec.adds_combo_points, 0, "{kind} grants unlisted combo points");
        }
    }
}

#[test]
fn expose_armor_swings_the_main_hand_for_no_damage() {
    let book = book();
    let spec = book.ability(AbilityKind::ExposeArmor).unwrap();
    assert_eq!(spec.weapon, Some(WeaponSlot::MainHand));
    assert!(!spec.has(AbilityFlags::MAY_CRIT));
    assert_eq!(
        spec.direct,
        DirectDamage::Weapon {
            multiplier: 0.0,
            bonus: 0.0
        }
    );
}

#[test]
fn hemorrhage_carries_its_bleed() {
    let book = book();
    let spec = book.ability(AbilityKind::Hemorrhage).unwrap();
    let periodic = spec.periodic.unwrap();
    assert_eq!(periodic.ticks, TickCount::Fixed(8));
    assert_eq!(
        periodic.damage,
        TickDamage::FractionOfDirect { fraction: 0.5 }
    );
}
