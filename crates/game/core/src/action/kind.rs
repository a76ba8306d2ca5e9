/// Every ability the rogue can execute, including background casts that only
/// run as part of another pipeline (auto attacks, sub-strikes, poisons).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum AbilityKind {
    // ===== background =====
    AutoAttackMainHand,
    AutoAttackOffHand,
    DeadlyPoison,
    DeadlyPoisonInstant,
    KillingSpreeMainHand,
    KillingSpreeOffHand,
    MainGauche,
    MutilateMainHand,
    MutilateOffHand,
    VenomousWound,
    WoundPoison,

    // ===== generators =====
    Ambush,
    Backstab,
    Dispatch,
    ExposeArmor,
    FanOfKnives,
    Garrote,
    Hemorrhage,
    Mutilate,
    RevealingStrike,
    SinisterStrike,

    // ===== finishers =====
    Envenom,
    Eviscerate,
    Recuperate,
    Rupture,
    SliceAndDice,

    // ===== cooldowns and utility =====
    AdrenalineRush,
    Kick,
    KillingSpree,
    Preparation,
    ShadowDance,
    Shadowstep,
    Shiv,
    Stealth,
    TricksOfTheTrade,
    Vanish,
    Vendetta,
}

impl AbilityKind {
    /// Stable tag used for telemetry and combo point sources.
    pub fn tag(self) -> &'static str {
        self.into()
    }

    pub const fn is_auto_attack(self) -> bool {
        matches!(self, Self::AutoAttackMainHand | Self::AutoAttackOffHand)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn names_round_trip_through_snake_case() {
        for kind in AbilityKind::iter() {
            assert_eq!(AbilityKind::from_str(kind.tag()), Ok(kind));
        }
        assert_eq!(AbilityKind::SliceAndDice.to_string(), "slice_and_dice");
    }
}
