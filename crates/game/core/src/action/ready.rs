//! Cost check: whether an ability can be executed right now, and why not.

use crate::action::{AbilityFlags, AbilityKind, AbilitySpec};
use crate::engine::RogueActor;
use crate::env::SimEnv;
use crate::error::{ErrorSeverity, SimError};
use crate::state::{ActorId, BuffKind, CooldownKind, Tick};

/// Why `ready()` answered false.
///
/// Everything except [`Unavailable::Disabled`] and [`Unavailable::Unknown`] is
/// transient and may clear on a later decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unavailable {
    #[error("no spell data for this ability")]
    Unknown,

    #[error("disabled by missing equipment")]
    Disabled,

    #[error("background abilities cannot be chosen")]
    Background,

    #[error("no combo points on the target")]
    NoComboPoints,

    #[error("requires stealth")]
    NotStealthed,

    #[error("wrong position relative to the target")]
    Position,

    #[error("wrong weapon kind")]
    Weapon,

    #[error("blocked by an active channel")]
    Blocked,

    #[error("global cooldown is running")]
    GlobalCooldown,

    #[error("on cooldown")]
    Cooldown,

    #[error("not enough energy")]
    Energy,

    #[error("usage condition not met")]
    Condition,
}

impl SimError for Unavailable {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Unknown | Self::Disabled | Self::Background => ErrorSeverity::Validation,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unknown => "UNAVAILABLE_UNKNOWN",
            Self::Disabled => "UNAVAILABLE_DISABLED",
            Self::Background => "UNAVAILABLE_BACKGROUND",
            Self::NoComboPoints => "UNAVAILABLE_NO_COMBO_POINTS",
            Self::NotStealthed => "UNAVAILABLE_NOT_STEALTHED",
            Self::Position => "UNAVAILABLE_POSITION",
            Self::Weapon => "UNAVAILABLE_WEAPON",
            Self::Blocked => "UNAVAILABLE_BLOCKED",
            Self::GlobalCooldown => "UNAVAILABLE_GCD",
            Self::Cooldown => "UNAVAILABLE_COOLDOWN",
            Self::Energy => "UNAVAILABLE_ENERGY",
            Self::Condition => "UNAVAILABLE_CONDITION",
        }
    }
}

// ============================================================================
// Readiness
// ============================================================================

impl RogueActor {
    /// True when `kind` could be executed against `target` right now.
    pub fn ready(&self, kind: AbilityKind, target: ActorId, env: &SimEnv<'_>) -> bool {
        self.readiness(kind, target, env).is_ok()
    }

    /// Like [`RogueActor::ready`] but names the first failed check.
    ///
    /// Pure: never mutates the actor and never consumes randomness.
    pub fn readiness(
        &self,
        kind: AbilityKind,
        target: ActorId,
        env: &SimEnv<'_>,
    ) -> Result<(), Unavailable> {
        let now = env.now();
        let spec = self.abilities.get(&kind).ok_or(Unavailable::Unknown)?;

        if self.disabled.contains(&kind) {
            return Err(Unavailable::Disabled);
        }
        if spec.has(AbilityFlags::BACKGROUND) {
            return Err(Unavailable::Background);
        }
        if spec.is_finisher() && self.combo_points(target) == 0 {
            return Err(Unavailable::NoComboPoints);
        }
        if spec.has(AbilityFlags::REQUIRES_STEALTH) && !self.stealthed(now) {
            return Err(Unavailable::NotStealthed);
        }
        if let Some(position) = spec.position
            && self.stats.position != position
        {
            return Err(Unavailable::Position);
        }
        if let Some(required) = spec.requires_weapon {
            let wielded = spec
                .weapon
                .and_then(|slot| self.stats.weapon(slot))
                .map(|weapon| weapon.kind);
            if wielded != Some(required) {
                return Err(Unavailable::Weapon);
            }
        }
        if spec.is_player_special() && self.buffs.check(BuffKind::KillingSpree, now) {
            return Err(Unavailable::Blocked);
        }
        if spec.has(AbilityFlags::TRIGGERS_GCD) && !self.cooldowns.up(CooldownKind::Global, now) {
            return Err(Unavailable::GlobalCooldown);
        }
        if let Some(cooldown) = spec.cooldown
            && !self.cooldowns.up(cooldown.kind, now)
        {
            return Err(Unavailable::Cooldown);
        }
        if !self.energy.can_afford(self.cost(spec, now)) {
            return Err(Unavailable::Energy);
        }
        if !self.usable(kind, target, env) {
            return Err(Unavailable::Condition);
        }
        Ok(())
    }

    /// Energy cost of `spec` after cost modifiers.
    pub fn cost(&self, spec: &AbilitySpec, now: Tick) -> f64 {
        let mut cost = spec.cost;
        if cost <= 0.0 {
            return 0.0;
        }
        match spec.kind {
            AbilityKind::Dispatch if self.buffs.check(BuffKind::Blindside, now) => return 0.0,
            AbilityKind::Ambush if self.buffs.check(BuffKind::ShadowDance, now) => {
                cost = (cost + self.profile.shadow_dance_cost_delta).max(0.0);
            }
            _ => {}
        }
        if self.buffs.up(BuffKind::Tier13TwoPiece, now) {
            cost *= self.profile.tier13_2pc_cost_multiplier;
        }
        cost
    }

    /// Stealth-class state: Stealth, Vanish or Shadow Dance.
    pub fn stealthed(&self, now: Tick) -> bool {
        self.buffs.check(BuffKind::Stealthed, now)
            || self.buffs.check(BuffKind::Vanish, now)
            || self.buffs.check(BuffKind::ShadowDance, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::AbilitySpec;
    use crate::config::RogueConfig;
    use crate::engine::{RogueProfile, Specialization};
    use crate::env::{AlwaysHit, PcgRng, SpellBook, TargetProfile};
    use crate::state::CooldownKind;
    use crate::stats::ActorStats;
    use crate::test_utils::ManualScheduler;

    fn book() -> SpellBook {
        SpellBook::new(
            [
                AbilitySpec::new(AbilityKind::Eviscerate)
                    .with_cost(35.0)
                    .with_flags(AbilityFlags::FINISHER),
                AbilitySpec::new(AbilityKind::Ambush)
                    .with_cost(60.0)
                    .with_flags(AbilityFlags::MELEE_SPECIAL | AbilityFlags::REQUIRES_STEALTH),
                AbilitySpec::new(AbilityKind::Vanish)
                    .with_cooldown(CooldownKind::Vanish, Tick::from_secs(120)),
                AbilitySpec::new(AbilityKind::MainGauche)
                    .with_flags(AbilityFlags::BACKGROUND | AbilityFlags::PROC),
            ],
            [],
        )
    }

    fn actor() -> RogueActor {
        RogueActor::new(
            ActorId(0),
            RogueConfig::default(),
            RogueProfile::talented(Specialization::Subtlety),
            ActorStats::default(),
            &book(),
        )
    }

    #[test]
    fn finisher_is_not_ready_without_combo_points() {
        let actor = actor();
        let mut rng = PcgRng::new(0);
        let mut scheduler = ManualScheduler::default();
        let target = TargetProfile::default();
        let env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);

        assert_eq!(
            actor.readiness(AbilityKind::Eviscerate, ActorId::PRIMARY_TARGET, &env),
            Err(Unavailable::NoComboPoints)
        );
    }

    #[test]
    fn stealth_and_background_gates() {
        let actor = actor();
        let mut rng = PcgRng::new(0);
        let mut scheduler = ManualScheduler::default();
        let target = TargetProfile::default();
        let env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);

        assert_eq!(
            actor.readiness(AbilityKind::Ambush, ActorId::PRIMARY_TARGET, &env),
            Err(Unavailable::NotStealthed)
        );
        assert_eq!(
            actor.readiness(AbilityKind::MainGauche, ActorId::PRIMARY_TARGET, &env),
            Err(Unavailable::Background)
        );
        assert_eq!(
            actor.readiness(AbilityKind::Kick, ActorId::PRIMARY_TARGET, &env),
            Err(Unavailable::Unknown)
        );
    }

    #[test]
    fn cooldown_blocks_until_ready() {
        let mut actor = actor();
        actor
            .cooldowns_mut()
            .start(CooldownKind::Vanish, Tick::ZERO, Tick::from_secs(120));
        let mut rng = PcgRng::new(0);
        let mut scheduler = ManualScheduler::default();
        let target = TargetProfile::default();
        let env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);

        assert_eq!(
            actor.readiness(AbilityKind::Vanish, ActorId::PRIMARY_TARGET, &env),
            Err(Unavailable::Cooldown)
        );
    }
}
