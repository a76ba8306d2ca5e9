//! Per-kind behavior that does not fit the data model.
//!
//! Each hook is a single `match` over [`AbilityKind`]. Kinds without special
//! behavior fall through to the default arm.

use crate::action::{AbilityKind, AbilitySpec, CastState};
use crate::engine::{MasteryKind, RogueActor};
use crate::env::SimEnv;
use crate::state::{ActorId, BuffKind, BuffScope, CooldownKind, Tick};
use crate::telemetry::ProcKind;

/// Slice and Dice duration per combo point, plus one extra point's worth.
const SLICE_AND_DICE_PER_POINT: Tick = Tick::from_secs(6);

/// Slice and Dice duration restored by Cut to the Chase (a five-point cast).
const CUT_TO_THE_CHASE_DURATION: Tick = Tick::from_secs(36);

impl RogueActor {
    /// Ability-specific usability beyond the generic readiness checks.
    pub(crate) fn usable(&self, kind: AbilityKind, target: ActorId, env: &SimEnv<'_>) -> bool {
        let now = env.now();
        match kind {
            AbilityKind::Dispatch => {
                self.buffs.check(BuffKind::Blindside, now)
                    || env.targets.profile(target).health_fraction
                        < self.config.execute_health_fraction
            }
            AbilityKind::Kick => env.targets.profile(target).casting,
            AbilityKind::Vanish => {
                !self.buffs.check(BuffKind::Stealthed, now) && !self.buffs.check(BuffKind::Vanish, now)
            }
            AbilityKind::Stealth => !self.stealth_used && !self.stealthed(now),
            _ => true,
        }
    }

    /// Runs before the snapshot and the outcome roll.
    pub(crate) fn pre_execute(&mut self, spec: &AbilitySpec, target: ActorId, env: &mut SimEnv<'_>) {
        match spec.kind {
            AbilityKind::Envenom => {
                let points = u64::from(self.combo_points(target));
                let duration = Tick::from_secs(1 + points);
                self.trigger_buff(BuffScope::Actor, BuffKind::Envenom, 1, None, Some(duration), env);
            }
            AbilityKind::Shiv => {
                self.trigger_buff(BuffScope::Actor, BuffKind::Shiv, 1, None, None, env);
            }
            _ => {}
        }
    }

    /// Runs on a connecting impact, after the impact rules.
    pub(crate) fn on_impact(&mut self, spec: &AbilitySpec, cast: &CastState, env: &mut SimEnv<'_>) {
        let target = cast.target;
        let debuff = BuffScope::Target(target);
        match spec.kind {
            AbilityKind::SinisterStrike => {
                self.trigger_buff(BuffScope::Actor, BuffKind::BanditsGuile, 1, None, None, env);
                let revealed = self
                    .target(target)
                    .is_some_and(|data| data.debuffs.up(BuffKind::RevealingStrike, env.now()));
                if revealed && env.rng.roll(self.profile.revealing_strike_bonus_chance) {
                    self.add_combo_points(target, 1, "revealing_strike");
                    self.telemetry.record_proc(ProcKind::RevealingStrike, 1);
                }
            }
            AbilityKind::RevealingStrike => {
                self.trigger_buff(BuffScope::Actor, BuffKind::BanditsGuile, 1, None, None, env);
                self.trigger_buff(debuff, BuffKind::RevealingStrike, 1, None, None, env);
            }
            AbilityKind::Ambush | AbilityKind::Garrote => {
                self.trigger_buff(debuff, BuffKind::FindWeakness, 1, None, None, env);
            }
            AbilityKind::Mutilate => {
                self.trigger_buff(BuffScope::Actor, BuffKind::Blindside, 1, None, None, env);
            }
            AbilityKind::Eviscerate | AbilityKind::Envenom
                if self.profile.passives.cut_to_the_chase =>
            {
                let value = self.slice_and_dice_value();
                self.trigger_buff(
                    BuffScope::Actor,
                    BuffKind::SliceAndDice,
                    1,
                    Some(value),
                    Some(CUT_TO_THE_CHASE_DURATION),
                    env,
                );
            }
            AbilityKind::SliceAndDice => {
                let value = self.slice_and_dice_value();
                let duration = SLICE_AND_DICE_PER_POINT * (u32::from(cast.combo_points) + 1);
                self.trigger_buff(
                    BuffScope::Actor,
                    BuffKind::SliceAndDice,
                    1,
                    Some(value),
                    Some(duration),
                    env,
                );
            }
            AbilityKind::Vendetta => {
                self.trigger_buff(debuff, BuffKind::Vendetta, 1, None, None, env);
            }
            AbilityKind::WoundPoison => {
                self.trigger_buff(debuff, BuffKind::WoundPoison, 1, None, None, env);
            }
            _ => {}
        }
    }

    /// Runs after the execute rules and before cooldowns start.
    pub(crate) fn post_execute(&mut self, spec: &AbilitySpec, cast: &CastState, env: &mut SimEnv<'_>) {
        let actor = BuffScope::Actor;
        match spec.kind {
            AbilityKind::AdrenalineRush => {
                self.trigger_buff(actor, BuffKind::AdrenalineRush, 1, None, None, env);
            }
            AbilityKind::ShadowDance => {
                self.trigger_buff(actor, BuffKind::ShadowDance, 1, None, None, env);
            }
            AbilityKind::Shadowstep => {
                self.trigger_buff(actor, BuffKind::Shadowstep, 1, None, None, env);
            }
            AbilityKind::Vanish => {
                self.trigger_buff(actor, BuffKind::Vanish, 1, None, None, env);
            }
            AbilityKind::Stealth => {
                self.trigger_buff(actor, BuffKind::Stealthed, 1, None, None, env);
                self.stealth_used = true;
            }
            AbilityKind::Ambush | AbilityKind::Garrote => {
                self.expire_buff(actor, BuffKind::Shadowstep);
            }
            AbilityKind::Dispatch => {
                self.expire_buff(actor, BuffKind::Blindside);
            }
            AbilityKind::Mutilate if cast.landed() => {
                self.run_cast(AbilityKind::MutilateMainHand, cast.target, env);
                self.run_cast(AbilityKind::MutilateOffHand, cast.target, env);
            }
            AbilityKind::Preparation => {
                self.cooldowns.reset(CooldownKind::Vanish);
            }
            AbilityKind::TricksOfTheTrade => {
                self.trigger_buff(actor, BuffKind::TricksTrigger, 1, None, None, env);
                self.trigger_buff(actor, BuffKind::Tier13TwoPiece, 1, None, None, env);
            }
            AbilityKind::Shiv => {
                self.expire_buff(actor, BuffKind::Shiv);
            }
            _ => {}
        }
    }

    /// Runs on every periodic tick, after the tick rules.
    pub(crate) fn on_tick(&mut self, spec: &AbilitySpec, cast: &CastState, env: &mut SimEnv<'_>) {
        if spec.kind == AbilityKind::KillingSpree {
            let main_hand = self.run_cast(AbilityKind::KillingSpreeMainHand, cast.target, env);
            if main_hand.is_some_and(|report| report.result.is_hit()) {
                self.run_cast(AbilityKind::KillingSpreeOffHand, cast.target, env);
            }
        }
    }

    fn slice_and_dice_value(&self) -> f64 {
        let base = self
            .buffs
            .def(BuffKind::SliceAndDice)
            .map_or(0.0, |def| def.default_value);
        base * (1.0 + self.profile.mastery_bonus(MasteryKind::Executioner, self.stats.mastery))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RogueConfig;
    use crate::engine::{RogueProfile, Specialization};
    use crate::env::{AlwaysHit, PcgRng, SpellBook, TargetProfile};
    use crate::state::BuffDef;
    use crate::stats::ActorStats;
    use crate::test_utils::ManualScheduler;

    fn actor(profile: RogueProfile) -> RogueActor {
        let book = SpellBook::new(
            [],
            [
                BuffDef::new(BuffKind::SliceAndDice).with_value(0.4),
                BuffDef::new(BuffKind::Envenom),
            ],
        );
        RogueActor::new(ActorId(0), RogueConfig::default(), profile, ActorStats::default(), &book)
    }

    #[test]
    fn dispatch_needs_execute_range_or_blindside() {
        let actor = actor(RogueProfile::talented(Specialization::Assassination));
        let mut rng = PcgRng::new(0);
        let mut scheduler = ManualScheduler::default();
        let healthy = TargetProfile::default();
        let env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &healthy);
        assert!(!actor.usable(AbilityKind::Dispatch, ActorId::PRIMARY_TARGET, &env));

        let mut rng = PcgRng::new(0);
        let mut scheduler = ManualScheduler::default();
        let wounded = TargetProfile {
            health_fraction: 0.2,
            ..TargetProfile::default()
        };
        let env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &wounded);
        assert!(actor.usable(AbilityKind::Dispatch, ActorId::PRIMARY_TARGET, &env));
    }

    #[test]
    fn envenom_buff_lasts_one_second_per_point_plus_one() {
        let mut actor = actor(RogueProfile::new(Specialization::Assassination));
        actor.add_combo_points(ActorId::PRIMARY_TARGET, 4, "test");
        let spec = AbilitySpec::new(AbilityKind::Envenom);

        let mut rng = PcgRng::new(0);
        let mut scheduler = ManualScheduler::default();
        let target = TargetProfile::default();
        let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);
        actor.pre_execute(&spec, ActorId::PRIMARY_TARGET, &mut env);

        assert_eq!(actor.buffs().remains(BuffKind::Envenom, Tick::ZERO), Tick::from_secs(5));
    }

    #[test]
    fn slice_and_dice_scales_with_points() {
        let mut actor = actor(RogueProfile::new(Specialization::Combat));
        let spec = AbilitySpec::new(AbilityKind::SliceAndDice);
        let cast = CastState {
            ability: AbilityKind::SliceAndDice,
            target: ActorId::PRIMARY_TARGET,
            combo_points: 2,
            result: crate::combat::HitResult::Hit,
            direct_damage: 0.0,
            tick_damage: 0.0,
            resource_consumed: 25.0,
        };

        let mut rng = PcgRng::new(0);
        let mut scheduler = ManualScheduler::default();
        let target = TargetProfile::default();
        let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);
        actor.on_impact(&spec, &cast, &mut env);

        let buffs = actor.buffs();
        assert_eq!(buffs.remains(BuffKind::SliceAndDice, Tick::ZERO), Tick::from_secs(18));
        assert!((buffs.value(BuffKind::SliceAndDice, Tick::ZERO) - 0.4).abs() < 1e-12);
    }
}
