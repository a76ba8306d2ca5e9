//! Timer dispatch and buff bookkeeping that needs the scheduler.

use tracing::{debug, trace};

use crate::action::AbilityKind;
use crate::config::RogueConfig;
use crate::engine::{ExecuteError, RogueActor};
use crate::env::SimEnv;
use crate::error::InvariantViolation;
use crate::state::{BuffKind, BuffScope, Tick, TimerHandle, TimerPurpose};
use crate::stats::WeaponSlot;

impl RogueActor {
    /// Entry point for every event this actor scheduled.
    ///
    /// Handles that no longer redeem (cancelled, already fired, or issued
    /// before a combat reset) are ignored.
    pub fn on_timer(
        &mut self,
        handle: TimerHandle,
        env: &mut SimEnv<'_>,
    ) -> Result<(), ExecuteError> {
        let Some(purpose) = self.timers.fire(handle) else {
            trace!(actor = %self.id, index = handle.index(), "stale timer ignored");
            return Ok(());
        };

        let ability = match purpose {
            TimerPurpose::Impact(cast) => {
                let ability = cast.ability;
                self.impact(*cast, env);
                Some(ability)
            }
            TimerPurpose::DotTick { target, ability } => {
                self.dot_tick(target, ability, env);
                Some(ability)
            }
            TimerPurpose::BuffExpire { scope, kind } => {
                self.table_mut(scope).take_timer(kind);
                self.expire_buff(scope, kind);
                None
            }
            TimerPurpose::Swing(slot) => {
                self.swing(slot, env);
                Some(match slot {
                    WeaponSlot::MainHand => AbilityKind::AutoAttackMainHand,
                    WeaponSlot::OffHand => AbilityKind::AutoAttackOffHand,
                })
            }
            TimerPurpose::VirtualHonorAmongThieves => {
                self.grant_honor_among_thieves(env);
                self.schedule_virtual_hat(env);
                None
            }
        };

        self.post_validate(ability, env.now())
    }

    /// Triggers `kind` in `scope`, (re)arming its expiry timer and applying any
    /// stack thresholds crossed. Returns false when nothing changed.
    pub fn trigger_buff(
        &mut self,
        scope: BuffScope,
        kind: BuffKind,
        stacks: u16,
        value: Option<f64>,
        duration: Option<Tick>,
        env: &mut SimEnv<'_>,
    ) -> bool {
        let now = env.now();
        let Some(outcome) =
            self.table_mut(scope)
                .trigger(kind, stacks, value, duration, now, &mut *env.rng)
        else {
            return false;
        };

        if let Some(stale) = self.table_mut(scope).take_timer(kind) {
            self.timers.cancel(stale);
        }
        if let Some(at) = outcome.expires_at
            && let Some(handle) = self.schedule(
                at.saturating_sub(now),
                TimerPurpose::BuffExpire { scope, kind },
                env,
            )
        {
            self.table_mut(scope).set_timer(kind, handle);
        }

        for tier in outcome.tiers {
            let active = self
                .table(scope)
                .is_some_and(|table| table.check(tier.activates, now));
            if tier.unless_active && active {
                continue;
            }
            debug!(buff = %kind, stack = tier.at_stack, next = %tier.activates, "stack threshold");
            if let Some(lower) = tier.expires {
                self.expire_buff(scope, lower);
            }
            self.trigger_buff(scope, tier.activates, 1, None, None, env);
        }
        true
    }

    /// Forces `kind` down in `scope` and follows its dependent chain.
    ///
    /// Returns false when the buff was not up.
    pub fn expire_buff(&mut self, scope: BuffScope, kind: BuffKind) -> bool {
        let mut next = Some(kind);
        let mut depth = 0;
        let mut expired_any = false;

        while let Some(current) = next {
            if depth == RogueConfig::MAX_EXPIRY_CHAIN {
                self.pending_violation
                    .get_or_insert(InvariantViolation::ExpiryCycle { buff: kind });
                break;
            }
            depth += 1;

            let Some(expiry) = self.table_mut(scope).expire(current) else {
                break;
            };
            if let Some(handle) = expiry.timer {
                self.timers.cancel(handle);
            }
            self.telemetry.record_expiry(current);
            expired_any = true;
            next = expiry.dependent;
        }
        expired_any
    }

    // ========================================================================
    // Auto attacks
    // ========================================================================

    /// Hasted swing interval of `slot` at `now`.
    pub(crate) fn swing_time(&self, slot: WeaponSlot, now: Tick) -> Tick {
        let Some(weapon) = self.stats.weapon(slot) else {
            return Tick::ZERO;
        };
        let mut speed = self.stats.haste_factor();
        speed *= 1.0 + self.buffs.value(BuffKind::SliceAndDice, now);
        speed *= 1.0 + self.buffs.value(BuffKind::AdrenalineRush, now);
        weapon.swing_time.scale(1.0 / speed)
    }

    pub(crate) fn schedule_swing(&mut self, slot: WeaponSlot, delay: Tick, env: &mut SimEnv<'_>) {
        self.schedule(delay, TimerPurpose::Swing(slot), env);
    }

    fn swing(&mut self, slot: WeaponSlot, env: &mut SimEnv<'_>) {
        let kind = match slot {
            WeaponSlot::MainHand => AbilityKind::AutoAttackMainHand,
            WeaponSlot::OffHand => AbilityKind::AutoAttackOffHand,
        };
        let target = self.primary_target;
        self.run_cast(kind, target, env);

        let next = self.swing_time(slot, env.now());
        if !next.is_zero() {
            self.schedule_swing(slot, next, env);
        }
    }

    // ========================================================================
    // Honor Among Thieves
    // ========================================================================

    /// Arms the next virtual party crit.
    ///
    /// The event lands after the proc cooldown plus a uniform jitter around
    /// the remainder of the configured interval.
    pub(crate) fn schedule_virtual_hat(&mut self, env: &mut SimEnv<'_>) {
        let cooldown = self.config.honor_among_thieves_icd;
        let remainder = self.config.virtual_hat_interval.saturating_sub(cooldown);
        let jitter = env.rng.range(remainder.scale(0.5), remainder.scale(1.5));
        let delay = cooldown + jitter + Tick::from_millis(10);
        self.schedule(delay, TimerPurpose::VirtualHonorAmongThieves, env);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RogueProfile, Specialization};
    use crate::env::{AlwaysHit, PcgRng, SpellBook, TargetProfile};
    use crate::state::{ActorId, BuffDef, StackTier};
    use crate::stats::ActorStats;
    use crate::test_utils::ManualScheduler;

    fn actor(buffs: Vec<BuffDef>) -> RogueActor {
        let mut profile = RogueProfile::talented(Specialization::Combat);
        profile.legendary = crate::engine::LegendaryStage::Destroyer;
        let book = SpellBook::new([], buffs);
        RogueActor::new(ActorId(0), RogueConfig::default(), profile, ActorStats::default(), &book)
    }

    fn guile_ladder() -> Vec<BuffDef> {
        vec![
            BuffDef::new(BuffKind::BanditsGuile)
                .with_max_stack(12)
                .with_duration(Tick::from_secs(15))
                .with_tier(StackTier {
                    at_stack: 4,
                    expires: None,
                    activates: BuffKind::ShallowInsight,
                    unless_active: false,
                })
                .with_tier(StackTier {
                    at_stack: 8,
                    expires: Some(BuffKind::ShallowInsight),
                    activates: BuffKind::ModerateInsight,
                    unless_active: false,
                })
                .with_tier(StackTier {
                    at_stack: 12,
                    expires: Some(BuffKind::ModerateInsight),
                    activates: BuffKind::DeepInsight,
                    unless_active: true,
                }),
            BuffDef::new(BuffKind::ShallowInsight).with_duration(Tick::from_secs(15)),
            BuffDef::new(BuffKind::ModerateInsight).with_duration(Tick::from_secs(15)),
            BuffDef::new(BuffKind::DeepInsight).with_duration(Tick::from_secs(15)),
            BuffDef::new(BuffKind::FuryOfTheDestroyer)
                .with_duration(Tick::from_secs(6))
                .with_on_expire(BuffKind::ShadowsOfTheDestroyer),
            BuffDef::new(BuffKind::ShadowsOfTheDestroyer).with_max_stack(50),
        ]
    }

    #[test]
    fn bulk_guile_trigger_walks_the_ladder_in_order() {
        let mut actor = actor(guile_ladder());
        let mut rng = PcgRng::new(1);
        let mut scheduler = ManualScheduler::default();
        let target = TargetProfile::default();
        let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);

        actor.trigger_buff(BuffScope::Actor, BuffKind::BanditsGuile, 12, None, None, &mut env);

        let now = env.now();
        assert!(!actor.buffs().up(BuffKind::ShallowInsight, now));
        assert!(!actor.buffs().up(BuffKind::ModerateInsight, now));
        assert!(actor.buffs().up(BuffKind::DeepInsight, now));
        assert_eq!(actor.telemetry().expirations(BuffKind::ShallowInsight), 1);
        assert_eq!(actor.telemetry().expirations(BuffKind::ModerateInsight), 1);
    }

    #[test]
    fn retrigger_cancels_the_previous_expiry() {
        let mut actor = actor(guile_ladder());
        let mut rng = PcgRng::new(1);
        let mut scheduler = ManualScheduler::default();
        let target = TargetProfile::default();
        let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);

        actor.trigger_buff(BuffScope::Actor, BuffKind::BanditsGuile, 1, None, None, &mut env);
        actor.trigger_buff(BuffScope::Actor, BuffKind::BanditsGuile, 1, None, None, &mut env);

        assert_eq!(actor.live_timers(), 1);
    }

    #[test]
    fn dependent_expiry_chains_once() {
        let mut actor = actor(guile_ladder());
        let mut rng = PcgRng::new(1);
        let mut scheduler = ManualScheduler::default();
        let target = TargetProfile::default();
        let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);

        actor.trigger_buff(BuffScope::Actor, BuffKind::ShadowsOfTheDestroyer, 40, None, None, &mut env);
        actor.trigger_buff(BuffScope::Actor, BuffKind::FuryOfTheDestroyer, 1, None, None, &mut env);

        assert!(actor.expire_buff(BuffScope::Actor, BuffKind::FuryOfTheDestroyer));
        assert!(!actor.buffs().up(BuffKind::ShadowsOfTheDestroyer, env.now()));
        assert!(!actor.expire_buff(BuffScope::Actor, BuffKind::FuryOfTheDestroyer));
        assert_eq!(actor.telemetry().expirations(BuffKind::ShadowsOfTheDestroyer), 1);
    }

    #[test]
    fn expiry_event_takes_the_buff_down() {
        let mut actor = actor(guile_ladder());
        let mut rng = PcgRng::new(1);
        let mut scheduler = ManualScheduler::default();
        let target = TargetProfile::default();

        {
            let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);
            actor.trigger_buff(BuffScope::Actor, BuffKind::FuryOfTheDestroyer, 1, None, None, &mut env);
        }
        let (at, event) = scheduler.pop().unwrap();
        assert_eq!(at, Tick::from_secs(6));

        let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);
        actor.on_timer(event.timer, &mut env).unwrap();
        assert_eq!(actor.telemetry().expirations(BuffKind::FuryOfTheDestroyer), 1);
        assert_eq!(actor.live_timers(), 0);
    }
}
