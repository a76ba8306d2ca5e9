//! The cast pipeline: consume, damage, impact, and periodic ticks.
//!
//! # Stage order
//!
//! 1. stealth break for harmful abilities
//! 2. pre-execute hook
//! 3. combo point snapshot
//! 4. outcome roll
//! 5. consume (energy or refund, then spend on connect)
//! 6. damage from the snapshot
//! 7. impact, now or after the travel time
//! 8. execute rules on connect
//! 9. post-execute hook
//! 10. cooldown and global cooldown
//!
//! Nested casts (sub-strikes, poisons, procs) run the same pipeline from
//! inside a hook or rule. Readiness is only checked for driver-chosen casts.

use std::sync::Arc;

use tracing::debug;

use crate::action::{
    AbilityFlags, AbilityKind, AbilitySpec, CastReport, CastState, Checkpoint, DirectDamage,
    TickDamage,
};
use crate::combat::{HitRequest, HitResult, apply_result};
use crate::engine::{RogueActor, target_entry};
use crate::env::SimEnv;
use crate::state::{ActorId, BuffKind, BuffScope, CooldownKind, DotState, TimerPurpose};
use crate::telemetry::GainSource;

impl RogueActor {
    /// Runs one cast of `kind` without readiness checks.
    ///
    /// Returns `None` for abilities this actor has no data for or that were
    /// disabled at construction.
    pub(crate) fn run_cast(
        &mut self,
        kind: AbilityKind,
        target: ActorId,
        env: &mut SimEnv<'_>,
    ) -> Option<CastReport> {
        let spec = self.castable(kind)?;
        let now = env.now();

        if spec.has(AbilityFlags::HARMFUL) {
            self.break_stealth(env);
        }
        self.pre_execute(&spec, target, env);

        let combo_points = self.combo_points(target);
        let result = self.roll_outcome(&spec, target, false, env);
        let mut cast = CastState {
            ability: kind,
            target,
            combo_points,
            result,
            direct_damage: 0.0,
            tick_damage: 0.0,
            resource_consumed: 0.0,
        };

        let refunded = self.consume(&spec, &mut cast, env);
        cast.direct_damage = self.direct_damage(&spec, &cast, env);
        cast.tick_damage = self.tick_damage(&spec, &cast, now);

        let impact_at = if spec.travel_time.is_zero() {
            self.impact(cast.clone(), env);
            None
        } else {
            let purpose = TimerPurpose::Impact(Box::new(cast.clone()));
            self.schedule(spec.travel_time, purpose, env);
            Some(now + spec.travel_time)
        };

        if cast.landed() {
            self.run_rules(Checkpoint::Execute, &cast, &spec, env);
        }
        self.post_execute(&spec, &cast, env);

        if let Some(cooldown) = spec.cooldown {
            self.cooldowns.start(cooldown.kind, now, cooldown.duration);
        }
        if spec.has(AbilityFlags::TRIGGERS_GCD) {
            self.cooldowns
                .start(CooldownKind::Global, now, self.config.global_cooldown);
        }

        debug!(
            actor = %self.id,
            ability = %kind,
            result = %cast.result,
            combo_points,
            damage = cast.direct_damage,
            "cast resolved"
        );

        Some(CastReport {
            ability: kind,
            target,
            result: cast.result,
            combo_points,
            energy_spent: cast.resource_consumed,
            energy_refunded: refunded,
            damage: if impact_at.is_none() {
                cast.direct_damage
            } else {
                0.0
            },
            impact_at,
        })
    }

    /// Harmful actions drop Stealth and Vanish. Leaving stealth starts
    /// Master of Subtlety.
    fn break_stealth(&mut self, env: &mut SimEnv<'_>) {
        let stealth = self.expire_buff(BuffScope::Actor, BuffKind::Stealthed);
        let vanish = self.expire_buff(BuffScope::Actor, BuffKind::Vanish);
        if stealth || vanish {
            self.trigger_buff(BuffScope::Actor, BuffKind::MasterOfSubtlety, 1, None, None, env);
        }
    }

    /// Outcome of a direct hit or a periodic tick.
    ///
    /// Requests with no possible outcome besides a plain hit never reach the
    /// resolver and consume no randomness.
    pub(crate) fn roll_outcome(
        &self,
        spec: &AbilitySpec,
        target: ActorId,
        periodic: bool,
        env: &mut SimEnv<'_>,
    ) -> HitResult {
        let dual_wield_penalty = if spec.kind.is_auto_attack() && self.stats.off_hand.is_some() {
            self.config.dual_wield_hit_penalty
        } else {
            0.0
        };
        let request = HitRequest {
            actor: self.id,
            target,
            ability: spec.kind,
            flags: spec.flags,
            periodic,
            crit_chance: self.crit_chance(),
            hit_chance: self.stats.hit - dual_wield_penalty,
            expertise: self.stats.expertise,
            position: self.stats.position,
        };
        if request.is_certain() {
            return HitResult::Hit;
        }
        env.hits.resolve(&request, &mut *env.rng)
    }

    /// Takes the cost, then either refunds part of it or spends combo points.
    ///
    /// Returns the refunded energy.
    fn consume(&mut self, spec: &AbilitySpec, cast: &mut CastState, env: &mut SimEnv<'_>) -> f64 {
        let now = env.now();
        let cost = self.cost(spec, now);
        self.energy.spend(cost);
        cast.resource_consumed = cost;

        if cast.result.is_avoided() {
            if cost <= 0.0 {
                return 0.0;
            }
            let refund = cost * self.config.energy_refund_fraction;
            return self
                .energy
                .gain(refund, GainSource::EnergyRefund, &mut self.telemetry);
        }

        self.run_rules(Checkpoint::Consume, cast, spec, env);
        if spec.is_finisher() {
            let overflow = self.buffs.up(BuffKind::FuryOfTheDestroyer, now);
            let regrant = self.config.overflow_regrant;
            let data = target_entry(&mut self.targets, &self.debuff_defs, cast.target);
            data.combo_points.spend(spec.kind.tag(), &mut self.telemetry);
            if overflow {
                data.combo_points
                    .add(regrant, "legendary_daggers", &mut self.telemetry);
            }
        }
        0.0
    }

    /// Resolves a landed or failed cast on its target.
    pub(crate) fn impact(&mut self, cast: CastState, env: &mut SimEnv<'_>) {
        let Some(spec) = self.abilities.get(&cast.ability).map(Arc::clone) else {
            return;
        };
        if !cast.landed() {
            self.telemetry.record_miss(cast.ability);
            return;
        }
        if spec.direct != DirectDamage::None {
            self.telemetry
                .record_damage(cast.ability, cast.direct_damage, cast.result.is_crit());
        }

        self.run_rules(Checkpoint::Impact, &cast, &spec, env);
        if cast.result.is_crit() {
            self.run_rules(Checkpoint::ImpactCrit, &cast, &spec, env);
        }
        self.on_impact(&spec, &cast, env);

        if spec.periodic.is_some() {
            self.start_dot(&spec, &cast, env);
        }
        if spec.adds_combo_points > 0 {
            self.add_combo_points(cast.target, spec.adds_combo_points, cast.ability.tag());
        }
    }

    /// Applies or refreshes the periodic effect of `spec`.
    ///
    /// A refresh cancels the running tick timer, so the previous application
    /// never ticks again.
    fn start_dot(&mut self, spec: &AbilitySpec, cast: &CastState, env: &mut SimEnv<'_>) {
        let Some(periodic) = spec.periodic else {
            return;
        };
        let num_ticks = periodic.ticks.resolve(cast.combo_points);
        if num_ticks == 0 {
            return;
        }

        let previous = self.target_mut(cast.target).end_dot(spec.kind);
        if let Some(timer) = previous.and_then(|dot| dot.timer) {
            self.timers.cancel(timer);
        }

        let Some(handle) = self.schedule(
            periodic.tick_time,
            TimerPurpose::DotTick {
                target: cast.target,
                ability: spec.kind,
            },
            env,
        ) else {
            return;
        };
        self.target_mut(cast.target).start_dot(
            spec.kind,
            DotState {
                current_tick: 0,
                num_ticks,
                tick_time: periodic.tick_time,
                tick_damage: cast.tick_damage,
                combo_points: cast.combo_points,
                timer: Some(handle),
            },
        );
        debug!(
            actor = %self.id,
            ability = %spec.kind,
            ticks = num_ticks,
            refresh = previous.is_some(),
            "periodic applied"
        );

        if let Some(buff) = periodic.dependent_buff {
            self.trigger_buff(BuffScope::Actor, buff, 1, None, None, env);
        }
    }

    /// One tick of a running periodic effect.
    pub(crate) fn dot_tick(&mut self, target: ActorId, ability: AbilityKind, env: &mut SimEnv<'_>) {
        let Some(spec) = self.abilities.get(&ability).map(Arc::clone) else {
            return;
        };
        let Some(periodic) = spec.periodic else {
            return;
        };
        let Some(dot) = self.target_mut(target).dot_mut(ability) else {
            return;
        };
        dot.current_tick += 1;
        dot.timer = None;
        let state = *dot;

        let result = self.roll_outcome(&spec, target, true, env);
        let damage = apply_result(state.tick_damage, result);
        if periodic.damage != TickDamage::None {
            self.telemetry.record_tick(ability, damage, result.is_crit());
        }

        let cast = CastState {
            ability,
            target,
            combo_points: state.combo_points,
            result,
            direct_damage: damage,
            tick_damage: state.tick_damage,
            resource_consumed: 0.0,
        };
        self.run_rules(Checkpoint::Tick, &cast, &spec, env);
        if result.is_crit() {
            self.run_rules(Checkpoint::TickCrit, &cast, &spec, env);
        }
        self.on_tick(&spec, &cast, env);

        // a hook or rule may have reapplied the effect in the meantime
        let reapplied = self
            .target(target)
            .and_then(|data| data.dot(ability))
            .is_none_or(|dot| dot.timer.is_some());
        if reapplied {
            return;
        }

        if state.is_last_tick() {
            self.target_mut(target).end_dot(ability);
            debug!(actor = %self.id, %ability, "periodic finished");
            if let Some(buff) = periodic.dependent_buff {
                self.expire_buff(BuffScope::Actor, buff);
            }
        } else {
            let handle = self.schedule(
                state.tick_time,
                TimerPurpose::DotTick { target, ability },
                env,
            );
            match handle {
                Some(handle) => {
                    if let Some(dot) = self.target_mut(target).dot_mut(ability) {
                        dot.timer = Some(handle);
                    }
                }
                None => {
                    self.target_mut(target).end_dot(ability);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{PeriodicSpec, School, TickCount};
    use crate::config::RogueConfig;
    use crate::engine::{LethalPoison, RogueProfile, Specialization};
    use crate::env::{AlwaysHit, PcgRng, Scheduler, SpellBook, TargetProfile};
    use crate::state::{BuffDef, Tick};
    use crate::stats::{ActorStats, Weapon, WeaponKind, WeaponSlot};
    use crate::telemetry::ProcKind;
    use crate::test_utils::{FixedResult, ManualScheduler};

    fn plain_profile(specialization: Specialization) -> RogueProfile {
        let mut profile = RogueProfile::new(specialization);
        profile.lethal_poison = LethalPoison::None;
        profile
    }

    fn actor(profile: RogueProfile, book: &SpellBook) -> RogueActor {
        RogueActor::new(ActorId(0), RogueConfig::default(), profile, ActorStats::default(), book)
    }

    fn unarmored() -> TargetProfile {
        TargetProfile {
            armor: 0.0,
            ..TargetProfile::default()
        }
    }

    fn eviscerate(travel_time: Tick) -> AbilitySpec {
        AbilitySpec::new(AbilityKind::Eviscerate)
            .with_cost(35.0)
            .with_flags(AbilityFlags::FINISHER)
            .with_school(School::Nature)
            .with_travel_time(travel_time)
            .with_direct(DirectDamage::ComboRanks {
                ranks: [100.0, 200.0, 300.0, 400.0, 500.0],
                ap_per_point: 0.0,
            })
    }

    #[test]
    fn avoided_strike_refunds_eighty_percent() {
        let book = SpellBook::new(
            [AbilitySpec::new(AbilityKind::SinisterStrike)
                .with_cost(40.0)
                .with_combo_points(1)
                .with_flags(AbilityFlags::MELEE_SPECIAL)
                .with_weapon(WeaponSlot::MainHand)],
            [],
        );
        let mut actor = actor(plain_profile(Specialization::Combat), &book);
        let mut rng = PcgRng::new(0);
        let mut scheduler = ManualScheduler::default();
        let target = unarmored();
        let hits = FixedResult(HitResult::Dodge);
        let mut env = SimEnv::new(&mut rng, &mut scheduler, &hits, &target);

        let report = actor
            .execute(AbilityKind::SinisterStrike, ActorId::PRIMARY_TARGET, &mut env)
            .unwrap();

        assert_eq!(report.energy_spent, 40.0);
        assert!((report.energy_refunded - 32.0).abs() < 1e-9);
        assert!((actor.energy().current() - 92.0).abs() < 1e-9);
        assert_eq!(actor.combo_points(ActorId::PRIMARY_TARGET), 0);
        assert_eq!(actor.telemetry().damage(AbilityKind::SinisterStrike).misses, 1);
    }

    #[test]
    fn missed_finisher_keeps_its_points() {
        let book = SpellBook::new([eviscerate(Tick::ZERO)], []);
        let mut actor = actor(plain_profile(Specialization::Subtlety), &book);
        actor.add_combo_points(ActorId::PRIMARY_TARGET, 3, "test");
        let mut rng = PcgRng::new(0);
        let mut scheduler = ManualScheduler::default();
        let target = unarmored();
        let hits = FixedResult(HitResult::Miss);
        let mut env = SimEnv::new(&mut rng, &mut scheduler, &hits, &target);

        actor
            .execute(AbilityKind::Eviscerate, ActorId::PRIMARY_TARGET, &mut env)
            .unwrap();
        assert_eq!(actor.combo_points(ActorId::PRIMARY_TARGET), 3);
    }

    #[test]
    fn travelling_finisher_scales_by_the_cast_snapshot() {
        let book = SpellBook::new([eviscerate(Tick::from_millis(500))], []);
        let mut actor = actor(plain_profile(Specialization::Subtlety), &book);
        actor.add_combo_points(ActorId::PRIMARY_TARGET, 3, "test");
        let mut rng = PcgRng::new(0);
        let mut scheduler = ManualScheduler::default();
        let target = unarmored();

        let report = {
            let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);
            actor
                .execute(AbilityKind::Eviscerate, ActorId::PRIMARY_TARGET, &mut env)
                .unwrap()
        };
        assert_eq!(report.combo_points, 3);
        assert_eq!(report.impact_at, Some(Tick::from_millis(500)));
        assert_eq!(actor.combo_points(ActorId::PRIMARY_TARGET), 0);

        // points arriving while the cast travels must not change its damage
        actor.add_combo_points(ActorId::PRIMARY_TARGET, 2, "party_crit");

        let (_, event) = scheduler.pop().unwrap();
        let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);
        actor.on_timer(event.timer, &mut env).unwrap();

        let record = actor.telemetry().damage(AbilityKind::Eviscerate);
        assert_eq!(record.hits, 1);
        assert!((record.total - 300.0).abs() < 1e-9);
        assert_eq!(actor.combo_points(ActorId::PRIMARY_TARGET), 2);
    }

    #[test]
    fn finisher_under_fury_is_regranted_full_points() {
        let book = SpellBook::new(
            [
                AbilitySpec::new(AbilityKind::Backstab)
                    .with_combo_points(1)
                    .with_flags(AbilityFlags::MELEE_SPECIAL),
                eviscerate(Tick::ZERO),
            ],
            [BuffDef::new(BuffKind::FuryOfTheDestroyer).with_duration(Tick::from_secs(6))],
        );
        let mut profile = plain_profile(Specialization::Subtlety);
        profile.legendary = crate::engine::LegendaryStage::Destroyer;
        let mut actor = actor(profile, &book);
        let mut rng = PcgRng::new(0);
        let mut scheduler = ManualScheduler::default();
        let target = unarmored();
        let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);

        for _ in 0..3 {
            actor.run_cast(AbilityKind::Backstab, ActorId::PRIMARY_TARGET, &mut env);
        }
        assert_eq!(actor.combo_points(ActorId::PRIMARY_TARGET), 3);

        actor.trigger_buff(BuffScope::Actor, BuffKind::FuryOfTheDestroyer, 1, None, None, &mut env);
        actor.run_cast(AbilityKind::Eviscerate, ActorId::PRIMARY_TARGET, &mut env);

        assert_eq!(
            actor.combo_points(ActorId::PRIMARY_TARGET),
            RogueConfig::MAX_COMBO_POINTS
        );
        assert_eq!(actor.telemetry().proc_count(ProcKind::ComboPointsSpent), 3);
    }

    #[test]
    fn simultaneous_generator_crits_proc_seal_fate_once() {
        let strike = |kind, slot| {
            AbilitySpec::new(kind)
                .with_flags(
                    AbilityFlags::BACKGROUND
                        | AbilityFlags::MAY_CRIT
                        | AbilityFlags::HARMFUL
                        | AbilityFlags::SPECIAL,
                )
                .with_weapon(slot)
                .with_parent(AbilityKind::Mutilate)
                .with_direct(DirectDamage::Weapon {
                    multiplier: 1.0,
                    bonus: 0.0,
                })
        };
        let book = SpellBook::new(
            [
                AbilitySpec::new(AbilityKind::Mutilate)
                    .with_cost(55.0)
                    .with_combo_points(2)
                    .with_flags(AbilityFlags::MELEE_SPECIAL.difference(AbilityFlags::MAY_CRIT)),
                strike(AbilityKind::MutilateMainHand, WeaponSlot::MainHand),
                strike(AbilityKind::MutilateOffHand, WeaponSlot::OffHand),
            ],
            [],
        );
        let mut profile = plain_profile(Specialization::Assassination);
        profile.passives.seal_fate = true;
        let mut actor = actor(profile, &book);
        let mut rng = PcgRng::new(3);
        let mut scheduler = ManualScheduler::default();
        let target = unarmored();
        let hits = FixedResult(HitResult::Crit);
        let mut env = SimEnv::new(&mut rng, &mut scheduler, &hits, &target);

        actor
            .execute(AbilityKind::Mutilate, ActorId::PRIMARY_TARGET, &mut env)
            .unwrap();

        assert_eq!(actor.telemetry().proc_count(ProcKind::SealFate), 1);
        assert_eq!(actor.combo_points(ActorId::PRIMARY_TARGET), 3);
        assert_eq!(actor.telemetry().damage(AbilityKind::MutilateOffHand).crits, 1);
    }

    #[test]
    fn recast_before_last_tick_expires_dependent_buff_once() {
        let book = SpellBook::new(
            [AbilitySpec::new(AbilityKind::Recuperate)
                .with_cost(30.0)
                .with_flags(AbilityFlags::REQUIRES_COMBO_POINTS | AbilityFlags::TRIGGERS_GCD)
                .with_periodic(PeriodicSpec {
                    tick_time: Tick::from_secs(3),
                    ticks: TickCount::PerComboPoint {
                        base: 0,
                        per_point: 2,
                    },
                    damage: TickDamage::Flat {
                        base: 10.0,
                        ap_coefficient: 0.0,
                    },
                    dependent_buff: Some(BuffKind::Recuperate),
                })],
            [BuffDef::new(BuffKind::Recuperate)],
        );
        let mut actor = actor(plain_profile(Specialization::Subtlety), &book);
        let mut rng = PcgRng::new(0);
        let mut scheduler = ManualScheduler::default();
        let target = unarmored();
        let primary = ActorId::PRIMARY_TARGET;

        actor.add_combo_points(primary, 1, "test");
        {
            let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);
            actor.execute(AbilityKind::Recuperate, primary, &mut env).unwrap();
        }

        // first tick at 3s, then recast at 4s with the last tick pending
        let (at, event) = scheduler.pop().unwrap();
        assert_eq!(at, Tick::from_secs(3));
        {
            let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);
            actor.on_timer(event.timer, &mut env).unwrap();
        }
        scheduler.advance_to(Tick::from_secs(4));
        actor.add_combo_points(primary, 1, "test");
        {
            let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);
            actor.execute(AbilityKind::Recuperate, primary, &mut env).unwrap();
        }

        while let Some((_, event)) = scheduler.pop() {
            let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);
            actor.on_timer(event.timer, &mut env).unwrap();
        }

        assert_eq!(scheduler.now(), Tick::from_secs(10));
        assert_eq!(actor.telemetry().damage(AbilityKind::Recuperate).ticks, 3);
        assert_eq!(actor.telemetry().expirations(BuffKind::Recuperate), 1);
        assert!(!actor.buffs().up(BuffKind::Recuperate, scheduler.now()));
        assert_eq!(actor.live_timers(), 0);
    }

    #[test]
    fn hemorrhage_bleeds_with_any_main_hand() {
        let book = SpellBook::new(
            [AbilitySpec::new(AbilityKind::Hemorrhage)
                .with_cost(35.0)
                .with_combo_points(1)
                .with_flags(AbilityFlags::MELEE_SPECIAL)
                .with_weapon(WeaponSlot::MainHand)
                .with_direct(DirectDamage::Weapon {
                    multiplier: 1.1,
                    bonus: 0.0,
                })
                .with_periodic(PeriodicSpec {
                    tick_time: Tick::from_secs(3),
                    ticks: TickCount::Fixed(8),
                    damage: TickDamage::FractionOfDirect { fraction: 0.5 },
                    dependent_buff: None,
                })],
            [],
        );
        let sword = Weapon::new(WeaponKind::Sword, 1000.0, 1500.0, Tick::from_millis(2600));
        let stats = ActorStats::default().with_weapons(Some(sword), None);
        let mut actor = RogueActor::new(
            ActorId(0),
            RogueConfig::default(),
            plain_profile(Specialization::Subtlety),
            stats,
            &book,
        );
        let mut rng = PcgRng::new(0);
        let mut scheduler = ManualScheduler::default();
        let target = unarmored();
        let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);

        actor
            .execute(AbilityKind::Hemorrhage, ActorId::PRIMARY_TARGET, &mut env)
            .unwrap();

        assert!(
            actor
                .target(ActorId::PRIMARY_TARGET)
                .is_some_and(|data| data.is_ticking(AbilityKind::Hemorrhage))
        );
        assert_eq!(actor.combo_points(ActorId::PRIMARY_TARGET), 1);
    }
}
