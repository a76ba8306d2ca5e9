//! Passive proc rules evaluated at fixed pipeline checkpoints.
//!
//! Rules are registered once per actor from its profile, in declaration
//! order. A rule that is not talented is simply not registered. Every rule
//! re-checks its own guard against the acting ability, so the registry never
//! needs to know which abilities a rule cares about.

use arrayvec::ArrayVec;
use tracing::debug;

use crate::action::{AbilityFlags, AbilityKind, AbilitySpec, CastState};
use crate::config::RogueConfig;
use crate::engine::{AllyEffect, LegendaryStage, LethalPoison, MasteryKind, RogueActor, RogueProfile};
use crate::env::SimEnv;
use crate::state::{BuffKind, BuffScope, CooldownKind, Tick};
use crate::stats::WeaponSlot;
use crate::telemetry::{GainSource, ProcKind};

/// Named points in the pipeline where rules run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Checkpoint {
    /// After the cost is taken, only when the cast connected.
    Consume,
    /// On every connecting impact.
    Impact,
    /// On a critical impact, after the [`Checkpoint::Impact`] rules.
    ImpactCrit,
    /// After impact was resolved or scheduled, only when the cast connected.
    Execute,
    Tick,
    TickCrit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TriggerRule {
    RelentlessStrikes,
    CombatPotency,
    LegendaryDaggers,
    LethalPoison,
    SealFate,
    HonorAmongThieves,
    MainGauche,
    TricksOfTheTrade,
    RestlessBlades,
    VenomousWounds,
}

/// Shadows of the Destroyer stacks needed before Fury can proc.
const FURY_STACK_THRESHOLD: u16 = 30;
const FURY_STACK_CEILING: u16 = 50;

type RuleList = ArrayVec<TriggerRule, { RogueConfig::MAX_RULES_PER_CHECKPOINT }>;

/// Ordered `(checkpoint, rule)` registrations of one actor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriggerRegistry {
    rules: Vec<(Checkpoint, TriggerRule)>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_profile(profile: &RogueProfile) -> Self {
        let passives = &profile.passives;
        let mut registry = Self::new();

        if passives.relentless_strikes.is_some() {
            registry.register(Checkpoint::Consume, TriggerRule::RelentlessStrikes);
        }

        if passives.combat_potency.is_some() {
            registry.register(Checkpoint::Impact, TriggerRule::CombatPotency);
        }
        if profile.legendary != LegendaryStage::None {
            registry.register(Checkpoint::Impact, TriggerRule::LegendaryDaggers);
        }
        if profile.lethal_poison != LethalPoison::None {
            registry.register(Checkpoint::Impact, TriggerRule::LethalPoison);
        }

        if passives.seal_fate {
            registry.register(Checkpoint::ImpactCrit, TriggerRule::SealFate);
        }
        if passives.honor_among_thieves.is_some() {
            registry.register(Checkpoint::ImpactCrit, TriggerRule::HonorAmongThieves);
        }

        if matches!(passives.mastery, Some(mastery) if mastery.kind == MasteryKind::MainGauche) {
            registry.register(Checkpoint::Execute, TriggerRule::MainGauche);
        }
        registry.register(Checkpoint::Execute, TriggerRule::TricksOfTheTrade);
        if passives.restless_blades.is_some() {
            registry.register(Checkpoint::Execute, TriggerRule::RestlessBlades);
        }

        if passives.venomous_wounds.is_some() {
            registry.register(Checkpoint::Tick, TriggerRule::VenomousWounds);
        }
        if passives.honor_among_thieves.is_some() {
            registry.register(Checkpoint::TickCrit, TriggerRule::HonorAmongThieves);
        }

        registry
    }

    pub fn register(&mut self, checkpoint: Checkpoint, rule: TriggerRule) {
        self.rules.push((checkpoint, rule));
    }

    /// Rules of one checkpoint, in declaration order.
    pub fn at(&self, checkpoint: Checkpoint) -> RuleList {
        self.rules
            .iter()
            .filter(|(at, _)| *at == checkpoint)
            .map(|(_, rule)| *rule)
            .take(RogueConfig::MAX_RULES_PER_CHECKPOINT)
            .collect()
    }

    pub fn rules(&self) -> &[(Checkpoint, TriggerRule)] {
        &self.rules
    }
}

// ============================================================================
// Rule evaluation
// ============================================================================

impl RogueActor {
    pub(crate) fn run_rules(
        &mut self,
        checkpoint: Checkpoint,
        cast: &CastState,
        spec: &AbilitySpec,
        env: &mut SimEnv<'_>,
    ) {
        for rule in self.triggers.at(checkpoint) {
            self.apply_rule(checkpoint, rule, cast, spec, env);
        }
    }

    fn apply_rule(
        &mut self,
        checkpoint: Checkpoint,
        rule: TriggerRule,
        cast: &CastState,
        spec: &AbilitySpec,
        env: &mut SimEnv<'_>,
    ) {
        match rule {
            TriggerRule::RelentlessStrikes => self.relentless_strikes(cast, spec, env),
            TriggerRule::CombatPotency => self.combat_potency(spec, env),
            TriggerRule::LegendaryDaggers => self.legendary_daggers(cast, spec, env),
            TriggerRule::LethalPoison => self.lethal_poison(cast, spec, env),
            TriggerRule::SealFate => self.seal_fate(cast, spec, env),
            TriggerRule::HonorAmongThieves => {
                let qualifies = match checkpoint {
                    Checkpoint::TickCrit => true,
                    _ => spec.has(AbilityFlags::SPECIAL) && !spec.has(AbilityFlags::REPEATING),
                };
                if qualifies {
                    self.grant_honor_among_thieves(env);
                }
            }
            TriggerRule::MainGauche => self.main_gauche(cast, spec, env),
            TriggerRule::TricksOfTheTrade => self.tricks_of_the_trade(spec, env),
            TriggerRule::RestlessBlades => self.restless_blades(cast, spec),
            TriggerRule::VenomousWounds => self.venomous_wounds(cast, spec, env),
        }
    }

    fn relentless_strikes(&mut self, cast: &CastState, spec: &AbilitySpec, env: &mut SimEnv<'_>) {
        let Some(relentless) = self.profile.passives.relentless_strikes else {
            return;
        };
        if !spec.is_finisher() {
            return;
        }
        let chance = relentless.chance_per_point * f64::from(cast.combo_points);
        if env.rng.roll(chance) {
            self.energy.gain(
                relentless.energy,
                GainSource::RelentlessStrikes,
                &mut self.telemetry,
            );
        }
    }

    fn combat_potency(&mut self, spec: &AbilitySpec, env: &mut SimEnv<'_>) {
        let Some(potency) = self.profile.passives.combat_potency else {
            return;
        };
        if !matches!(spec.kind, AbilityKind::AutoAttackOffHand | AbilityKind::MainGauche) {
            return;
        }
        if env.rng.roll(potency.chance) {
            self.energy
                .gain(potency.energy, GainSource::CombatPotency, &mut self.telemetry);
        }
    }

    fn legendary_daggers(&mut self, cast: &CastState, spec: &AbilitySpec, env: &mut SimEnv<'_>) {
        if !spec.kind.is_auto_attack() {
            return;
        }
        if !env.rng.roll(self.profile.specialization.legendary_chance()) {
            return;
        }
        self.trigger_buff(BuffScope::Actor, BuffKind::Suffering, 1, None, None, env);
        self.trigger_buff(BuffScope::Actor, BuffKind::Nightmare, 1, None, None, env);

        let now = env.now();
        let stack = self.buffs.stack(BuffKind::ShadowsOfTheDestroyer, now);
        let fury_roll = !self.buffs.up(BuffKind::FuryOfTheDestroyer, now)
            && stack > FURY_STACK_THRESHOLD
            && env
                .rng
                .roll(1.0 / f64::from(FURY_STACK_CEILING.saturating_sub(stack).max(1)));

        if fury_roll {
            debug!(actor = %self.id, stack, "fury of the destroyer");
            self.trigger_buff(BuffScope::Actor, BuffKind::FuryOfTheDestroyer, 1, None, None, env);
            self.add_combo_points(cast.target, self.config.overflow_regrant, "legendary_daggers");
            self.telemetry.record_proc(ProcKind::LegendaryDaggers, 1);
        } else {
            self.trigger_buff(
                BuffScope::Actor,
                BuffKind::ShadowsOfTheDestroyer,
                1,
                None,
                None,
                env,
            );
        }
    }

    fn lethal_poison(&mut self, cast: &CastState, spec: &AbilitySpec, env: &mut SimEnv<'_>) {
        let Some(slot) = spec.weapon else {
            return;
        };
        if spec.is_finisher() {
            return;
        }
        let now = env.now();
        let shiv = self.buffs.up(BuffKind::Shiv, now);

        match self.profile.lethal_poison {
            LethalPoison::Deadly => {
                let passives = &self.profile.passives;
                let chance = if shiv {
                    1.0
                } else {
                    let envenom = if self.buffs.up(BuffKind::Envenom, now) {
                        passives.envenom_poison_bonus.unwrap_or(0.0)
                    } else {
                        0.0
                    };
                    self.profile.deadly_poison_chance
                        + passives.improved_poisons.unwrap_or(0.0)
                        + envenom
                };
                if !env.rng.roll(chance) {
                    return;
                }
                let was_ticking = self
                    .target(cast.target)
                    .is_some_and(|data| data.is_ticking(AbilityKind::DeadlyPoison));
                self.telemetry.record_proc(ProcKind::DeadlyPoison, 1);
                self.run_cast(AbilityKind::DeadlyPoison, cast.target, env);
                if was_ticking {
                    self.run_cast(AbilityKind::DeadlyPoisonInstant, cast.target, env);
                }
            }
            LethalPoison::Wound => {
                let chance = if shiv {
                    1.0
                } else {
                    let speed = self
                        .stats
                        .weapon(slot)
                        .map_or(0.0, |weapon| weapon.swing_time.as_secs_f64());
                    self.profile.wound_poison_ppm * speed / 60.0
                };
                if !env.rng.roll(chance) {
                    return;
                }
                self.telemetry.record_proc(ProcKind::WoundPoison, 1);
                self.run_cast(AbilityKind::WoundPoison, cast.target, env);
            }
            LethalPoison::None => {}
        }
    }

    fn seal_fate(&mut self, cast: &CastState, spec: &AbilitySpec, env: &mut SimEnv<'_>) {
        if !cast.result.is_crit() || spec.has(AbilityFlags::AOE) {
            return;
        }
        let generates = spec.adds_combo_points > 0
            || spec
                .parent
                .and_then(|parent| self.abilities.get(&parent))
                .is_some_and(|parent| parent.adds_combo_points > 0);
        if !generates {
            return;
        }
        let now = env.now();
        if !self.cooldowns.up(CooldownKind::SealFate, now) {
            return;
        }
        self.add_combo_points(cast.target, 1, "seal_fate");
        self.telemetry.record_proc(ProcKind::SealFate, 1);
        self.cooldowns
            .start(CooldownKind::SealFate, now, self.config.seal_fate_icd);
    }

    /// One Honor Among Thieves attempt, gated by its internal cooldown.
    pub(crate) fn grant_honor_among_thieves(&mut self, env: &mut SimEnv<'_>) {
        let Some(chance) = self.profile.passives.honor_among_thieves else {
            return;
        };
        let now = env.now();
        if !self.cooldowns.up(CooldownKind::HonorAmongThieves, now) || !env.rng.roll(chance) {
            return;
        }
        let target = self.primary_target;
        self.add_combo_points(target, 1, "honor_among_thieves");
        self.telemetry.record_proc(ProcKind::HonorAmongThieves, 1);
        self.cooldowns.start(
            CooldownKind::HonorAmongThieves,
            now,
            self.config.honor_among_thieves_icd,
        );
    }

    fn main_gauche(&mut self, cast: &CastState, spec: &AbilitySpec, env: &mut SimEnv<'_>) {
        if spec.has(AbilityFlags::PROC)
            || spec.weapon != Some(WeaponSlot::MainHand)
            || !spec.has(AbilityFlags::MAY_CRIT)
        {
            return;
        }
        let chance = self
            .profile
            .mastery_bonus(MasteryKind::MainGauche, self.stats.mastery);
        if env.rng.roll(chance) {
            self.telemetry.record_proc(ProcKind::MainGauche, 1);
            self.run_cast(AbilityKind::MainGauche, cast.target, env);
        }
    }

    fn tricks_of_the_trade(&mut self, spec: &AbilitySpec, env: &mut SimEnv<'_>) {
        let now = env.now();
        if !spec.has(AbilityFlags::HARMFUL) || !self.buffs.up(BuffKind::TricksTrigger, now) {
            return;
        }
        let Some(recipient) = self.profile.tricks_target else {
            return;
        };
        let (value, duration) = self
            .buffs
            .def(BuffKind::TricksOfTheTrade)
            .map_or((0.0, Tick::ZERO), |def| {
                (def.default_value, def.duration.unwrap_or(Tick::ZERO))
            });
        debug!(actor = %self.id, %recipient, "tricks of the trade handed off");
        self.outbox.push(AllyEffect {
            source: self.id,
            recipient,
            buff: BuffKind::TricksOfTheTrade,
            value,
            duration,
        });
        self.expire_buff(BuffScope::Actor, BuffKind::TricksTrigger);
    }

    fn restless_blades(&mut self, cast: &CastState, spec: &AbilitySpec) {
        let Some(per_point) = self.profile.passives.restless_blades else {
            return;
        };
        if !spec.is_finisher() {
            return;
        }
        let delta = per_point * u32::from(cast.combo_points);
        for kind in [
            CooldownKind::AdrenalineRush,
            CooldownKind::KillingSpree,
            CooldownKind::ShadowBlades,
        ] {
            self.cooldowns.reduce(kind, delta);
        }
    }

    fn venomous_wounds(&mut self, cast: &CastState, spec: &AbilitySpec, env: &mut SimEnv<'_>) {
        let Some(wounds) = self.profile.passives.venomous_wounds else {
            return;
        };
        if !spec.has(AbilityFlags::VENOMOUS_WOUNDS) {
            return;
        }
        let poisoned = self
            .target(cast.target)
            .is_some_and(|data| data.is_poisoned(env.now()));
        if !poisoned || !env.rng.roll(wounds.chance) {
            return;
        }
        self.telemetry.record_proc(ProcKind::VenomousWounds, 1);
        self.run_cast(AbilityKind::VenomousWound, cast.target, env);
        self.energy
            .gain(wounds.energy, GainSource::VenomousWounds, &mut self.telemetry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Specialization;
    use crate::env::{AlwaysHit, PcgRng, SpellBook, TargetProfile};
    use crate::state::ActorId;
    use crate::action::{DirectDamage, PeriodicSpec, TickCount, TickDamage};
    use crate::stats::{ActorStats, WeaponSlot};
    use crate::test_utils::ManualScheduler;

    #[test]
    fn registry_keeps_declaration_order_per_checkpoint() {
        let mut profile = RogueProfile::talented(Specialization::Combat);
        profile.legendary = LegendaryStage::Destroyer;
        let registry = TriggerRegistry::for_profile(&profile);

        assert_eq!(
            registry.at(Checkpoint::Impact).as_slice(),
            &[
                TriggerRule::CombatPotency,
                TriggerRule::LegendaryDaggers,
                TriggerRule::LethalPoison
            ]
        );
        assert_eq!(
            registry.at(Checkpoint::Execute).as_slice(),
            &[
                TriggerRule::MainGauche,
                TriggerRule::TricksOfTheTrade,
                TriggerRule::RestlessBlades
            ]
        );
        assert!(registry.at(Checkpoint::TickCrit).is_empty());
    }

    #[test]
    fn untalented_rules_are_not_registered() {
        let mut profile = RogueProfile::new(Specialization::Subtlety);
        profile.lethal_poison = LethalPoison::None;
        let registry = TriggerRegistry::for_profile(&profile);
        assert_eq!(
            registry.rules(),
            &[(Checkpoint::Execute, TriggerRule::TricksOfTheTrade)]
        );
    }

    #[test]
    fn honor_among_thieves_respects_its_cooldown() {
        let mut actor = RogueActor::new(
            ActorId(0),
            RogueConfig::default(),
            RogueProfile::talented(Specialization::Subtlety),
            ActorStats::default(),
            &SpellBook::default(),
        );
        let mut rng = PcgRng::new(5);
        let mut scheduler = ManualScheduler::default();
        let target = TargetProfile::default();
        let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);

        actor.on_party_crit(ActorId(7), &mut env);
        actor.on_party_crit(ActorId(8), &mut env);

        assert_eq!(actor.combo_points(ActorId::PRIMARY_TARGET), 1);
        assert_eq!(
            actor.telemetry().proc_count(ProcKind::HonorAmongThievesDonor),
            2
        );
        assert_eq!(actor.telemetry().proc_count(ProcKind::HonorAmongThieves), 1);
    }

    #[test]
    fn restless_blades_never_drives_a_cooldown_negative() {
        let mut actor = RogueActor::new(
            ActorId(0),
            RogueConfig::default(),
            RogueProfile::talented(Specialization::Combat),
            ActorStats::default(),
            &SpellBook::default(),
        );
        actor
            .cooldowns_mut()
            .start(CooldownKind::AdrenalineRush, Tick::ZERO, Tick::from_secs(3));
        actor
            .cooldowns_mut()
            .start(CooldownKind::KillingSpree, Tick::ZERO, Tick::from_secs(120));

        let spec = AbilitySpec::new(AbilityKind::Eviscerate).with_flags(AbilityFlags::FINISHER);
        let cast = CastState {
            ability: AbilityKind::Eviscerate,
            target: ActorId::PRIMARY_TARGET,
            combo_points: 5,
            result: crate::combat::HitResult::Hit,
            direct_damage: 0.0,
            tick_damage: 0.0,
            resource_consumed: 35.0,
        };
        actor.restless_blades(&cast, &spec);

        let cooldowns = actor.cooldowns();
        assert_eq!(cooldowns.remains(CooldownKind::AdrenalineRush, Tick::ZERO), Tick::ZERO);
        assert!(cooldowns.up(CooldownKind::AdrenalineRush, Tick::ZERO));
        assert_eq!(
            cooldowns.remains(CooldownKind::KillingSpree, Tick::ZERO),
            Tick::from_secs(110)
        );
    }

    #[test]
    fn main_gauche_strike_applies_the_lethal_poison() {
        let book = SpellBook::new(
            [
                AbilitySpec::new(AbilityKind::MainGauche)
                    .with_flags(
                        AbilityFlags::BACKGROUND
                            | AbilityFlags::PROC
                            | AbilityFlags::HARMFUL
                            | AbilityFlags::SPECIAL,
                    )
                    .with_weapon(WeaponSlot::MainHand)
                    .with_direct(DirectDamage::Weapon {
                        multiplier: 1.0,
                        bonus: 0.0,
                    }),
                AbilitySpec::new(AbilityKind::DeadlyPoison)
                    .with_flags(AbilityFlags::BACKGROUND | AbilityFlags::PROC | AbilityFlags::POISON)
                    .with_periodic(PeriodicSpec {
                        tick_time: Tick::from_secs(3),
                        ticks: TickCount::Fixed(4),
                        damage: TickDamage::Flat {
                            base: 100.0,
                            ap_coefficient: 0.0,
                        },
                        dependent_buff: None,
                    }),
            ],
            [],
        );
        let mut profile = RogueProfile::new(Specialization::Combat);
        profile.lethal_poison = LethalPoison::Deadly;
        profile.deadly_poison_chance = 1.0;
        let mut actor = RogueActor::new(
            ActorId(0),
            RogueConfig::default(),
            profile,
            ActorStats::default(),
            &book,
        );
        let mut rng = PcgRng::new(2);
        let mut scheduler = ManualScheduler::default();
        let target = TargetProfile::default();
        let mut env = SimEnv::new(&mut rng, &mut scheduler, &AlwaysHit, &target);

        actor.run_cast(AbilityKind::MainGauche, ActorId::PRIMARY_TARGET, &mut env);

        assert_eq!(actor.telemetry().proc_count(ProcKind::DeadlyPoison), 1);
        assert!(
            actor
                .target(ActorId::PRIMARY_TARGET)
                .is_some_and(|data| data.is_ticking(AbilityKind::DeadlyPoison))
        );
    }
}
