//! The per-actor resolution context.
//!
//! A [`RogueActor`] exclusively owns every table the rogue's mechanics touch:
//! energy, self buffs, cooldowns, the per-opponent records (combo points,
//! debuffs, dots), the timer arena and telemetry. The driver talks to it
//! through a small surface:
//!
//! - [`RogueActor::ready`] / [`RogueActor::execute`] for chosen abilities,
//! - [`RogueActor::on_timer`] when one of its scheduled events fires,
//! - [`RogueActor::regen`], [`RogueActor::available`] and the combat
//!   lifecycle hooks ([`RogueActor::combat_begin`], [`RogueActor::reset`]).
//!
//! Every call takes the external services explicitly through [`SimEnv`].
//! Cross-actor effects are never applied directly; they queue up as
//! [`AllyEffect`] values that the driver drains and hands to the recipient.

mod events;
mod profile;

pub use profile::{
    AssassinsResolve, EnergyProc, LegendaryStage, LethalPoison, Mastery, MasteryKind, Passives,
    RelentlessStrikes, RogueProfile, Specialization, Vitality,
};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use strum::IntoEnumIterator;
use tracing::{debug, warn};

use crate::action::{
    AbilityKind, AbilitySpec, CastReport, EquipmentRequirement, TriggerRegistry, Unavailable,
};
use crate::config::RogueConfig;
use crate::env::{RngOracle, SimEnv, SimEvent, SpellOracle};
use crate::error::{ConfigurationError, ErrorContext, ErrorSeverity, InvariantViolation, SimError};
use crate::state::{
    ActorId, BuffDef, BuffKind, BuffScope, BuffTable, BuffTrigger, CooldownTable, PointGain,
    TargetData, Tick, TimerArena, TimerHandle, TimerPurpose,
};
use crate::stats::{ActorStats, EnergyPool, WeaponSlot};
use crate::telemetry::{GainSource, ProcKind, Telemetry};

/// A buff the rogue grants to another actor.
///
/// The recipient applies it to its own table with [`AllyEffect::apply`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllyEffect {
    pub source: ActorId,
    pub recipient: ActorId,
    pub buff: BuffKind,
    pub value: f64,
    pub duration: Tick,
}

impl AllyEffect {
    /// Applies the effect unless the recipient already holds at least as much
    /// of it.
    pub fn apply(
        &self,
        table: &mut BuffTable,
        now: Tick,
        rng: &mut dyn RngOracle,
    ) -> Option<BuffTrigger> {
        if table.remains(self.buff, now) >= self.duration {
            return None;
        }
        table.trigger(self.buff, 1, Some(self.value), Some(self.duration), now, rng)
    }
}

/// Errors surfaced by [`RogueActor::execute`] and [`RogueActor::on_timer`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ExecuteError {
    #[error("{ability} is not ready: {reason}")]
    NotReady {
        ability: AbilityKind,
        reason: Unavailable,
    },

    #[error("invariant violated: {violation}")]
    Invariant {
        violation: InvariantViolation,
        context: ErrorContext,
    },
}

impl SimError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotReady { reason, .. } => reason.severity(),
            Self::Invariant { .. } => ErrorSeverity::Fatal,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::NotReady { .. } => None,
            Self::Invariant { context, .. } => Some(context),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotReady { reason, .. } => reason.error_code(),
            Self::Invariant { violation, .. } => violation.error_code(),
        }
    }
}

pub struct RogueActor {
    pub(crate) id: ActorId,
    pub(crate) config: RogueConfig,
    pub(crate) profile: RogueProfile,
    pub(crate) stats: ActorStats,
    pub(crate) primary_target: ActorId,

    pub(crate) energy: EnergyPool,
    pub(crate) buffs: BuffTable,
    pub(crate) cooldowns: CooldownTable,
    pub(crate) targets: BTreeMap<ActorId, TargetData>,
    pub(crate) debuff_defs: Vec<BuffDef>,
    pub(crate) timers: TimerArena,

    pub(crate) abilities: BTreeMap<AbilityKind, Arc<AbilitySpec>>,
    pub(crate) disabled: BTreeSet<AbilityKind>,
    pub(crate) triggers: TriggerRegistry,

    pub(crate) telemetry: Telemetry,
    pub(crate) outbox: Vec<AllyEffect>,
    pub(crate) pending_violation: Option<InvariantViolation>,
    pub(crate) stealth_used: bool,
    pub(crate) swinging: bool,
}

impl RogueActor {
    /// Energy per second before haste and passives.
    pub const BASE_ENERGY_REGEN: f64 = 10.0;

    /// Builds the actor from static data.
    ///
    /// Abilities whose equipment requirement cannot be met are disabled for
    /// the whole run; each one leaves a [`ConfigurationError`] in telemetry.
    pub fn new(
        id: ActorId,
        config: RogueConfig,
        profile: RogueProfile,
        stats: ActorStats,
        spells: &dyn SpellOracle,
    ) -> Self {
        let mut telemetry = Telemetry::new();

        let mut abilities = BTreeMap::new();
        let mut disabled = BTreeSet::new();
        for kind in AbilityKind::iter() {
            let Some(spec) = spells.ability(kind) else {
                continue;
            };
            if let Some(requirement) = spec.requirement()
                && !meets(&stats, requirement)
            {
                let error = ConfigurationError::MissingEquipment {
                    ability: kind,
                    requirement,
                };
                warn!(actor = %id, %error, "ability disabled");
                telemetry.record_diagnostic(error);
                disabled.insert(kind);
            }
            abilities.insert(kind, Arc::new(spec.clone()));
        }

        for kind in required_procs(&profile) {
            if !abilities.contains_key(&kind) {
                let error = ConfigurationError::MissingSpellData { ability: kind };
                warn!(actor = %id, %error, "talented proc has no spell data");
                telemetry.record_diagnostic(error);
            }
        }

        let mut self_defs = Vec::new();
        let mut debuff_defs = Vec::new();
        for kind in BuffKind::iter() {
            let def = match spells.buff(kind) {
                Some(def) => def.clone(),
                None => {
                    let error = ConfigurationError::MissingAuraData { buff: kind };
                    debug!(actor = %id, %error, "using default aura");
                    telemetry.record_diagnostic(error);
                    BuffDef::new(kind)
                }
            };
            let def = tune_buff(def, &profile);
            if kind.is_debuff() {
                debuff_defs.push(def);
            } else {
                self_defs.push(def);
            }
        }

        let max_energy = EnergyPool::DEFAULT_MAX
            + profile
                .passives
                .assassins_resolve
                .map_or(0.0, |resolve| resolve.max_energy);

        let triggers = TriggerRegistry::for_profile(&profile);

        Self {
            id,
            config,
            profile,
            stats,
            primary_target: ActorId::PRIMARY_TARGET,
            energy: EnergyPool::new(max_energy),
            buffs: BuffTable::new(self_defs),
            cooldowns: CooldownTable::new(),
            targets: BTreeMap::new(),
            debuff_defs,
            timers: TimerArena::new(),
            abilities,
            disabled,
            triggers,
            telemetry,
            outbox: Vec::new(),
            pending_violation: None,
            stealth_used: false,
            swinging: false,
        }
    }

    #[must_use]
    pub fn with_primary_target(mut self, target: ActorId) -> Self {
        self.primary_target = target;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn config(&self) -> &RogueConfig {
        &self.config
    }

    pub fn profile(&self) -> &RogueProfile {
        &self.profile
    }

    pub fn stats(&self) -> &ActorStats {
        &self.stats
    }

    pub fn primary_target(&self) -> ActorId {
        self.primary_target
    }

    pub fn energy(&self) -> &EnergyPool {
        &self.energy
    }

    pub fn energy_mut(&mut self) -> &mut EnergyPool {
        &mut self.energy
    }

    pub fn buffs(&self) -> &BuffTable {
        &self.buffs
    }

    pub fn cooldowns(&self) -> &CooldownTable {
        &self.cooldowns
    }

    pub fn cooldowns_mut(&mut self) -> &mut CooldownTable {
        &mut self.cooldowns
    }

    pub fn target(&self, target: ActorId) -> Option<&TargetData> {
        self.targets.get(&target)
    }

    /// Combo points held on `target`; zero for an opponent never referenced.
    pub fn combo_points(&self, target: ActorId) -> u8 {
        self.targets
            .get(&target)
            .map_or(0, |data| data.combo_points.peek())
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn spec(&self, kind: AbilityKind) -> Option<&AbilitySpec> {
        self.abilities.get(&kind).map(Arc::as_ref)
    }

    pub fn is_disabled(&self, kind: AbilityKind) -> bool {
        self.disabled.contains(&kind)
    }

    pub fn triggers(&self) -> &TriggerRegistry {
        &self.triggers
    }

    pub fn live_timers(&self) -> usize {
        self.timers.live_count()
    }

    // ========================================================================
    // Driver surface
    // ========================================================================

    /// Runs a chosen ability through the full pipeline.
    ///
    /// Fails with [`ExecuteError::NotReady`] when `ready()` would answer
    /// false, and with [`ExecuteError::Invariant`] when the resolution left
    /// the actor in an impossible state.
    pub fn execute(
        &mut self,
        kind: AbilityKind,
        target: ActorId,
        env: &mut SimEnv<'_>,
    ) -> Result<CastReport, ExecuteError> {
        self.readiness(kind, target, env)
            .map_err(|reason| ExecuteError::NotReady { ability: kind, reason })?;

        let report = self
            .run_cast(kind, target, env)
            .ok_or(ExecuteError::NotReady {
                ability: kind,
                reason: Unavailable::Unknown,
            })?;
        self.post_validate(Some(kind), env.now())?;
        Ok(report)
    }

    /// Adds combo points to `target` from an outside source.
    pub fn add_combo_points(
        &mut self,
        target: ActorId,
        amount: u8,
        source: &'static str,
    ) -> PointGain {
        let data = target_entry(&mut self.targets, &self.debuff_defs, target);
        data.combo_points.add(amount, source, &mut self.telemetry)
    }

    /// Energy regeneration over `periodicity`.
    pub fn regen(&mut self, periodicity: Tick, now: Tick) {
        let seconds = periodicity.as_secs_f64();
        if seconds <= 0.0 {
            return;
        }
        let base = self.energy_regen_per_second() * seconds;
        self.energy.gain(base, GainSource::Regen, &mut self.telemetry);

        if self.buffs.up(BuffKind::AdrenalineRush, now) {
            self.energy
                .gain(base, GainSource::AdrenalineRush, &mut self.telemetry);
        }

        if let Some(per_second) = self.profile.passives.energetic_recovery
            && self.buffs.up(BuffKind::SliceAndDice, now)
        {
            self.energy.gain(
                per_second * seconds,
                GainSource::EnergeticRecovery,
                &mut self.telemetry,
            );
        }
    }

    pub fn energy_regen_per_second(&self) -> f64 {
        let vitality = self
            .profile
            .passives
            .vitality
            .map_or(0.0, |vitality| vitality.regen_multiplier);
        Self::BASE_ENERGY_REGEN * self.stats.haste_factor() * (1.0 + vitality)
    }

    /// Delay until the actor wants to make its next decision.
    pub fn available(&self) -> Tick {
        let threshold = self.config.available_energy_threshold;
        let current = self.energy.current();
        if current > threshold {
            return self.config.min_available_delay;
        }
        let wait = Tick::from_secs_f64((threshold - current) / self.energy_regen_per_second());
        wait.max(self.config.min_available_delay)
    }

    /// Starts combat: arms the virtual party-crit source when configured.
    pub fn combat_begin(&mut self, env: &mut SimEnv<'_>) {
        if self.profile.passives.honor_among_thieves.is_some()
            && !self.config.virtual_hat_interval.is_zero()
        {
            self.schedule_virtual_hat(env);
        }
    }

    /// Starts both swing timers. A no-op while already swinging.
    pub fn start_auto_attack(&mut self, env: &mut SimEnv<'_>) {
        if self.swinging || self.stats.main_hand.is_none() {
            return;
        }
        self.swinging = true;
        self.schedule_swing(WeaponSlot::MainHand, Tick::from_millis(10), env);
        if self.stats.off_hand.is_some() {
            let first = self.swing_time(WeaponSlot::OffHand, env.now()).scale(0.5);
            self.schedule_swing(WeaponSlot::OffHand, first, env);
        }
    }

    /// Global listener for a party member's critical strike.
    pub fn on_party_crit(&mut self, donor: ActorId, env: &mut SimEnv<'_>) {
        if self.profile.passives.honor_among_thieves.is_none() {
            return;
        }
        debug!(actor = %self.id, %donor, "party crit");
        self.telemetry.record_proc(ProcKind::HonorAmongThievesDonor, 1);
        self.grant_honor_among_thieves(env);
    }

    /// Hands queued cross-actor effects to the driver.
    pub fn drain_ally_effects(&mut self) -> Vec<AllyEffect> {
        std::mem::take(&mut self.outbox)
    }

    /// Combat reset: clears every table and invalidates every outstanding
    /// timer. Telemetry is kept.
    pub fn reset(&mut self) {
        self.energy.refill();
        self.buffs.clear();
        self.cooldowns.clear();
        self.targets.clear();
        self.timers.clear();
        self.outbox.clear();
        self.pending_violation = None;
        self.stealth_used = false;
        self.swinging = false;
        debug!(actor = %self.id, "combat reset");
    }

    /// Checks every table invariant.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if let Some(violation) = &self.pending_violation {
            return Err(violation.clone());
        }
        self.energy.validate()?;
        self.buffs.validate()?;
        for data in self.targets.values() {
            data.combo_points.validate()?;
            data.debuffs.validate()?;
        }
        Ok(())
    }

    pub(crate) fn post_validate(
        &self,
        ability: Option<AbilityKind>,
        now: Tick,
    ) -> Result<(), ExecuteError> {
        self.validate().map_err(|violation| {
            let mut context = ErrorContext::new(now).with_actor(self.id);
            if let Some(ability) = ability {
                context = context.with_ability(ability);
            }
            ExecuteError::Invariant { violation, context }
        })
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Spec for a cast the pipeline may run, skipping unknown and disabled
    /// abilities.
    pub(crate) fn castable(&self, kind: AbilityKind) -> Option<Arc<AbilitySpec>> {
        if self.disabled.contains(&kind) {
            return None;
        }
        self.abilities.get(&kind).cloned()
    }

    pub(crate) fn target_mut(&mut self, target: ActorId) -> &mut TargetData {
        target_entry(&mut self.targets, &self.debuff_defs, target)
    }

    pub(crate) fn table(&self, scope: BuffScope) -> Option<&BuffTable> {
        match scope {
            BuffScope::Actor => Some(&self.buffs),
            BuffScope::Target(id) => self.targets.get(&id).map(|data| &data.debuffs),
        }
    }

    pub(crate) fn table_mut(&mut self, scope: BuffScope) -> &mut BuffTable {
        match scope {
            BuffScope::Actor => &mut self.buffs,
            BuffScope::Target(id) => {
                &mut target_entry(&mut self.targets, &self.debuff_defs, id).debuffs
            }
        }
    }

    /// Arms a timer slot and hands its event to the scheduler.
    ///
    /// Returns `None`, dropping the event, when the arena has no index left.
    pub(crate) fn schedule(
        &mut self,
        delay: Tick,
        purpose: TimerPurpose,
        env: &mut SimEnv<'_>,
    ) -> Option<TimerHandle> {
        let Some(handle) = self.timers.arm(purpose) else {
            warn!(actor = %self.id, "timer slots exhausted, event dropped");
            return None;
        };
        env.scheduler.schedule(
            delay,
            SimEvent {
                actor: self.id,
                timer: handle,
            },
        );
        Some(handle)
    }
}

/// Lazily creates the per-opponent record.
pub(crate) fn target_entry<'a>(
    targets: &'a mut BTreeMap<ActorId, TargetData>,
    debuff_defs: &[BuffDef],
    target: ActorId,
) -> &'a mut TargetData {
    targets
        .entry(target)
        .or_insert_with(|| TargetData::new(debuff_defs.iter().cloned()))
}

fn meets(stats: &ActorStats, requirement: EquipmentRequirement) -> bool {
    match requirement {
        EquipmentRequirement::MainHandWeapon => stats.main_hand.is_some(),
        EquipmentRequirement::MainHandDagger => stats.main_hand.is_some_and(|w| w.is_dagger()),
        EquipmentRequirement::DualDaggers => stats.has_dual_daggers(),
        EquipmentRequirement::OffHandWeapon => stats.off_hand.is_some(),
    }
}

/// Background casts that talented rules will try to run.
fn required_procs(profile: &RogueProfile) -> Vec<AbilityKind> {
    let passives = &profile.passives;
    let mut kinds = Vec::new();
    if matches!(passives.mastery, Some(mastery) if mastery.kind == MasteryKind::MainGauche) {
        kinds.push(AbilityKind::MainGauche);
    }
    if passives.venomous_wounds.is_some() {
        kinds.push(AbilityKind::VenomousWound);
    }
    match profile.lethal_poison {
        LethalPoison::Deadly => {
            kinds.push(AbilityKind::DeadlyPoison);
            kinds.push(AbilityKind::DeadlyPoisonInstant);
        }
        LethalPoison::Wound => kinds.push(AbilityKind::WoundPoison),
        LethalPoison::None => {}
    }
    kinds
}

/// Adjusts static aura data to the build: untalented buffs become inert and
/// set bonuses extend durations.
fn tune_buff(mut def: BuffDef, profile: &RogueProfile) -> BuffDef {
    let passives = &profile.passives;
    let unlocked = |stage: LegendaryStage| profile.legendary >= stage;
    let enabled = match def.kind {
        BuffKind::Blindside => {
            def.chance = passives.blindside.unwrap_or(0.0);
            return def;
        }
        BuffKind::MasterOfSubtlety => passives.master_of_subtlety,
        BuffKind::FindWeakness => passives.find_weakness,
        BuffKind::BanditsGuile => passives.bandits_guile,
        BuffKind::Tier13TwoPiece => profile.tier13_2pc,
        BuffKind::Suffering => unlocked(LegendaryStage::Suffering),
        BuffKind::Nightmare => unlocked(LegendaryStage::Nightmare),
        BuffKind::ShadowsOfTheDestroyer | BuffKind::FuryOfTheDestroyer => {
            unlocked(LegendaryStage::Destroyer)
        }
        BuffKind::ShadowDance => {
            if profile.tier13_4pc
                && let Some(duration) = def.duration
            {
                def.duration = Some(duration + profile.tier13_4pc_extension);
            }
            true
        }
        _ => true,
    };
    if !enabled {
        def.chance = 0.0;
    }
    def
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::SpellBook;

    #[test]
    fn ally_effect_skips_recipient_with_longer_buff() {
        let mut rng = crate::env::PcgRng::new(0);
        let mut table = BuffTable::new([BuffDef::new(BuffKind::TricksOfTheTrade)]);
        let effect = AllyEffect {
            source: ActorId(0),
            recipient: ActorId(2),
            buff: BuffKind::TricksOfTheTrade,
            value: 0.15,
            duration: Tick::from_secs(6),
        };

        assert!(effect.apply(&mut table, Tick::ZERO, &mut rng).is_some());
        assert!(effect.apply(&mut table, Tick::from_secs(1), &mut rng).is_none());
        assert_eq!(table.value(BuffKind::TricksOfTheTrade, Tick::ZERO), 0.15);
    }

    #[test]
    fn untalented_buffs_are_inert() {
        let profile = RogueProfile::new(Specialization::Combat);
        let actor = RogueActor::new(
            ActorId(0),
            RogueConfig::default(),
            profile,
            ActorStats::default(),
            &SpellBook::default(),
        );
        assert_eq!(actor.buffs().def(BuffKind::BanditsGuile).map(|def| def.chance), Some(0.0));
        assert_eq!(actor.buffs().def(BuffKind::Blindside).map(|def| def.chance), Some(0.0));
    }

    #[test]
    fn combo_points_default_to_zero_for_unseen_targets() {
        let actor = RogueActor::new(
            ActorId(0),
            RogueConfig::default(),
            RogueProfile::default(),
            ActorStats::default(),
            &SpellBook::default(),
        );
        assert_eq!(actor.combo_points(ActorId(9)), 0);
        assert!(actor.validate().is_ok());
    }
}
