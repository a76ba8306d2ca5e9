//! Named counters fed by the resolution engine.
//!
//! Telemetry is write-mostly: the engine bumps counters as combo points move,
//! energy is gained, procs fire and damage lands. Drivers read it after an
//! iteration to aggregate throughput statistics. It survives combat resets so
//! that counts accumulate across iterations.

use std::collections::BTreeMap;

use crate::action::AbilityKind;
use crate::error::ConfigurationError;
use crate::state::BuffKind;

/// Every named proc occurrence the engine counts.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ProcKind {
    ComboPoints,
    ComboPointsWasted,
    ComboPointsSpent,
    SealFate,
    MainGauche,
    VenomousWounds,
    HonorAmongThieves,
    HonorAmongThievesDonor,
    DeadlyPoison,
    WoundPoison,
    RevealingStrike,
    LegendaryDaggers,
}

/// Source tag for energy gains.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum GainSource {
    Regen,
    AdrenalineRush,
    CombatPotency,
    EnergeticRecovery,
    EnergyRefund,
    RelentlessStrikes,
    VenomousWounds,
}

/// Accumulated energy for one gain source.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GainRecord {
    pub count: u64,
    pub actual: f64,
    pub overflow: f64,
}

/// Accumulated damage for one ability.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRecord {
    pub hits: u64,
    pub crits: u64,
    pub misses: u64,
    pub ticks: u64,
    pub total: f64,
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Telemetry {
    procs: BTreeMap<ProcKind, u64>,
    gains: BTreeMap<GainSource, GainRecord>,
    damage: BTreeMap<AbilityKind, DamageRecord>,
    expirations: BTreeMap<BuffKind, u64>,
    diagnostics: Vec<ConfigurationError>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_proc(&mut self, kind: ProcKind, count: u64) {
        if count == 0 {
            return;
        }
        *self.procs.entry(kind).or_default() += count;
    }

    pub fn record_gain(&mut self, source: GainSource, actual: f64, overflow: f64) {
        let record = self.gains.entry(source).or_default();
        record.count += 1;
        record.actual += actual;
        record.overflow += overflow;
    }

    pub fn record_damage(&mut self, ability: AbilityKind, amount: f64, crit: bool) {
        let record = self.damage.entry(ability).or_default();
        record.hits += 1;
        if crit {
            record.crits += 1;
        }
        record.total += amount;
    }

    pub fn record_tick(&mut self, ability: AbilityKind, amount: f64, crit: bool) {
        let record = self.damage.entry(ability).or_default();
        record.ticks += 1;
        if crit {
            record.crits += 1;
        }
        record.total += amount;
    }

    pub fn record_miss(&mut self, ability: AbilityKind) {
        self.damage.entry(ability).or_default().misses += 1;
    }

    pub fn record_expiry(&mut self, buff: BuffKind) {
        *self.expirations.entry(buff).or_default() += 1;
    }

    pub fn record_diagnostic(&mut self, error: ConfigurationError) {
        self.diagnostics.push(error);
    }

    pub fn proc_count(&self, kind: ProcKind) -> u64 {
        self.procs.get(&kind).copied().unwrap_or(0)
    }

    pub fn gain(&self, source: GainSource) -> GainRecord {
        self.gains.get(&source).copied().unwrap_or_default()
    }

    pub fn damage(&self, ability: AbilityKind) -> DamageRecord {
        self.damage.get(&ability).copied().unwrap_or_default()
    }

    /// Number of times `buff` went from up to down.
    pub fn expirations(&self, buff: BuffKind) -> u64 {
        self.expirations.get(&buff).copied().unwrap_or(0)
    }

    pub fn total_damage(&self) -> f64 {
        self.damage.values().map(|record| record.total).sum()
    }

    pub fn procs(&self) -> impl Iterator<Item = (ProcKind, u64)> + '_ {
        self.procs.iter().map(|(kind, count)| (*kind, *count))
    }

    pub fn gains(&self) -> impl Iterator<Item = (GainSource, &GainRecord)> {
        self.gains.iter().map(|(source, record)| (*source, record))
    }

    pub fn damage_records(&self) -> impl Iterator<Item = (AbilityKind, &DamageRecord)> {
        self.damage.iter().map(|(kind, record)| (*kind, record))
    }

    pub fn diagnostics(&self) -> &[ConfigurationError] {
        &self.diagnostics
    }
}
