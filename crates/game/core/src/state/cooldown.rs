//! Named timers gating ability and proc availability.

use std::collections::BTreeMap;

use tracing::trace;

use crate::state::Tick;

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
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum CooldownKind {
    Global,
    AdrenalineRush,
    KillingSpree,
    ShadowBlades,
    ShadowDance,
    Shadowstep,
    Vanish,
    Preparation,
    Vendetta,
    TricksOfTheTrade,
    Kick,
    Shiv,
    SealFate,
    HonorAmongThieves,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CooldownEntry {
    ready: Tick,
}

/// Ready timestamps keyed by cooldown name.
///
/// `start` never moves a ready timestamp earlier; only [`CooldownTable::reduce`]
/// and [`CooldownTable::reset`] do. Remaining time saturates at zero.
#[derive(Clone, Debug, Default)]
pub struct CooldownTable {
    entries: BTreeMap<CooldownKind, CooldownEntry>,
}

impl CooldownTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, kind: CooldownKind, now: Tick, duration: Tick) {
        let entry = self.entries.entry(kind).or_default();
        entry.ready = entry.ready.max(now + duration);
        trace!(cooldown = %kind, ready = %entry.ready, "cooldown started");
    }

    pub fn reset(&mut self, kind: CooldownKind) {
        self.entries.remove(&kind);
    }

    /// Shortens the remaining time by `delta`.
    pub fn reduce(&mut self, kind: CooldownKind, delta: Tick) {
        if let Some(entry) = self.entries.get_mut(&kind) {
            entry.ready = entry.ready.saturating_sub(delta);
            trace!(cooldown = %kind, ready = %entry.ready, "cooldown reduced");
        }
    }

    pub fn remains(&self, kind: CooldownKind, now: Tick) -> Tick {
        self.entries
            .get(&kind)
            .map_or(Tick::ZERO, |entry| entry.ready.saturating_sub(now))
    }

    pub fn up(&self, kind: CooldownKind, now: Tick) -> bool {
        self.remains(kind, now).is_zero()
    }

    pub fn ready_at(&self, kind: CooldownKind) -> Tick {
        self.entries.get(&kind).map_or(Tick::ZERO, |entry| entry.ready)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
