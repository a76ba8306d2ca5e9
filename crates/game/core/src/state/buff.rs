//! Stacking, timed modifiers keyed by name.
//!
//! A [`BuffTable`] holds one [`BuffEntry`] per declared [`BuffDef`]. The table
//! itself is pure bookkeeping: triggering reports which stack thresholds were
//! crossed and when the entry now expires, and expiring reports the dependent
//! buff to clear next. Arming expiry timers and applying tier transitions is
//! left to the owning actor, which has access to the scheduler.
//!
//! Presence checks are time-aware. An entry whose expiry timestamp has passed
//! reads as down even if its expiry event has not been dispatched yet.

use std::collections::BTreeMap;

use arrayvec::ArrayVec;
use tracing::{debug, warn};

use crate::config::RogueConfig;
use crate::env::RngOracle;
use crate::error::InvariantViolation;
use crate::state::{ActorId, Tick, TimerHandle};

/// Every buff and debuff the rogue reads or writes.
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
pub enum BuffKind {
    // ===== actor buffs =====
    AdrenalineRush,
    BanditsGuile,
    Blindside,
    DeepInsight,
    Envenom,
    FuryOfTheDestroyer,
    KillingSpree,
    MasterOfSubtlety,
    ModerateInsight,
    Nightmare,
    Recuperate,
    ShadowDance,
    ShadowsOfTheDestroyer,
    Shadowstep,
    ShallowInsight,
    Shiv,
    SliceAndDice,
    Stealthed,
    Suffering,
    Tier13TwoPiece,
    TricksTrigger,
    Vanish,

    // ===== target debuffs =====
    FindWeakness,
    RevealingStrike,
    Vendetta,
    WoundPoison,

    // ===== granted to an ally =====
    TricksOfTheTrade,
}

impl BuffKind {
    /// Debuffs live in the per-opponent table rather than on the actor.
    pub const fn is_debuff(self) -> bool {
        matches!(
            self,
            Self::FindWeakness | Self::RevealingStrike | Self::Vendetta | Self::WoundPoison
        )
    }
}

/// Which table an entry lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BuffScope {
    Actor,
    Target(ActorId),
}

/// What re-triggering an entry that is already at max stack does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RefreshPolicy {
    /// Restart the duration from now.
    #[default]
    Refresh,
    /// Leave the entry untouched.
    Ignore,
}

/// A stack threshold side effect: on reaching `at_stack`, expire `expires`
/// and trigger `activates`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackTier {
    pub at_stack: u16,
    #[cfg_attr(feature = "serde", serde(default))]
    pub expires: Option<BuffKind>,
    pub activates: BuffKind,
    /// Skip the whole transition while `activates` is already up.
    #[cfg_attr(feature = "serde", serde(default))]
    pub unless_active: bool,
}

/// Static aura parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffDef {
    pub kind: BuffKind,
    #[cfg_attr(feature = "serde", serde(default = "one_stack"))]
    pub max_stack: u16,
    /// `None` lasts until explicitly expired.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Option<Tick>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub default_value: f64,
    #[cfg_attr(feature = "serde", serde(default = "certain"))]
    pub chance: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub refresh: RefreshPolicy,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tiers: ArrayVec<StackTier, { RogueConfig::MAX_TIERS }>,
    /// Buff cleared whenever this one expires.
    #[cfg_attr(feature = "serde", serde(default))]
    pub on_expire: Option<BuffKind>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub agility_per_stack: f64,
}

#[cfg(feature = "serde")]
fn one_stack() -> u16 {
    1
}

#[cfg(feature = "serde")]
fn certain() -> f64 {
    1.0
}

impl BuffDef {
    pub fn new(kind: BuffKind) -> Self {
        Self {
            kind,
            max_stack: 1,
            duration: None,
            default_value: 0.0,
            chance: 1.0,
            refresh: RefreshPolicy::Refresh,
            tiers: ArrayVec::new(),
            on_expire: None,
            agility_per_stack: 0.0,
        }
    }

    #[must_use]
    pub fn with_max_stack(mut self, max_stack: u16) -> Self {
        self.max_stack = max_stack.max(1);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Tick) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.default_value = value;
        self
    }

    #[must_use]
    pub fn with_chance(mut self, chance: f64) -> Self {
        self.chance = chance;
        self
    }

    #[must_use]
    pub fn with_refresh(mut self, refresh: RefreshPolicy) -> Self {
        self.refresh = refresh;
        self
    }

    /// Adds a stack threshold. A tier past [`RogueConfig::MAX_TIERS`] is
    /// logged and dropped.
    #[must_use]
    pub fn with_tier(mut self, tier: StackTier) -> Self {
        if let Err(overflow) = self.tiers.try_push(tier) {
            warn!(
                buff = %self.kind,
                at_stack = overflow.element().at_stack,
                capacity = RogueConfig::MAX_TIERS,
                "stack tier dropped"
            );
            return self;
        }
        self.tiers.sort_by_key(|tier| tier.at_stack);
        self
    }

    #[must_use]
    pub fn with_on_expire(mut self, dependent: BuffKind) -> Self {
        self.on_expire = Some(dependent);
        self
    }

    #[must_use]
    pub fn with_agility_per_stack(mut self, agility: f64) -> Self {
        self.agility_per_stack = agility;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct BuffEntry {
    stack: u16,
    value: f64,
    expires_at: Option<Tick>,
    timer: Option<TimerHandle>,
}

impl BuffEntry {
    fn is_up(&self, now: Tick) -> bool {
        self.stack > 0 && self.expires_at.is_none_or(|at| at > now)
    }
}

/// Outcome of a successful [`BuffTable::trigger`].
#[derive(Clone, Debug, PartialEq)]
pub struct BuffTrigger {
    pub from: u16,
    pub to: u16,
    pub expires_at: Option<Tick>,
    /// Thresholds crossed by this call, in ascending order.
    pub tiers: ArrayVec<StackTier, { RogueConfig::MAX_TIERS }>,
}

/// Outcome of a [`BuffTable::expire`] on an active entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuffExpiry {
    pub timer: Option<TimerHandle>,
    pub dependent: Option<BuffKind>,
}

#[derive(Clone, Debug, Default)]
pub struct BuffTable {
    defs: BTreeMap<BuffKind, BuffDef>,
    entries: BTreeMap<BuffKind, BuffEntry>,
}

impl BuffTable {
    pub fn new(defs: impl IntoIterator<Item = BuffDef>) -> Self {
        let defs: BTreeMap<_, _> = defs.into_iter().map(|def| (def.kind, def)).collect();
        let entries = defs.keys().map(|kind| (*kind, BuffEntry::default())).collect();
        Self { defs, entries }
    }

    pub fn def(&self, kind: BuffKind) -> Option<&BuffDef> {
        self.defs.get(&kind)
    }

    pub fn def_mut(&mut self, kind: BuffKind) -> Option<&mut BuffDef> {
        self.defs.get_mut(&kind)
    }

    pub fn defs(&self) -> impl Iterator<Item = &BuffDef> {
        self.defs.values()
    }

    pub fn check(&self, kind: BuffKind, now: Tick) -> bool {
        self.entries.get(&kind).is_some_and(|entry| entry.is_up(now))
    }

    pub fn up(&self, kind: BuffKind, now: Tick) -> bool {
        self.check(kind, now)
    }

    pub fn stack(&self, kind: BuffKind, now: Tick) -> u16 {
        self.live(kind, now).map_or(0, |entry| entry.stack)
    }

    /// Current value, or zero while down.
    pub fn value(&self, kind: BuffKind, now: Tick) -> f64 {
        self.live(kind, now).map_or(0.0, |entry| entry.value)
    }

    /// Time left; zero while down and [`Tick::MAX`] for permanent entries.
    pub fn remains(&self, kind: BuffKind, now: Tick) -> Tick {
        match self.live(kind, now) {
            Some(entry) => entry
                .expires_at
                .map_or(Tick::MAX, |at| at.saturating_sub(now)),
            None => Tick::ZERO,
        }
    }

    /// Adds `stacks`, clamped at the declared maximum, and (re)starts the
    /// duration. `duration` / `value` override the declared defaults.
    ///
    /// Returns `None` when the buff is undeclared, inert (chance 0), lost its
    /// chance roll, or sits at max stack under [`RefreshPolicy::Ignore`].
    /// A request for zero stacks is a no-op.
    pub fn trigger(
        &mut self,
        kind: BuffKind,
        stacks: u16,
        value: Option<f64>,
        duration: Option<Tick>,
        now: Tick,
        rng: &mut dyn RngOracle,
    ) -> Option<BuffTrigger> {
        if stacks == 0 {
            return None;
        }
        let def = self.defs.get(&kind)?;
        if def.chance <= 0.0 || !rng.roll(def.chance) {
            return None;
        }
        let entry = self.entries.entry(kind).or_default();

        let from = if entry.is_up(now) { entry.stack } else { 0 };
        if from >= def.max_stack && def.refresh == RefreshPolicy::Ignore {
            return None;
        }
        let to = from.saturating_add(stacks).min(def.max_stack);

        entry.stack = to;
        entry.value = value.unwrap_or(def.default_value);
        entry.expires_at = duration.or(def.duration).map(|length| now + length);

        let tiers = def
            .tiers
            .iter()
            .filter(|tier| from < tier.at_stack && tier.at_stack <= to)
            .copied()
            .collect();

        debug!(buff = %kind, from, to, "buff triggered");
        Some(BuffTrigger {
            from,
            to,
            expires_at: entry.expires_at,
            tiers,
        })
    }

    /// Forces the entry down. Returns `None` if it was not up.
    ///
    /// An entry whose time ran out but whose expiry event is still pending is
    /// treated as up, so its side effect still fires exactly once.
    pub fn expire(&mut self, kind: BuffKind) -> Option<BuffExpiry> {
        let entry = self.entries.get_mut(&kind)?;
        if entry.stack == 0 {
            return None;
        }
        let timer = entry.timer.take();
        *entry = BuffEntry::default();
        debug!(buff = %kind, "buff expired");
        Some(BuffExpiry {
            timer,
            dependent: self.defs.get(&kind).and_then(|def| def.on_expire),
        })
    }

    pub fn set_timer(&mut self, kind: BuffKind, handle: TimerHandle) {
        if let Some(entry) = self.entries.get_mut(&kind) {
            entry.timer = Some(handle);
        }
    }

    pub fn take_timer(&mut self, kind: BuffKind) -> Option<TimerHandle> {
        self.entries.get_mut(&kind).and_then(|entry| entry.timer.take())
    }

    /// Total agility granted by active stat buffs.
    pub fn agility_bonus(&self, now: Tick) -> f64 {
        self.defs
            .values()
            .filter(|def| def.agility_per_stack != 0.0)
            .map(|def| def.agility_per_stack * f64::from(self.stack(def.kind, now)))
            .sum()
    }

    /// Drops every entry without side effects.
    pub fn clear(&mut self) {
        for entry in self.entries.values_mut() {
            *entry = BuffEntry::default();
        }
    }

    pub fn validate(&self) -> Result<(), InvariantViolation> {
        for (kind, entry) in &self.entries {
            let max = self.defs.get(kind).map_or(0, |def| def.max_stack);
            if entry.stack > max {
                return Err(InvariantViolation::StackOverflow {
                    buff: *kind,
                    stack: entry.stack,
                    max,
                });
            }
        }
        Ok(())
    }

    fn live(&self, kind: BuffKind, now: Tick) -> Option<&BuffEntry> {
        self.entries.get(&kind).filter(|entry| entry.is_up(now))
    }
}
