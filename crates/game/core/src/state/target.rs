//! State the rogue keeps per opponent.

use std::collections::BTreeMap;

use crate::action::AbilityKind;
use crate::state::{BuffDef, BuffKind, BuffTable, ComboPoints, Tick, TimerHandle};

/// A running periodic effect on one opponent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotState {
    pub current_tick: u32,
    pub num_ticks: u32,
    pub tick_time: Tick,
    /// Damage per tick, computed once from the cast snapshot.
    pub tick_damage: f64,
    /// Combo points the effect was cast with.
    pub combo_points: u8,
    pub timer: Option<TimerHandle>,
}

impl DotState {
    pub fn is_last_tick(&self) -> bool {
        self.current_tick >= self.num_ticks
    }

    pub fn ticks_left(&self) -> u32 {
        self.num_ticks.saturating_sub(self.current_tick)
    }
}

/// Per-opponent record, created lazily on first reference.
#[derive(Clone, Debug, Default)]
pub struct TargetData {
    pub combo_points: ComboPoints,
    pub debuffs: BuffTable,
    dots: BTreeMap<AbilityKind, DotState>,
}

impl TargetData {
    pub fn new(debuffs: impl IntoIterator<Item = BuffDef>) -> Self {
        Self {
            combo_points: ComboPoints::new(),
            debuffs: BuffTable::new(debuffs),
            dots: BTreeMap::new(),
        }
    }

    pub fn dot(&self, ability: AbilityKind) -> Option<&DotState> {
        self.dots.get(&ability)
    }

    pub fn dot_mut(&mut self, ability: AbilityKind) -> Option<&mut DotState> {
        self.dots.get_mut(&ability)
    }

    pub fn is_ticking(&self, ability: AbilityKind) -> bool {
        self.dots.contains_key(&ability)
    }

    /// Installs or replaces the dot, returning the previous state.
    pub fn start_dot(&mut self, ability: AbilityKind, state: DotState) -> Option<DotState> {
        self.dots.insert(ability, state)
    }

    pub fn end_dot(&mut self, ability: AbilityKind) -> Option<DotState> {
        self.dots.remove(&ability)
    }

    /// True while any bleed that feeds Sanguinary Vein is ticking.
    pub fn is_bleeding(&self) -> bool {
        self.is_ticking(AbilityKind::Rupture) || self.is_ticking(AbilityKind::Garrote)
    }

    pub fn is_poisoned(&self, now: Tick) -> bool {
        self.is_ticking(AbilityKind::DeadlyPoison)
            || self.debuffs.check(BuffKind::WoundPoison, now)
    }
}
