//! Per-actor combat state: combo points, buffs, cooldowns, timers, and the
//! per-opponent records that tie them together.
mod buff;
mod combo;
mod common;
mod cooldown;
mod target;
mod timers;

pub use buff::{
    BuffDef, BuffEntry, BuffExpiry, BuffKind, BuffScope, BuffTable, BuffTrigger, RefreshPolicy,
    StackTier,
};
pub use combo::{ComboPoints, PointGain, RANKS, rank_of};
pub use common::{ActorId, Position, Tick};
pub use cooldown::{CooldownEntry, CooldownKind, CooldownTable};
pub use target::{DotState, TargetData};
pub use timers::{TimerArena, TimerHandle, TimerPurpose};
