//! Deterministic rogue combat mechanics for a tick-driven simulator.
//!
//! `rogue-core` owns the rules: combo points, abilities and their cast
//! pipeline, passive proc rules, buffs with stack ladders, and cooldowns.
//! Everything runs single-threaded against external services (clock,
//! randomness, hit tables, spell data) supplied through [`env`]. All state
//! mutation flows through [`engine::RogueActor`], and supporting crates
//! depend on the types re-exported here.
pub mod action;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;
pub mod stats;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_utils;

pub use action::{
    AbilityFlags, AbilityKind, AbilitySpec, CastReport, CastState, Checkpoint, CooldownSpec,
    DirectDamage, EquipmentRequirement, PeriodicSpec, School, TickCount, TickDamage,
    TriggerRegistry, TriggerRule, Unavailable,
};
pub use combat::{HitRequest, HitResult};
pub use config::RogueConfig;
pub use engine::{
    AllyEffect, ExecuteError, LegendaryStage, LethalPoison, Mastery, MasteryKind, Passives,
    RogueActor, RogueProfile, Specialization,
};
pub use env::{
    AlwaysHit, HitResolver, PcgRng, RngOracle, Scheduler, SimEnv, SimEvent, SpellBook,
    SpellOracle, TargetOracle, TargetProfile, compute_seed,
};
pub use error::{ConfigurationError, ErrorContext, ErrorSeverity, InvariantViolation, SimError};
pub use state::{
    ActorId, BuffDef, BuffKind, BuffScope, BuffTable, ComboPoints, CooldownKind, CooldownTable,
    PointGain, Position, RefreshPolicy, StackTier, Tick, TimerHandle,
};
pub use stats::{ActorStats, EnergyPool, Weapon, WeaponKind, WeaponSlot};
pub use telemetry::{DamageRecord, GainRecord, GainSource, ProcKind, Telemetry};
