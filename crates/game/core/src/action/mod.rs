//! Abilities and the pipeline that resolves them.
//!
//! Static data ([`AbilitySpec`]) is separated from the per-kind behavior
//! (hooks), the passive proc rules ([`TriggerRegistry`]) and the stages of a
//! cast (pipeline). All behavior is implemented on
//! [`RogueActor`](crate::engine::RogueActor), which owns the state each
//! stage touches.
mod cast;
mod damage;
mod hooks;
mod kind;
mod pipeline;
mod ready;
mod spec;
mod triggers;

pub use cast::{CastReport, CastState};
pub use kind::AbilityKind;
pub use ready::Unavailable;
pub use spec::{
    AbilityFlags, AbilitySpec, CooldownSpec, DirectDamage, EquipmentRequirement, PeriodicSpec,
    School, TickCount, TickDamage,
};
pub use triggers::{Checkpoint, TriggerRegistry, TriggerRule};
