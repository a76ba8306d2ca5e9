//! Combat resolution primitives: outcomes and damage formulas.
mod damage;
mod hit;

pub use damage::{BLOCK_PASSTHROUGH, CRIT_MULTIPLIER, apply_result, armor_reduction, weapon_damage};
pub use hit::{HitRequest, HitResult};
