//! Services the resolution engine consumes from the surrounding simulator.
//!
//! Collaborators are traits so that the runtime can plug in a real event
//! queue and attack table while tests plug in scripted ones. [`SimEnv`]
//! bundles the per-call services. Static spell data is read once at actor
//! construction through [`SpellOracle`] and is not part of the bundle.
mod hits;
mod rng;
mod scheduler;
mod spells;
mod targets;

pub use hits::{AlwaysHit, HitResolver};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use scheduler::{Scheduler, SimEvent};
pub use spells::{SpellBook, SpellOracle};
pub use targets::{TargetOracle, TargetProfile};

use crate::state::Tick;

/// Mutable services passed explicitly to every actor entry point.
pub struct SimEnv<'a> {
    pub rng: &'a mut dyn RngOracle,
    pub scheduler: &'a mut dyn Scheduler,
    pub hits: &'a dyn HitResolver,
    pub targets: &'a dyn TargetOracle,
}

impl<'a> SimEnv<'a> {
    pub fn new(
        rng: &'a mut dyn RngOracle,
        scheduler: &'a mut dyn Scheduler,
        hits: &'a dyn HitResolver,
        targets: &'a dyn TargetOracle,
    ) -> Self {
        Self {
            rng,
            scheduler,
            hits,
            targets,
        }
    }

    pub fn now(&self) -> Tick {
        self.scheduler.now()
    }
}
