//! Reference driver for the rogue combat engine.
//!
//! This crate supplies the collaborators `rogue-core` only names as traits
//! and runs whole fights with them:
//! - [`queue`] is the FIFO-at-equal-time event queue behind the scheduler seam
//! - [`oracle`] holds the attack table and the encounter's target profiles
//! - [`rotation`] picks abilities from a conditional priority list
//! - [`simulation`] is the iteration loop tying actors, queue and oracles together
//! - [`report`] aggregates telemetry into per-fight figures
//!
//! [`config`] and [`logging`] serve the `rogue-sim` binary.
pub mod config;
pub mod error;
pub mod logging;
pub mod oracle;
pub mod queue;
pub mod report;
pub mod rotation;
pub mod simulation;

pub use config::{LoggingConfig, RotationOverrides, SimulationConfig};
pub use error::{Result, RuntimeError};
pub use logging::init_logging;
pub use oracle::{AttackTable, Encounter};
pub use queue::{EventQueue, QueueEvent};
pub use report::{AbilityReport, ActorReport, GainReport, SimulationReport};
pub use rotation::{Condition, PriorityEntry, Rotation};
pub use simulation::{Rogue, Simulation};
