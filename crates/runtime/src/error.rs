//! Errors surfaced by the simulation driver.
//!
//! Wraps engine failures with the iteration and actor they happened in so the
//! CLI can report them without unpacking the core error types.
use rogue_core::{ActorId, ExecuteError, Tick};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no rogues configured")]
    NoActors,

    #[error("rogue #{index} has no free actor id")]
    TooManyActors { index: usize },

    #[error("iteration count must be at least one")]
    NoIterations,

    #[error("fight length must be positive")]
    EmptyFight,

    #[error("actor {actor} failed at {at} in iteration {iteration}")]
    Engine {
        iteration: u64,
        actor: ActorId,
        at: Tick,
        #[source]
        source: ExecuteError,
    },
}
