//! Read-only view of opponents.

use crate::state::ActorId;

/// What the rogue can observe about an opponent.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TargetProfile {
    /// Remaining health as a fraction of maximum, `0.0..=1.0`.
    pub health_fraction: f64,
    pub armor: f64,
    pub casting: bool,
}

impl Default for TargetProfile {
    fn default() -> Self {
        Self {
            health_fraction: 1.0,
            armor: 24_835.0,
            casting: false,
        }
    }
}

pub trait TargetOracle {
    fn profile(&self, target: ActorId) -> TargetProfile;
}

impl TargetOracle for TargetProfile {
    fn profile(&self, _target: ActorId) -> TargetProfile {
        *self
    }
}
