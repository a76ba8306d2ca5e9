//! Transient per-cast state.

use crate::action::AbilityKind;
use crate::combat::HitResult;
use crate::state::{ActorId, Tick};

/// Snapshot carried from execute to impact.
///
/// Everything the impact stage reads is captured here at cast time. In
/// particular `combo_points` is the count observed before the spend, and
/// impact never re-reads the live counter for scaling.
#[derive(Clone, Debug, PartialEq)]
pub struct CastState {
    pub ability: AbilityKind,
    pub target: ActorId,
    pub combo_points: u8,
    pub result: HitResult,
    /// Final direct damage after outcome scaling and mitigation.
    pub direct_damage: f64,
    /// Per-tick damage before the tick's own outcome roll.
    pub tick_damage: f64,
    /// Energy taken by the consume stage, before any refund.
    pub resource_consumed: f64,
}

impl CastState {
    pub fn landed(&self) -> bool {
        self.result.is_hit()
    }
}

/// Summary of one `execute` call returned to the driver.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastReport {
    pub ability: AbilityKind,
    pub target: ActorId,
    pub result: HitResult,
    /// Combo points the cast was scaled by.
    pub combo_points: u8,
    pub energy_spent: f64,
    pub energy_refunded: f64,
    /// Direct damage dealt; zero while the impact is still travelling.
    pub damage: f64,
    /// When the impact lands, if it was deferred.
    pub impact_at: Option<Tick>,
}
