//! Per-opponent combo point counter.
//!
//! Combo points are a bounded integer owned by one (rogue, opponent) pair.
//! Generators add to the counter, finishers spend all of it at once. Additions
//! beyond the cap are clamped, and the clamped remainder is recorded as waste
//! rather than dropped from accounting.

use tracing::trace;

use crate::config::RogueConfig;
use crate::error::InvariantViolation;
use crate::telemetry::{ProcKind, Telemetry};

/// Number of entries in a per-rank table.
pub const RANKS: usize = RogueConfig::MAX_COMBO_POINTS as usize;

/// Result of a single [`ComboPoints::add`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PointGain {
    pub granted: u8,
    pub wasted: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboPoints {
    count: u8,
}

impl ComboPoints {
    pub const MAX: u8 = RogueConfig::MAX_COMBO_POINTS;

    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Adds `amount` points, clamping at [`Self::MAX`].
    ///
    /// Every requested unit counts as a gain event and every clamped unit as a
    /// waste event, so `granted + wasted == amount` always holds.
    pub fn add(&mut self, amount: u8, source: &'static str, telemetry: &mut Telemetry) -> PointGain {
        let granted = amount.min(Self::MAX.saturating_sub(self.count));
        let wasted = amount - granted;
        self.count += granted;

        telemetry.record_proc(ProcKind::ComboPoints, u64::from(amount));
        telemetry.record_proc(ProcKind::ComboPointsWasted, u64::from(wasted));
        trace!(
            source,
            granted,
            wasted,
            count = self.count,
            "gains combo points"
        );

        PointGain { granted, wasted }
    }

    /// Spends every point and returns the count held immediately before.
    pub fn spend(&mut self, source: &'static str, telemetry: &mut Telemetry) -> u8 {
        let spent = self.count;
        self.count = 0;
        telemetry.record_proc(ProcKind::ComboPointsSpent, u64::from(spent));
        trace!(source, spent, "spends combo points");
        spent
    }

    pub const fn peek(&self) -> u8 {
        self.count
    }

    /// Looks up the entry for the current count in a per-rank table.
    ///
    /// Returns `None` when no points are held.
    pub fn rank<T: Copy>(&self, table: &[T; RANKS]) -> Option<T> {
        rank_of(self.count, table)
    }

    /// Silently resets the counter; used by combat reset only.
    pub fn clear(&mut self) {
        self.count = 0;
    }

    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if self.count > Self::MAX {
            return Err(InvariantViolation::ComboPointsOverflow {
                count: self.count,
                max: Self::MAX,
            });
        }
        Ok(())
    }
}

/// Indexes a per-rank table by a point count (1-based).
pub fn rank_of<T: Copy>(count: u8, table: &[T; RANKS]) -> Option<T> {
    match count {
        0 => None,
        n => table.get(usize::from(n.min(ComboPoints::MAX)) - 1).copied(),
    }
}
