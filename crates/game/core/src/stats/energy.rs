//! Energy, the rogue's cost pool.
//!
//! Every gain is attributed to a [`GainSource`] and split into the part that
//! fit under the cap and the part that overflowed.

use tracing::trace;

use crate::error::InvariantViolation;
use crate::telemetry::{GainSource, Telemetry};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyPool {
    current: f64,
    max: f64,
}

impl EnergyPool {
    pub const DEFAULT_MAX: f64 = 100.0;

    pub fn new(max: f64) -> Self {
        Self { current: max, max }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn deficit(&self) -> f64 {
        (self.max - self.current).max(0.0)
    }

    /// Adds energy up to the cap and returns the amount that fit.
    pub fn gain(&mut self, amount: f64, source: GainSource, telemetry: &mut Telemetry) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let actual = amount.min(self.deficit());
        self.current += actual;
        telemetry.record_gain(source, actual, amount - actual);
        trace!(%source, actual, overflow = amount - actual, current = self.current, "gains energy");
        actual
    }

    /// Removes energy. Callers check affordability first; an overdraw is left
    /// in place so that validation reports it.
    pub fn spend(&mut self, amount: f64) {
        if amount > 0.0 {
            self.current -= amount;
            trace!(amount, current = self.current, "spends energy");
        }
    }

    pub fn can_afford(&self, amount: f64) -> bool {
        amount <= self.current + f64::EPSILON
    }

    pub fn set_max(&mut self, max: f64) {
        self.max = max;
        self.current = self.current.min(max);
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }

    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if self.current < -1e-9 {
            return Err(InvariantViolation::NegativeEnergy {
                current: self.current,
            });
        }
        Ok(())
    }
}

impl Default for EnergyPool {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX)
    }
}
