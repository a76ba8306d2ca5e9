//! Scripted collaborators for unit tests.

use crate::combat::{HitRequest, HitResult};
use crate::env::{HitResolver, RngOracle, Scheduler, SimEvent};
use crate::state::Tick;

/// FIFO event queue advanced by hand.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Tick,
    seq: u64,
    pending: Vec<(Tick, u64, SimEvent)>,
}

impl ManualScheduler {
    /// Removes the earliest event and moves the clock to it.
    pub fn pop(&mut self) -> Option<(Tick, SimEvent)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .min_by_key(|(_, (at, seq, _))| (*at, *seq))
            .map(|(index, _)| index)?;
        let (at, _, event) = self.pending.remove(index);
        self.now = self.now.max(at);
        Some((at, event))
    }

    pub fn advance_to(&mut self, at: Tick) {
        self.now = self.now.max(at);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Tick {
        self.now
    }

    fn schedule(&mut self, delay: Tick, event: SimEvent) {
        self.pending.push((self.now + delay, self.seq, event));
        self.seq += 1;
    }
}

/// Resolves every request to one outcome, falling back to a plain hit when
/// the request cannot produce it.
#[derive(Clone, Copy, Debug)]
pub struct FixedResult(pub HitResult);

impl HitResolver for FixedResult {
    fn resolve(&self, request: &HitRequest, _rng: &mut dyn RngOracle) -> HitResult {
        let possible = match self.0 {
            HitResult::Hit => true,
            HitResult::Crit => request.may_crit(),
            HitResult::Miss => request.may_miss(),
            HitResult::Dodge => request.may_dodge(),
            HitResult::Parry => request.may_parry(),
            HitResult::Block => request.may_block(),
        };
        if possible { self.0 } else { HitResult::Hit }
    }
}
