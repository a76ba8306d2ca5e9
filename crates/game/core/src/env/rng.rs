//! Deterministic random source.
//!
//! The resolution engine never owns randomness: every roll goes through a
//! caller-supplied [`RngOracle`]. Given the same seed and the same sequence of
//! calls, a run reproduces exactly, which is what lets repeated iterations
//! converge and lets tests script outcomes.

use crate::state::Tick;

pub trait RngOracle {
    fn next_u32(&mut self) -> u32;

    /// Uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Returns true with probability `chance`.
    ///
    /// Certain and impossible rolls consume no randomness.
    fn roll(&mut self, chance: f64) -> bool {
        if chance <= 0.0 {
            false
        } else if chance >= 1.0 {
            true
        } else {
            self.next_f64() < chance
        }
    }

    /// Uniform value in `[lo, hi)`; `lo` when the range is empty.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            lo
        } else {
            lo + (hi - lo) * self.next_f64()
        }
    }

    /// Uniform duration in `[lo, hi)`.
    fn range(&mut self, lo: Tick, hi: Tick) -> Tick {
        Tick::from_secs_f64(self.uniform(lo.as_secs_f64(), hi.as_secs_f64()))
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.step();
        rng.state = rng.state.wrapping_add(seed);
        rng.step();
        rng
    }

    #[inline]
    fn step(&mut self) {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.step();
        Self::output(old)
    }
}

/// Derives an independent seed for one iteration of a multi-iteration run.
pub fn compute_seed(base_seed: u64, iteration: u64, actor_id: u32) -> u64 {
    let mut hash = base_seed;
    hash ^= iteration.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(actor_id).wrapping_mul(0x517cc1b727220a95);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}
