//! Hit-resolution seam.

use crate::combat::{HitRequest, HitResult};
use crate::env::RngOracle;

/// Decides the outcome of an attack or a periodic tick.
pub trait HitResolver {
    fn resolve(&self, request: &HitRequest, rng: &mut dyn RngOracle) -> HitResult;
}

/// Resolver that lands every attack and never crits.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysHit;

impl HitResolver for AlwaysHit {
    fn resolve(&self, _request: &HitRequest, _rng: &mut dyn RngOracle) -> HitResult {
        HitResult::Hit
    }
}
