//! Oracle implementations backed by static configuration.

use std::collections::BTreeMap;

use rogue_core::{
    ActorId, HitRequest, HitResolver, HitResult, RngOracle, TargetOracle, TargetProfile,
};

/// Single-roll melee attack table against a boss-level target.
///
/// Outcomes are stacked in the order miss, dodge, parry, block, crit, hit and
/// decided by one uniform roll. Impossible outcomes take no room.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AttackTable {
    pub miss: f64,
    pub dodge: f64,
    pub parry: f64,
    pub block: f64,
}

impl AttackTable {
    pub const DEFAULT_MISS: f64 = 0.08;
    pub const DEFAULT_DODGE: f64 = 0.065;
    pub const DEFAULT_PARRY: f64 = 0.14;
    pub const DEFAULT_BLOCK: f64 = 0.05;

    /// The slices of the roll this request can land in.
    pub fn chances(&self, request: &HitRequest) -> [(HitResult, f64); 5] {
        let gate = |allowed: bool, chance: f64| if allowed { chance.max(0.0) } else { 0.0 };
        [
            (HitResult::Miss, gate(request.may_miss(), self.miss - request.hit_chance)),
            (HitResult::Dodge, gate(request.may_dodge(), self.dodge - request.expertise)),
            (HitResult::Parry, gate(request.may_parry(), self.parry - request.expertise)),
            (HitResult::Block, gate(request.may_block(), self.block)),
            (HitResult::Crit, gate(request.may_crit(), request.crit_chance)),
        ]
    }
}

impl Default for AttackTable {
    fn default() -> Self {
        Self {
            miss: Self::DEFAULT_MISS,
            dodge: Self::DEFAULT_DODGE,
            parry: Self::DEFAULT_PARRY,
            block: Self::DEFAULT_BLOCK,
        }
    }
}

impl HitResolver for AttackTable {
    fn resolve(&self, request: &HitRequest, rng: &mut dyn RngOracle) -> HitResult {
        let mut roll = rng.next_f64();
        for (result, chance) in self.chances(request) {
            if roll < chance {
                return result;
            }
            roll -= chance;
        }
        HitResult::Hit
    }
}

/// Opponents of one iteration.
///
/// Health drains linearly over the fight so execute-range abilities become
/// usable near the end.
#[derive(Clone, Debug, PartialEq)]
pub struct Encounter {
    base: TargetProfile,
    overrides: BTreeMap<ActorId, TargetProfile>,
    health_fraction: f64,
}

impl Encounter {
    pub fn new(base: TargetProfile) -> Self {
        Self {
            base,
            overrides: BTreeMap::new(),
            health_fraction: base.health_fraction,
        }
    }

    #[must_use]
    pub fn with_target(mut self, id: ActorId, profile: TargetProfile) -> Self {
        self.overrides.insert(id, profile);
        self
    }

    /// Sets the share of the fight that has elapsed, `0.0..=1.0`.
    pub fn set_progress(&mut self, progress: f64) {
        self.health_fraction = (self.base.health_fraction * (1.0 - progress)).clamp(0.0, 1.0);
    }

    pub fn health_fraction(&self) -> f64 {
        self.health_fraction
    }
}

impl TargetOracle for Encounter {
    fn profile(&self, target: ActorId) -> TargetProfile {
        match self.overrides.get(&target) {
            Some(profile) => *profile,
            None => TargetProfile {
                health_fraction: self.health_fraction,
                ..self.base
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rogue_core::{AbilityFlags, AbilityKind, PcgRng, Position};

    use super::*;

    fn request(flags: AbilityFlags, position: Position) -> HitRequest {
        HitRequest {
            actor: ActorId(10),
            target: ActorId::PRIMARY_TARGET,
            ability: AbilityKind::SinisterStrike,
            flags,
            periodic: false,
            crit_chance: 0.2,
            hit_chance: 0.08,
            expertise: 0.065,
            position,
        }
    }

    #[test]
    fn capped_hit_and_expertise_leave_crit_and_hit() {
        let table = AttackTable::default();
        let chances = table.chances(&request(AbilityFlags::MELEE_SPECIAL, Position::Back));
        assert_eq!(chances[0].1, 0.0);
        assert_eq!(chances[1].1, 0.0);
        // parry and block need the front
        assert_eq!(chances[2].1, 0.0);
        assert_eq!(chances[3].1, 0.0);
        assert!((chances[4].1 - 0.2).abs() < 1e-12);
    }

    #[test]
    fn front_attacks_can_be_parried_and_blocked() {
        let table = AttackTable::default();
        let mut request = request(AbilityFlags::MELEE_SPECIAL, Position::Front);
        request.crit_chance = 0.0;

        let mut rng = PcgRng::new(11);
        let mut parried = 0;
        let mut blocked = 0;
        for _ in 0..2_000 {
            match table.resolve(&request, &mut rng) {
                HitResult::Parry => parried += 1,
                HitResult::Block => blocked += 1,
                HitResult::Hit => {}
                other => panic!("unexpected {other}"),
            }
        }
        assert!(parried > 0);
        assert!(blocked > 0);
    }

    #[test]
    fn health_drains_with_progress_unless_overridden() {
        let pinned = TargetProfile {
            health_fraction: 0.9,
            ..TargetProfile::default()
        };
        let mut encounter = Encounter::new(TargetProfile::default()).with_target(ActorId(7), pinned);
        encounter.set_progress(0.75);

        assert!((encounter.profile(ActorId::PRIMARY_TARGET).health_fraction - 0.25).abs() < 1e-12);
        assert_eq!(encounter.profile(ActorId(7)), pinned);
    }
}
