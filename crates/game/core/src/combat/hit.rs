//! Attack outcomes and the hit-resolution request.

use crate::action::{AbilityFlags, AbilityKind};
use crate::state::{ActorId, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum HitResult {
    Hit,
    Crit,
    Miss,
    Dodge,
    Parry,
    Block,
}

impl HitResult {
    /// Outcomes that connect with the target.
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::Hit | Self::Crit | Self::Block)
    }

    pub const fn is_crit(self) -> bool {
        matches!(self, Self::Crit)
    }

    /// Outcomes that trigger the cost refund.
    pub const fn is_avoided(self) -> bool {
        matches!(self, Self::Miss | Self::Dodge | Self::Parry)
    }
}

/// Everything the hit-resolution service needs to decide an outcome.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRequest {
    pub actor: ActorId,
    pub target: ActorId,
    pub ability: AbilityKind,
    pub flags: AbilityFlags,
    /// True when resolving a periodic tick rather than a direct hit.
    pub periodic: bool,
    pub crit_chance: f64,
    /// Additive hit chance; negative for penalties such as dual wielding.
    pub hit_chance: f64,
    pub expertise: f64,
    pub position: Position,
}

impl HitRequest {
    pub fn may_miss(&self) -> bool {
        !self.periodic && self.flags.contains(AbilityFlags::MAY_MISS)
    }

    pub fn may_dodge(&self) -> bool {
        !self.periodic && self.flags.contains(AbilityFlags::MAY_DODGE)
    }

    /// Parry and block only happen from the front.
    pub fn may_parry(&self) -> bool {
        !self.periodic
            && self.position == Position::Front
            && self.flags.contains(AbilityFlags::MAY_PARRY)
    }

    pub fn may_block(&self) -> bool {
        !self.periodic
            && self.position == Position::Front
            && self.flags.contains(AbilityFlags::MAY_BLOCK)
    }

    pub fn may_crit(&self) -> bool {
        if self.periodic {
            self.flags.contains(AbilityFlags::TICK_MAY_CRIT)
        } else {
            self.flags.contains(AbilityFlags::MAY_CRIT)
        }
    }

    /// True when no outcome other than a plain hit is possible.
    pub fn is_certain(&self) -> bool {
        !(self.may_miss() || self.may_dodge() || self.may_parry() || self.may_block() || self.may_crit())
    }
}
