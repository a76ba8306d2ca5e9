//! Static ability and aura lookup.

use std::collections::BTreeMap;

use crate::action::{AbilityKind, AbilitySpec};
use crate::state::{BuffDef, BuffKind};

pub trait SpellOracle {
    fn ability(&self, kind: AbilityKind) -> Option<&AbilitySpec>;

    fn buff(&self, kind: BuffKind) -> Option<&BuffDef>;
}

/// In-memory spell data, usually filled by a content loader.
#[derive(Clone, Debug, Default)]
pub struct SpellBook {
    abilities: BTreeMap<AbilityKind, AbilitySpec>,
    buffs: BTreeMap<BuffKind, BuffDef>,
}

impl SpellBook {
    pub fn new(
        abilities: impl IntoIterator<Item = AbilitySpec>,
        buffs: impl IntoIterator<Item = BuffDef>,
    ) -> Self {
        Self {
            abilities: abilities.into_iter().map(|spec| (spec.kind, spec)).collect(),
            buffs: buffs.into_iter().map(|def| (def.kind, def)).collect(),
        }
    }

    pub fn insert_ability(&mut self, spec: AbilitySpec) {
        self.abilities.insert(spec.kind, spec);
    }

    pub fn insert_buff(&mut self, def: BuffDef) {
        self.buffs.insert(def.kind, def);
    }

    pub fn abilities(&self) -> impl Iterator<Item = &AbilitySpec> {
        self.abilities.values()
    }

    pub fn buffs(&self) -> impl Iterator<Item = &BuffDef> {
        self.buffs.values()
    }
}

impl SpellOracle for SpellBook {
    fn ability(&self, kind: AbilityKind) -> Option<&AbilitySpec> {
        self.abilities.get(&kind)
    }

    fn buff(&self, kind: BuffKind) -> Option<&BuffDef> {
        self.buffs.get(&kind)
    }
}
