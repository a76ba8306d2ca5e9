//! Priority-list decision making.
//!
//! A rotation is an ordered list of abilities, each guarded by conditions.
//! At every decision the first entry whose conditions hold and whose ability
//! is `ready()` is chosen.

use rogue_core::{
    AbilityKind, ActorId, BuffKind, CooldownKind, RogueActor, SimEnv, Specialization, Tick,
};

/// One guard of a priority entry, read against live actor state.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    ComboPointsAtLeast(u8),
    ComboPointsBelow(u8),
    EnergyAtLeast(f64),
    BuffDown(BuffKind),
    BuffRemainsBelow { buff: BuffKind, remains: Tick },
    DebuffDown(BuffKind),
    DotMissing(AbilityKind),
    CooldownRunning(CooldownKind),
}

impl Condition {
    pub fn holds(&self, actor: &RogueActor, target: ActorId, now: Tick) -> bool {
        match *self {
            Self::ComboPointsAtLeast(points) => actor.combo_points(target) >= points,
            Self::ComboPointsBelow(points) => actor.combo_points(target) < points,
            Self::EnergyAtLeast(energy) => actor.energy().current() >= energy,
            Self::BuffDown(buff) => !actor.buffs().up(buff, now),
            Self::BuffRemainsBelow { buff, remains } => actor.buffs().remains(buff, now) < remains,
            Self::DebuffDown(buff) => !actor
                .target(target)
                .is_some_and(|data| data.debuffs.up(buff, now)),
            Self::DotMissing(ability) => !actor
                .target(target)
                .is_some_and(|data| data.is_ticking(ability)),
            Self::CooldownRunning(kind) => !actor.cooldowns().up(kind, now),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PriorityEntry {
    pub ability: AbilityKind,
    #[serde(default)]
    pub when: Vec<Condition>,
}

impl PriorityEntry {
    pub fn new(ability: AbilityKind) -> Self {
        Self {
            ability,
            when: Vec::new(),
        }
    }

    #[must_use]
    pub fn when(mut self, condition: Condition) -> Self {
        self.when.push(condition);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Rotation {
    entries: Vec<PriorityEntry>,
}

impl Rotation {
    pub fn new(entries: Vec<PriorityEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PriorityEntry] {
        &self.entries
    }

    /// The first entry that is both wanted and ready.
    pub fn choose(&self, actor: &RogueActor, target: ActorId, env: &SimEnv<'_>) -> Option<AbilityKind> {
        let now = env.now();
        self.entries
            .iter()
            .find(|entry| {
                entry.when.iter().all(|condition| condition.holds(actor, target, now))
                    && actor.ready(entry.ability, target, env)
            })
            .map(|entry| entry.ability)
    }

    /// A reasonable default priority list for `specialization`.
    pub fn preset(specialization: Specialization) -> Self {
        use AbilityKind as A;
        use Condition as C;

        let snd_low = C::BuffRemainsBelow {
            buff: BuffKind::SliceAndDice,
            remains: Tick::from_secs(2),
        };
        let entries = match specialization {
            Specialization::Assassination => vec![
                PriorityEntry::new(A::TricksOfTheTrade),
                PriorityEntry::new(A::Vendetta),
                PriorityEntry::new(A::SliceAndDice).when(snd_low),
                PriorityEntry::new(A::Rupture)
                    .when(C::DotMissing(A::Rupture))
                    .when(C::ComboPointsAtLeast(4)),
                PriorityEntry::new(A::Envenom).when(C::ComboPointsAtLeast(4)),
                PriorityEntry::new(A::Dispatch).when(C::ComboPointsBelow(5)),
                PriorityEntry::new(A::Mutilate).when(C::ComboPointsBelow(4)),
            ],
            Specialization::Combat => vec![
                PriorityEntry::new(A::TricksOfTheTrade),
                PriorityEntry::new(A::AdrenalineRush),
                PriorityEntry::new(A::KillingSpree).when(C::BuffDown(BuffKind::AdrenalineRush)),
                PriorityEntry::new(A::SliceAndDice).when(snd_low),
                PriorityEntry::new(A::RevealingStrike)
                    .when(C::DebuffDown(BuffKind::RevealingStrike))
                    .when(C::ComboPointsBelow(5)),
                PriorityEntry::new(A::Rupture)
                    .when(C::DotMissing(A::Rupture))
                    .when(C::ComboPointsAtLeast(5)),
                PriorityEntry::new(A::Eviscerate).when(C::ComboPointsAtLeast(5)),
                PriorityEntry::new(A::SinisterStrike).when(C::ComboPointsBelow(5)),
            ],
            Specialization::Subtlety => vec![
                PriorityEntry::new(A::Stealth),
                PriorityEntry::new(A::TricksOfTheTrade),
                PriorityEntry::new(A::ShadowDance).when(C::EnergyAtLeast(75.0)),
                PriorityEntry::new(A::Preparation).when(C::CooldownRunning(CooldownKind::Vanish)),
                PriorityEntry::new(A::Shadowstep).when(C::BuffDown(BuffKind::Shadowstep)),
                PriorityEntry::new(A::Ambush).when(C::ComboPointsBelow(5)),
                PriorityEntry::new(A::SliceAndDice).when(snd_low),
                PriorityEntry::new(A::Rupture)
                    .when(C::DotMissing(A::Rupture))
                    .when(C::ComboPointsAtLeast(5)),
                PriorityEntry::new(A::Recuperate)
                    .when(C::BuffDown(BuffKind::Recuperate))
                    .when(C::ComboPointsAtLeast(5)),
                PriorityEntry::new(A::Eviscerate).when(C::ComboPointsAtLeast(5)),
                PriorityEntry::new(A::Hemorrhage)
                    .when(C::DotMissing(A::Hemorrhage))
                    .when(C::ComboPointsBelow(5)),
                PriorityEntry::new(A::Backstab).when(C::ComboPointsBelow(5)),
            ],
        };
        Self::new(entries)
    }
}
