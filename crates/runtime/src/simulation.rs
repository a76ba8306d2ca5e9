//! The discrete-event driver.
//!
//! One [`Simulation`] owns the rogues, their random streams, the event queue
//! and the encounter. Each iteration resets every actor, seeds fresh streams
//! and pops queue entries until the fight length is reached:
//!
//! - actor timers go back to the actor that armed them,
//! - decisions consult the rogue's [`Rotation`] and reschedule themselves,
//! - regeneration ticks every actor's energy.
//!
//! After every actor call the driver forwards the cross-actor fallout: real
//! crits notify the other rogues' Honor Among Thieves listeners and queued
//! [`AllyEffect`]s land in the recipient's buff table.

use std::collections::BTreeMap;

use rogue_content::CharacterSpec;
use rogue_core::{
    ActorId, AllyEffect, BuffDef, BuffKind, BuffTable, CooldownKind, ExecuteError, PcgRng,
    RogueActor, Scheduler, SimEnv, SimError, SpellBook, SpellOracle, Telemetry, Tick, compute_seed,
};
use tracing::{debug, info, trace};

use crate::config::SimulationConfig;
use crate::error::{Result, RuntimeError};
use crate::oracle::Encounter;
use crate::queue::{EventQueue, QueueEvent};
use crate::report::{ActorReport, SimulationReport};
use crate::rotation::Rotation;

/// One simulated rogue and the priority list that drives it.
pub struct Rogue {
    pub name: String,
    pub actor: RogueActor,
    pub rotation: Rotation,
}

pub struct Simulation {
    config: SimulationConfig,
    rogues: Vec<Rogue>,
    rngs: Vec<PcgRng>,
    queue: EventQueue,
    encounter: Encounter,
    /// Buff tables of non-rogue party members receiving ally effects.
    allies: BTreeMap<ActorId, BuffTable>,
    ally_defs: Vec<BuffDef>,
    ally_applications: BTreeMap<ActorId, u64>,
    iterations_run: u64,
}

impl Simulation {
    /// First id handed to rogues; lower ids are left to opponents and allies.
    pub const FIRST_ROGUE_ID: u32 = 10;

    pub fn new(config: SimulationConfig, characters: &[CharacterSpec], book: &SpellBook) -> Result<Self> {
        config.validate()?;
        if characters.is_empty() {
            return Err(RuntimeError::NoActors);
        }

        let rogues = characters
            .iter()
            .enumerate()
            .map(|(index, character)| -> Result<Rogue> {
                let id = Self::rogue_id(index)?;
                let actor = RogueActor::new(
                    id,
                    config.rogue.clone(),
                    character.profile.clone(),
                    character.stats.clone(),
                    book,
                );
                let rotation = config
                    .rotation
                    .for_specialization(character.profile.specialization);
                Ok(Rogue {
                    name: character.name.clone(),
                    actor,
                    rotation,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let ally_defs = book
            .buff(BuffKind::TricksOfTheTrade)
            .cloned()
            .into_iter()
            .collect();

        Ok(Self {
            rngs: rogues.iter().map(|_| PcgRng::new(config.seed)).collect(),
            encounter: Encounter::new(config.target),
            config,
            rogues,
            queue: EventQueue::new(),
            allies: BTreeMap::new(),
            ally_defs,
            ally_applications: BTreeMap::new(),
            iterations_run: 0,
        })
    }

    /// Actor id of the rogue at `index` in the party.
    pub fn rogue_id(index: usize) -> Result<ActorId> {
        u32::try_from(index)
            .ok()
            .and_then(|offset| Self::FIRST_ROGUE_ID.checked_add(offset))
            .map(ActorId)
            .ok_or(RuntimeError::TooManyActors { index })
    }

    pub fn rogues(&self) -> &[Rogue] {
        &self.rogues
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Times a non-rogue party member received an ally effect.
    pub fn ally_applications(&self, recipient: ActorId) -> u64 {
        self.ally_applications.get(&recipient).copied().unwrap_or(0)
    }

    /// Runs every configured iteration and aggregates the result.
    pub fn run(&mut self) -> Result<SimulationReport> {
        info!(
            rogues = self.rogues.len(),
            iterations = self.config.iterations,
            fight = %self.config.fight_length,
            seed = self.config.seed,
            "simulation started"
        );
        for iteration in 0..self.config.iterations {
            self.run_iteration(iteration)?;
        }
        let report = self.report();
        info!(raid_dps = report.raid_dps, "simulation finished");
        Ok(report)
    }

    /// Runs one fight from a clean combat state.
    pub fn run_iteration(&mut self, iteration: u64) -> Result<()> {
        self.begin(iteration);

        while let Some((at, event)) = self.queue.pop() {
            if at > self.config.fight_length {
                break;
            }
            let progress = at.as_secs_f64() / self.config.fight_length.as_secs_f64();
            self.encounter.set_progress(progress);

            match event {
                QueueEvent::Actor(event) => {
                    let Some(index) = self.index_of(event.actor) else {
                        trace!(actor = %event.actor, "event for unknown actor dropped");
                        continue;
                    };
                    let crits = crit_count(self.rogues[index].actor.telemetry());
                    let outcome = {
                        let mut env = SimEnv::new(
                            &mut self.rngs[index],
                            &mut self.queue,
                            &self.config.attack_table,
                            &self.encounter,
                        );
                        self.rogues[index].actor.on_timer(event.timer, &mut env)
                    };
                    self.check(iteration, index, outcome)?;
                    self.forward(index, crits);
                }
                QueueEvent::Decision(actor) => {
                    if let Some(index) = self.index_of(actor) {
                        self.decide(iteration, index)?;
                    }
                }
                QueueEvent::Regen => {
                    let interval = self.config.regen_interval;
                    for rogue in &mut self.rogues {
                        rogue.actor.regen(interval, at);
                    }
                    self.queue.push(interval, QueueEvent::Regen);
                }
            }
        }

        self.iterations_run += 1;
        debug!(iteration, "iteration finished");
        Ok(())
    }

    fn begin(&mut self, iteration: u64) {
        self.queue.clear();
        self.allies.clear();
        self.encounter.set_progress(0.0);

        for (index, rogue) in self.rogues.iter_mut().enumerate() {
            rogue.actor.reset();
            self.rngs[index] = PcgRng::new(compute_seed(
                self.config.seed,
                iteration,
                rogue.actor.id().0,
            ));

            let mut env = SimEnv::new(
                &mut self.rngs[index],
                &mut self.queue,
                &self.config.attack_table,
                &self.encounter,
            );
            rogue.actor.combat_begin(&mut env);
            rogue.actor.start_auto_attack(&mut env);
            self.queue
                .push(Tick::ZERO, QueueEvent::Decision(rogue.actor.id()));
        }
        self.queue
            .push(self.config.regen_interval, QueueEvent::Regen);
    }

    fn decide(&mut self, iteration: u64, index: usize) -> Result<()> {
        let crits = crit_count(self.rogues[index].actor.telemetry());
        let outcome = {
            let rogue = &mut self.rogues[index];
            let mut env = SimEnv::new(
                &mut self.rngs[index],
                &mut self.queue,
                &self.config.attack_table,
                &self.encounter,
            );
            let target = rogue.actor.primary_target();
            match rogue.rotation.choose(&rogue.actor, target, &env) {
                Some(ability) => rogue
                    .actor
                    .execute(ability, target, &mut env)
                    .map(|report| {
                        trace!(
                            actor = %rogue.actor.id(),
                            %ability,
                            result = %report.result,
                            damage = report.damage,
                            "cast"
                        );
                    }),
                None => Ok(()),
            }
        };
        self.check(iteration, index, outcome)?;
        self.forward(index, crits);

        let actor = &self.rogues[index].actor;
        let now = self.queue.now();
        let delay = actor
            .available()
            .max(actor.cooldowns().remains(CooldownKind::Global, now));
        self.queue.push(delay, QueueEvent::Decision(actor.id()));
        Ok(())
    }

    /// Stops the run on fatal engine errors; everything else is logged.
    fn check(&self, iteration: u64, index: usize, outcome: std::result::Result<(), ExecuteError>) -> Result<()> {
        let Err(error) = outcome else {
            return Ok(());
        };
        let actor = self.rogues[index].actor.id();
        if error.severity().is_fatal() {
            return Err(RuntimeError::Engine {
                iteration,
                actor,
                at: self.queue.now(),
                source: error,
            });
        }
        debug!(%actor, code = error.error_code(), %error, "action skipped");
        Ok(())
    }

    /// Delivers crit notifications and ally effects produced by `index`.
    fn forward(&mut self, index: usize, crits_before: u64) {
        let donor = self.rogues[index].actor.id();
        if crit_count(self.rogues[index].actor.telemetry()) > crits_before {
            for other in 0..self.rogues.len() {
                if other == index {
                    continue;
                }
                let mut env = SimEnv::new(
                    &mut self.rngs[other],
                    &mut self.queue,
                    &self.config.attack_table,
                    &self.encounter,
                );
                self.rogues[other].actor.on_party_crit(donor, &mut env);
            }
        }

        let effects = self.rogues[index].actor.drain_ally_effects();
        for effect in effects {
            self.deliver(index, effect);
        }
    }

    fn deliver(&mut self, source: usize, effect: AllyEffect) {
        let now = self.queue.now();
        let defs = &self.ally_defs;
        let table = self
            .allies
            .entry(effect.recipient)
            .or_insert_with(|| BuffTable::new(defs.iter().cloned()));
        if effect.apply(table, now, &mut self.rngs[source]).is_some() {
            debug!(source = %effect.source, recipient = %effect.recipient, buff = %effect.buff, "ally effect applied");
            *self.ally_applications.entry(effect.recipient).or_default() += 1;
        }
    }

    fn index_of(&self, actor: ActorId) -> Option<usize> {
        self.rogues.iter().position(|rogue| rogue.actor.id() == actor)
    }

    /// Aggregates telemetry over the iterations run so far.
    pub fn report(&self) -> SimulationReport {
        let iterations = self.iterations_run.max(1);
        let fight_length = self.config.fight_length;
        let actors: Vec<ActorReport> = self
            .rogues
            .iter()
            .map(|rogue| ActorReport::new(&rogue.name, &rogue.actor, iterations, fight_length))
            .collect();
        SimulationReport {
            seed: self.config.seed,
            iterations: self.iterations_run,
            fight_length,
            raid_dps: actors.iter().map(|actor| actor.dps).sum(),
            actors,
        }
    }
}

fn crit_count(telemetry: &Telemetry) -> u64 {
    telemetry.damage_records().map(|(_, record)| record.crits).sum()
}
