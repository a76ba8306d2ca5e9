//! Aggregated results of a simulation run.
//!
//! Telemetry accumulates over every iteration; reports divide by the
//! iteration count so that counts read per fight.

use std::collections::BTreeMap;
use std::fmt;

use rogue_core::{RogueActor, Specialization, Telemetry, Tick};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub iterations: u64,
    pub fight_length: Tick,
    pub raid_dps: f64,
    pub actors: Vec<ActorReport>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ActorReport {
    pub id: u32,
    pub name: String,
    pub specialization: Specialization,
    pub dps: f64,
    /// Damage per fight.
    pub damage: f64,
    pub abilities: BTreeMap<String, AbilityReport>,
    /// Occurrences per fight.
    pub procs: BTreeMap<String, f64>,
    /// Energy per fight.
    pub gains: BTreeMap<String, GainReport>,
    pub diagnostics: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AbilityReport {
    pub damage: f64,
    pub share: f64,
    pub hits: f64,
    pub crits: f64,
    pub misses: f64,
    pub ticks: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct GainReport {
    pub actual: f64,
    pub overflow: f64,
}

impl ActorReport {
    pub fn new(name: &str, actor: &RogueActor, iterations: u64, fight_length: Tick) -> Self {
        let per_fight = 1.0 / iterations.max(1) as f64;
        let telemetry = actor.telemetry();
        let damage = telemetry.total_damage() * per_fight;
        let seconds = fight_length.as_secs_f64();

        Self {
            id: actor.id().0,
            name: name.to_owned(),
            specialization: actor.profile().specialization,
            dps: if seconds > 0.0 { damage / seconds } else { 0.0 },
            damage,
            abilities: abilities(telemetry, per_fight),
            procs: telemetry
                .procs()
                .map(|(kind, count)| (kind.to_string(), count as f64 * per_fight))
                .collect(),
            gains: telemetry
                .gains()
                .map(|(source, record)| {
                    let report = GainReport {
                        actual: record.actual * per_fight,
                        overflow: record.overflow * per_fight,
                    };
                    (source.to_string(), report)
                })
                .collect(),
            diagnostics: telemetry.diagnostics().iter().map(ToString::to_string).collect(),
        }
    }
}

fn abilities(telemetry: &Telemetry, per_fight: f64) -> BTreeMap<String, AbilityReport> {
    let total = telemetry.total_damage();
    telemetry
        .damage_records()
        .map(|(ability, record)| {
            let report = AbilityReport {
                damage: record.total * per_fight,
                share: if total > 0.0 { record.total / total } else { 0.0 },
                hits: record.hits as f64 * per_fight,
                crits: record.crits as f64 * per_fight,
                misses: record.misses as f64 * per_fight,
                ticks: record.ticks as f64 * per_fight,
            };
            (ability.to_string(), report)
        })
        .collect()
}

impl SimulationReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} iterations of {} (seed {:#x}): raid dps {:.1}",
            self.iterations, self.fight_length, self.seed, self.raid_dps
        )?;
        for actor in &self.actors {
            writeln!(
                f,
                "\n{} #{} ({}): {:.1} dps",
                actor.name, actor.id, actor.specialization, actor.dps
            )?;
            let mut rows: Vec<_> = actor.abilities.iter().collect();
            rows.sort_by(|a, b| b.1.damage.total_cmp(&a.1.damage));
            for (ability, row) in rows {
                writeln!(
                    f,
                    "  {ability:<24} {:>6.1}%  hits {:>7.1}  crits {:>7.1}  ticks {:>7.1}",
                    row.share * 100.0,
                    row.hits,
                    row.crits,
                    row.ticks
                )?;
            }
            for diagnostic in &actor.diagnostics {
                writeln!(f, "  warning: {diagnostic}")?;
            }
        }
        Ok(())
    }
}
