//! `rogue-sim`: run rogue combat simulations from the command line.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Parser};
use rogue_content::{CharacterLoader, CharacterSpec, ConfigLoader, SpellLoader};
use rogue_core::{RogueActor, SpellBook, Specialization, Tick};
use rogue_runtime::{Simulation, SimulationConfig, init_logging};
use tracing::{info, warn};

/// Rogue combat simulator
#[derive(Parser)]
#[command(name = "rogue-sim")]
#[command(about = "Discrete-event rogue combat simulator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Simulate fights and print the aggregated report
    Run(RunArgs),

    /// Load every input and list configuration diagnostics
    Check(InputArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Simulation settings (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Character build (TOML); repeat for a party of rogues
    #[arg(long = "character")]
    characters: Vec<PathBuf>,

    /// Add a talented preset rogue (assassination, combat, subtlety)
    #[arg(long = "preset", value_parser = parse_specialization)]
    presets: Vec<Specialization>,

    /// Directory with `abilities.ron` / `buffs.ron` overriding embedded rows
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Mechanics tunables (TOML), replacing the `[rogue]` section
    #[arg(long)]
    engine_config: Option<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(short = 'n', long)]
    iterations: Option<u64>,

    #[arg(long)]
    seed: Option<u64>,

    /// Fight length in seconds
    #[arg(long)]
    fight_length: Option<f64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log filter when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_specialization(value: &str) -> std::result::Result<Specialization, String> {
    Specialization::from_str(value).map_err(|_| format!("unknown specialization `{value}`"))
}

struct Inputs {
    config: SimulationConfig,
    characters: Vec<CharacterSpec>,
    book: SpellBook,
}

impl InputArgs {
    fn load(&self) -> Result<Inputs> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(path) = &self.engine_config {
            config.rogue = ConfigLoader::load(path)?;
        }

        let book = match &self.data_dir {
            Some(dir) => SpellLoader::with_overrides(dir)?,
            None => SpellLoader::embedded()?,
        };

        let mut characters = self
            .characters
            .iter()
            .map(|path| CharacterLoader::load(path))
            .collect::<Result<Vec<_>>>()?;
        characters.extend(self.presets.iter().copied().map(CharacterSpec::preset));
        if characters.is_empty() {
            characters.push(CharacterSpec::default());
        }

        Ok(Inputs {
            config,
            characters,
            book,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
        Command::Check(args) => check(&args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let Inputs {
        mut config,
        characters,
        book,
    } = args.input.load()?;

    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(seconds) = args.fight_length {
        config.fight_length = Tick::from_secs_f64(seconds);
    }

    let level = args.log_level.as_deref().unwrap_or(&config.logging.level).to_owned();
    let file = args.log_file.as_deref().or(config.logging.file.as_deref());
    let _guard = init_logging(&level, file)?;

    let mut simulation = Simulation::new(config, &characters, &book)?;
    let report = simulation.run()?;

    if args.json {
        println!("{}", report.to_json().context("failed to encode report")?);
    } else {
        print!("{report}");
    }
    Ok(())
}

fn check(args: &InputArgs) -> Result<()> {
    let _guard = init_logging("warn", None::<&Path>)?;
    let inputs = args.load()?;
    inputs.config.validate()?;

    let mut clean = true;
    for (index, character) in inputs.characters.iter().enumerate() {
        let actor = RogueActor::new(
            Simulation::rogue_id(index)?,
            inputs.config.rogue.clone(),
            character.profile.clone(),
            character.stats.clone(),
            &inputs.book,
        );
        for diagnostic in actor.telemetry().diagnostics() {
            clean = false;
            warn!(character = %character.name, %diagnostic, "configuration diagnostic");
            println!("{}: {diagnostic}", character.name);
        }
    }
    if clean {
        info!("inputs are consistent");
        println!("ok: {} character(s), no diagnostics", inputs.characters.len());
    }
    Ok(())
}
