use rogue_content::{CharacterSpec, SpellLoader};
use rogue_core::{
    AbilityKind, ActorId, AlwaysHit, HitRequest, HitResolver, HitResult, PcgRng, RngOracle,
    RogueActor, RogueConfig, SimEnv, Specialization, TargetProfile, Tick,
};
use rogue_runtime::{EventQueue, QueueEvent, RuntimeError, Simulation, SimulationConfig};

fn short_fights(iterations: u64) -> SimulationConfig {
    SimulationConfig {
        iterations,
        fight_length: Tick::from_secs(60),
        ..SimulationConfig::default()
    }
}

fn party(specs: &[Specialization]) -> Vec<CharacterSpec> {
    specs.iter().copied().map(CharacterSpec::preset).collect()
}

#[test]
fn same_seed_reproduces_the_report() {
    let book = SpellLoader::embedded().unwrap();
    let characters = party(&[Specialization::Combat, Specialization::Subtlety]);

    let first = Simulation::new(short_fights(3), &characters, &book)
        .unwrap()
        .run()
        .unwrap();
    let second = Simulation::new(short_fights(3), &characters, &book)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn every_preset_deals_damage() {
    let book = SpellLoader::embedded().unwrap();
    let characters = party(&[
        Specialization::Assassination,
        Specialization::Combat,
        Specialization::Subtlety,
    ]);

    let report = Simulation::new(short_fights(2), &characters, &book)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.iterations, 2);
    assert_eq!(report.actors.len(), 3);
    for actor in &report.actors {
        assert!(actor.dps > 0.0, "{} dealt no damage", actor.name);
    }
    let combat = &report.actors[1];
    assert!(combat.abilities.contains_key("sinister_strike"));
    let raid: f64 = report.actors.iter().map(|actor| actor.dps).sum();
    assert!((report.raid_dps - raid).abs() < 1e-9);
}

#[test]
fn tricks_of_the_trade_reaches_the_configured_ally() {
    let book = SpellLoader::embedded().unwrap();
    let mut combat = CharacterSpec::preset(Specialization::Combat);
    combat.profile.tricks_target = Some(ActorId(3));

    let mut simulation = Simulation::new(short_fights(1), &[combat], &book).unwrap();
    simulation.run().unwrap();

    assert!(simulation.ally_applications(ActorId(3)) > 0);
    assert_eq!(simulation.ally_applications(ActorId(4)), 0);
}

#[test]
fn missing_off_hand_disables_killing_spree_for_the_whole_run() {
    let book = SpellLoader::embedded().unwrap();
    let mut combat = CharacterSpec::preset(Specialization::Combat);
    combat.stats.off_hand = None;

    let mut simulation = Simulation::new(short_fights(2), &[combat], &book).unwrap();
    let report = simulation.run().unwrap();

    let actor = &report.actors[0];
    assert!(!actor.diagnostics.is_empty());
    assert!(!actor.abilities.contains_key("killing_spree_main_hand"));
    let actor = &simulation.rogues()[0].actor;
    assert!(actor.is_disabled(AbilityKind::KillingSpree));

    let mut rng = PcgRng::new(1);
    let mut queue = EventQueue::new();
    let target = TargetProfile::default();
    let env = SimEnv::new(&mut rng, &mut queue, &AlwaysHit, &target);
    assert!(!actor.ready(AbilityKind::KillingSpree, ActorId::PRIMARY_TARGET, &env));
}

#[test]
fn empty_party_is_rejected() {
    let book = SpellLoader::embedded().unwrap();
    assert!(Simulation::new(SimulationConfig::default(), &[], &book).is_err());
}

#[test]
fn rogue_ids_follow_the_party_order_until_they_run_out() {
    assert_eq!(
        Simulation::rogue_id(2).unwrap(),
        ActorId(Simulation::FIRST_ROGUE_ID + 2)
    );
    let last = usize::try_from(u32::MAX - Simulation::FIRST_ROGUE_ID).unwrap();
    assert_eq!(Simulation::rogue_id(last).unwrap(), ActorId(u32::MAX));
    assert!(matches!(
        Simulation::rogue_id(last + 1),
        Err(RuntimeError::TooManyActors { .. })
    ));
}

#[test]
fn timers_armed_before_a_reset_are_inert() {
    let book = SpellLoader::embedded().unwrap();
    let character = CharacterSpec::preset(Specialization::Combat);
    let mut actor = RogueActor::new(
        ActorId(10),
        RogueConfig::default(),
        character.profile,
        character.stats,
        &book,
    );
    let mut rng = PcgRng::new(5);
    let mut queue = EventQueue::new();
    let target = TargetProfile::default();

    {
        let mut env = SimEnv::new(&mut rng, &mut queue, &AlwaysHit, &target);
        actor.start_auto_attack(&mut env);
    }
    assert!(actor.live_timers() > 0);
    actor.reset();
    assert_eq!(actor.live_timers(), 0);

    while let Some((_, event)) = queue.pop() {
        let QueueEvent::Actor(event) = event else {
            continue;
        };
        let mut env = SimEnv::new(&mut rng, &mut queue, &AlwaysHit, &target);
        actor.on_timer(event.timer, &mut env).unwrap();
    }
    assert_eq!(actor.telemetry().total_damage(), 0.0);
    assert_eq!(actor.telemetry().damage(AbilityKind::AutoAttackMainHand).hits, 0);
}

struct AlwaysMiss;

impl HitResolver for AlwaysMiss {
    fn resolve(&self, request: &HitRequest, _rng: &mut dyn RngOracle) -> HitResult {
        if request.may_miss() {
            HitResult::Miss
        } else {
            HitResult::Hit
        }
    }
}

#[test]
fn missed_strike_refunds_eighty_percent_of_its_cost() {
    let book = SpellLoader::embedded().unwrap();
    let character = CharacterSpec::preset(Specialization::Combat);
    let mut actor = RogueActor::new(
        ActorId(10),
        RogueConfig::default(),
        character.profile,
        character.stats,
        &book,
    );
    let mut rng = PcgRng::new(5);
    let mut queue = EventQueue::new();
    let target = TargetProfile::default();
    let mut env = SimEnv::new(&mut rng, &mut queue, &AlwaysMiss, &target);

    let before = actor.energy().current();
    let report = actor
        .execute(AbilityKind::SinisterStrike, ActorId::PRIMARY_TARGET, &mut env)
        .unwrap();

    assert_eq!(report.result, HitResult::Miss);
    assert_eq!(report.energy_spent, 40.0);
    assert!((report.energy_refunded - 32.0).abs() < 1e-9);
    assert!((actor.energy().current() - (before - 8.0)).abs() < 1e-9);
    assert_eq!(actor.combo_points(ActorId::PRIMARY_TARGET), 0);
}

fn combat_rogue(book: &rogue_core::SpellBook) -> RogueActor {
    let character = CharacterSpec::preset(Specialization::Combat);
    RogueActor::new(
        ActorId(10),
        RogueConfig::default(),
        character.profile,
        character.stats,
        book,
    )
}

#[test]
fn expose_armor_builds_a_point_from_nothing() {
    let book = SpellLoader::embedded().unwrap();
    let mut actor = combat_rogue(&book);
    let mut rng = PcgRng::new(5);
    let mut queue = EventQueue::new();
    let target = TargetProfile::default();
    let primary = ActorId::PRIMARY_TARGET;

    let mut env = SimEnv::new(&mut rng, &mut queue, &AlwaysHit, &target);
    assert_eq!(actor.readiness(AbilityKind::ExposeArmor, primary, &env), Ok(()));

    actor.add_combo_points(primary, 3, "test");
    let report = actor.execute(AbilityKind::ExposeArmor, primary, &mut env).unwrap();

    assert_eq!(report.result, HitResult::Hit);
    assert_eq!(actor.combo_points(primary), 4);
}

#[test]
fn sword_hemorrhage_still_bleeds() {
    let book = SpellLoader::embedded().unwrap();
    let mut actor = combat_rogue(&book);
    let mut rng = PcgRng::new(5);
    let mut queue = EventQueue::new();
    let target = TargetProfile::default();
    let primary = ActorId::PRIMARY_TARGET;

    let mut env = SimEnv::new(&mut rng, &mut queue, &AlwaysHit, &target);
    actor.execute(AbilityKind::Hemorrhage, primary, &mut env).unwrap();

    assert!(
        actor
            .target(primary)
            .is_some_and(|data| data.is_ticking(AbilityKind::Hemorrhage))
    );
}
