//! Headless симуляция MARKSMAN
//!
//! Authority + observer в одном процессе, связанные loopback транспортом с потерями.
//! Observer подключается поздно (durable init replay) и к концу сверяет ground truth.

use std::time::Duration;

use bevy::ecs::event::Events;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use marksman_simulation::*;

const TICK: f64 = 1.0 / 64.0;
const TICKS: usize = 2000;
const OBSERVER_JOIN_TICK: usize = 300;

fn build_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(TICK)))
        .add_plugins((SimulationPlugin, HeadlessMovementPlugin));

    // Игрок стоит в центре арены (у каждого участника своя копия)
    app.world_mut().spawn((Threat, Transform::from_xyz(0.0, 0.0, 0.0)));
    app
}

fn main() {
    let seed = 42;
    println!("Starting MARKSMAN headless simulation (seed: {})", seed);

    let mut authority = build_app(seed);
    let config = HunterConfig {
        enable_ammo_limit: true,
        total_ammo: 8,
        enable_burst_mode: true,
        burst_shots: 3,
        ..HunterConfig::default()
    };

    let positions = [Vec3::new(18.0, 0.0, 0.0), Vec3::new(-15.0, 0.0, 12.0), Vec3::new(4.0, 0.0, -30.0)];
    authority
        .world_mut()
        .resource_scope(|world, mut rng: Mut<DeterministicRng>| {
            let mut commands = world.commands();
            for (index, position) in positions.into_iter().enumerate() {
                let spawn = HunterSpawn::new(NetworkId(index as u64 + 1), position, config.clone());
                spawn_authority_hunter(&mut commands, spawn, &mut rng.rng);
            }
        });
    authority.world_mut().flush();

    let mut observer: Option<App> = None;
    let mut link = LoopbackLink::new(seed ^ 0x5eed, 0.3);
    let mut fired = 0usize;

    for tick in 0..TICKS {
        authority.update();
        fired += authority
            .world_mut()
            .resource_mut::<Events<FireEffect>>()
            .drain()
            .count();

        if let Err(err) = link.collect(authority.world_mut()) {
            eprintln!("Transport error: {}", err);
            return;
        }

        if tick == OBSERVER_JOIN_TICK {
            let mut late = build_app(seed + 1);
            match link.replay_durable(late.world_mut()) {
                Ok(count) => println!("Tick {}: observer joined, {} durable messages replayed", tick, count),
                Err(err) => eprintln!("Durable replay failed: {}", err),
            }
            observer = Some(late);
        }

        if let Some(observer) = observer.as_mut() {
            if let Err(err) = link.deliver(&mut [observer.world_mut()]) {
                eprintln!("Transport error: {}", err);
                return;
            }
            observer.update();
        } else if let Err(err) = link.deliver(&mut []) {
            eprintln!("Transport error: {}", err);
            return;
        }

        if tick % 200 == 0 {
            let hunters = authority
                .world_mut()
                .query::<&Hunter>()
                .iter(authority.world())
                .count();
            println!("Tick {}: {} hunters, {} shots fired", tick, hunters, fired);
        }
    }

    report_convergence(&mut authority, observer.as_mut());
    println!("Link: {:?}", link.stats);
    println!("Simulation complete!");
}

/// Сверка ground truth authority и observer mirror по NetworkId
fn report_convergence(authority: &mut App, observer: Option<&mut App>) {
    let Some(observer) = observer else {
        return;
    };

    let truth: Vec<(NetworkId, HunterState, replication::CombatSnapshot)> = authority
        .world_mut()
        .query::<(&NetworkId, &HunterState, &AuthorityCombat)>()
        .iter(authority.world())
        .map(|(id, state, combat)| (*id, *state, combat.snapshot()))
        .collect();

    for (id, state, snapshot) in truth {
        let mirrored = observer
            .world_mut()
            .query::<(&NetworkId, &HunterState, &ObserverMirror)>()
            .iter(observer.world())
            .find(|(other, _, _)| **other == id)
            .map(|(_, state, mirror)| (*state, mirror.ground_truth()));

        match mirrored {
            Some((mirror_state, mirror_snapshot)) => println!(
                "{:?}: authority {:?} {:?} | observer {:?} {:?}",
                id, state, snapshot, mirror_state, mirror_snapshot
            ),
            None => println!("{:?}: authority {:?}, observer has no mirror", id, state),
        }
    }
}
