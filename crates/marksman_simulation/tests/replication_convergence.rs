//! Replication integration test
//!
//! Authority и observer — два отдельных App, связанные `LoopbackLink` (wire codec + потери
//! best-effort). Проверяем:
//! - ground truth mirror'а совпадает с authority после каждого тика
//! - guard verdicts совпадают, даже если локальный config observer'а другой
//! - late join через durable init
//! - despawn на authority удаляет mirror у observer
//! - hand-off authority сохраняет ammo и out-of-ammo latch

mod common;

use bevy::prelude::*;
use common::*;
use marksman_simulation::ai::AimBlock;
use marksman_simulation::replication::{CombatSnapshot, RetiredHunters};
use marksman_simulation::*;

fn arena_config() -> HunterConfig {
    HunterConfig {
        enable_ammo_limit: true,
        total_ammo: 5,
        enable_burst_mode: true,
        burst_shots: 2,
        ..HunterConfig::default()
    }
}

fn spawn_arena(app: &mut App) {
    spawn_threat(app, Vec3::ZERO);
    let config = arena_config();
    spawn_hunter(app, 1, Vec3::new(10.0, 0.0, 0.0), config.clone());
    spawn_hunter(app, 2, Vec3::new(-6.0, 0.0, 14.0), config.clone());
    spawn_hunter(app, 3, Vec3::new(0.0, 0.0, -60.0), config);
}

fn authority_truth(app: &mut App) -> Vec<(NetworkId, HunterState, CombatSnapshot)> {
    let mut truth: Vec<_> = app
        .world_mut()
        .query::<(&NetworkId, &HunterState, &AuthorityCombat)>()
        .iter(app.world())
        .map(|(id, state, combat)| (*id, *state, combat.snapshot()))
        .collect();
    truth.sort_by_key(|(id, _, _)| *id);
    truth
}

fn mirrored_truth(app: &mut App) -> Vec<(NetworkId, HunterState, CombatSnapshot)> {
    let mut truth: Vec<_> = app
        .world_mut()
        .query::<(&NetworkId, &HunterState, &ObserverMirror)>()
        .iter(app.world())
        .map(|(id, state, mirror)| (*id, *state, mirror.ground_truth()))
        .collect();
    truth.sort_by_key(|(id, _, _)| *id);
    truth
}

/// Verdict guards + приём interaction triggers по каждому hunter'у
fn verdicts<F: Component>(app: &mut App) -> Vec<(NetworkId, HunterState, GuardVerdict, bool)> {
    let mut verdicts: Vec<_> = app
        .world_mut()
        .query_filtered::<(&NetworkId, &HunterState, &CombatPresentation), With<F>>()
        .iter(app.world())
        .map(|(id, state, presentation)| (*id, *state, presentation.verdict, presentation.accepts_interaction))
        .collect();
    verdicts.sort_by_key(|(id, ..)| *id);
    verdicts
}

/// Один тик пары: authority → link → observer
fn step(authority: &mut App, observer: &mut App, link: &mut LoopbackLink) {
    authority.update();
    drain::<FireEffect>(authority);
    link.collect(authority.world_mut()).unwrap();
    link.deliver(&mut [observer.world_mut()]).unwrap();
    observer.update();
}

#[test]
fn test_observer_converges_every_tick_despite_loss() {
    let mut authority = simulation_app(42);
    let mut observer = simulation_app(99);
    spawn_arena(&mut authority);
    spawn_threat(&mut observer, Vec3::ZERO);
    let mut link = LoopbackLink::new(7, 0.5);

    // Первый update — нулевой delta, FixedUpdate не запускается
    step(&mut authority, &mut observer, &mut link);

    for tick in 1..1500 {
        step(&mut authority, &mut observer, &mut link);

        assert_eq!(
            mirrored_truth(&mut observer),
            authority_truth(&mut authority),
            "diverged at tick {}",
            tick
        );
    }

    assert!(link.stats.dropped > 0, "loss never kicked in");
}

#[test]
fn test_guard_verdicts_agree_with_non_default_config() {
    let mut authority = simulation_app(13);
    let mut observer = simulation_app(14);
    spawn_threat(&mut authority, Vec3::ZERO);
    spawn_threat(&mut observer, Vec3::ZERO);

    // У observer'а в resource дефолт: лимита нет, retreat включён, burst выключен
    let config = HunterConfig {
        enable_ammo_limit: true,
        total_ammo: 4,
        retreat_while_reloading: false,
        enable_burst_mode: true,
        burst_shots: 2,
        ..config_with_tier(SkillTier::Slow)
    };
    spawn_hunter(&mut authority, 1, Vec3::new(10.0, 0.0, 0.0), config);
    spawn_hunter(&mut authority, 2, Vec3::new(-12.0, 0.0, 5.0), config);
    let mut link = LoopbackLink::new(17, 0.3);

    // Нулевой первый update + тик с announce
    step(&mut authority, &mut observer, &mut link);
    step(&mut authority, &mut observer, &mut link);

    // Observer mirrors несут config authority, а не свой дефолт
    let mirrored: Vec<HunterConfig> = observer
        .world_mut()
        .query_filtered::<&HunterConfig, With<ObserverMirror>>()
        .iter(observer.world())
        .copied()
        .collect();
    assert_eq!(mirrored.len(), 2);
    assert!(mirrored.iter().all(|mirrored| *mirrored == config));

    let mut seen: Vec<GuardVerdict> = Vec::new();
    for tick in 2..1200 {
        step(&mut authority, &mut observer, &mut link);

        let expected = verdicts::<AuthorityCombat>(&mut authority);
        assert_eq!(verdicts::<ObserverMirror>(&mut observer), expected, "verdicts diverged at tick {}", tick);
        for (_, _, verdict, _) in expected {
            if !seen.contains(&verdict) {
                seen.push(verdict);
            }
        }
    }

    // Без retreat перезарядка в Aim держит прицел, а не отступает
    assert!(seen.contains(&GuardVerdict::HoldAim(AimBlock::Reloading)), "seen {:?}", seen);
    assert!(!seen.contains(&GuardVerdict::Retreat));
}

#[test]
fn test_late_joiner_builds_mirrors_from_durable_init() {
    let mut authority = simulation_app(5);
    spawn_arena(&mut authority);
    let mut link = LoopbackLink::new(11, 0.2);

    // Никого нет: всё кроме durable теряется
    for _ in 0..240 {
        authority.update();
        drain::<FireEffect>(&mut authority);
        link.collect(authority.world_mut()).unwrap();
        link.deliver(&mut []).unwrap();
    }

    let mut observer = simulation_app(6);
    spawn_threat(&mut observer, Vec3::ZERO);
    observer.update();
    // Init + config на каждого живого hunter'а
    let replayed = link.replay_durable(observer.world_mut()).unwrap();
    assert_eq!(replayed, 2 * authority_truth(&mut authority).len());

    for tick in 0..600 {
        step(&mut authority, &mut observer, &mut link);
        assert_eq!(
            mirrored_truth(&mut observer),
            authority_truth(&mut authority),
            "late joiner diverged at tick {}",
            tick
        );
    }
}

#[test]
fn test_despawned_hunter_leaves_no_ghost_mirror() {
    let mut authority = simulation_app(8);
    let mut observer = simulation_app(9);
    spawn_threat(&mut authority, Vec3::ZERO);
    spawn_threat(&mut observer, Vec3::ZERO);

    // Один патрон → Leave → Despawn
    let config = HunterConfig {
        enable_ammo_limit: true,
        total_ammo: 1,
        ..HunterConfig::default()
    };
    spawn_hunter(&mut authority, 4, Vec3::new(10.0, 0.0, 0.0), config);
    let mut link = LoopbackLink::new(3, 0.0);

    for _ in 0..1000 {
        step(&mut authority, &mut observer, &mut link);
    }

    assert!(authority_truth(&mut authority).is_empty());
    assert!(mirrored_truth(&mut observer).is_empty());
    assert!(observer.world().resource::<RetiredHunters>().contains(&NetworkId(4)));

    // Durable init больше не воскрешает hunter'а
    assert_eq!(link.replay_durable(observer.world_mut()).unwrap(), 0);
}

#[test]
fn test_authority_handoff_keeps_ground_truth() {
    let mut authority = simulation_app(21);
    let mut observer = simulation_app(22);
    spawn_threat(&mut authority, Vec3::ZERO);
    spawn_threat(&mut observer, Vec3::ZERO);

    let config = HunterConfig {
        enable_ammo_limit: true,
        total_ammo: 4,
        ..HunterConfig::default()
    };
    let old_entity = spawn_hunter(&mut authority, 1, Vec3::new(10.0, 0.0, 0.0), config);
    let mut link = LoopbackLink::new(5, 0.0);

    // Пара выстрелов
    for _ in 0..400 {
        step(&mut authority, &mut observer, &mut link);
    }
    let before = authority_truth(&mut authority);
    assert_eq!(before.len(), 1);
    assert!(before[0].2.ammo_remaining < 4);

    // Старая authority отдаёт entity, observer становится authority
    let mirror_entity = observer
        .world_mut()
        .query_filtered::<Entity, With<ObserverMirror>>()
        .single(observer.world())
        .unwrap();
    authority
        .world_mut()
        .send_event(AuthorityTransfer::Demote { entity: old_entity });
    observer
        .world_mut()
        .send_event(AuthorityTransfer::Promote { entity: mirror_entity });
    authority.update();
    observer.update();

    // В тике hand-off новая authority уже гоняет FSM: максимум один выстрел
    let promoted = observer.world().get::<AuthorityCombat>(mirror_entity).unwrap();
    let ammo_before = before[0].2.ammo_remaining;
    assert!(promoted.ammo_remaining() <= ammo_before && promoted.ammo_remaining() + 1 >= ammo_before);
    assert!(!promoted.is_permanently_out_of_ammo());
    assert!(observer.world().get::<ObserverMirror>(mirror_entity).is_none());
    assert!(authority.world().get::<ObserverMirror>(old_entity).is_some());
}
