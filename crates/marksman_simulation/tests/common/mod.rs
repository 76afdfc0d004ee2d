//! Общие helpers для integration тестов

#![allow(dead_code)]

use std::time::Duration;

use bevy::ecs::event::Events;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use marksman_simulation::logger::{set_log_level, LogLevel};
use marksman_simulation::*;

/// Ровно один FixedUpdate шаг на каждый `app.update()` (кроме первого, с нулевым delta)
pub const TICK: f64 = 1.0 / 64.0;

/// Headless App: SimulationPlugin + headless movement + manual time
pub fn simulation_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    set_log_level(LogLevel::Warning);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(TICK)))
        .add_plugins((SimulationPlugin, HeadlessMovementPlugin));
    app
}

pub fn spawn_threat(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((Threat, Transform::from_translation(position)))
        .id()
}

/// Authority hunter (RNG — общий `DeterministicRng` app'а)
pub fn spawn_hunter(app: &mut App, id: u64, position: Vec3, config: HunterConfig) -> Entity {
    let world = app.world_mut();
    let entity = world.resource_scope(|world, mut rng: Mut<DeterministicRng>| {
        let mut commands = world.commands();
        spawn_authority_hunter(
            &mut commands,
            HunterSpawn::new(NetworkId(id), position, config),
            &mut rng.rng,
        )
    });
    world.flush();
    entity
}

/// Конфиг с одним возможным skill tier
pub fn config_with_tier(tier: SkillTier) -> HunterConfig {
    let mut weights = [0; 3];
    weights[tier.index() as usize] = 1;
    HunterConfig {
        fast_skill_weight: weights[0],
        medium_skill_weight: weights[1],
        slow_skill_weight: weights[2],
        ..HunterConfig::default()
    }
}

/// Забрать все события типа `E`, накопленные с прошлого вызова
pub fn drain<E: Event>(app: &mut App) -> Vec<E> {
    app.world_mut()
        .get_resource_mut::<Events<E>>()
        .map(|mut events| events.drain().collect())
        .unwrap_or_default()
}

/// Все outbound сообщения одного тика
#[derive(Default)]
pub struct Recorded {
    pub fires: Vec<FireEffect>,
    pub outbound: Vec<ReplicationEnvelope>,
}

impl Recorded {
    pub fn record(&mut self, app: &mut App) {
        self.fires.extend(drain::<FireEffect>(app));
        self.outbound
            .extend(drain::<OutboundReplication>(app).into_iter().map(|OutboundReplication(envelope)| envelope));
    }

    pub fn predictions(&self) -> Vec<replication::PredictionEvent> {
        self.outbound
            .iter()
            .filter_map(|envelope| match envelope.payload {
                ReplicationPayload::Prediction(prediction) => Some(prediction),
                _ => None,
            })
            .collect()
    }
}

pub fn combat(app: &App, entity: Entity) -> &AuthorityCombat {
    app.world()
        .get::<AuthorityCombat>(entity)
        .expect("authority hunter")
}

pub fn state(app: &App, entity: Entity) -> HunterState {
    *app.world().get::<HunterState>(entity).expect("hunter state")
}
