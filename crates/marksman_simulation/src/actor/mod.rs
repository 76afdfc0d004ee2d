//! Hunter entity: marker + spawn helpers
//!
//! Authority спавнит hunter'а с `AuthorityCombat` (roll skill tier, ammo из config),
//! observers — с `ObserverMirror` (late join по durable init).

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{CombatPresentation, HunterFsm, HunterState, WanderCueTimer};
use crate::combat::{AuthorityCombat, ObserverMirror, SkillTier};
use crate::components::{MovementCommand, NetworkId};
use crate::config::HunterConfig;
use crate::logger::log_info;

/// Hunter — AI стрелок
///
/// Автоматически добавляет FSM, presentation и movement intent через Required Components.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(HunterState, HunterFsm, CombatPresentation, MovementCommand, Transform, WanderCueTimer)]
pub struct Hunter;

/// Маркер: authority ещё не отправил durable init для этого hunter'а
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PendingAnnounce;

/// Параметры спавна hunter'а на authority
#[derive(Debug, Clone)]
pub struct HunterSpawn {
    pub network_id: NetworkId,
    pub position: Vec3,
    pub state: HunterState,
    pub config: HunterConfig,
}

impl HunterSpawn {
    pub fn new(network_id: NetworkId, position: Vec3, config: HunterConfig) -> Self {
        Self {
            network_id,
            position,
            state: HunterState::Idle,
            config,
        }
    }
}

/// Спавн hunter'а на authority
///
/// Config прогоняется через `sanitized()` и снимается на entity (дальнейшие изменения
/// resource'а этого hunter'а не трогают). Skill tier роллится один раз.
pub fn spawn_authority_hunter<R: Rng + ?Sized>(commands: &mut Commands, spawn: HunterSpawn, rng: &mut R) -> Entity {
    let config = spawn.config.sanitized();
    let skill = SkillTier::roll(config.skill_weights(), rng);
    let combat = AuthorityCombat::new(skill, &config);

    log_info(&format!(
        "🎯 Hunter {:?} spawned: {:?}, ammo {}",
        spawn.network_id,
        skill,
        combat.ammo_remaining()
    ));

    commands
        .spawn((
            Hunter,
            spawn.network_id,
            Transform::from_translation(spawn.position),
            spawn.state,
            HunterFsm::spawned(spawn.state, &config),
            WanderCueTimer::initial(&config, rng),
            combat,
            config,
            PendingAnnounce, // durable init уйдёт в этом же тике
        ))
        .id()
}

/// Спавн observer entity для hunter'а, которым владеет другой участник
pub fn spawn_observer_hunter<R: Rng + ?Sized>(
    commands: &mut Commands,
    network_id: NetworkId,
    mirror: ObserverMirror,
    state: HunterState,
    config: &HunterConfig,
    rng: &mut R,
) -> Entity {
    commands
        .spawn((
            Hunter,
            network_id,
            state,
            WanderCueTimer::initial(config, rng),
            mirror,
            *config,
        ))
        .id()
}
