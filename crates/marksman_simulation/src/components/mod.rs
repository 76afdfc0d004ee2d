//! Общие ECS компоненты, которые не принадлежат одному домену
//!
//! - NetworkId: стабильный id hunter'а для replication (одинаковый у всех участников)
//! - Threat: маркер цели (игроки), от которой уходим и в которую целимся
//! - MovementCommand: high-level intent движения (исполняет хост или headless movement)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Сетевой id hunter'а
///
/// Назначается authority при спавне, observers создают entity по нему
/// (late join через durable init). Ordering используется для детерминистичного
/// порядка обработки hunter'ов в FixedUpdate.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Reflect,
)]
#[reflect(Component)]
pub struct NetworkId(pub u64);

/// Маркер угрозы (игрок)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Threat;

/// Команда движения для hunter'а
///
/// Архитектура:
/// - FSM пишет MovementCommand (intent)
/// - хост конвертирует в navigation target (или `HeadlessMovementPlugin` в тестах)
/// - по прибытии команда сбрасывается в Idle
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub enum MovementCommand {
    /// Ничего не делать (не трогать текущий target)
    #[default]
    Idle,
    /// Двигаться к позиции (world coordinates)
    MoveToPosition { target: Vec3 },
    /// Остановиться немедленно
    Stop,
}
