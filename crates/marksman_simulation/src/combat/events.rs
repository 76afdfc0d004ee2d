//! Combat events (gameplay сигналы внутри процесса)

use bevy::prelude::*;

use crate::components::NetworkId;

/// Внешний сигнал «actor получил урон» (от хоста)
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageEvent {
    pub entity: Entity,
}

/// Выстрел: хост спавнит трассер/звук и делает hit resolution
#[derive(Event, Debug, Clone, Copy)]
pub struct FireEffect {
    pub shooter: Entity,
    pub network_id: NetworkId,
    pub origin: Vec3,
    pub target_point: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionKind {
    /// Шум/подозрение в точке
    Investigate { point: Vec3 },
    /// Игрок коснулся hunter'а
    TouchPlayer { position: Vec3 },
    /// Игрок коснулся hunter'а предметом в руках
    TouchGrabbedObject { position: Vec3 },
    /// Hunter'а схватили
    Grabbed,
}

impl InteractionKind {
    /// Точка, на которую стоит навестись (если есть)
    pub fn focus_point(&self) -> Option<Vec3> {
        match *self {
            InteractionKind::Investigate { point } => Some(point),
            InteractionKind::TouchPlayer { position }
            | InteractionKind::TouchGrabbedObject { position } => Some(position),
            InteractionKind::Grabbed => None,
        }
    }
}

/// Внешний interaction trigger (от хоста)
#[derive(Event, Debug, Clone, Copy)]
pub struct InteractionTrigger {
    pub entity: Entity,
    pub kind: InteractionKind,
}

/// Локальный presentation cue (бормотание/звук при блуждании)
#[derive(Event, Debug, Clone, Copy)]
pub struct WanderCue {
    pub entity: Entity,
    pub position: Vec3,
}
