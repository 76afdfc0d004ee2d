//! Hunter FSM components (behavior state + per-entity FSM memory).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::HunterConfig;

/// Behavior state hunter'а (реплицируется через reliable channel)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub enum HunterState {
    /// Стоим, осматриваемся
    #[default]
    Idle,
    /// Бродим вокруг spawn area
    Roam,
    /// Целимся
    Aim,
    /// Стреляем (одиночный выстрел или burst)
    Shoot,
    /// Follow-through после burst'а
    ShootEnd,
    /// Уходим (retreat во время reload'а или навсегда без патронов)
    Leave,
    /// Терминальное: entity будет удалена
    Despawn,
}

impl HunterState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, HunterState::Despawn)
    }

    /// Idle / Roam — «спокойные» состояния
    pub fn is_wandering(&self) -> bool {
        matches!(self, HunterState::Idle | HunterState::Roam)
    }
}

/// Память FSM одного hunter'а (только authority пишет осмысленные значения)
#[derive(Component, Debug, Clone, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct HunterFsm {
    /// Countdown текущего состояния (секунды)
    pub state_timer: f32,
    /// `true` на первом тике в новом состоянии
    pub state_impulse: bool,
    /// Куда целимся (последний interaction trigger)
    pub aim_point: Option<Vec3>,
    /// Куда уходим в Leave
    pub leave_position: Option<Vec3>,
    /// Точка отступления во время reload'а (Idle/Roam/Aim)
    pub retreat_target: Option<Vec3>,
    /// Куда бредём в Roam
    pub roam_target: Option<Vec3>,
    /// Подряд неудачные поиски точки в Leave
    pub leave_failures: u32,
}

impl HunterFsm {
    /// FSM для свежего hunter'а в `state`
    pub fn spawned(state: HunterState, config: &HunterConfig) -> Self {
        Self {
            state_timer: initial_timer(state, config),
            state_impulse: true,
            ..Self::default()
        }
    }
}

/// Стартовый таймер состояния
pub fn initial_timer(state: HunterState, config: &HunterConfig) -> f32 {
    match state {
        HunterState::Idle => config.idle_duration,
        HunterState::Roam => config.roam_duration,
        HunterState::Aim => config.aim_duration,
        HunterState::Shoot => 0.0,
        HunterState::ShootEnd => config.shoot_end_duration,
        HunterState::Leave => 0.0,
        HunterState::Despawn => 0.0,
    }
}
