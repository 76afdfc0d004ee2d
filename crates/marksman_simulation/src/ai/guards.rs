//! Per-state guards — read-only, одинаковые на authority и observers
//!
//! Authority использует verdict для переходов, observers — для presentation
//! (анимации прицеливания, UI перезарядки и т.п.).

use bevy::prelude::*;

use super::components::HunterState;
use crate::combat::CombatView;
use crate::config::HunterConfig;

/// Почему Aim не переходит в Shoot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum AimBlock {
    OutOfAmmo,
    Reloading,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum GuardVerdict {
    /// Обычное поведение состояния
    #[default]
    Proceed,
    /// Навсегда без патронов → Leave
    ForceLeave,
    /// Перезаряжаемся и retreat включён → отступаем
    Retreat,
    /// Aim заблокирован, только aim tracking
    HoldAim(AimBlock),
    /// Leave под нашим контролем (retreat-reload или permanent OOA)
    ControlledLeave,
}

pub fn evaluate_guards(state: HunterState, view: &impl CombatView, config: &HunterConfig) -> GuardVerdict {
    let retreating = config.retreat_while_reloading && view.is_reloading();

    match state {
        HunterState::Idle | HunterState::Roam => {
            if view.is_permanently_out_of_ammo() {
                GuardVerdict::ForceLeave
            } else if retreating {
                GuardVerdict::Retreat
            } else {
                GuardVerdict::Proceed
            }
        }
        HunterState::Aim => {
            if view.is_permanently_out_of_ammo() {
                GuardVerdict::ForceLeave
            } else if retreating {
                GuardVerdict::Retreat
            } else if !view.has_ammo() {
                GuardVerdict::HoldAim(AimBlock::OutOfAmmo)
            } else if view.is_reloading() {
                GuardVerdict::HoldAim(AimBlock::Reloading)
            } else if view.is_interrupted() {
                GuardVerdict::HoldAim(AimBlock::Interrupted)
            } else {
                GuardVerdict::Proceed
            }
        }
        HunterState::Shoot => {
            if view.has_ammo() {
                GuardVerdict::Proceed
            } else {
                GuardVerdict::ForceLeave
            }
        }
        HunterState::ShootEnd => {
            if view.is_permanently_out_of_ammo() {
                GuardVerdict::ForceLeave
            } else {
                GuardVerdict::Proceed
            }
        }
        HunterState::Leave => {
            if retreating || view.is_permanently_out_of_ammo() {
                GuardVerdict::ControlledLeave
            } else {
                GuardVerdict::Proceed
            }
        }
        HunterState::Despawn => GuardVerdict::Proceed,
    }
}

/// Interaction triggers отклоняются навсегда без патронов
pub fn accepts_interaction(view: &impl CombatView) -> bool {
    !view.is_permanently_out_of_ammo()
}
