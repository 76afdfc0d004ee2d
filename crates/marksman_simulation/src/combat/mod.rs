//! Combat module — ranged combat state hunter'а
//!
//! Authority / observer split:
//! - `AuthorityCombat` — ground truth + все мутаторы (reload, interrupt, ammo, burst)
//! - `ObserverMirror` — presentation cache, пишется только replication handlers
//! - `CombatView` — read-only взгляд, общий для обоих (guards, presentation)

use bevy::prelude::*;

pub mod burst;
pub mod events;
pub mod mirror;
pub mod reload;
pub mod skill;
pub mod state;
pub mod timers;

#[cfg(test)]
mod state_tests;

// Re-export основных типов
pub use burst::{BurstOutcome, BurstTick};
pub use events::{DamageEvent, FireEffect, InteractionKind, InteractionTrigger, WanderCue};
pub use mirror::ObserverMirror;
pub use reload::ReloadBlock;
pub use skill::SkillTier;
pub use state::{AmmoSpend, AuthorityCombat, CombatView, TimerTick};
pub use timers::{tick_authority_timers, tick_observer_timers};

/// Combat Plugin
///
/// Регистрирует combat события и reflect типы. Системы combat'а
/// встраиваются в общий chain `SimulationPlugin` (порядок важен для детерминизма).
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageEvent>()
            .add_event::<FireEffect>()
            .add_event::<InteractionTrigger>()
            .add_event::<WanderCue>();

        app.register_type::<AuthorityCombat>()
            .register_type::<ObserverMirror>();
    }
}
