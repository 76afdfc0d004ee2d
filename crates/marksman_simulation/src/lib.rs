//! MARKSMAN Simulation Core
//!
//! ECS-симуляция AI стрелков (hunter'ов) на Bevy 0.16, headless.
//!
//! Authority / observer модель:
//! - authority участник гоняет FSM и владеет `AuthorityCombat` (ammo, reload, burst, interrupt)
//! - observers держат `ObserverMirror`, который пишется только replication сообщениями
//! - хост (dedicated server / клиент) отвечает за транспорт, навигацию, физику и рендер

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod actor;
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod external;
pub mod logger;
pub mod physics;
pub mod replication;

// Re-export базовых типов для удобства
pub use actor::{spawn_authority_hunter, spawn_observer_hunter, Hunter, HunterSpawn, PendingAnnounce};
pub use ai::{CombatPresentation, GuardVerdict, HunterFsm, HunterState, WanderCueTimer};
pub use combat::{
    AuthorityCombat, CombatPlugin, CombatView, DamageEvent, FireEffect, InteractionKind, InteractionTrigger,
    ObserverMirror, SkillTier, WanderCue,
};
pub use components::{MovementCommand, NetworkId, Threat};
pub use config::{HunterConfig, UNLIMITED_AMMO};
pub use external::{CompatibilityOverride, RetreatLocator, RetreatService};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use physics::HeadlessMovementPlugin;
pub use replication::{
    AuthorityTransfer, InboundReplication, LoopbackLink, OutboundReplication, ReplicationEnvelope, ReplicationPayload,
    ReplicationPlugin, ReplicationSettings,
};

/// Один тик симуляции (FixedUpdate), порядок фиксирован
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationSet;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 64Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(64.0))
            // Детерминистичный RNG (не перетираем seed из create_headless_app)
            .init_resource::<DeterministicRng>()
            .init_resource::<HunterConfig>()
            .init_resource::<RetreatService>()
            .init_resource::<CompatibilityOverride>()
            // Подсистемы
            .add_plugins((CombatPlugin, ReplicationPlugin));

        app.register_type::<Hunter>()
            .register_type::<NetworkId>()
            .register_type::<Threat>()
            .register_type::<MovementCommand>()
            .register_type::<HunterConfig>()
            .register_type::<HunterState>()
            .register_type::<HunterFsm>()
            .register_type::<CombatPresentation>()
            .register_type::<WanderCueTimer>();

        app.add_systems(
            FixedUpdate,
            (
                replication::apply_inbound_replication,
                replication::handle_authority_transfers,
                combat::tick_authority_timers,
                combat::tick_observer_timers,
                ai::systems::apply_damage_interrupts,
                ai::systems::handle_interaction_triggers,
                ai::systems::run_authority_fsm,
                ai::systems::update_presentation,
                ai::systems::tick_wander_cues,
                // State change до announce: свежие hunter'ы отправляют State вместе с Init
                replication::broadcast_state_changes,
                replication::announce_spawned_hunters,
                replication::broadcast_snapshots,
                ai::systems::despawn_finished_hunters,
            )
                .chain()
                .in_set(SimulationSet),
        );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(64.0)); // 64Hz FixedUpdate

    app
}
