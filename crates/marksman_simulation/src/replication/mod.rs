//! Replication — authority → observers
//!
//! Три канала:
//! - Reliable: полный `CombatSnapshot` каждый интервал + смена `HunterState`
//! - BestEffort: `PredictionEvent` (старт reload / interrupt) — только косметика
//! - Durable: `InitMessage` + `HunterConfig` hunter'а (транспорт хранит для late joiners)
//!
//! Транспорт — ответственность хоста: он забирает `OutboundReplication`
//! и кладёт полученное в `InboundReplication`. Кодирование — `codec`,
//! in-process loopback для headless прогонов — `loopback`.

use bevy::prelude::*;

pub mod codec;
pub mod handoff;
pub mod loopback;
pub mod messages;
pub mod systems;

pub use codec::{decode_envelope, decode_snapshot, encode_envelope, encode_snapshot, WireError, SNAPSHOT_WIRE_SIZE};
pub use handoff::{handle_authority_transfers, AuthorityTransfer};
pub use loopback::{LinkStats, LoopbackLink};
pub use messages::{
    Channel, CombatSnapshot, InboundReplication, InitMessage, OutboundReplication, PredictionEvent,
    ReplicationEnvelope, ReplicationPayload,
};
pub use systems::{
    announce_spawned_hunters, apply_inbound_replication, apply_payload, broadcast_snapshots,
    broadcast_state_changes, ReplicationSettings, RetiredHunters, SnapshotClock,
};

/// Replication Plugin — события и ресурсы (системы в общем chain `SimulationPlugin`)
pub struct ReplicationPlugin;

impl Plugin for ReplicationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<OutboundReplication>()
            .add_event::<InboundReplication>()
            .add_event::<AuthorityTransfer>()
            .init_resource::<ReplicationSettings>()
            .init_resource::<SnapshotClock>()
            .init_resource::<RetiredHunters>();
    }
}
