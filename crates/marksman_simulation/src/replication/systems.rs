//! Replication systems: inbound apply, announce, snapshot / state broadcast

use std::collections::{HashMap, HashSet, VecDeque};

use bevy::prelude::*;

use super::messages::{InboundReplication, OutboundReplication, ReplicationEnvelope, ReplicationPayload};
use crate::actor::{spawn_observer_hunter, PendingAnnounce};
use crate::ai::HunterState;
use crate::combat::{AuthorityCombat, ObserverMirror};
use crate::components::NetworkId;
use crate::config::HunterConfig;
use crate::logger::{log, log_info};
use crate::DeterministicRng;

/// Настройки replication
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ReplicationSettings {
    /// Интервал snapshot'ов (секунды); 0 = каждый fixed tick
    pub snapshot_interval: f32,
}

impl Default for ReplicationSettings {
    fn default() -> Self {
        Self {
            snapshot_interval: 0.0,
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct SnapshotClock {
    pub elapsed: f32,
}

/// Сколько последних despawned id помним
pub const RETIRED_CAPACITY: usize = 256;

/// NetworkId недавно despawned hunter'ов
///
/// Durable init для них игнорируется (транспорт мог ещё не выкинуть его из буфера).
/// Транспорт забывает durable сообщения на `State(Despawn)`, поэтому достаточно
/// помнить последние `RETIRED_CAPACITY` id, старые вытесняются.
#[derive(Resource, Debug, Default)]
pub struct RetiredHunters {
    ids: HashSet<NetworkId>,
    order: VecDeque<NetworkId>,
}

impl RetiredHunters {
    pub fn retire(&mut self, id: NetworkId) {
        if !self.ids.insert(id) {
            return;
        }

        self.order.push_back(id);
        while self.order.len() > RETIRED_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
    }

    pub fn contains(&self, id: &NetworkId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Применить одно сообщение к mirror'у
pub fn apply_payload(
    mirror: &mut ObserverMirror,
    state: &mut HunterState,
    config: &mut HunterConfig,
    payload: &ReplicationPayload,
) {
    match payload {
        ReplicationPayload::Snapshot(snapshot) => mirror.apply_snapshot(snapshot),
        ReplicationPayload::Prediction(prediction) => mirror.apply_prediction(prediction),
        ReplicationPayload::Init(init) => mirror.apply_init(init),
        ReplicationPayload::Config(authority_config) => {
            if *config != *authority_config {
                *config = *authority_config;
            }
            mirror.apply_config(authority_config);
        }
        ReplicationPayload::State(next) => {
            if *state != *next {
                *state = *next;
            }
        }
    }
}

/// System: входящие replication сообщения (в начале тика)
///
/// - authority игнорирует сообщения о своих entity
/// - init для неизвестного NetworkId → late-join spawn observer entity
/// - прочие сообщения для неизвестных entity отбрасываются (придёт snapshot)
pub fn apply_inbound_replication(
    mut commands: Commands,
    mut inbound: EventReader<InboundReplication>,
    mut mirrors: Query<(Entity, &NetworkId, &mut ObserverMirror, &mut HunterState, &mut HunterConfig)>,
    authorities: Query<&NetworkId, With<AuthorityCombat>>,
    config: Res<HunterConfig>,
    retired: Res<RetiredHunters>,
    mut rng: ResMut<DeterministicRng>,
) {
    let owned: HashSet<NetworkId> = authorities.iter().copied().collect();
    let known: HashMap<NetworkId, Entity> = mirrors.iter().map(|(entity, id, ..)| (*id, entity)).collect();
    let mut fresh: Vec<(NetworkId, ObserverMirror, HunterState, HunterConfig)> = Vec::new();

    for InboundReplication(envelope) in inbound.read() {
        let ReplicationEnvelope { network_id, payload, .. } = envelope;

        if owned.contains(network_id) {
            log(&format!("Replication for own hunter {:?} ignored", network_id));
            continue;
        }

        if let Some(&entity) = known.get(network_id) {
            if let Ok((_, _, mut mirror, mut state, mut hunter_config)) = mirrors.get_mut(entity) {
                apply_payload(&mut mirror, &mut state, &mut hunter_config, payload);
            }
            continue;
        }

        if let Some((_, mirror, state, hunter_config)) = fresh.iter_mut().find(|(id, ..)| id == network_id) {
            apply_payload(mirror, state, hunter_config, payload);
            continue;
        }

        match payload {
            ReplicationPayload::Init(init) if !retired.contains(network_id) => {
                // Config придёт следующим durable сообщением, до него — локальный дефолт
                let mut mirror = ObserverMirror::new(&config);
                mirror.apply_init(init);
                fresh.push((*network_id, mirror, HunterState::Idle, *config));
            }
            _ => {
                log(&format!(
                    "Replication for unknown hunter {:?} dropped ({:?})",
                    network_id, envelope.channel
                ));
            }
        }
    }

    for (network_id, mirror, state, hunter_config) in fresh {
        log_info(&format!("👀 Late join: observer mirror for {:?}", network_id));
        spawn_observer_hunter(&mut commands, network_id, mirror, state, &hunter_config, &mut rng.rng);
    }
}

/// System: durable init + config + начальный state для только что заспавненных hunter'ов
pub fn announce_spawned_hunters(
    mut commands: Commands,
    hunters: Query<(Entity, &NetworkId, &AuthorityCombat, &HunterConfig, &HunterState), With<PendingAnnounce>>,
    mut outbound: EventWriter<OutboundReplication>,
) {
    for (entity, network_id, combat, config, state) in hunters.iter() {
        outbound.write(OutboundReplication(ReplicationEnvelope::new(
            *network_id,
            ReplicationPayload::Init(combat.init_message()),
        )));
        outbound.write(OutboundReplication(ReplicationEnvelope::new(
            *network_id,
            ReplicationPayload::Config(*config),
        )));
        outbound.write(OutboundReplication(ReplicationEnvelope::new(
            *network_id,
            ReplicationPayload::State(*state),
        )));
        commands.entity(entity).remove::<PendingAnnounce>();
    }
}

/// System: reliable state change (только authority)
pub fn broadcast_state_changes(
    hunters: Query<(&NetworkId, &HunterState), (With<AuthorityCombat>, Changed<HunterState>, Without<PendingAnnounce>)>,
    mut outbound: EventWriter<OutboundReplication>,
) {
    for (network_id, state) in hunters.iter() {
        outbound.write(OutboundReplication(ReplicationEnvelope::new(
            *network_id,
            ReplicationPayload::State(*state),
        )));
    }
}

/// System: периодический полный snapshot всех authority hunter'ов
///
/// Вместе со snapshot уходит текущий `HunterState`: late joiner получает только
/// durable init и без этого ждал бы следующей смены состояния.
pub fn broadcast_snapshots(
    time: Res<Time<Fixed>>,
    settings: Res<ReplicationSettings>,
    mut clock: ResMut<SnapshotClock>,
    hunters: Query<(&NetworkId, &AuthorityCombat, &HunterState)>,
    mut outbound: EventWriter<OutboundReplication>,
) {
    clock.elapsed += time.delta_secs();
    if clock.elapsed < settings.snapshot_interval {
        return;
    }
    clock.elapsed = 0.0;

    for (network_id, combat, state) in hunters.iter() {
        outbound.write(OutboundReplication(ReplicationEnvelope::new(
            *network_id,
            ReplicationPayload::Snapshot(combat.snapshot()),
        )));
        outbound.write(OutboundReplication(ReplicationEnvelope::new(
            *network_id,
            ReplicationPayload::State(*state),
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::CombatView;
    use crate::replication::{CombatSnapshot, InitMessage};

    #[test]
    fn test_retired_hunters_forget_oldest_past_capacity() {
        let mut retired = RetiredHunters::default();
        for id in 0..(RETIRED_CAPACITY as u64 + 10) {
            retired.retire(NetworkId(id));
        }
        // Повторный retire не занимает место
        retired.retire(NetworkId(RETIRED_CAPACITY as u64 + 9));

        assert_eq!(retired.len(), RETIRED_CAPACITY);
        assert!(!retired.contains(&NetworkId(0)));
        assert!(!retired.contains(&NetworkId(9)));
        assert!(retired.contains(&NetworkId(10)));
        assert!(retired.contains(&NetworkId(RETIRED_CAPACITY as u64 + 9)));
    }

    #[test]
    fn test_config_payload_replaces_local_config() {
        let local = HunterConfig::default();
        let authority_config = HunterConfig {
            enable_ammo_limit: true,
            total_ammo: 3,
            retreat_while_reloading: false,
            enable_burst_mode: true,
            ..HunterConfig::default()
        };

        let mut mirror = ObserverMirror::new(&local);
        let mut state = HunterState::Idle;
        let mut config = local;

        apply_payload(
            &mut mirror,
            &mut state,
            &mut config,
            &ReplicationPayload::Init(InitMessage {
                skill_tier_index: 0,
                initial_ammo: 3,
            }),
        );
        apply_payload(&mut mirror, &mut state, &mut config, &ReplicationPayload::Config(authority_config));
        apply_payload(
            &mut mirror,
            &mut state,
            &mut config,
            &ReplicationPayload::Snapshot(CombatSnapshot {
                ammo_remaining: 0,
                ..CombatSnapshot::default()
            }),
        );

        assert_eq!(config, authority_config);
        // С локальным дефолтом (лимит выключен) mirror считал бы, что патроны есть
        assert!(!mirror.has_ammo());
        assert_eq!(state, HunterState::Idle);
    }
}
