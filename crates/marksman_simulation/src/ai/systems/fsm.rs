//! Authority FSM system + despawn терминальных hunter'ов.

use bevy::prelude::*;

use crate::ai::brain::{step_authority, BrainCommand, BrainContext};
use crate::ai::{HunterFsm, HunterState};
use crate::combat::{AuthorityCombat, FireEffect};
use crate::components::{MovementCommand, NetworkId, Threat};
use crate::config::HunterConfig;
use crate::external::{CompatibilityOverride, RetreatService};
use crate::logger::log_info;
use crate::replication::{OutboundReplication, ReplicationEnvelope, ReplicationPayload, RetiredHunters};
use crate::DeterministicRng;

/// Ближайшая угроза к точке
pub fn nearest_threat(position: Vec3, threats: impl Iterator<Item = Vec3>) -> Option<Vec3> {
    threats.min_by(|a, b| {
        a.distance_squared(position)
            .total_cmp(&b.distance_squared(position))
    })
}

/// Система: authority FSM (единственный writer AuthorityCombat кроме timers/interrupts)
///
/// Hunter'ы обрабатываются в порядке NetworkId — порядок расхода RNG детерминирован.
pub fn run_authority_fsm(
    time: Res<Time<Fixed>>,
    mut rng: ResMut<DeterministicRng>,
    retreat: Res<RetreatService>,
    compatibility: Res<CompatibilityOverride>,
    threats: Query<&Transform, With<Threat>>,
    mut hunters: Query<(
        Entity,
        &NetworkId,
        &Transform,
        &HunterConfig,
        &mut HunterState,
        &mut HunterFsm,
        &mut AuthorityCombat,
        &mut MovementCommand,
    )>,
    mut fire_events: EventWriter<FireEffect>,
    mut outbound: EventWriter<OutboundReplication>,
) {
    let delta = time.delta_secs();
    let override_active = compatibility.is_active();

    let mut order: Vec<(NetworkId, Entity)> = hunters
        .iter()
        .map(|(entity, network_id, ..)| (*network_id, entity))
        .collect();
    order.sort();

    for (_, entity) in order {
        let Ok((_, network_id, transform, config, mut state, mut fsm, mut combat, mut movement)) =
            hunters.get_mut(entity)
        else {
            continue;
        };

        let position = transform.translation;
        let ctx = BrainContext {
            delta,
            config,
            position,
            forward: *transform.forward(),
            nearest_threat: nearest_threat(position, threats.iter().map(|t| t.translation)),
            override_active,
            locator: retreat.locator.as_ref(),
        };

        let mut next_state = *state;
        let commands = step_authority(&mut next_state, &mut fsm, &mut combat, &ctx, &mut rng.rng);

        if *state != next_state {
            log_info(&format!("🧠 {:?}: {:?} → {:?}", network_id, *state, next_state));
            *state = next_state;
        }

        for command in commands {
            match command {
                BrainCommand::Fire { origin, target_point } => {
                    fire_events.write(FireEffect {
                        shooter: entity,
                        network_id: *network_id,
                        origin,
                        target_point,
                    });
                }
                BrainCommand::MoveTo(target) => {
                    *movement = MovementCommand::MoveToPosition { target };
                }
                BrainCommand::Stop => {
                    *movement = MovementCommand::Stop;
                }
                BrainCommand::Predict(prediction) => {
                    outbound.write(OutboundReplication(ReplicationEnvelope::new(
                        *network_id,
                        ReplicationPayload::Prediction(prediction),
                    )));
                }
            }
        }
    }
}

/// Система: удаление hunter'ов в Despawn (authority и observers)
pub fn despawn_finished_hunters(
    mut commands: Commands,
    hunters: Query<(Entity, &NetworkId, &HunterState)>,
    mut retired: ResMut<RetiredHunters>,
) {
    for (entity, network_id, state) in hunters.iter() {
        if state.is_terminal() {
            log_info(&format!("💀 Hunter {:?} despawned", network_id));
            retired.retire(*network_id);
            commands.entity(entity).despawn();
        }
    }
}
