//! AI reaction systems (damage interrupt, interaction triggers).

use bevy::prelude::*;

use crate::ai::brain::enter_state;
use crate::ai::guards::accepts_interaction;
use crate::ai::{HunterFsm, HunterState};
use crate::combat::{AuthorityCombat, DamageEvent, InteractionTrigger, ObserverMirror};
use crate::components::NetworkId;
use crate::config::HunterConfig;
use crate::logger::{log, log_info};
use crate::replication::{OutboundReplication, PredictionEvent, ReplicationEnvelope, ReplicationPayload};

/// System: урон во время reload'а → interrupt + prediction observers
///
/// Только authority: у observer entity нет `AuthorityCombat`, событие игнорируется.
pub fn apply_damage_interrupts(
    mut damage_events: EventReader<DamageEvent>,
    mut hunters: Query<(&NetworkId, &HunterConfig, &mut AuthorityCombat)>,
    mut outbound: EventWriter<OutboundReplication>,
) {
    for damage_event in damage_events.read() {
        let Ok((network_id, config, mut combat)) = hunters.get_mut(damage_event.entity) else {
            log(&format!(
                "DamageEvent for {:?} ignored (not an authority hunter)",
                damage_event.entity
            ));
            continue;
        };

        if let Some(duration) = combat.apply_damage_interrupt(config) {
            outbound.write(OutboundReplication(ReplicationEnvelope::new(
                *network_id,
                ReplicationPayload::Prediction(PredictionEvent::InterruptStarted { duration }),
            )));
        }
    }
}

/// System: interaction triggers (investigate / touch / grab)
///
/// Навсегда без патронов — отклоняем на любом участнике.
/// Authority из Idle/Roam/Aim переходит в Aim и наводится на точку trigger'а.
pub fn handle_interaction_triggers(
    mut triggers: EventReader<InteractionTrigger>,
    mut hunters: Query<(
        &HunterConfig,
        &mut HunterState,
        &mut HunterFsm,
        Option<&AuthorityCombat>,
        Option<&ObserverMirror>,
    )>,
) {
    for trigger in triggers.read() {
        let Ok((config, mut state, mut fsm, authority, mirror)) = hunters.get_mut(trigger.entity) else {
            continue;
        };

        let accepted = match (authority, mirror) {
            (Some(combat), _) => accepts_interaction(combat),
            (None, Some(mirror)) => accepts_interaction(mirror),
            (None, None) => false,
        };
        if !accepted {
            log_info(&format!(
                "🚫 {:?} rejected for {:?}: out of ammo",
                trigger.kind, trigger.entity
            ));
            continue;
        }

        // Observer: только presentation, state придёт от authority
        if authority.is_none() {
            continue;
        }

        if !state.is_wandering() && *state != HunterState::Aim {
            log(&format!("{:?} ignored in {:?}", trigger.kind, *state));
            continue;
        }

        let mut next_state = *state;
        if next_state != HunterState::Aim {
            enter_state(&mut next_state, &mut fsm, HunterState::Aim, config);
        }
        if let Some(point) = trigger.kind.focus_point() {
            fsm.aim_point = Some(point);
        }

        if *state != next_state {
            log_info(&format!("👂 {:?} → Aim", trigger.kind));
            *state = next_state;
        }
    }
}
