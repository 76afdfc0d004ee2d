//! Presentation: guard evaluation на каждом участнике + wander cues.

use bevy::prelude::*;
use rand::Rng;

use super::fsm::nearest_threat;
use crate::ai::guards::{accepts_interaction, evaluate_guards, GuardVerdict};
use crate::ai::{HunterFsm, HunterState};
use crate::combat::{AuthorityCombat, CombatView, ObserverMirror, WanderCue};
use crate::components::{NetworkId, Threat};
use crate::config::HunterConfig;
use crate::DeterministicRng;

/// Что показывать (анимация, UI) — одинаково считается на authority и observers
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CombatPresentation {
    pub verdict: GuardVerdict,
    pub aim_point: Option<Vec3>,
    pub is_reloading: bool,
    pub is_interrupted: bool,
    pub is_burst_active: bool,
    /// Advisory countdown (на observers — по prediction events)
    pub reload_countdown: f32,
    pub interrupt_countdown: f32,
    pub accepts_interaction: bool,
}

impl CombatPresentation {
    pub fn evaluate(state: HunterState, view: &impl CombatView, config: &HunterConfig, aim_point: Option<Vec3>) -> Self {
        Self {
            verdict: evaluate_guards(state, view, config),
            aim_point,
            is_reloading: view.is_reloading(),
            is_interrupted: view.is_interrupted(),
            is_burst_active: view.is_burst_active(),
            reload_countdown: view.reload_countdown(),
            interrupt_countdown: view.interrupt_countdown(),
            accepts_interaction: accepts_interaction(view),
        }
    }
}

/// System: обновление CombatPresentation
///
/// Observers не знают aim point authority — в Aim/Shoot целятся в ближайшую угрозу.
pub fn update_presentation(
    threats: Query<&Transform, With<Threat>>,
    mut hunters: Query<(
        &Transform,
        &HunterState,
        &HunterConfig,
        &HunterFsm,
        Option<&AuthorityCombat>,
        Option<&ObserverMirror>,
        &mut CombatPresentation,
    )>,
) {
    for (transform, state, config, fsm, authority, mirror, mut presentation) in hunters.iter_mut() {
        let next = match (authority, mirror) {
            (Some(combat), _) => CombatPresentation::evaluate(*state, combat, config, fsm.aim_point),
            (None, Some(mirror)) => {
                let aim_point = matches!(state, HunterState::Aim | HunterState::Shoot)
                    .then(|| nearest_threat(transform.translation, threats.iter().map(|t| t.translation)))
                    .flatten();
                CombatPresentation::evaluate(*state, mirror, config, aim_point)
            }
            (None, None) => continue,
        };

        if *presentation != next {
            *presentation = next;
        }
    }
}

/// Локальный таймер wander cue (не реплицируется)
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct WanderCueTimer {
    pub remaining: f32,
}

impl WanderCueTimer {
    /// Первый интервал короче: [min/2, max]
    pub fn initial<R: Rng + ?Sized>(config: &HunterConfig, rng: &mut R) -> Self {
        let min = config.wander_cue_min_interval * 0.5;
        let max = config.wander_cue_max_interval.max(min);
        Self {
            remaining: rng.gen_range(min..=max),
        }
    }

    pub fn next_interval<R: Rng + ?Sized>(config: &HunterConfig, rng: &mut R) -> f32 {
        let min = config.wander_cue_min_interval;
        let max = config.wander_cue_max_interval.max(min);
        rng.gen_range(min..=max)
    }
}

/// System: wander cues в Idle/Roam (каждый участник сам по себе)
pub fn tick_wander_cues(
    time: Res<Time<Fixed>>,
    mut rng: ResMut<DeterministicRng>,
    mut hunters: Query<(Entity, &NetworkId, &Transform, &HunterState, &HunterConfig, &mut WanderCueTimer)>,
    mut cues: EventWriter<WanderCue>,
) {
    let delta = time.delta_secs();

    let mut order: Vec<(NetworkId, Entity)> = hunters
        .iter()
        .map(|(entity, network_id, ..)| (*network_id, entity))
        .collect();
    order.sort();

    for (_, entity) in order {
        let Ok((_, _, transform, state, config, mut timer)) = hunters.get_mut(entity) else {
            continue;
        };
        if !config.enable_wander_cue || !state.is_wandering() {
            continue;
        }

        timer.remaining -= delta;
        if timer.remaining <= 0.0 {
            cues.write(WanderCue {
                entity,
                position: transform.translation,
            });
            timer.remaining = WanderCueTimer::next_interval(config, &mut rng.rng);
        }
    }
}
