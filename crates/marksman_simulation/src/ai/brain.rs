//! Authority FSM step — чистая функция одного тика hunter'а
//!
//! Вход: state + FSM memory + AuthorityCombat + контекст тика (позиция, угроза,
//! override, locator). Выход: список команд (выстрел, движение, prediction).
//! ECS обвязка — `systems::fsm::run_authority_fsm`.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use super::components::{initial_timer, HunterFsm, HunterState};
use super::guards::{evaluate_guards, GuardVerdict};
use crate::combat::{AuthorityCombat, BurstOutcome, CombatView};
use crate::config::HunterConfig;
use crate::external::RetreatLocator;
use crate::logger::{log, log_error, log_info, log_warning};
use crate::replication::PredictionEvent;

/// Высота дула над позицией hunter'а
pub const MUZZLE_HEIGHT: f32 = 1.5;

/// Aim заблокирован → держим state timer на этом значении
pub const AIM_HOLD_TIME: f32 = 0.1;

pub struct BrainContext<'a> {
    pub delta: f32,
    pub config: &'a HunterConfig,
    pub position: Vec3,
    pub forward: Vec3,
    pub nearest_threat: Option<Vec3>,
    pub override_active: bool,
    pub locator: &'a dyn RetreatLocator,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrainCommand {
    Fire { origin: Vec3, target_point: Vec3 },
    MoveTo(Vec3),
    Stop,
    Predict(PredictionEvent),
}

/// Переход в новое состояние (сброс timer / impulse / точек движения)
pub fn enter_state(state: &mut HunterState, fsm: &mut HunterFsm, next: HunterState, config: &HunterConfig) {
    log(&format!("FSM: {:?} → {:?}", state, next));

    if next == HunterState::Despawn || (next == HunterState::Leave && *state != HunterState::Leave) {
        fsm.leave_failures = 0;
    }

    fsm.state_timer = initial_timer(next, config);
    fsm.state_impulse = true;
    fsm.retreat_target = None;
    fsm.roam_target = None;
    fsm.leave_position = None;
    *state = next;
}

/// Один тик authority FSM
pub fn step_authority<R: Rng + ?Sized>(
    state: &mut HunterState,
    fsm: &mut HunterFsm,
    combat: &mut AuthorityCombat,
    ctx: &BrainContext,
    rng: &mut R,
) -> Vec<BrainCommand> {
    let mut out = Vec::new();

    fsm.state_timer = (fsm.state_timer - ctx.delta).max(0.0);
    let impulse = std::mem::take(&mut fsm.state_impulse);

    match *state {
        HunterState::Idle | HunterState::Roam => wander(state, fsm, combat, ctx, impulse, rng, &mut out),
        HunterState::Aim => aim(state, fsm, combat, ctx, impulse, &mut out),
        HunterState::Shoot => shoot(state, fsm, combat, ctx, &mut out),
        HunterState::ShootEnd => shoot_end(state, fsm, combat, ctx),
        HunterState::Leave => leave(state, fsm, combat, ctx, impulse, &mut out),
        HunterState::Despawn => {
            if impulse {
                log_info("👋 Hunter despawning");
                out.push(BrainCommand::Stop);
            }
        }
    }

    out
}

fn wander<R: Rng + ?Sized>(
    state: &mut HunterState,
    fsm: &mut HunterFsm,
    combat: &AuthorityCombat,
    ctx: &BrainContext,
    impulse: bool,
    rng: &mut R,
    out: &mut Vec<BrainCommand>,
) {
    let config = ctx.config;

    match evaluate_guards(*state, combat, config) {
        GuardVerdict::ForceLeave => {
            log_info("🚫 Out of ammo → Leave");
            enter_state(state, fsm, HunterState::Leave, config);
            return;
        }
        GuardVerdict::Retreat => {
            if let Some(point) = retreat(fsm, ctx, out) {
                if config.retreat_enters_leave {
                    enter_state(state, fsm, HunterState::Leave, config);
                    fsm.leave_position = Some(point);
                    fsm.state_timer = config.leave_wait;
                }
            }
            return;
        }
        _ => {
            fsm.retreat_target = None;
        }
    }

    if let Some(threat) = engage_target(ctx) {
        log(&format!("Threat in range at {:?} → Aim", threat));
        enter_state(state, fsm, HunterState::Aim, config);
        fsm.aim_point = Some(threat);
        return;
    }

    if *state == HunterState::Idle {
        if impulse {
            out.push(BrainCommand::Stop);
        }
        if fsm.state_timer <= 0.0 {
            enter_state(state, fsm, HunterState::Roam, config);
        }
        return;
    }

    // Roam
    if impulse || fsm.roam_target.is_none() {
        let angle = rng.gen_range(0.0..TAU);
        let distance = rng.gen_range(0.0..=config.roam_radius);
        let target = ctx.position + Vec3::new(angle.cos(), 0.0, angle.sin()) * distance;
        fsm.roam_target = Some(target);
        out.push(BrainCommand::MoveTo(target));
    }

    let arrived = fsm
        .roam_target
        .is_some_and(|target| flat_distance(target, ctx.position) < config.arrival_radius);
    if fsm.state_timer <= 0.0 || arrived {
        enter_state(state, fsm, HunterState::Idle, config);
    }
}

fn aim(
    state: &mut HunterState,
    fsm: &mut HunterFsm,
    combat: &AuthorityCombat,
    ctx: &BrainContext,
    impulse: bool,
    out: &mut Vec<BrainCommand>,
) {
    let config = ctx.config;

    // Aim tracking
    if let Some(threat) = ctx.nearest_threat {
        fsm.aim_point = Some(threat);
    }

    match evaluate_guards(*state, combat, config) {
        GuardVerdict::ForceLeave => {
            log_info("🚫 Out of ammo while aiming → Leave");
            enter_state(state, fsm, HunterState::Leave, config);
        }
        GuardVerdict::Retreat => {
            retreat(fsm, ctx, out);
            hold_aim(fsm);
        }
        GuardVerdict::HoldAim(reason) => {
            fsm.retreat_target = None;
            if fsm.state_timer <= 0.0 {
                log(&format!("Aim blocked: {:?}", reason));
            }
            hold_aim(fsm);
        }
        _ => {
            fsm.retreat_target = None;
            if impulse {
                out.push(BrainCommand::Stop);
            }
            if fsm.state_timer <= 0.0 {
                enter_state(state, fsm, HunterState::Shoot, config);
            }
        }
    }
}

fn hold_aim(fsm: &mut HunterFsm) {
    if fsm.state_timer <= 0.0 {
        fsm.state_timer = AIM_HOLD_TIME;
    }
}

fn shoot(
    state: &mut HunterState,
    fsm: &mut HunterFsm,
    combat: &mut AuthorityCombat,
    ctx: &BrainContext,
    out: &mut Vec<BrainCommand>,
) {
    let config = ctx.config;

    if !combat.has_ammo() {
        if combat.latch_out_of_ammo(ctx.override_active) {
            log_warning("⚠️ Shoot without ammo, latched out-of-ammo");
        }
        enter_state(state, fsm, HunterState::Leave, config);
        return;
    }

    if !config.enable_burst_mode {
        if !combat.try_consume_ammo(ctx.override_active).allows_fire() {
            log_info("🚫 Last round spent without firing → Leave");
            enter_state(state, fsm, HunterState::Leave, config);
            return;
        }

        fire(fsm, ctx, out);
        if let Some(duration) = combat.start_reload(config) {
            out.push(BrainCommand::Predict(PredictionEvent::ReloadStarted { duration }));
        }
        enter_state(state, fsm, HunterState::Idle, config);
        return;
    }

    // Burst: ждём пока reload / interrupt закончатся
    if combat.is_reloading() || combat.is_interrupted() {
        if let Some(threat) = ctx.nearest_threat {
            fsm.aim_point = Some(threat);
        }
        return;
    }

    if !combat.is_burst_active() && !combat.initialize_burst(config.burst_shots) {
        return;
    }

    let tick = combat.tick_burst(ctx.delta, config.burst_shot_delay, ctx.override_active);
    if tick.fired_shot.is_some() {
        fire(fsm, ctx, out);
    }

    match tick.outcome {
        BurstOutcome::InProgress => {}
        BurstOutcome::Completed => {
            enter_state(state, fsm, HunterState::ShootEnd, config);
            if let Some(duration) = combat.start_reload(config) {
                out.push(BrainCommand::Predict(PredictionEvent::ReloadStarted { duration }));
            }
        }
        BurstOutcome::Exhausted => {
            log_info("🚫 Ammo ran out mid-burst → Leave");
            enter_state(state, fsm, HunterState::Leave, config);
        }
    }
}

fn shoot_end(state: &mut HunterState, fsm: &mut HunterFsm, combat: &AuthorityCombat, ctx: &BrainContext) {
    let config = ctx.config;

    if evaluate_guards(*state, combat, config) == GuardVerdict::ForceLeave {
        enter_state(state, fsm, HunterState::Leave, config);
        return;
    }

    if !config.enable_burst_mode {
        log_warning("⚠️ ShootEnd reached in single-shot mode → Idle");
        enter_state(state, fsm, HunterState::Idle, config);
        return;
    }

    if fsm.state_timer <= 0.0 {
        enter_state(state, fsm, HunterState::Idle, config);
    }
}

fn leave(
    state: &mut HunterState,
    fsm: &mut HunterFsm,
    combat: &AuthorityCombat,
    ctx: &BrainContext,
    impulse: bool,
    out: &mut Vec<BrainCommand>,
) {
    let config = ctx.config;

    if impulse {
        if let Some(point) = fsm.leave_position {
            out.push(BrainCommand::MoveTo(point));
        }
    }

    let arrived = fsm
        .leave_position
        .is_some_and(|point| flat_distance(point, ctx.position) < config.arrival_radius);

    if evaluate_guards(*state, combat, config) != GuardVerdict::ControlledLeave {
        // Обычный уход: дойти до точки и вернуться в Idle
        fsm.leave_failures = 0;
        if impulse && fsm.leave_position.is_none() {
            if let Some(point) = request_retreat_point(ctx) {
                set_leave_destination(fsm, point, config, out);
                return;
            }
        }
        if fsm.state_timer <= 0.0 || arrived {
            enter_state(state, fsm, HunterState::Idle, config);
        }
        return;
    }

    let out_of_ammo = combat.is_permanently_out_of_ammo();

    // Без патронов сначала пытаемся уйти, и только потом исчезаем
    if impulse && out_of_ammo && fsm.leave_position.is_none() {
        if let Some(point) = request_retreat_point(ctx) {
            set_leave_destination(fsm, point, config, out);
            return;
        }
    }

    if fsm.state_timer > 0.0 && !arrived {
        return;
    }

    if out_of_ammo {
        log_info("🚪 Out of ammo and done leaving → Despawn");
        enter_state(state, fsm, HunterState::Despawn, config);
        return;
    }

    match request_retreat_point(ctx) {
        Some(point) => {
            fsm.leave_failures = 0;
            set_leave_destination(fsm, point, config, out);
        }
        None => {
            fsm.leave_failures += 1;
            fsm.leave_position = None;
            fsm.state_timer = config.leave_retry_delay;
            log_warning(&format!(
                "⚠️ Retreat point not found ({}/{})",
                fsm.leave_failures, config.max_leave_failures
            ));

            if fsm.leave_failures >= config.max_leave_failures {
                log_error("❌ Retreat point failures exhausted → Despawn");
                enter_state(state, fsm, HunterState::Despawn, config);
            }
        }
    }
}

fn set_leave_destination(fsm: &mut HunterFsm, point: Vec3, config: &HunterConfig, out: &mut Vec<BrainCommand>) {
    fsm.leave_position = Some(point);
    fsm.state_timer = config.leave_wait;
    out.push(BrainCommand::MoveTo(point));
}

/// Отступление во время reload'а: новая точка только когда старой нет или дошли
fn retreat(fsm: &mut HunterFsm, ctx: &BrainContext, out: &mut Vec<BrainCommand>) -> Option<Vec3> {
    let reached = fsm
        .retreat_target
        .map_or(true, |target| flat_distance(target, ctx.position) < ctx.config.arrival_radius);
    if !reached {
        return None;
    }

    match request_retreat_point(ctx) {
        Some(point) => {
            log(&format!("🏃 Retreating while reloading → {:?}", point));
            fsm.retreat_target = Some(point);
            out.push(BrainCommand::MoveTo(point));
            Some(point)
        }
        None => {
            log("Retreat point not found, retry next tick");
            None
        }
    }
}

fn request_retreat_point(ctx: &BrainContext) -> Option<Vec3> {
    let Some(threat) = ctx.nearest_threat else {
        log("No threat to retreat from");
        return None;
    };
    ctx.locator.find_retreat_point(ctx.position, threat)
}

fn engage_target(ctx: &BrainContext) -> Option<Vec3> {
    let radius = ctx.config.engage_radius;
    ctx.nearest_threat
        .filter(|threat| radius > 0.0 && flat_distance(*threat, ctx.position) <= radius)
}

fn fire(fsm: &HunterFsm, ctx: &BrainContext, out: &mut Vec<BrainCommand>) {
    let origin = ctx.position + Vec3::Y * MUZZLE_HEIGHT;
    let target_point = fsm
        .aim_point
        .unwrap_or(origin + ctx.forward * ctx.config.fire_distance);
    out.push(BrainCommand::Fire { origin, target_point });
}

/// Дистанция в плоскости XZ
pub fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}
