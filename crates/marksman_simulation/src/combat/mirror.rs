//! ObserverMirror — presentation cache combat state на не-authority участниках
//!
//! Пишется только replication handlers (init / config / snapshot / prediction) и
//! локальным countdown. Ground truth = последние полученные флаги и ammo;
//! локальные таймеры advisory (только для анимации/UI).

use bevy::prelude::*;

use super::skill::SkillTier;
use super::state::{AuthorityCombat, CombatView};
use crate::config::HunterConfig;
use crate::logger::{log, log_warning};
use crate::replication::{CombatSnapshot, InitMessage, PredictionEvent};

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ObserverMirror {
    skill: SkillTier,
    ammo_limited: bool,
    ammo_remaining: u32,
    is_reloading: bool,
    is_interrupted: bool,
    permanently_out_of_ammo: bool,
    is_burst_active: bool,
    local_reload_timer: f32,
    local_interrupt_timer: f32,
    initialized: bool,
}

impl ObserverMirror {
    /// Mirror до первого init/snapshot (stale, self-heals на первом snapshot)
    pub fn new(config: &HunterConfig) -> Self {
        Self {
            skill: SkillTier::Medium,
            ammo_limited: config.enable_ammo_limit,
            ammo_remaining: config.initial_ammo(),
            is_reloading: false,
            is_interrupted: false,
            permanently_out_of_ammo: false,
            is_burst_active: false,
            local_reload_timer: 0.0,
            local_interrupt_timer: 0.0,
            initialized: false,
        }
    }

    /// Authority hand-off в обратную сторону: authority → observer
    pub fn demote(combat: &AuthorityCombat, config: &HunterConfig) -> Self {
        let mut mirror = Self::new(config);
        mirror.skill = combat.skill();
        mirror.ammo_limited = combat.ammo_limited();
        mirror.initialized = true;
        mirror.apply_snapshot(&combat.snapshot());
        mirror.local_reload_timer = combat.reload_time_remaining();
        mirror.local_interrupt_timer = combat.interrupt_time_remaining();
        mirror
    }

    pub fn skill(&self) -> SkillTier {
        self.skill
    }

    pub fn ammo_remaining(&self) -> u32 {
        self.ammo_remaining
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Durable init: сбрасывает всё состояние
    pub fn apply_init(&mut self, init: &InitMessage) {
        self.skill = init.skill_tier().unwrap_or_else(|err| {
            log_warning(&format!("⚠️ Init: {}, falling back to Medium", err));
            SkillTier::Medium
        });
        self.ammo_remaining = init.initial_ammo;
        self.is_reloading = false;
        self.is_interrupted = false;
        self.permanently_out_of_ammo = false;
        self.is_burst_active = false;
        self.local_reload_timer = 0.0;
        self.local_interrupt_timer = 0.0;
        self.initialized = true;
        log(&format!(
            "Mirror init: {:?}, ammo {}",
            self.skill, self.ammo_remaining
        ));
    }

    /// Config authority: лимит патронов решает, что значит `has_ammo`
    pub fn apply_config(&mut self, config: &HunterConfig) {
        self.ammo_limited = config.enable_ammo_limit;
    }

    /// Snapshot полностью перезаписывает ground truth (идемпотентно)
    pub fn apply_snapshot(&mut self, snapshot: &CombatSnapshot) {
        self.is_reloading = snapshot.is_reloading;
        self.ammo_remaining = snapshot.ammo_remaining;
        self.permanently_out_of_ammo = snapshot.is_permanently_out_of_ammo;
        self.is_interrupted = snapshot.is_interrupted;
        self.is_burst_active = snapshot.is_burst_active;

        if !self.is_reloading {
            self.local_reload_timer = 0.0;
        }
        if !self.is_interrupted {
            self.local_interrupt_timer = 0.0;
        }
    }

    /// Prediction event: только запускает локальный countdown, флаги не трогает
    pub fn apply_prediction(&mut self, event: &PredictionEvent) {
        let duration = event.duration();
        if !duration.is_finite() || duration < 0.0 {
            log_warning(&format!(
                "⚠️ Prediction with invalid duration {}, ignored",
                duration
            ));
            return;
        }

        match event {
            PredictionEvent::ReloadStarted { .. } => {
                self.local_reload_timer = duration;
            }
            PredictionEvent::InterruptStarted { .. } => {
                self.local_interrupt_timer = duration;
                self.local_reload_timer = 0.0;
            }
        }
    }

    /// Локальный countdown (floor 0)
    pub fn tick_local_timers(&mut self, delta: f32) {
        self.local_reload_timer = (self.local_reload_timer - delta).max(0.0);
        self.local_interrupt_timer = (self.local_interrupt_timer - delta).max(0.0);
    }

    /// Ground truth в виде snapshot'а (для сравнения с authority)
    pub fn ground_truth(&self) -> CombatSnapshot {
        CombatSnapshot {
            is_reloading: self.is_reloading,
            ammo_remaining: self.ammo_remaining,
            is_permanently_out_of_ammo: self.permanently_out_of_ammo,
            is_interrupted: self.is_interrupted,
            is_burst_active: self.is_burst_active,
        }
    }
}

impl CombatView for ObserverMirror {
    fn is_reloading(&self) -> bool {
        self.is_reloading
    }

    fn is_interrupted(&self) -> bool {
        self.is_interrupted
    }

    fn has_ammo(&self) -> bool {
        !self.ammo_limited || self.ammo_remaining > 0
    }

    fn is_permanently_out_of_ammo(&self) -> bool {
        self.permanently_out_of_ammo
    }

    fn is_burst_active(&self) -> bool {
        self.is_burst_active
    }

    fn reload_countdown(&self) -> f32 {
        self.local_reload_timer
    }

    fn interrupt_countdown(&self) -> f32 {
        self.local_interrupt_timer
    }
}
