//! Hunter configuration
//!
//! Все tunables одного hunter'а. Хост загружает конфиг сам (файл/UI вне scope),
//! симуляция получает готовое значение и прогоняет через `sanitized()`.
//!
//! Живёт в двух местах:
//! - `Resource` — дефолт для спавна
//! - `Component` — копия на entity, снимается в момент спавна; authority шлёт её
//!   observers durable сообщением, чтобы guards везде читали один и тот же config

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::SkillTier;
use crate::logger::log_warning;

/// Sentinel ammo count когда лимит патронов выключен (трактуется как «бесконечно»)
pub const UNLIMITED_AMMO: u32 = 9999;

#[derive(Component, Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
#[serde(default)]
pub struct HunterConfig {
    // === Reload times (seconds per skill tier) ===
    pub fast_reload_time: f32,
    pub medium_reload_time: f32,
    pub slow_reload_time: f32,

    // === Skill tier spawn weights ===
    pub fast_skill_weight: u32,
    pub medium_skill_weight: u32,
    pub slow_skill_weight: u32,

    // === Damage / reload behavior ===
    /// Урон во время перезарядки отменяет её и блокирует reload на `damage_interrupt_delay`
    pub enable_damage_interrupt: bool,
    pub damage_interrupt_delay: f32,
    /// Во время перезарядки уходим от ближайшей угрозы
    pub retreat_while_reloading: bool,
    /// Отступление из Idle/Roam переводит в Leave (иначе двигаемся не меняя state)
    pub retreat_enters_leave: bool,

    // === Burst fire ===
    pub enable_burst_mode: bool,
    pub burst_shots: u32,
    pub burst_shot_delay: f32,

    // === Total ammo limit ===
    pub enable_ammo_limit: bool,
    pub total_ammo: u32,

    // === Leave state ===
    /// Таймер ожидания после успешного нового retreat point
    pub leave_wait: f32,
    /// Таймер до следующей попытки после неудачного поиска retreat point
    pub leave_retry_delay: f32,
    /// Столько подряд неудач → принудительный Despawn
    pub max_leave_failures: u32,
    /// Дистанция «дошли до точки» (метры)
    pub arrival_radius: f32,

    // === Base behavior timing ===
    pub idle_duration: f32,
    pub roam_duration: f32,
    pub roam_radius: f32,
    pub aim_duration: f32,
    /// Угроза ближе этого радиуса → Idle/Roam переходят в Aim (0 = только по triggers)
    pub engage_radius: f32,
    /// Follow-through после burst (ShootEnd)
    pub shoot_end_duration: f32,
    /// Дальность выстрела когда aim point неизвестен (метры)
    pub fire_distance: f32,
    /// Скорость движения (m/s) — для headless movement
    pub move_speed: f32,

    // === Wander cue (local presentation) ===
    pub enable_wander_cue: bool,
    pub wander_cue_min_interval: f32,
    pub wander_cue_max_interval: f32,
}

impl Default for HunterConfig {
    fn default() -> Self {
        Self {
            fast_reload_time: 2.0,
            medium_reload_time: 5.0,
            slow_reload_time: 7.0,

            fast_skill_weight: 5,
            medium_skill_weight: 3,
            slow_skill_weight: 1,

            enable_damage_interrupt: true,
            damage_interrupt_delay: 5.0,
            retreat_while_reloading: true,
            retreat_enters_leave: false,

            enable_burst_mode: false,
            burst_shots: 10,
            burst_shot_delay: 0.1,

            enable_ammo_limit: false,
            total_ammo: 30,

            leave_wait: 5.0,
            leave_retry_delay: 1.0,
            max_leave_failures: 5,
            arrival_radius: 1.0,

            idle_duration: 3.0,
            roam_duration: 6.0,
            roam_radius: 10.0,
            aim_duration: 1.5,
            engage_radius: 25.0,
            shoot_end_duration: 1.0,
            fire_distance: 50.0,
            move_speed: 3.5,

            enable_wander_cue: false,
            wander_cue_min_interval: 3.0,
            wander_cue_max_interval: 6.0,
        }
    }
}

impl HunterConfig {
    /// Длительность перезарядки для skill tier
    pub fn reload_duration(&self, tier: SkillTier) -> f32 {
        match tier {
            SkillTier::Fast => self.fast_reload_time,
            SkillTier::Medium => self.medium_reload_time,
            SkillTier::Slow => self.slow_reload_time,
        }
    }

    /// Стартовый боезапас (sentinel если лимит выключен)
    pub fn initial_ammo(&self) -> u32 {
        if self.enable_ammo_limit {
            self.total_ammo
        } else {
            UNLIMITED_AMMO
        }
    }

    pub fn skill_weights(&self) -> [u32; 3] {
        [
            self.fast_skill_weight,
            self.medium_skill_weight,
            self.slow_skill_weight,
        ]
    }

    /// Clamp всех значений в допустимые диапазоны (с warning на каждое исправление)
    pub fn sanitized(mut self) -> Self {
        self.fast_reload_time = clamp_f32("fast_reload_time", self.fast_reload_time, 0.5, 120.0);
        self.medium_reload_time =
            clamp_f32("medium_reload_time", self.medium_reload_time, 1.0, 180.0);
        self.slow_reload_time = clamp_f32("slow_reload_time", self.slow_reload_time, 1.5, 300.0);

        self.fast_skill_weight = clamp_u32("fast_skill_weight", self.fast_skill_weight, 0, 100);
        self.medium_skill_weight =
            clamp_u32("medium_skill_weight", self.medium_skill_weight, 0, 100);
        self.slow_skill_weight = clamp_u32("slow_skill_weight", self.slow_skill_weight, 0, 100);

        self.damage_interrupt_delay =
            clamp_f32("damage_interrupt_delay", self.damage_interrupt_delay, 0.5, 15.0);

        self.burst_shots = clamp_u32("burst_shots", self.burst_shots, 1, 50);
        self.burst_shot_delay = clamp_f32("burst_shot_delay", self.burst_shot_delay, 0.02, 0.5);

        self.total_ammo = clamp_u32("total_ammo", self.total_ammo, 1, 200);

        self.leave_wait = clamp_f32("leave_wait", self.leave_wait, 0.5, 60.0);
        self.leave_retry_delay = clamp_f32("leave_retry_delay", self.leave_retry_delay, 0.1, 10.0);
        self.max_leave_failures = clamp_u32("max_leave_failures", self.max_leave_failures, 1, 50);
        self.arrival_radius = clamp_f32("arrival_radius", self.arrival_radius, 0.1, 10.0);

        self.idle_duration = clamp_f32("idle_duration", self.idle_duration, 0.1, 60.0);
        self.roam_duration = clamp_f32("roam_duration", self.roam_duration, 0.1, 60.0);
        self.roam_radius = clamp_f32("roam_radius", self.roam_radius, 0.0, 50.0);
        self.aim_duration = clamp_f32("aim_duration", self.aim_duration, 0.1, 10.0);
        self.engage_radius = clamp_f32("engage_radius", self.engage_radius, 0.0, 200.0);
        self.shoot_end_duration = clamp_f32("shoot_end_duration", self.shoot_end_duration, 0.0, 10.0);
        self.fire_distance = clamp_f32("fire_distance", self.fire_distance, 1.0, 500.0);
        self.move_speed = clamp_f32("move_speed", self.move_speed, 0.1, 20.0);

        self.wander_cue_min_interval =
            clamp_f32("wander_cue_min_interval", self.wander_cue_min_interval, 0.5, 60.0);
        self.wander_cue_max_interval =
            clamp_f32("wander_cue_max_interval", self.wander_cue_max_interval, 0.5, 120.0);
        if self.wander_cue_min_interval > self.wander_cue_max_interval {
            log_warning(&format!(
                "Config: wander_cue_min_interval {:.2} > max {:.2}, using max for both",
                self.wander_cue_min_interval, self.wander_cue_max_interval
            ));
            self.wander_cue_min_interval = self.wander_cue_max_interval;
        }

        self
    }
}

fn clamp_f32(name: &str, value: f32, min: f32, max: f32) -> f32 {
    if !value.is_finite() {
        log_warning(&format!("Config: {} is not finite, using {:.2}", name, min));
        return min;
    }

    let clamped = value.clamp(min, max);
    if clamped != value {
        log_warning(&format!(
            "Config: {} = {:.3} out of range [{}, {}], clamped to {:.3}",
            name, value, min, max, clamped
        ));
    }
    clamped
}

fn clamp_u32(name: &str, value: u32, min: u32, max: u32) -> u32 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        log_warning(&format!(
            "Config: {} = {} out of range [{}, {}], clamped to {}",
            name, value, min, max, clamped
        ));
    }
    clamped
}
