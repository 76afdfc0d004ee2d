//! AuthorityCombat — авторитетное combat state hunter'а
//!
//! Компонент живёт ТОЛЬКО на authority entity. Все мутаторы (reload, interrupt,
//! ammo, burst) — методы этого типа, поэтому observer физически не может
//! изменить ground truth: у него просто нет этого компонента (есть `ObserverMirror`).
//!
//! Инварианты:
//! - `is_reloading == false` ⇒ `reload_time_remaining == 0`
//! - `interrupt_time_remaining > 0` ⇒ `is_reloading == false`
//! - `permanently_out_of_ammo` однажды `true` — навсегда (latch)
//! - `ammo_remaining` никогда не растёт

use bevy::prelude::*;

use super::burst::BurstTracker;
use super::mirror::ObserverMirror;
use super::skill::SkillTier;
use crate::config::HunterConfig;
use crate::logger::{log, log_info, log_warning};
use crate::replication::{CombatSnapshot, InitMessage};

/// Read-only взгляд на combat state (общий для authority и observer)
///
/// Guards оцениваются через этот trait одинаково на всех участниках.
pub trait CombatView {
    fn is_reloading(&self) -> bool;
    fn is_interrupted(&self) -> bool;
    fn has_ammo(&self) -> bool;
    fn is_permanently_out_of_ammo(&self) -> bool;
    fn is_burst_active(&self) -> bool;
    /// Countdown перезарядки (на observer — advisory)
    fn reload_countdown(&self) -> f32;
    /// Countdown interrupt'а (на observer — advisory)
    fn interrupt_countdown(&self) -> f32;
}

/// Результат попытки потратить патрон
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmmoSpend {
    /// Лимит выключен — ничего не тратим
    Unlimited,
    /// Патрон потрачен, ещё остались
    Spent { remaining: u32 },
    /// Последний патрон под override (last stand): выстрел разрешён, reload/burst отменены
    LastRoundUnderOverride,
    /// Патронов нет (или кончились на этом выстреле) — выстрел НЕ происходит
    Exhausted,
}

impl AmmoSpend {
    pub fn allows_fire(&self) -> bool {
        !matches!(self, AmmoSpend::Exhausted)
    }
}

/// Что произошло с таймерами за тик
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerTick {
    pub reload_finished: bool,
    pub interrupt_finished: bool,
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AuthorityCombat {
    skill: SkillTier,
    ammo_limited: bool,
    ammo_remaining: u32,
    is_reloading: bool,
    reload_time_remaining: f32,
    interrupt_time_remaining: f32,
    permanently_out_of_ammo: bool,
    pub(super) burst: BurstTracker,
}

impl AuthorityCombat {
    pub fn new(skill: SkillTier, config: &HunterConfig) -> Self {
        Self {
            skill,
            ammo_limited: config.enable_ammo_limit,
            ammo_remaining: config.initial_ammo(),
            is_reloading: false,
            reload_time_remaining: 0.0,
            interrupt_time_remaining: 0.0,
            permanently_out_of_ammo: false,
            burst: BurstTracker::default(),
        }
    }

    /// Authority hand-off: observer mirror → authority
    ///
    /// Берём только replicated ground truth. Ammo не выдумываем; reload неизвестной
    /// длины (local timer = 0) завершается на следующем тике; burst counters не
    /// реплицируются, поэтому активный burst считается завершённым.
    pub fn promote(mirror: &ObserverMirror, config: &HunterConfig) -> Self {
        let is_reloading = mirror.is_reloading() && !mirror.is_interrupted();
        let reload_time_remaining = if is_reloading {
            mirror.reload_countdown()
        } else {
            0.0
        };
        let interrupt_time_remaining = if mirror.is_interrupted() {
            mirror.interrupt_countdown()
        } else {
            0.0
        };

        if mirror.is_burst_active() {
            log_warning("⚠️ Authority hand-off mid-burst: burst counters unknown, ending burst");
        }

        Self {
            skill: mirror.skill(),
            ammo_limited: config.enable_ammo_limit,
            ammo_remaining: mirror.ammo_remaining(),
            is_reloading,
            reload_time_remaining,
            interrupt_time_remaining,
            permanently_out_of_ammo: mirror.is_permanently_out_of_ammo(),
            burst: BurstTracker::default(),
        }
    }

    pub fn skill(&self) -> SkillTier {
        self.skill
    }

    pub fn ammo_remaining(&self) -> u32 {
        self.ammo_remaining
    }

    pub fn ammo_limited(&self) -> bool {
        self.ammo_limited
    }

    pub fn reload_time_remaining(&self) -> f32 {
        self.reload_time_remaining
    }

    pub fn interrupt_time_remaining(&self) -> f32 {
        self.interrupt_time_remaining
    }

    /// Полный snapshot в фиксированном порядке полей
    pub fn snapshot(&self) -> CombatSnapshot {
        CombatSnapshot {
            is_reloading: self.is_reloading,
            ammo_remaining: self.ammo_remaining,
            is_permanently_out_of_ammo: self.permanently_out_of_ammo,
            is_interrupted: self.is_interrupted(),
            is_burst_active: self.burst.active,
        }
    }

    /// Durable init для observers (в том числе late-join)
    pub fn init_message(&self) -> InitMessage {
        InitMessage {
            skill_tier_index: self.skill.index(),
            initial_ammo: self.ammo_remaining,
        }
    }

    /// Per-tick countdown: interrupt, затем reload
    pub fn tick_timers(&mut self, delta: f32) -> TimerTick {
        let mut tick = TimerTick::default();

        if self.interrupt_time_remaining > 0.0 {
            self.interrupt_time_remaining -= delta;
            if self.interrupt_time_remaining <= 0.0 {
                self.interrupt_time_remaining = 0.0;
                tick.interrupt_finished = true;
                log("Interrupt window over, reload allowed again");
            }
        }

        if self.is_reloading {
            self.reload_time_remaining -= delta;
            if self.reload_time_remaining <= 0.0 {
                self.reload_time_remaining = 0.0;
                self.is_reloading = false;
                tick.reload_finished = true;
                log_info(&format!("🔄 Reload finished ({:?})", self.skill));
            }
        }

        tick
    }

    /// Тратит один патрон
    ///
    /// Последний патрон без override латчит permanent out-of-ammo и выстрел
    /// не происходит. Под override выстрел разрешён, но reload/burst отменяются.
    pub fn try_consume_ammo(&mut self, override_active: bool) -> AmmoSpend {
        if !self.ammo_limited {
            return AmmoSpend::Unlimited;
        }

        if self.ammo_remaining == 0 {
            self.latch_out_of_ammo(override_active);
            return AmmoSpend::Exhausted;
        }

        self.ammo_remaining -= 1;
        log(&format!("Ammo spent, {} left", self.ammo_remaining));

        if self.ammo_remaining > 0 {
            return AmmoSpend::Spent {
                remaining: self.ammo_remaining,
            };
        }

        if override_active {
            log_info("🛡️ Last round under override: cancelling reload/burst, still firing");
            self.cancel_actions();
            AmmoSpend::LastRoundUnderOverride
        } else {
            self.latch_out_of_ammo(false);
            AmmoSpend::Exhausted
        }
    }

    /// Latch permanent out-of-ammo (no-op под override или если уже latched)
    ///
    /// Возвращает `true` если latch произошёл именно сейчас.
    pub fn latch_out_of_ammo(&mut self, override_active: bool) -> bool {
        if override_active || self.permanently_out_of_ammo {
            return false;
        }

        self.permanently_out_of_ammo = true;
        self.cancel_actions();
        log_info("🚫 Out of ammo permanently, hunter will leave");
        true
    }

    /// Отмена reload + burst (без изменения ammo)
    pub(super) fn cancel_actions(&mut self) {
        self.is_reloading = false;
        self.reload_time_remaining = 0.0;
        self.end_burst();
    }

    pub(super) fn begin_reload(&mut self, duration: f32) {
        self.is_reloading = true;
        self.reload_time_remaining = duration;
    }

    pub(super) fn begin_interrupt(&mut self, duration: f32) {
        self.is_reloading = false;
        self.reload_time_remaining = 0.0;
        self.interrupt_time_remaining = duration;
    }
}

impl CombatView for AuthorityCombat {
    fn is_reloading(&self) -> bool {
        self.is_reloading
    }

    fn is_interrupted(&self) -> bool {
        self.interrupt_time_remaining > 0.0
    }

    fn has_ammo(&self) -> bool {
        !self.ammo_limited || self.ammo_remaining > 0
    }

    fn is_permanently_out_of_ammo(&self) -> bool {
        self.permanently_out_of_ammo
    }

    fn is_burst_active(&self) -> bool {
        self.burst.active
    }

    fn reload_countdown(&self) -> f32 {
        self.reload_time_remaining
    }

    fn interrupt_countdown(&self) -> f32 {
        self.interrupt_time_remaining
    }
}
