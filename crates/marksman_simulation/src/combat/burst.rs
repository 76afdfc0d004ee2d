//! Burst fire — серия выстрелов с фиксированной задержкой
//!
//! Burst state не реплицируется целиком: observers видят только `is_burst_active`.

use bevy::prelude::*;

use super::state::{AmmoSpend, AuthorityCombat, CombatView};
use crate::logger::{log, log_info};

#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct BurstTracker {
    pub active: bool,
    pub shots_total: u32,
    pub shots_remaining: u32,
    pub shot_timer: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstOutcome {
    InProgress,
    /// Все выстрелы сделаны, burst закрыт
    Completed,
    /// Патроны кончились посреди burst'а, burst закрыт (выстрел на этом тике возможен
    /// только под override)
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstTick {
    /// Номер выстрела (1-based), если выстрел был на этом тике
    pub fired_shot: Option<u32>,
    pub outcome: BurstOutcome,
}

impl AuthorityCombat {
    /// Старт burst'а: первый выстрел — на ближайшем тике
    ///
    /// Во время reload'а burst не стартует (возвращает `false`).
    pub fn initialize_burst(&mut self, shots: u32) -> bool {
        if self.is_reloading() {
            log("Burst not started: reloading");
            return false;
        }

        self.burst = BurstTracker {
            active: true,
            shots_total: shots,
            shots_remaining: shots,
            shot_timer: 0.0,
        };
        log_info(&format!("💥 Burst started: {} shots", shots));
        true
    }

    /// Закрытие burst'а (идемпотентно)
    pub fn end_burst(&mut self) {
        if self.burst.active {
            log(&format!(
                "Burst ended ({} shots left)",
                self.burst.shots_remaining
            ));
        }
        self.burst.active = false;
        self.burst.shots_remaining = 0;
        self.burst.shot_timer = 0.0;
    }

    pub fn burst_shots_remaining(&self) -> u32 {
        self.burst.shots_remaining
    }

    /// Один тик burst'а
    ///
    /// Когда shot timer истёк и выстрелы остались: тратим патрон, стреляем,
    /// сбрасываем timer на `shot_delay`. Завершение проверяется на том же тике.
    pub fn tick_burst(&mut self, delta: f32, shot_delay: f32, override_active: bool) -> BurstTick {
        if !self.burst.active {
            return BurstTick {
                fired_shot: None,
                outcome: BurstOutcome::Completed,
            };
        }

        self.burst.shot_timer -= delta;
        let mut fired_shot = None;

        if self.burst.shot_timer <= 0.0 && self.burst.shots_remaining > 0 {
            let shot_number = self.burst.shots_total - self.burst.shots_remaining + 1;

            match self.try_consume_ammo(override_active) {
                AmmoSpend::Exhausted => {
                    self.end_burst();
                    return BurstTick {
                        fired_shot: None,
                        outcome: BurstOutcome::Exhausted,
                    };
                }
                // Последний патрон под override: выстрел есть, burst уже закрыт
                AmmoSpend::LastRoundUnderOverride => {
                    return BurstTick {
                        fired_shot: Some(shot_number),
                        outcome: BurstOutcome::Exhausted,
                    };
                }
                AmmoSpend::Unlimited | AmmoSpend::Spent { .. } => {}
            }

            fired_shot = Some(shot_number);
            self.burst.shots_remaining -= 1;
            self.burst.shot_timer = shot_delay;
        }

        if self.burst.active && self.burst.shots_remaining == 0 {
            self.end_burst();
            return BurstTick {
                fired_shot,
                outcome: BurstOutcome::Completed,
            };
        }

        BurstTick {
            fired_shot,
            outcome: BurstOutcome::InProgress,
        }
    }
}
