//! Reload + damage interrupt (authority only)
//!
//! Обе операции возвращают длительность для prediction event'а
//! (`Some(duration)`) или `None` если операция заблокирована.

use super::state::{AuthorityCombat, CombatView};
use crate::config::HunterConfig;
use crate::logger::{log, log_info};

/// Почему reload не стартовал
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadBlock {
    OutOfAmmo,
    Interrupted,
    BurstActive,
    AlreadyReloading,
}

impl AuthorityCombat {
    pub fn reload_block(&self) -> Option<ReloadBlock> {
        if self.is_permanently_out_of_ammo() {
            Some(ReloadBlock::OutOfAmmo)
        } else if self.is_interrupted() {
            Some(ReloadBlock::Interrupted)
        } else if self.is_burst_active() {
            Some(ReloadBlock::BurstActive)
        } else if self.is_reloading() {
            Some(ReloadBlock::AlreadyReloading)
        } else {
            None
        }
    }

    /// Старт перезарядки, длительность по skill tier
    pub fn start_reload(&mut self, config: &HunterConfig) -> Option<f32> {
        if let Some(block) = self.reload_block() {
            log(&format!("Reload skipped: {:?}", block));
            return None;
        }

        let duration = config.reload_duration(self.skill());
        self.begin_reload(duration);
        log_info(&format!(
            "🔄 Reload started ({:?}, {:.1}s)",
            self.skill(),
            duration
        ));
        Some(duration)
    }

    /// Урон во время перезарядки: отмена reload + interrupt window
    pub fn apply_damage_interrupt(&mut self, config: &HunterConfig) -> Option<f32> {
        if !config.enable_damage_interrupt
            || self.is_permanently_out_of_ammo()
            || !self.is_reloading()
        {
            return None;
        }

        let duration = config.damage_interrupt_delay;
        self.begin_interrupt(duration);
        log_info(&format!(
            "⚡ Reload interrupted by damage, blocked for {:.1}s",
            duration
        ));
        Some(duration)
    }
}
