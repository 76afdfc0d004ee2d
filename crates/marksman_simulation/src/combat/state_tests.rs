//! Tests for AuthorityCombat: ammo, reload, interrupt, timers.

#[cfg(test)]
mod tests {
    use crate::combat::{AmmoSpend, AuthorityCombat, CombatView, ObserverMirror, ReloadBlock, SkillTier};
    use crate::config::{HunterConfig, UNLIMITED_AMMO};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn limited_config(total_ammo: u32) -> HunterConfig {
        HunterConfig {
            enable_ammo_limit: true,
            total_ammo,
            ..HunterConfig::default()
        }
    }

    fn assert_invariants(combat: &AuthorityCombat) {
        if !combat.is_reloading() {
            assert_eq!(combat.reload_time_remaining(), 0.0);
        }
        if combat.is_interrupted() {
            assert!(!combat.is_reloading());
        }
        assert!(!(combat.is_reloading() && combat.is_burst_active()));
        assert!(combat.reload_time_remaining() >= 0.0);
        assert!(combat.interrupt_time_remaining() >= 0.0);
    }

    #[test]
    fn test_new_hunter_is_idle_with_full_ammo() {
        let combat = AuthorityCombat::new(SkillTier::Fast, &limited_config(12));
        assert_eq!(combat.ammo_remaining(), 12);
        assert!(!combat.is_reloading());
        assert!(!combat.is_interrupted());
        assert!(!combat.is_permanently_out_of_ammo());
        assert!(combat.has_ammo());
    }

    #[test]
    fn test_start_reload_uses_tier_duration() {
        let config = HunterConfig::default();
        let mut combat = AuthorityCombat::new(SkillTier::Slow, &config);

        assert_eq!(combat.start_reload(&config), Some(7.0));
        assert!(combat.is_reloading());
        assert_eq!(combat.reload_time_remaining(), 7.0);

        // Второй вызов — no-op
        assert_eq!(combat.reload_block(), Some(ReloadBlock::AlreadyReloading));
        assert_eq!(combat.start_reload(&config), None);
        assert_eq!(combat.reload_time_remaining(), 7.0);
    }

    #[test]
    fn test_reload_completes_after_countdown() {
        let config = HunterConfig::default();
        let mut combat = AuthorityCombat::new(SkillTier::Fast, &config);
        combat.start_reload(&config);

        let tick = combat.tick_timers(1.5);
        assert!(!tick.reload_finished);
        assert!(combat.is_reloading());

        let tick = combat.tick_timers(0.6);
        assert!(tick.reload_finished);
        assert!(!combat.is_reloading());
        assert_eq!(combat.reload_time_remaining(), 0.0);
    }

    #[test]
    fn test_damage_interrupt_cancels_reload() {
        let config = HunterConfig::default();
        let mut combat = AuthorityCombat::new(SkillTier::Medium, &config);
        combat.start_reload(&config);
        combat.tick_timers(1.0);
        assert!((combat.reload_time_remaining() - 4.0).abs() < 1e-5);

        assert_eq!(combat.apply_damage_interrupt(&config), Some(5.0));
        assert!(!combat.is_reloading());
        assert_eq!(combat.reload_time_remaining(), 0.0);
        assert_eq!(combat.interrupt_time_remaining(), 5.0);
        assert!(combat.is_interrupted());

        // Во время interrupt reload заблокирован
        assert_eq!(combat.start_reload(&config), None);
        assert_eq!(combat.reload_block(), Some(ReloadBlock::Interrupted));
    }

    #[test]
    fn test_damage_without_reload_is_ignored() {
        let config = HunterConfig::default();
        let mut combat = AuthorityCombat::new(SkillTier::Medium, &config);

        assert_eq!(combat.apply_damage_interrupt(&config), None);
        assert!(!combat.is_interrupted());
    }

    #[test]
    fn test_damage_interrupt_disabled_keeps_reloading() {
        let config = HunterConfig {
            enable_damage_interrupt: false,
            ..HunterConfig::default()
        };
        let mut combat = AuthorityCombat::new(SkillTier::Medium, &config);
        combat.start_reload(&config);

        assert_eq!(combat.apply_damage_interrupt(&config), None);
        assert!(combat.is_reloading());
    }

    #[test]
    fn test_interrupt_window_expires() {
        let config = HunterConfig::default();
        let mut combat = AuthorityCombat::new(SkillTier::Fast, &config);
        combat.start_reload(&config);
        combat.apply_damage_interrupt(&config);

        let tick = combat.tick_timers(4.9);
        assert!(!tick.interrupt_finished);
        let tick = combat.tick_timers(0.2);
        assert!(tick.interrupt_finished);
        assert!(!combat.is_interrupted());
        assert_eq!(combat.start_reload(&config), Some(2.0));
    }

    #[test]
    fn test_unlimited_ammo_never_decrements() {
        let config = HunterConfig::default();
        let mut combat = AuthorityCombat::new(SkillTier::Fast, &config);

        for _ in 0..100 {
            assert_eq!(combat.try_consume_ammo(false), AmmoSpend::Unlimited);
        }
        assert_eq!(combat.ammo_remaining(), UNLIMITED_AMMO);
    }

    #[test]
    fn test_last_round_latches_out_of_ammo() {
        let config = limited_config(1);
        let mut combat = AuthorityCombat::new(SkillTier::Fast, &config);

        let spend = combat.try_consume_ammo(false);
        assert_eq!(spend, AmmoSpend::Exhausted);
        assert!(!spend.allows_fire());
        assert_eq!(combat.ammo_remaining(), 0);
        assert!(combat.is_permanently_out_of_ammo());

        // После latch reload невозможен
        assert_eq!(combat.start_reload(&config), None);
        assert_eq!(combat.reload_block(), Some(ReloadBlock::OutOfAmmo));
    }

    #[test]
    fn test_last_round_under_override_still_fires() {
        let config = limited_config(2);
        let mut combat = AuthorityCombat::new(SkillTier::Fast, &config);

        assert_eq!(combat.try_consume_ammo(true), AmmoSpend::Spent { remaining: 1 });
        combat.start_reload(&config);

        let spend = combat.try_consume_ammo(true);
        assert_eq!(spend, AmmoSpend::LastRoundUnderOverride);
        assert!(spend.allows_fire());
        assert!(!combat.is_permanently_out_of_ammo());
        assert!(!combat.is_reloading());
        assert!(!combat.has_ammo());

        // Пусто, но override не даёт latch'нуть
        assert_eq!(combat.try_consume_ammo(true), AmmoSpend::Exhausted);
        assert!(!combat.is_permanently_out_of_ammo());
        assert_eq!(combat.ammo_remaining(), 0);
    }

    #[test]
    fn test_latch_is_permanent() {
        let config = limited_config(1);
        let mut combat = AuthorityCombat::new(SkillTier::Fast, &config);
        assert!(combat.latch_out_of_ammo(false));
        assert!(!combat.latch_out_of_ammo(false));

        for _ in 0..10 {
            combat.tick_timers(1.0);
            combat.apply_damage_interrupt(&config);
            combat.start_reload(&config);
            combat.try_consume_ammo(false);
            assert!(combat.is_permanently_out_of_ammo());
        }
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let config = limited_config(5);
        let mut combat = AuthorityCombat::new(SkillTier::Medium, &config);
        combat.try_consume_ammo(false);
        combat.start_reload(&config);

        let snapshot = combat.snapshot();
        assert!(snapshot.is_reloading);
        assert_eq!(snapshot.ammo_remaining, 4);
        assert!(!snapshot.is_permanently_out_of_ammo);
        assert!(!snapshot.is_interrupted);
        assert!(!snapshot.is_burst_active);

        let init = combat.init_message();
        assert_eq!(init.skill_tier_index, 1);
        assert_eq!(init.initial_ammo, 4);
    }

    #[test]
    fn test_promote_keeps_ground_truth() {
        let config = limited_config(10);
        let mut authority = AuthorityCombat::new(SkillTier::Slow, &config);
        authority.try_consume_ammo(false);
        authority.start_reload(&config);

        let mut mirror = ObserverMirror::new(&config);
        mirror.apply_init(&authority.init_message());
        mirror.apply_snapshot(&authority.snapshot());

        // Prediction потерян: local reload timer = 0 → reload закончится на следующем тике
        let mut promoted = AuthorityCombat::promote(&mirror, &config);
        assert_eq!(promoted.skill(), SkillTier::Slow);
        assert_eq!(promoted.ammo_remaining(), 9);
        assert!(promoted.is_reloading());

        let tick = promoted.tick_timers(1.0 / 64.0);
        assert!(tick.reload_finished);
        assert!(!promoted.is_reloading());
        assert_eq!(promoted.ammo_remaining(), 9);
    }

    #[test]
    fn test_random_operation_sequences_keep_invariants() {
        let config = HunterConfig {
            enable_burst_mode: true,
            ..limited_config(40)
        };

        for seed in 0..20u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let tier = SkillTier::roll(config.skill_weights(), &mut rng);
            let mut combat = AuthorityCombat::new(tier, &config);
            let mut previous_ammo = combat.ammo_remaining();
            let mut latched = false;

            for _ in 0..500 {
                let override_active = rng.gen_bool(0.1);
                match rng.gen_range(0..6) {
                    0 => {
                        combat.start_reload(&config);
                    }
                    1 => {
                        combat.apply_damage_interrupt(&config);
                    }
                    2 => {
                        combat.try_consume_ammo(override_active);
                    }
                    3 => {
                        if !combat.is_burst_active() {
                            combat.initialize_burst(config.burst_shots);
                        }
                    }
                    4 => {
                        combat.tick_burst(1.0 / 64.0, config.burst_shot_delay, override_active);
                    }
                    _ => {
                        combat.tick_timers(rng.gen_range(0.0..0.5));
                    }
                }

                assert_invariants(&combat);
                assert!(combat.ammo_remaining() <= previous_ammo, "ammo increased");
                previous_ammo = combat.ammo_remaining();

                if latched {
                    assert!(combat.is_permanently_out_of_ammo(), "latch cleared");
                }
                latched = combat.is_permanently_out_of_ammo();
            }
        }
    }
}
