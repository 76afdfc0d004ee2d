//! Skill tier — выбирается один раз при спавне, определяет длительность перезарядки

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::logger::log_warning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Reflect)]
pub enum SkillTier {
    Fast,
    #[default]
    Medium,
    Slow,
}

impl SkillTier {
    pub const ALL: [SkillTier; 3] = [SkillTier::Fast, SkillTier::Medium, SkillTier::Slow];

    /// Wire index (0 = Fast, 1 = Medium, 2 = Slow)
    pub fn index(self) -> u32 {
        match self {
            SkillTier::Fast => 0,
            SkillTier::Medium => 1,
            SkillTier::Slow => 2,
        }
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Weighted roll по весам [fast, medium, slow]
    ///
    /// Нулевая сумма весов → равномерный выбор (с warning).
    pub fn roll<R: Rng + ?Sized>(weights: [u32; 3], rng: &mut R) -> Self {
        let total: u64 = weights.iter().map(|&w| w as u64).sum();

        if total == 0 {
            log_warning("⚠️ All skill weights are zero, picking tier uniformly");
            return Self::ALL[rng.gen_range(0..Self::ALL.len())];
        }

        let mut roll = rng.gen_range(0..total);
        for (tier, weight) in Self::ALL.iter().zip(weights) {
            let weight = weight as u64;
            if roll < weight {
                return *tier;
            }
            roll -= weight;
        }

        // Недостижимо: roll < total
        SkillTier::Slow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_wire_index_round_trip() {
        for tier in SkillTier::ALL {
            assert_eq!(SkillTier::from_index(tier.index()), Some(tier));
        }
        assert_eq!(SkillTier::from_index(3), None);
    }

    #[test]
    fn test_single_nonzero_weight_always_wins() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            assert_eq!(SkillTier::roll([0, 0, 4], &mut rng), SkillTier::Slow);
        }
    }

    #[test]
    fn test_zero_weights_pick_some_tier() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut seen = [false; 3];
        for _ in 0..300 {
            let tier = SkillTier::roll([0, 0, 0], &mut rng);
            seen[tier.index() as usize] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn test_roll_distribution_follows_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut counts = [0u32; 3];
        for _ in 0..9000 {
            counts[SkillTier::roll([5, 3, 1], &mut rng).index() as usize] += 1;
        }

        // Ожидаем ~5000 / ~3000 / ~1000
        assert!(counts[0] > 4500 && counts[0] < 5500, "fast = {}", counts[0]);
        assert!(counts[1] > 2600 && counts[1] < 3400, "medium = {}", counts[1]);
        assert!(counts[2] > 750 && counts[2] < 1250, "slow = {}", counts[2]);
    }
}
