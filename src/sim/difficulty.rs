//! Difficulty curve
//!
//! Pure functions of level (and score → level). No hidden state, so the
//! same level always yields the same parameters.

use serde::{Deserialize, Serialize};

/// Spawn interval at level 1
pub const BASE_SPAWN_INTERVAL_MS: f64 = 1200.0;
/// Interval shaved off per level
pub const SPAWN_INTERVAL_STEP_MS: f64 = 100.0;
/// Floor for the spawn interval
pub const MIN_SPAWN_INTERVAL_MS: f64 = 400.0;

/// Extra launch speed per level (pixels per reference frame)
pub const VELOCITY_BONUS_PER_LEVEL: f32 = 0.3;
pub const MAX_VELOCITY_BONUS: f32 = 3.0;

/// Hazards only appear from this level on
pub const HAZARD_GRACE_LEVEL: u32 = 2;
pub const HAZARD_BASE_PROBABILITY: f32 = 0.08;
pub const HAZARD_PROBABILITY_STEP: f32 = 0.03;
pub const MAX_HAZARD_PROBABILITY: f32 = 0.35;

/// Points needed per level
pub const LEVEL_SCORE_STEP: u64 = 150;
pub const MAX_LEVEL: u32 = 20;

/// Spawner tuning for one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParams {
    pub spawn_interval_ms: f64,
    pub velocity_bonus: f32,
    pub hazard_probability: f32,
}

/// Difficulty for a level (levels start at 1; 0 is treated as 1)
pub fn difficulty_params(level: u32) -> DifficultyParams {
    let steps = level.max(1) - 1;

    let spawn_interval_ms = (BASE_SPAWN_INTERVAL_MS - steps as f64 * SPAWN_INTERVAL_STEP_MS)
        .max(MIN_SPAWN_INTERVAL_MS);

    let velocity_bonus = (steps as f32 * VELOCITY_BONUS_PER_LEVEL).min(MAX_VELOCITY_BONUS);

    let hazard_probability = if level < HAZARD_GRACE_LEVEL {
        0.0
    } else {
        let over = (level - HAZARD_GRACE_LEVEL) as f32;
        (HAZARD_BASE_PROBABILITY + over * HAZARD_PROBABILITY_STEP).min(MAX_HAZARD_PROBABILITY)
    };

    DifficultyParams {
        spawn_interval_ms,
        velocity_bonus,
        hazard_probability,
    }
}

/// Level reached at a given score
pub fn level_for_score(score: u64) -> u32 {
    let level = 1 + score / LEVEL_SCORE_STEP;
    level.min(MAX_LEVEL as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_grace_levels_have_no_hazards() {
        assert_eq!(difficulty_params(0).hazard_probability, 0.0);
        assert_eq!(difficulty_params(1).hazard_probability, 0.0);
        assert!(difficulty_params(HAZARD_GRACE_LEVEL).hazard_probability > 0.0);
    }

    #[test]
    fn test_interval_hits_floor() {
        assert_eq!(difficulty_params(1).spawn_interval_ms, BASE_SPAWN_INTERVAL_MS);
        assert_eq!(difficulty_params(50).spawn_interval_ms, MIN_SPAWN_INTERVAL_MS);
    }

    #[test]
    fn test_hazard_capped() {
        assert_eq!(difficulty_params(500).hazard_probability, MAX_HAZARD_PROBABILITY);
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(level_for_score(0), 1);
        assert_eq!(level_for_score(LEVEL_SCORE_STEP - 1), 1);
        assert_eq!(level_for_score(LEVEL_SCORE_STEP), 2);
        assert_eq!(level_for_score(u64::MAX), MAX_LEVEL);
    }

    proptest! {
        #[test]
        fn interval_strictly_decreases_until_floor(level in 1u32..40) {
            let a = difficulty_params(level);
            let b = difficulty_params(level + 1);
            if a.spawn_interval_ms > MIN_SPAWN_INTERVAL_MS {
                prop_assert!(b.spawn_interval_ms < a.spawn_interval_ms);
            } else {
                prop_assert_eq!(b.spawn_interval_ms, MIN_SPAWN_INTERVAL_MS);
            }
            prop_assert!(b.hazard_probability >= a.hazard_probability);
            prop_assert!(b.velocity_bonus >= a.velocity_bonus);
        }

        #[test]
        fn deterministic(level in 0u32..100) {
            prop_assert_eq!(difficulty_params(level), difficulty_params(level));
        }

        #[test]
        fn level_monotonic_in_score(a in 0u64..100_000, b in 0u64..100_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(level_for_score(lo) <= level_for_score(hi));
        }
    }
}
