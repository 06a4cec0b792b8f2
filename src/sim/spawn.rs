//! Target spawning
//!
//! One target per spawn interval, launched upward from below the play area.
//! Kind selection rolls the hazard first, then walks a weighted tier ladder
//! of collectibles that tilts toward the valuable tiers as the level rises.

use glam::Vec2;
use rand::Rng;

use super::difficulty::{DifficultyParams, difficulty_params};
use super::state::{GamePhase, SimulationState, Target, TargetKind};
use crate::consts::GRAVITY;

/// Launch apex as a fraction of the launch depth (before level bonus)
const APEX_FRACTION_MIN: f32 = 0.45;
const APEX_FRACTION_MAX: f32 = 0.75;
/// Lateral launch speed toward the centre (pixels per reference frame)
const LATERAL_MIN: f32 = 1.0;
const LATERAL_MAX: f32 = 3.5;
const LATERAL_JITTER: f32 = 0.5;
/// Spin range (radians per reference frame)
const MAX_SPIN: f32 = 0.08;
/// Levels over which tier weights keep shifting
const TIER_SHIFT_LEVELS: u32 = 10;

/// Relative weight of a collectible tier at a level
fn tier_weight(kind: TargetKind, level: u32) -> f32 {
    let shift = (level.max(1) - 1).min(TIER_SHIFT_LEVELS) as f32;
    match kind {
        TargetKind::Apple => 40.0 - 2.0 * shift,
        TargetKind::Orange => 30.0,
        TargetKind::Watermelon => 18.0 + shift,
        TargetKind::Pineapple => 9.0 + 0.6 * shift,
        TargetKind::Starfruit => 3.0 + 0.4 * shift,
        TargetKind::Bomb => 0.0,
    }
}

/// Pick a kind: hazard roll first, then the collectible ladder
pub fn pick_kind<R: Rng + ?Sized>(
    rng: &mut R,
    params: &DifficultyParams,
    level: u32,
) -> TargetKind {
    if params.hazard_probability > 0.0 && rng.random::<f32>() < params.hazard_probability {
        return TargetKind::Bomb;
    }

    let total: f32 = TargetKind::COLLECTIBLES
        .iter()
        .map(|&k| tier_weight(k, level))
        .sum();
    let mut roll = rng.random::<f32>() * total;
    for kind in TargetKind::COLLECTIBLES {
        let w = tier_weight(kind, level);
        if roll < w {
            return kind;
        }
        roll -= w;
    }
    TargetKind::Apple
}

/// Spawn a target if the interval for the current level has elapsed.
///
/// Returns the new target's ID. Does nothing outside `Active` or when the
/// play area is too narrow to launch from.
pub fn try_spawn(state: &mut SimulationState, now_ms: f64) -> Option<u32> {
    if state.phase != GamePhase::Active {
        return None;
    }

    let params = difficulty_params(state.level);
    if now_ms - state.last_spawn_ms < params.spawn_interval_ms {
        return None;
    }

    let area = state.config.area;
    let Some((lo, hi)) = area.launch_span() else {
        log::debug!("Spawn skipped: degenerate play area {:?}", area);
        return None;
    };

    let level = state.level;
    let rng = &mut state.rng;
    let kind = pick_kind(rng, &params, level);

    let x = rng.random_range(lo..hi);
    let launch = Vec2::new(x, area.launch_y());

    // Aim the apex somewhere in the upper part of the screen, then add the level bonus
    let apex = area.launch_y() * rng.random_range(APEX_FRACTION_MIN..APEX_FRACTION_MAX);
    let vy = -((2.0 * GRAVITY * apex).sqrt() + params.velocity_bonus);

    let center = area.width / 2.0;
    let toward_center = ((center - x) / center).clamp(-1.0, 1.0);
    let vx = toward_center * rng.random_range(LATERAL_MIN..LATERAL_MAX)
        + rng.random_range(-LATERAL_JITTER..LATERAL_JITTER);

    let rotation_speed = rng.random_range(-MAX_SPIN..MAX_SPIN);

    let id = state.next_entity_id();
    let mut target = Target::new(id, kind, launch, Vec2::new(vx, vy));
    target.rotation_speed = rotation_speed;
    state.targets.push(target);
    state.last_spawn_ms = now_ms;

    log::debug!(
        "Spawned {} #{} at x={:.0} vel=({:.2}, {:.2})",
        kind.as_str(),
        id,
        x,
        vx,
        vy
    );
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{PlayArea, SimConfig};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn active_state(seed: u64) -> SimulationState {
        let mut state = SimulationState::new(seed, SimConfig::default());
        state.phase = GamePhase::Active;
        state
    }

    #[test]
    fn test_respects_interval() {
        let mut state = active_state(3);
        let interval = difficulty_params(1).spawn_interval_ms;
        assert!(try_spawn(&mut state, interval - 1.0).is_none());
        assert!(try_spawn(&mut state, interval).is_some());
        assert!(try_spawn(&mut state, interval + 1.0).is_none());
        assert_eq!(state.targets.len(), 1);
        assert_eq!(state.last_spawn_ms, interval);
    }

    #[test]
    fn test_launch_is_upward_and_in_bounds() {
        let mut state = active_state(11);
        let mut now = 0.0;
        for _ in 0..200 {
            now += 2000.0;
            try_spawn(&mut state, now);
        }
        assert_eq!(state.targets.len(), 200);
        let area = state.config.area;
        let (lo, hi) = area.launch_span().unwrap();
        for t in &state.targets {
            assert!(t.vel.y < 0.0);
            assert!(t.pos.x >= lo && t.pos.x < hi);
            assert_eq!(t.pos.y, area.launch_y());
            assert!(!t.is_sliced());
        }
    }

    #[test]
    fn test_no_spawn_outside_active() {
        let mut state = SimulationState::new(5, SimConfig::default());
        for phase in [GamePhase::Start, GamePhase::Countdown, GamePhase::Ended] {
            state.phase = phase;
            assert!(try_spawn(&mut state, 1.0e9).is_none());
        }
        assert!(state.targets.is_empty());
    }

    #[test]
    fn test_degenerate_area_skips() {
        let config = SimConfig {
            area: PlayArea {
                width: 120.0,
                height: 300.0,
            },
            ..Default::default()
        };
        let mut state = SimulationState::new(5, config);
        state.phase = GamePhase::Active;
        assert!(try_spawn(&mut state, 1.0e9).is_none());
        assert_eq!(state.last_spawn_ms, 0.0);
    }

    #[test]
    fn test_flat_or_inverted_area_skips() {
        for height in [0.0, -40.0, -500.0, f32::NAN] {
            let config = SimConfig {
                area: PlayArea {
                    width: 1280.0,
                    height,
                },
                ..Default::default()
            };
            let mut state = SimulationState::new(6, config);
            state.phase = GamePhase::Active;
            assert!(try_spawn(&mut state, 1.0e9).is_none(), "height {height}");
            assert!(state.targets.is_empty());
        }
    }

    #[test]
    fn test_level_one_never_spawns_hazards() {
        let mut rng = Pcg32::seed_from_u64(42);
        let params = difficulty_params(1);
        for _ in 0..2000 {
            assert_ne!(pick_kind(&mut rng, &params, 1), TargetKind::Bomb);
        }
    }

    #[test]
    fn test_higher_levels_favor_higher_tiers() {
        let count_rare = |level: u32| {
            let mut rng = Pcg32::seed_from_u64(9);
            let params = difficulty_params(level);
            (0..5000)
                .filter(|_| {
                    matches!(
                        pick_kind(&mut rng, &params, level),
                        TargetKind::Pineapple | TargetKind::Starfruit
                    )
                })
                .count()
        };
        assert!(count_rare(11) > count_rare(1));
    }
}
