//! Simulation state and core entity types
//!
//! `SimulationState` is the single owner of targets, effects and the scalar
//! round state. Only the frame loop holds `&mut` access to it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::Effects;
use super::trail::InputTrail;
use crate::consts::*;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle, waiting for the player to start
    #[default]
    Start,
    /// Timed lead-in; nothing simulates
    Countdown,
    /// Spawning, slicing and effects all run, round timer counts down
    Active,
    /// Round over, simulation frozen until restart
    Ended,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    OutOfLives,
    TimeUp,
}

/// Discrete events raised by the simulation for audio and other consumers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CountdownStarted,
    RoundStarted,
    Slice { kind: TargetKind, points: i32 },
    HazardHit { lives: u8 },
    LevelUp { level: u32 },
    Swoosh,
    GameOver { score: u64, reason: EndReason },
}

/// What a hazard hit costs the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HazardPolicy {
    /// Lose one life; the round ends at zero lives
    #[default]
    Lives,
    /// Lose points instead (floored at zero); lives are untouched
    ScorePenalty,
}

/// Target categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Apple,
    Orange,
    Watermelon,
    Pineapple,
    Starfruit,
    Bomb,
}

/// Fixed per-kind data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindSpec {
    pub name: &'static str,
    pub points: i32,
    pub radius: f32,
    /// Rind/skin color (RGB)
    pub primary: u32,
    /// Flesh/spark color (RGB)
    pub secondary: u32,
}

const APPLE: KindSpec = KindSpec {
    name: "apple",
    points: 10,
    radius: 40.0,
    primary: 0xd62828,
    secondary: 0xfff3c4,
};
const ORANGE: KindSpec = KindSpec {
    name: "orange",
    points: 15,
    radius: 38.0,
    primary: 0xf77f00,
    secondary: 0xfcbf49,
};
const WATERMELON: KindSpec = KindSpec {
    name: "watermelon",
    points: 25,
    radius: 52.0,
    primary: 0x2d6a4f,
    secondary: 0xef476f,
};
const PINEAPPLE: KindSpec = KindSpec {
    name: "pineapple",
    points: 40,
    radius: 45.0,
    primary: 0xc9a227,
    secondary: 0xffe66d,
};
const STARFRUIT: KindSpec = KindSpec {
    name: "starfruit",
    points: 100,
    radius: 34.0,
    primary: 0xf4d35e,
    secondary: 0xfffbe6,
};
const BOMB: KindSpec = KindSpec {
    name: "bomb",
    points: -100,
    radius: 40.0,
    primary: 0x222222,
    secondary: 0xff6b00,
};

impl TargetKind {
    /// Every collectible kind, lowest tier first
    pub const COLLECTIBLES: [TargetKind; 5] = [
        TargetKind::Apple,
        TargetKind::Orange,
        TargetKind::Watermelon,
        TargetKind::Pineapple,
        TargetKind::Starfruit,
    ];

    pub fn spec(self) -> &'static KindSpec {
        match self {
            TargetKind::Apple => &APPLE,
            TargetKind::Orange => &ORANGE,
            TargetKind::Watermelon => &WATERMELON,
            TargetKind::Pineapple => &PINEAPPLE,
            TargetKind::Starfruit => &STARFRUIT,
            TargetKind::Bomb => &BOMB,
        }
    }

    pub fn points(self) -> i32 {
        self.spec().points
    }

    pub fn radius(self) -> f32 {
        self.spec().radius
    }

    pub fn as_str(self) -> &'static str {
        self.spec().name
    }

    pub fn is_hazard(self) -> bool {
        self == TargetKind::Bomb
    }

    /// Top tier, rare enough to be worth a coaching moment
    pub fn is_rare(self) -> bool {
        self == TargetKind::Starfruit
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        [TargetKind::Bomb]
            .into_iter()
            .chain(Self::COLLECTIBLES)
            .find(|k| k.as_str() == name)
    }
}

/// Recorded once when a target is cut
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    /// Direction of the cutting segment (radians)
    pub angle: f32,
    /// Frame time of the cut (ms)
    pub at_ms: f64,
}

/// A launched target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub kind: TargetKind,
    pub pos: Vec2,
    /// Pixels per reference frame
    pub vel: Vec2,
    pub rotation: f32,
    /// Radians per reference frame
    pub rotation_speed: f32,
    /// Write-once; `Some` once the target has been cut
    pub slice: Option<Slice>,
}

impl Target {
    pub fn new(id: u32, kind: TargetKind, pos: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            rotation: 0.0,
            rotation_speed: 0.0,
            slice: None,
        }
    }

    pub fn radius(&self) -> f32 {
        self.kind.radius()
    }

    pub fn is_sliced(&self) -> bool {
        self.slice.is_some()
    }

    /// Gravity integration, `step` in reference frames
    pub fn integrate(&mut self, step: f32) {
        self.vel.y += GRAVITY * step;
        self.pos += self.vel * step;
        self.rotation = crate::normalize_angle(self.rotation + self.rotation_speed * step);
    }
}

/// Canvas dimensions the simulation plays in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayArea {
    fn default() -> Self {
        Self {
            width: PLAY_WIDTH,
            height: PLAY_HEIGHT,
        }
    }
}

impl PlayArea {
    /// Map a normalized `[0,1]²` tracker landmark to canvas coordinates
    pub fn denormalize(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x * self.width, p.y * self.height)
    }

    /// Horizontal launch range, `None` if the margins leave no room or the
    /// area has no height to launch into
    pub fn launch_span(&self) -> Option<(f32, f32)> {
        let lo = SPAWN_MARGIN;
        let hi = self.width - SPAWN_MARGIN;
        (hi > lo && self.height > 0.0).then_some((lo, hi))
    }

    pub fn launch_y(&self) -> f32 {
        self.height + SPAWN_DEPTH
    }

    pub fn evict_y(&self) -> f32 {
        self.height + EVICT_MARGIN
    }
}

/// Simulation tunables derived from `Settings`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub area: PlayArea,
    pub round_secs: f32,
    pub countdown_secs: f32,
    pub max_effects: usize,
    /// Let non-hazard particles clump briefly before bursting
    pub hold_effects: bool,
    pub hazard_policy: HazardPolicy,
    /// Points lost per hazard under `HazardPolicy::ScorePenalty`
    pub hazard_penalty: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            area: PlayArea::default(),
            round_secs: ROUND_SECS,
            countdown_secs: COUNTDOWN_SECS,
            max_effects: crate::settings::QualityPreset::Medium.max_particles(),
            hold_effects: true,
            hazard_policy: HazardPolicy::Lives,
            hazard_penalty: 50,
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub config: SimConfig,
    /// Run seed
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Seconds left in the countdown (meaningful in `Countdown`)
    pub countdown_remaining: f32,
    /// Seconds left in the round (meaningful in `Active`)
    pub time_remaining: f32,
    pub score: u64,
    pub lives: u8,
    pub level: u32,
    /// Live targets, in spawn order
    pub targets: Vec<Target>,
    pub effects: Effects,
    pub trail: InputTrail,
    /// Frame time of the last spawn (ms)
    pub last_spawn_ms: f64,
    pub last_swoosh_ms: Option<f64>,
    pub end_reason: Option<EndReason>,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl SimulationState {
    pub fn new(seed: u64, config: SimConfig) -> Self {
        let effects = Effects::new(config.max_effects, config.hold_effects);
        let time_remaining = config.round_secs;
        Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Start,
            countdown_remaining: 0.0,
            time_remaining,
            score: 0,
            lives: MAX_LIVES,
            level: 1,
            targets: Vec::new(),
            effects,
            trail: InputTrail::new(TRAIL_CAPACITY),
            last_spawn_ms: 0.0,
            last_swoosh_ms: None,
            end_reason: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reset everything a round owns. Called exactly once per COUNTDOWN → ACTIVE.
    pub fn reset_round(&mut self, now_ms: f64) {
        self.score = 0;
        self.lives = MAX_LIVES;
        self.level = 1;
        self.time_remaining = self.config.round_secs;
        self.targets.clear();
        self.effects.clear();
        self.last_spawn_ms = now_ms;
        self.last_swoosh_ms = None;
        self.end_reason = None;
    }

    /// Credit a collectible; returns the new level if it went up
    pub fn add_points(&mut self, points: u64) -> Option<u32> {
        self.score = self.score.saturating_add(points);
        self.update_level()
    }

    /// Apply a hazard hit under the configured policy
    pub fn apply_hazard(&mut self) {
        match self.config.hazard_policy {
            HazardPolicy::Lives => {
                debug_assert!(self.lives <= MAX_LIVES);
                self.lives = self.lives.saturating_sub(1);
            }
            HazardPolicy::ScorePenalty => {
                self.score = self.score.saturating_sub(self.config.hazard_penalty);
            }
        }
    }

    /// Level never goes down, even if a penalty lowers the score
    fn update_level(&mut self) -> Option<u32> {
        let derived = super::difficulty::level_for_score(self.score);
        if derived > self.level {
            self.level = derived;
            Some(derived)
        } else {
            None
        }
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_table() {
        assert!(TargetKind::Bomb.points() < -50);
        for kind in TargetKind::COLLECTIBLES {
            assert!(kind.points() > 0, "{kind:?}");
            assert!(!kind.is_hazard());
        }
        assert_eq!(TargetKind::Apple.radius(), 40.0);
        assert_eq!(TargetKind::from_name(" Watermelon "), Some(TargetKind::Watermelon));
        assert_eq!(TargetKind::from_name("bomb"), Some(TargetKind::Bomb));
        assert_eq!(TargetKind::from_name("durian"), None);
    }

    #[test]
    fn test_lives_clamped_at_zero() {
        let mut state = SimulationState::new(1, SimConfig::default());
        for _ in 0..10 {
            state.apply_hazard();
        }
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn test_score_penalty_policy_floors_at_zero() {
        let config = SimConfig {
            hazard_policy: HazardPolicy::ScorePenalty,
            hazard_penalty: 50,
            ..Default::default()
        };
        let mut state = SimulationState::new(1, config);
        state.add_points(30);
        state.apply_hazard();
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, MAX_LIVES);
    }

    #[test]
    fn test_level_never_decreases() {
        let config = SimConfig {
            hazard_policy: HazardPolicy::ScorePenalty,
            hazard_penalty: 1_000,
            ..Default::default()
        };
        let mut state = SimulationState::new(1, config);
        let level = state.add_points(1_000);
        assert!(level.is_some());
        let reached = state.level;
        state.apply_hazard();
        state.add_points(1);
        assert_eq!(state.level, reached);
    }

    #[test]
    fn test_reset_round() {
        let mut state = SimulationState::new(7, SimConfig::default());
        state.score = 500;
        state.lives = 1;
        state.level = 4;
        let id = state.next_entity_id();
        state
            .targets
            .push(Target::new(id, TargetKind::Apple, Vec2::ZERO, Vec2::ZERO));
        state.reset_round(1234.0);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, MAX_LIVES);
        assert_eq!(state.level, 1);
        assert!(state.targets.is_empty());
        assert_eq!(state.last_spawn_ms, 1234.0);
    }

    #[test]
    fn test_degenerate_play_area_has_no_launch_span() {
        let area = PlayArea {
            width: 150.0,
            height: 400.0,
        };
        assert!(area.launch_span().is_none());
        assert!(PlayArea::default().launch_span().is_some());
    }
}
