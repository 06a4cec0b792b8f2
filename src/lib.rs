//! Slice Arcade - slice-the-targets arcade simulation core
//!
//! Core modules:
//! - `sim`: Simulation (spawning, collision, effects, game state machine)
//! - `advisory`: Asynchronous coaching requests to an external reasoning service
//! - `audio`: Named audio cues for an external sound consumer
//! - `game`: Frame driver tying the simulation, coach and audio together
//! - `settings`: Data-driven configuration

pub mod advisory;
pub mod audio;
pub mod game;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Reference frame duration. Velocities are expressed in pixels per
    /// reference frame and integration is scaled by `dt / REFERENCE_DT`.
    pub const REFERENCE_DT: f32 = 1.0 / 60.0;
    /// Largest frame delta accepted before clamping (prevents tunnelling after stalls)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default play area (canvas) dimensions
    pub const PLAY_WIDTH: f32 = 1280.0;
    pub const PLAY_HEIGHT: f32 = 720.0;

    /// Downward acceleration on targets (pixels per reference frame²)
    pub const GRAVITY: f32 = 0.3;
    /// Horizontal keep-out band on each side for launch positions
    pub const SPAWN_MARGIN: f32 = 100.0;
    /// Targets are launched this far below the bottom edge
    pub const SPAWN_DEPTH: f32 = 40.0;
    /// Targets are removed once this far below the bottom edge
    pub const EVICT_MARGIN: f32 = 120.0;

    /// Player lives at the start of a round
    pub const MAX_LIVES: u8 = 3;
    /// Round length in seconds
    pub const ROUND_SECS: f32 = 60.0;
    /// Countdown before a round starts, in seconds
    pub const COUNTDOWN_SECS: f32 = 3.0;

    /// Input trail capacity (points)
    pub const TRAIL_CAPACITY: usize = 12;
    /// Velocity kick applied along the slice direction
    pub const SLICE_IMPULSE: f32 = 4.0;
    /// Pointer speed (pixels per reference frame) that triggers a swoosh cue
    pub const SWOOSH_SPEED: f32 = 25.0;
    /// Minimum time between swoosh cues
    pub const SWOOSH_COOLDOWN_MS: f64 = 250.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector for an angle in radians
#[inline]
pub fn direction_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Scale factor converting a frame delta in seconds to reference frames
#[inline]
pub fn frame_scale(dt: f32) -> f32 {
    dt.clamp(0.0, consts::MAX_FRAME_DT) / consts::REFERENCE_DT
}
