//! Hit feedback: particles and floating score popups
//!
//! Purely visual. Live effects are capped; admitting one past the cap evicts
//! the oldest first.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::TargetKind;
use crate::frame_scale;

/// Particle burst sizes (inclusive)
pub const HIT_PARTICLES_MIN: usize = 20;
pub const HIT_PARTICLES_MAX: usize = 45;
pub const HAZARD_PARTICLES_MIN: usize = 40;
pub const HAZARD_PARTICLES_MAX: usize = 65;

/// Half-width of the ejection cone around the blade normal (radians)
const EJECT_SPREAD: f32 = 0.9;
/// Longest clump delay before a particle starts moving (reference frames)
const MAX_HOLD_FRAMES: f32 = 8.0;
const PARTICLE_GRAVITY: f32 = 0.2;
const PARTICLE_DRAG: f32 = 0.97;
const POPUP_RISE: f32 = 1.2;
const POPUP_DECAY: f32 = 0.02;

/// What an effect draws as
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    Particle,
    ScorePopup { value: i32 },
}

/// A transient visual entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1 → 0; removed at or below zero
    pub life: f32,
    /// Life lost per reference frame
    pub decay: f32,
    /// RGB color tag
    pub color: u32,
    pub size: f32,
    /// Reference frames to wait before moving
    pub hold: f32,
}

impl Effect {
    pub fn is_held(&self) -> bool {
        self.hold > 0.0
    }

    fn advance(&mut self, step: f32) {
        if self.hold > 0.0 {
            self.hold = (self.hold - step).max(0.0);
            return;
        }
        self.pos += self.vel * step;
        if self.kind == EffectKind::Particle {
            self.vel.y += PARTICLE_GRAVITY * step;
            self.vel *= PARTICLE_DRAG.powf(step);
        }
        self.life -= self.decay * step;
    }
}

/// Live effects in insertion order (oldest first)
#[derive(Debug, Clone)]
pub struct Effects {
    live: VecDeque<Effect>,
    cap: usize,
    hold_enabled: bool,
    /// Effects dropped to respect the cap
    pub evicted: u64,
}

impl Effects {
    pub fn new(cap: usize, hold_enabled: bool) -> Self {
        Self {
            live: VecDeque::with_capacity(cap.min(1024)),
            cap,
            hold_enabled,
            evicted: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.live.iter()
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }

    /// Admit an effect, evicting the oldest if the cap is reached
    pub fn push(&mut self, effect: Effect) {
        if self.cap == 0 {
            return;
        }
        while self.live.len() >= self.cap {
            self.live.pop_front();
            self.evicted += 1;
        }
        self.live.push_back(effect);
        debug_assert!(self.live.len() <= self.cap);
    }

    /// Burst of particles plus a score popup for a hit.
    ///
    /// Particles fly out around the blade's normal on both sides. Hazard
    /// bursts are bigger and never hold. Returns the number of particles.
    pub fn emit_hit_effects<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        position: Vec2,
        direction: Vec2,
        kind: TargetKind,
        is_hazard: bool,
    ) -> usize {
        let spec = kind.spec();
        let count = if is_hazard {
            rng.random_range(HAZARD_PARTICLES_MIN..=HAZARD_PARTICLES_MAX)
        } else {
            rng.random_range(HIT_PARTICLES_MIN..=HIT_PARTICLES_MAX)
        };

        let normal = Vec2::new(-direction.y, direction.x).normalize_or(Vec2::NEG_Y);
        let (speed_lo, speed_hi) = if is_hazard { (4.0, 11.0) } else { (2.0, 8.0) };

        for i in 0..count {
            let side = if rng.random::<bool>() { normal } else { -normal };
            let angle = side.y.atan2(side.x) + rng.random_range(-EJECT_SPREAD..EJECT_SPREAD);
            let speed = rng.random_range(speed_lo..speed_hi);
            let hold = if is_hazard || !self.hold_enabled {
                0.0
            } else {
                rng.random_range(0.0..MAX_HOLD_FRAMES)
            };
            // Held particles start bunched up close to the cut
            let jitter = if hold > 0.0 { 4.0 } else { 10.0 };
            let offset = Vec2::new(
                rng.random_range(-jitter..jitter),
                rng.random_range(-jitter..jitter),
            );

            self.push(Effect {
                kind: EffectKind::Particle,
                pos: position + offset,
                vel: crate::direction_from_angle(angle) * speed,
                life: 1.0,
                decay: rng.random_range(0.015..0.035),
                color: if i % 2 == 0 { spec.primary } else { spec.secondary },
                size: rng.random_range(2.0..6.0),
                hold,
            });
        }

        self.push(Effect {
            kind: EffectKind::ScorePopup { value: spec.points },
            pos: position,
            vel: Vec2::new(0.0, -POPUP_RISE),
            life: 1.0,
            decay: POPUP_DECAY,
            color: spec.secondary,
            size: 24.0,
            hold: 0.0,
        });

        count
    }

    /// Integrate every live effect and drop the expired ones
    pub fn advance(&mut self, dt: f32) {
        let step = frame_scale(dt);
        for effect in self.live.iter_mut() {
            effect.advance(step);
        }
        self.live.retain(|e| e.life > 0.0);
    }
}
