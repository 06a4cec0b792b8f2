//! Per-frame simulation step and game state machine
//!
//! START → COUNTDOWN → ACTIVE → ENDED → (restart) → COUNTDOWN ...
//!
//! One call to [`tick`] per input sample. Frame timing may vary; everything
//! that moves is scaled by the frame delta.

use glam::Vec2;

use super::collision::{HitEvent, resolve_collisions};
use super::spawn::try_spawn;
use super::state::{EndReason, GameEvent, GamePhase, HazardPolicy, SimulationState};
use crate::consts::*;
use crate::frame_scale;

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in canvas coordinates, `None` when nothing is tracked
    pub pointer: Option<Vec2>,
    /// Start command (only honoured in `Start`)
    pub start: bool,
    /// Restart command (only honoured in `Ended`)
    pub restart: bool,
}

/// What happened during one frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub hits: Vec<HitEvent>,
    pub spawned: Option<u32>,
    /// Targets that fell out of the play area
    pub evicted: usize,
    /// Phase at the start of the frame, if it changed
    pub previous_phase: Option<GamePhase>,
}

impl FrameReport {
    /// Did a top-tier target get cut this frame?
    pub fn rare_hit(&self) -> bool {
        self.hits.iter().any(|h| h.kind.is_rare())
    }
}

/// START → COUNTDOWN. Returns false (no-op) from any other phase.
pub fn start(state: &mut SimulationState) -> bool {
    if state.phase != GamePhase::Start {
        return false;
    }
    enter_countdown(state);
    true
}

/// ENDED → COUNTDOWN. Returns false (no-op) from any other phase.
pub fn restart(state: &mut SimulationState) -> bool {
    if state.phase != GamePhase::Ended {
        return false;
    }
    enter_countdown(state);
    true
}

fn enter_countdown(state: &mut SimulationState) {
    log::info!("{:?} -> Countdown ({}s)", state.phase, state.config.countdown_secs);
    state.phase = GamePhase::Countdown;
    state.countdown_remaining = state.config.countdown_secs;
    state.events.push(GameEvent::CountdownStarted);
}

fn begin_round(state: &mut SimulationState, now_ms: f64) {
    state.reset_round(now_ms);
    state.phase = GamePhase::Active;
    state.events.push(GameEvent::RoundStarted);
    log::info!("Round started (seed {})", state.seed);
}

fn end_round(state: &mut SimulationState, reason: EndReason) {
    state.phase = GamePhase::Ended;
    state.end_reason = Some(reason);
    state.events.push(GameEvent::GameOver {
        score: state.score,
        reason,
    });
    log::info!(
        "Round over ({:?}): score {} level {}",
        reason,
        state.score,
        state.level
    );
}

/// Advance the simulation by one frame
pub fn tick(state: &mut SimulationState, input: &TickInput, now_ms: f64, dt: f32) -> FrameReport {
    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    let entry_phase = state.phase;
    let mut report = FrameReport::default();

    // Trail is fed in every phase; losing the pointer ends the stroke
    match input.pointer {
        Some(p) => {
            if state.phase == GamePhase::Active {
                check_swoosh(state, p, now_ms, dt);
            }
            state.trail.push(p);
        }
        None => state.trail.clear(),
    }

    if input.start {
        start(state);
    }
    if input.restart {
        restart(state);
    }

    match state.phase {
        GamePhase::Start | GamePhase::Ended => {}
        GamePhase::Countdown => {
            // The frame that issued start/restart does not count down.
            // No simulation during the countdown, including the frame it finishes.
            if entry_phase == GamePhase::Countdown {
                state.countdown_remaining -= dt;
                if state.countdown_remaining <= 0.0 {
                    state.countdown_remaining = 0.0;
                    begin_round(state, now_ms);
                }
            }
        }
        GamePhase::Active => {
            // A round that only just began (this frame) starts simulating next frame
            if entry_phase == GamePhase::Active {
                active_frame(state, input, now_ms, dt, &mut report);
            }
        }
    }

    if state.phase != entry_phase {
        report.previous_phase = Some(entry_phase);
    }
    report
}

fn active_frame(
    state: &mut SimulationState,
    input: &TickInput,
    now_ms: f64,
    dt: f32,
    report: &mut FrameReport,
) {
    let step = frame_scale(dt);

    // Gravity, then drop anything that fell out of the bottom
    for target in state.targets.iter_mut() {
        target.integrate(step);
    }
    let evict_y = state.config.area.evict_y();
    let before = state.targets.len();
    state.targets.retain(|t| t.pos.y <= evict_y);
    report.evicted = before - state.targets.len();

    // Only a fresh sample can cut; a stale segment is never re-tested
    if input.pointer.is_some() {
        report.hits = resolve_collisions(&state.trail, &mut state.targets, now_ms);
    }
    for hit in &report.hits {
        apply_hit(state, hit);
    }

    if state.config.hazard_policy == HazardPolicy::Lives && state.lives == 0 {
        end_round(state, EndReason::OutOfLives);
        return;
    }

    report.spawned = try_spawn(state, now_ms);
    state.effects.advance(dt);

    state.time_remaining -= dt;
    if state.time_remaining <= 0.0 {
        state.time_remaining = 0.0;
        end_round(state, EndReason::TimeUp);
    }
}

fn apply_hit(state: &mut SimulationState, hit: &HitEvent) {
    let is_hazard = hit.kind.is_hazard();
    if is_hazard {
        state.apply_hazard();
        state.events.push(GameEvent::HazardHit { lives: state.lives });
        log::debug!("Hazard #{} hit, lives {}", hit.target_id, state.lives);
    } else {
        let points = hit.kind.points();
        state.events.push(GameEvent::Slice {
            kind: hit.kind,
            points,
        });
        if let Some(level) = state.add_points(points.max(0) as u64) {
            state.events.push(GameEvent::LevelUp { level });
            log::info!("Level up: {} (score {})", level, state.score);
        }
        log::debug!("Sliced {} #{} (+{})", hit.kind.as_str(), hit.target_id, points);
    }

    state
        .effects
        .emit_hit_effects(&mut state.rng, hit.position, hit.direction, hit.kind, is_hazard);
}

/// Raise a swoosh cue when the pointer moves fast enough
fn check_swoosh(state: &mut SimulationState, p: Vec2, now_ms: f64, dt: f32) {
    let Some(last) = state.trail.last() else {
        return;
    };
    let step = frame_scale(dt);
    if step <= 0.0 {
        return;
    }
    let speed = (p - last).length() / step;
    let cooled = state
        .last_swoosh_ms
        .is_none_or(|t| now_ms - t >= SWOOSH_COOLDOWN_MS);
    if speed > SWOOSH_SPEED && cooled {
        state.last_swoosh_ms = Some(now_ms);
        state.events.push(GameEvent::Swoosh);
    }
}
