//! Swept-segment collision between the input trail and targets
//!
//! The blade is the most recent trail movement P1→P2. A target is cut when
//! the closest point on that *segment* (not the infinite line) is within the
//! target's radius.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Slice, Target, TargetKind};
use super::trail::InputTrail;
use crate::consts::SLICE_IMPULSE;

/// Segments shorter than this cannot cut anything
const MIN_SEGMENT_LEN_SQ: f32 = 0.0001;
/// Extra spin given to a freshly cut target (radians per reference frame)
const SLICE_SPIN: f32 = 0.15;

/// A successful cut
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitEvent {
    pub target_id: u32,
    pub kind: TargetKind,
    /// Target centre at the moment of the cut
    pub position: Vec2,
    /// Unit direction of the cutting segment
    pub direction: Vec2,
}

/// Axis-aligned box around a segment, grown by `inflate` on every side
#[inline]
fn in_inflated_bounds(p: Vec2, a: Vec2, b: Vec2, inflate: f32) -> bool {
    let min = a.min(b) - Vec2::splat(inflate);
    let max = a.max(b) + Vec2::splat(inflate);
    p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
}

/// Distance from `p` to the closest point of segment `a`→`b`
pub fn segment_point_distance(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    let seg = b - a;
    let len_sq = seg.length_squared();
    if len_sq < MIN_SEGMENT_LEN_SQ {
        return (p - a).length();
    }
    let t = ((p - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    let closest = a + seg * t;
    (p - closest).length()
}

/// Does segment `a`→`b` cut a circle at `center` with `radius`?
pub fn segment_hits_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    if (b - a).length_squared() < MIN_SEGMENT_LEN_SQ {
        return false;
    }
    // Cheap reject before the precise test
    if !in_inflated_bounds(center, a, b, radius) {
        return false;
    }
    segment_point_distance(a, b, center) < radius
}

/// Mark a target cut by a segment heading along `direction`.
///
/// Returns false (and changes nothing) if the target was already cut.
pub fn slice_target(target: &mut Target, direction: Vec2, now_ms: f64) -> bool {
    if target.is_sliced() {
        return false;
    }
    target.slice = Some(Slice {
        angle: direction.y.atan2(direction.x),
        at_ms: now_ms,
    });
    // Knock the cut target along the blade so the halves visibly separate
    target.vel += direction * SLICE_IMPULSE;
    target.rotation_speed += SLICE_SPIN * direction.x.signum();
    true
}

/// Test the newest trail segment against every unsliced target.
///
/// Needs at least two trail points. Each hit target is cut exactly once;
/// hits are independent of each other, so ordering is irrelevant.
pub fn resolve_collisions(
    trail: &InputTrail,
    targets: &mut [Target],
    now_ms: f64,
) -> Vec<HitEvent> {
    let Some((p1, p2)) = trail.last_segment() else {
        return Vec::new();
    };
    let direction = (p2 - p1).normalize_or_zero();
    if direction == Vec2::ZERO {
        return Vec::new();
    }

    let mut hits = Vec::new();
    for target in targets.iter_mut().filter(|t| !t.is_sliced()) {
        if !segment_hits_circle(p1, p2, target.pos, target.radius()) {
            continue;
        }
        let position = target.pos;
        if slice_target(target, direction, now_ms) {
            hits.push(HitEvent {
                target_id: target.id,
                kind: target.kind,
                position,
                direction,
            });
        }
    }
    hits
}
