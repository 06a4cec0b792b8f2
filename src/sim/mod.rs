//! Simulation module
//!
//! All gameplay logic lives here. It must stay synchronous and bounded:
//! - No I/O, no blocking, no rendering or platform dependencies
//! - Seeded RNG only
//! - Only the frame loop mutates `SimulationState`

pub mod collision;
pub mod difficulty;
pub mod effects;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod trail;

pub use collision::{HitEvent, resolve_collisions, segment_hits_circle};
pub use difficulty::{DifficultyParams, difficulty_params, level_for_score};
pub use effects::{Effect, EffectKind, Effects};
pub use spawn::try_spawn;
pub use state::{
    EndReason, GameEvent, GamePhase, HazardPolicy, KindSpec, PlayArea, SimConfig,
    SimulationState, Slice, Target, TargetKind,
};
pub use tick::{FrameReport, TickInput, restart, start, tick};
pub use trail::InputTrail;
