//! Coaching advisory
//!
//! Periodically sends a frame and a summary of the live targets to a
//! reasoning service and keeps the latest hint for display. The frame loop
//! never waits on the service.

pub mod message;
pub mod orchestrator;
pub mod policy;
pub mod transport;

use thiserror::Error;

pub use message::{
    AdvisoryContext, AdvisoryRequest, AdvisoryResponse, CapturedFrame, TargetSummary,
    parse_response,
};
pub use orchestrator::{AdvisoryOrchestrator, AdvisoryState, TriggerSignal};
pub use policy::{AdvisoryTrigger, TriggerContext, TriggerPolicy};
pub use transport::{AdvisoryTransport, FrameCapture, HeuristicCoach, HttpTransport};

/// Shown when a request fails for any reason
pub const FALLBACK_MESSAGE: &str = "Coach is offline. Keep slicing!";

/// Shown before the first answer of a round
pub const IDLE_MESSAGE: &str = "Coach is watching...";

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("no API key configured")]
    MissingCredentials,
    #[error("frame capture failed: {0}")]
    Capture(String),
}
