//! Request and response shapes exchanged with the coach

use serde::{Deserialize, Serialize};

use super::AdvisoryError;
use crate::sim::{SimulationState, TargetKind};

/// One live collectible as the coach sees it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSummary {
    pub kind: TargetKind,
    /// Vertical position in canvas pixels (0 = top)
    pub y: f32,
}

/// Read-only snapshot of the simulation, taken when a request fires
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryContext {
    pub targets: Vec<TargetSummary>,
    pub score: u64,
    pub level: u32,
    pub lives: u8,
}

impl AdvisoryContext {
    /// Unsliced, non-hazard targets plus the scalar state
    pub fn from_state(state: &SimulationState) -> Self {
        let targets = state
            .targets
            .iter()
            .filter(|t| !t.is_sliced() && !t.kind.is_hazard())
            .map(|t| TargetSummary {
                kind: t.kind,
                y: t.pos.y,
            })
            .collect();
        Self {
            targets,
            score: state.score,
            level: state.level,
            lives: state.lives,
        }
    }

    /// Plain-text description for the prompt
    pub fn summary(&self) -> String {
        let targets = if self.targets.is_empty() {
            "none".to_string()
        } else {
            self.targets
                .iter()
                .map(|t| format!("{} at y={:.0}", t.kind.as_str(), t.y))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "Score {} (level {}, {} lives). Live fruit: {}.",
            self.score, self.level, self.lives, targets
        )
    }
}

/// Opaque image of the current frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedFrame {
    pub mime: String,
    pub data: Vec<u8>,
}

impl CapturedFrame {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }
}

/// Everything sent to the coach for one request
#[derive(Debug, Clone)]
pub struct AdvisoryRequest {
    pub frame: CapturedFrame,
    pub context: AdvisoryContext,
    pub prompt: String,
}

impl AdvisoryRequest {
    pub fn new(frame: CapturedFrame, context: AdvisoryContext) -> Self {
        let prompt = format!(
            "You are a fruit-slicing coach. {} Pick the fruit the player should go for next \
             and reply as JSON with fields message, priorityCategory, rationale, techniqueTip.",
            context.summary()
        );
        Self {
            frame,
            context,
            prompt,
        }
    }
}

/// Coach answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryResponse {
    pub message: String,
    #[serde(default, alias = "priorityCategory", alias = "priority")]
    pub priority_category: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default, alias = "techniqueTip")]
    pub technique_tip: Option<String>,
}

impl AdvisoryResponse {
    /// Suggested kind, ignoring unknown names and hazards
    pub fn priority_kind(&self) -> Option<TargetKind> {
        self.priority_category
            .as_deref()
            .and_then(TargetKind::from_name)
            .filter(|k| !k.is_hazard())
    }
}

/// Strip a ```json ... ``` fence if the service wrapped its answer in one
fn unfence(body: &str) -> &str {
    let body = body.trim();
    let Some(rest) = body.strip_prefix("```") else {
        return body;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse a coach reply body
pub fn parse_response(body: &str) -> Result<AdvisoryResponse, AdvisoryError> {
    let mut response: AdvisoryResponse = serde_json::from_str(unfence(body))
        .map_err(|e| AdvisoryError::Malformed(e.to_string()))?;
    response.message = response.message.trim().to_string();
    if response.message.is_empty() {
        return Err(AdvisoryError::Malformed("empty message".to_string()));
    }
    Ok(response)
}
