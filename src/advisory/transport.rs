//! Coach transports and frame capture
//!
//! Transports are called off the frame loop, on the orchestrator's worker
//! thread, so they may block.

use std::thread;
use std::time::Duration;

use serde::Serialize;

use super::AdvisoryError;
use super::message::{
    AdvisoryRequest, AdvisoryResponse, CapturedFrame, TargetSummary, parse_response,
};
use crate::settings::AdvisorySettings;

/// Request/response boundary to the reasoning service
pub trait AdvisoryTransport: Send + Sync {
    fn request(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisoryError>;
}

/// Produces the image sent along with a request
pub trait FrameCapture {
    fn capture(&mut self) -> Result<CapturedFrame, AdvisoryError>;
}

impl<F> FrameCapture for F
where
    F: FnMut() -> Result<CapturedFrame, AdvisoryError>,
{
    fn capture(&mut self) -> Result<CapturedFrame, AdvisoryError> {
        self()
    }
}

/// JSON body posted to the service
#[derive(Serialize)]
struct WireRequest<'a> {
    prompt: &'a str,
    image_mime: &'a str,
    image_hex: String,
    targets: &'a [TargetSummary],
    score: u64,
}

/// JSON-over-HTTP coach
pub struct HttpTransport {
    agent: ureq::Agent,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// Build from settings; `None` when no endpoint is configured.
    /// The API key is read from the configured environment variable.
    pub fn from_settings(settings: &AdvisorySettings) -> Option<Self> {
        let endpoint = settings.endpoint.as_ref()?;
        let api_key = std::env::var(&settings.api_key_env).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            log::warn!(
                "{} is not set; coach requests will fall back",
                settings.api_key_env
            );
        }
        Some(Self::new(
            endpoint.clone(),
            api_key,
            Duration::from_secs(settings.request_timeout_secs),
        ))
    }

    fn encode(request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
        let wire = WireRequest {
            prompt: &request.prompt,
            image_mime: &request.frame.mime,
            image_hex: hex::encode(&request.frame.data),
            targets: &request.context.targets,
            score: request.context.score,
        };
        serde_json::to_string(&wire).map_err(|e| AdvisoryError::Transport(e.to_string()))
    }
}

impl AdvisoryTransport for HttpTransport {
    fn request(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisoryError> {
        let key = self.api_key.as_deref().ok_or(AdvisoryError::MissingCredentials)?;
        let body = Self::encode(request)?;

        let response = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .set("Authorization", &format!("Bearer {key}"))
            .send_string(&body)
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;
        let text = response
            .into_string()
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;

        parse_response(&text)
    }
}

/// Offline coach: points at the most valuable live target.
///
/// Deterministic; used by the demo driver and when no endpoint is set.
#[derive(Debug, Clone, Default)]
pub struct HeuristicCoach {
    /// Simulated service latency
    pub latency: Duration,
}

impl HeuristicCoach {
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl AdvisoryTransport for HeuristicCoach {
    fn request(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisoryError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }

        let ctx = &request.context;
        let best = ctx
            .targets
            .iter()
            .max_by_key(|t| t.kind.points());

        let technique_tip = Some(
            if ctx.score < 100 {
                "Use long, fast strokes; short jabs miss."
            } else {
                "Cut through groups on the way up, before they spread."
            }
            .to_string(),
        );

        let response = match best {
            Some(target) => AdvisoryResponse {
                message: format!("Go for the {}!", target.kind.as_str()),
                priority_category: Some(target.kind.as_str().to_string()),
                rationale: Some(format!(
                    "Worth {} points and still at y={:.0}.",
                    target.kind.points(),
                    target.y
                )),
                technique_tip,
            },
            None => AdvisoryResponse {
                message: "Nothing to cut yet. Stay centred and ready.".to_string(),
                priority_category: None,
                rationale: None,
                technique_tip,
            },
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::message::AdvisoryContext;
    use crate::sim::TargetKind;

    fn request_with(targets: Vec<TargetSummary>) -> AdvisoryRequest {
        AdvisoryRequest::new(
            CapturedFrame::new("image/png", vec![0x89, 0x50]),
            AdvisoryContext {
                targets,
                score: 30,
                level: 1,
                lives: 3,
            },
        )
    }

    #[test]
    fn test_heuristic_picks_most_valuable() {
        let request = request_with(vec![
            TargetSummary {
                kind: TargetKind::Apple,
                y: 300.0,
            },
            TargetSummary {
                kind: TargetKind::Pineapple,
                y: 500.0,
            },
        ]);
        let response = HeuristicCoach::default().request(&request).unwrap();
        assert_eq!(response.priority_kind(), Some(TargetKind::Pineapple));
        assert!(response.message.contains("pineapple"));
    }

    #[test]
    fn test_heuristic_with_nothing_on_screen() {
        let response = HeuristicCoach::default()
            .request(&request_with(Vec::new()))
            .unwrap();
        assert_eq!(response.priority_category, None);
        assert!(!response.message.is_empty());
    }

    #[test]
    fn test_http_without_key_is_missing_credentials() {
        let transport =
            HttpTransport::new("http://127.0.0.1:9/coach", None, Duration::from_secs(1));
        let result = transport.request(&request_with(Vec::new()));
        assert!(matches!(result, Err(AdvisoryError::MissingCredentials)));
    }

    #[test]
    fn test_wire_encoding() {
        let body = HttpTransport::encode(&request_with(vec![TargetSummary {
            kind: TargetKind::Orange,
            y: 12.0,
        }]))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["image_hex"], "8950");
        assert_eq!(value["image_mime"], "image/png");
        assert_eq!(value["targets"][0]["kind"], "orange");
        assert_eq!(value["score"], 30);
    }

    #[test]
    fn test_closure_capture() {
        let mut frames = 0;
        let mut capture = || {
            frames += 1;
            Ok::<_, AdvisoryError>(CapturedFrame::new("image/jpeg", vec![frames]))
        };
        assert_eq!(FrameCapture::capture(&mut capture).unwrap().data, vec![1]);
    }
}
