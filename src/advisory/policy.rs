//! When to ask the coach
//!
//! The orchestrator only decides *whether* a request may go out (nothing in
//! flight); a `TriggerPolicy` decides whether it *should*.

use serde::{Deserialize, Serialize};

/// Everything a policy may look at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerContext {
    pub now_ms: f64,
    pub score: u64,
    /// A top-tier target was cut this frame
    pub rare_hit: bool,
    /// When the current round began
    pub session_started_ms: f64,
    /// Last dispatched request in this round
    pub last_request_ms: Option<f64>,
    /// Score at the time of the last request that got a real answer
    pub last_success_score: Option<u64>,
}

impl TriggerContext {
    /// Time since the last request (or since the round began)
    pub fn since_last_request_ms(&self) -> f64 {
        self.now_ms - self.last_request_ms.unwrap_or(self.session_started_ms)
    }

    /// Points scored since the last successful answer
    pub fn score_delta(&self) -> u64 {
        self.score.saturating_sub(self.last_success_score.unwrap_or(0))
    }
}

/// Pluggable trigger decision
pub trait TriggerPolicy: Send {
    fn should_trigger(&self, ctx: &TriggerContext) -> bool;
}

impl<F> TriggerPolicy for F
where
    F: Fn(&TriggerContext) -> bool + Send,
{
    fn should_trigger(&self, ctx: &TriggerContext) -> bool {
        self(ctx)
    }
}

/// Configurable trigger policies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AdvisoryTrigger {
    /// Every `interval_ms` since the last request
    Periodic { interval_ms: f64 },
    /// After `points` more points since the last successful answer
    ScoreDelta { points: u64 },
    /// Whenever a rare target is cut
    RareHit,
    /// Any of the nested triggers
    Any(Vec<AdvisoryTrigger>),
    /// Coach disabled
    Never,
}

impl TriggerPolicy for AdvisoryTrigger {
    fn should_trigger(&self, ctx: &TriggerContext) -> bool {
        match self {
            AdvisoryTrigger::Periodic { interval_ms } => {
                ctx.since_last_request_ms() >= *interval_ms
            }
            AdvisoryTrigger::ScoreDelta { points } => *points > 0 && ctx.score_delta() >= *points,
            AdvisoryTrigger::RareHit => ctx.rare_hit,
            AdvisoryTrigger::Any(triggers) => triggers.iter().any(|t| t.should_trigger(ctx)),
            AdvisoryTrigger::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(now_ms: f64, score: u64) -> TriggerContext {
        TriggerContext {
            now_ms,
            score,
            rare_hit: false,
            session_started_ms: 1_000.0,
            last_request_ms: None,
            last_success_score: None,
        }
    }

    #[test]
    fn test_periodic_counts_from_round_start() {
        let trigger = AdvisoryTrigger::Periodic { interval_ms: 5_000.0 };
        assert!(!trigger.should_trigger(&ctx(5_999.0, 0)));
        assert!(trigger.should_trigger(&ctx(6_000.0, 0)));

        let after_request = TriggerContext {
            last_request_ms: Some(6_000.0),
            ..ctx(9_000.0, 0)
        };
        assert!(!trigger.should_trigger(&after_request));
    }

    #[test]
    fn test_score_delta_since_last_success() {
        let trigger = AdvisoryTrigger::ScoreDelta { points: 100 };
        assert!(!trigger.should_trigger(&ctx(0.0, 99)));
        assert!(trigger.should_trigger(&ctx(0.0, 100)));
        let answered = TriggerContext {
            last_success_score: Some(100),
            ..ctx(0.0, 150)
        };
        assert!(!trigger.should_trigger(&answered));
    }

    #[test]
    fn test_any_and_rare() {
        let trigger = AdvisoryTrigger::Any(vec![
            AdvisoryTrigger::Never,
            AdvisoryTrigger::RareHit,
        ]);
        assert!(!trigger.should_trigger(&ctx(0.0, 0)));
        let rare = TriggerContext {
            rare_hit: true,
            ..ctx(0.0, 0)
        };
        assert!(trigger.should_trigger(&rare));
    }

    #[test]
    fn test_closure_policy() {
        let policy = |c: &TriggerContext| c.score % 2 == 1;
        assert!(policy.should_trigger(&ctx(0.0, 3)));
        assert!(!TriggerPolicy::should_trigger(&policy, &ctx(0.0, 4)));
    }
}
