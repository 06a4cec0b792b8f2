//! Advisory orchestrator
//!
//! At most one coach request is outstanding at a time. Requests run on a
//! worker thread; their replies come back as messages through an inbox the
//! frame loop drains with [`AdvisoryOrchestrator::poll`]. Every reply carries
//! the session it was sent in, and a reply from an older session is dropped
//! instead of applied.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::message::{AdvisoryContext, AdvisoryRequest, AdvisoryResponse};
use super::policy::{TriggerContext, TriggerPolicy};
use super::transport::{AdvisoryTransport, FrameCapture};
use super::{AdvisoryError, FALLBACK_MESSAGE, IDLE_MESSAGE};
use crate::sim::TargetKind;

/// What the renderer shows from the coach
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryState {
    pub message: String,
    pub priority: Option<TargetKind>,
    pub rationale: Option<String>,
    pub technique_tip: Option<String>,
    /// A request is outstanding
    pub in_flight: bool,
    pub last_request_ms: Option<f64>,
    /// Round-trip time of the last reply applied
    pub last_latency_ms: Option<f64>,
    pub requests_sent: u64,
    pub failures: u64,
    /// Replies that arrived after their session ended
    pub discarded: u64,
}

impl Default for AdvisoryState {
    fn default() -> Self {
        Self {
            message: IDLE_MESSAGE.to_string(),
            priority: None,
            rationale: None,
            technique_tip: None,
            in_flight: false,
            last_request_ms: None,
            last_latency_ms: None,
            requests_sent: 0,
            failures: 0,
            discarded: 0,
        }
    }
}

/// Per-frame inputs to the trigger decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerSignal {
    pub now_ms: f64,
    pub score: u64,
    pub rare_hit: bool,
}

/// Reply delivered to the inbox
struct Reply {
    session: u64,
    /// Score when the request was made
    score: u64,
    latency: Duration,
    result: Result<AdvisoryResponse, AdvisoryError>,
}

pub struct AdvisoryOrchestrator {
    transport: Arc<dyn AdvisoryTransport>,
    policy: Box<dyn TriggerPolicy>,
    state: AdvisoryState,
    inbox: Receiver<Reply>,
    outbox: Sender<Reply>,
    /// Bumped whenever replies in flight must no longer be applied
    session: u64,
    session_started_ms: f64,
    last_success_score: Option<u64>,
    /// Cleared on drop so workers skip delivering
    alive: Arc<AtomicBool>,
}

impl AdvisoryOrchestrator {
    pub fn new(transport: Arc<dyn AdvisoryTransport>, policy: Box<dyn TriggerPolicy>) -> Self {
        let (outbox, inbox) = mpsc::channel();
        Self {
            transport,
            policy,
            state: AdvisoryState::default(),
            inbox,
            outbox,
            session: 0,
            session_started_ms: 0.0,
            last_success_score: None,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn state(&self) -> &AdvisoryState {
        &self.state
    }

    pub fn in_flight(&self) -> bool {
        self.state.in_flight
    }

    /// A new round began: fresh hint, fresh trigger baselines.
    ///
    /// A request left over from an earlier round stays outstanding until its
    /// reply arrives; it is discarded then.
    pub fn begin_session(&mut self, now_ms: f64) {
        self.session += 1;
        self.session_started_ms = now_ms;
        self.last_success_score = None;
        self.state = AdvisoryState {
            in_flight: self.state.in_flight,
            requests_sent: self.state.requests_sent,
            failures: self.state.failures,
            discarded: self.state.discarded,
            ..AdvisoryState::default()
        };
    }

    /// The round is over: whatever is in flight will be discarded on arrival.
    /// The request still counts as outstanding until then.
    pub fn end_session(&mut self) {
        self.session += 1;
        if self.state.in_flight {
            log::debug!("Coach request outlived its round; reply will be dropped");
        }
    }

    /// Fire a request if none is outstanding and the policy wants one.
    ///
    /// `context` is only evaluated when a request actually goes out. Returns
    /// true if a request was dispatched.
    pub fn maybe_request_advice<C, F>(
        &mut self,
        signal: TriggerSignal,
        capture: &mut C,
        context: F,
    ) -> bool
    where
        C: FrameCapture + ?Sized,
        F: FnOnce() -> AdvisoryContext,
    {
        if self.state.in_flight {
            return false;
        }
        let ctx = TriggerContext {
            now_ms: signal.now_ms,
            score: signal.score,
            rare_hit: signal.rare_hit,
            session_started_ms: self.session_started_ms,
            last_request_ms: self.state.last_request_ms,
            last_success_score: self.last_success_score,
        };
        if !self.policy.should_trigger(&ctx) {
            return false;
        }

        self.state.in_flight = true;
        self.state.last_request_ms = Some(signal.now_ms);

        let frame = match capture.capture() {
            Ok(frame) => frame,
            Err(e) => {
                self.fail(e);
                return false;
            }
        };
        let request = AdvisoryRequest::new(frame, context());
        let score = request.context.score;

        let transport = Arc::clone(&self.transport);
        let outbox = self.outbox.clone();
        let alive = Arc::clone(&self.alive);
        let session = self.session;

        let spawned = thread::Builder::new()
            .name("coach-request".to_string())
            .spawn(move || {
                let started = Instant::now();
                let result = transport.request(&request);
                if !alive.load(Ordering::Acquire) {
                    return;
                }
                // Receiver gone means the orchestrator was dropped; nothing to do
                let _ = outbox.send(Reply {
                    session,
                    score,
                    latency: started.elapsed(),
                    result,
                });
            });

        match spawned {
            Ok(_) => {
                self.state.requests_sent += 1;
                log::debug!("Coach request #{} dispatched", self.state.requests_sent);
                true
            }
            Err(e) => {
                self.fail(AdvisoryError::Transport(e.to_string()));
                false
            }
        }
    }

    /// Apply every reply that has arrived. Never blocks.
    /// Returns true if the visible hint changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.inbox.try_recv() {
                Ok(reply) => changed |= self.handle(reply),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    /// Block up to `timeout` for the next reply, then drain the rest.
    ///
    /// For headless drivers and tests; the frame loop uses [`poll`](Self::poll).
    pub fn wait_for_reply(&mut self, timeout: Duration) -> bool {
        let changed = match self.inbox.recv_timeout(timeout) {
            Ok(reply) => self.handle(reply),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        };
        self.poll() || changed
    }

    fn handle(&mut self, reply: Reply) -> bool {
        // Only one request is ever outstanding, so any reply frees the slot
        self.state.in_flight = false;
        if reply.session != self.session {
            self.state.discarded += 1;
            log::debug!("Discarding coach reply from an ended round");
            return false;
        }

        self.state.last_latency_ms = Some(reply.latency.as_secs_f64() * 1000.0);
        match reply.result {
            Ok(response) => {
                self.apply(response);
                self.last_success_score = Some(reply.score);
            }
            Err(e) => self.fail(e),
        }
        true
    }

    fn apply(&mut self, response: AdvisoryResponse) {
        self.state.priority = response.priority_kind();
        self.state.message = response.message;
        self.state.rationale = response.rationale;
        self.state.technique_tip = response.technique_tip;
        log::info!("Coach: {}", self.state.message);
    }

    fn fail(&mut self, error: AdvisoryError) {
        log::warn!("Coach request failed: {}", error);
        self.state.in_flight = false;
        self.state.failures += 1;
        self.state.message = FALLBACK_MESSAGE.to_string();
        self.state.priority = None;
        self.state.rationale = None;
        self.state.technique_tip = None;
    }
}

impl Drop for AdvisoryOrchestrator {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}
