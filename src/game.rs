//! Frame driver
//!
//! Owns the simulation plus its collaborators (coach, frame capture, audio)
//! and runs them in frame order. Hosts call [`Game::frame`] once per input
//! sample with a monotonic timestamp.

use std::time::Duration;

use glam::Vec2;

use crate::advisory::{
    AdvisoryContext, AdvisoryOrchestrator, AdvisoryState, FrameCapture, TriggerSignal,
};
use crate::audio::{AudioCue, AudioSink};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{FrameReport, GameEvent, GamePhase, SimulationState, TickInput, tick};

pub struct Game {
    pub sim: SimulationState,
    advisor: Option<AdvisoryOrchestrator>,
    capture: Box<dyn FrameCapture>,
    audio: Box<dyn AudioSink>,
    pending_start: bool,
    pending_restart: bool,
    last_frame_ms: Option<f64>,
    /// Events raised by the last frame
    last_events: Vec<GameEvent>,
}

impl Game {
    pub fn new(
        settings: &Settings,
        seed: u64,
        advisor: Option<AdvisoryOrchestrator>,
        capture: Box<dyn FrameCapture>,
        audio: Box<dyn AudioSink>,
    ) -> Self {
        Self {
            sim: SimulationState::new(seed, settings.sim_config()),
            advisor,
            capture,
            audio,
            pending_start: false,
            pending_restart: false,
            last_frame_ms: None,
            last_events: Vec::new(),
        }
    }

    /// Queue a start command for the next frame
    pub fn start(&mut self) {
        self.pending_start = true;
    }

    /// Queue a restart command for the next frame
    pub fn restart(&mut self) {
        self.pending_restart = true;
    }

    pub fn phase(&self) -> GamePhase {
        self.sim.phase
    }

    /// Events raised by the most recent frame
    pub fn events(&self) -> &[GameEvent] {
        &self.last_events
    }

    /// Latest coach state, if a coach is attached
    pub fn advisory(&self) -> Option<&AdvisoryState> {
        self.advisor.as_ref().map(|a| a.state())
    }

    /// Run one frame. `pointer` is in canvas pixels; `None` = no detection.
    pub fn frame(&mut self, pointer: Option<Vec2>, now_ms: f64) -> FrameReport {
        let dt = match self.last_frame_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => REFERENCE_DT,
        };
        self.last_frame_ms = Some(now_ms);

        let input = TickInput {
            pointer,
            start: std::mem::take(&mut self.pending_start),
            restart: std::mem::take(&mut self.pending_restart),
        };
        let report = tick(&mut self.sim, &input, now_ms, dt);

        if let Some(advisor) = self.advisor.as_mut() {
            if report.previous_phase.is_some() {
                match self.sim.phase {
                    GamePhase::Active => advisor.begin_session(now_ms),
                    _ if report.previous_phase == Some(GamePhase::Active) => advisor.end_session(),
                    _ => {}
                }
            }

            advisor.poll();

            if self.sim.phase == GamePhase::Active {
                let signal = TriggerSignal {
                    now_ms,
                    score: self.sim.score,
                    rare_hit: report.rare_hit(),
                };
                let sim = &self.sim;
                advisor.maybe_request_advice(signal, self.capture.as_mut(), || {
                    AdvisoryContext::from_state(sim)
                });
            }
        }

        self.last_events = self.sim.drain_events();
        for event in &self.last_events {
            if let Some(cue) = AudioCue::for_event(event) {
                log::debug!("cue {}", cue.as_str());
                self.audio.play(cue);
            }
        }

        report
    }

    /// [`frame`](Self::frame) with a normalized `[0,1]²` tracker landmark
    pub fn frame_normalized(&mut self, landmark: Option<Vec2>, now_ms: f64) -> FrameReport {
        let pointer = landmark.map(|p| self.sim.config.area.denormalize(p));
        self.frame(pointer, now_ms)
    }

    /// Wait up to `timeout` for an outstanding coach reply.
    /// Returns true if the hint changed.
    pub fn settle_advisory(&mut self, timeout: Duration) -> bool {
        match self.advisor.as_mut() {
            Some(advisor) if advisor.in_flight() => advisor.wait_for_reply(timeout),
            Some(advisor) => advisor.poll(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::{
        AdvisoryError, AdvisoryTrigger, CapturedFrame, FALLBACK_MESSAGE, HeuristicCoach,
        IDLE_MESSAGE,
    };
    use crate::sim::{Target, TargetKind};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Shares recorded cues with the test
    struct Recorder(Rc<RefCell<Vec<AudioCue>>>);

    impl AudioSink for Recorder {
        fn play(&mut self, cue: AudioCue) {
            self.0.borrow_mut().push(cue);
        }
    }

    fn capture() -> Box<dyn FrameCapture> {
        Box::new(|| Ok::<_, AdvisoryError>(CapturedFrame::new("image/png", vec![0])))
    }

    fn game_with(advisor: Option<AdvisoryOrchestrator>) -> (Game, Rc<RefCell<Vec<AudioCue>>>) {
        let cues = Rc::new(RefCell::new(Vec::new()));
        let game = Game::new(
            &Settings::default(),
            7,
            advisor,
            capture(),
            Box::new(Recorder(Rc::clone(&cues))),
        );
        (game, cues)
    }

    /// Start and run frames until the round is live
    fn run_to_active(game: &mut Game, now: &mut f64) {
        game.start();
        while game.phase() != GamePhase::Active {
            *now += FRAME_MS;
            game.frame(None, *now);
        }
    }

    #[test]
    fn test_countdown_and_round_cues() {
        let (mut game, cues) = game_with(None);
        let mut now = 0.0;
        run_to_active(&mut game, &mut now);
        assert_eq!(*cues.borrow(), vec![AudioCue::Countdown, AudioCue::RoundStart]);
        assert!(game.advisory().is_none());
    }

    #[test]
    fn test_slice_through_game_plays_cue() {
        let (mut game, cues) = game_with(None);
        let mut now = 0.0;
        run_to_active(&mut game, &mut now);
        let id = game.sim.next_entity_id();
        game.sim
            .targets
            .push(Target::new(id, TargetKind::Orange, Vec2::new(300.0, 300.0), Vec2::ZERO));

        now += FRAME_MS;
        game.frame(Some(Vec2::new(290.0, 300.0)), now);
        now += FRAME_MS;
        let report = game.frame(Some(Vec2::new(310.0, 300.0)), now);

        assert_eq!(report.hits.len(), 1);
        assert!(game.events().iter().any(|e| matches!(e, GameEvent::Slice { .. })));
        assert!(cues.borrow().contains(&AudioCue::Slice));
        assert_eq!(game.sim.score, TargetKind::Orange.points() as u64);
    }

    #[test]
    fn test_normalized_landmarks_map_to_canvas() {
        let (mut game, _) = game_with(None);
        game.frame_normalized(Some(Vec2::new(0.5, 0.25)), 0.0);
        let area = game.sim.config.area;
        assert_eq!(
            game.sim.trail.last(),
            Some(Vec2::new(area.width * 0.5, area.height * 0.25))
        );
    }

    #[test]
    fn test_coach_asked_only_while_active() {
        let coach = HeuristicCoach::default();
        let always = |_: &crate::advisory::TriggerContext| true;
        let advisor = AdvisoryOrchestrator::new(Arc::new(coach), Box::new(always));
        let (mut game, _) = game_with(Some(advisor));

        let mut now = 0.0;
        game.frame(None, now);
        assert_eq!(game.advisory().map(|a| a.requests_sent), Some(0));

        // The frame the round goes live is already eligible
        run_to_active(&mut game, &mut now);
        assert_eq!(game.advisory().map(|a| a.requests_sent), Some(1));

        assert!(game.settle_advisory(Duration::from_secs(5)));
        let state = game.advisory().unwrap();
        assert!(!state.in_flight);
        assert_ne!(state.message, IDLE_MESSAGE);
        assert_ne!(state.message, FALLBACK_MESSAGE);
    }

    #[test]
    fn test_game_over_ends_coach_session() {
        let advisor = AdvisoryOrchestrator::new(
            Arc::new(HeuristicCoach::with_latency(Duration::from_millis(50))),
            Box::new(AdvisoryTrigger::Never),
        );
        let (mut game, cues) = game_with(Some(advisor));
        let mut now = 0.0;
        run_to_active(&mut game, &mut now);
        game.sim.time_remaining = 0.01;
        now += FRAME_MS;
        game.frame(None, now);
        assert_eq!(game.phase(), GamePhase::Ended);
        assert!(cues.borrow().contains(&AudioCue::GameOver));
        assert_eq!(game.advisory().map(|a| a.requests_sent), Some(0));

        // Restart runs the countdown again
        game.restart();
        now += FRAME_MS;
        game.frame(None, now);
        assert_eq!(game.phase(), GamePhase::Countdown);
    }
}
