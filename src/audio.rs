//! Audio cues
//!
//! The simulation raises [`GameEvent`]s; the frame driver maps them to cues
//! and hands them to whatever sink the host provides.

use crate::sim::GameEvent;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// A collectible was cut
    Slice,
    /// A bomb was cut
    HazardHit,
    LevelUp,
    GameOver,
    /// Fast pointer movement
    Swoosh,
    /// Countdown began
    Countdown,
    RoundStart,
}

impl AudioCue {
    /// Stable name for hosts that key sounds by string
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioCue::Slice => "slice",
            AudioCue::HazardHit => "hazard-hit",
            AudioCue::LevelUp => "level-up",
            AudioCue::GameOver => "game-over",
            AudioCue::Swoosh => "swoosh",
            AudioCue::Countdown => "countdown",
            AudioCue::RoundStart => "round-start",
        }
    }

    pub fn for_event(event: &GameEvent) -> Option<AudioCue> {
        match event {
            GameEvent::CountdownStarted => Some(AudioCue::Countdown),
            GameEvent::RoundStarted => Some(AudioCue::RoundStart),
            GameEvent::Slice { .. } => Some(AudioCue::Slice),
            GameEvent::HazardHit { .. } => Some(AudioCue::HazardHit),
            GameEvent::LevelUp { .. } => Some(AudioCue::LevelUp),
            GameEvent::Swoosh => Some(AudioCue::Swoosh),
            GameEvent::GameOver { .. } => Some(AudioCue::GameOver),
        }
    }
}

/// Plays cues. Must never block the frame loop.
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// Writes cues to the log (headless runs)
#[derive(Debug, Default)]
pub struct LogAudioSink {
    pub muted: bool,
}

impl AudioSink for LogAudioSink {
    fn play(&mut self, cue: AudioCue) {
        if !self.muted {
            log::trace!("audio: {}", cue.as_str());
        }
    }
}

/// Discards every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn play(&mut self, _cue: AudioCue) {}
}

impl AudioSink for Vec<AudioCue> {
    fn play(&mut self, cue: AudioCue) {
        self.push(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{EndReason, TargetKind};

    #[test]
    fn test_event_mapping() {
        let slice = GameEvent::Slice {
            kind: TargetKind::Orange,
            points: 15,
        };
        assert_eq!(AudioCue::for_event(&slice), Some(AudioCue::Slice));
        assert_eq!(
            AudioCue::for_event(&GameEvent::HazardHit { lives: 2 }),
            Some(AudioCue::HazardHit)
        );
        assert_eq!(
            AudioCue::for_event(&GameEvent::GameOver {
                score: 10,
                reason: EndReason::TimeUp
            }),
            Some(AudioCue::GameOver)
        );
        assert_eq!(AudioCue::for_event(&GameEvent::Swoosh), Some(AudioCue::Swoosh));
    }

    #[test]
    fn test_names_are_distinct() {
        let cues = [
            AudioCue::Slice,
            AudioCue::HazardHit,
            AudioCue::LevelUp,
            AudioCue::GameOver,
            AudioCue::Swoosh,
            AudioCue::Countdown,
            AudioCue::RoundStart,
        ];
        let names: std::collections::HashSet<_> = cues.iter().map(|c| c.as_str()).collect();
        assert_eq!(names.len(), cues.len());
    }

    #[test]
    fn test_recording_sink() {
        let mut sink: Vec<AudioCue> = Vec::new();
        sink.play(AudioCue::LevelUp);
        NullAudioSink.play(AudioCue::LevelUp);
        assert_eq!(sink, vec![AudioCue::LevelUp]);
    }
}
