//! Game settings and preferences
//!
//! Loaded from a JSON file; every field has a default so partial files work.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::advisory::AdvisoryTrigger;
use crate::consts::*;
use crate::sim::{HazardPolicy, PlayArea, SimConfig};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live effects for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 150,
            QualityPreset::Medium => 400,
            QualityPreset::High => 1000,
        }
    }
}

/// Failure to read a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Coaching service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorySettings {
    pub enabled: bool,
    /// HTTP endpoint of the reasoning service; offline coach when unset
    pub endpoint: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Transport-level timeout for one request (seconds)
    pub request_timeout_secs: u64,
    /// When to ask for advice
    pub trigger: AdvisoryTrigger,
}

impl Default for AdvisorySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: None,
            api_key_env: "COACH_API_KEY".to_string(),
            request_timeout_secs: 20,
            trigger: AdvisoryTrigger::Any(vec![
                AdvisoryTrigger::Periodic { interval_ms: 8_000.0 },
                AdvisoryTrigger::RareHit,
                AdvisoryTrigger::ScoreDelta { points: 200 },
            ]),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Particle effects (bursts, popups)
    pub particles: bool,
    /// Particles clump briefly before bursting
    pub clump_effects: bool,
    /// Reduced motion (disables clumping)
    pub reduced_motion: bool,

    // === Gameplay ===
    /// Canvas size in pixels
    pub play_area: PlayArea,
    pub round_secs: f32,
    pub countdown_secs: f32,
    pub hazard_policy: HazardPolicy,
    /// Points lost per hazard with `HazardPolicy::ScorePenalty`
    pub hazard_penalty: u64,

    // === Coach ===
    pub advisory: AdvisorySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            particles: true,
            clump_effects: true,
            reduced_motion: false,

            play_area: PlayArea::default(),
            round_secs: ROUND_SECS,
            countdown_secs: COUNTDOWN_SECS,
            hazard_policy: HazardPolicy::Lives,
            hazard_penalty: 50,

            advisory: AdvisorySettings::default(),
        }
    }
}

impl Settings {
    /// Effective effect cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Effective clumping (respects reduced_motion)
    pub fn effective_clump(&self) -> bool {
        self.clump_effects && !self.reduced_motion
    }

    /// Simulation tunables for these settings
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            area: self.play_area,
            round_secs: self.round_secs.max(1.0),
            countdown_secs: self.countdown_secs.max(0.0),
            max_effects: self.max_particles(),
            hold_effects: self.effective_clump(),
            hazard_policy: self.hazard_policy,
            hazard_penalty: self.hazard_penalty,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings, falling back to defaults when the file is missing or bad
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("{} ({}); using default settings", e, path.display());
                Self::default()
            }
        }
    }
}
