//! Slice Arcade headless driver
//!
//! Plays rounds with a scripted sweeping pointer and logs what happened.
//! Handy for tuning difficulty and exercising the coach without a camera.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use glam::Vec2;

use slice_arcade::advisory::{
    AdvisoryError, AdvisoryOrchestrator, AdvisoryTransport, CapturedFrame, HeuristicCoach,
    HttpTransport,
};
use slice_arcade::audio::LogAudioSink;
use slice_arcade::sim::{GameEvent, GamePhase};
use slice_arcade::{Game, QualityPreset, Settings};

/// Headless slice-arcade session
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings JSON file (defaults are used for anything missing)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// RNG seed for the run
    #[arg(short, long, default_value_t = 0x5eed)]
    seed: u64,

    /// Number of 60 Hz frames to simulate
    #[arg(short, long, default_value_t = 60 * 75)]
    frames: u32,

    /// Coach endpoint; overrides the settings file. Offline coach when unset.
    #[arg(short, long, value_name = "URL")]
    endpoint: Option<String>,

    /// Quality preset (low, medium, high); overrides the settings file
    #[arg(short, long, value_parser = parse_quality)]
    quality: Option<QualityPreset>,
}

fn parse_quality(name: &str) -> Result<QualityPreset, String> {
    QualityPreset::from_name(name).ok_or_else(|| format!("unknown quality preset `{name}`"))
}

/// Totals collected over the run
#[derive(Debug, Default)]
struct Summary {
    rounds: u32,
    best_score: u64,
    slices: u32,
    hazards: u32,
    swooshes: u32,
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = cli
        .config
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();
    if cli.endpoint.is_some() {
        settings.advisory.endpoint = cli.endpoint.clone();
    }
    if let Some(quality) = cli.quality {
        settings.quality = quality;
    }

    log::info!(
        "Slice Arcade starting: seed {:#x}, {} frames, quality {}",
        cli.seed,
        cli.frames,
        settings.quality.as_str()
    );

    let advisor = settings.advisory.enabled.then(|| {
        let transport: Arc<dyn AdvisoryTransport> =
            match HttpTransport::from_settings(&settings.advisory) {
                Some(http) => {
                    log::info!("Coach: HTTP");
                    Arc::new(http)
                }
                None => {
                    log::info!("Coach: offline heuristic");
                    Arc::new(HeuristicCoach::with_latency(Duration::from_millis(120)))
                }
            };
        AdvisoryOrchestrator::new(transport, Box::new(settings.advisory.trigger.clone()))
    });

    // No camera here: every request carries the same blank frame
    let capture = Box::new(|| {
        Ok::<_, AdvisoryError>(CapturedFrame::new(
            "image/x-portable-graymap",
            b"P5 1 1 255\n\0".to_vec(),
        ))
    });

    let mut game = Game::new(
        &settings,
        cli.seed,
        advisor,
        capture,
        Box::new(LogAudioSink::default()),
    );
    let summary = run(&mut game, cli.frames);

    game.settle_advisory(Duration::from_secs(settings.advisory.request_timeout_secs));
    if let Some(coach) = game.advisory() {
        log::info!(
            "Coach: {} requests, {} failed, {} discarded, last latency {:?} ms, last hint \"{}\"",
            coach.requests_sent,
            coach.failures,
            coach.discarded,
            coach.last_latency_ms.map(|ms| ms.round()),
            coach.message
        );
    }
    log::info!(
        "Done: {} rounds, best score {}, {} slices, {} hazards, {} swooshes",
        summary.rounds,
        summary.best_score,
        summary.slices,
        summary.hazards,
        summary.swooshes
    );
}

fn run(game: &mut Game, frames: u32) -> Summary {
    const FRAME_MS: f64 = 1000.0 / 60.0;

    let area = game.sim.config.area;
    let centre = Vec2::new(area.width, area.height) * 0.5;
    let mut summary = Summary::default();

    game.start();
    for i in 0..frames {
        let now = f64::from(i) * FRAME_MS;
        let t = i as f32 / 60.0;

        // Figure-eight sweep with a short dropout every few seconds
        let tracked = (i % 240) >= 6;
        let pointer = tracked.then(|| {
            centre
                + Vec2::new(
                    0.42 * area.width * (t * 2.1).sin(),
                    0.35 * area.height * (t * 4.2).sin(),
                )
        });

        game.frame(pointer, now);

        for event in game.events() {
            match event {
                GameEvent::Slice { .. } => summary.slices += 1,
                GameEvent::HazardHit { .. } => summary.hazards += 1,
                GameEvent::Swoosh => summary.swooshes += 1,
                _ => {}
            }
        }

        if game.phase() == GamePhase::Ended {
            summary.rounds += 1;
            summary.best_score = summary.best_score.max(game.sim.score);
            game.restart();
        }
    }

    if game.phase() == GamePhase::Active {
        summary.best_score = summary.best_score.max(game.sim.score);
    }
    summary
}
