#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a HandBeats session against a virtual clock.

mod config;
mod player;

use std::{collections::BTreeMap, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use handbeats_core::{Instrument, WELCOME_BANNER};
use handbeats_system_pattern::generate_looped;
use handbeats_system_session::{AudioTrigger, FrameInput, Session, SessionResult};
use log::{debug, info};

use crate::config::{FileConfig, Overrides, Settings};
use crate::player::{PlayerConfig, SimulatedPlayer};

/// Headless HandBeats session driven by a simulated player.
#[derive(Debug, Parser)]
#[command(name = "handbeats", version, about)]
struct CliArgs {
    /// TOML file with session settings, profile overrides and zone layout.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Difficulty to play: easy, medium or hard.
    #[arg(long)]
    difficulty: Option<String>,
    /// Length of the session in milliseconds.
    #[arg(long, value_name = "MS")]
    session_ms: Option<u64>,
    /// Length of the backing music loop in milliseconds.
    #[arg(long, value_name = "MS")]
    loop_length_ms: Option<u64>,
    /// Music time between two frames in milliseconds.
    #[arg(long, value_name = "MS")]
    frame_ms: Option<u64>,
    /// Seed for the simulated player's timing errors.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Largest timing error of the simulated player in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 120)]
    jitter_ms: u64,
    /// How long the simulated hand stays inside a zone.
    #[arg(long, value_name = "MS", default_value_t = 120)]
    dwell_ms: u64,
    /// Skip every Nth note to let it expire.
    #[arg(long, value_name = "N")]
    miss_every: Option<u32>,
}

/// Audio trigger that logs and counts every sample request.
#[derive(Debug, Default)]
struct ConsoleAudio {
    plays: BTreeMap<Instrument, u32>,
}

impl AudioTrigger for ConsoleAudio {
    fn play(&mut self, instrument: Instrument) {
        debug!("play {}", instrument.sound_key());
        *self.plays.entry(instrument).or_default() += 1;
    }
}

/// Entry point for the HandBeats command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(
        file,
        Overrides {
            difficulty: args.difficulty.clone(),
            session_ms: args.session_ms,
            loop_length_ms: args.loop_length_ms,
            frame_ms: args.frame_ms,
        },
    )?;

    println!("{WELCOME_BANNER}");
    let difficulty = settings
        .difficulty
        .map_or_else(|| "custom profile".to_owned(), |difficulty| difficulty.to_string());
    info!(
        "difficulty {difficulty}, session {} ms, loop {} ms, frame {} ms",
        settings.session_ms, settings.loop_length_ms, settings.frame_ms
    );

    let beatmap = generate_looped(
        &settings.profile,
        settings.loop_length_ms,
        settings.session_ms,
    );
    let player = SimulatedPlayer::plan(
        &beatmap,
        &settings.layout,
        PlayerConfig {
            seed: args.seed,
            jitter_ms: args.jitter_ms,
            dwell_ms: args.dwell_ms,
            miss_every: args.miss_every,
        },
    );
    info!(
        "simulated player attempts {} of {} notes",
        player.attempts(),
        beatmap.len()
    );

    let mut session = Session::start(
        settings.profile.clone(),
        &settings.layout,
        beatmap,
        settings.session_ms,
    )
    .context("failed to start session")?;

    let mut audio = ConsoleAudio::default();
    let mut now_ms = 0;
    loop {
        let hands = player.hands_at(now_ms);
        let frame = session.update(
            FrameInput {
                now_ms,
                hands: &hands,
            },
            &mut audio,
        );
        if frame.finished {
            break;
        }
        now_ms = now_ms.saturating_add(settings.frame_ms);
    }

    print_result(&session.finish(), &audio);
    Ok(())
}

fn print_result(result: &SessionResult, audio: &ConsoleAudio) {
    let score = &result.score;
    println!("score      {}", score.total_score);
    println!("max combo  {}", score.max_combo);
    println!(
        "grades     perfect {} / good {} / ok {} / miss {}",
        score.counts.perfect, score.counts.good, score.counts.ok, score.counts.miss
    );
    println!("accuracy   {:.1}%", result.accuracy);
    println!("rank       {:?}", result.rank);
    for (instrument, plays) in &audio.plays {
        println!("{:<10} {plays} hits", instrument.label());
    }
}
