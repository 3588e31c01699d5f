#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game orchestrator that validates a session and drives the per-frame pipeline.
//!
//! Each call to [`Session::update`] advances the world to the supplied music
//! time and then runs spawning, collision, judgment, the expiry sweep and
//! scoring in that order. Grading therefore always sees a frame before the
//! sweep can retire a note in it.

use glam::Vec2;
use handbeats_core::{
    Beatmap, Command, ConfigError, Difficulty, DifficultyProfile, Event, FrameSnapshot,
    Instrument, Rank, ScoreState, ZoneLayout,
};
use handbeats_system_collision::Collision;
use handbeats_system_judgment::Judgment;
use handbeats_system_pattern::generate;
use handbeats_system_scoring::{ScoreDelta, ScoreManager};
use handbeats_system_spawning::Spawning;
use handbeats_world::{self as world, query, NoteTiming, World};
use log::{info, warn};

/// Fire-and-forget percussion playback.
pub trait AudioTrigger {
    /// Plays the one-shot sample for the instrument.
    fn play(&mut self, instrument: Instrument);
}

/// Audio trigger that discards every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAudio;

impl AudioTrigger for SilentAudio {
    fn play(&mut self, _instrument: Instrument) {}
}

/// Inputs sampled for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    /// Music playback position.
    pub now_ms: u64,
    /// Tracked hand positions in screen space; zero, one or two entries.
    pub hands: &'a [Vec2],
}

/// Summary handed to the result screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionResult {
    /// Final score totals.
    pub score: ScoreState,
    /// Weighted accuracy in percent.
    pub accuracy: f64,
    /// Rank earned by the accuracy.
    pub rank: Rank,
}

/// One running game session.
#[derive(Debug)]
pub struct Session {
    world: World,
    spawning: Spawning,
    collision: Collision,
    judgment: Judgment,
    scoring: ScoreManager,
    session_ms: u64,
    last_deltas: Vec<ScoreDelta>,
}

impl Session {
    /// Validates the configuration and creates a session over the beatmap.
    ///
    /// No note exists when an error is returned.
    pub fn start(
        profile: DifficultyProfile,
        layout: &ZoneLayout,
        beatmap: Beatmap,
        session_ms: u64,
    ) -> Result<Self, ConfigError> {
        profile.validate()?;
        layout.validate()?;
        if session_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }

        if let Some(gap_ms) = profile.min_same_instrument_gap_ms() {
            if gap_ms < profile.lead_time_ms {
                warn!(
                    "same-instrument gap of {gap_ms} ms is shorter than the {} ms lead; lanes will queue",
                    profile.lead_time_ms
                );
            }
        }

        info!(
            "starting session: {} notes over {session_ms} ms, lead {} ms, beat {} ms",
            beatmap.len(),
            profile.lead_time_ms,
            profile.beat_interval_ms
        );

        let timing = NoteTiming {
            lead_time_ms: profile.lead_time_ms,
            miss_window_ms: profile.miss_window_ms,
        };
        Ok(Self {
            world: World::new(layout, timing),
            spawning: Spawning::new(beatmap, profile.lead_time_ms),
            collision: Collision::new(),
            judgment: Judgment::new(profile.timing_windows, profile.miss_window_ms),
            scoring: ScoreManager::new(profile.ranking_thresholds),
            session_ms,
            last_deltas: Vec::new(),
        })
    }

    /// Starts a session for a built-in difficulty named by the player.
    pub fn with_difficulty(
        name: &str,
        layout: &ZoneLayout,
        session_ms: u64,
    ) -> Result<Self, ConfigError> {
        let difficulty: Difficulty = name.parse()?;
        let profile = difficulty.profile();
        let beatmap = generate(&profile, session_ms);
        Self::start(profile, layout, beatmap, session_ms)
    }

    /// Runs one frame and returns the state to present.
    pub fn update(
        &mut self,
        input: FrameInput<'_>,
        audio: &mut dyn AudioTrigger,
    ) -> FrameSnapshot {
        let mut frame_events = Vec::new();
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::AdvanceClock {
                now_ms: input.now_ms,
            },
            &mut events,
        );

        let mut commands = Vec::new();
        self.spawning.handle(&events, &mut commands);
        frame_events.append(&mut events);
        self.apply_all(&mut commands, &mut frame_events);

        let now_ms = query::now_ms(&self.world);
        let notes = query::note_view(&self.world);
        let lanes = query::lane_view(&self.world);
        let overlaps = self
            .collision
            .handle(input.hands, &lanes, &notes, &mut commands);
        self.judgment.handle(now_ms, &overlaps, &notes, &mut commands);
        self.apply_all(&mut commands, &mut frame_events);

        world::apply(&mut self.world, Command::SweepExpired, &mut frame_events);

        self.last_deltas.clear();
        self.scoring.handle(&frame_events, &mut self.last_deltas);
        for delta in &self.last_deltas {
            if delta.grade.is_hit() {
                audio.play(delta.instrument);
            }
        }

        self.snapshot()
    }

    /// Captures the current state without advancing the clock.
    #[must_use]
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            now_ms: query::now_ms(&self.world),
            lanes: query::lane_view(&self.world),
            notes: query::note_view(&self.world).into_vec(),
            score: self.scoring.state(),
            finished: self.is_finished(),
        }
    }

    /// Reports whether the session has run its course.
    ///
    /// The session ends once the clock reached the session length and every
    /// scheduled note has been spawned and retired.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        query::now_ms(&self.world) >= self.session_ms
            && self.spawning.is_exhausted()
            && !query::has_falling_notes(&self.world)
    }

    /// Score changes produced by the last frame.
    #[must_use]
    pub fn last_deltas(&self) -> &[ScoreDelta] {
        &self.last_deltas
    }

    /// Read-only access to the authoritative world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Ends the session, discarding notes and lanes and keeping the score.
    #[must_use]
    pub fn finish(self) -> SessionResult {
        let result = SessionResult {
            score: self.scoring.state(),
            accuracy: self.scoring.accuracy(),
            rank: self.scoring.rank(),
        };
        info!(
            "session finished at {} ms: score {}, max combo {}, accuracy {:.1}%, rank {:?}",
            query::now_ms(&self.world),
            result.score.total_score,
            result.score.max_combo,
            result.accuracy,
            result.rank
        );
        result
    }

    fn apply_all(&mut self, commands: &mut Vec<Command>, out_events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, out_events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_difficulty_is_rejected() {
        let error = Session::with_difficulty("expert", &ZoneLayout::default(), 60_000)
            .expect_err("unknown difficulty accepted");
        assert_eq!(error, ConfigError::UnknownDifficulty("expert".to_owned()));
    }

    #[test]
    fn zero_length_session_is_rejected() {
        let error = Session::with_difficulty("easy", &ZoneLayout::default(), 0)
            .expect_err("empty session accepted");
        assert_eq!(error, ConfigError::ZeroDuration);
    }

    #[test]
    fn invalid_profile_is_rejected_before_any_note() {
        let mut profile = Difficulty::Hard.profile();
        profile.lead_time_ms = 0;
        let beatmap = generate(&Difficulty::Hard.profile(), 10_000);
        let error = Session::start(profile, &ZoneLayout::default(), beatmap, 10_000)
            .expect_err("zero lead accepted");
        assert_eq!(error, ConfigError::ZeroLeadTime);
    }

    #[test]
    fn huge_beat_interval_starts_without_overflow() {
        let profile = DifficultyProfile {
            beat_interval_ms: 7_000_000_000_000_000_000,
            instrument_template: vec![Instrument::Kick, Instrument::Snare, Instrument::HiHat],
            ..Difficulty::Easy.profile()
        };
        let beatmap = generate(&profile, 60_000);
        assert!(beatmap.is_empty());
        assert!(Session::start(profile, &ZoneLayout::default(), beatmap, 60_000).is_ok());
    }
}
