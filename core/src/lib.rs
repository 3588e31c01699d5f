#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the HandBeats rhythm engine.
//!
//! This crate defines the message surface that connects the session
//! orchestrator, the authoritative world, and pure systems. Systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. All time values are milliseconds
//! on the music clock, never wall-clock time.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod config;

pub use config::{
    ConfigError, Difficulty, DifficultyProfile, LaneZone, RankingThresholds, TimingWindows,
    ZoneLayout, DEFAULT_SPAWN_Y,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to HandBeats.";

/// Duration a lane keeps glowing after the last frame a hand was seen inside it.
pub const GLOW_HOLD_MS: u64 = 100;

/// Duration of the hit and miss flashes shown on a lane.
pub const FLASH_HOLD_MS: u64 = 200;

/// Percussion instrument assigned to a lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Instrument {
    /// Bass drum, struck with the left hand.
    Kick,
    /// Snare drum, struck with the right hand.
    Snare,
    /// Hi-hat cymbal in the centre of the screen.
    HiHat,
}

impl Instrument {
    /// Every instrument in lane order.
    pub const ALL: [Instrument; 3] = [Instrument::Kick, Instrument::Snare, Instrument::HiHat];

    /// Human readable label shown above the lane.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Kick => "KICK",
            Self::Snare => "SNARE",
            Self::HiHat => "HI-HAT",
        }
    }

    /// Key used by the audio collaborator to look up the percussion sample.
    #[must_use]
    pub const fn sound_key(self) -> &'static str {
        match self {
            Self::Kick => "kick",
            Self::Snare => "snare",
            Self::HiHat => "hihat",
        }
    }

    /// Target zone used when no layout override is configured.
    ///
    /// The side zones sit at hand height while the hi-hat zone is raised into
    /// the centre of the frame.
    #[must_use]
    pub const fn default_zone(self) -> ZoneRect {
        match self {
            Self::Kick => ZoneRect::new(1010.0, 400.0, 160.0, 110.0),
            Self::Snare => ZoneRect::new(50.0, 400.0, 160.0, 110.0),
            Self::HiHat => ZoneRect::new(530.0, 280.0, 160.0, 110.0),
        }
    }
}

/// Outcome classification of a hit attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    /// Hit inside the tightest timing window.
    Perfect,
    /// Hit inside the second timing window.
    Good,
    /// Hit inside the widest timing window.
    Ok,
    /// Hit outside every window, or never hit at all.
    Miss,
}

impl Grade {
    /// Points awarded for the grade before any combo multiplier.
    #[must_use]
    pub const fn base_points(self) -> u64 {
        match self {
            Self::Perfect => 100,
            Self::Good => 50,
            Self::Ok => 25,
            Self::Miss => 0,
        }
    }

    /// Reports whether the grade keeps the combo alive.
    #[must_use]
    pub const fn is_hit(self) -> bool {
        !matches!(self, Self::Miss)
    }
}

/// Final performance bucket shown on the result screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    /// Outstanding accuracy.
    S,
    /// Strong accuracy.
    A,
    /// Solid accuracy.
    B,
    /// Passing accuracy.
    C,
    /// Everything else.
    D,
}

/// Unique identifier assigned to a falling note when it spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(u32);

impl NoteId {
    /// Creates a new note identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Axis-aligned screen-space rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneRect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl ZoneRect {
    /// Creates a rectangle from its upper-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left edge of the rectangle.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Top edge of the rectangle.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Horizontal extent of the rectangle.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent of the rectangle.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Centre point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Reports whether the point lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Reports whether the two rectangles share any interior area.
    #[must_use]
    pub fn overlaps(&self, other: &ZoneRect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Reports whether the rectangle has a usable, finite, positive area.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|value| value.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Cosmetic feedback state of a lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activation {
    /// Nothing to show.
    Idle,
    /// A hand currently rests inside the zone.
    Glowing,
    /// A note in this lane was just hit.
    Hit,
    /// A note in this lane was just missed.
    Miss,
}

impl Activation {
    /// How long the activation stays visible after being set.
    #[must_use]
    pub const fn hold_ms(self) -> u64 {
        match self {
            Self::Idle => 0,
            Self::Glowing => GLOW_HOLD_MS,
            Self::Hit | Self::Miss => FLASH_HOLD_MS,
        }
    }
}

/// Lifecycle state of a falling note.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteState {
    /// The note is on screen and can still be graded.
    Falling,
    /// The note received a grade.
    Graded,
    /// The note passed its miss window without being graded.
    Expired,
}

/// Single scheduled note within a beatmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeatmapEntry {
    /// Instrument that must be struck.
    pub instrument: Instrument,
    /// Music time at which the note reaches its zone.
    pub target_time_ms: u64,
}

impl BeatmapEntry {
    /// Creates a new beatmap entry.
    #[must_use]
    pub const fn new(instrument: Instrument, target_time_ms: u64) -> Self {
        Self {
            instrument,
            target_time_ms,
        }
    }
}

/// Immutable, time-ordered schedule of notes for one session.
///
/// Cloning a beatmap shares the underlying entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Beatmap {
    entries: Arc<[BeatmapEntry]>,
}

impl Beatmap {
    /// Creates a beatmap from arbitrary entries, ordering them by target time.
    ///
    /// The sort is stable, so simultaneous notes keep their relative order.
    #[must_use]
    pub fn from_entries(mut entries: Vec<BeatmapEntry>) -> Self {
        entries.sort_by_key(|entry| entry.target_time_ms);
        Self {
            entries: entries.into(),
        }
    }

    /// Entries in ascending target time.
    #[must_use]
    pub fn entries(&self) -> &[BeatmapEntry] {
        &self.entries
    }

    /// Iterator over the entries in ascending target time.
    pub fn iter(&self) -> impl Iterator<Item = &BeatmapEntry> {
        self.entries.iter()
    }

    /// Number of scheduled notes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no notes are scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Target time of the last note, if any.
    #[must_use]
    pub fn last_target_ms(&self) -> Option<u64> {
        self.entries.last().map(|entry| entry.target_time_ms)
    }

    /// Copies the entries whose target lies inside `start_ms..=end_ms`.
    #[must_use]
    pub fn within(&self, start_ms: u64, end_ms: u64) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|entry| entry.target_time_ms >= start_ms && entry.target_time_ms <= end_ms)
            .copied()
            .collect::<Vec<_>>();
        Self {
            entries: entries.into(),
        }
    }
}

/// Running totals maintained by the score manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreState {
    /// Sum of all awarded points; never decreases.
    pub total_score: u64,
    /// Number of consecutive non-miss grades.
    pub combo: u32,
    /// Longest combo reached during the session.
    pub max_combo: u32,
    /// Number of grades recorded per category.
    pub counts: GradeCounts,
}

/// Number of grades recorded per category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GradeCounts {
    /// Perfect grades.
    pub perfect: u32,
    /// Good grades.
    pub good: u32,
    /// Ok grades.
    pub ok: u32,
    /// Misses, including expired notes.
    pub miss: u32,
}

impl GradeCounts {
    /// Increments the counter that belongs to the grade.
    pub fn record(&mut self, grade: Grade) {
        let slot = match grade {
            Grade::Perfect => &mut self.perfect,
            Grade::Good => &mut self.good,
            Grade::Ok => &mut self.ok,
            Grade::Miss => &mut self.miss,
        };
        *slot = slot.saturating_add(1);
    }

    /// Returns the counter that belongs to the grade.
    #[must_use]
    pub const fn get(&self, grade: Grade) -> u32 {
        match grade {
            Grade::Perfect => self.perfect,
            Grade::Good => self.good,
            Grade::Ok => self.ok,
            Grade::Miss => self.miss,
        }
    }

    /// Number of non-miss grades.
    #[must_use]
    pub const fn hits(&self) -> u32 {
        self.perfect
            .saturating_add(self.good)
            .saturating_add(self.ok)
    }

    /// Number of notes judged in any way.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.hits().saturating_add(self.miss)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Moves the session clock to the supplied music time.
    AdvanceClock {
        /// Music playback position reported by the clock source.
        now_ms: u64,
    },
    /// Introduces a new falling note into its instrument's lane.
    SpawnNote {
        /// Instrument of the scheduled note.
        instrument: Instrument,
        /// Music time at which the note reaches its zone.
        target_time_ms: u64,
    },
    /// Sets the cosmetic activation of a lane.
    ActivateLane {
        /// Lane to update.
        instrument: Instrument,
        /// Activation to display.
        activation: Activation,
    },
    /// Records the grade produced for a falling note.
    GradeNote {
        /// Note being graded.
        note: NoteId,
        /// Grade produced by the timing classifier.
        grade: Grade,
        /// Signed offset between the hit and the note's target time.
        delta_ms: i64,
    },
    /// Retires every falling note whose miss window has elapsed.
    SweepExpired,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the session clock moved forward.
    ClockAdvanced {
        /// Clock value after the update.
        now_ms: u64,
        /// Time elapsed since the previous clock value.
        dt_ms: u64,
    },
    /// Reports a clock value that went backwards and was clamped.
    ClockRegressed {
        /// Value supplied by the caller.
        supplied_ms: u64,
        /// Last seen value the clock was held at.
        clamped_to_ms: u64,
    },
    /// Confirms that a note entered its lane.
    NoteSpawned {
        /// Identifier assigned to the note.
        note: NoteId,
        /// Lane the note falls in.
        instrument: Instrument,
        /// Music time at which the note reaches its zone.
        target_time_ms: u64,
    },
    /// Confirms that a falling note received a grade.
    NoteGraded {
        /// Note that was graded.
        note: NoteId,
        /// Lane the note belonged to.
        instrument: Instrument,
        /// Grade that was recorded.
        grade: Grade,
        /// Signed offset between the hit and the note's target time.
        delta_ms: i64,
    },
    /// Reports that a note passed its miss window without a grade.
    NoteExpired {
        /// Note that expired.
        note: NoteId,
        /// Lane the note belonged to.
        instrument: Instrument,
        /// Music time at which the note should have been hit.
        target_time_ms: u64,
    },
    /// Reports a grade request for a note that can no longer be graded.
    GradeIgnored {
        /// Note targeted by the rejected request.
        note: NoteId,
    },
    /// Confirms a change of lane activation.
    LaneActivated {
        /// Lane that changed.
        instrument: Instrument,
        /// Activation now displayed.
        activation: Activation,
    },
}

/// Immutable representation of a single note's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteSnapshot {
    /// Identifier assigned to the note.
    pub id: NoteId,
    /// Lane the note falls in.
    pub instrument: Instrument,
    /// Music time at which the note reaches its zone.
    pub target_time_ms: u64,
    /// Music time at which the note appeared.
    pub spawn_time_ms: u64,
    /// Lifecycle state of the note.
    pub state: NoteState,
    /// Fraction of the fall completed, in `0.0..=1.0`.
    pub progress: f32,
    /// Screen-space position derived from the progress.
    pub position: Vec2,
}

/// Read-only snapshot describing the notes in the world.
#[derive(Clone, Debug, Default)]
pub struct NoteView {
    snapshots: Vec<NoteSnapshot>,
}

impl NoteView {
    /// Creates a new note view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<NoteSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &NoteSnapshot> {
        self.snapshots.iter()
    }

    /// Oldest falling note in the instrument's lane.
    #[must_use]
    pub fn front_of_lane(&self, instrument: Instrument) -> Option<&NoteSnapshot> {
        self.snapshots.iter().find(|snapshot| {
            snapshot.instrument == instrument && snapshot.state == NoteState::Falling
        })
    }

    /// Reports whether the instrument's lane holds at least one falling note.
    #[must_use]
    pub fn lane_is_occupied(&self, instrument: Instrument) -> bool {
        self.front_of_lane(instrument).is_some()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<NoteSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a lane used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneSnapshot {
    /// Instrument assigned to the lane.
    pub instrument: Instrument,
    /// Target zone of the lane.
    pub zone: ZoneRect,
    /// Activation after decay has been applied.
    pub activation: Activation,
}

/// Per-frame snapshot handed to presentation collaborators.
#[derive(Clone, Debug)]
pub struct FrameSnapshot {
    /// Music time the frame was computed for.
    pub now_ms: u64,
    /// Lanes in layout order.
    pub lanes: Vec<LaneSnapshot>,
    /// Notes still falling, in arrival order.
    pub notes: Vec<NoteSnapshot>,
    /// Score totals after the frame.
    pub score: ScoreState,
    /// Reports whether the session has run its course.
    pub finished: bool,
}
