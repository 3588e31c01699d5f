//! Session configuration: difficulty profiles and lane layouts.
//!
//! Every value in this module is validated once when a session starts. A
//! configuration that passes validation can no longer fail mid-game.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Instrument, ZoneRect};

/// Vertical coordinate notes spawn at, above the visible play area.
pub const DEFAULT_SPAWN_Y: f32 = -100.0;

/// Reasons a session configuration is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The requested difficulty name is not one of the built-in profiles.
    #[error("unknown difficulty `{0}`; expected easy, medium or hard")]
    UnknownDifficulty(String),
    /// The instrument template contains no instruments.
    #[error("instrument template must contain at least one instrument")]
    EmptyTemplate,
    /// Notes would all share the same target time.
    #[error("beat interval must be greater than zero")]
    ZeroBeatInterval,
    /// Notes would appear exactly on their target.
    #[error("lead time must be greater than zero")]
    ZeroLeadTime,
    /// Notes would expire before the widest timing window closes.
    #[error("miss window of {miss_window_ms} ms is shorter than the ok window of {ok_ms} ms")]
    MissWindowTooShort {
        /// Configured miss window.
        miss_window_ms: u64,
        /// Widest grading window.
        ok_ms: u64,
    },
    /// Timing windows are not ordered from tightest to widest.
    #[error("timing windows must satisfy perfect <= good <= ok (got {perfect_ms}/{good_ms}/{ok_ms})")]
    InvalidTimingWindows {
        /// Perfect window.
        perfect_ms: u64,
        /// Good window.
        good_ms: u64,
        /// Ok window.
        ok_ms: u64,
    },
    /// Ranking thresholds are not descending percentages.
    #[error("ranking thresholds must descend from S to C within 0..=100")]
    InvalidRankingThresholds,
    /// The layout has no zone for an instrument.
    #[error("layout is missing a zone for {0:?}")]
    MissingZone(Instrument),
    /// The layout lists an instrument twice.
    #[error("layout contains more than one zone for {0:?}")]
    DuplicateZone(Instrument),
    /// A zone has no area or non-finite coordinates.
    #[error("zone for {0:?} must have finite coordinates and a positive size")]
    DegenerateZone(Instrument),
    /// Two zones share screen area.
    #[error("zones for {0:?} and {1:?} overlap")]
    OverlappingZones(Instrument, Instrument),
    /// Notes would spawn from a non-finite height.
    #[error("spawn height must be a finite coordinate")]
    InvalidSpawnY,
    /// The session would end before it starts.
    #[error("session duration must be greater than zero")]
    ZeroDuration,
}

/// Built-in difficulty levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Relaxed pace with a short, predictable pattern.
    Easy,
    /// Moderate pace with light syncopation.
    Medium,
    /// Fast pace with a long, syncopated pattern.
    Hard,
}

impl Difficulty {
    /// Every built-in difficulty.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Display name of the difficulty.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
        }
    }

    /// Returns the built-in profile for the difficulty.
    #[must_use]
    pub fn profile(self) -> DifficultyProfile {
        use Instrument::{HiHat, Kick, Snare};

        match self {
            Self::Easy => DifficultyProfile {
                beat_interval_ms: 1_750,
                lead_time_ms: 2_000,
                instrument_template: vec![Kick, Snare, HiHat, Snare],
                miss_window_ms: 280,
                timing_windows: TimingWindows::STANDARD,
                ranking_thresholds: RankingThresholds::STANDARD,
            },
            Self::Medium => DifficultyProfile {
                beat_interval_ms: 1_500,
                lead_time_ms: 1_500,
                instrument_template: vec![Kick, Snare, HiHat, Kick, Kick, Snare, HiHat, Snare],
                miss_window_ms: 280,
                timing_windows: TimingWindows::STANDARD,
                ranking_thresholds: RankingThresholds::STANDARD,
            },
            Self::Hard => DifficultyProfile {
                beat_interval_ms: 1_000,
                lead_time_ms: 1_000,
                instrument_template: vec![
                    Kick, Snare, HiHat, Kick, HiHat, Snare, HiHat, Kick, Snare, Snare, Kick,
                    HiHat,
                ],
                miss_window_ms: 280,
                timing_windows: TimingWindows::STANDARD,
                ranking_thresholds: RankingThresholds::STANDARD,
            },
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ConfigError::UnknownDifficulty(value.to_owned())),
        }
    }
}

/// Absolute timing windows, each an inclusive upper bound on `|delta|`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimingWindows {
    /// Widest delta still graded Perfect.
    pub perfect_ms: u64,
    /// Widest delta still graded Good.
    pub good_ms: u64,
    /// Widest delta still graded Ok.
    pub ok_ms: u64,
}

impl TimingWindows {
    /// Windows used by every built-in difficulty.
    pub const STANDARD: TimingWindows = TimingWindows {
        perfect_ms: 100,
        good_ms: 180,
        ok_ms: 280,
    };

    /// Checks that the windows widen from Perfect to Ok.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.perfect_ms <= self.good_ms && self.good_ms <= self.ok_ms {
            Ok(())
        } else {
            Err(ConfigError::InvalidTimingWindows {
                perfect_ms: self.perfect_ms,
                good_ms: self.good_ms,
                ok_ms: self.ok_ms,
            })
        }
    }
}

impl Default for TimingWindows {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Minimum accuracy percentages required for each rank.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankingThresholds {
    /// Minimum accuracy for rank S.
    pub s: f64,
    /// Minimum accuracy for rank A.
    pub a: f64,
    /// Minimum accuracy for rank B.
    pub b: f64,
    /// Minimum accuracy for rank C.
    pub c: f64,
}

impl RankingThresholds {
    /// Thresholds used by every built-in difficulty.
    pub const STANDARD: RankingThresholds = RankingThresholds {
        s: 95.0,
        a: 85.0,
        b: 70.0,
        c: 50.0,
    };

    /// Checks that the thresholds are descending percentages.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = [self.s, self.a, self.b, self.c];
        let in_range = ordered
            .iter()
            .all(|value| value.is_finite() && (0.0..=100.0).contains(value));
        let descending = ordered.windows(2).all(|pair| pair[0] >= pair[1]);
        if in_range && descending {
            Ok(())
        } else {
            Err(ConfigError::InvalidRankingThresholds)
        }
    }
}

impl Default for RankingThresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Fully specified difficulty configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Time between successive scheduled notes.
    pub beat_interval_ms: u64,
    /// Time a note is visible before its target.
    pub lead_time_ms: u64,
    /// Instruments replayed cyclically by the pattern generator.
    pub instrument_template: Vec<Instrument>,
    /// Delay after the target at which an ungraded note expires.
    pub miss_window_ms: u64,
    /// Grading windows.
    #[serde(default)]
    pub timing_windows: TimingWindows,
    /// Accuracy thresholds for the final rank.
    #[serde(default)]
    pub ranking_thresholds: RankingThresholds,
}

impl DifficultyProfile {
    /// Checks every field of the profile.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instrument_template.is_empty() {
            return Err(ConfigError::EmptyTemplate);
        }
        if self.beat_interval_ms == 0 {
            return Err(ConfigError::ZeroBeatInterval);
        }
        if self.lead_time_ms == 0 {
            return Err(ConfigError::ZeroLeadTime);
        }
        self.timing_windows.validate()?;
        if self.miss_window_ms < self.timing_windows.ok_ms {
            return Err(ConfigError::MissWindowTooShort {
                miss_window_ms: self.miss_window_ms,
                ok_ms: self.timing_windows.ok_ms,
            });
        }
        self.ranking_thresholds.validate()
    }

    /// Shortest time between two notes of the same instrument in the
    /// repeating template.
    ///
    /// Returns `None` for an empty template. Gaps too long for `u64` saturate.
    #[must_use]
    pub fn min_same_instrument_gap_ms(&self) -> Option<u64> {
        let template = &self.instrument_template;
        let len = template.len();
        (0..len)
            .filter_map(|start| {
                (1..=len)
                    .find(|offset| template[(start + offset) % len] == template[start])
                    .map(|offset| (offset as u64).saturating_mul(self.beat_interval_ms))
            })
            .min()
    }
}

/// Zone assigned to one instrument's lane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneZone {
    /// Instrument the zone belongs to.
    pub instrument: Instrument,
    /// Screen-space target rectangle.
    pub zone: ZoneRect,
}

/// Screen layout of every lane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneLayout {
    /// One zone per instrument.
    pub zones: Vec<LaneZone>,
    /// Vertical coordinate notes spawn at.
    #[serde(default = "default_spawn_y")]
    pub spawn_y: f32,
}

fn default_spawn_y() -> f32 {
    DEFAULT_SPAWN_Y
}

impl ZoneLayout {
    /// Zone assigned to the instrument, if present.
    #[must_use]
    pub fn zone_for(&self, instrument: Instrument) -> Option<ZoneRect> {
        self.zones
            .iter()
            .find(|lane| lane.instrument == instrument)
            .map(|lane| lane.zone)
    }

    /// Checks that every instrument has exactly one well-formed zone and that
    /// no two zones overlap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for instrument in Instrument::ALL {
            match self
                .zones
                .iter()
                .filter(|lane| lane.instrument == instrument)
                .count()
            {
                0 => return Err(ConfigError::MissingZone(instrument)),
                1 => {}
                _ => return Err(ConfigError::DuplicateZone(instrument)),
            }
        }

        for lane in &self.zones {
            if !lane.zone.is_well_formed() {
                return Err(ConfigError::DegenerateZone(lane.instrument));
            }
        }

        for (index, first) in self.zones.iter().enumerate() {
            for second in &self.zones[index + 1..] {
                if first.zone.overlaps(&second.zone) {
                    return Err(ConfigError::OverlappingZones(
                        first.instrument,
                        second.instrument,
                    ));
                }
            }
        }

        if !self.spawn_y.is_finite() {
            return Err(ConfigError::InvalidSpawnY);
        }

        Ok(())
    }
}

impl Default for ZoneLayout {
    fn default() -> Self {
        Self {
            zones: Instrument::ALL
                .iter()
                .map(|&instrument| LaneZone {
                    instrument,
                    zone: instrument.default_zone(),
                })
                .collect(),
            spawn_y: DEFAULT_SPAWN_Y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_names_parse_case_insensitively() {
        assert_eq!("Easy".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!(" HARD ".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(
            "expert".parse::<Difficulty>(),
            Err(ConfigError::UnknownDifficulty("expert".to_owned()))
        );
    }

    #[test]
    fn built_in_profiles_are_valid() {
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.profile().validate(), Ok(()), "{difficulty}");
        }
    }

    #[test]
    fn hard_falls_faster_than_easy() {
        assert!(Difficulty::Hard.profile().lead_time_ms < Difficulty::Easy.profile().lead_time_ms);
    }

    #[test]
    fn built_in_profiles_never_stack_a_lane() {
        for difficulty in Difficulty::ALL {
            let profile = difficulty.profile();
            let gap = profile.min_same_instrument_gap_ms().expect("template");
            assert!(gap >= profile.lead_time_ms, "{difficulty}");
        }
    }

    #[test]
    fn same_instrument_gap_wraps_around_template() {
        let mut profile = Difficulty::Easy.profile();
        profile.instrument_template = vec![Instrument::Kick, Instrument::Snare, Instrument::Kick];
        profile.beat_interval_ms = 100;
        assert_eq!(profile.min_same_instrument_gap_ms(), Some(100));

        profile.instrument_template = vec![Instrument::HiHat];
        assert_eq!(profile.min_same_instrument_gap_ms(), Some(100));
    }

    #[test]
    fn same_instrument_gap_saturates_for_huge_intervals() {
        let mut profile = Difficulty::Easy.profile();
        profile.instrument_template = vec![Instrument::Kick, Instrument::Snare, Instrument::HiHat];
        profile.beat_interval_ms = 7_000_000_000_000_000_000;
        assert_eq!(profile.validate(), Ok(()));
        assert_eq!(profile.min_same_instrument_gap_ms(), Some(u64::MAX));
    }

    #[test]
    fn miss_window_must_cover_ok_window() {
        let mut profile = Difficulty::Medium.profile();
        profile.miss_window_ms = 200;
        assert_eq!(
            profile.validate(),
            Err(ConfigError::MissWindowTooShort {
                miss_window_ms: 200,
                ok_ms: 280,
            })
        );
    }

    #[test]
    fn unordered_windows_are_rejected() {
        let windows = TimingWindows {
            perfect_ms: 200,
            good_ms: 180,
            ok_ms: 280,
        };
        assert!(matches!(
            windows.validate(),
            Err(ConfigError::InvalidTimingWindows { .. })
        ));
    }

    #[test]
    fn ranking_thresholds_must_descend() {
        let thresholds = RankingThresholds {
            s: 80.0,
            a: 85.0,
            b: 70.0,
            c: 50.0,
        };
        assert_eq!(
            thresholds.validate(),
            Err(ConfigError::InvalidRankingThresholds)
        );
    }

    #[test]
    fn default_layout_is_valid() {
        let layout = ZoneLayout::default();
        assert_eq!(layout.validate(), Ok(()));
        assert_eq!(
            layout.zone_for(Instrument::HiHat),
            Some(Instrument::HiHat.default_zone())
        );
    }

    #[test]
    fn layout_rejects_missing_duplicate_and_overlapping_zones() {
        let mut layout = ZoneLayout::default();
        let _ = layout.zones.pop();
        assert_eq!(
            layout.validate(),
            Err(ConfigError::MissingZone(Instrument::HiHat))
        );

        let mut layout = ZoneLayout::default();
        layout.zones.push(layout.zones[0]);
        assert_eq!(
            layout.validate(),
            Err(ConfigError::DuplicateZone(Instrument::Kick))
        );

        let mut layout = ZoneLayout::default();
        layout.zones[1].zone = ZoneRect::new(1_000.0, 390.0, 50.0, 50.0);
        assert_eq!(
            layout.validate(),
            Err(ConfigError::OverlappingZones(
                Instrument::Kick,
                Instrument::Snare
            ))
        );

        let mut layout = ZoneLayout::default();
        layout.zones[2].zone = ZoneRect::new(0.0, 0.0, 0.0, 10.0);
        assert_eq!(
            layout.validate(),
            Err(ConfigError::DegenerateZone(Instrument::HiHat))
        );
    }
}
