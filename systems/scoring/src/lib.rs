#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Score manager tracking combo, multiplier, totals and the final ranking.

use handbeats_core::{Event, Grade, Instrument, Rank, RankingThresholds, ScoreState};

/// Combo thresholds and their multipliers in percent, highest first.
const MULTIPLIER_STEPS: [(u32, u32); 4] = [(50, 250), (30, 200), (20, 150), (10, 120)];

/// Multiplier applied below the first combo threshold.
const BASE_MULTIPLIER_PCT: u32 = 100;

/// Multiplier, in percent, earned by reaching `combo`.
#[must_use]
pub fn multiplier_pct(combo: u32) -> u32 {
    MULTIPLIER_STEPS
        .iter()
        .find(|(threshold, _)| combo >= *threshold)
        .map_or(BASE_MULTIPLIER_PCT, |(_, pct)| *pct)
}

/// Outcome of recording one grade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreDelta {
    /// Grade that was recorded.
    pub grade: Grade,
    /// Lane the graded note belonged to.
    pub instrument: Instrument,
    /// Points added to the total.
    pub points: u64,
    /// Multiplier applied to the base points, in percent.
    pub multiplier_pct: u32,
    /// Combo after the grade.
    pub combo: u32,
    /// Total score after the grade.
    pub total_score: u64,
    /// Reports whether a running combo was reset.
    pub combo_broken: bool,
}

/// Owns the score state for a session.
#[derive(Debug, Default)]
pub struct ScoreManager {
    state: ScoreState,
    thresholds: RankingThresholds,
}

impl ScoreManager {
    /// Creates a score manager ranking against the provided thresholds.
    #[must_use]
    pub fn new(thresholds: RankingThresholds) -> Self {
        Self {
            state: ScoreState::default(),
            thresholds,
        }
    }

    /// Records a grade and returns what changed.
    pub fn apply_grade(&mut self, grade: Grade, instrument: Instrument) -> ScoreDelta {
        let state = &mut self.state;
        state.counts.record(grade);

        if !grade.is_hit() {
            let combo_broken = state.combo > 0;
            state.combo = 0;
            return ScoreDelta {
                grade,
                instrument,
                points: 0,
                multiplier_pct: BASE_MULTIPLIER_PCT,
                combo: 0,
                total_score: state.total_score,
                combo_broken,
            };
        }

        state.combo = state.combo.saturating_add(1);
        state.max_combo = state.max_combo.max(state.combo);
        let multiplier_pct = multiplier_pct(state.combo);
        let points = grade.base_points() * u64::from(multiplier_pct) / 100;
        state.total_score = state.total_score.saturating_add(points);

        ScoreDelta {
            grade,
            instrument,
            points,
            multiplier_pct,
            combo: state.combo,
            total_score: state.total_score,
            combo_broken: false,
        }
    }

    /// Consumes world events, scoring every graded or expired note.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<ScoreDelta>) {
        for event in events {
            let delta = match event {
                Event::NoteGraded {
                    grade, instrument, ..
                } => self.apply_grade(*grade, *instrument),
                Event::NoteExpired { instrument, .. } => {
                    self.apply_grade(Grade::Miss, *instrument)
                }
                _ => continue,
            };
            out.push(delta);
        }
    }

    /// Current score totals.
    #[must_use]
    pub fn state(&self) -> ScoreState {
        self.state
    }

    /// Weighted accuracy in percent, `0.0` before any note was judged.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        accuracy(&self.state)
    }

    /// Rank earned by the current accuracy.
    #[must_use]
    pub fn rank(&self) -> Rank {
        rank_for(self.accuracy(), &self.thresholds)
    }
}

/// Weighted accuracy of a score state: perfect counts fully, good 70 % and ok 40 %.
#[must_use]
pub fn accuracy(state: &ScoreState) -> f64 {
    let counts = state.counts;
    let total = counts.total();
    if total == 0 {
        return 0.0;
    }

    let weighted_tenths = u64::from(counts.perfect) * 10
        + u64::from(counts.good) * 7
        + u64::from(counts.ok) * 4;
    let accuracy = weighted_tenths as f64 * 10.0 / f64::from(total);
    accuracy.min(100.0)
}

/// Buckets an accuracy percentage into a rank.
#[must_use]
pub fn rank_for(accuracy: f64, thresholds: &RankingThresholds) -> Rank {
    if accuracy >= thresholds.s {
        Rank::S
    } else if accuracy >= thresholds.a {
        Rank::A
    } else if accuracy >= thresholds.b {
        Rank::B
    } else if accuracy >= thresholds.c {
        Rank::C
    } else {
        Rank::D
    }
}
