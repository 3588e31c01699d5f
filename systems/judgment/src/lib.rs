#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timing classification and the judgment system that grades overlapped notes.

use std::collections::BTreeSet;

use handbeats_core::{Command, Grade, Instrument, NoteView, TimingWindows};

/// Classifies a signed hit offset against the standard windows.
#[must_use]
pub fn classify(delta_ms: i64) -> Grade {
    classify_with(&TimingWindows::STANDARD, delta_ms)
}

/// Classifies a signed hit offset against the supplied windows.
///
/// Early and late offsets are treated alike and each boundary belongs to the
/// tighter grade.
#[must_use]
pub fn classify_with(windows: &TimingWindows, delta_ms: i64) -> Grade {
    let distance = delta_ms.unsigned_abs();
    if distance <= windows.perfect_ms {
        Grade::Perfect
    } else if distance <= windows.good_ms {
        Grade::Good
    } else if distance <= windows.ok_ms {
        Grade::Ok
    } else {
        Grade::Miss
    }
}

/// Pure system that grades the front note of every overlapped lane.
#[derive(Debug)]
pub struct Judgment {
    windows: TimingWindows,
    miss_window_ms: u64,
}

impl Judgment {
    /// Creates a judgment system using the provided timing windows and the
    /// delay after which ungraded notes expire.
    #[must_use]
    pub fn new(windows: TimingWindows, miss_window_ms: u64) -> Self {
        Self {
            windows,
            miss_window_ms,
        }
    }

    /// Emits at most one grade command per overlapped lane.
    ///
    /// A hand that arrives too early to score leaves the note falling. A late
    /// hand outside every window grades a miss only while the note is still
    /// inside its miss window; past it the note is left to expire.
    pub fn handle(
        &mut self,
        now_ms: u64,
        overlaps: &BTreeSet<Instrument>,
        notes: &NoteView,
        out: &mut Vec<Command>,
    ) {
        for instrument in overlaps {
            let Some(note) = notes.front_of_lane(*instrument) else {
                continue;
            };

            let delta_ms = signed_delta(now_ms, note.target_time_ms);
            let grade = classify_with(&self.windows, delta_ms);
            if grade == Grade::Miss && !self.accepts_miss(delta_ms) {
                continue;
            }

            out.push(Command::GradeNote {
                note: note.id,
                grade,
                delta_ms,
            });
        }
    }

    fn accepts_miss(&self, delta_ms: i64) -> bool {
        delta_ms >= 0 && delta_ms.unsigned_abs() <= self.miss_window_ms
    }
}

fn signed_delta(now_ms: u64, target_time_ms: u64) -> i64 {
    let delta = i128::from(now_ms) - i128::from(target_time_ms);
    i64::try_from(delta).unwrap_or(if delta < 0 { i64::MIN } else { i64::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_belong_to_tighter_grade() {
        assert_eq!(classify(0), Grade::Perfect);
        assert_eq!(classify(100), Grade::Perfect);
        assert_eq!(classify(101), Grade::Good);
        assert_eq!(classify(180), Grade::Good);
        assert_eq!(classify(181), Grade::Ok);
        assert_eq!(classify(280), Grade::Ok);
        assert_eq!(classify(281), Grade::Miss);
    }

    #[test]
    fn classification_is_symmetric() {
        for delta in -1_000..=1_000 {
            assert_eq!(classify(delta), classify(-delta), "asymmetric at {delta}");
        }
        assert_eq!(classify(i64::MIN), Grade::Miss);
        assert_eq!(classify(i64::MAX), Grade::Miss);
    }

    #[test]
    fn custom_windows_are_respected() {
        let windows = TimingWindows {
            perfect_ms: 50,
            good_ms: 90,
            ok_ms: 150,
        };
        assert_eq!(classify_with(&windows, -50), Grade::Perfect);
        assert_eq!(classify_with(&windows, 60), Grade::Good);
        assert_eq!(classify_with(&windows, -151), Grade::Miss);
    }

    #[test]
    fn miss_overlaps_only_count_late_and_inside_miss_window() {
        let judgment = Judgment::new(TimingWindows::STANDARD, 400);
        assert!(!judgment.accepts_miss(-300));
        assert!(judgment.accepts_miss(281));
        assert!(judgment.accepts_miss(400));
        assert!(!judgment.accepts_miss(401));
    }

    #[test]
    fn signed_delta_saturates() {
        assert_eq!(signed_delta(2_050, 2_000), 50);
        assert_eq!(signed_delta(1_900, 2_000), -100);
        assert_eq!(signed_delta(u64::MAX, 0), i64::MAX);
        assert_eq!(signed_delta(0, u64::MAX), i64::MIN);
    }
}
