//! Falling note lifecycle and time-driven motion.

use glam::Vec2;
use handbeats_core::{Grade, Instrument, NoteId, NoteSnapshot, NoteState};

/// Note stored inside the world from spawn until the session ends.
#[derive(Clone, Debug)]
pub(crate) struct FallingNote {
    pub(crate) id: NoteId,
    pub(crate) instrument: Instrument,
    pub(crate) target_time_ms: u64,
    pub(crate) spawn_time_ms: u64,
    pub(crate) state: NoteState,
    pub(crate) grade: Option<Grade>,
}

impl FallingNote {
    pub(crate) fn new(
        id: NoteId,
        instrument: Instrument,
        target_time_ms: u64,
        lead_time_ms: u64,
    ) -> Self {
        Self {
            id,
            instrument,
            target_time_ms,
            spawn_time_ms: target_time_ms.saturating_sub(lead_time_ms),
            state: NoteState::Falling,
            grade: None,
        }
    }

    pub(crate) fn is_falling(&self) -> bool {
        self.state == NoteState::Falling
    }

    /// Moves the note into `Graded`. Returns `false` if it already left `Falling`.
    pub(crate) fn mark_graded(&mut self, grade: Grade) -> bool {
        if !self.is_falling() {
            return false;
        }
        self.state = NoteState::Graded;
        self.grade = Some(grade);
        true
    }

    /// Moves the note into `Expired` once its miss window has passed.
    pub(crate) fn expire_if_due(&mut self, now_ms: u64, miss_window_ms: u64) -> bool {
        if !self.is_falling() || now_ms <= self.target_time_ms.saturating_add(miss_window_ms) {
            return false;
        }
        self.state = NoteState::Expired;
        self.grade = Some(Grade::Miss);
        true
    }

    /// Fraction of the fall completed at `now_ms`.
    ///
    /// Measured from `target - lead` so notes scheduled inside the first lead
    /// window still arrive on time.
    pub(crate) fn progress(&self, now_ms: u64, lead_time_ms: u64) -> f32 {
        if lead_time_ms == 0 {
            return 1.0;
        }
        let start = self.target_time_ms as i128 - lead_time_ms as i128;
        let elapsed = now_ms as i128 - start;
        (elapsed as f64 / lead_time_ms as f64).clamp(0.0, 1.0) as f32
    }

    pub(crate) fn snapshot(
        &self,
        now_ms: u64,
        lead_time_ms: u64,
        spawn_point: Vec2,
        zone_center: Vec2,
    ) -> NoteSnapshot {
        let progress = self.progress(now_ms, lead_time_ms);
        NoteSnapshot {
            id: self.id,
            instrument: self.instrument,
            target_time_ms: self.target_time_ms,
            spawn_time_ms: self.spawn_time_ms,
            state: self.state,
            progress,
            position: spawn_point.lerp(zone_center, progress),
        }
    }
}
