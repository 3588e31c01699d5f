#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision detection between tracked hand positions and lane target zones.

use std::collections::BTreeSet;

use glam::Vec2;
use handbeats_core::{Activation, Command, Instrument, LaneSnapshot, NoteView};

/// Instruments whose zone contains at least one hand, regardless of notes.
///
/// Every hand is tested against every lane, so overlapping zones are all
/// reported.
#[must_use]
pub fn touched(hands: &[Vec2], lanes: &[LaneSnapshot]) -> BTreeSet<Instrument> {
    lanes
        .iter()
        .filter(|lane| hands.iter().any(|hand| lane.zone.contains(*hand)))
        .map(|lane| lane.instrument)
        .collect()
}

/// Instruments whose zone contains a hand and whose lane holds a falling note.
#[must_use]
pub fn detect(hands: &[Vec2], lanes: &[LaneSnapshot], notes: &NoteView) -> BTreeSet<Instrument> {
    let mut overlaps = touched(hands, lanes);
    overlaps.retain(|instrument| notes.lane_is_occupied(*instrument));
    overlaps
}

/// Pure system that lights up every lane a hand currently rests in.
#[derive(Debug, Default)]
pub struct Collision {
    glowing: BTreeSet<Instrument>,
}

impl Collision {
    /// Creates a new collision system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a glow activation for each touched lane and returns the overlaps
    /// that are eligible for grading.
    pub fn handle(
        &mut self,
        hands: &[Vec2],
        lanes: &[LaneSnapshot],
        notes: &NoteView,
        out: &mut Vec<Command>,
    ) -> BTreeSet<Instrument> {
        self.glowing = touched(hands, lanes);
        for instrument in &self.glowing {
            out.push(Command::ActivateLane {
                instrument: *instrument,
                activation: Activation::Glowing,
            });
        }
        detect(hands, lanes, notes)
    }

    /// Lanes that contained a hand during the last handled frame.
    #[must_use]
    pub fn glowing(&self) -> &BTreeSet<Instrument> {
        &self.glowing
    }
}
