#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for HandBeats.

use glam::Vec2;
use handbeats_core::{Activation, Command, Event, Grade, Instrument, NoteId, ZoneLayout};
use log::{debug, warn};

mod lanes;
mod notes;

use lanes::LaneSet;
use notes::FallingNote;

/// Timing parameters the world needs to move and retire notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteTiming {
    /// Time a note is visible before its target.
    pub lead_time_ms: u64,
    /// Delay after the target at which an ungraded note expires.
    pub miss_window_ms: u64,
}

/// Represents the authoritative state of one game session.
#[derive(Debug)]
pub struct World {
    now_ms: u64,
    timing: NoteTiming,
    lanes: LaneSet,
    notes: Vec<FallingNote>,
    next_note_id: u32,
}

impl World {
    /// Creates a world with one idle lane per zone in the layout.
    ///
    /// The layout is expected to have been validated by the caller.
    #[must_use]
    pub fn new(layout: &ZoneLayout, timing: NoteTiming) -> Self {
        Self {
            now_ms: 0,
            timing,
            lanes: LaneSet::from_layout(layout),
            notes: Vec::new(),
            next_note_id: 0,
        }
    }

    fn allocate_note_id(&mut self) -> NoteId {
        let id = NoteId::new(self.next_note_id);
        self.next_note_id = self.next_note_id.saturating_add(1);
        id
    }

    fn note_mut(&mut self, note: NoteId) -> Option<&mut FallingNote> {
        self.notes
            .binary_search_by_key(&note, |candidate| candidate.id)
            .ok()
            .map(|index| &mut self.notes[index])
    }

    fn flash_lane(&mut self, instrument: Instrument, grade: Grade, out_events: &mut Vec<Event>) {
        let activation = if grade.is_hit() {
            Activation::Hit
        } else {
            Activation::Miss
        };
        if self.lanes.set_activation(instrument, activation, self.now_ms) {
            out_events.push(Event::LaneActivated {
                instrument,
                activation,
            });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::AdvanceClock { now_ms } => {
            if now_ms < world.now_ms {
                warn!(
                    "clock moved backwards from {} ms to {now_ms} ms; holding last value",
                    world.now_ms
                );
                out_events.push(Event::ClockRegressed {
                    supplied_ms: now_ms,
                    clamped_to_ms: world.now_ms,
                });
                out_events.push(Event::ClockAdvanced {
                    now_ms: world.now_ms,
                    dt_ms: 0,
                });
                return;
            }

            let dt_ms = now_ms - world.now_ms;
            world.now_ms = now_ms;
            out_events.push(Event::ClockAdvanced { now_ms, dt_ms });
        }
        Command::SpawnNote {
            instrument,
            target_time_ms,
        } => {
            let id = world.allocate_note_id();
            let note = FallingNote::new(id, instrument, target_time_ms, world.timing.lead_time_ms);
            debug!(
                "spawned {instrument:?} note {} at {} ms for target {target_time_ms} ms",
                id.get(),
                world.now_ms
            );
            world.notes.push(note);
            out_events.push(Event::NoteSpawned {
                note: id,
                instrument,
                target_time_ms,
            });
        }
        Command::ActivateLane {
            instrument,
            activation,
        } => {
            if world
                .lanes
                .set_activation(instrument, activation, world.now_ms)
            {
                out_events.push(Event::LaneActivated {
                    instrument,
                    activation,
                });
            }
        }
        Command::GradeNote {
            note,
            grade,
            delta_ms,
        } => {
            let graded = world.note_mut(note).and_then(|candidate| {
                candidate
                    .mark_graded(grade)
                    .then_some(candidate.instrument)
            });

            let Some(instrument) = graded else {
                warn!("ignoring grade for note {} which is not falling", note.get());
                out_events.push(Event::GradeIgnored { note });
                return;
            };

            debug!(
                "graded {instrument:?} note {} as {grade:?} ({delta_ms:+} ms)",
                note.get()
            );
            out_events.push(Event::NoteGraded {
                note,
                instrument,
                grade,
                delta_ms,
            });
            world.flash_lane(instrument, grade, out_events);
        }
        Command::SweepExpired => {
            let now_ms = world.now_ms;
            let miss_window_ms = world.timing.miss_window_ms;
            let expired: Vec<_> = world
                .notes
                .iter_mut()
                .filter_map(|note| {
                    note.expire_if_due(now_ms, miss_window_ms)
                        .then_some((note.id, note.instrument, note.target_time_ms))
                })
                .collect();

            for (note, instrument, target_time_ms) in expired {
                debug!(
                    "{instrument:?} note {} expired at {now_ms} ms (target {target_time_ms} ms)",
                    note.get()
                );
                out_events.push(Event::NoteExpired {
                    note,
                    instrument,
                    target_time_ms,
                });
                world.flash_lane(instrument, Grade::Miss, out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Vec2, World};
    use handbeats_core::{
        Activation, Grade, Instrument, LaneSnapshot, NoteId, NoteState, NoteView, ZoneRect,
    };

    /// Last clock value accepted by the world.
    #[must_use]
    pub fn now_ms(world: &World) -> u64 {
        world.now_ms
    }

    /// Target zone of the instrument's lane.
    #[must_use]
    pub fn zone_for(world: &World, instrument: Instrument) -> Option<ZoneRect> {
        world.lanes.zone_for(instrument)
    }

    /// Activation of the instrument's lane after decay.
    #[must_use]
    pub fn current_activation(world: &World, instrument: Instrument) -> Activation {
        world.lanes.current_activation(instrument, world.now_ms)
    }

    /// Captures every lane in layout order.
    #[must_use]
    pub fn lane_view(world: &World) -> Vec<LaneSnapshot> {
        world
            .lanes
            .iter()
            .map(|lane| lane.snapshot(world.now_ms))
            .collect()
    }

    /// Captures every falling note with its position at the current clock.
    #[must_use]
    pub fn note_view(world: &World) -> NoteView {
        let snapshots = world
            .notes
            .iter()
            .filter(|note| note.is_falling())
            .filter_map(|note| {
                let lane = world.lanes.get(note.instrument)?;
                Some(note.snapshot(
                    world.now_ms,
                    world.timing.lead_time_ms,
                    lane.spawn_point,
                    lane.zone.center(),
                ))
            })
            .collect();
        NoteView::from_snapshots(snapshots)
    }

    /// Lifecycle state of a note, including retired ones.
    #[must_use]
    pub fn note_state(world: &World, note: NoteId) -> Option<NoteState> {
        find(world, note).map(|candidate| candidate.state)
    }

    /// Grade recorded for a retired note. Expired notes report a miss.
    #[must_use]
    pub fn note_grade(world: &World, note: NoteId) -> Option<Grade> {
        find(world, note).and_then(|candidate| candidate.grade)
    }

    /// Reports whether any note is still falling.
    #[must_use]
    pub fn has_falling_notes(world: &World) -> bool {
        world.notes.iter().any(|note| note.is_falling())
    }

    /// Spawn point of the instrument's lane.
    #[must_use]
    pub fn spawn_point(world: &World, instrument: Instrument) -> Option<Vec2> {
        world.lanes.get(instrument).map(|lane| lane.spawn_point)
    }

    fn find(world: &World, note: NoteId) -> Option<&super::FallingNote> {
        world
            .notes
            .binary_search_by_key(&note, |candidate| candidate.id)
            .ok()
            .map(|index| &world.notes[index])
    }
}
