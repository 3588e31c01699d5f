#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting note spawn commands.

use handbeats_core::{Beatmap, Command, Event};

/// Pure system that walks the beatmap and spawns notes once their lead window opens.
#[derive(Debug)]
pub struct Spawning {
    beatmap: Beatmap,
    lead_time_ms: u64,
    cursor: usize,
}

impl Spawning {
    /// Creates a new spawning system over the provided beatmap.
    #[must_use]
    pub fn new(beatmap: Beatmap, lead_time_ms: u64) -> Self {
        Self {
            beatmap,
            lead_time_ms,
            cursor: 0,
        }
    }

    /// Consumes clock events and emits a spawn command for every entry whose
    /// spawn time `target - lead` has been reached.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let Some(now_ms) = latest_clock(events) else {
            return;
        };

        let entries = self.beatmap.entries();
        while let Some(entry) = entries.get(self.cursor) {
            if entry.target_time_ms.saturating_sub(self.lead_time_ms) > now_ms {
                break;
            }
            out.push(Command::SpawnNote {
                instrument: entry.instrument,
                target_time_ms: entry.target_time_ms,
            });
            self.cursor += 1;
        }
    }

    /// Number of beatmap entries that have not been spawned yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.beatmap.len().saturating_sub(self.cursor)
    }

    /// Reports whether every beatmap entry has been spawned.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

fn latest_clock(events: &[Event]) -> Option<u64> {
    events.iter().rev().find_map(|event| match event {
        Event::ClockAdvanced { now_ms, .. } => Some(*now_ms),
        _ => None,
    })
}
