//! Scripted hand feed standing in for the camera tracker.

use glam::Vec2;
use handbeats_core::{Beatmap, ZoneLayout};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Most hands the tracker reports in one frame.
const MAX_HANDS: usize = 2;

/// Behaviour of the simulated player.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlayerConfig {
    pub(crate) seed: u64,
    pub(crate) jitter_ms: u64,
    pub(crate) dwell_ms: u64,
    pub(crate) miss_every: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Reach {
    start_ms: u64,
    end_ms: u64,
    position: Vec2,
}

/// Hand feed that reaches into each note's zone around its target time.
#[derive(Debug)]
pub(crate) struct SimulatedPlayer {
    reaches: Vec<Reach>,
}

impl SimulatedPlayer {
    /// Plans one reach per beatmap entry, skipping every `miss_every`th note.
    ///
    /// Each reach starts at the target offset by a uniform error in
    /// `-jitter_ms..=jitter_ms` and lasts `dwell_ms`.
    pub(crate) fn plan(beatmap: &Beatmap, layout: &ZoneLayout, config: PlayerConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let jitter = i64::try_from(config.jitter_ms).unwrap_or(i64::MAX);

        let reaches = beatmap
            .iter()
            .enumerate()
            .filter(|(index, _)| !skips(config.miss_every, *index))
            .filter_map(|(_, entry)| {
                let zone = layout.zone_for(entry.instrument)?;
                let offset = if jitter == 0 {
                    0
                } else {
                    rng.gen_range(-jitter..=jitter)
                };
                let start_ms = entry.target_time_ms.saturating_add_signed(offset);
                Some(Reach {
                    start_ms,
                    end_ms: start_ms.saturating_add(config.dwell_ms),
                    position: zone.center(),
                })
            })
            .collect();

        Self { reaches }
    }

    /// Hand positions tracked at `now_ms`. Empty when no reach is active.
    pub(crate) fn hands_at(&self, now_ms: u64) -> Vec<Vec2> {
        self.reaches
            .iter()
            .filter(|reach| reach.start_ms <= now_ms && now_ms <= reach.end_ms)
            .map(|reach| reach.position)
            .take(MAX_HANDS)
            .collect()
    }

    /// Number of notes the player will attempt.
    pub(crate) fn attempts(&self) -> usize {
        self.reaches.len()
    }
}

fn skips(miss_every: Option<u32>, index: usize) -> bool {
    match miss_every {
        Some(every) if every > 0 => (index + 1) % every as usize == 0,
        _ => false,
    }
}
