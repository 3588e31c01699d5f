#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic pattern generation producing beatmaps from difficulty profiles.

use handbeats_core::{Beatmap, BeatmapEntry, DifficultyProfile};

/// Builds the note schedule for a difficulty.
///
/// Note `i` lands on `(i + 1) * beat_interval_ms` and plays
/// `instrument_template[i % len]`. Notes are produced while their target lies
/// strictly before `duration_ms`.
#[must_use]
pub fn generate(profile: &DifficultyProfile, duration_ms: u64) -> Beatmap {
    let template = &profile.instrument_template;
    let interval = profile.beat_interval_ms;
    if template.is_empty() || interval == 0 {
        return Beatmap::from_entries(Vec::new());
    }

    let mut entries = Vec::new();
    let mut target_time_ms = interval;
    while target_time_ms < duration_ms {
        let instrument = template[entries.len() % template.len()];
        entries.push(BeatmapEntry::new(instrument, target_time_ms));
        target_time_ms = match target_time_ms.checked_add(interval) {
            Some(next) => next,
            None => break,
        };
    }
    Beatmap::from_entries(entries)
}

/// Repeats a single loop's pattern `loops` times, shifting each repetition by
/// `loop_length_ms`.
#[must_use]
pub fn loop_beatmap(pattern: &Beatmap, loops: u32, loop_length_ms: u64) -> Beatmap {
    if pattern.is_empty() {
        return Beatmap::from_entries(Vec::new());
    }

    let mut entries = Vec::new();
    for repetition in 0..u64::from(loops) {
        let offset = repetition.saturating_mul(loop_length_ms);
        entries.extend(pattern.iter().map(|entry| {
            BeatmapEntry::new(
                entry.instrument,
                entry.target_time_ms.saturating_add(offset),
            )
        }));
    }
    Beatmap::from_entries(entries)
}

/// Builds a session beatmap from one music loop's pattern.
///
/// The pattern is generated for a single loop, repeated until it covers the
/// session and trimmed to notes strictly before `session_ms`.
#[must_use]
pub fn generate_looped(
    profile: &DifficultyProfile,
    loop_length_ms: u64,
    session_ms: u64,
) -> Beatmap {
    if loop_length_ms == 0 || session_ms == 0 {
        return Beatmap::from_entries(Vec::new());
    }

    let pattern = generate(profile, loop_length_ms);
    let loops = session_ms.div_ceil(loop_length_ms);
    let loops = u32::try_from(loops).unwrap_or(u32::MAX);
    let looped = loop_beatmap(&pattern, loops, loop_length_ms);
    let entries = looped
        .iter()
        .filter(|entry| entry.target_time_ms < session_ms)
        .copied()
        .collect();
    Beatmap::from_entries(entries)
}
