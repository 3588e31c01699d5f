use glam::Vec2;
use handbeats_core::{
    Command, Event, Grade, Instrument, NoteId, NoteState, TimingWindows, ZoneLayout,
};
use handbeats_system_collision::detect;
use handbeats_system_judgment::Judgment;
use handbeats_world::{self as world, query, NoteTiming, World};

fn world_with_notes(notes: &[(Instrument, u64)]) -> World {
    let mut world = World::new(
        &ZoneLayout::default(),
        NoteTiming {
            lead_time_ms: 1_000,
            miss_window_ms: 280,
        },
    );
    let mut events = Vec::new();
    for (instrument, target_time_ms) in notes {
        world::apply(
            &mut world,
            Command::SpawnNote {
                instrument: *instrument,
                target_time_ms: *target_time_ms,
            },
            &mut events,
        );
    }
    world
}

fn judge_at(world: &mut World, now_ms: u64, hands: &[Vec2]) -> Vec<Event> {
    judge_with(world, Judgment::new(TimingWindows::STANDARD, 280), now_ms, hands)
}

fn judge_with(
    world: &mut World,
    mut judgment: Judgment,
    now_ms: u64,
    hands: &[Vec2],
) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::AdvanceClock { now_ms }, &mut events);
    events.clear();

    let notes = query::note_view(world);
    let overlaps = detect(hands, &query::lane_view(world), &notes);
    let mut commands = Vec::new();
    judgment.handle(now_ms, &overlaps, &notes, &mut commands);

    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
        .into_iter()
        .filter(|event| matches!(event, Event::NoteGraded { .. }))
        .collect()
}

fn kick_hand() -> Vec2 {
    Instrument::Kick.default_zone().center()
}

#[test]
fn late_hit_inside_perfect_window_is_perfect() {
    let mut world = world_with_notes(&[(Instrument::Kick, 2_000)]);
    let events = judge_at(&mut world, 2_050, &[kick_hand()]);
    assert_eq!(
        events,
        vec![Event::NoteGraded {
            note: NoteId::new(0),
            instrument: Instrument::Kick,
            grade: Grade::Perfect,
            delta_ms: 50,
        }]
    );
    assert_eq!(
        query::note_state(&world, NoteId::new(0)),
        Some(NoteState::Graded)
    );
}

#[test]
fn early_miss_overlap_keeps_note_falling() {
    let mut world = world_with_notes(&[(Instrument::Kick, 2_000)]);
    assert!(judge_at(&mut world, 1_500, &[kick_hand()]).is_empty());
    assert_eq!(
        query::note_state(&world, NoteId::new(0)),
        Some(NoteState::Falling)
    );

    let events = judge_at(&mut world, 1_850, &[kick_hand()]);
    assert!(matches!(
        events.as_slice(),
        [Event::NoteGraded {
            grade: Grade::Good,
            delta_ms: -150,
            ..
        }]
    ));
}

#[test]
fn overlap_after_miss_window_is_left_to_expiry() {
    let mut world = world_with_notes(&[(Instrument::Snare, 2_000)]);
    let hand = Instrument::Snare.default_zone().center();
    assert!(judge_at(&mut world, 2_281, &[hand]).is_empty());
    assert_eq!(
        query::note_state(&world, NoteId::new(0)),
        Some(NoteState::Falling)
    );

    let mut events = Vec::new();
    world::apply(&mut world, Command::SweepExpired, &mut events);
    assert_eq!(
        query::note_state(&world, NoteId::new(0)),
        Some(NoteState::Expired)
    );
}

#[test]
fn late_overlap_inside_wider_miss_window_grades_miss() {
    let mut world = world_with_notes(&[(Instrument::Snare, 2_000)]);
    let hand = Instrument::Snare.default_zone().center();
    let judgment = Judgment::new(TimingWindows::STANDARD, 400);
    let events = judge_with(&mut world, judgment, 2_350, &[hand]);
    assert!(matches!(
        events.as_slice(),
        [Event::NoteGraded {
            grade: Grade::Miss,
            delta_ms: 350,
            ..
        }]
    ));
}

#[test]
fn queued_notes_are_graded_front_first() {
    let mut world = world_with_notes(&[(Instrument::Kick, 2_000), (Instrument::Kick, 2_200)]);

    let first = judge_at(&mut world, 2_100, &[kick_hand()]);
    assert!(matches!(
        first.as_slice(),
        [Event::NoteGraded {
            note,
            grade: Grade::Perfect,
            ..
        }] if *note == NoteId::new(0)
    ));

    let second = judge_at(&mut world, 2_116, &[kick_hand()]);
    assert!(matches!(
        second.as_slice(),
        [Event::NoteGraded {
            note,
            grade: Grade::Perfect,
            delta_ms: -84,
            ..
        }] if *note == NoteId::new(1)
    ));
}

#[test]
fn two_hands_grade_two_lanes_in_one_frame() {
    let mut world = world_with_notes(&[(Instrument::Kick, 2_000), (Instrument::Snare, 2_000)]);
    let hands = [kick_hand(), Instrument::Snare.default_zone().center()];
    let events = judge_at(&mut world, 2_000, &hands);
    assert_eq!(events.len(), 2);
    assert!(!query::has_falling_notes(&world));
}
