use handbeats_core::{Command, Event, Grade, Instrument, NoteId, ZoneLayout};
use handbeats_system_scoring::ScoreManager;
use handbeats_world::{self as world, NoteTiming, World};

fn longest_hit_run(grades: &[Grade]) -> u32 {
    let mut longest = 0;
    let mut current = 0;
    for grade in grades {
        current = if grade.is_hit() { current + 1 } else { 0 };
        longest = longest.max(current);
    }
    longest
}

#[test]
fn max_combo_tracks_longest_run() {
    let sequences: [&[Grade]; 4] = [
        &[Grade::Perfect, Grade::Good, Grade::Miss, Grade::Ok],
        &[Grade::Miss, Grade::Miss],
        &[
            Grade::Ok,
            Grade::Miss,
            Grade::Good,
            Grade::Good,
            Grade::Perfect,
            Grade::Miss,
            Grade::Perfect,
        ],
        &[],
    ];

    for grades in sequences {
        let mut scores = ScoreManager::default();
        let mut seen_max = 0;
        for grade in grades {
            let delta = scores.apply_grade(*grade, Instrument::Kick);
            seen_max = seen_max.max(delta.combo);
            assert!(scores.state().max_combo >= delta.combo);
        }
        assert_eq!(scores.state().max_combo, longest_hit_run(grades));
        assert_eq!(scores.state().max_combo, seen_max);
        assert_eq!(scores.state().counts.total() as usize, grades.len());
    }
}

#[test]
fn total_score_never_decreases() {
    let mut scores = ScoreManager::default();
    let mut previous = 0;
    for index in 0..80u32 {
        let grade = if index % 17 == 16 {
            Grade::Miss
        } else {
            Grade::Good
        };
        let delta = scores.apply_grade(grade, Instrument::Snare);
        assert!(delta.total_score >= previous);
        previous = delta.total_score;
    }
}

#[test]
fn grading_a_note_twice_leaves_score_unchanged() {
    let mut world = World::new(
        &ZoneLayout::default(),
        NoteTiming {
            lead_time_ms: 1_000,
            miss_window_ms: 280,
        },
    );
    let mut scores = ScoreManager::default();
    let mut deltas = Vec::new();

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnNote {
            instrument: Instrument::Kick,
            target_time_ms: 2_000,
        },
        &mut events,
    );

    let grade = Command::GradeNote {
        note: NoteId::new(0),
        grade: Grade::Perfect,
        delta_ms: 50,
    };
    events.clear();
    world::apply(&mut world, grade.clone(), &mut events);
    scores.handle(&events, &mut deltas);
    let after_first = scores.state();

    events.clear();
    world::apply(&mut world, grade, &mut events);
    assert!(events.contains(&Event::GradeIgnored {
        note: NoteId::new(0)
    }));
    scores.handle(&events, &mut deltas);

    assert_eq!(scores.state(), after_first);
    assert_eq!(deltas.len(), 1);
    assert_eq!(after_first.total_score, 100);
}

#[test]
fn expired_notes_count_as_misses() {
    let mut scores = ScoreManager::default();
    let mut deltas = Vec::new();
    scores.handle(
        &[
            Event::NoteGraded {
                note: NoteId::new(0),
                instrument: Instrument::HiHat,
                grade: Grade::Good,
                delta_ms: -120,
            },
            Event::NoteExpired {
                note: NoteId::new(1),
                instrument: Instrument::Kick,
                target_time_ms: 3_000,
            },
        ],
        &mut deltas,
    );

    assert_eq!(deltas.len(), 2);
    assert!(deltas[1].combo_broken);
    assert_eq!(deltas[1].instrument, Instrument::Kick);
    let state = scores.state();
    assert_eq!(state.counts.good, 1);
    assert_eq!(state.counts.miss, 1);
    assert_eq!(state.total_score, 50);
}
