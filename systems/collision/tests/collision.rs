use glam::Vec2;
use handbeats_core::{Activation, Command, Event, Instrument, ZoneLayout};
use handbeats_system_collision::{detect, touched, Collision};
use handbeats_world::{self as world, query, NoteTiming, World};

fn world_with_kick_note() -> World {
    let mut world = World::new(
        &ZoneLayout::default(),
        NoteTiming {
            lead_time_ms: 1_000,
            miss_window_ms: 280,
        },
    );
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnNote {
            instrument: Instrument::Kick,
            target_time_ms: 2_000,
        },
        &mut events,
    );
    world
}

fn centre(instrument: Instrument) -> Vec2 {
    instrument.default_zone().center()
}

#[test]
fn detection_requires_a_falling_note() {
    let world = world_with_kick_note();
    let lanes = query::lane_view(&world);
    let notes = query::note_view(&world);
    let hands = [centre(Instrument::Kick), centre(Instrument::Snare)];

    let overlaps = detect(&hands, &lanes, &notes);
    assert_eq!(overlaps.into_iter().collect::<Vec<_>>(), vec![Instrument::Kick]);

    let touched = touched(&hands, &lanes);
    assert_eq!(touched.len(), 2, "both zones contain a hand");
}

#[test]
fn zone_edges_count_as_inside() {
    let world = world_with_kick_note();
    let lanes = query::lane_view(&world);
    let notes = query::note_view(&world);
    let zone = Instrument::Kick.default_zone();

    let corner = Vec2::new(zone.x() + zone.width(), zone.y() + zone.height());
    assert!(detect(&[corner], &lanes, &notes).contains(&Instrument::Kick));

    let outside = Vec2::new(zone.x() - 0.5, zone.y());
    assert!(detect(&[outside], &lanes, &notes).is_empty());
}

#[test]
fn two_hands_in_one_zone_report_the_lane_once() {
    let world = world_with_kick_note();
    let lanes = query::lane_view(&world);
    let notes = query::note_view(&world);
    let hands = [centre(Instrument::Kick), centre(Instrument::Kick)];
    assert_eq!(detect(&hands, &lanes, &notes).len(), 1);
}

#[test]
fn collision_system_glows_touched_lanes() {
    let mut world = world_with_kick_note();
    let mut collision = Collision::new();
    let mut commands = Vec::new();

    let overlaps = collision.handle(
        &[centre(Instrument::HiHat)],
        &query::lane_view(&world),
        &query::note_view(&world),
        &mut commands,
    );
    assert!(overlaps.is_empty(), "hi-hat lane holds no note");
    assert!(collision.glowing().contains(&Instrument::HiHat));

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert_eq!(
        events,
        vec![Event::LaneActivated {
            instrument: Instrument::HiHat,
            activation: Activation::Glowing,
        }]
    );
    assert_eq!(
        query::current_activation(&world, Instrument::HiHat),
        Activation::Glowing
    );
}
