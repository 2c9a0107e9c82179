//! End-to-end scenarios driven through the public simulation API.

use std::f32::consts::FRAC_PI_2;

use dusk_core::{Room, RowMapBuilder};
use dusk_sim::{
    FrameLoop, FrameLoopConfig, KeySet, PlayerIntent, SimConfig, SimError, SimEventKind,
    Simulation, ThingId, ThingKind,
};
use glam::Vec2;

fn load(builder: RowMapBuilder) -> Simulation {
    let mut sim = Simulation::new(SimConfig::default());
    sim.load_level(builder.build("SCENARIO").expect("scenario map indexes"));
    sim
}

fn count(sim: &Simulation, pred: impl Fn(&SimEventKind) -> bool) -> usize {
    sim.events().events().iter().filter(|e| pred(&e.kind)).count()
}

#[test]
fn ticking_before_load_is_rejected() {
    let mut sim = Simulation::new(SimConfig::default());
    let err = sim.tick(&PlayerIntent::default()).unwrap_err();
    assert!(matches!(err, SimError::NoActiveLevel));
    assert!(err.to_string().contains("no active level"));
}

#[test]
fn stimpack_heals_to_cap_and_disappears() {
    let map = RowMapBuilder::new(0.0, 256.0)
        .room(Room::new(512.0, 0.0, 128.0))
        .thing(64.0, 128.0, 0.0, 1)
        .thing(128.0, 128.0, 0.0, 2011);
    let mut sim = load(map);
    sim.level_mut().unwrap().player_mut().health = 95;

    sim.run(20, &PlayerIntent::forward(1.0)).unwrap();
    let level = sim.level().unwrap();
    assert_eq!(level.player().health, 100);
    assert!(level.things().is_empty());

    // Walk back over the spot: nothing left to take.
    sim.level_mut().unwrap().player_mut().health = 90;
    sim.level_mut().unwrap().player_mut().position.x = 128.0;
    sim.tick(&PlayerIntent::default()).unwrap();
    assert_eq!(sim.level().unwrap().player().health, 90);
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::ItemPickedUp { .. })), 1);
}

#[test]
fn blue_door_needs_the_blue_key() {
    let map = RowMapBuilder::new(0.0, 256.0)
        .room(Room::new(256.0, 0.0, 128.0))
        .room(Room::new(16.0, 0.0, 0.0).entry(26, 0))
        .room(Room::new(256.0, 0.0, 128.0))
        .thing(220.0, 128.0, 0.0, 1)
        .thing(120.0, 128.0, 0.0, 5);
    let mut sim = load(map);

    sim.tick(&PlayerIntent::use_line()).unwrap();
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::Locked { key, .. } if *key == KeySet::BLUE)), 1);
    assert!(sim.level().unwrap().actions().action(1).is_none());

    // Fetch the key, come back, try again.
    sim.level_mut().unwrap().player_mut().position.x = 120.0;
    sim.tick(&PlayerIntent::default()).unwrap();
    assert!(sim.level().unwrap().player().inventory.keys.contains(KeySet::BLUE));
    sim.level_mut().unwrap().player_mut().position.x = 220.0;
    sim.tick(&PlayerIntent::use_line()).unwrap();
    assert!(sim.level().unwrap().actions().action(1).is_some());
}

#[test]
fn door_closes_again_after_waiting() {
    let map = RowMapBuilder::new(0.0, 256.0)
        .room(Room::new(256.0, 0.0, 128.0))
        .room(Room::new(16.0, 0.0, 0.0).entry(1, 0))
        .room(Room::new(256.0, 0.0, 128.0))
        .thing(220.0, 128.0, 0.0, 1);
    let mut sim = load(map);
    sim.tick(&PlayerIntent::use_line()).unwrap();
    // 62 tics up, 150 waiting, 62 down, with a little slack.
    sim.run(280, &PlayerIntent::default()).unwrap();

    let level = sim.level().unwrap();
    assert_eq!(level.map().sector(1).unwrap().ceiling_height, 0.0);
    assert_eq!(level.actions().active_count(), 0);
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::SectorActionReversed { sector: 1 })), 1);
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::SectorActionFinished { sector: 1, .. })), 1);
}

#[test]
fn demo_switch_lowers_exit_room() {
    let mut sim = load(RowMapBuilder::demo());
    {
        let player = sim.level_mut().unwrap().player_mut();
        player.position.x = 400.0;
        player.position.y = 220.0;
        player.angle = FRAC_PI_2;
    }
    sim.tick(&PlayerIntent::use_line()).unwrap();
    assert!(sim.level().unwrap().actions().action(4).is_some());

    sim.run(70, &PlayerIntent::default()).unwrap();
    let level = sim.level().unwrap();
    assert_eq!(level.map().sector(4).unwrap().floor_height, 0.0);

    // The switch is once-only.
    sim.tick(&PlayerIntent::use_line()).unwrap();
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::LineActivated { special: 23, .. })), 1);
}

#[test]
fn player_shoots_approaching_zombie_dead() {
    let map = RowMapBuilder::new(0.0, 256.0)
        .room(Room::new(1024.0, 0.0, 128.0))
        .thing(100.0, 128.0, 0.0, 1)
        .thing(400.0, 128.0, 180.0, 3004);
    let mut sim = load(map);
    sim.run(35 * 4, &PlayerIntent::fire()).unwrap();

    let level = sim.level().unwrap();
    let zombie = level.things().get(ThingId(0)).expect("corpse stays");
    assert!(matches!(zombie.kind, ThingKind::Monster(_)));
    assert_eq!(zombie.health, 0);
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::ThingKilled { thing } if *thing == ThingId(0))), 1);
    assert!(level.player().alive);
}

#[test]
fn wall_slide_keeps_tangential_motion() {
    let map = RowMapBuilder::new(0.0, 256.0)
        .room(Room::new(512.0, 0.0, 128.0))
        .thing(100.0, 200.0, 45.0, 1);
    let mut sim = load(map);
    sim.run(30, &PlayerIntent::forward(1.0)).unwrap();
    let p = sim.level().unwrap().player().pos2();
    assert!(p.y <= 256.0 - 16.0 + 0.1);
    assert!(p.x > 150.0);
}

#[test]
fn frame_loop_one_second_runs_thirty_five_ticks() {
    let mut sim = load(RowMapBuilder::demo());
    let mut frame_loop = FrameLoop::new(
        FrameLoopConfig::default()
            .with_max_frame_delta(None)
            .with_max_frame_skip(40),
    );
    frame_loop.start(10.0);
    let report = frame_loop.frame(&mut sim, 11.0, &PlayerIntent::default()).unwrap();
    assert_eq!(report.ticks, 35);
    assert_eq!(sim.current_tick(), 35);
    let snapshot = frame_loop.snapshot(&sim).unwrap();
    assert_eq!(snapshot.tick, 35);
    assert!((snapshot.time - 1.0).abs() < 1e-12);
    assert!(snapshot.fps > 0.0);
}

#[test]
fn deterministic_under_same_seed() {
    let play = |seed| {
        let mut sim = Simulation::new(SimConfig::default().with_seed(seed));
        sim.load_level(RowMapBuilder::demo().build("DEMO").unwrap());
        let intent = PlayerIntent {
            forward: 0.5,
            turn: 0.2,
            fire: true,
            ..PlayerIntent::default()
        };
        sim.run(300, &intent).unwrap();
        (sim.save_data().unwrap(), sim.events().len())
    };
    assert_eq!(play(9), play(9));
}

#[test]
fn snapshot_lists_sector_heights_and_things() {
    let sim = load(RowMapBuilder::demo());
    let snapshot = sim.snapshot(60.0).unwrap();
    assert_eq!(snapshot.map, "SCENARIO");
    assert_eq!(snapshot.sectors.len(), 5);
    assert_eq!(snapshot.sectors[4].floor, 64.0);
    assert_eq!(snapshot.things.len(), 6);
    assert_eq!(snapshot.player.pos2(), Vec2::new(64.0, 128.0));
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"automap\":false"));
}
