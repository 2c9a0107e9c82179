//! Property-based invariants for movement resolution.
//!
//! 1. A blocked mover ends at least `radius - ε` from the reported wall.
//! 2. An unblocked move lands exactly on its destination.
//! 3. A slid mover stays on the side of the wall it started on.

use dusk_core::geometry::{Side, point_on_side, project_onto_segment};
use dusk_core::{MapIndex, Room, RowMapBuilder};
use dusk_sim::collision::{COLLISION_EPSILON, try_move};
use glam::Vec2;
use proptest::prelude::*;

const RADIUS: f32 = 16.0;
const HEIGHT: f32 = 56.0;

fn closed_box() -> MapIndex {
    RowMapBuilder::new(0.0, 100.0)
        .room(Room::new(100.0, 0.0, 128.0))
        .build("BOX")
        .expect("box indexes")
}

fn inside() -> impl Strategy<Value = Vec2> {
    (RADIUS + 1.0..100.0 - RADIUS - 1.0, RADIUS + 1.0..100.0 - RADIUS - 1.0)
        .prop_map(|(x, y)| Vec2::new(x, y))
}

fn step() -> impl Strategy<Value = Vec2> {
    (-RADIUS..RADIUS, -RADIUS..RADIUS).prop_map(|(x, y)| Vec2::new(x, y))
}

proptest! {
    #[test]
    fn blocked_mover_keeps_clear_of_wall(from in inside(), delta in step()) {
        let map = closed_box();
        let result = try_move(&map, from, from + delta, RADIUS, HEIGHT);
        if let Some(line) = result.blocking_line {
            let (a, b) = map.line_endpoints(line).unwrap();
            if let Some((t, dist)) = project_onto_segment(result.position, a, b) {
                if (0.0..=1.0).contains(&t) {
                    prop_assert!(dist >= RADIUS - COLLISION_EPSILON - 1e-3, "dist {dist}");
                }
            }
        }
    }

    #[test]
    fn clear_move_reaches_destination(from in inside(), delta in step()) {
        let map = closed_box();
        let to = from + delta;
        let result = try_move(&map, from, to, RADIUS, HEIGHT);
        if !result.blocked {
            prop_assert_eq!(result.position, to);
            prop_assert!(!result.collided);
        }
    }

    #[test]
    fn slide_stays_on_starting_side(from in inside(), delta in step()) {
        let map = closed_box();
        let result = try_move(&map, from, from + delta, RADIUS, HEIGHT);
        if let Some(line) = result.blocking_line {
            let (a, b) = map.line_endpoints(line).unwrap();
            let start_side = point_on_side(from, a, b - a);
            prop_assert_eq!(start_side, Side::Front);
            prop_assert_eq!(point_on_side(result.position, a, b - a), start_side);
        }
    }
}
