//! Movement resolution against map walls.
//!
//! Exact tests run only on the blockmap's candidates, in ascending linedef
//! order. The first colliding candidate wins; the result is not necessarily
//! the nearest wall.

use dusk_core::geometry::{
    DEGENERATE_LENGTH_SQ, Side, front_normal, point_on_side, project_onto_segment, segments_cross,
};
use dusk_core::{Aabb, MapIndex, SectorHeights};
use glam::Vec2;

/// Clearance kept between a slid mover and the wall that stopped it.
pub const COLLISION_EPSILON: f32 = 0.01;

/// Outcome of [`try_move`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    /// A wall was touched.
    pub collided: bool,
    /// Final position: the destination when clear, the slid point otherwise.
    pub position: Vec2,
    /// The intended destination was not reached.
    pub blocked: bool,
    /// The wall that stopped the move.
    pub blocking_line: Option<usize>,
    /// Sector enclosing `position`.
    pub sector: Option<usize>,
}

/// Whether `line` stops a mover of `height`.
///
/// A line with the blocking flag always does. Without it, only a two-sided
/// line whose vertical opening is smaller than `height` does; unflagged
/// one-sided lines are passed through.
pub fn line_blocks(map: &MapIndex, line: usize, height: f32) -> bool {
    let Some(linedef) = map.linedef(line) else {
        return false;
    };
    if linedef.is_blocking() {
        return true;
    }
    linedef.is_two_sided() && map.opening(line).is_some_and(|opening| opening.gap() < height)
}

/// Move a circle of `radius` from `from` toward `to`.
///
/// On collision the movement is projected onto the wall tangent and the
/// result pushed to exactly `radius + COLLISION_EPSILON` from the wall, on
/// the side `from` was on. Moves longer than `radius` can tunnel; callers
/// split them first (see [`sub_steps`]).
pub fn try_move(map: &MapIndex, from: Vec2, to: Vec2, radius: f32, height: f32) -> MoveResult {
    let candidates = map.query_block(Aabb::around(to, radius));
    for line in candidates {
        let Some((a, b)) = map.line_endpoints(line) else {
            continue;
        };
        if (b - a).length_squared() < DEGENERATE_LENGTH_SQ {
            continue;
        }
        if !line_blocks(map, line, height) {
            continue;
        }
        let Some((t, dist)) = project_onto_segment(to, a, b) else {
            continue;
        };
        if !(0.0..=1.0).contains(&t) || dist >= radius {
            continue;
        }

        let position = slide(from, to, a, b, radius);
        return MoveResult {
            collided: true,
            position,
            blocked: true,
            blocking_line: Some(line),
            sector: map.find_sector(position),
        };
    }

    MoveResult {
        collided: false,
        position: to,
        blocked: false,
        blocking_line: None,
        sector: map.find_sector(to),
    }
}

fn slide(from: Vec2, to: Vec2, a: Vec2, b: Vec2, radius: f32) -> Vec2 {
    let wall = b - a;
    let (Some(tangent), Some(normal)) = (wall.try_normalize(), front_normal(wall)) else {
        return from;
    };
    let slid = from + tangent * (to - from).dot(tangent);
    let sign = match point_on_side(from, a, wall) {
        Side::Front => 1.0,
        Side::Back => -1.0,
    };
    let current = (slid - a).dot(normal);
    slid + normal * (sign * (radius + COLLISION_EPSILON) - current)
}

/// Floor and ceiling at `point`, or `None` outside every sector.
pub fn height_at(map: &MapIndex, point: Vec2) -> Option<SectorHeights> {
    map.heights_at(point)
}

/// Linedefs whose sides the segment `from`-`to` switches between.
///
/// Drives walk-over specials. A point exactly on a line counts as its back
/// side, so touching a line from the front counts as crossing it.
pub fn crossed_lines(map: &MapIndex, from: Vec2, to: Vec2) -> Vec<usize> {
    if from == to {
        return Vec::new();
    }
    map.query_block(Aabb::from_corners(from, to))
        .into_iter()
        .filter(|&line| {
            let Some((a, b)) = map.line_endpoints(line) else {
                return false;
            };
            let dir = b - a;
            dir.length_squared() >= DEGENERATE_LENGTH_SQ
                && point_on_side(from, a, dir) != point_on_side(to, a, dir)
                && segments_cross(from, to, a, b)
        })
        .collect()
}

/// Upper bound on [`sub_steps`]. Moves longer than this many radii take
/// steps longer than the radius.
pub const MAX_SUB_STEPS: u32 = 64;

/// Number of equal steps needed so none is longer than `radius`, capped at
/// [`MAX_SUB_STEPS`]. A non-finite `delta` or `radius` gets a single step.
pub fn sub_steps(delta: Vec2, radius: f32) -> u32 {
    let ratio = delta.length() / radius;
    if radius <= 0.0 || !ratio.is_finite() {
        return 1;
    }
    (ratio.ceil() as u32).clamp(1, MAX_SUB_STEPS)
}
