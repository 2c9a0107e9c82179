//! Planar geometry shared by point location, collision and hitscan.
//!
//! Map space is the XY plane; heights live on sectors. All math is `f32`
//! through [`glam::Vec2`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Squared length below which a segment is treated as degenerate.
pub const DEGENERATE_LENGTH_SQ: f32 = 1e-6;

/// Which side of a directed line a point lies on.
///
/// `Front` is the right-hand side walking from start to end, matching the
/// right sidedef of a linedef and the right child of a BSP node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Right-hand side of the directed line.
    Front,
    /// Left-hand side, or exactly on the line.
    Back,
}

impl Side {
    /// The opposite side.
    pub fn flip(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// Signed perpendicular offset of `point` from the line through `origin`
/// with direction `dir`. Positive on the front (right-hand) side.
///
/// Not normalized: divide by `dir.length()` for a distance.
#[inline]
pub fn side_offset(point: Vec2, origin: Vec2, dir: Vec2) -> f32 {
    let rel = point - origin;
    rel.x * dir.y - rel.y * dir.x
}

/// Classify `point` against the line through `origin` along `dir`.
///
/// Points exactly on the line resolve to [`Side::Back`].
#[inline]
pub fn point_on_side(point: Vec2, origin: Vec2, dir: Vec2) -> Side {
    if side_offset(point, origin, dir) > 0.0 {
        Side::Front
    } else {
        Side::Back
    }
}

/// Unit normal pointing to the front (right-hand) side of `dir`.
///
/// Returns `None` for a degenerate direction.
#[inline]
pub fn front_normal(dir: Vec2) -> Option<Vec2> {
    Vec2::new(dir.y, -dir.x).try_normalize()
}

/// Projection of `point` onto segment `a`-`b`.
///
/// Returns the line parameter `t` (0 at `a`, 1 at `b`, unclamped) and the
/// perpendicular distance from the infinite line. `None` for a zero-length
/// segment.
pub fn project_onto_segment(point: Vec2, a: Vec2, b: Vec2) -> Option<(f32, f32)> {
    let d = b - a;
    let len_sq = d.length_squared();
    if len_sq < DEGENERATE_LENGTH_SQ {
        return None;
    }
    let t = (point - a).dot(d) / len_sq;
    let closest = a + d * t;
    Some((t, point.distance(closest)))
}

/// Distance from `point` to the closest point on segment `a`-`b`.
pub fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let d = b - a;
    let len_sq = d.length_squared();
    if len_sq < DEGENERATE_LENGTH_SQ {
        return point.distance(a);
    }
    let t = ((point - a).dot(d) / len_sq).clamp(0.0, 1.0);
    point.distance(a + d * t)
}

/// Intersect the ray `origin + dir * s` (s ≥ 0) with segment `a`-`b`.
///
/// Returns the ray parameter `s`. With a unit `dir` this is the distance
/// along the ray. Parallel and degenerate cases yield `None`.
pub fn ray_segment_intersection(origin: Vec2, dir: Vec2, a: Vec2, b: Vec2) -> Option<f32> {
    let seg = b - a;
    if seg.length_squared() < DEGENERATE_LENGTH_SQ {
        return None;
    }
    let denom = dir.perp_dot(seg);
    if denom.abs() < 1e-9 {
        return None;
    }
    let rel = a - origin;
    let s = rel.perp_dot(seg) / denom;
    let u = rel.perp_dot(dir) / denom;
    if s >= 0.0 && (0.0..=1.0).contains(&u) {
        Some(s)
    } else {
        None
    }
}

/// Whether segments `p0`-`p1` and `a`-`b` properly cross.
pub fn segments_cross(p0: Vec2, p1: Vec2, a: Vec2, b: Vec2) -> bool {
    let dir = p1 - p0;
    match ray_segment_intersection(p0, dir, a, b) {
        Some(s) => s <= 1.0,
        None => false,
    }
}

/// Unit direction for a map angle in radians (0 = east, counter-clockwise).
#[inline]
pub fn angle_to_dir(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Axis-aligned bounding box in map space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec2,
    /// Maximum corner.
    pub max: Vec2,
}

impl Aabb {
    /// Box spanning two arbitrary corners.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Square box of half-size `radius` around `center`.
    pub fn around(center: Vec2, radius: f32) -> Self {
        let r = Vec2::splat(radius.max(0.0));
        Self {
            min: center - r,
            max: center + r,
        }
    }

    /// Smallest box containing all points, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.min = bounds.min.min(p);
            bounds.max = bounds.max.max(p);
        }
        Some(bounds)
    }

    /// Grow the box by `amount` on every side.
    pub fn expand(self, amount: f32) -> Self {
        let a = Vec2::splat(amount);
        Self {
            min: self.min - a,
            max: self.max + a,
        }
    }

    /// Whether `point` lies inside or on the boundary.
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}
