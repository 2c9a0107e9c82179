//! Hitscan weapons: pellet spread, wall occlusion and damage.

use dusk_core::geometry::{angle_to_dir, ray_segment_intersection};
use dusk_core::{Aabb, MapIndex};
use glam::Vec2;
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::damage::weapon_damage;
use crate::thing::{ThingArena, ThingId};

/// Maximum spread of single-shot bullet weapons, in radians (about 5.6°).
pub const BULLET_SPREAD: f32 = 0.098;
/// Reach of the fist.
pub const MELEE_RANGE: f32 = 64.0;
/// Reach of bullet weapons.
pub const MISSILE_RANGE: f32 = 2048.0;

/// Ammunition types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmmoKind {
    /// Pistol and chaingun rounds.
    Bullets,
    /// Shotgun shells.
    Shells,
}

impl AmmoKind {
    /// Carrying cap.
    pub fn max(self) -> u32 {
        match self {
            Self::Bullets => 200,
            Self::Shells => 50,
        }
    }
}

/// Player weapons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Bare hands.
    Fist,
    /// Starting sidearm.
    Pistol,
    /// Seven-pellet shotgun.
    Shotgun,
    /// Rapid-fire bullet weapon.
    Chaingun,
}

/// Static weapon tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponInfo {
    /// Display name.
    pub name: &'static str,
    /// Ammo consumed, if any.
    pub ammo: Option<AmmoKind>,
    /// Rounds per trigger pull.
    pub ammo_per_shot: u32,
    /// Rays per trigger pull.
    pub pellets: u32,
    /// Half-angle of the uniform deviation, in radians.
    pub spread: f32,
    /// Ray length.
    pub range: f32,
    /// Multiplied by a d8 per pellet.
    pub base_damage: i32,
    /// Seconds before the next shot.
    pub refire: f32,
}

impl WeaponKind {
    /// All weapons in slot order.
    pub const ALL: [Self; 4] = [Self::Fist, Self::Pistol, Self::Shotgun, Self::Chaingun];

    /// Selection slot, 1-based.
    pub fn slot(self) -> u8 {
        match self {
            Self::Fist => 1,
            Self::Pistol => 2,
            Self::Shotgun => 3,
            Self::Chaingun => 4,
        }
    }

    /// Tuning table entry.
    pub fn info(self) -> WeaponInfo {
        match self {
            Self::Fist => WeaponInfo {
                name: "fist",
                ammo: None,
                ammo_per_shot: 0,
                pellets: 1,
                spread: 0.0,
                range: MELEE_RANGE,
                base_damage: 2,
                refire: 14.0 / 35.0,
            },
            Self::Pistol => WeaponInfo {
                name: "pistol",
                ammo: Some(AmmoKind::Bullets),
                ammo_per_shot: 1,
                pellets: 1,
                spread: BULLET_SPREAD,
                range: MISSILE_RANGE,
                base_damage: 5,
                refire: 14.0 / 35.0,
            },
            Self::Shotgun => WeaponInfo {
                name: "shotgun",
                ammo: Some(AmmoKind::Shells),
                ammo_per_shot: 1,
                pellets: 7,
                spread: BULLET_SPREAD,
                range: MISSILE_RANGE,
                base_damage: 5,
                refire: 37.0 / 35.0,
            },
            Self::Chaingun => WeaponInfo {
                name: "chaingun",
                ammo: Some(AmmoKind::Bullets),
                ammo_per_shot: 1,
                pellets: 1,
                spread: BULLET_SPREAD,
                range: MISSILE_RANGE,
                base_damage: 5,
                refire: 4.0 / 35.0,
            },
        }
    }
}

/// What one pellet struck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PelletHit {
    /// A monster.
    Thing {
        /// Impact point.
        position: Vec2,
        /// Monster hit.
        thing: ThingId,
        /// Damage dealt.
        damage: i32,
        /// Distance along the ray.
        distance: f32,
    },
    /// A solid wall.
    Wall {
        /// Impact point.
        position: Vec2,
        /// Linedef hit.
        line: usize,
        /// Distance along the ray.
        distance: f32,
    },
    /// Nothing within range.
    Miss,
}

impl PelletHit {
    /// Distance to the impact, if any.
    pub fn distance(&self) -> Option<f32> {
        match self {
            Self::Thing { distance, .. } | Self::Wall { distance, .. } => Some(*distance),
            Self::Miss => None,
        }
    }
}

/// Result of one trigger pull.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShotReport {
    /// One entry per pellet.
    pub pellets: Vec<PelletHit>,
    /// Monsters this shot killed.
    pub kills: Vec<ThingId>,
}

impl ShotReport {
    /// Total damage dealt to things.
    pub fn total_damage(&self) -> i32 {
        self.pellets
            .iter()
            .map(|p| match p {
                PelletHit::Thing { damage, .. } => *damage,
                _ => 0,
            })
            .sum()
    }
}

/// Whether a linedef stops bullets: one-sided, or two-sided with no opening.
pub fn line_stops_hitscan(map: &MapIndex, line: usize) -> bool {
    match map.linedef(line) {
        Some(l) if !l.is_two_sided() => true,
        Some(_) => map.opening(line).is_none_or(|o| o.gap() <= 0.0),
        None => false,
    }
}

/// Nearest solid wall along a ray, as `(distance, line)`.
pub fn nearest_wall(map: &MapIndex, origin: Vec2, dir: Vec2, range: f32) -> Option<(f32, usize)> {
    let area = Aabb::from_corners(origin, origin + dir * range);
    map.query_block(area)
        .into_iter()
        .filter(|&line| line_stops_hitscan(map, line))
        .filter_map(|line| {
            let (a, b) = map.line_endpoints(line)?;
            let s = ray_segment_intersection(origin, dir, a, b)?;
            (s <= range).then_some((s, line))
        })
        .min_by(|x, y| x.0.total_cmp(&y.0))
}

fn nearest_thing(things: &ThingArena, origin: Vec2, dir: Vec2, range: f32) -> Option<(f32, ThingId)> {
    things
        .iter()
        .filter(|t| t.is_live_monster())
        .filter_map(|t| {
            let rel = t.pos2() - origin;
            let along = rel.dot(dir);
            if along <= 0.0 || along > range {
                return None;
            }
            (rel.perp_dot(dir).abs() <= t.radius).then_some((along, t.id))
        })
        .min_by(|x, y| x.0.total_cmp(&y.0))
}

/// Fire `weapon` from `origin` facing `angle`.
///
/// Each pellet deviates uniformly within the weapon's spread. The nearer of
/// the nearest live monster and the nearest solid wall wins, so walls
/// occlude monsters behind them. Damage lands immediately, so later pellets
/// of the same shot skip a monster the earlier ones killed.
pub fn fire_hitscan(
    weapon: WeaponKind,
    origin: Vec2,
    angle: f32,
    things: &mut ThingArena,
    map: &MapIndex,
    rng: &mut StdRng,
) -> ShotReport {
    let info = weapon.info();
    let mut report = ShotReport::default();

    for _ in 0..info.pellets {
        let deviation = if info.spread > 0.0 {
            rng.random_range(-info.spread..=info.spread)
        } else {
            0.0
        };
        let dir = angle_to_dir(angle + deviation);
        let wall = nearest_wall(map, origin, dir, info.range);
        let thing = nearest_thing(things, origin, dir, info.range);

        let hit = match (thing, wall) {
            (Some((td, id)), w) if w.is_none_or(|(wd, _)| td < wd) => {
                let damage = weapon_damage(info.base_damage, rng);
                if let Some(target) = things.get_mut(id) {
                    if target.apply_damage(damage) {
                        debug!(thing = %id, weapon = info.name, "monster killed");
                        report.kills.push(id);
                    }
                }
                PelletHit::Thing {
                    position: origin + dir * td,
                    thing: id,
                    damage,
                    distance: td,
                }
            }
            (_, Some((wd, line))) => PelletHit::Wall {
                position: origin + dir * wd,
                line,
                distance: wd,
            },
            _ => PelletHit::Miss,
        };
        report.pellets.push(hit);
    }
    report
}
