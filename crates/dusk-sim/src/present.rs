//! Write-only interface to a presentation layer.
//!
//! The simulation never reads anything back from a [`Presenter`]. Walls are
//! handed over in BSP front-to-back order, sprites far-to-near, then the
//! HUD.

use dusk_core::MapIndex;
use dusk_core::geometry::{Side, point_on_side};
use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::error::{SimError, SimResult};
use crate::player::KeySet;
use crate::simulation::Simulation;
use crate::thing::{ThingId, ThingKind, ThingState};
use crate::weapon::WeaponKind;

/// Viewpoint for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    /// Eye position.
    pub position: Vec3,
    /// View direction in radians.
    pub angle: f32,
    /// Sector the eye is in.
    pub sector: Option<usize>,
}

/// One seg facing the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WallDraw {
    /// Seg index.
    pub seg: usize,
    /// Linedef the seg lies on.
    pub linedef: usize,
    /// Seg start.
    pub start: Vec2,
    /// Seg end.
    pub end: Vec2,
    /// Sector on the seg's front.
    pub front_sector: Option<usize>,
    /// Sector behind a two-sided seg.
    pub back_sector: Option<usize>,
}

/// One thing to draw as a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpriteDraw {
    /// The thing.
    pub thing: ThingId,
    /// What it is.
    pub kind: ThingKind,
    /// Behaviour state, for frame selection.
    pub state: ThingState,
    /// World position.
    pub position: Vec3,
    /// Facing in radians.
    pub angle: f32,
    /// Planar distance from the camera.
    pub distance: f32,
}

/// Status bar contents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HudState {
    /// Health.
    pub health: i32,
    /// Armor points.
    pub armor: i32,
    /// Weapon in hand.
    pub weapon: WeaponKind,
    /// Ammo for the weapon in hand, `None` for the fist.
    pub ammo: Option<u32>,
    /// Keycards held.
    pub keys: KeySet,
    /// Automap overlay toggled on.
    pub automap: bool,
}

/// Receives draw calls for one frame at a time.
pub trait Presenter {
    /// A frame begins.
    fn begin_frame(&mut self, camera: &Camera);
    /// A visible wall seg, nearer segs first.
    fn draw_wall(&mut self, wall: &WallDraw);
    /// A thing, farther things first.
    fn draw_sprite(&mut self, sprite: &SpriteDraw);
    /// The status bar.
    fn draw_hud(&mut self, hud: &HudState);
    /// The frame is complete.
    fn end_frame(&mut self) {}
}

/// Presenter that only counts what it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrameTally {
    /// Frames presented.
    pub frames: u64,
    /// Wall draws in the last frame.
    pub walls: usize,
    /// Sprite draws in the last frame.
    pub sprites: usize,
    /// Wall draws over all frames.
    pub total_walls: u64,
    /// Sprite draws over all frames.
    pub total_sprites: u64,
}

impl Presenter for FrameTally {
    fn begin_frame(&mut self, _camera: &Camera) {
        self.walls = 0;
        self.sprites = 0;
    }

    fn draw_wall(&mut self, _wall: &WallDraw) {
        self.walls += 1;
        self.total_walls += 1;
    }

    fn draw_sprite(&mut self, _sprite: &SpriteDraw) {
        self.sprites += 1;
        self.total_sprites += 1;
    }

    fn draw_hud(&mut self, _hud: &HudState) {}

    fn end_frame(&mut self) {
        self.frames += 1;
    }
}

fn wall_draw(map: &MapIndex, seg: usize, view: Vec2) -> Option<WallDraw> {
    let data = map.map();
    let s = data.segs.get(seg)?;
    let start = data.vertex(s.start)?;
    let end = data.vertex(s.end)?;
    if point_on_side(view, start, end - start) != Side::Front {
        return None;
    }
    let (right, left) = map.line_sectors(s.linedef);
    let (front_sector, back_sector) = if s.direction == 0 {
        (right, left)
    } else {
        (left, right)
    };
    Some(WallDraw {
        seg,
        linedef: s.linedef,
        start,
        end,
        front_sector,
        back_sector,
    })
}

/// Hand the current state of `sim` to `presenter` as one frame.
pub fn present_frame(sim: &Simulation, presenter: &mut impl Presenter) -> SimResult<()> {
    let level = sim.level().ok_or(SimError::NoActiveLevel)?;
    let map = level.map();
    let player = level.player();
    let view = player.pos2();

    presenter.begin_frame(&Camera {
        position: player.eye(),
        angle: player.angle,
        sector: player.sector,
    });

    let data = map.map();
    map.walk_front_to_back(view, |subsector| {
        let Some(ss) = data.subsectors.get(subsector) else {
            return;
        };
        let end = ss.first_seg.saturating_add(ss.seg_count).min(data.segs.len());
        for seg in ss.first_seg..end {
            if let Some(wall) = wall_draw(map, seg, view) {
                presenter.draw_wall(&wall);
            }
        }
    });

    let mut sprites: Vec<SpriteDraw> = level
        .things()
        .iter()
        .map(|t| SpriteDraw {
            thing: t.id,
            kind: t.kind,
            state: t.state,
            position: t.position,
            angle: t.angle,
            distance: t.pos2().distance(view),
        })
        .collect();
    sprites.sort_by(|a, b| b.distance.total_cmp(&a.distance));
    for sprite in &sprites {
        presenter.draw_sprite(sprite);
    }

    let inv = &player.inventory;
    presenter.draw_hud(&HudState {
        health: player.health,
        armor: player.armor,
        weapon: inv.ready,
        ammo: inv.ready.info().ammo.map(|a| inv.ammo(a)),
        keys: inv.keys,
        automap: sim.automap(),
    });
    presenter.end_frame();
    Ok(())
}
