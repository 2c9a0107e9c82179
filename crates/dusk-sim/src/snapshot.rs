//! Read-only views of the simulation for presentation and persistence.

use dusk_core::SectorHeights;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::player::{ArmorClass, Inventory, Player};
use crate::thing::{Thing, ThingId, ThingKind, ThingState};

/// Everything a presentation layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Level name.
    pub map: String,
    /// Current tick.
    pub tick: u64,
    /// Simulation time in seconds.
    pub time: f64,
    /// The player.
    pub player: Player,
    /// Live things in id order.
    pub things: Vec<Thing>,
    /// Current plane heights, indexed by sector.
    pub sectors: Vec<SectorHeights>,
    /// Whether the automap overlay is shown.
    pub automap: bool,
    /// Smoothed frames per second, 0 when not measured.
    pub fps: f32,
}

/// Persistent player state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSave {
    /// Position, `z` on the floor.
    pub position: Vec3,
    /// Facing in radians.
    pub angle: f32,
    /// Hit points.
    pub health: i32,
    /// Armor points.
    pub armor: i32,
    /// Armor strength.
    pub armor_class: ArmorClass,
    /// Weapons, ammo and keys.
    pub inventory: Inventory,
}

impl From<&Player> for PlayerSave {
    fn from(player: &Player) -> Self {
        Self {
            position: player.position,
            angle: player.angle,
            health: player.health,
            armor: player.armor,
            armor_class: player.armor_class,
            inventory: player.inventory.clone(),
        }
    }
}

/// Persistent state of one thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThingSave {
    /// Arena id.
    pub id: ThingId,
    /// Resolved type.
    pub kind: ThingKind,
    /// Planar position.
    pub position: Vec2,
    /// Facing in radians.
    pub angle: f32,
    /// Hit points.
    pub health: i32,
    /// Behaviour state.
    pub state: ThingState,
}

impl From<&Thing> for ThingSave {
    fn from(thing: &Thing) -> Self {
        Self {
            id: thing.id,
            kind: thing.kind,
            position: thing.pos2(),
            angle: thing.angle,
            health: thing.health,
            state: thing.state,
        }
    }
}

/// The state a save file records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Level name.
    pub map: String,
    /// Tick the save was taken at.
    pub tick: u64,
    /// The player.
    pub player: PlayerSave,
    /// Live things in id order.
    pub things: Vec<ThingSave>,
    /// Plane heights, indexed by sector.
    pub sectors: Vec<SectorHeights>,
}

impl SaveData {
    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a save document.
    pub fn from_json(text: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
