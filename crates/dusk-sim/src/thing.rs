//! Placed entities and the arena that owns them.
//!
//! Things are created only from level spawn data. Ids are slot indices that
//! are never reused within a level; a removed thing leaves a tombstone.

use std::fmt;

use dusk_core::ThingSpawn;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::damage::Damage;

/// Stable handle to a thing within one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThingId(pub u32);

impl fmt::Display for ThingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monster species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    /// Former human with a pistol.
    Zombieman,
    /// Former sergeant with a shotgun.
    ShotgunGuy,
    /// Fireball-throwing imp.
    Imp,
    /// Pink demon.
    Demon,
}

/// Static per-species tuning. Speeds in units per second, times in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonsterInfo {
    /// Display name.
    pub name: &'static str,
    /// Spawn health.
    pub health: i32,
    /// Collision radius.
    pub radius: f32,
    /// Body height.
    pub height: f32,
    /// Chase speed.
    pub speed: f32,
    /// Distance at which the player is noticed.
    pub aggro_range: f32,
    /// Distance at which the monster stops and attacks.
    pub melee_range: f32,
    /// Time between attacks while in melee range.
    pub attack_interval: f32,
    /// Damage per attack.
    pub damage: Damage,
}

impl MonsterKind {
    /// Species for an editor number.
    pub fn from_doomednum(doomednum: u16) -> Option<Self> {
        match doomednum {
            3004 => Some(Self::Zombieman),
            9 => Some(Self::ShotgunGuy),
            3001 => Some(Self::Imp),
            3002 => Some(Self::Demon),
            _ => None,
        }
    }

    /// Tuning table entry.
    pub fn info(self) -> MonsterInfo {
        match self {
            Self::Zombieman => MonsterInfo {
                name: "zombieman",
                health: 20,
                radius: 20.0,
                height: 56.0,
                speed: 70.0,
                aggro_range: 768.0,
                melee_range: 64.0,
                attack_interval: 1.0,
                damage: Damage::new(1, 5, 3),
            },
            Self::ShotgunGuy => MonsterInfo {
                name: "shotgun guy",
                health: 30,
                radius: 20.0,
                height: 56.0,
                speed: 70.0,
                aggro_range: 768.0,
                melee_range: 64.0,
                attack_interval: 1.2,
                damage: Damage::new(3, 5, 3),
            },
            Self::Imp => MonsterInfo {
                name: "imp",
                health: 60,
                radius: 20.0,
                height: 56.0,
                speed: 90.0,
                aggro_range: 1024.0,
                melee_range: 64.0,
                attack_interval: 0.9,
                damage: Damage::new(1, 8, 3),
            },
            Self::Demon => MonsterInfo {
                name: "demon",
                health: 150,
                radius: 30.0,
                height: 56.0,
                speed: 140.0,
                aggro_range: 512.0,
                melee_range: 64.0,
                attack_interval: 0.6,
                damage: Damage::new(1, 10, 4),
            },
        }
    }
}

/// Pickup types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// +10 health.
    Stimpack,
    /// +25 health.
    Medikit,
    /// +1 health up to 200.
    HealthBonus,
    /// 100 armor, class 1.
    GreenArmor,
    /// 200 armor, class 2.
    BlueArmor,
    /// 10 bullets.
    Clip,
    /// 4 shells.
    Shells,
    /// Shotgun with 8 shells.
    Shotgun,
    /// Chaingun with 20 bullets.
    Chaingun,
    /// Blue keycard.
    BlueKey,
    /// Yellow keycard.
    YellowKey,
    /// Red keycard.
    RedKey,
}

impl ItemKind {
    /// Pickup radius shared by all items.
    pub const RADIUS: f32 = 20.0;

    /// Item for an editor number.
    pub fn from_doomednum(doomednum: u16) -> Option<Self> {
        match doomednum {
            2011 => Some(Self::Stimpack),
            2012 => Some(Self::Medikit),
            2014 => Some(Self::HealthBonus),
            2018 => Some(Self::GreenArmor),
            2019 => Some(Self::BlueArmor),
            2007 => Some(Self::Clip),
            2008 => Some(Self::Shells),
            2001 => Some(Self::Shotgun),
            2002 => Some(Self::Chaingun),
            5 => Some(Self::BlueKey),
            6 => Some(Self::YellowKey),
            13 => Some(Self::RedKey),
            _ => None,
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Stimpack => "stimpack",
            Self::Medikit => "medikit",
            Self::HealthBonus => "health bonus",
            Self::GreenArmor => "green armor",
            Self::BlueArmor => "blue armor",
            Self::Clip => "clip",
            Self::Shells => "shells",
            Self::Shotgun => "shotgun",
            Self::Chaingun => "chaingun",
            Self::BlueKey => "blue keycard",
            Self::YellowKey => "yellow keycard",
            Self::RedKey => "red keycard",
        }
    }
}

/// What a thing is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThingKind {
    /// An AI-driven enemy.
    Monster(MonsterKind),
    /// Something the player can pick up.
    Item(ItemKind),
    /// Scenery, identified by its editor number.
    Decoration(u16),
}

impl ThingKind {
    /// Editor numbers consumed by the level itself rather than spawned.
    const RESERVED: [u16; 5] = [1, 2, 3, 4, 11];

    /// Resolve an editor number. Player starts and deathmatch spots yield
    /// `None`; anything unrecognised is a decoration.
    pub fn from_doomednum(doomednum: u16) -> Option<Self> {
        if Self::RESERVED.contains(&doomednum) {
            return None;
        }
        Some(
            MonsterKind::from_doomednum(doomednum)
                .map(Self::Monster)
                .or_else(|| ItemKind::from_doomednum(doomednum).map(Self::Item))
                .unwrap_or(Self::Decoration(doomednum)),
        )
    }

    /// Short label for tables and logs.
    pub fn label(&self) -> String {
        match self {
            Self::Monster(m) => m.info().name.to_string(),
            Self::Item(i) => i.name().to_string(),
            Self::Decoration(n) => format!("decoration {n}"),
        }
    }
}

/// Behaviour state. Items and decorations stay `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ThingState {
    /// Waiting.
    #[default]
    Idle,
    /// Moving toward the target.
    Chase,
    /// In attack range.
    Melee,
    /// Terminal. The corpse stays in the arena.
    Dead,
}

/// Who a monster is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// The local player.
    Player,
}

/// A live entity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    /// Arena id.
    pub id: ThingId,
    /// Resolved type.
    pub kind: ThingKind,
    /// Editor number it was spawned from.
    pub doomednum: u16,
    /// Position; `z` is the floor the thing stands on.
    pub position: Vec3,
    /// Facing in radians.
    pub angle: f32,
    /// Velocity in units per second.
    pub velocity: Vec3,
    /// Behaviour state.
    pub state: ThingState,
    /// Hit points; 0 for items and decorations.
    pub health: i32,
    /// Collision radius.
    pub radius: f32,
    /// Body height.
    pub height: f32,
    /// Enclosing sector, refreshed every commit.
    pub sector: Option<usize>,
    /// Current target.
    pub target: Option<Target>,
    /// Seconds accumulated toward the next attack.
    pub attack_timer: f32,
}

impl Thing {
    /// Position on the map plane.
    pub fn pos2(&self) -> Vec2 {
        self.position.truncate()
    }

    /// Whether this is a monster that has not died.
    pub fn is_live_monster(&self) -> bool {
        matches!(self.kind, ThingKind::Monster(_)) && self.state != ThingState::Dead
    }

    /// Species tuning for monsters.
    pub fn monster_info(&self) -> Option<MonsterInfo> {
        match self.kind {
            ThingKind::Monster(m) => Some(m.info()),
            _ => None,
        }
    }

    /// Subtract health, clamping at 0. Returns `true` when this killed it.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if self.state == ThingState::Dead {
            return false;
        }
        self.health = (self.health - amount).max(0);
        if self.health == 0 {
            self.state = ThingState::Dead;
            self.velocity = Vec3::ZERO;
            self.target = None;
            self.attack_timer = 0.0;
            return true;
        }
        false
    }
}

/// Slot arena of things with deferred removal.
#[derive(Debug, Clone, Default)]
pub struct ThingArena {
    slots: Vec<Option<Thing>>,
    pending: Vec<ThingId>,
}

impl ThingArena {
    /// An empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn everything placeable from a level's spawn list.
    pub fn from_spawns(spawns: &[ThingSpawn]) -> Self {
        let mut arena = Self::new();
        for spawn in spawns {
            if let Some(kind) = ThingKind::from_doomednum(spawn.doomednum) {
                arena.spawn(kind, spawn);
            }
        }
        arena
    }

    /// Create a thing from spawn data.
    pub fn spawn(&mut self, kind: ThingKind, spawn: &ThingSpawn) -> ThingId {
        let id = ThingId(self.slots.len() as u32);
        let (health, radius, height) = match kind {
            ThingKind::Monster(m) => {
                let info = m.info();
                (info.health, info.radius, info.height)
            }
            ThingKind::Item(_) => (0, ItemKind::RADIUS, 16.0),
            ThingKind::Decoration(_) => (0, 16.0, 16.0),
        };
        self.slots.push(Some(Thing {
            id,
            kind,
            doomednum: spawn.doomednum,
            position: Vec3::new(spawn.x, spawn.y, 0.0),
            angle: spawn.angle.to_radians(),
            velocity: Vec3::ZERO,
            state: ThingState::Idle,
            health,
            radius,
            height,
            sector: None,
            target: None,
            attack_timer: 0.0,
        }));
        id
    }

    /// A live thing.
    pub fn get(&self, id: ThingId) -> Option<&Thing> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    /// A live thing, mutably.
    pub fn get_mut(&mut self, id: ThingId) -> Option<&mut Thing> {
        self.slots.get_mut(id.0 as usize)?.as_mut()
    }

    /// Live things in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Thing> {
        self.slots.iter().flatten()
    }

    /// Live things in id order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Thing> {
        self.slots.iter_mut().flatten()
    }

    /// Number of live things.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether no thing is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is scheduled for removal at the next commit.
    pub fn is_pending_removal(&self, id: ThingId) -> bool {
        self.pending.contains(&id)
    }

    /// Schedule removal. The record stays readable until [`Self::commit`].
    pub fn remove(&mut self, id: ThingId) {
        if self.get(id).is_none() {
            warn!(thing = %id, "removal of a thing that is not live");
            return;
        }
        if !self.pending.contains(&id) {
            self.pending.push(id);
        }
    }

    /// Tombstone every pending removal. Returns the removed ids.
    pub fn commit(&mut self) -> Vec<ThingId> {
        let removed = std::mem::take(&mut self.pending);
        for id in &removed {
            if let Some(slot) = self.slots.get_mut(id.0 as usize) {
                *slot = None;
            }
        }
        removed
    }
}
