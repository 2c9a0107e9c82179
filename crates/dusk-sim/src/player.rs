//! The local player: body, stats and inventory.

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::PlayerConfig;
use crate::weapon::{AmmoKind, WeaponKind};

/// Health cap for ordinary healing.
pub const MAX_HEALTH: i32 = 100;
/// Health cap for bonuses.
pub const MAX_SOUL_HEALTH: i32 = 200;

bitflags::bitflags! {
    /// Keycards held, or the key a locked special demands.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeySet: u8 {
        /// Blue keycard.
        const BLUE = 0b001;
        /// Yellow keycard.
        const YELLOW = 0b010;
        /// Red keycard.
        const RED = 0b100;
    }
}

impl fmt::Display for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::BLUE, "blue"),
            (Self::YELLOW, "yellow"),
            (Self::RED, "red"),
        ]
        .into_iter()
        .filter(|(k, _)| self.contains(*k))
        .map(|(_, name)| name)
        .collect();
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join("+"))
        }
    }
}

impl Serialize for KeySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KeySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u8::deserialize(deserializer).map(Self::from_bits_truncate)
    }
}

/// Armor strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArmorClass {
    /// No armor.
    #[default]
    None,
    /// Absorbs a third of incoming damage.
    Green,
    /// Absorbs half of incoming damage.
    Blue,
}

impl ArmorClass {
    /// Portion of `raw` damage this class would absorb.
    pub fn absorbed(self, raw: i32) -> i32 {
        match self {
            Self::None => 0,
            Self::Green => raw / 3,
            Self::Blue => raw / 2,
        }
    }
}

/// Weapons, ammo and keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    /// Owned weapons in slot order.
    pub weapons: Vec<WeaponKind>,
    /// Weapon in hand.
    pub ready: WeaponKind,
    /// Pistol and chaingun rounds.
    pub bullets: u32,
    /// Shotgun shells.
    pub shells: u32,
    /// Keycards.
    pub keys: KeySet,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            weapons: vec![WeaponKind::Fist, WeaponKind::Pistol],
            ready: WeaponKind::Pistol,
            bullets: 50,
            shells: 0,
            keys: KeySet::empty(),
        }
    }
}

impl Inventory {
    /// Whether `weapon` is owned.
    pub fn has_weapon(&self, weapon: WeaponKind) -> bool {
        self.weapons.contains(&weapon)
    }

    /// Add a weapon. Returns `true` if it was new.
    pub fn give_weapon(&mut self, weapon: WeaponKind) -> bool {
        if self.has_weapon(weapon) {
            return false;
        }
        self.weapons.push(weapon);
        self.weapons.sort_by_key(|w| w.slot());
        true
    }

    /// Rounds held of `ammo`.
    pub fn ammo(&self, ammo: AmmoKind) -> u32 {
        match ammo {
            AmmoKind::Bullets => self.bullets,
            AmmoKind::Shells => self.shells,
        }
    }

    fn ammo_mut(&mut self, ammo: AmmoKind) -> &mut u32 {
        match ammo {
            AmmoKind::Bullets => &mut self.bullets,
            AmmoKind::Shells => &mut self.shells,
        }
    }

    /// Add ammo up to the type's cap. Returns `false` when already full.
    pub fn give_ammo(&mut self, ammo: AmmoKind, amount: u32) -> bool {
        let max = ammo.max();
        let held = self.ammo_mut(ammo);
        if *held >= max {
            return false;
        }
        *held = (*held + amount).min(max);
        true
    }

    /// Whether the ready weapon has enough ammo for one shot.
    pub fn can_fire(&self) -> bool {
        let info = self.ready.info();
        match info.ammo {
            Some(ammo) => self.ammo(ammo) >= info.ammo_per_shot,
            None => true,
        }
    }

    /// Spend one shot of ammo for the ready weapon.
    pub fn spend_shot(&mut self) -> bool {
        if !self.can_fire() {
            return false;
        }
        let info = self.ready.info();
        if let Some(ammo) = info.ammo {
            *self.ammo_mut(ammo) -= info.ammo_per_shot;
        }
        true
    }

    /// Ready `weapon` if owned. Returns `true` when it changed.
    pub fn select(&mut self, weapon: WeaponKind) -> bool {
        if !self.has_weapon(weapon) || self.ready == weapon {
            return false;
        }
        self.ready = weapon;
        true
    }
}

/// The local participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Position; `z` is the floor under the player.
    pub position: Vec3,
    /// Facing in radians, 0 = east.
    pub angle: f32,
    /// Planar momentum in units per tic.
    pub momentum: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Body height.
    pub height: f32,
    /// Eye height above `position.z`.
    pub view_height: f32,
    /// Hit points.
    pub health: i32,
    /// Armor points.
    pub armor: i32,
    /// Armor strength.
    pub armor_class: ArmorClass,
    /// Weapons, ammo and keys.
    pub inventory: Inventory,
    /// `false` once health reaches 0.
    pub alive: bool,
    /// Seconds until the ready weapon can fire again.
    pub refire: f32,
    /// Enclosing sector.
    pub sector: Option<usize>,
}

impl Player {
    /// A fresh player at a spawn point.
    pub fn spawn(config: &PlayerConfig, position: Vec2, angle: f32) -> Self {
        Self {
            position: position.extend(0.0),
            angle,
            momentum: Vec2::ZERO,
            radius: config.radius,
            height: config.height,
            view_height: config.view_height,
            health: config.start_health,
            armor: 0,
            armor_class: ArmorClass::None,
            inventory: Inventory::default(),
            alive: true,
            refire: 0.0,
            sector: None,
        }
    }

    /// Position on the map plane.
    pub fn pos2(&self) -> Vec2 {
        self.position.truncate()
    }

    /// Eye position.
    pub fn eye(&self) -> Vec3 {
        self.position + Vec3::Z * self.view_height
    }

    /// Apply `raw` damage through armor. Returns the health lost.
    pub fn take_damage(&mut self, raw: i32) -> i32 {
        if !self.alive || raw <= 0 {
            return 0;
        }
        let absorbed = self.armor_class.absorbed(raw).min(self.armor);
        self.armor -= absorbed;
        if self.armor == 0 {
            self.armor_class = ArmorClass::None;
        }
        let before = self.health;
        self.health = (self.health - (raw - absorbed)).max(0);
        if self.health == 0 {
            self.alive = false;
            self.momentum = Vec2::ZERO;
        }
        before - self.health
    }

    /// Heal by `amount` without exceeding `cap`. Returns the health gained.
    pub fn heal(&mut self, amount: i32, cap: i32) -> i32 {
        let before = self.health;
        if before < cap {
            self.health = (before + amount).min(cap);
        }
        self.health - before
    }

    /// Equip armor if it is an upgrade. Returns `true` when taken.
    pub fn give_armor(&mut self, class: ArmorClass, points: i32) -> bool {
        if self.armor >= points {
            return false;
        }
        self.armor = points;
        self.armor_class = class;
        true
    }
}
