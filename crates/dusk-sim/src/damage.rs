//! Random damage rolls.

use rand::Rng;
use rand::rngs::StdRng;

/// Sides of the die that scales weapon base damage.
pub const WEAPON_DIE: i32 = 8;

/// `count` dice of `sides` sides, summed and multiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Damage {
    /// Number of dice.
    pub count: u32,
    /// Sides per die.
    pub sides: u32,
    /// Multiplier applied to the sum.
    pub multiplier: i32,
}

impl Damage {
    /// A roll of `count`d`sides` × `multiplier`.
    pub const fn new(count: u32, sides: u32, multiplier: i32) -> Self {
        Self {
            count,
            sides,
            multiplier,
        }
    }

    /// Smallest possible result.
    pub fn min(&self) -> i32 {
        self.count as i32 * self.multiplier
    }

    /// Largest possible result.
    pub fn max(&self) -> i32 {
        (self.count * self.sides) as i32 * self.multiplier
    }

    /// Roll using the given RNG.
    pub fn roll(&self, rng: &mut StdRng) -> i32 {
        if self.sides == 0 {
            return 0;
        }
        let sum: u32 = (0..self.count)
            .map(|_| rng.random_range(1..=self.sides))
            .sum();
        sum as i32 * self.multiplier
    }
}

/// Hitscan damage: `base × uniform[1, 8]`.
pub fn weapon_damage(base: i32, rng: &mut StdRng) -> i32 {
    base * rng.random_range(1..=WEAPON_DIE)
}
