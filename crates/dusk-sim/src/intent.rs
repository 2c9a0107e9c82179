use serde::{Deserialize, Serialize};

use crate::weapon::WeaponKind;

/// One tick's worth of player input, already mapped from devices.
///
/// Axes are in `[-1, 1]`: `forward` positive moves ahead, `strafe` positive
/// moves right, `turn` positive turns left (counter-clockwise).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerIntent {
    /// Forward/backward axis.
    pub forward: f32,
    /// Right/left axis.
    pub strafe: f32,
    /// Turn axis.
    pub turn: f32,
    /// Trigger held.
    pub fire: bool,
    /// Use pressed this tick.
    pub use_line: bool,
    /// Run modifier held.
    pub run: bool,
    /// Weapon switch requested this tick.
    pub select_weapon: Option<WeaponKind>,
    /// Automap toggle pressed this tick.
    pub toggle_automap: bool,
}

impl PlayerIntent {
    /// Intent that just walks forward.
    pub fn forward(amount: f32) -> Self {
        Self {
            forward: amount,
            ..Self::default()
        }
    }

    /// Intent that only presses use.
    pub fn use_line() -> Self {
        Self {
            use_line: true,
            ..Self::default()
        }
    }

    /// Intent that only holds the trigger.
    pub fn fire() -> Self {
        Self {
            fire: true,
            ..Self::default()
        }
    }

    /// Axes clamped to `[-1, 1]`, with non-finite values read as 0.
    pub fn normalized(self) -> Self {
        let axis = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        Self {
            forward: axis(self.forward),
            strafe: axis(self.strafe),
            turn: axis(self.turn),
            ..self
        }
    }

    /// The same intent with one-shot presses cleared.
    ///
    /// Held controls (axes, fire, run) carry over; use, weapon select and
    /// automap toggle fire once per frame.
    pub fn without_impulses(self) -> Self {
        Self {
            use_line: false,
            select_weapon: None,
            toggle_automap: false,
            ..self
        }
    }
}
