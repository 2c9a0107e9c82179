//! Linedef special catalogue.
//!
//! A deliberately partial table using the classic numbering. Specials not
//! listed here are inert.

use serde::{Deserialize, Serialize};

use crate::player::KeySet;

/// What a special does to its target sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Raise the ceiling, dwell, lower it back.
    OpenWaitClose,
    /// Raise the ceiling and leave it.
    OpenStay,
    /// Lower the ceiling to the floor and leave it.
    CloseStay,
    /// Raise the floor to the ceiling.
    RaiseFloorToCeiling,
    /// Lower the floor to the lowest neighbouring floor.
    LowerFloorToLowest,
}

impl ActionKind {
    /// Short label for logs and tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::OpenWaitClose => "door open-wait-close",
            Self::OpenStay => "door open",
            Self::CloseStay => "door close",
            Self::RaiseFloorToCeiling => "floor raise",
            Self::LowerFloorToLowest => "floor lower",
        }
    }
}

/// How a special is set off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Pressing use on the line (doors and switches).
    Use,
    /// Crossing the line.
    Walk,
}

/// Which sectors a special acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Targeting {
    /// The sector on the far side of the line from the activator.
    Manual,
    /// Every sector sharing the line's non-zero tag.
    Tagged,
}

/// One catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialInfo {
    /// Special number.
    pub special: u16,
    /// Effect on the target sectors.
    pub kind: ActionKind,
    /// Activation method.
    pub trigger: Trigger,
    /// `false` for once-only lines.
    pub repeatable: bool,
    /// Target selection.
    pub targeting: Targeting,
    /// Key required, empty for unlocked lines.
    pub key: KeySet,
}

const fn entry(
    special: u16,
    kind: ActionKind,
    trigger: Trigger,
    repeatable: bool,
    targeting: Targeting,
    key: KeySet,
) -> SpecialInfo {
    SpecialInfo {
        special,
        kind,
        trigger,
        repeatable,
        targeting,
        key,
    }
}

use ActionKind::*;
use Targeting::*;
use Trigger::*;

const NONE: KeySet = KeySet::empty();

/// The supported specials.
pub const CATALOGUE: &[SpecialInfo] = &[
    // Manual doors
    entry(1, OpenWaitClose, Use, true, Manual, NONE),
    entry(26, OpenWaitClose, Use, true, Manual, KeySet::BLUE),
    entry(27, OpenWaitClose, Use, true, Manual, KeySet::YELLOW),
    entry(28, OpenWaitClose, Use, true, Manual, KeySet::RED),
    entry(31, OpenStay, Use, false, Manual, NONE),
    entry(32, OpenStay, Use, false, Manual, KeySet::BLUE),
    entry(33, OpenStay, Use, false, Manual, KeySet::RED),
    entry(34, OpenStay, Use, false, Manual, KeySet::YELLOW),
    // Remote doors
    entry(4, OpenWaitClose, Walk, false, Tagged, NONE),
    entry(29, OpenWaitClose, Use, false, Tagged, NONE),
    entry(63, OpenWaitClose, Use, true, Tagged, NONE),
    entry(90, OpenWaitClose, Walk, true, Tagged, NONE),
    entry(2, OpenStay, Walk, false, Tagged, NONE),
    entry(103, OpenStay, Use, false, Tagged, NONE),
    entry(86, OpenStay, Walk, true, Tagged, NONE),
    entry(3, CloseStay, Walk, false, Tagged, NONE),
    entry(50, CloseStay, Use, false, Tagged, NONE),
    // Floors
    entry(5, RaiseFloorToCeiling, Walk, false, Tagged, NONE),
    entry(101, RaiseFloorToCeiling, Use, false, Tagged, NONE),
    entry(91, RaiseFloorToCeiling, Walk, true, Tagged, NONE),
    entry(38, LowerFloorToLowest, Walk, false, Tagged, NONE),
    entry(23, LowerFloorToLowest, Use, false, Tagged, NONE),
];

/// Look up a special number.
pub fn lookup(special: u16) -> Option<&'static SpecialInfo> {
    CATALOGUE.iter().find(|s| s.special == special)
}
