//! Door and floor movers.
//!
//! Each sector owns at most one action, held in an `Option` slot aligned
//! with the sector array. An empty slot is the idle state.

use dusk_core::{MapIndex, Side};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SectorActionConfig;
use crate::player::KeySet;
use crate::special::{self, ActionKind, Targeting, Trigger};

/// Which plane an action moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plane {
    /// The floor.
    Floor,
    /// The ceiling.
    Ceiling,
}

/// Phase of a live action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionState {
    /// The plane is travelling toward `target_height`.
    Moving,
    /// An open door is dwelling before it closes.
    Waiting,
}

/// A running plane mover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorAction {
    /// Sector being moved.
    pub sector: usize,
    /// Behaviour.
    pub kind: ActionKind,
    /// Current phase.
    pub state: ActionState,
    /// Plane being moved.
    pub plane: Plane,
    /// Units per second.
    pub speed: f32,
    /// Height the plane is heading for.
    pub target_height: f32,
    /// Plane height when the action started.
    pub original_height: f32,
    /// Dwell length in seconds.
    pub wait_time: f32,
    /// Seconds spent in the current dwell.
    pub current_time: f32,
    /// Set once an open-wait-close door heads back.
    pub returning: bool,
}

/// How a line was set off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    /// Use or walk-over.
    pub trigger: Trigger,
    /// Side of the line the activator stands on.
    pub side: Side,
    /// Keys the activator holds.
    pub keys: KeySet,
}

/// Result of [`SectorActionManager::activate_linedef`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Nothing happened: no special, unknown special, wrong trigger or a
    /// spent once-only line.
    Inert,
    /// The special needs a key the activator lacks.
    Locked(KeySet),
    /// Every target already had an action, or none matched.
    NoTarget,
    /// Actions started on these sectors.
    Started(Vec<usize>),
}

/// Something observable a mover did during [`SectorActionManager::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorActionEvent {
    /// An open-wait-close door reached its top and began waiting.
    Waiting {
        /// The door sector.
        sector: usize,
    },
    /// A waiting door started back down.
    Reversed {
        /// The door sector.
        sector: usize,
    },
    /// An action arrived for good and was removed.
    Finished {
        /// The sector that stopped.
        sector: usize,
        /// What it was doing.
        kind: ActionKind,
    },
}

/// Owns every sector's action slot and the spent once-only lines.
#[derive(Debug, Clone)]
pub struct SectorActionManager {
    slots: Vec<Option<SectorAction>>,
    spent: Vec<bool>,
    config: SectorActionConfig,
}

impl SectorActionManager {
    /// Empty slots for `map`.
    pub fn new(map: &MapIndex, config: SectorActionConfig) -> Self {
        Self {
            slots: vec![None; map.sectors().len()],
            spent: vec![false; map.linedef_count()],
            config,
        }
    }

    /// Action on `sector`, if any.
    pub fn action(&self, sector: usize) -> Option<&SectorAction> {
        self.slots.get(sector)?.as_ref()
    }

    /// Running actions in sector order.
    pub fn iter(&self) -> impl Iterator<Item = &SectorAction> {
        self.slots.iter().flatten()
    }

    /// Number of running actions.
    pub fn active_count(&self) -> usize {
        self.iter().count()
    }

    /// Whether a once-only line has already fired.
    pub fn is_spent(&self, line: usize) -> bool {
        self.spent.get(line).copied().unwrap_or(false)
    }

    /// Fire a linedef's special.
    pub fn activate_linedef(
        &mut self,
        map: &MapIndex,
        line: usize,
        activation: Activation,
    ) -> ActivationOutcome {
        let Some(linedef) = map.linedef(line) else {
            warn!(line, "activation of a linedef that does not exist");
            return ActivationOutcome::Inert;
        };
        if linedef.special == 0 || self.is_spent(line) {
            return ActivationOutcome::Inert;
        }
        let Some(info) = special::lookup(linedef.special) else {
            debug!(line, special = linedef.special, "unsupported special");
            return ActivationOutcome::Inert;
        };
        if info.trigger != activation.trigger {
            return ActivationOutcome::Inert;
        }
        if !activation.keys.contains(info.key) {
            debug!(line, key = %info.key, "locked");
            return ActivationOutcome::Locked(info.key);
        }

        let targets = match info.targeting {
            Targeting::Tagged if linedef.tag == 0 => {
                warn!(line, special = info.special, "tagged special with tag 0");
                Vec::new()
            }
            Targeting::Tagged => map.sectors_with_tag(linedef.tag),
            Targeting::Manual => {
                let (front, back) = map.line_sectors(line);
                let far = match activation.side {
                    Side::Front => back,
                    Side::Back => front,
                };
                far.into_iter().collect()
            }
        };

        let mut started = Vec::new();
        for sector in targets {
            if self.slots.get(sector).is_none_or(Option::is_some) {
                continue;
            }
            if let Some(action) = self.plan(map, sector, info.kind) {
                debug!(sector, kind = info.kind.label(), line, "sector action started");
                self.slots[sector] = Some(action);
                started.push(sector);
            }
        }

        if started.is_empty() {
            return ActivationOutcome::NoTarget;
        }
        if !info.repeatable {
            if let Some(flag) = self.spent.get_mut(line) {
                *flag = true;
            }
        }
        ActivationOutcome::Started(started)
    }

    fn plan(&self, map: &MapIndex, sector: usize, kind: ActionKind) -> Option<SectorAction> {
        let s = map.sector(sector)?;
        let cfg = &self.config;
        let (plane, speed, original, target) = match kind {
            ActionKind::OpenWaitClose | ActionKind::OpenStay => {
                let top = map
                    .lowest_neighbor_ceiling(sector)
                    .unwrap_or(s.floor_height + cfg.default_clearance);
                (Plane::Ceiling, cfg.door_speed, s.ceiling_height, top - cfg.door_gap)
            }
            ActionKind::CloseStay => (Plane::Ceiling, cfg.door_speed, s.ceiling_height, s.floor_height),
            ActionKind::RaiseFloorToCeiling => {
                (Plane::Floor, cfg.floor_speed, s.floor_height, s.ceiling_height)
            }
            ActionKind::LowerFloorToLowest => {
                let lowest = map
                    .lowest_neighbor_floor(sector)
                    .map_or(s.floor_height, |f| f.min(s.floor_height));
                (Plane::Floor, cfg.floor_speed, s.floor_height, lowest)
            }
        };
        Some(SectorAction {
            sector,
            kind,
            state: ActionState::Moving,
            plane,
            speed,
            target_height: target,
            original_height: original,
            wait_time: cfg.door_wait,
            current_time: 0.0,
            returning: false,
        })
    }

    /// Advance every action by `dt` seconds, writing plane heights into `map`.
    pub fn update(&mut self, map: &mut MapIndex, dt: f32) -> Vec<SectorActionEvent> {
        let mut events = Vec::new();
        for slot in &mut self.slots {
            let Some(action) = slot else {
                continue;
            };
            let Some(sector) = map.sector_mut(action.sector) else {
                warn!(sector = action.sector, "action on a missing sector dropped");
                *slot = None;
                continue;
            };

            match action.state {
                ActionState::Waiting => {
                    action.current_time += dt;
                    if action.current_time >= action.wait_time {
                        action.state = ActionState::Moving;
                        action.target_height = action.original_height;
                        action.returning = true;
                        events.push(SectorActionEvent::Reversed {
                            sector: action.sector,
                        });
                    }
                }
                ActionState::Moving => {
                    let height = match action.plane {
                        Plane::Floor => &mut sector.floor_height,
                        Plane::Ceiling => &mut sector.ceiling_height,
                    };
                    let remaining = action.target_height - *height;
                    let step = action.speed * dt;
                    if remaining.abs() > step {
                        *height += step.copysign(remaining);
                        continue;
                    }
                    *height = action.target_height;

                    if action.kind == ActionKind::OpenWaitClose && !action.returning {
                        action.state = ActionState::Waiting;
                        action.current_time = 0.0;
                        events.push(SectorActionEvent::Waiting {
                            sector: action.sector,
                        });
                    } else {
                        events.push(SectorActionEvent::Finished {
                            sector: action.sector,
                            kind: action.kind,
                        });
                        *slot = None;
                    }
                }
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{TIC_SECONDS, TICRATE};
    use dusk_core::{Room, RowMapBuilder};

    const DT: f32 = TIC_SECONDS as f32;

    fn use_from(side: Side) -> Activation {
        Activation {
            trigger: Trigger::Use,
            side,
            keys: KeySet::empty(),
        }
    }

    /// Room, closed door (sector 1), room. Door line is the west edge of sector 1.
    fn door_map(special: u16) -> (MapIndex, usize) {
        let map = RowMapBuilder::new(0.0, 128.0)
            .room(Room::new(128.0, 0.0, 128.0))
            .room(Room::new(16.0, 0.0, 0.0).entry(special, 0))
            .room(Room::new(128.0, 0.0, 128.0))
            .build("DOOR")
            .unwrap();
        let line = (0..map.linedef_count())
            .find(|&l| map.linedef(l).unwrap().special == special)
            .unwrap();
        (map, line)
    }

    fn run_until_idle(mgr: &mut SectorActionManager, map: &mut MapIndex, sector: usize) -> Vec<(u32, SectorActionEvent)> {
        let mut log = Vec::new();
        for tick in 1..=2000 {
            for e in mgr.update(map, DT) {
                log.push((tick, e));
            }
            if mgr.action(sector).is_none() {
                break;
            }
        }
        log
    }

    #[test]
    fn manual_door_full_cycle_timing() {
        let (mut map, line) = door_map(1);
        let mut mgr = SectorActionManager::new(&map, SectorActionConfig::default());
        // Activator in sector 0 is on the back side of the north-running line.
        let outcome = mgr.activate_linedef(&map, line, use_from(Side::Back));
        assert_eq!(outcome, ActivationOutcome::Started(vec![1]));
        let action = mgr.action(1).unwrap();
        assert_eq!(action.target_height, 124.0);
        assert_eq!(action.original_height, 0.0);

        let log = run_until_idle(&mut mgr, &mut map, 1);
        let waiting = log
            .iter()
            .find(|(_, e)| matches!(e, SectorActionEvent::Waiting { .. }))
            .unwrap()
            .0;
        let reversed = log
            .iter()
            .find(|(_, e)| matches!(e, SectorActionEvent::Reversed { .. }))
            .unwrap()
            .0;
        let finished = log
            .iter()
            .find(|(_, e)| matches!(e, SectorActionEvent::Finished { .. }))
            .unwrap()
            .0;

        // 124 units at 2 units/tic is 62 tics each way, give or take a tic.
        assert!((61..=63).contains(&waiting));
        assert!((149..=151).contains(&(reversed - waiting)));
        assert!((61..=63).contains(&(finished - reversed)));
        assert_eq!(map.sector(1).unwrap().ceiling_height, 0.0);
        assert_eq!(mgr.active_count(), 0);
    }

    #[test]
    fn leg_duration_matches_distance_over_speed() {
        let (mut map, line) = door_map(31);
        let cfg = SectorActionConfig::default();
        let mut mgr = SectorActionManager::new(&map, cfg.clone());
        mgr.activate_linedef(&map, line, use_from(Side::Back));
        let log = run_until_idle(&mut mgr, &mut map, 1);
        let (tick, event) = log[0];
        assert_eq!(event, SectorActionEvent::Finished { sector: 1, kind: ActionKind::OpenStay });
        let expected = 124.0 / cfg.door_speed * TICRATE as f32;
        assert!((tick as f32 - expected).abs() <= 1.0);
        assert_eq!(map.sector(1).unwrap().ceiling_height, 124.0);
    }

    #[test]
    fn duplicate_activation_is_noop() {
        let (map, line) = door_map(1);
        let mut mgr = SectorActionManager::new(&map, SectorActionConfig::default());
        mgr.activate_linedef(&map, line, use_from(Side::Back));
        let again = mgr.activate_linedef(&map, line, use_from(Side::Back));
        assert_eq!(again, ActivationOutcome::NoTarget);
        assert_eq!(mgr.active_count(), 1);
    }

    #[test]
    fn manual_door_targets_far_side() {
        let (map, line) = door_map(1);
        let mut mgr = SectorActionManager::new(&map, SectorActionConfig::default());
        // From inside the door sector the far side is room 0.
        let outcome = mgr.activate_linedef(&map, line, use_from(Side::Front));
        assert_eq!(outcome, ActivationOutcome::Started(vec![0]));
    }

    #[test]
    fn locked_door_needs_key() {
        let (map, line) = door_map(26);
        let mut mgr = SectorActionManager::new(&map, SectorActionConfig::default());
        let outcome = mgr.activate_linedef(&map, line, use_from(Side::Back));
        assert_eq!(outcome, ActivationOutcome::Locked(KeySet::BLUE));
        let keyed = Activation {
            keys: KeySet::BLUE | KeySet::RED,
            ..use_from(Side::Back)
        };
        assert_eq!(mgr.activate_linedef(&map, line, keyed), ActivationOutcome::Started(vec![1]));
    }

    #[test]
    fn trigger_mismatch_is_inert() {
        let (map, line) = door_map(1);
        let mut mgr = SectorActionManager::new(&map, SectorActionConfig::default());
        let walk = Activation {
            trigger: Trigger::Walk,
            ..use_from(Side::Back)
        };
        assert_eq!(mgr.activate_linedef(&map, line, walk), ActivationOutcome::Inert);
        assert_eq!(mgr.activate_linedef(&map, 0, use_from(Side::Back)), ActivationOutcome::Inert);
        assert_eq!(mgr.activate_linedef(&map, 999, use_from(Side::Back)), ActivationOutcome::Inert);
    }

    #[test]
    fn once_only_line_is_spent_after_success() {
        let mut map = RowMapBuilder::new(0.0, 128.0)
            .room(Room::new(128.0, 0.0, 128.0).switch(101, 5))
            .room(Room::new(128.0, 0.0, 96.0).tag(5))
            .build("LIFT")
            .unwrap();
        let switch = (0..map.linedef_count())
            .find(|&l| map.linedef(l).unwrap().special == 101)
            .unwrap();
        let mut mgr = SectorActionManager::new(&map, SectorActionConfig::default());
        let outcome = mgr.activate_linedef(&map, switch, use_from(Side::Front));
        assert_eq!(outcome, ActivationOutcome::Started(vec![1]));
        assert!(mgr.is_spent(switch));

        let log = run_until_idle(&mut mgr, &mut map, 1);
        // 96 units at 1 unit/tic.
        assert!((95..=97).contains(&log[0].0));
        assert_eq!(map.sector(1).unwrap().floor_height, 96.0);
        assert_eq!(mgr.activate_linedef(&map, switch, use_from(Side::Front)), ActivationOutcome::Inert);
    }

    #[test]
    fn floor_lowers_to_lowest_neighbor() {
        let mut map = RowMapBuilder::new(0.0, 128.0)
            .room(Room::new(128.0, -16.0, 128.0).switch(23, 9))
            .room(Room::new(128.0, 32.0, 160.0).tag(9))
            .build("PIT")
            .unwrap();
        let switch = (0..map.linedef_count())
            .find(|&l| map.linedef(l).unwrap().special == 23)
            .unwrap();
        let mut mgr = SectorActionManager::new(&map, SectorActionConfig::default());
        mgr.activate_linedef(&map, switch, use_from(Side::Front));
        assert_eq!(mgr.action(1).unwrap().target_height, -16.0);
        run_until_idle(&mut mgr, &mut map, 1);
        assert_eq!(map.sector(1).unwrap().floor_height, -16.0);
    }

    #[test]
    fn tag_zero_tagged_special_does_nothing() {
        let map = RowMapBuilder::new(0.0, 128.0)
            .room(Room::new(128.0, 0.0, 128.0).switch(103, 0))
            .build("ZERO")
            .unwrap();
        let switch = (0..map.linedef_count())
            .find(|&l| map.linedef(l).unwrap().special == 103)
            .unwrap();
        let mut mgr = SectorActionManager::new(&map, SectorActionConfig::default());
        assert_eq!(
            mgr.activate_linedef(&map, switch, use_from(Side::Front)),
            ActivationOutcome::NoTarget
        );
        assert!(!mgr.is_spent(switch));
    }

    #[test]
    fn close_door_lowers_ceiling_to_floor() {
        let mut map = RowMapBuilder::new(0.0, 128.0)
            .room(Room::new(128.0, 0.0, 128.0).switch(50, 4))
            .room(Room::new(32.0, 8.0, 72.0).tag(4))
            .build("SHUT")
            .unwrap();
        let switch = (0..map.linedef_count())
            .find(|&l| map.linedef(l).unwrap().special == 50)
            .unwrap();
        let mut mgr = SectorActionManager::new(&map, SectorActionConfig::default());
        mgr.activate_linedef(&map, switch, use_from(Side::Front));
        run_until_idle(&mut mgr, &mut map, 1);
        assert_eq!(map.sector(1).unwrap().ceiling_height, 8.0);
    }
}
