use serde::Serialize;

use crate::player::KeySet;
use crate::special::ActionKind;
use crate::thing::{ItemKind, ThingId};
use crate::weapon::WeaponKind;

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEventKind {
    // Lines and sectors
    /// A linedef special fired and started at least one action.
    LineActivated {
        /// The activated linedef.
        line: usize,
        /// Its special number.
        special: u16,
    },
    /// A locked special was used without the key.
    Locked {
        /// The locked linedef.
        line: usize,
        /// The key it demands.
        key: KeySet,
    },
    /// A sector began moving.
    SectorActionStarted {
        /// The moving sector.
        sector: usize,
        /// What it is doing.
        kind: ActionKind,
    },
    /// An open-wait-close door began closing.
    SectorActionReversed {
        /// The closing sector.
        sector: usize,
    },
    /// A sector action completed and was removed.
    SectorActionFinished {
        /// The sector that stopped.
        sector: usize,
        /// What it was doing.
        kind: ActionKind,
    },

    // Items and combat
    /// The player picked something up.
    ItemPickedUp {
        /// The removed item thing.
        thing: ThingId,
        /// What it was.
        item: ItemKind,
    },
    /// The player pulled the trigger.
    WeaponFired {
        /// Weapon used.
        weapon: WeaponKind,
        /// Pellets that struck a monster.
        hits: usize,
    },
    /// A monster took damage.
    ThingDamaged {
        /// The damaged monster.
        thing: ThingId,
        /// Health removed.
        damage: i32,
    },
    /// A monster died.
    ThingKilled {
        /// The dead monster.
        thing: ThingId,
    },
    /// A monster noticed the player.
    MonsterWoke {
        /// The monster.
        thing: ThingId,
    },
    /// A monster hurt the player.
    PlayerDamaged {
        /// The attacker.
        by: ThingId,
        /// Health lost after armor.
        damage: i32,
    },
    /// The player died.
    PlayerKilled {
        /// The attacker.
        by: ThingId,
    },
}

impl SimEventKind {
    /// Check whether a given thing is involved in this event.
    pub fn involves(&self, id: ThingId) -> bool {
        match self {
            Self::ItemPickedUp { thing, .. }
            | Self::ThingDamaged { thing, .. }
            | Self::ThingKilled { thing }
            | Self::MonsterWoke { thing } => *thing == id,
            Self::PlayerDamaged { by, .. } | Self::PlayerKilled { by } => *by == id,
            _ => false,
        }
    }

    /// Check whether a given sector is involved in this event.
    pub fn involves_sector(&self, index: usize) -> bool {
        match self {
            Self::SectorActionStarted { sector, .. }
            | Self::SectorActionReversed { sector }
            | Self::SectorActionFinished { sector, .. } => *sector == index,
            _ => false,
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimEvent {
    /// The simulation tick when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given tick, kind, and description.
    pub fn new(tick: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events that occurred at the given tick.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Return all events involving the given thing.
    pub fn events_for_thing(&self, id: ThingId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Return all events about the given sector.
    pub fn events_for_sector(&self, sector: usize) -> Vec<&SimEvent> {
        self.events
            .iter()
            .filter(|e| e.kind.involves_sector(sector))
            .collect()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn killed(tick: u64, id: u32) -> SimEvent {
        SimEvent::new(tick, SimEventKind::ThingKilled { thing: ThingId(id) }, "test")
    }

    #[test]
    fn event_log_push_and_query() {
        let mut log = EventLog::new(0);
        log.push(killed(1, 3));
        assert_eq!(log.len(), 1);
        assert_eq!(log.events_at_tick(1).len(), 1);
        assert_eq!(log.events_for_thing(ThingId(3)).len(), 1);
        assert!(log.events_for_thing(ThingId(4)).is_empty());
    }

    #[test]
    fn event_log_max_events_trims() {
        let mut log = EventLog::new(2);
        for i in 0..5 {
            log.push(killed(i, 0));
        }
        assert_eq!(log.len(), 2);
        // Oldest events were dropped, newest remain
        assert_eq!(log.events()[0].tick, 3);
        assert_eq!(log.events()[1].tick, 4);
    }

    #[test]
    fn event_kind_involves_thing() {
        let kind = SimEventKind::PlayerDamaged {
            by: ThingId(2),
            damage: 9,
        };
        assert!(kind.involves(ThingId(2)));
        assert!(!kind.involves(ThingId(1)));

        let kind = SimEventKind::LineActivated { line: 2, special: 1 };
        assert!(!kind.involves(ThingId(2)));
    }

    #[test]
    fn sector_events_filter() {
        let mut log = EventLog::new(0);
        log.push(SimEvent::new(
            1,
            SimEventKind::SectorActionStarted {
                sector: 4,
                kind: ActionKind::OpenWaitClose,
            },
            "door",
        ));
        log.push(SimEvent::new(2, SimEventKind::SectorActionReversed { sector: 4 }, "door"));
        log.push(killed(2, 4));
        assert_eq!(log.events_for_sector(4).len(), 2);
        assert_eq!(log.events_at_tick(2).len(), 2);
    }

    #[test]
    fn event_log_clear() {
        let mut log = EventLog::new(0);
        log.push(killed(1, 0));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_string(&killed(7, 1)).unwrap();
        assert!(json.contains(r#""event":"thing_killed""#));
        assert!(json.contains(r#""tick":7"#));
    }
}
