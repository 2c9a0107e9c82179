//! Fixed-timestep game simulation for Dusk.
//!
//! Runs entities against a [`dusk_core::MapIndex`]: player movement with
//! wall sliding, door and floor movers, hitscan weapons, pickups and simple
//! monster AI, all advanced 35 times per second by a [`Simulation`] and
//! paced from wall-clock time by a [`FrameLoop`]. Presentation is
//! write-only through the [`Presenter`] trait.

/// Simulation clock at the fixed tick rate.
pub mod clock;
/// Circle-versus-wall movement resolution.
pub mod collision;
/// Configuration types for simulation runs.
pub mod config;
/// Shared state lent to each phase of a tick.
pub mod context;
/// Dice-based damage rolls.
pub mod damage;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Wall-clock pacing of ticks.
pub mod frame_loop;
/// Per-tick player input.
pub mod intent;
/// Item pickups and the use ray.
pub mod interaction;
/// Monster state machine.
pub mod monster;
/// The local player and inventory.
pub mod player;
/// Presentation interface.
pub mod present;
/// Door and floor movers.
pub mod sector_action;
/// Top-level simulation orchestrator.
pub mod simulation;
/// Frame and save snapshots.
pub mod snapshot;
/// Linedef special catalogue.
pub mod special;
/// Things and the thing arena.
pub mod thing;
/// Hitscan weapons.
pub mod weapon;

/// Re-export of the clock and tick rate.
pub use clock::{SimClock, TICRATE};
/// Re-export of the movement resolver.
pub use collision::{MoveResult, try_move};
/// Re-exports of the configuration types.
pub use config::{FrameLoopConfig, MonsterConfig, PlayerConfig, SectorActionConfig, SimConfig};
/// Re-export of [`context::SimContext`].
pub use context::SimContext;
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::SimEvent`], and [`event::SimEventKind`].
pub use event::{EventLog, SimEvent, SimEventKind};
/// Re-exports of the frame loop types.
pub use frame_loop::{FrameLoop, FrameReport, StopHandle};
/// Re-export of [`intent::PlayerIntent`].
pub use intent::PlayerIntent;
/// Re-export of [`monster::MonsterAi`].
pub use monster::MonsterAi;
/// Re-exports of player types.
pub use player::{KeySet, Player};
/// Re-exports of the presentation interface.
pub use present::{Camera, FrameTally, HudState, Presenter, SpriteDraw, WallDraw, present_frame};
/// Re-exports of the sector action types.
pub use sector_action::{ActivationOutcome, SectorAction, SectorActionManager};
/// Re-exports of [`simulation::Simulation`] and [`simulation::Level`].
pub use simulation::{Level, Simulation};
/// Re-exports of the snapshot types.
pub use snapshot::{FrameSnapshot, SaveData};
/// Re-exports of thing types.
pub use thing::{Thing, ThingArena, ThingId, ThingKind};
/// Re-exports of weapon types.
pub use weapon::{ShotReport, WeaponKind};
