use serde::{Deserialize, Serialize};

use crate::clock::TICRATE;
use crate::error::SimResult;

/// Per-tick thrust at full walking input, in map units per tic.
const WALK_THRUST: f32 = 0.78125;
/// Per-tick thrust at full running input.
const RUN_THRUST: f32 = 1.5625;
/// Sideways thrust at full walking input.
const WALK_STRAFE: f32 = 0.75;
/// Sideways thrust at full running input.
const RUN_STRAFE: f32 = 1.25;

/// Configuration for a simulation run.
///
/// Every field has a default, so a partial JSON document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for deterministic simulation.
    pub seed: u64,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Player movement and body.
    pub player: PlayerConfig,
    /// Door and floor motion.
    pub sector_actions: SectorActionConfig,
    /// Monster behaviour switches.
    pub monsters: MonsterConfig,
    /// Frame loop pacing.
    pub frame_loop: FrameLoopConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_events: 0,
            player: PlayerConfig::default(),
            sector_actions: SectorActionConfig::default(),
            monsters: MonsterConfig::default(),
            frame_loop: FrameLoopConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(text: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Set the RNG seed for deterministic simulation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Replace the player settings.
    pub fn with_player(mut self, player: PlayerConfig) -> Self {
        self.player = player;
        self
    }

    /// Replace the sector action settings.
    pub fn with_sector_actions(mut self, sector_actions: SectorActionConfig) -> Self {
        self.sector_actions = sector_actions;
        self
    }

    /// Replace the monster settings.
    pub fn with_monsters(mut self, monsters: MonsterConfig) -> Self {
        self.monsters = monsters;
        self
    }

    /// Replace the frame loop settings.
    pub fn with_frame_loop(mut self, frame_loop: FrameLoopConfig) -> Self {
        self.frame_loop = frame_loop;
        self
    }
}

/// Player body and movement tuning. Speeds are per tic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Collision radius.
    pub radius: f32,
    /// Body height used for passage checks.
    pub height: f32,
    /// Eye height above the floor.
    pub view_height: f32,
    /// Starting health.
    pub start_health: i32,
    /// Forward thrust at full input, walking.
    pub walk_thrust: f32,
    /// Forward thrust at full input, running.
    pub run_thrust: f32,
    /// Strafe thrust at full input, walking.
    pub walk_strafe: f32,
    /// Strafe thrust at full input, running.
    pub run_strafe: f32,
    /// Radians turned per tic at full turn input.
    pub turn_speed: f32,
    /// Momentum multiplier applied every tic.
    pub friction: f32,
    /// Momentum below this is zeroed.
    pub stop_speed: f32,
    /// Momentum cap per tic.
    pub max_move: f32,
    /// Reach of the use action.
    pub use_range: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            radius: 16.0,
            height: 56.0,
            view_height: 41.0,
            start_health: 100,
            walk_thrust: WALK_THRUST,
            run_thrust: RUN_THRUST,
            walk_strafe: WALK_STRAFE,
            run_strafe: RUN_STRAFE,
            turn_speed: 0.122_718_46,
            friction: 0.906_25,
            stop_speed: 0.0625,
            max_move: 30.0,
            use_range: 64.0,
        }
    }
}

impl PlayerConfig {
    /// Set the collision radius.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Set the friction multiplier.
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }
}

/// Door and floor mover tuning. Speeds are in map units per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorActionConfig {
    /// Door ceiling speed.
    pub door_speed: f32,
    /// Floor speed.
    pub floor_speed: f32,
    /// Seconds an open-wait-close door stays open.
    pub door_wait: f32,
    /// Gap left between an open door and the neighbouring ceiling.
    pub door_gap: f32,
    /// Door height above the floor when no neighbour ceiling exists.
    pub default_clearance: f32,
}

impl Default for SectorActionConfig {
    fn default() -> Self {
        let tic_rate = TICRATE as f32;
        Self {
            door_speed: 2.0 * tic_rate,
            floor_speed: tic_rate,
            door_wait: 150.0 / tic_rate,
            door_gap: 4.0,
            default_clearance: 128.0,
        }
    }
}

impl SectorActionConfig {
    /// Set the door speed.
    pub fn with_door_speed(mut self, speed: f32) -> Self {
        self.door_speed = speed;
        self
    }

    /// Set the open-door dwell.
    pub fn with_door_wait(mut self, seconds: f32) -> Self {
        self.door_wait = seconds;
        self
    }
}

/// Monster behaviour switches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterConfig {
    /// Gate target acquisition on the reject table.
    pub use_reject: bool,
    /// Skip monster updates entirely.
    pub frozen: bool,
}

impl MonsterConfig {
    /// Enable reject-table sight gating.
    pub fn with_reject(mut self, enabled: bool) -> Self {
        self.use_reject = enabled;
        self
    }
}

/// Frame loop pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameLoopConfig {
    /// Largest wall-clock delta accepted per frame, in seconds. `None`
    /// accepts any delta.
    pub max_frame_delta: Option<f64>,
    /// Most ticks run in a single frame; the rest stays accumulated.
    pub max_frame_skip: u32,
    /// Weight of the previous FPS estimate in the smoothed value.
    pub fps_smoothing: f32,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            max_frame_delta: Some(0.25),
            max_frame_skip: 10,
            fps_smoothing: 0.9,
        }
    }
}

impl FrameLoopConfig {
    /// Set or clear the delta clamp.
    pub fn with_max_frame_delta(mut self, delta: Option<f64>) -> Self {
        self.max_frame_delta = delta;
        self
    }

    /// Set the per-frame tick cap.
    pub fn with_max_frame_skip(mut self, skip: u32) -> Self {
        self.max_frame_skip = skip;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = SimConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.max_events, 0);
        assert_eq!(config.player.radius, 16.0);
        assert_eq!(config.player.height, 56.0);
        assert_eq!(config.sector_actions.door_speed, 70.0);
        assert_eq!(config.sector_actions.floor_speed, 35.0);
        assert!((config.sector_actions.door_wait - 150.0 / 35.0).abs() < 1e-6);
        assert_eq!(config.frame_loop.max_frame_delta, Some(0.25));
        assert!(!config.monsters.use_reject);
    }

    #[test]
    fn config_builder_chain() {
        let config = SimConfig::default()
            .with_seed(123)
            .with_max_events(500)
            .with_monsters(MonsterConfig::default().with_reject(true))
            .with_frame_loop(
                FrameLoopConfig::default()
                    .with_max_frame_delta(None)
                    .with_max_frame_skip(40),
            );
        assert_eq!(config.seed, 123);
        assert_eq!(config.max_events, 500);
        assert!(config.monsters.use_reject);
        assert_eq!(config.frame_loop.max_frame_delta, None);
        assert_eq!(config.frame_loop.max_frame_skip, 40);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config =
            SimConfig::from_json(r#"{ "seed": 7, "sector_actions": { "door_wait": 1.0 } }"#)
                .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.sector_actions.door_wait, 1.0);
        assert_eq!(config.sector_actions.door_speed, 70.0);
        assert_eq!(config.player, PlayerConfig::default());
    }

    #[test]
    fn null_delta_disables_clamp() {
        let config = SimConfig::from_json(r#"{ "frame_loop": { "max_frame_delta": null } }"#).unwrap();
        assert_eq!(config.frame_loop.max_frame_delta, None);
    }

    #[test]
    fn malformed_json_is_error() {
        assert!(SimConfig::from_json("{ seed: }").is_err());
    }
}
