//! Level state and the fixed-phase tick orchestrator.

use std::f32::consts::TAU;

use dusk_core::geometry::{angle_to_dir, point_on_side};
use dusk_core::{MapIndex, SectorHeights};
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace, warn};

use crate::clock::SimClock;
use crate::collision::{crossed_lines, sub_steps, try_move};
use crate::config::{PlayerConfig, SimConfig};
use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::{EventLog, SimEventKind};
use crate::intent::PlayerIntent;
use crate::interaction::{collect_pickups, find_use_line};
use crate::monster::MonsterAi;
use crate::player::Player;
use crate::sector_action::{Activation, ActivationOutcome, SectorActionEvent, SectorActionManager};
use crate::snapshot::{FrameSnapshot, SaveData};
use crate::special::Trigger;
use crate::thing::ThingArena;
use crate::weapon::{PelletHit, fire_hitscan};

/// Editor number of the single-player start.
const PLAYER_START: u16 = 1;

/// Mutable state of the loaded level.
#[derive(Debug, Clone)]
pub struct Level {
    map: MapIndex,
    things: ThingArena,
    player: Player,
    actions: SectorActionManager,
}

impl Level {
    fn load(map: MapIndex, config: &SimConfig) -> Self {
        let start = map.map().things.iter().find(|t| t.doomednum == PLAYER_START);
        let (position, angle) = match start {
            Some(spawn) => (Vec2::new(spawn.x, spawn.y), spawn.angle.to_radians()),
            None => {
                let centre = map
                    .map()
                    .bounds()
                    .map_or(Vec2::ZERO, |b| (b.min + b.max) * 0.5);
                warn!(map = %map.name(), "no player start, spawning at the map centre");
                (centre, 0.0)
            }
        };
        let mut level = Self {
            things: ThingArena::from_spawns(&map.map().things),
            player: Player::spawn(&config.player, position, angle),
            actions: SectorActionManager::new(&map, config.sector_actions.clone()),
            map,
        };
        level.commit();
        level
    }

    /// The level's spatial index, with live sector heights.
    pub fn map(&self) -> &MapIndex {
        &self.map
    }

    /// Things in the level.
    pub fn things(&self) -> &ThingArena {
        &self.things
    }

    /// Things in the level, mutably.
    pub fn things_mut(&mut self) -> &mut ThingArena {
        &mut self.things
    }

    /// The player.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// The player, mutably.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Running sector actions.
    pub fn actions(&self) -> &SectorActionManager {
        &self.actions
    }

    fn sector_heights(&self) -> Vec<SectorHeights> {
        self.map
            .sectors()
            .iter()
            .map(|s| SectorHeights {
                floor: s.floor_height,
                ceiling: s.ceiling_height,
            })
            .collect()
    }

    fn update_sector_actions(&mut self, ctx: &mut SimContext<'_>) {
        for event in self.actions.update(&mut self.map, ctx.dt()) {
            match event {
                SectorActionEvent::Waiting { sector } => {
                    trace!(sector, "door waiting");
                }
                SectorActionEvent::Reversed { sector } => {
                    ctx.emit(
                        SimEventKind::SectorActionReversed { sector },
                        format!("sector {sector} closing"),
                    );
                }
                SectorActionEvent::Finished { sector, kind } => {
                    ctx.emit(
                        SimEventKind::SectorActionFinished { sector, kind },
                        format!("sector {sector} {} finished", kind.label()),
                    );
                }
            }
        }
    }

    fn apply_intent(&mut self, cfg: &PlayerConfig, intent: &PlayerIntent) {
        let player = &mut self.player;
        if !player.alive {
            player.momentum = Vec2::ZERO;
            return;
        }
        player.angle = (player.angle + intent.turn * cfg.turn_speed).rem_euclid(TAU);

        let (thrust, strafe) = if intent.run {
            (cfg.run_thrust, cfg.run_strafe)
        } else {
            (cfg.walk_thrust, cfg.walk_strafe)
        };
        let facing = angle_to_dir(player.angle);
        let right = Vec2::new(facing.y, -facing.x);
        player.momentum += facing * (intent.forward * thrust) + right * (intent.strafe * strafe);
        player.momentum = (player.momentum * cfg.friction).clamp_length_max(cfg.max_move);

        let idle = intent.forward == 0.0 && intent.strafe == 0.0;
        if idle && player.momentum.length() < cfg.stop_speed {
            player.momentum = Vec2::ZERO;
        }
    }

    fn move_player(&mut self, ctx: &mut SimContext<'_>) {
        let delta = self.player.momentum;
        if delta == Vec2::ZERO {
            return;
        }
        if !delta.is_finite() {
            warn!(?delta, "non-finite player momentum, stopping");
            self.player.momentum = Vec2::ZERO;
            return;
        }
        let (radius, height) = (self.player.radius, self.player.height);
        let steps = sub_steps(delta, radius);
        let step = delta / steps as f32;

        let mut position = self.player.pos2();
        for _ in 0..steps {
            let result = try_move(&self.map, position, position + step, radius, height);
            let from = position;
            position = result.position;

            for line in crossed_lines(&self.map, from, position) {
                if let Some((a, b)) = self.map.line_endpoints(line) {
                    let side = point_on_side(from, a, b - a);
                    self.activate(ctx, line, Trigger::Walk, side);
                }
            }

            if let Some(line) = result.blocking_line {
                // Keep only the momentum along the wall.
                let tangent = self
                    .map
                    .line_endpoints(line)
                    .and_then(|(a, b)| (b - a).try_normalize());
                self.player.momentum = tangent.map_or(Vec2::ZERO, |t| t * self.player.momentum.dot(t));
                break;
            }
        }

        self.player.position.x = position.x;
        self.player.position.y = position.y;
        if let Some(h) = self.map.heights_at(position) {
            self.player.position.z = h.floor;
        }
    }

    fn activate(
        &mut self,
        ctx: &mut SimContext<'_>,
        line: usize,
        trigger: Trigger,
        side: dusk_core::Side,
    ) -> ActivationOutcome {
        let activation = Activation {
            trigger,
            side,
            keys: self.player.inventory.keys,
        };
        let outcome = self.actions.activate_linedef(&self.map, line, activation);
        match &outcome {
            ActivationOutcome::Started(sectors) => {
                let special = self.map.linedef(line).map_or(0, |l| l.special);
                ctx.emit(
                    SimEventKind::LineActivated { line, special },
                    format!("line {line} special {special} activated"),
                );
                for &sector in sectors {
                    if let Some(action) = self.actions.action(sector) {
                        ctx.emit(
                            SimEventKind::SectorActionStarted {
                                sector,
                                kind: action.kind,
                            },
                            format!("sector {sector} {} started", action.kind.label()),
                        );
                    }
                }
            }
            ActivationOutcome::Locked(key) => {
                ctx.emit(
                    SimEventKind::Locked { line, key: *key },
                    format!("line {line} needs the {key} key"),
                );
            }
            ActivationOutcome::Inert | ActivationOutcome::NoTarget => {}
        }
        outcome
    }

    fn interact(&mut self, ctx: &mut SimContext<'_>, cfg: &PlayerConfig, intent: &PlayerIntent) {
        if !self.player.alive {
            return;
        }
        if let Some(weapon) = intent.select_weapon {
            if self.player.inventory.select(weapon) {
                debug!(weapon = weapon.info().name, "weapon selected");
            }
        }

        collect_pickups(ctx, &mut self.things, &mut self.player);

        if intent.use_line {
            let dir = angle_to_dir(self.player.angle);
            if let Some((line, side)) = find_use_line(&self.map, self.player.pos2(), dir, cfg.use_range) {
                self.activate(ctx, line, Trigger::Use, side);
            }
        }

        self.player.refire = (self.player.refire - ctx.dt()).max(0.0);
        if intent.fire && self.player.refire <= 0.0 && self.player.inventory.spend_shot() {
            self.fire(ctx);
        }
    }

    fn fire(&mut self, ctx: &mut SimContext<'_>) {
        let weapon = self.player.inventory.ready;
        let report = fire_hitscan(
            weapon,
            self.player.pos2(),
            self.player.angle,
            &mut self.things,
            &self.map,
            ctx.rng,
        );
        self.player.refire = weapon.info().refire;

        let mut hits = 0;
        for pellet in &report.pellets {
            if let PelletHit::Thing { thing, damage, .. } = pellet {
                hits += 1;
                ctx.emit(
                    SimEventKind::ThingDamaged {
                        thing: *thing,
                        damage: *damage,
                    },
                    format!("{thing} takes {damage}"),
                );
            }
        }
        ctx.emit(
            SimEventKind::WeaponFired { weapon, hits },
            format!("{} fired, {hits} hit", weapon.info().name),
        );
        for &thing in &report.kills {
            ctx.emit(SimEventKind::ThingKilled { thing }, format!("{thing} killed"));
        }
    }

    fn commit(&mut self) {
        for id in self.things.commit() {
            trace!(thing = %id, "thing removed");
        }
        for thing in self.things.iter_mut() {
            let position = thing.pos2();
            thing.sector = self.map.find_sector(position);
            if let Some(h) = self.map.heights_at(position) {
                thing.position.z = h.floor;
            }
        }
        let position = self.player.pos2();
        self.player.sector = self.map.find_sector(position);
        if let Some(h) = self.map.heights_at(position) {
            self.player.position.z = h.floor;
        }
    }
}

/// The tick orchestrator.
///
/// Owns the clock, the seeded RNG, the event log and at most one loaded
/// [`Level`]. Every tick runs the phases in a fixed order: sector actions,
/// player intent, movement, interaction, monsters, commit.
pub struct Simulation {
    config: SimConfig,
    clock: SimClock,
    rng: StdRng,
    events: EventLog,
    monsters: MonsterAi,
    level: Option<Level>,
    automap: bool,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.clock.tick())
            .field("level", &self.level.as_ref().map(|l| l.map.name()))
            .field("events", &self.events.len())
            .finish()
    }
}

impl Simulation {
    /// Create a simulation with no level loaded.
    pub fn new(config: SimConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let events = EventLog::new(config.max_events);
        let monsters = MonsterAi::new(config.monsters.clone());
        Self {
            config,
            clock: SimClock::new(),
            rng,
            events,
            monsters,
            level: None,
            automap: false,
        }
    }

    /// Replace the current level and restart the clock.
    ///
    /// The player spawns at the first player start, or at the centre of the
    /// map when it has none.
    pub fn load_level(&mut self, map: MapIndex) {
        let level = Level::load(map, &self.config);
        info!(
            map = %level.map.name(),
            things = level.things.len(),
            "level loaded"
        );
        self.clock.reset();
        self.automap = false;
        self.level = Some(level);
    }

    /// Unload the current level, if any.
    pub fn unload_level(&mut self) -> Option<Level> {
        self.level.take()
    }

    /// Advance one tick with the given intent.
    pub fn tick(&mut self, intent: &PlayerIntent) -> SimResult<()> {
        let Some(level) = self.level.as_mut() else {
            return Err(SimError::NoActiveLevel);
        };
        self.clock.advance();
        let intent = intent.normalized();
        if intent.toggle_automap {
            self.automap = !self.automap;
        }

        let mut ctx = SimContext {
            clock: &self.clock,
            events: &mut self.events,
            rng: &mut self.rng,
        };
        level.update_sector_actions(&mut ctx);
        level.apply_intent(&self.config.player, &intent);
        level.move_player(&mut ctx);
        level.interact(&mut ctx, &self.config.player, &intent);
        self.monsters
            .update(&mut ctx, &mut level.things, &mut level.player, &level.map);
        level.commit();

        trace!(
            tick = self.clock.tick(),
            x = level.player.position.x,
            y = level.player.position.y,
            health = level.player.health,
            actions = level.actions.active_count(),
            "tick"
        );
        Ok(())
    }

    /// Advance `n` ticks with the same intent.
    ///
    /// One-shot presses in `intent` apply to the first tick only.
    pub fn run(&mut self, n: u64, intent: &PlayerIntent) -> SimResult<()> {
        for i in 0..n {
            if i == 0 {
                self.tick(intent)?;
            } else {
                self.tick(&intent.without_impulses())?;
            }
        }
        Ok(())
    }

    /// The run's configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The simulation clock.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Current tick number.
    pub fn current_tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Recorded events.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The loaded level.
    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    /// The loaded level, mutably.
    pub fn level_mut(&mut self) -> Option<&mut Level> {
        self.level.as_mut()
    }

    /// Whether the automap overlay is toggled on.
    pub fn automap(&self) -> bool {
        self.automap
    }

    /// Capture the current state for presentation.
    pub fn snapshot(&self, fps: f32) -> SimResult<FrameSnapshot> {
        let level = self.level.as_ref().ok_or(SimError::NoActiveLevel)?;
        Ok(FrameSnapshot {
            map: level.map.name().to_string(),
            tick: self.clock.tick(),
            time: self.clock.time(),
            player: level.player.clone(),
            things: level.things.iter().cloned().collect(),
            sectors: level.sector_heights(),
            automap: self.automap,
            fps,
        })
    }

    /// Capture the state a save file records.
    pub fn save_data(&self) -> SimResult<SaveData> {
        let level = self.level.as_ref().ok_or(SimError::NoActiveLevel)?;
        Ok(SaveData {
            map: level.map.name().to_string(),
            tick: self.clock.tick(),
            player: (&level.player).into(),
            things: level.things.iter().map(Into::into).collect(),
            sectors: level.sector_heights(),
        })
    }
}
