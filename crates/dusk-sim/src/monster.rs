//! Monster behaviour: Idle → Chase → Melee → Idle.
//!
//! Chase movement goes straight at the player and is not checked against
//! walls or other things, so monsters can pass through both. This is a
//! known gap in the behaviour, kept as-is because closing it changes
//! gameplay.

use dusk_core::MapIndex;
use glam::Vec3;
use tracing::debug;

use crate::config::MonsterConfig;
use crate::context::SimContext;
use crate::event::SimEventKind;
use crate::player::Player;
use crate::thing::{Target, ThingArena, ThingState};

/// Runs every live monster for one tick.
#[derive(Debug, Clone, Default)]
pub struct MonsterAi {
    config: MonsterConfig,
}

impl MonsterAi {
    /// AI with the given switches.
    pub fn new(config: MonsterConfig) -> Self {
        Self { config }
    }

    fn can_see(&self, map: &MapIndex, from: Option<usize>, to: Option<usize>) -> bool {
        if !self.config.use_reject {
            return true;
        }
        match (from, to) {
            (Some(a), Some(b)) => map.can_see(a, b),
            _ => true,
        }
    }

    /// Update every live monster against `player`.
    pub fn update(
        &self,
        ctx: &mut SimContext<'_>,
        things: &mut ThingArena,
        player: &mut Player,
        map: &MapIndex,
    ) {
        if self.config.frozen {
            return;
        }
        let dt = ctx.dt();
        for thing in things.iter_mut() {
            let Some(info) = thing.monster_info() else {
                continue;
            };
            if thing.state == ThingState::Dead {
                continue;
            }

            let to_player = player.pos2() - thing.pos2();
            let dist_sq = to_player.length_squared();
            let in_aggro = dist_sq < info.aggro_range * info.aggro_range
                && self.can_see(map, thing.sector, player.sector);

            if !player.alive || !in_aggro {
                if thing.target.take().is_some() {
                    debug!(thing = %thing.id, "monster lost its target");
                }
                thing.state = ThingState::Idle;
                thing.velocity = Vec3::ZERO;
                thing.attack_timer = 0.0;
                continue;
            }

            if thing.target.is_none() {
                thing.target = Some(Target::Player);
                ctx.emit(
                    SimEventKind::MonsterWoke { thing: thing.id },
                    format!("{} {} sees the player", info.name, thing.id),
                );
            }
            if to_player != glam::Vec2::ZERO {
                thing.angle = to_player.y.atan2(to_player.x);
            }

            let distance = dist_sq.sqrt();
            if distance > info.melee_range {
                thing.state = ThingState::Chase;
                thing.attack_timer = 0.0;
                let dir = to_player / distance;
                let step = (info.speed * dt).min(distance);
                thing.velocity = (dir * info.speed).extend(0.0);
                thing.position += (dir * step).extend(0.0);
                continue;
            }

            thing.state = ThingState::Melee;
            thing.velocity = Vec3::ZERO;
            thing.attack_timer += dt;
            if thing.attack_timer > info.attack_interval {
                thing.attack_timer = 0.0;
                let raw = info.damage.roll(ctx.rng);
                let lost = player.take_damage(raw);
                ctx.emit(
                    SimEventKind::PlayerDamaged {
                        by: thing.id,
                        damage: lost,
                    },
                    format!("{} {} hits for {lost}", info.name, thing.id),
                );
                if !player.alive {
                    debug!(thing = %thing.id, "player killed");
                    ctx.emit(
                        SimEventKind::PlayerKilled { by: thing.id },
                        format!("killed by {} {}", info.name, thing.id),
                    );
                }
            }
        }
    }
}
