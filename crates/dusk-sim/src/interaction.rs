//! Player contact with the world: item pickups and the use ray.

use dusk_core::geometry::{Side, point_on_side, ray_segment_intersection};
use dusk_core::{Aabb, MapIndex};
use glam::Vec2;
use tracing::debug;

use crate::context::SimContext;
use crate::event::SimEventKind;
use crate::player::{ArmorClass, KeySet, MAX_HEALTH, MAX_SOUL_HEALTH, Player};
use crate::thing::{ItemKind, ThingArena, ThingKind};
use crate::weapon::{AmmoKind, WeaponKind};

/// Apply `item` to `player`. Returns `false` when the player could not use
/// it, which leaves the item in the world.
pub fn apply_item(player: &mut Player, item: ItemKind) -> bool {
    match item {
        ItemKind::Stimpack => {
            player.heal(10, MAX_HEALTH);
            true
        }
        ItemKind::Medikit => {
            player.heal(25, MAX_HEALTH);
            true
        }
        ItemKind::HealthBonus => {
            player.heal(1, MAX_SOUL_HEALTH);
            true
        }
        ItemKind::GreenArmor => player.give_armor(ArmorClass::Green, 100),
        ItemKind::BlueArmor => player.give_armor(ArmorClass::Blue, 200),
        ItemKind::Clip => player.inventory.give_ammo(AmmoKind::Bullets, 10),
        ItemKind::Shells => player.inventory.give_ammo(AmmoKind::Shells, 4),
        ItemKind::Shotgun => give_weapon(player, WeaponKind::Shotgun, AmmoKind::Shells, 8),
        ItemKind::Chaingun => give_weapon(player, WeaponKind::Chaingun, AmmoKind::Bullets, 20),
        ItemKind::BlueKey => give_key(player, KeySet::BLUE),
        ItemKind::YellowKey => give_key(player, KeySet::YELLOW),
        ItemKind::RedKey => give_key(player, KeySet::RED),
    }
}

fn give_weapon(player: &mut Player, weapon: WeaponKind, ammo: AmmoKind, amount: u32) -> bool {
    let inv = &mut player.inventory;
    let new = inv.give_weapon(weapon);
    let topped = inv.give_ammo(ammo, amount);
    if new {
        inv.select(weapon);
    }
    new || topped
}

fn give_key(player: &mut Player, key: KeySet) -> bool {
    player.inventory.keys.insert(key);
    true
}

/// Pick up every item the player's body overlaps.
///
/// Touch means centre distance strictly below the sum of the radii. Items
/// are queued for removal, so each can be taken once per tick at most.
pub fn collect_pickups(ctx: &mut SimContext<'_>, things: &mut ThingArena, player: &mut Player) -> usize {
    if !player.alive {
        return 0;
    }
    let touched: Vec<_> = things
        .iter()
        .filter_map(|t| match t.kind {
            ThingKind::Item(item) if !things.is_pending_removal(t.id) => {
                let reach = player.radius + t.radius;
                (t.pos2().distance_squared(player.pos2()) < reach * reach).then_some((t.id, item))
            }
            _ => None,
        })
        .collect();

    let mut taken = 0;
    for (id, item) in touched {
        if !apply_item(player, item) {
            continue;
        }
        things.remove(id);
        taken += 1;
        debug!(thing = %id, item = item.name(), "picked up");
        ctx.emit(
            SimEventKind::ItemPickedUp { thing: id, item },
            format!("picked up the {}", item.name()),
        );
    }
    taken
}

/// The line a use press from `origin` facing `dir` would activate.
///
/// Walks the lines along the ray nearest-first up to `range`. The first
/// line with a special wins; a solid or closed line without one ends the
/// search. Also returns which side of the line `origin` is on.
pub fn find_use_line(map: &MapIndex, origin: Vec2, dir: Vec2, range: f32) -> Option<(usize, Side)> {
    let dir = dir.try_normalize()?;
    let mut hits: Vec<(f32, usize)> = map
        .query_block(Aabb::from_corners(origin, origin + dir * range))
        .into_iter()
        .filter_map(|line| {
            let (a, b) = map.line_endpoints(line)?;
            let s = ray_segment_intersection(origin, dir, a, b)?;
            (s <= range).then_some((s, line))
        })
        .collect();
    hits.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));

    for (_, line) in hits {
        let linedef = map.linedef(line)?;
        if linedef.special != 0 {
            let (a, b) = map.line_endpoints(line)?;
            return Some((line, point_on_side(origin, a, b - a)));
        }
        let open = linedef.is_two_sided() && map.opening(line).is_some_and(|o| o.gap() > 0.0);
        if !open {
            return None;
        }
    }
    None
}
