//! Step execution
//!
//! Each routine tries one kind of action and reports whether it happened.
//! Move points are charged here; nothing ever hands them back.

use crate::combat::{BodyPart, DamageInstance, DamageType};
use crate::consts::STAIR_SHIM_RADIUS;
use crate::creature::{Creature, CreatureId, CreatureSize, Effect, MoverFlags, PendingAction};
use crate::map::{BashResult, FieldType, Terrain, TileFlags, TrapType, Tripoint, manhattan_dist};
use crate::world::{World, WorldEvent};

use super::step::{calc_movecost, can_move_to, group_bash_skill};

/// Turns needed to tunnel through one tile
const DIG_TURNS: i32 = 3;

fn hurt(world: &mut World, id: CreatureId, kind: DamageType, amount: i32) {
    if amount <= 0 {
        return;
    }
    let damage = DamageInstance::single(kind, amount as f32);
    world.deal_damage(None, id, BodyPart::Torso, &damage);
}

fn is_divable(world: &World, p: Tripoint) -> bool {
    world.map.has_flag(TileFlags::DEEP_WATER, p) && world.map.has_flag(TileFlags::LIQUID, p)
}

/// Roll a melee attack from `attacker` against `target` and apply the damage
pub fn melee_hit(world: &mut World, attacker: CreatureId, target: CreatureId) -> bool {
    let (Some(a), Some(t)) = (world.creatures.live(attacker), world.creatures.live(target)) else {
        return false;
    };
    let roll = world.rng.dice(a.melee.skill, 10);
    let spread = world.combat.deal_melee_attack(a, t, roll, &mut world.rng);
    let (dice, sides) = (a.melee.dice, a.melee.sides);
    let hit_and_run = a.has_flag(MoverFlags::HIT_AND_RUN);
    if let Some(a) = world.creatures.get_mut(attacker) {
        a.moves -= 100;
    }

    let mut damage = 0;
    if spread >= 0 {
        let bp = world.combat.select_body_part(spread, &mut world.rng);
        let raw = world.rng.dice(dice, sides);
        let hit = DamageInstance::single(DamageType::Bash, raw as f32);
        damage = world
            .deal_damage(Some(attacker), target, bp, &hit)
            .map_or(0, |d| d.amount);
        if hit_and_run && let Some(a) = world.creatures.get_mut(attacker) {
            a.add_effect(Effect::Run, 4);
        }
    }
    tracing::trace!(%attacker, %target, spread, damage, "melee");
    world.log(WorldEvent::Attacked {
        attacker,
        target,
        hit: spread >= 0,
        damage,
    });
    true
}

/// Attack whoever stands on `p`
pub fn attack_at(world: &mut World, id: CreatureId, p: Tripoint) -> bool {
    let Some(c) = world.creatures.live(id) else {
        return false;
    };
    if p.z != c.pos.z || c.has_effect(Effect::Pacified) {
        return false;
    }
    match world.creatures.id_at(p) {
        Some(target) if target != id => melee_hit(world, id, target),
        _ => false,
    }
}

pub fn open_door_at(world: &mut World, id: CreatureId, p: Tripoint) -> bool {
    let Some(c) = world.creatures.live(id) else {
        return false;
    };
    if !c.can_open_doors() || world.map.ter(p).opened().is_none() {
        return false;
    }
    let inside = !world.map.is_outside(c.pos);
    if !world.map.open_door(p, inside) {
        return false;
    }
    if let Some(c) = world.creatures.get_mut(id) {
        c.moves -= 100;
    }
    world.log(WorldEvent::DoorOpened { id, pos: p });
    true
}

/// Smash at `p` if something there blocks us, or now and then just because
pub fn bash_at(world: &mut World, id: CreatureId, p: Tripoint) -> bool {
    let Some(c) = world.creatures.live(id) else {
        return false;
    };
    if p.z != c.pos.z || c.bash_strength() <= 0 {
        return false;
    }
    let blocked = !can_move_to(world, c, p);
    if !blocked && !world.rng.one_in(3) {
        return false;
    }
    if !world.is_empty(p) {
        return false;
    }
    let strength = group_bash_skill(world, c, p);
    if world.map.bash_rating(strength, p) <= 0 {
        return false;
    }
    let result = world.map.bash(p, strength, &mut world.rng);
    if result == BashResult::NotBashable {
        return false;
    }
    if let Some(c) = world.creatures.get_mut(id) {
        c.moves -= 100;
    }
    let smashed = result == BashResult::Smashed;
    tracing::debug!(%id, pos = %p, strength, smashed, "bash");
    world.log(WorldEvent::Bashed { id, pos: p, smashed });
    true
}

/// Start tunnelling into `p`; the work carries over to later turns
pub fn dig_at(world: &mut World, id: CreatureId, p: Tripoint) -> bool {
    let Some(c) = world.creatures.live(id) else {
        return false;
    };
    if !c.digs()
        || p.z != c.pos.z
        || !world.map.impassable(p)
        || !world.map.has_flag(TileFlags::DIGGABLE, p)
    {
        return false;
    }
    if let Some(c) = world.creatures.get_mut(id) {
        c.pending = Some(PendingAction::Mining {
            target: p,
            turns_left: DIG_TURNS,
        });
        c.moves = 0;
    }
    tracing::debug!(%id, target = %p, "started digging");
    true
}

/// How hard a creature is to shove this instant
pub fn stability_roll(world: &mut World, c: &Creature) -> i32 {
    let mut stability = world.rng.dice(c.melee.sides, c.melee.dice) + c.size.stability_bonus();
    if c.has_effect(Effect::Stunned) {
        stability -= world.rng.rng(1, 5);
    }
    stability
}

/// Apply the cost of being shoved: downed off rough ground, else lost moves
fn shoved(world: &mut World, id: CreatureId, movecost_from: i32) {
    if let Some(c) = world.creatures.get_mut(id) {
        if movecost_from > 100 {
            c.add_effect(Effect::Downed, movecost_from / 100 + 1);
        } else {
            c.moves -= movecost_from;
        }
    }
}

/// Shove the creature on `p` aside and step into its place.
///
/// `boost` carries leftover strength into cascading shoves, `depth` how far
/// the cascade has gone. A much weaker creature that cannot be moved aside
/// gets trampled instead, but never during a cascade.
pub fn push_to(world: &mut World, id: CreatureId, p: Tripoint, boost: i32, depth: usize) -> bool {
    if depth >= world.options.push_depth {
        return false;
    }
    let Some(me) = world.creatures.live(id) else {
        return false;
    };
    let Some(other) = world.creatures.creature_at(p).filter(|o| o.is_alive()) else {
        return false;
    };
    if other.id == id || other.is_avatar() || p == me.pos || !can_move_to(world, me, p) {
        return false;
    }
    let (me, other) = (me.clone(), other.clone());
    let defend = stability_roll(world, &other);
    let attack = stability_roll(world, &me) + boost;
    if defend > attack {
        return false;
    }

    let movecost_from = 50 * world.map.move_cost(p);
    let movecost_attacker = movecost_from.max(200 - 10 * (attack - defend));
    let dir = p - me.pos;
    if let Some(c) = world.creatures.get_mut(id) {
        c.add_effect(Effect::Pushed, 1);
    }

    for _ in 0..6 {
        let dx = world.rng.rng(-1, 1);
        let dy = world.rng.rng(-1, 1);
        if dx == 0 && dy == 0 {
            continue;
        }
        // Straight ahead is easier than aside
        let direction_penalty = (dx - dir.x).abs() + (dy - dir.y).abs();
        if direction_penalty > 2 {
            continue;
        }
        let dest = p.offset(dx, dy, 0);
        if dest == me.pos {
            continue;
        }
        let movecost_penalty = world.map.move_cost(dest) - 2;
        if movecost_penalty <= -2 {
            continue;
        }
        let roll = attack - (defend + direction_penalty + movecost_penalty);
        if roll < 0 {
            continue;
        }

        if world.creatures.id_at(dest).is_some() {
            if !push_to(world, other.id, dest, roll, depth + 1) {
                continue;
            }
            if world.is_empty(p) {
                move_to(world, id, p, false);
            }
        } else {
            if !world.creatures.relocate(other.id, dest) {
                continue;
            }
            move_to(world, id, p, false);
        }
        if let Some(c) = world.creatures.get_mut(id) {
            c.moves -= movecost_attacker;
        }
        shoved(world, other.id, movecost_from);
        tracing::trace!(pusher = %id, pushed = %other.id, to = %dest, "push");
        world.log(WorldEvent::Pushed {
            pusher: id,
            pushed: other.id,
            to: dest,
        });
        return true;
    }

    if boost > 0 || attack < 2 * defend {
        return false;
    }
    world.creatures.swap_positions(other.id, id);
    let stun = world.rng.rng(0, 2);
    if let Some(o) = world.creatures.get_mut(other.id) {
        o.add_effect(Effect::Stunned, stun);
    }
    if let Some(c) = world.creatures.get_mut(id) {
        c.moves -= movecost_attacker;
    }
    world.log(WorldEvent::Trampled {
        pusher: id,
        trampled: other.id,
    });
    true
}

/// Where a creature taking the stairs at `from` actually lands on level `z`.
///
/// The tile straight above or below wins when it is a matching stair; else
/// the nearest matching stair within reach.
fn stair_landing(world: &World, from: Tripoint, z: i32) -> Option<Tripoint> {
    let arrival = if z > from.z {
        TileFlags::GOES_DOWN
    } else {
        TileFlags::GOES_UP
    };
    let usable =
        |p: Tripoint| world.map.has_flag(arrival, p) && world.map.passable(p) && world.is_empty(p);
    let aligned = from.with_z(z);
    if usable(aligned) {
        return Some(aligned);
    }
    let mode = world.options.distance_mode;
    let mut best: Option<(i32, Tripoint)> = None;
    for dy in -STAIR_SHIM_RADIUS..=STAIR_SHIM_RADIUS {
        for dx in -STAIR_SHIM_RADIUS..=STAIR_SHIM_RADIUS {
            let p = aligned.offset(dx, dy, 0);
            if !world.map.inbounds(p) || !usable(p) {
                continue;
            }
            let d = mode.rl_dist(aligned, p);
            if best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, p));
            }
        }
    }
    best.map(|(_, p)| p)
}

/// Set off whatever trap lies at `p`
fn trigger_trap(world: &mut World, id: CreatureId, p: Tripoint) {
    let Some(trap) = world.map.trap_at(p) else {
        return;
    };
    let Some(c) = world.creatures.live(id) else {
        return;
    };
    if c.has_flag(MoverFlags::NO_TRAPS) || (c.flies() && !trap.triggered_by_flyers()) {
        return;
    }
    tracing::debug!(%id, pos = %p, %trap, "trap");
    world.log(WorldEvent::TrapTriggered { id, pos: p, trap });
    match trap {
        TrapType::BearTrap => {
            let turns = 5 + world.rng.dice(2, 4);
            if let Some(c) = world.creatures.get_mut(id) {
                c.add_effect(Effect::Beartrapped, turns);
            }
            let damage = world.rng.dice(2, 4);
            hurt(world, id, DamageType::Cut, damage);
        }
        TrapType::Caltrops => {
            let damage = world.rng.rng(1, 4);
            hurt(world, id, DamageType::Stab, damage);
        }
        TrapType::Pit => {
            if let Some(c) = world.creatures.get_mut(id) {
                c.add_effect(Effect::Downed, 2);
            }
        }
        TrapType::Landmine => {
            let damage = world.rng.dice(3, 6);
            hurt(world, id, DamageType::Heat, damage);
            world.make_sound(p, 20);
        }
        TrapType::Tripwire => {
            if let Some(c) = world.creatures.get_mut(id) {
                c.add_effect(Effect::Downed, 1);
            }
        }
        TrapType::Snare => {
            if let Some(c) = world.creatures.get_mut(id) {
                c.add_effect(Effect::Snared, 5);
            }
        }
    }
    if trap.single_use() || trap == TrapType::BearTrap {
        world.map.remove_trap(p);
    }
}

/// Chance denominator for a digger to heave up a dirt mound
const fn mound_odds(size: CreatureSize) -> i32 {
    match size {
        CreatureSize::Tiny => 100,
        CreatureSize::Small => 30,
        CreatureSize::Medium => 6,
        CreatureSize::Large => 3,
        CreatureSize::Huge => 1,
    }
}

/// Leave acid, sludge or gas behind
fn emit_trails(world: &mut World, flags: MoverFlags, p: Tripoint) {
    if flags.contains(MoverFlags::ACIDTRAIL) {
        world.map.add_field(p, FieldType::Acid, 3);
    }
    if flags.contains(MoverFlags::SLUDGETRAIL) {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let sp = p.offset(dx, dy, 0);
                let fstr = 3 - manhattan_dist(p, sp);
                if fstr >= 2 {
                    world.map.add_field(sp, FieldType::Sludge, fstr);
                }
            }
        }
    }
    if flags.contains(MoverFlags::GASTRAIL) && world.rng.one_in(6) {
        let dx = world.rng.rng(-1, 1);
        let dy = world.rng.rng(-1, 1);
        world.map.add_field(p.offset(dx, dy, 0), FieldType::ToxicGas, 3);
    }
}

/// Move onto `p` and suffer whatever the tile does.
///
/// Unless `force` is set the tile must be free and passable for us. Stairs
/// that do not line up between levels land on the nearest matching stair.
pub fn move_to(world: &mut World, id: CreatureId, p: Tripoint, force: bool) -> bool {
    let Some(c) = world.creatures.live(id) else {
        return false;
    };
    let from = c.pos;
    let vertical = p.z != from.z;
    let mut dest = p;
    if vertical {
        let stairs = if p.z > from.z {
            TileFlags::GOES_UP
        } else {
            TileFlags::GOES_DOWN
        };
        if world.map.has_flag(stairs, from) {
            match stair_landing(world, from, p.z) {
                Some(landing) => dest = landing,
                None => return false,
            }
        } else if !world.map.valid_move(from, p, c.flies(), c.climbs()) {
            return false;
        }
    }
    if !force && (!world.is_empty(dest) || !can_move_to(world, c, dest)) {
        return false;
    }

    let cost = calc_movecost(world, c, from, dest);
    let flies = c.flies();
    let can_submerge = c.can_submerge();
    let digs = c.digs();
    let size = c.size;
    let mover_flags = c.flags;
    let was_water = c.underwater;
    let will_be_water = !flies && can_submerge && is_divable(world, dest);

    if !world.creatures.relocate(id, dest) {
        return false;
    }
    if let Some(c) = world.creatures.get_mut(id) {
        c.path.pop_front();
        if !force {
            c.moves -= cost;
        }
        c.moved = true;
        c.underwater = will_be_water;
    }
    if vertical {
        tracing::debug!(%id, from = %from, to = %dest, "changed level");
        world.log(WorldEvent::ChangedLevel { id, from, to: dest });
    } else {
        world.log(WorldEvent::Moved { id, from, to: dest });
    }
    if was_water && !will_be_water {
        world.log(WorldEvent::LeftWater { id, pos: dest });
    } else if !was_water && will_be_water {
        world.log(WorldEvent::EnteredWater { id, pos: dest });
    }

    let flags = world.map.flags_at(dest);
    if flags.contains(TileFlags::SWIMMABLE) && !flies {
        if let Some(c) = world.creatures.get_mut(id) {
            c.add_effect(Effect::Drenched, 5);
        }
    }
    if is_divable(world, dest) && !flies && !can_submerge {
        world.log(WorldEvent::Drowned { id });
        world.kill(id, None);
        return true;
    }

    if !flies && size != CreatureSize::Tiny {
        if flags.contains(TileFlags::SHARP) && !world.rng.one_in(4) {
            let damage = world.rng.rng(2, 3);
            hurt(world, id, DamageType::Cut, damage);
        }
        if flags.contains(TileFlags::ROUGH) && world.rng.one_in(6) {
            let damage = world.rng.rng(1, 2);
            hurt(world, id, DamageType::Bash, damage);
        }
    }
    if let Some(c) = world.creatures.get_mut(id) {
        if flags.contains(TileFlags::UNSTABLE) && !flies {
            c.add_effect(Effect::Bouldering, 1);
        } else {
            c.remove_effect(Effect::Bouldering);
        }
    }
    trigger_trap(world, id, dest);

    if world.creatures.live(id).is_none() {
        return true;
    }
    if digs && flags.contains(TileFlags::DIGGABLE) && world.rng.one_in(mound_odds(size)) {
        world.map.set_ter(dest, Terrain::DirtMound);
    }
    emit_trails(world, mover_flags, dest);
    true
}

/// Get flung one tile away from `from`, into whatever is there
pub fn knock_back_from(world: &mut World, id: CreatureId, from: Tripoint) {
    let Some(c) = world.creatures.live(id) else {
        return;
    };
    if from == c.pos {
        return;
    }
    let pos = c.pos;
    let to = pos + (pos - from).signum().with_z(0);
    let my_size = c.size;

    if let Some(other) = world.creatures.creature_at(to).filter(|o| o.is_alive()) {
        let (other_id, other_size) = (other.id, other.size);
        hurt(world, id, DamageType::Bash, other_size as i32);
        if let Some(c) = world.creatures.get_mut(id) {
            c.add_effect(Effect::Stunned, 1);
        }
        if my_size as i32 > 1 + other_size as i32 {
            knock_back_from(world, other_id, pos);
            hurt(world, other_id, DamageType::Bash, my_size as i32);
            if let Some(o) = world.creatures.get_mut(other_id) {
                o.add_effect(Effect::Stunned, 1);
            }
        } else if my_size > other_size {
            hurt(world, other_id, DamageType::Bash, my_size as i32);
            if let Some(o) = world.creatures.get_mut(other_id) {
                o.add_effect(Effect::Stunned, 1);
            }
        }
        world.log(WorldEvent::Bounced {
            id,
            off: Some(other_id),
        });
        return;
    }

    if world.map.impassable(to) {
        hurt(world, id, DamageType::Bash, my_size as i32);
        if let Some(c) = world.creatures.get_mut(id) {
            c.add_effect(Effect::Stunned, 2);
        }
        world.log(WorldEvent::Bounced { id, off: None });
        return;
    }

    if !world.creatures.relocate(id, to) {
        return;
    }
    world.log(WorldEvent::KnockedBack { id, to });
    let Some(c) = world.creatures.live(id) else {
        return;
    };
    if is_divable(world, to) && !c.flies() && !c.can_submerge() {
        world.log(WorldEvent::Drowned { id });
        world.kill(id, None);
    }
}

/// Lurch into a random free neighbour now and then.
///
/// Rarer right after a deliberate move.
pub fn stumble(world: &mut World, id: CreatureId, moved: bool) {
    if (moved && !world.rng.one_in(8)) || !world.rng.one_in(3) {
        return;
    }
    let Some(c) = world.creatures.live(id) else {
        return;
    };
    let in_water = world.map.has_flag(TileFlags::SWIMMABLE, c.pos);
    let holds_breath = c.has_flag(MoverFlags::NO_BREATHE) && !c.swims();
    let options: Vec<Tripoint> = c
        .pos
        .neighbors()
        .into_iter()
        .filter(|&p| world.is_empty(p) && can_move_to(world, c, p))
        .filter(|&p| !(holds_breath && !in_water && world.map.has_flag(TileFlags::SWIMMABLE, p)))
        .collect();
    let Some(&to) = world.rng.choose(&options) else {
        return;
    };
    if move_to(world, id, to, false) {
        if let Some(c) = world.creatures.get_mut(id) {
            c.path.clear();
        }
        tracing::trace!(%id, to = %to, "stumbled");
        world.log(WorldEvent::Stumbled { id, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Map;
    use crate::world::EngineOptions;

    fn world_from(rows: &[&str], seed: u64) -> World {
        let mut world = World::new(
            Map::from_ascii(rows),
            EngineOptions {
                seed: Some(seed),
                ..EngineOptions::default()
            },
        );
        world.rebuild_caches();
        world
    }

    #[test]
    fn test_move_to_spends_points_and_pops_path() {
        let mut world = world_from(&["#####", "#...#", "#####"], 1);
        let id = world.spawn(Creature::new("rat", Tripoint::new(1, 1, 0))).unwrap();
        {
            let c = world.creatures.get_mut(id).unwrap();
            c.moves = 100;
            c.path.extend([Tripoint::new(2, 1, 0), Tripoint::new(3, 1, 0)]);
        }
        assert!(move_to(&mut world, id, Tripoint::new(2, 1, 0), false));
        let c = world.creatures.get(id).unwrap();
        assert_eq!(c.pos, Tripoint::new(2, 1, 0));
        assert_eq!(c.moves, 0);
        assert_eq!(c.path.front(), Some(&Tripoint::new(3, 1, 0)));
        assert!(!move_to(&mut world, id, Tripoint::new(2, 0, 0), false));
    }

    #[test]
    fn test_forced_walker_drowns_but_flier_does_not() {
        let mut world = world_from(&["#####", "#.~.#", "#####"], 1);
        let rat = world.spawn(Creature::new("rat", Tripoint::new(1, 1, 0))).unwrap();
        assert!(move_to(&mut world, rat, Tripoint::new(2, 1, 0), true));
        assert!(world.creatures.live(rat).is_none());
        assert!(world.events.iter().any(|e| *e == WorldEvent::Drowned { id: rat }));

        let bat = Creature::new("bat", Tripoint::new(3, 1, 0)).with_flags(MoverFlags::FLIES);
        let bat = world.spawn(bat).unwrap();
        assert!(move_to(&mut world, bat, Tripoint::new(2, 1, 0), false));
        assert!(world.creatures.live(bat).is_some());
    }

    #[test]
    fn test_swimmer_dives_and_surfaces() {
        let mut world = world_from(&["#####", "#.~.#", "#####"], 1);
        let otter = Creature::new("otter", Tripoint::new(1, 1, 0)).with_flags(MoverFlags::SWIMS);
        let otter = world.spawn(otter).unwrap();
        assert!(move_to(&mut world, otter, Tripoint::new(2, 1, 0), false));
        assert!(world.creatures.get(otter).unwrap().underwater);
        assert!(move_to(&mut world, otter, Tripoint::new(3, 1, 0), false));
        assert!(!world.creatures.get(otter).unwrap().underwater);
        let kinds: Vec<_> = world
            .events
            .iter()
            .filter(|e| matches!(e, WorldEvent::EnteredWater { .. } | WorldEvent::LeftWater { .. }))
            .collect();
        assert_eq!(kinds.len(), 2);
    }

    #[test]
    fn test_bear_trap_holds_and_is_spent() {
        let mut world = world_from(&["#####", "#...#", "#####"], 2);
        let trap = Tripoint::new(2, 1, 0);
        world.map.set_trap(trap, TrapType::BearTrap);
        let mut ox = Creature::new("ox", Tripoint::new(1, 1, 0));
        ox.hp = 100;
        ox.hp_max = 100;
        let ox = world.spawn(ox).unwrap();
        assert!(move_to(&mut world, ox, trap, false));
        let c = world.creatures.get(ox).unwrap();
        assert!(c.has_effect(Effect::Beartrapped));
        assert!(c.hp < 100);
        assert!(world.map.trap_at(trap).is_none());
    }

    #[test]
    fn test_acid_trail_left_behind() {
        let mut world = world_from(&["#####", "#...#", "#####"], 2);
        let blob = Creature::new("blob", Tripoint::new(1, 1, 0)).with_flags(MoverFlags::ACIDTRAIL);
        let blob = world.spawn(blob).unwrap();
        assert!(move_to(&mut world, blob, Tripoint::new(2, 1, 0), false));
        assert_eq!(world.map.field_intensity(Tripoint::new(2, 1, 0), FieldType::Acid), 3);
    }

    #[test]
    fn test_stairs_land_on_nearest_matching_stair() {
        let mut world = World::new(
            Map::from_ascii_levels(
                0,
                &[
                    &["#######", "#<....#", "#######"],
                    &["#######", "#...>.#", "#######"],
                ],
            ),
            EngineOptions {
                seed: Some(1),
                ..EngineOptions::default()
            },
        );
        world.rebuild_caches();
        let id = world.spawn(Creature::new("rat", Tripoint::new(1, 1, 1))).unwrap();
        assert!(!move_to(&mut world, id, Tripoint::new(1, 1, 0), false));
        world.creatures.relocate(id, Tripoint::new(4, 1, 1));
        assert!(move_to(&mut world, id, Tripoint::new(4, 1, 0), false));
        assert_eq!(world.creatures.get(id).unwrap().pos, Tripoint::new(1, 1, 0));
    }

    #[test]
    fn test_knockback_into_wall_stuns() {
        let mut world = world_from(&["#####", "#...#", "#####"], 4);
        let mut c = Creature::new("rat", Tripoint::new(1, 1, 0));
        c.hp = 50;
        let id = world.spawn(c).unwrap();
        knock_back_from(&mut world, id, Tripoint::new(2, 1, 0));
        let c = world.creatures.get(id).unwrap();
        assert_eq!(c.pos, Tripoint::new(1, 1, 0));
        assert!(c.has_effect(Effect::Stunned));
        assert!(world.events.iter().any(|e| *e == WorldEvent::Bounced { id, off: None }));

        knock_back_from(&mut world, id, Tripoint::new(0, 1, 0));
        assert_eq!(world.creatures.get(id).unwrap().pos, Tripoint::new(2, 1, 0));
    }

    #[test]
    fn test_open_door_costs_a_turn() {
        let mut world = world_from(&["#####", "#.+.#", "#####"], 1);
        let c = Creature::new("ghoul", Tripoint::new(1, 1, 0)).with_flags(MoverFlags::CAN_OPEN_DOORS);
        let id = world.spawn(c).unwrap();
        assert!(open_door_at(&mut world, id, Tripoint::new(2, 1, 0)));
        assert_eq!(world.map.ter(Tripoint::new(2, 1, 0)), Terrain::DoorOpen);
        assert_eq!(world.creatures.get(id).unwrap().moves, -100);
        assert!(!open_door_at(&mut world, id, Tripoint::new(2, 1, 0)));
    }

    #[test]
    fn test_dig_sets_pending_mining() {
        let mut world = world_from(&["#####", "#.RR#", "#####"], 1);
        let mole = Creature::new("mole", Tripoint::new(1, 1, 0)).with_flags(MoverFlags::DIGS);
        let id = world.spawn(mole).unwrap();
        assert!(dig_at(&mut world, id, Tripoint::new(2, 1, 0)));
        assert_eq!(
            world.creatures.get(id).unwrap().pending,
            Some(PendingAction::Mining {
                target: Tripoint::new(2, 1, 0),
                turns_left: DIG_TURNS
            })
        );
        assert!(!dig_at(&mut world, id, Tripoint::new(1, 0, 0)));
    }

    #[test]
    fn test_push_moves_weaker_creature_aside() {
        let mut world = world_from(&["#######", "#.....#", "#.....#", "#.....#", "#######"], 9);
        let mut ox = Creature::new("ox", Tripoint::new(1, 2, 0)).with_flags(MoverFlags::PUSH_MON);
        ox.size = CreatureSize::Huge;
        ox.melee.dice = 4;
        ox.melee.sides = 8;
        let ox = world.spawn(ox).unwrap();
        let mut mouse = Creature::new("mouse", Tripoint::new(2, 2, 0));
        mouse.size = CreatureSize::Tiny;
        mouse.melee.dice = 1;
        mouse.melee.sides = 1;
        let mouse = world.spawn(mouse).unwrap();
        assert!(push_to(&mut world, ox, Tripoint::new(2, 2, 0), 0, 0));
        assert_eq!(world.creatures.get(ox).unwrap().pos, Tripoint::new(2, 2, 0));
        assert_ne!(world.creatures.get(mouse).unwrap().pos, Tripoint::new(2, 2, 0));
        assert!(world.creatures.get(ox).unwrap().moves < 0);
    }

    #[test]
    fn test_push_depth_limit() {
        let mut world = world_from(&["#####", "#...#", "#####"], 9);
        world.options.push_depth = 0;
        let ox = world
            .spawn(Creature::new("ox", Tripoint::new(1, 1, 0)).with_flags(MoverFlags::PUSH_MON))
            .unwrap();
        world.spawn(Creature::new("calf", Tripoint::new(2, 1, 0))).unwrap();
        assert!(!push_to(&mut world, ox, Tripoint::new(2, 1, 0), 0, 0));
    }
}
