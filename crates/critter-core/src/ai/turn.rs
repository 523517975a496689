//! Per-turn driver
//!
//! [`take_turn`] alternates planning and moving until the creature runs out
//! of move points. [`move_creature`] is one round: shake off whatever holds
//! it, pick the next tile and act on it.

use hashbrown::HashSet;

use crate::creature::{Attitude, CreatureId, Effect, MonsterAttitude, MoverFlags};
use crate::map::{Tripoint, square_dist, squares_closer_to};

use super::deferred::resume_deferred;
use super::execute::{attack_at, bash_at, dig_at, move_to, open_door_at, push_to, stumble};
use super::plan::plan;
use super::step::{Candidate, StepKind, assess_step, pick_step, scent_candidates, wander_next};
use crate::world::World;

/// Effects that pin a creature, and the odds of wriggling free each round
const ESCAPE_ODDS: i32 = 4;

/// Plan and move `id` until its move points run out
pub fn take_turn(world: &mut World, id: CreatureId) {
    for _ in 0..world.options.max_actions_per_turn {
        let Some(before) = world.creatures.live(id).map(|c| c.moves) else {
            return;
        };
        if before <= 0 {
            return;
        }
        plan(world, id);
        move_creature(world, id);
        match world.creatures.get_mut(id) {
            Some(c) if c.moves >= before => c.moves = 0,
            Some(_) => {}
            None => return,
        }
    }
    if let Some(c) = world.creatures.get_mut(id) {
        tracing::warn!(%id, moves = c.moves, "action guard hit");
        c.moves = 0;
    }
}

/// Shrug off pinning effects. True if still held this round.
fn held_in_place(world: &mut World, id: CreatureId) -> bool {
    let World { creatures, rng, .. } = world;
    let Some(c) = creatures.get_mut(id) else {
        return true;
    };
    if c.has_flag(MoverFlags::IMMOBILE) {
        c.moves = 0;
        return true;
    }
    let pins: Vec<Effect> = c
        .effects
        .iter()
        .map(|(e, _)| e)
        .filter(|e| e.immobilizes())
        .collect();
    let mut held = false;
    for effect in pins {
        if rng.one_in(ESCAPE_ODDS) {
            c.remove_effect(effect);
        } else {
            held = true;
        }
    }
    if c.has_effect(Effect::Grabbed) {
        if rng.one_in(ESCAPE_ODDS) {
            c.remove_effect(Effect::Grabbed);
            tracing::debug!(%id, "broke free");
        } else {
            held = true;
        }
    }
    if held {
        c.moves = 0;
    }
    held
}

/// Creatures a route should steer around rather than through
fn route_avoid_set(world: &World, id: CreatureId, goal: Tripoint) -> HashSet<Tripoint> {
    let Some(me) = world.creatures.live(id) else {
        return HashSet::new();
    };
    world
        .creatures
        .iter()
        .filter(|o| o.id != id && o.is_alive() && o.pos.z == me.pos.z && o.pos != goal)
        .filter(|o| {
            world.attitude_between(me, o) != Attitude::Hostile && !me.has_flag(MoverFlags::ATTACKMON)
        })
        .map(|o| o.pos)
        .collect()
}

/// Route to the goal again if the current path does not lead there
fn refresh_path(world: &mut World, id: CreatureId, goal: Tripoint) {
    let Some(c) = world.creatures.live(id) else {
        return;
    };
    if c.pos == goal || c.path.back() == Some(&goal) {
        return;
    }
    let settings = c.path_settings(&world.options.path);
    let start = c.pos;
    let avoid = route_avoid_set(world, id, goal);
    let route = world.map.route(start, goal, &settings, &avoid);
    tracing::trace!(%id, goal = %goal, steps = route.len(), "route");
    if let Some(c) = world.creatures.get_mut(id) {
        c.path = route.into();
    }
}

/// The tile to act on this round, and what acting on it means
fn choose_step(world: &mut World, id: CreatureId) -> Option<Candidate> {
    let c = world.creatures.live(id)?;
    let pos = c.pos;

    if let Some(&next) = c.path.front() {
        let adjacent = (next.z == pos.z && square_dist(pos, next) <= 1)
            || (pos.same_column(next) && (next.z - pos.z).abs() == 1);
        if adjacent {
            if let Some(kind) = assess_step(world, c, next) {
                return Some(Candidate {
                    pos: next,
                    kind,
                    progress: 1.0,
                });
            }
        }
        if let Some(c) = world.creatures.get_mut(id) {
            c.path.clear();
        }
    }

    let c = world.creatures.live(id)?;
    if let Some(goal) = c.goal {
        let squares = squares_closer_to(pos, goal);
        if let Some(step) = pick_step(world, id, goal, &squares) {
            return Some(step);
        }
    }

    let c = world.creatures.live(id)?;
    let local = if c.has_flag(MoverFlags::SMELLS) && c.goal.is_none() {
        let options = scent_candidates(world, c);
        world.rng.choose(&options).copied()
    } else {
        None
    };
    let next = match local {
        Some(p) => Some(p),
        None if c.wandf > 0 => wander_next(world, c),
        None => None,
    }?;
    let kind = assess_step(world, c, next)?;
    Some(Candidate {
        pos: next,
        kind,
        progress: 0.0,
    })
}

/// Act on the chosen tile; false if nothing came of it
fn execute_step(world: &mut World, id: CreatureId, step: Candidate) -> bool {
    let p = step.pos;
    match step.kind {
        StepKind::Attack(_) => attack_at(world, id, p),
        StepKind::Push(_) => push_to(world, id, p, 0, 0),
        StepKind::OpenDoor => open_door_at(world, id, p) || bash_at(world, id, p),
        StepKind::Bash => bash_at(world, id, p),
        StepKind::Dig => dig_at(world, id, p),
        StepKind::Enter => bash_at(world, id, p) || move_to(world, id, p, false),
    }
}

/// One round of movement for a creature that has already planned
pub fn move_creature(world: &mut World, id: CreatureId) {
    let Some(c) = world.creatures.get_mut(id).filter(|c| c.is_alive()) else {
        return;
    };
    if c.wandf > 0 {
        c.wandf -= 1;
        if c.wandf == 0 {
            c.wander_pos = None;
        }
    }

    if resume_deferred(world, id) || held_in_place(world, id) {
        return;
    }
    let Some(c) = world.creatures.live(id) else {
        return;
    };
    if c.has_effect(Effect::Stunned) {
        stumble(world, id, false);
        if let Some(c) = world.creatures.get_mut(id) {
            c.moves = 0;
        }
        return;
    }

    let mode = world.options.distance_mode;
    let mood = match c.target.and_then(|t| world.creatures.live(t)) {
        Some(target) => world.mood_toward(c, target),
        None => MonsterAttitude::Attack,
    };
    let idle = match (mood, c.goal) {
        (MonsterAttitude::Ignore, _) => true,
        (MonsterAttitude::Follow, Some(goal)) => mode.rl_dist(c.pos, goal) <= world.options.follow_distance,
        _ => false,
    };
    if idle {
        if let Some(c) = world.creatures.get_mut(id) {
            c.moves -= 100;
            c.path.clear();
        }
        stumble(world, id, false);
        return;
    }

    if let Some(goal) = c.goal {
        refresh_path(world, id, goal);
    }
    let acted = match choose_step(world, id) {
        Some(step) => {
            tracing::trace!(%id, to = %step.pos, kind = ?step.kind, "step");
            execute_step(world, id, step)
        }
        None => false,
    };

    let Some(c) = world.creatures.get_mut(id).filter(|c| c.is_alive()) else {
        return;
    };
    if !acted {
        c.moves -= 100;
    }
    let moved = c.moved;
    if c.has_flag(MoverFlags::STUMBLES) {
        stumble(world, id, moved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::{Creature, FactionId};
    use crate::map::Map;
    use crate::world::{EngineOptions, WorldEvent};

    fn world_from(rows: &[&str]) -> World {
        let mut world = World::new(
            Map::from_ascii(rows),
            EngineOptions {
                seed: Some(21),
                ..EngineOptions::default()
            },
        );
        world.rebuild_caches();
        world
    }

    #[test]
    fn test_hostile_neighbour_is_attacked() {
        let mut world = world_from(&["#######", "#.....#", "#######"]);
        let you = world.spawn(Creature::avatar(Tripoint::new(2, 1, 0))).unwrap();
        let z = world.spawn(Creature::new("zombie", Tripoint::new(3, 1, 0))).unwrap();
        world.creatures.get_mut(z).unwrap().moves = 100;
        world.rebuild_caches();
        plan(&mut world, z);
        move_creature(&mut world, z);
        assert!(world.events.iter().any(|e| matches!(
            e,
            WorldEvent::Attacked { attacker, target, .. } if *attacker == z && *target == you
        )));
        assert_eq!(world.creatures.get(z).unwrap().pos, Tripoint::new(3, 1, 0));
    }

    #[test]
    fn test_zombie_closes_distance() {
        let mut world = world_from(&["##########", "#........#", "##########"]);
        world.spawn(Creature::avatar(Tripoint::new(1, 1, 0))).unwrap();
        let z = world.spawn(Creature::new("zombie", Tripoint::new(7, 1, 0))).unwrap();
        world.creatures.get_mut(z).unwrap().moves = 100;
        world.rebuild_caches();
        take_turn(&mut world, z);
        let c = world.creatures.get(z).unwrap();
        assert_eq!(c.pos, Tripoint::new(6, 1, 0));
        assert!(c.moves <= 0);
    }

    #[test]
    fn test_immobile_creature_stays_put() {
        let mut world = world_from(&["#####", "#...#", "#####"]);
        world.spawn(Creature::avatar(Tripoint::new(1, 1, 0))).unwrap();
        let turret = Creature::new("turret", Tripoint::new(3, 1, 0)).with_flags(MoverFlags::IMMOBILE);
        let turret = world.spawn(turret).unwrap();
        world.creatures.get_mut(turret).unwrap().moves = 100;
        take_turn(&mut world, turret);
        let c = world.creatures.get(turret).unwrap();
        assert_eq!(c.pos, Tripoint::new(3, 1, 0));
        assert_eq!(c.moves, 0);
    }

    #[test]
    fn test_calm_creature_does_not_chase() {
        let mut world = world_from(&["#########", "#.......#", "#########"]);
        world.spawn(Creature::avatar(Tripoint::new(1, 1, 0))).unwrap();
        let mut deer = Creature::new("deer", Tripoint::new(6, 1, 0));
        deer.faction = FactionId::ANIMAL;
        let deer = world.spawn(deer).unwrap();
        world.creatures.get_mut(deer).unwrap().moves = 100;
        world.rebuild_caches();
        plan(&mut world, deer);
        move_creature(&mut world, deer);
        let c = world.creatures.get(deer).unwrap();
        assert!(c.pos.x >= 5);
        assert!(c.moves <= 0);
    }

    #[test]
    fn test_moves_never_grow_during_a_turn() {
        let mut world = world_from(&["#######", "#.....#", "#.....#", "#######"]);
        world.spawn(Creature::avatar(Tripoint::new(1, 1, 0))).unwrap();
        let mut rat = Creature::new("rat", Tripoint::new(5, 2, 0)).with_flags(MoverFlags::STUMBLES);
        rat.speed = 250;
        rat.moves = 250;
        let rat = world.spawn(rat).unwrap();
        world.rebuild_caches();
        let mut last = 250;
        for _ in 0..5 {
            if world.creatures.get(rat).unwrap().moves <= 0 {
                break;
            }
            plan(&mut world, rat);
            move_creature(&mut world, rat);
            let now = world.creatures.get(rat).unwrap().moves;
            assert!(now < last);
            last = now;
        }
    }
}
