//! Multi-turn actions
//!
//! A creature busy dragging or digging carries a [`PendingAction`] from one
//! turn to the next. It is checked again at the start of every turn and
//! dropped as soon as it no longer makes sense.

use crate::creature::{CreatureId, Effect, PendingAction};
use crate::map::{Terrain, TileFlags, Tripoint};
use crate::world::{World, WorldEvent};

use super::execute::move_to;
use super::step::can_move_to;

/// Carry on with a pending action.
///
/// True when the action used up the turn; false when there was nothing to
/// do or the action had to be abandoned.
pub fn resume_deferred(world: &mut World, id: CreatureId) -> bool {
    let Some(pending) = world.creatures.live(id).and_then(|c| c.pending) else {
        return false;
    };
    match pending {
        PendingAction::Dragging { victim } => continue_drag(world, id, victim),
        PendingAction::Mining { target, turns_left } => continue_mining(world, id, target, turns_left),
    }
}

fn abandon(world: &mut World, id: CreatureId) {
    if let Some(c) = world.creatures.get_mut(id) {
        c.pending = None;
        c.remove_effect(Effect::Dragging);
        c.remove_effect(Effect::Grabbing);
    }
    tracing::debug!(%id, "abandoned pending action");
}

fn continue_drag(world: &mut World, id: CreatureId, victim: CreatureId) -> bool {
    let Some(c) = world.creatures.live(id) else {
        return false;
    };
    let mode = world.options.distance_mode;
    let held = world
        .creatures
        .live(victim)
        .filter(|v| v.has_effect(Effect::Grabbed) && mode.rl_dist(v.pos, c.pos) == 1)
        .map(|v| v.pos);
    let Some(victim_pos) = held else {
        abandon(world, id);
        return false;
    };

    let pos = c.pos;
    let toward = c.goal;
    let mut steps: Vec<Tripoint> = pos
        .neighbors()
        .into_iter()
        .filter(|&p| p != victim_pos && world.is_empty(p) && can_move_to(world, c, p))
        .collect();
    match toward {
        Some(goal) => steps.sort_by_key(|&p| mode.rl_dist(p, goal)),
        None => steps.sort_by_key(|&p| -mode.rl_dist(p, victim_pos)),
    }

    let Some(&step) = steps.first() else {
        if let Some(c) = world.creatures.get_mut(id) {
            c.moves = 0;
        }
        return true;
    };
    if !move_to(world, id, step, false) {
        return false;
    }
    if world.creatures.relocate(victim, pos) {
        world.log(WorldEvent::Dragged { id, victim, to: pos });
    }
    true
}

fn continue_mining(world: &mut World, id: CreatureId, target: Tripoint, turns_left: i32) -> bool {
    let Some(c) = world.creatures.live(id) else {
        return false;
    };
    let adjacent = target.z == c.pos.z && world.options.distance_mode.rl_dist(c.pos, target) == 1;
    if !adjacent || !world.map.impassable(target) || !world.map.has_flag(TileFlags::DIGGABLE, target) {
        abandon(world, id);
        return false;
    }

    let turns_left = turns_left - 1;
    if let Some(c) = world.creatures.get_mut(id) {
        c.moves = 0;
        c.pending = (turns_left > 0).then_some(PendingAction::Mining { target, turns_left });
    }
    if turns_left <= 0 {
        world.map.set_ter(target, Terrain::RockFloor);
        tracing::debug!(%id, pos = %target, "dug through");
        world.log(WorldEvent::Dug { id, pos: target });
    }
    true
}
