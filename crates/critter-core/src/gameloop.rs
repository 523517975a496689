//! Turn driver

use crate::ai::take_turn;
use crate::consts::{AVATAR_SCENT, AVATAR_SCENT_FALLOFF};
use crate::special::run_specials;
use crate::world::World;

/// Result of a simulation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    /// Keep going
    Continue,
    /// The avatar is dead, or there never was one
    AvatarGone,
}

/// Steps every creature in a [`World`] one turn at a time
#[derive(Debug)]
pub struct Simulation {
    pub world: World,
}

impl Simulation {
    pub fn new(world: World) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }

    /// Run one turn.
    ///
    /// Creatures act in spawn order, so a later mover sees what earlier ones
    /// did this same turn.
    pub fn tick(&mut self) -> TickResult {
        let world = &mut self.world;
        world.turn += 1;
        world.rebuild_caches();

        if let Some(pos) = world.creatures.avatar().map(|a| a.pos) {
            let World { scent, map, .. } = world;
            scent.lay(map, pos, AVATAR_SCENT, AVATAR_SCENT_FALLOFF);
        }

        for id in world.creatures.ids() {
            let Some(c) = world.creatures.get_mut(id).filter(|c| c.is_alive() && !c.is_avatar()) else {
                continue;
            };
            let expired = c.effects.tick();
            if !expired.is_empty() {
                tracing::trace!(%id, ?expired, "effects expired");
            }
            c.tick_cooldowns();
            c.moves = c.moves.min(0) + c.speed;
            c.moved = false;
            if c.moves <= 0 {
                tracing::trace!(%id, moves = c.moves, "still paying off moves");
                continue;
            }

            if run_specials(world, id) {
                continue;
            }
            take_turn(world, id);
        }

        world.scent.decay(world.options.scent_decay);
        let dead = world.creatures.remove_dead();
        if !dead.is_empty() {
            tracing::debug!(?dead, "removed dead creatures");
        }
        tracing::debug!(turn = world.turn, "tick done");

        if world.creatures.avatar().is_some() {
            TickResult::Continue
        } else {
            TickResult::AvatarGone
        }
    }

    /// Run up to `turns` ticks, stopping early once the avatar is gone
    pub fn run(&mut self, turns: u64) -> TickResult {
        for _ in 0..turns {
            if self.tick() == TickResult::AvatarGone {
                return TickResult::AvatarGone;
            }
        }
        TickResult::Continue
    }
}
