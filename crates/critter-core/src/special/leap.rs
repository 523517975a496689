//! Leaping toward the goal over open ground

use serde::{Deserialize, Serialize};

use super::{EffectChance, SelfConditions, SpecialAttack};
use crate::creature::{CreatureId, Effect};
use crate::map::{TileFlags, Tripoint, line_to, square_dist, trig_dist};
use crate::world::{World, WorldEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeapAttack {
    pub name: String,
    pub cooldown: i32,
    pub conditions: SelfConditions,
    /// Shortest jump worth taking
    pub min_range: f32,
    pub max_range: f32,
    /// Only leap when the goal is at least this far away
    pub min_consider_range: f32,
    /// ...and no farther than this
    pub max_consider_range: f32,
    /// Leap toward the goal even with nobody to attack there
    pub allow_no_target: bool,
    /// Take a leap even if it does not bring the goal closer
    pub prefer_leap: bool,
    /// Land anywhere in range rather than as close to the goal as possible
    pub random_leap: bool,
    pub move_cost: i32,
    /// Applied to the leaper on landing
    pub self_effects: Vec<EffectChance>,
}

impl LeapAttack {
    pub fn new(name: impl Into<String>, max_range: f32) -> Self {
        Self {
            name: name.into(),
            cooldown: 5,
            conditions: SelfConditions::default(),
            min_range: 1.0,
            max_range,
            min_consider_range: 0.0,
            max_consider_range: 200.0,
            allow_no_target: false,
            prefer_leap: false,
            random_leap: false,
            move_cost: 150,
            self_effects: Vec::new(),
        }
    }

    /// Landing spots, best first, with their distance to the goal
    fn landing_options(&self, world: &World, id: CreatureId, goal: Tripoint) -> Vec<Tripoint> {
        let Some(c) = world.creatures.live(id) else {
            return Vec::new();
        };
        let mode = world.options.distance_mode;
        let pos = c.pos;
        let leap_dist = |p: Tripoint| {
            if mode.is_trig() {
                trig_dist(pos, p)
            } else {
                square_dist(pos, p) as f32
            }
        };
        let mut best = mode.rl_dist(pos, goal) as f32;

        let radius = self.max_range.ceil() as i32;
        let mut candidates: Vec<(f32, Tripoint)> = Vec::new();
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                let p = pos.offset(dx, dy, 0);
                if p == pos || !world.map.inbounds(p) {
                    continue;
                }
                let jump = leap_dist(p);
                if jump < self.min_range || jump > self.max_range {
                    continue;
                }
                let to_goal = mode.rl_dist(p, goal) as f32;
                if to_goal >= best && !self.prefer_leap && !self.random_leap {
                    continue;
                }
                candidates.push((to_goal, p));
            }
        }
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut options = Vec::new();
        for (to_goal, p) in candidates {
            if to_goal > best && !self.random_leap && !options.is_empty() {
                break;
            }
            if !world.is_empty(p) || !world.creature_sees(c, p) {
                continue;
            }
            if line_to(pos, p).iter().any(|&q| world.map.impassable(q)) {
                continue;
            }
            let deep = world.map.has_flag(TileFlags::DEEP_WATER, p);
            if deep && !c.can_submerge() && !c.flies() {
                continue;
            }
            best = to_goal;
            options.push(p);
        }
        options
    }
}

impl SpecialAttack for LeapAttack {
    fn name(&self) -> &str {
        &self.name
    }

    fn cooldown(&self) -> i32 {
        self.cooldown
    }

    fn call(&self, world: &mut World, id: CreatureId) -> bool {
        let Some(c) = world.creatures.live(id) else {
            return false;
        };
        let Some(goal) = c.goal else {
            return false;
        };
        let pinned = c.has_effect(Effect::Stunned) || c.effects.iter().any(|(e, _)| e.immobilizes());
        if pinned || !self.conditions.check(c, &mut world.rng) {
            return false;
        }
        let to_goal = world.options.distance_mode.rl_dist(c.pos, goal) as f32;
        if to_goal < self.min_consider_range || to_goal > self.max_consider_range {
            return false;
        }
        if !self.allow_no_target && c.target.and_then(|t| world.creatures.live(t)).is_none() {
            return false;
        }

        let options = self.landing_options(world, id, goal);
        let Some(&to) = world.rng.choose(&options) else {
            return false;
        };
        let Some(from) = world.creatures.get_mut(id).map(|c| {
            c.moves -= self.move_cost;
            c.path.clear();
            c.pos
        }) else {
            return false;
        };
        if !world.creatures.relocate(id, to) {
            return false;
        }
        tracing::debug!(%id, %from, %to, "leapt");
        world.log(WorldEvent::Leapt { id, from, to });

        for eff in &self.self_effects {
            if world.rng.percent(eff.chance) {
                let turns = world.rng.rng(eff.min_turns, eff.max_turns);
                if let Some(c) = world.creatures.get_mut(id) {
                    c.add_effect(eff.effect, turns);
                }
            }
        }
        true
    }
}
