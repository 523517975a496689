//! Melee specials: bites, grabs and heavy blows

use serde::{Deserialize, Serialize};

use super::{EffectConditions, SelfConditions, SpecialAttack};
use crate::ai::knock_back_from;
use crate::combat::{DamageInstance, DamageType};
use crate::creature::{CreatureId, Effect, MoverFlags, PERMANENT, PendingAction};
use crate::world::{World, WorldEvent};

/// How long a grab holds before it must be renewed
const GRAB_TURNS: i32 = 10;

/// An effect applied with some chance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectChance {
    pub effect: Effect,
    /// Percent
    pub chance: u32,
    pub min_turns: i32,
    pub max_turns: i32,
}

impl EffectChance {
    pub const fn new(effect: Effect, chance: u32, min_turns: i32, max_turns: i32) -> Self {
        Self {
            effect,
            chance,
            min_turns,
            max_turns,
        }
    }
}

/// A close-range attack with its own damage and riders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeleeAttack {
    pub name: String,
    pub cooldown: i32,
    pub conditions: SelfConditions,
    pub target_conditions: EffectConditions,
    /// Damage at the top of the multiplier band
    pub damage: DamageInstance,
    pub min_mul: f32,
    pub max_mul: f32,
    /// Overrides the creature's own melee skill
    pub accuracy: Option<i32>,
    pub move_cost: i32,
    /// Reach in tiles; beyond 1 the line to the target must be clear
    pub range: i32,
    /// Only usable on targets that are not adjacent
    pub no_adjacent: bool,
    pub dodgeable: bool,
    /// Applied to the target
    pub effects: Vec<EffectChance>,
    /// Target effects only land when damage gets through
    pub effects_require_damage: bool,
    /// Percent chance a damaging hit infects; set for bites
    pub infection_chance: Option<u32>,
    /// Grab the target on a hit
    pub grabs: bool,
    /// Start dragging a grabbed target
    pub drags: bool,
    /// Send the target flying one tile
    pub knockback: bool,
}

impl MeleeAttack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cooldown: 1,
            conditions: SelfConditions::default(),
            target_conditions: EffectConditions::default(),
            damage: DamageInstance::single(DamageType::Bash, 9.0),
            min_mul: 0.5,
            max_mul: 1.0,
            accuracy: None,
            move_cost: 100,
            range: 1,
            no_adjacent: false,
            dodgeable: true,
            effects: Vec::new(),
            effects_require_damage: true,
            infection_chance: None,
            grabs: false,
            drags: false,
            knockback: false,
        }
    }

    /// A cutting bite that may infect
    pub fn bite(name: impl Into<String>, infection_chance: u32) -> Self {
        Self {
            damage: DamageInstance::single(DamageType::Cut, 6.0),
            infection_chance: Some(infection_chance),
            ..Self::new(name)
        }
    }

    pub fn with_effect(mut self, effect: EffectChance) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_grab(mut self, drags: bool) -> Self {
        self.grabs = true;
        self.drags = drags;
        self
    }

    pub fn with_knockback(mut self) -> Self {
        self.knockback = true;
        self
    }

    /// The current target if it is within reach
    fn find_target(&self, world: &World, id: CreatureId) -> Option<CreatureId> {
        let c = world.creatures.live(id)?;
        let target = world.creatures.live(c.target?)?;
        let mode = world.options.distance_mode;
        let adjacent = target.pos.z == c.pos.z && mode.rl_dist(c.pos, target.pos) == 1;
        if self.no_adjacent && adjacent {
            return None;
        }
        if self.range > 1 {
            let reachable = world.creature_sees(c, target.pos)
                && world.map.clear_path(c.pos, target.pos, self.range, 1, 200);
            reachable.then_some(target.id)
        } else {
            adjacent.then_some(target.id)
        }
    }

    fn apply_effects(&self, world: &mut World, target: CreatureId) {
        for eff in &self.effects {
            if !world.rng.percent(eff.chance) {
                continue;
            }
            let turns = world.rng.rng(eff.min_turns, eff.max_turns);
            if let Some(t) = world.creatures.get_mut(target) {
                t.add_effect(eff.effect, turns);
            }
        }
    }

    fn grab(&self, world: &mut World, id: CreatureId, target: CreatureId) {
        if world.creatures.live(target).is_none() {
            return;
        }
        if let Some(t) = world.creatures.get_mut(target) {
            t.add_effect(Effect::Grabbed, GRAB_TURNS);
        }
        if let Some(c) = world.creatures.get_mut(id) {
            c.add_effect(Effect::Grabbing, GRAB_TURNS);
            if self.drags {
                c.add_effect(Effect::Dragging, GRAB_TURNS);
                c.pending = Some(PendingAction::Dragging { victim: target });
            }
        }
        world.log(WorldEvent::Grabbed {
            grabber: id,
            victim: target,
        });
    }
}

impl SpecialAttack for MeleeAttack {
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
        if !self.conditions.check(c, &mut world.rng) {
            return false;
        }
        let Some(tid) = self.find_target(world, id) else {
            return false;
        };
        let (Some(c), Some(target)) = (world.creatures.live(id), world.creatures.live(tid)) else {
            return false;
        };
        if !self.target_conditions.holds(target) {
            return false;
        }

        let accuracy = self.accuracy.unwrap_or(c.melee.skill);
        let roll = world.rng.dice(accuracy, 10);
        let spread = world.combat.deal_melee_attack(c, target, roll, &mut world.rng);
        let bp = world.combat.select_body_part(spread, &mut world.rng);
        let (pos, hit_and_run) = (c.pos, c.has_flag(MoverFlags::HIT_AND_RUN));
        if let Some(c) = world.creatures.get_mut(id) {
            c.moves -= self.move_cost;
            if hit_and_run {
                c.add_effect(Effect::Run, 4);
            }
        }

        if self.dodgeable && spread < 0 {
            tracing::trace!(%id, target = %tid, ability = %self.name, "dodged");
            world.log(WorldEvent::Attacked {
                attacker: id,
                target: tid,
                hit: false,
                damage: 0,
            });
            return true;
        }

        let mut damage = self.damage.clone();
        damage.mult_damage(world.rng.rng_float(self.min_mul as f64, self.max_mul as f64) as f32);
        let dealt = world
            .deal_damage(Some(id), tid, bp, &damage)
            .map_or(0, |d| d.amount);
        world.log(WorldEvent::Attacked {
            attacker: id,
            target: tid,
            hit: true,
            damage: dealt,
        });

        if dealt > 0 {
            self.apply_effects(world, tid);
            if let Some(chance) = self.infection_chance
                && world.rng.percent(chance)
                && let Some(t) = world.creatures.get_mut(tid)
            {
                t.add_effect(Effect::Infected, PERMANENT);
            }
        } else if !self.effects_require_damage {
            self.apply_effects(world, tid);
        }

        if self.grabs {
            self.grab(world, id, tid);
        }
        if self.knockback && world.creatures.live(tid).is_some() {
            if let Some(c) = world.creatures.get_mut(id) {
                c.remove_effect(Effect::Grabbing);
            }
            knock_back_from(world, tid, pos);
        }
        true
    }
}
