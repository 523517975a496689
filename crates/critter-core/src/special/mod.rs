//! Special attacks
//!
//! Abilities are registered once by name in an [`AbilityRegistry`]. Each
//! creature holds slots naming the abilities it has, with their own
//! cooldowns. Before moving, a creature tries every ready slot in order;
//! a success resets that slot's cooldown and may stand in for movement.

pub mod gun;
pub mod leap;
pub mod melee;

pub use gun::{GunAttack, RangeBand, ShooterStats, Targeting};
pub use leap::LeapAttack;
pub use melee::{EffectChance, MeleeAttack};

use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::creature::{Creature, CreatureId, Effect};
use crate::rng::GameRng;
use crate::world::{EngineError, EngineResult, World, WorldEvent};

/// A named, cooldown-gated ability
pub trait SpecialAttack: Send + Sync + core::fmt::Debug {
    fn name(&self) -> &str;

    /// Turns to wait after a successful use
    fn cooldown(&self) -> i32;

    /// Whether a successful use stands in for the creature's movement
    fn replaces_movement(&self) -> bool {
        true
    }

    /// Try the ability; true if it went off
    fn call(&self, world: &mut World, id: CreatureId) -> bool;
}

/// Every ability known to the engine
#[derive(Debug, Clone, Default)]
pub struct AbilityRegistry {
    by_name: HashMap<String, Arc<dyn SpecialAttack>>,
    order: Vec<String>,
}

impl AbilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ability; names must be unique
    pub fn register(&mut self, ability: impl SpecialAttack + 'static) -> EngineResult<()> {
        self.register_arc(Arc::new(ability))
    }

    pub fn register_arc(&mut self, ability: Arc<dyn SpecialAttack>) -> EngineResult<()> {
        let name = ability.name().to_string();
        if self.by_name.contains_key(&name) {
            tracing::warn!(ability = %name, "duplicate registration");
            return Err(EngineError::DuplicateAbility(name));
        }
        tracing::debug!(ability = %name, "registered");
        self.order.push(name.clone());
        self.by_name.insert(name, ability);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SpecialAttack>> {
        self.by_name.get(name).cloned()
    }

    /// Like [`get`](Self::get), but an unknown name is an error
    pub fn lookup(&self, name: &str) -> EngineResult<Arc<dyn SpecialAttack>> {
        self.get(name)
            .ok_or_else(|| EngineError::UnknownAbility(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

/// Effect requirements checked against one creature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConditions {
    pub required_all: Vec<Effect>,
    pub required_any: Vec<Effect>,
    pub forbidden_any: Vec<Effect>,
    /// Refused only when every one of these is present
    pub forbidden_all: Vec<Effect>,
}

impl EffectConditions {
    pub fn holds(&self, c: &Creature) -> bool {
        if !self.required_all.iter().all(|&e| c.has_effect(e)) {
            return false;
        }
        if self.forbidden_any.iter().any(|&e| c.has_effect(e)) {
            return false;
        }
        if !self.forbidden_all.is_empty() && self.forbidden_all.iter().all(|&e| c.has_effect(e)) {
            return false;
        }
        self.required_any.is_empty() || self.required_any.iter().any(|&e| c.has_effect(e))
    }
}

/// What the user of an ability must satisfy before trying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfConditions {
    /// Percent chance the ability is even attempted
    pub attack_chance: u32,
    pub effects: EffectConditions,
}

impl Default for SelfConditions {
    fn default() -> Self {
        Self {
            attack_chance: 100,
            effects: EffectConditions::default(),
        }
    }
}

impl SelfConditions {
    pub fn check(&self, c: &Creature, rng: &mut GameRng) -> bool {
        if self.attack_chance < 100 && !rng.percent(self.attack_chance) {
            return false;
        }
        self.effects.holds(c)
    }
}

/// Try each ready ability of `id` in slot order.
///
/// Returns true when a successful ability took the place of movement.
pub fn run_specials(world: &mut World, id: CreatureId) -> bool {
    let Some(c) = world.creatures.live(id) else {
        return false;
    };
    if c.has_effect(Effect::Pacified) {
        return false;
    }
    let ready: Vec<String> = c
        .specials
        .iter()
        .filter(|s| s.enabled && s.cooldown == 0)
        .map(|s| s.name.clone())
        .collect();

    let mut replaced = false;
    for name in ready {
        let Some(ability) = world.abilities.get(&name) else {
            tracing::warn!(%id, ability = %name, "unknown ability");
            continue;
        };
        if world.creatures.live(id).is_none() {
            break;
        }
        if !ability.call(world, id) {
            continue;
        }
        if let Some(slot) = world.creatures.get_mut(id).and_then(|c| c.special_mut(&name)) {
            slot.cooldown = ability.cooldown().max(0);
        }
        tracing::debug!(%id, ability = %name, "ability used");
        world.log(WorldEvent::AbilityUsed { id, name });
        if ability.replaces_movement() {
            replaced = true;
            break;
        }
    }
    replaced
}
