//! World context
//!
//! [`World`] owns everything one simulation needs: the map and its caches,
//! the creatures, scent, factions, registered abilities, combat rules, the
//! RNG and the event log. Every engine routine takes it by reference.

pub mod errors;
pub mod events;
pub mod options;

pub use errors::{EngineError, EngineResult};
pub use events::{EventLog, LoggedEvent, WorldEvent};
pub use options::{EngineOptions, Season};

use hashbrown::HashSet;

use crate::ai::ScentMap;
use crate::combat::{BasicCombat, BodyPart, Combat, DamageInstance, DealtDamage};
use crate::consts::ON_FIRE_LUMINANCE;
use crate::creature::{
    Attitude, Creature, CreatureId, CreatureTracker, Effect, FactionAttitude, FactionId,
    FactionRelations, FactionTable, MonsterAttitude,
};
use crate::light::{LightEnvironment, LightSource};
use crate::map::{Map, Tripoint};
use crate::rng::GameRng;
use crate::special::AbilityRegistry;

/// Everything a simulation step reads and mutates
#[derive(Debug)]
pub struct World {
    /// Tiles and their light, sight and transparency caches
    pub map: Map,

    /// Every creature, in spawn order
    pub creatures: CreatureTracker,

    /// Trail left by the avatar
    pub scent: ScentMap,

    pub factions: FactionTable,

    /// Special attacks by name
    pub abilities: AbilityRegistry,

    /// Hit and damage resolution
    pub combat: Box<dyn Combat>,

    pub rng: GameRng,

    pub options: EngineOptions,

    /// What happened, turn by turn
    pub events: EventLog,

    /// Turn counter
    pub turn: u64,
}

impl World {
    /// Create a world around `map`, seeding the RNG from the options if asked
    pub fn new(mut map: Map, options: EngineOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };
        map.set_weather_sight_penalty(options.weather_sight_penalty);

        let mut factions = FactionTable::new();
        factions.set(FactionId::ZOMBIE, FactionId::PLAYER, FactionAttitude::Hate);
        factions.set_mutual(FactionId::ZOMBIE, FactionId::ANIMAL, FactionAttitude::Neutral);

        Self {
            map,
            creatures: CreatureTracker::new(),
            scent: ScentMap::new(),
            factions,
            abilities: AbilityRegistry::new(),
            combat: Box::new(BasicCombat),
            rng,
            options,
            events: EventLog::new(),
            turn: 0,
        }
    }

    /// Place a creature; None if the tile is taken or off the map
    pub fn spawn(&mut self, creature: Creature) -> Option<CreatureId> {
        if !self.map.inbounds(creature.pos) {
            tracing::warn!(name = %creature.name, pos = %creature.pos, "spawn outside the map");
            return None;
        }
        let id = self.creatures.spawn(creature)?;
        tracing::debug!(%id, "spawned");
        Some(id)
    }

    pub fn log(&mut self, event: WorldEvent) {
        self.events.push(self.turn, event);
    }

    /// Nobody stands on `p`
    pub fn is_empty(&self, p: Tripoint) -> bool {
        self.creatures.id_at(p).is_none()
    }

    /// Faction-level regard, with pets counted as the player's faction
    pub fn faction_attitude(&self, me: &Creature, other: &Creature) -> FactionAttitude {
        let mine = if me.friendly != 0 { FactionId::PLAYER } else { me.faction };
        let theirs = if other.friendly != 0 { FactionId::PLAYER } else { other.faction };
        self.factions.attitude(mine, theirs)
    }

    /// Mood of `me` toward `other`. Hatred overrides calm but not fear or loyalty.
    pub fn mood_toward(&self, me: &Creature, other: &Creature) -> MonsterAttitude {
        let base = me.monster_attitude();
        if matches!(base, MonsterAttitude::Friend | MonsterAttitude::Flee) {
            return base;
        }
        if self.faction_attitude(me, other) == FactionAttitude::Hate {
            return MonsterAttitude::Attack;
        }
        base
    }

    /// How `me` regards `other` right now
    pub fn attitude_between(&self, me: &Creature, other: &Creature) -> Attitude {
        if me.id == other.id {
            return Attitude::Friendly;
        }
        if other.is_avatar() {
            return match self.mood_toward(me, other) {
                MonsterAttitude::Friend => Attitude::Friendly,
                MonsterAttitude::Attack => Attitude::Hostile,
                _ => Attitude::Neutral,
            };
        }
        if me.is_avatar() {
            if other.is_friendly_to_player() {
                return Attitude::Friendly;
            }
            return match self.attitude_between(other, me) {
                Attitude::Hostile => Attitude::Hostile,
                _ => Attitude::Neutral,
            };
        }

        let faction = self.faction_attitude(me, other);
        let both_wild = me.friendly == 0 && other.friendly == 0;
        if (me.friendly != 0 && other.friendly != 0)
            || (both_wild && faction == FactionAttitude::Friendly)
        {
            Attitude::Friendly
        } else if both_wild && faction == FactionAttitude::Hate {
            Attitude::Hostile
        } else if (both_wild && faction == FactionAttitude::Neutral) || me.morale < 0 || me.anger < 10
        {
            Attitude::Neutral
        } else {
            Attitude::Hostile
        }
    }

    /// Attitude between two creatures by id; Neutral if either is gone
    pub fn attitude_to(&self, me: CreatureId, other: CreatureId) -> Attitude {
        match (self.creatures.get(me), self.creatures.get(other)) {
            (Some(a), Some(b)) => self.attitude_between(a, b),
            _ => Attitude::Neutral,
        }
    }

    /// Sight range of a creature under the light at its tile
    pub fn sight_range(&self, c: &Creature) -> i32 {
        c.sight_range(self.map.light_at(c.pos))
            .min(self.options.max_view_distance)
    }

    /// `viewer` has a clear line to `p` within its sight range
    pub fn creature_sees(&self, viewer: &Creature, p: Tripoint) -> bool {
        self.map.sees(viewer.pos, p, self.sight_range(viewer))
    }

    /// Apply damage through the combat rules; kills the target at zero hit points
    pub fn deal_damage(
        &mut self,
        source: Option<CreatureId>,
        target: CreatureId,
        bp: BodyPart,
        damage: &DamageInstance,
    ) -> Option<DealtDamage> {
        let World {
            combat,
            creatures,
            rng,
            ..
        } = self;
        let victim = creatures.get_mut(target).filter(|c| c.is_alive())?;
        let dealt = combat.apply_damage(source, victim, bp, damage, rng);
        if dealt.killed {
            self.kill(target, source);
        }
        Some(dealt)
    }

    /// Mark a creature dead and free its tile
    pub fn kill(&mut self, id: CreatureId, killer: Option<CreatureId>) {
        if self.creatures.get(id).is_none_or(|c| c.dead) {
            return;
        }
        self.creatures.kill(id);
        tracing::debug!(%id, "died");
        self.log(WorldEvent::Died { id, killer });
    }

    /// Head toward `p` for `turns` turns
    pub fn wander_to(&mut self, id: CreatureId, p: Tripoint, turns: i32) {
        if let Some(c) = self.creatures.get_mut(id) {
            c.wander_pos = Some(p);
            c.wandf = turns;
        }
    }

    /// Creatures that can hear the noise turn toward it
    pub fn make_sound(&mut self, p: Tripoint, volume: i32) {
        let mode = self.options.distance_mode;
        let listeners: Vec<_> = self
            .creatures
            .iter()
            .filter(|c| c.is_alive() && !c.is_avatar())
            .filter(|c| c.has_flag(crate::creature::MoverFlags::HEARS))
            .filter_map(|c| {
                let left = volume - mode.rl_dist(c.pos, p);
                (left > 0).then_some((c.id, left))
            })
            .collect();
        for (id, left) in listeners {
            self.wander_to(id, p, left);
        }
        self.log(WorldEvent::Sound { pos: p, volume });
    }

    /// Light sources carried by creatures on level `z`
    pub fn light_environment(&self, z: i32) -> LightEnvironment {
        let sources = self
            .creatures
            .iter()
            .filter(|c| c.is_alive() && c.pos.z == z)
            .filter_map(|c| {
                let lum = if c.has_effect(Effect::OnFire) {
                    ON_FIRE_LUMINANCE
                } else {
                    c.luminance
                };
                (lum > 0.0).then(|| LightSource::new(c.pos, lum))
            })
            .collect();
        LightEnvironment {
            natural_light: self.options.natural_light,
            sources,
            mode: self.options.distance_mode,
        }
    }

    /// Refresh transparency, floor and light caches on every occupied level
    pub fn rebuild_caches(&mut self) {
        let levels: HashSet<i32> = self
            .creatures
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| c.pos.z)
            .collect();
        let mut levels: Vec<i32> = levels.into_iter().collect();
        levels.sort_unstable();
        for z in levels {
            let env = self.light_environment(z);
            self.map.generate_lightmap(z, &env);
        }
    }
}
