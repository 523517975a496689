//! Ranged specials: turrets and armed creatures
//!
//! A gun picks its target, finds the range band it falls in, optionally
//! spins up a targeting lock first, then fires as many shots as the band
//! allows and the ammo supply covers.

use serde::{Deserialize, Serialize};

use super::SpecialAttack;
use crate::combat::{DamageInstance, DamageType};
use crate::creature::{Attitude, Creature, CreatureId, Effect};
use crate::world::{World, WorldEvent};

/// Shots fired when the target is within `min..=max` tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBand {
    pub min: i32,
    pub max: i32,
    pub shots: i32,
}

impl RangeBand {
    pub const fn new(min: i32, max: i32, shots: i32) -> Self {
        Self { min, max, shots }
    }

    pub const fn contains(&self, dist: i32) -> bool {
        dist >= self.min && dist <= self.max
    }
}

/// Lock-on that must finish before the first shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targeting {
    /// Move points spent spinning up
    pub cost: i32,
    /// Turns the lock lasts
    pub timeout: i32,
    /// Turns added to the lock each time the gun fires
    pub timeout_extend: i32,
    /// Also paint the target with a laser, which must be in place to fire
    pub laser_lock: bool,
    /// Noise made while spinning up
    pub volume: i32,
}

impl Default for Targeting {
    fn default() -> Self {
        Self {
            cost: 100,
            timeout: 5,
            timeout_extend: 3,
            laser_lock: false,
            volume: 6,
        }
    }
}

/// Who pulls the trigger, as far as the combat rules are concerned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShooterStats {
    /// Accuracy in dice of 10
    pub skill: i32,
    /// Damage of one shot
    pub damage: DamageInstance,
}

impl Default for ShooterStats {
    fn default() -> Self {
        Self {
            skill: 4,
            damage: DamageInstance::single(DamageType::Stab, 12.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GunAttack {
    pub name: String,
    pub cooldown: i32,
    pub ranges: Vec<RangeBand>,
    /// Key into the creature's ammo counts; None for guns that never run dry
    pub ammo_type: Option<String>,
    pub move_cost: i32,
    pub targeting: Option<Targeting>,
    /// Only fires while standing in sunlight
    pub require_sunlight: bool,
    pub shooter: ShooterStats,
}

impl GunAttack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cooldown: 1,
            ranges: vec![RangeBand::new(1, 12, 1)],
            ammo_type: None,
            move_cost: 150,
            targeting: None,
            require_sunlight: false,
            shooter: ShooterStats::default(),
        }
    }

    pub fn with_ammo(mut self, ammo_type: impl Into<String>) -> Self {
        self.ammo_type = Some(ammo_type.into());
        self
    }

    pub fn with_targeting(mut self, targeting: Targeting) -> Self {
        self.targeting = Some(targeting);
        self
    }

    pub fn with_ranges(mut self, ranges: Vec<RangeBand>) -> Self {
        self.ranges = ranges;
        self
    }

    fn max_range(&self) -> i32 {
        self.ranges.iter().map(|r| r.max).max().unwrap_or(0)
    }

    /// Friendly guns pick the nearest visible enemy; others shoot their target
    fn pick_target(&self, world: &World, c: &Creature) -> Option<CreatureId> {
        let mode = world.options.distance_mode;
        if c.friendly != 0 {
            let max_range = self.max_range();
            return world
                .creatures
                .iter()
                .filter(|o| o.id != c.id && o.is_alive() && o.friendly == 0 && !o.is_avatar())
                .filter(|o| world.attitude_between(c, o) == Attitude::Hostile)
                .map(|o| (mode.rl_dist(c.pos, o.pos), o))
                .filter(|(d, o)| *d <= max_range && world.creature_sees(c, o.pos))
                .min_by_key(|(d, _)| *d)
                .map(|(_, o)| o.id);
        }
        let target = world.creatures.live(c.target?)?;
        world.creature_sees(c, target.pos).then_some(target.id)
    }

    fn ammo_left(&self, c: &Creature) -> Option<i32> {
        let kind = self.ammo_type.as_ref()?;
        Some(c.ammo.get(kind).copied().unwrap_or(0))
    }

    /// Spin up a lock if one is needed. True if this use went to targeting.
    fn acquire(&self, world: &mut World, id: CreatureId, tid: CreatureId, targeting: &Targeting) -> bool {
        let (Some(c), Some(t)) = (world.creatures.live(id), world.creatures.live(tid)) else {
            return false;
        };
        let not_targeted = !c.has_effect(Effect::Targeting);
        let not_locked = targeting.laser_lock && !t.has_effect(Effect::LaserLocked);
        let (pos, remaining) = (c.pos, c.effects.remaining(Effect::Targeting).unwrap_or(0));

        if not_targeted || not_locked {
            world.make_sound(pos, targeting.volume);
            if let Some(c) = world.creatures.get_mut(id) {
                c.add_effect(Effect::Targeting, targeting.timeout);
                c.moves -= targeting.cost;
            }
            if let Some(t) = world.creatures.get_mut(tid) {
                t.add_effect(Effect::Targeted, targeting.timeout);
                if targeting.laser_lock {
                    t.add_effect(Effect::LaserLocked, targeting.timeout);
                }
            }
            tracing::debug!(%id, target = %tid, "targeting");
            world.log(WorldEvent::TargetAcquired { id, target: tid });
            return true;
        }

        if let Some(c) = world.creatures.get_mut(id) {
            c.add_effect(Effect::Targeting, remaining + targeting.timeout_extend);
        }
        false
    }

    fn fire(&self, world: &mut World, id: CreatureId, tid: CreatureId, shots: i32) -> i32 {
        let Some(c) = world.creatures.live(id) else {
            return 0;
        };
        let mut proxy = Creature::new(format!("the {}", c.name), c.pos);
        proxy.id = id;
        proxy.melee.skill = self.shooter.skill;

        let mut fired = 0;
        for _ in 0..shots {
            let Some(target) = world.creatures.live(tid) else {
                break;
            };
            fired += 1;
            let roll = world.rng.dice(proxy.melee.skill, 10);
            let spread = world.combat.deal_melee_attack(&proxy, target, roll, &mut world.rng);
            if spread < 0 {
                continue;
            }
            let bp = world.combat.select_body_part(spread, &mut world.rng);
            let dealt = world.deal_damage(Some(id), tid, bp, &self.shooter.damage);
            if dealt.is_some_and(|d| d.killed) {
                break;
            }
        }
        fired
    }
}

impl SpecialAttack for GunAttack {
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
        let Some(tid) = self.pick_target(world, c) else {
            return false;
        };
        let Some(target) = world.creatures.live(tid) else {
            return false;
        };
        let target_pos = target.pos;
        let dist = world.options.distance_mode.rl_dist(c.pos, target_pos);
        let Some(band) = self.ranges.iter().find(|r| r.contains(dist)).copied() else {
            return false;
        };

        if self.require_sunlight && !world.map.is_in_sunlight(c.pos) {
            // Powered down, but the turn is still spent trying
            return true;
        }

        if let Some(targeting) = &self.targeting
            && self.acquire(world, id, tid, targeting)
        {
            return true;
        }

        let Some(c) = world.creatures.live(id) else {
            return false;
        };
        let ammo = self.ammo_left(c);
        if ammo.is_some_and(|a| a <= 0) {
            tracing::debug!(%id, gun = %self.name, "out of ammo");
            world.log(WorldEvent::OutOfAmmo { id });
            return false;
        }

        let stunned = c.has_effect(Effect::Stunned);
        if let Some(c) = world.creatures.get_mut(id) {
            c.moves -= self.move_cost;
        }
        if stunned {
            return true;
        }

        let shots = ammo.map_or(band.shots, |a| band.shots.min(a));
        let fired = self.fire(world, id, tid, shots);
        if let Some(kind) = &self.ammo_type
            && let Some(left) = world.creatures.get_mut(id).and_then(|c| c.ammo.get_mut(kind))
        {
            *left -= fired;
        }
        world.log(WorldEvent::Fired {
            id,
            target: target_pos,
            shots: fired,
        });
        true
    }
}
