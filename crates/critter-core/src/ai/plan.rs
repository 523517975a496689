//! Perception, targeting and goal resolution
//!
//! `plan` looks around, picks a target, lets the creature's triggers stir
//! its anger and morale, then settles on a goal tile for `move_creature`.

use crate::creature::{
    Attitude, Creature, CreatureId, FactionAttitude, FactionId, MonsterAttitude, MoverFlags,
    Triggers,
};
use crate::map::Tripoint;
use crate::world::World;

/// Starting rating for threat-aware planners; anything scarier than a
/// heavy drone sixty tiles off gets picked
const SMART_START_RATING: f32 = 8.6;
const DUMB_START_RATING: f32 = 1000.0;

/// Distance at which a hostile counts as close
const CLOSE_RATING: f32 = 5.0;
/// Allies within this rating lift group morale
const GROUP_MORALE_RATING: f32 = 10.0;
/// Closer allies than this make a swarm feel crowded
const SWARM_CROWDED: i32 = 5;
/// How close a hostile must be to one of our young
const BABY_RADIUS: i32 = 3;

/// Rate `other` as a target for `me`; lower is more attractive.
///
/// `f32::MAX` means unusable: unseen, on our own tile, or (for dumb
/// planners) no closer than `best`.
pub fn rate_target(world: &World, me: &Creature, other: &Creature, best: f32, smart: bool) -> f32 {
    let d = world.options.distance_mode.rl_dist(me.pos, other.pos);
    if d <= 0 || !world.creature_sees(me, other.pos) {
        return f32::MAX;
    }
    if !smart {
        return if d as f32 >= best { f32::MAX } else { d as f32 };
    }
    let mut power = other.power_rating();
    if world.attitude_between(other, me) == Attitude::Hostile {
        power += 2.0;
    }
    if power > 0.0 { d as f32 / power } else { f32::MAX }
}

/// What one look around turned up
#[derive(Debug, Clone, Default)]
struct Perception {
    target: Option<CreatureId>,
    target_pos: Option<Tripoint>,
    target_attitude: Attitude,
    target_hp_percent: i32,
    /// Target is an ally we swarm toward
    swarming: bool,
    fleeing: bool,
    hostile_seen: bool,
    hostiles_close: i32,
    near_baby: bool,
    morale_gain: i32,
    /// Too crowded; move away toward this tile
    spread_to: Option<Tripoint>,
    avatar: Option<(Tripoint, bool)>,
    leader: Option<Tripoint>,
}

/// Whether `other` is someone `me` hunts
fn is_prey(world: &World, me: &Creature, other: &Creature) -> bool {
    if me.friendly == 0 {
        matches!(
            world.faction_attitude(me, other),
            FactionAttitude::Hostile | FactionAttitude::Hate
        )
    } else {
        other.friendly == 0 && !other.is_avatar() && other.faction != FactionId::PLAYER
    }
}

fn perceive(world: &World, me: &Creature) -> Perception {
    let mut seen = Perception::default();
    let smart = me.has_flag(MoverFlags::PRIORITIZE_TARGETS);
    let mut best = if smart { SMART_START_RATING } else { DUMB_START_RATING };
    let docile = me.has_effect(crate::creature::Effect::Docile);
    seen.fleeing = me.monster_attitude() == MonsterAttitude::Flee;

    let mut target: Option<&Creature> = None;
    if !docile {
        for other in world.creatures.iter() {
            if other.id == me.id || !other.is_alive() || !is_prey(world, me, other) {
                continue;
            }
            let rating = rate_target(world, me, other, best, smart);
            if rating == f32::MAX {
                continue;
            }
            seen.hostile_seen = true;
            let fleeing_from = world.mood_toward(me, other) == MonsterAttitude::Flee;
            if rating < best || (!seen.fleeing && fleeing_from) {
                target = Some(other);
                best = rating;
            }
            seen.fleeing |= fleeing_from;
            if rating <= CLOSE_RATING {
                seen.hostiles_close += 1;
            }
            if !me.species.is_empty()
                && world.creatures.iter().any(|b| {
                    b.baby
                        && b.is_alive()
                        && b.species == me.species
                        && world.options.distance_mode.rl_dist(b.pos, other.pos) <= BABY_RADIUS
                })
            {
                seen.near_baby = true;
            }
        }
    }

    let group_morale = me.has_flag(MoverFlags::GROUP_MORALE) && (me.fear > 0 || me.morale < 0);
    let swarms = me.has_flag(MoverFlags::SWARMS) && target.is_none();
    if group_morale || swarms {
        let mut furthest = -1;
        for ally in world.creatures.iter() {
            if ally.id == me.id
                || !ally.is_alive()
                || ally.is_avatar()
                || world.attitude_between(me, ally) != Attitude::Friendly
            {
                continue;
            }
            if !world.creature_sees(me, ally.pos) {
                continue;
            }
            let d = world.options.distance_mode.rl_dist(me.pos, ally.pos);
            if group_morale && (d as f32) <= GROUP_MORALE_RATING {
                seen.morale_gain += GROUP_MORALE_RATING as i32 - d;
            }
            if swarms {
                if d < SWARM_CROWDED {
                    seen.spread_to = Some(ally.pos);
                    target = None;
                    seen.swarming = false;
                } else if d > furthest && me.wandf <= 0 && seen.spread_to.is_none() {
                    furthest = d;
                    target = Some(ally);
                    seen.swarming = true;
                }
            }
        }
    }

    if let Some(t) = target {
        seen.target = Some(t.id);
        seen.target_pos = Some(t.pos);
        seen.target_attitude = world.attitude_between(me, t);
        seen.target_hp_percent = t.hp_percent();
    }

    if let Some(avatar) = world.creatures.avatar() {
        seen.avatar = Some((avatar.pos, world.creature_sees(me, avatar.pos)));
    }
    seen.leader = me
        .led_by
        .and_then(|l| world.creatures.live(l))
        .map(|l| l.pos);
    seen
}

/// Push anger and morale according to which trigger sets hold `trigger`
fn apply_trigger(c: &mut Creature, trigger: Triggers, amount: i32) {
    if c.anger_triggers.contains(trigger) {
        c.change_anger(amount);
    }
    if c.fear_triggers.contains(trigger) {
        c.change_morale(-amount);
    }
    if c.placate_triggers.contains(trigger) {
        c.change_anger(-amount);
    }
}

/// Look around and decide where to go this turn
pub fn plan(world: &mut World, id: CreatureId) {
    let Some(me) = world.creatures.live(id) else {
        return;
    };
    let seen = perceive(world, me);
    let mode = world.options.distance_mode;
    let mating = world.options.season.is_mating_season();

    let Some(c) = world.creatures.get_mut(id) else {
        return;
    };
    let rng = &mut world.rng;

    if seen.hostiles_close > 0 && rng.one_in(2) {
        apply_trigger(c, Triggers::HOSTILE_CLOSE, 5);
    }
    if seen.hostile_seen && rng.one_in(10) {
        apply_trigger(c, Triggers::HOSTILE_SEEN, 2);
    }
    if mating && rng.one_in(10) {
        apply_trigger(c, Triggers::MATING_SEASON, 3);
    }
    if seen.near_baby && rng.one_in(2) {
        apply_trigger(c, Triggers::PLAYER_NEAR_BABY, 8);
    }
    if seen.target.is_some()
        && !seen.swarming
        && seen.target_attitude != Attitude::Friendly
        && seen.target_hp_percent <= 70
    {
        apply_trigger(c, Triggers::HOSTILE_WEAK, 10 - seen.target_hp_percent / 10);
    }
    if seen.morale_gain > 0 {
        c.change_morale(seen.morale_gain);
    }

    if let Some(crowd) = seen.spread_to {
        let k = rng.rng(1, 3);
        let away = c.pos - crowd;
        c.wander_pos = Some(c.pos.offset(away.x * k, away.y * k, 0));
        c.wandf = 2;
    }

    c.target = seen.target;
    c.goal = None;
    if let Some(tpos) = seen.target_pos {
        if seen.fleeing && !seen.swarming {
            c.goal = Some(tpos.mirrored_through(c.pos));
        } else if seen.swarming || seen.target_attitude == Attitude::Hostile {
            c.goal = Some(tpos);
        }
    } else if c.friendly > 0 && rng.one_in(3) {
        c.friendly -= 1;
    } else if c.friendly != 0 && !c.has_flag(MoverFlags::PET_WONT_FOLLOW) {
        if let Some((avatar_pos, true)) = seen.avatar {
            if mode.rl_dist(c.pos, avatar_pos) > 2 {
                c.goal = Some(avatar_pos);
            } else {
                c.path.clear();
            }
        }
    } else if let Some(leader) = seen.leader {
        if mode.rl_dist(c.pos, leader) > 1 {
            c.goal = Some(leader);
        }
    } else if !c.patrol.is_empty() {
        let idx = c.patrol_index % c.patrol.len();
        if c.patrol[idx] == c.pos {
            c.patrol_index = (idx + 1) % c.patrol.len();
        }
        c.goal = Some(c.patrol[c.patrol_index % c.patrol.len()]);
    }

    c.trim_path();
    if c
        .path
        .front()
        .is_some_and(|&next| crate::map::square_dist(c.pos, next) > 1)
    {
        c.path.clear();
    }
    tracing::trace!(%id, goal = ?c.goal, target = ?c.target, fleeing = seen.fleeing, "planned");
}
