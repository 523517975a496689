//! Step feasibility and selection
//!
//! Which neighbouring tiles a creature may enter, what entering them costs,
//! and how one is picked when several bring it closer to its goal.

use crate::creature::{
    Attitude, Creature, CreatureId, CreatureSize, Effect, MonsterAttitude, MoverFlags,
};
use crate::map::{TileFlags, Tripoint, line_to, trig_dist};
use crate::world::World;

/// Deepest helper that can join a group bash
const MAX_HELPER_DEPTH: i32 = 5;

/// What taking a step into a tile would mean
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// A creature we fight stands there
    Attack(CreatureId),
    /// A creature we shove aside stands there
    Push(CreatureId),
    Enter,
    OpenDoor,
    Bash,
    /// Tunnel in over several turns
    Dig,
}

/// A viable step and how much closer it gets us
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub pos: Tripoint,
    pub kind: StepKind,
    pub progress: f32,
}

/// Whether `c` may stand on `p` given its capabilities
pub fn can_move_to(world: &World, c: &Creature, p: Tripoint) -> bool {
    let map = &world.map;
    if !map.passable(p) {
        return false;
    }
    let flags = map.flags_at(p);
    if flags.contains(TileFlags::DEEP_WATER) && !c.can_submerge() && !c.flies() {
        return false;
    }
    if c.digs() && !c.flies() && !flags.contains(TileFlags::DIGGABLE) {
        return false;
    }
    if c.has_flag(MoverFlags::AQUATIC) && !flags.contains(TileFlags::SWIMMABLE) {
        return false;
    }
    if c.has_flag(MoverFlags::SUNDEATH) && map.is_in_sunlight(p) {
        return false;
    }
    if c.has_flag(MoverFlags::WATER_FEAR) && flags.contains(TileFlags::LIQUID) && !c.flies() {
        return false;
    }
    if c.has_flag(MoverFlags::ANIMAL)
        && flags.contains(TileFlags::SHARP)
        && !c.flies()
        && c.size != CreatureSize::Tiny
        && c.monster_attitude() != MonsterAttitude::Attack
    {
        return false;
    }
    !map
        .danger_at(p, c.flies())
        .is_some_and(|d| c.hazards.avoids(d))
}

/// Move points spent stepping from `from` to `to`
pub fn calc_movecost(world: &World, c: &Creature, from: Tripoint, to: Tripoint) -> i32 {
    let map = &world.map;
    let mode = world.options.distance_mode;
    let diag = if mode.is_trig() && from.x != to.x && from.y != to.y {
        1.41
    } else {
        1.0
    };
    let end_cost = |p: Tripoint, water: f32| {
        if map.has_flag(TileFlags::SWIMMABLE, p) {
            water
        } else {
            50.0 * map.move_cost(p) as f32
        }
    };

    let cost = if c.flies() || (c.digs() && map.has_flag(TileFlags::DIGGABLE, to)) {
        100.0 * diag
    } else if c.swims() {
        (end_cost(from, 25.0) + end_cost(to, 25.0)) * diag
    } else if c.can_submerge() {
        (end_cost(from, 150.0) + end_cost(to, 150.0)) * diag / 2.0
    } else {
        map.combined_movecost(from, to, mode) as f32
    };
    let cost = cost.round() as i32;
    if cost <= 0 { 100 } else { cost }
}

/// Smashing strength with a bonus for pack bashers
pub fn bash_estimate(c: &Creature) -> i32 {
    let mut estimate = c.bash_strength();
    if c.has_flag(MoverFlags::GROUP_BASH) {
        estimate += 20;
    }
    estimate
}

/// Tiles behind `basher`, one to either side, up to `depth` deep
fn bashing_zone(target: Tripoint, basher: Tripoint, depth: i32) -> Vec<Tripoint> {
    let d = (basher - target).signum();
    let mut zone = Vec::with_capacity(3 * depth as usize);
    for step in 1..=depth {
        let center = target.offset(d.x * step, d.y * step, 0);
        zone.push(center);
        if d.x == 0 {
            zone.push(center.offset(1, 0, 0));
            zone.push(center.offset(-1, 0, 0));
        } else if d.y == 0 {
            zone.push(center.offset(0, 1, 0));
            zone.push(center.offset(0, -1, 0));
        } else {
            zone.push(center.offset(-d.x, 0, 0));
            zone.push(center.offset(0, -d.y, 0));
        }
    }
    zone.sort();
    zone.dedup();
    zone.retain(|&p| p != target);
    zone
}

/// Combined strength of every pack basher lined up behind `c`.
///
/// A helper counts only if an unbroken line of group bashers joins it to
/// the target; its share falls off with distance.
pub fn group_bash_skill(world: &World, c: &Creature, target: Tripoint) -> i32 {
    if !c.has_flag(MoverFlags::GROUP_BASH) {
        return c.bash_strength();
    }
    let mode = world.options.distance_mode;
    let mut skill = 0;
    for candidate in bashing_zone(target, c.pos, MAX_HELPER_DEPTH) {
        let connected = line_to(target, candidate).iter().all(|&p| {
            world
                .creatures
                .creature_at(p)
                .is_some_and(|h| h.is_alive() && h.has_flag(MoverFlags::GROUP_BASH))
        });
        if !connected {
            continue;
        }
        if let Some(helper) = world.creatures.creature_at(candidate) {
            skill += helper.bash_strength() / mode.rl_dist(candidate, target).max(1);
        }
    }
    skill
}

/// What stepping into `p` would do, or None if it is not an option
pub fn assess_step(world: &World, c: &Creature, p: Tripoint) -> Option<StepKind> {
    let map = &world.map;
    if !map.inbounds(p) || p == c.pos {
        return None;
    }
    let vertical = p.z != c.pos.z;
    if vertical && !c.pos.same_column(p) {
        return None;
    }

    if let Some(other) = world.creatures.creature_at(p) {
        if other.id == c.id || !other.is_alive() || vertical {
            return None;
        }
        let fights = world.attitude_between(c, other) == Attitude::Hostile
            || c.has_flag(MoverFlags::ATTACKMON);
        if fights && !c.has_effect(Effect::Pacified) && c.melee.dice > 0 {
            return Some(StepKind::Attack(other.id));
        }
        if c.has_flag(MoverFlags::PUSH_MON) && !c.has_effect(Effect::Pushed) && !other.is_avatar() {
            return Some(StepKind::Push(other.id));
        }
        return None;
    }

    if vertical {
        let stairs = if p.z > c.pos.z {
            map.has_flag(TileFlags::GOES_UP, c.pos)
        } else {
            map.has_flag(TileFlags::GOES_DOWN, c.pos)
        };
        if stairs || (map.valid_move(c.pos, p, c.flies(), c.climbs()) && can_move_to(world, c, p)) {
            return Some(StepKind::Enter);
        }
        return None;
    }

    if can_move_to(world, c, p) {
        return Some(StepKind::Enter);
    }
    if c.can_open_doors() && map.ter(p).opened().is_some() {
        return Some(StepKind::OpenDoor);
    }
    if c.digs() && map.impassable(p) && map.has_flag(TileFlags::DIGGABLE, p) {
        return Some(StepKind::Dig);
    }
    if c.bash_strength() > 0 && map.bash_rating(bash_estimate(c), p) > 0 {
        return Some(StepKind::Bash);
    }
    None
}

/// Viable steps among `squares`, in the order given.
///
/// A square on another level is taken as the straight vertical move in our
/// own column.
pub fn viable_steps(world: &World, c: &Creature, dest: Tripoint, squares: &[Tripoint]) -> Vec<Candidate> {
    let distance = world.options.distance_mode.rl_dist(c.pos, dest) as f32;
    squares
        .iter()
        .filter_map(|&sq| {
            let pos = if sq.z != c.pos.z { c.pos.with_z(sq.z) } else { sq };
            let kind = assess_step(world, c, pos)?;
            Some(Candidate {
                pos,
                kind,
                progress: distance - trig_dist(sq, dest),
            })
        })
        .collect()
}

/// Pick a step toward `dest`.
///
/// An attack wins at once. Otherwise the most direct viable square is taken,
/// unless the creature stumbles, in which case later squares may replace it
/// with odds weighted by the progress they make.
pub fn pick_step(world: &mut World, id: CreatureId, dest: Tripoint, squares: &[Tripoint]) -> Option<Candidate> {
    let c = world.creatures.live(id)?;
    let stumbles = c.has_flag(MoverFlags::STUMBLES);
    let candidates = viable_steps(world, c, dest, squares);
    let mut chosen: Option<Candidate> = None;
    let mut switch_chance = 0.0;
    for candidate in candidates {
        if matches!(candidate.kind, StepKind::Attack(_)) {
            return Some(candidate);
        }
        switch_chance += candidate.progress * 2.0;
        if chosen.is_none()
            || world
                .rng
                .x_in_y(candidate.progress as f64, switch_chance as f64)
        {
            chosen = Some(candidate);
            if !stumbles {
                break;
            }
        }
    }
    chosen
}

/// Neighbouring tiles with the strongest scent, or the weakest when fleeing.
///
/// Empty when the trail is already strong here or no neighbour smells at all.
pub fn scent_candidates(world: &World, c: &Creature) -> Vec<Tripoint> {
    let (mut max_smell, threshold) = if c.has_flag(MoverFlags::KEENNOSE) {
        (1, 400)
    } else {
        (10, 200)
    };
    let mut min_smell = 9999;
    let fleeing = c.monster_attitude() == MonsterAttitude::Flee;
    if !fleeing && world.scent.get(c.pos) > threshold {
        return Vec::new();
    }
    let bash = bash_estimate(c);
    let mut moves = Vec::new();
    for dest in c.pos.neighbors() {
        let smell = world.scent.get(dest);
        let occupant = world.creatures.creature_at(dest);
        let open = occupant.is_none_or(|o| o.is_avatar() || c.has_flag(MoverFlags::ATTACKMON));
        let reachable = can_move_to(world, c, dest)
            || occupant.is_some_and(|o| o.is_avatar())
            || (c.bash_strength() > 0 && world.map.bash_rating(bash, dest) > 0);
        if !open || !reachable {
            continue;
        }
        if (!fleeing && smell > max_smell) || (fleeing && smell < min_smell) {
            moves.clear();
            moves.push(dest);
            max_smell = smell;
            min_smell = smell;
        } else if (!fleeing && smell == max_smell) || (fleeing && smell == min_smell) {
            moves.push(dest);
        }
    }
    moves
}

/// Next tile on the way to the last noise heard
pub fn wander_next(world: &World, c: &Creature) -> Option<Tripoint> {
    let wander = c.wander_pos?;
    let pos = c.pos;
    let xbest = (wander.y - pos.y).abs() <= (wander.x - pos.x).abs();

    let (mut x, mut x2, mut x3) = (pos.x, pos.x - 1, pos.x + 1);
    let (mut y, mut y2, mut y3) = (pos.y, pos.y - 1, pos.y + 1);
    if wander.x < pos.x {
        x -= 1;
        x2 += 1;
    }
    if wander.x > pos.x {
        x += 1;
        x2 += 1;
        x3 -= 2;
    }
    if wander.y < pos.y {
        y -= 1;
        y2 += 1;
    }
    if wander.y > pos.y {
        y += 1;
        y2 += 1;
        y3 -= 2;
    }

    let bash = bash_estimate(c);
    let try_pos = |tx: i32, ty: i32| {
        let dest = Tripoint::new(tx, ty, pos.z);
        let ok = dest != pos
            && (can_move_to(world, c, dest)
                || world.creatures.creature_at(dest).is_some_and(|o| o.is_avatar())
                || (c.bash_strength() > 0 && world.map.bash_rating(bash, dest) > 0));
        ok.then_some(dest)
    };

    let order = if xbest {
        [(x, y), (x, y2), (x2, y), (x, y3), (x3, y)]
    } else {
        [(x, y), (x2, y), (x, y2), (x3, y), (x, y3)]
    };
    order.into_iter().find_map(|(tx, ty)| try_pos(tx, ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::FactionId;
    use crate::map::{DistanceMode, Map};
    use crate::pathfind::HazardTier;
    use crate::world::EngineOptions;

    fn world_from(rows: &[&str]) -> World {
        let mut world = World::new(
            Map::from_ascii(rows),
            EngineOptions {
                seed: Some(3),
                ..EngineOptions::default()
            },
        );
        world.rebuild_caches();
        world
    }

    #[test]
    fn test_can_move_to_respects_capabilities() {
        let world = world_from(&[
            "#######", //
            "#.~=,.#", //
            "#######",
        ]);
        let walker = Creature::new("walker", Tripoint::new(1, 1, 0));
        let flier = Creature::new("bat", Tripoint::new(1, 1, 0)).with_flags(MoverFlags::FLIES);
        let fish = Creature::new("fish", Tripoint::new(2, 1, 0)).with_flags(MoverFlags::AQUATIC);
        let mole = Creature::new("mole", Tripoint::new(4, 1, 0)).with_flags(MoverFlags::DIGS);
        let careful = Creature {
            hazards: HazardTier::Simple,
            ..walker.clone()
        };
        let water = Tripoint::new(2, 1, 0);
        let lava = Tripoint::new(3, 1, 0);
        assert!(!can_move_to(&world, &walker, water));
        assert!(can_move_to(&world, &flier, water));
        assert!(can_move_to(&world, &fish, water));
        assert!(!can_move_to(&world, &fish, Tripoint::new(1, 1, 0)));
        assert!(can_move_to(&world, &walker, lava));
        assert!(!can_move_to(&world, &careful, lava));
        assert!(can_move_to(&world, &mole, Tripoint::new(4, 1, 0)));
        assert!(!can_move_to(&world, &mole, Tripoint::new(5, 1, 0)));
        assert!(!can_move_to(&world, &walker, Tripoint::new(0, 1, 0)));
    }

    #[test]
    fn test_calc_movecost() {
        let mut world = world_from(&[
            "#######", //
            "#..ww.#", //
            "#.....#", //
            "#######",
        ]);
        let walker = Creature::new("walker", Tripoint::new(1, 1, 0));
        let swimmer = Creature::new("otter", Tripoint::new(3, 1, 0)).with_flags(MoverFlags::SWIMS);
        let a = Tripoint::new(1, 1, 0);
        assert_eq!(calc_movecost(&world, &walker, a, Tripoint::new(2, 1, 0)), 100);
        assert_eq!(calc_movecost(&world, &walker, a, Tripoint::new(2, 2, 0)), 100);
        assert_eq!(
            calc_movecost(&world, &swimmer, Tripoint::new(3, 1, 0), Tripoint::new(4, 1, 0)),
            50
        );
        world.options.distance_mode = DistanceMode::Trigonometric;
        assert_eq!(calc_movecost(&world, &walker, a, Tripoint::new(2, 2, 0)), 142);
        let bat = Creature::new("bat", a).with_flags(MoverFlags::FLIES);
        assert_eq!(calc_movecost(&world, &bat, a, Tripoint::new(2, 2, 0)), 141);
    }

    #[test]
    fn test_assess_attack_push_and_door() {
        let mut world = world_from(&[
            "#######", //
            "#...+.#", //
            "#.....#", //
            "#######",
        ]);
        let z = world.spawn(Creature::new("zombie", Tripoint::new(1, 1, 0))).unwrap();
        let you = world.spawn(Creature::avatar(Tripoint::new(2, 1, 0))).unwrap();
        let c = world.creatures.get(z).unwrap();
        assert_eq!(assess_step(&world, c, Tripoint::new(2, 1, 0)), Some(StepKind::Attack(you)));

        let mut ox = Creature::new("ox", Tripoint::new(3, 1, 0)).with_flags(MoverFlags::PUSH_MON);
        ox.faction = FactionId::ZOMBIE;
        ox.flags |= MoverFlags::CAN_OPEN_DOORS;
        let ox = world.spawn(ox).unwrap();
        let mut calf = Creature::new("calf", Tripoint::new(2, 2, 0));
        calf.faction = FactionId::ANIMAL;
        let calf = world.spawn(calf).unwrap();
        let c = world.creatures.get(ox).unwrap();
        assert_eq!(assess_step(&world, c, Tripoint::new(4, 1, 0)), Some(StepKind::OpenDoor));
        assert_eq!(assess_step(&world, c, Tripoint::new(2, 2, 0)), Some(StepKind::Push(calf)));
        assert_eq!(assess_step(&world, c, Tripoint::new(3, 0, 0)), None);
    }

    #[test]
    fn test_bash_estimate_and_group_bash() {
        let mut world = world_from(&[
            "#########", //
            "#.......#", //
            "#.......#", //
            "#########",
        ]);
        let mut brute = Creature::new("brute", Tripoint::new(2, 1, 0)).with_flags(MoverFlags::GROUP_BASH);
        brute.bash_skill = 10;
        assert_eq!(bash_estimate(&brute), 30);
        let a = world.spawn(brute.clone()).unwrap();
        brute.pos = Tripoint::new(3, 1, 0);
        world.spawn(brute).unwrap();
        let c = world.creatures.get(a).unwrap();
        // Wall at (1,1); helper at (3,1) stands two tiles from it
        assert_eq!(group_bash_skill(&world, c, Tripoint::new(1, 1, 0)), 10 + 5);
    }

    #[test]
    fn test_pick_step_takes_most_direct() {
        let mut world = world_from(&[
            "#########", //
            "#.......#", //
            "#.......#", //
            "#.......#", //
            "#########",
        ]);
        let mut c = Creature::new("cat", Tripoint::new(2, 2, 0));
        c.faction = FactionId::ANIMAL;
        let id = world.spawn(c).unwrap();
        let dest = Tripoint::new(6, 2, 0);
        let squares = crate::map::squares_closer_to(Tripoint::new(2, 2, 0), dest);
        let step = pick_step(&mut world, id, dest, &squares).unwrap();
        assert_eq!(step.pos, Tripoint::new(3, 2, 0));
        assert_eq!(step.kind, StepKind::Enter);
    }

    #[test]
    fn test_scent_candidates_follow_gradient() {
        let mut world = world_from(&[
            "#######", //
            "#.....#", //
            "#.....#", //
            "#######",
        ]);
        let hound = Creature::new("hound", Tripoint::new(2, 1, 0)).with_flags(MoverFlags::SMELLS);
        world.scent.set(Tripoint::new(3, 1, 0), 50);
        world.scent.set(Tripoint::new(1, 1, 0), 20);
        assert_eq!(scent_candidates(&world, &hound), vec![Tripoint::new(3, 1, 0)]);
        world.scent.set(Tripoint::new(2, 1, 0), 500);
        assert!(scent_candidates(&world, &hound).is_empty());
    }

    #[test]
    fn test_wander_next_heads_for_noise() {
        let world = world_from(&[
            "#######", //
            "#.....#", //
            "#.....#", //
            "#######",
        ]);
        let mut c = Creature::new("rat", Tripoint::new(1, 1, 0));
        c.wander_pos = Some(Tripoint::new(5, 2, 0));
        assert_eq!(wander_next(&world, &c), Some(Tripoint::new(2, 2, 0)));
        c.wander_pos = None;
        assert_eq!(wander_next(&world, &c), None);
    }
}
