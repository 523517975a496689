//! A* routing over the tile grid
//!
//! Routes respect each mover's capability profile: fliers ignore terrain
//! cost, swimmers glide through water, diggers tunnel, bashers may plan
//! through breakable obstacles at a penalty. Paths never include the start
//! tile and always end at the goal, or at the closest reachable tile when
//! partial paths are enabled.

use core::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::map::{DangerClass, DistanceMode, FieldType, Map, TileFlags, Tripoint, line_to};

/// Padding around the start/goal bounding box searched by A*
pub const PATH_SEARCH_PAD: i32 = 16;

/// Extra tile cost for opening a closed door on the way
const DOOR_OPEN_COST: i32 = 4;
/// Tile cost of a smash at rating 10; lower ratings scale it up
const BASH_COST: i32 = 20;
/// Cost of a stair or ramp transition
const VERTICAL_COST: i32 = 100;

/// Which dangers a mover routes around.
///
/// Each tier includes everything the one below it avoids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, Display,
    EnumIter,
)]
#[repr(u8)]
pub enum HazardTier {
    /// Walks into anything
    #[default]
    None = 0,
    /// Fire, lava, electricity, pits and open-air drops
    Simple = 1,
    /// Also traps, sharp terrain and caustic fields
    Complex = 2,
}

impl HazardTier {
    pub const fn from_level(level: u8) -> Self {
        match level {
            0 => HazardTier::None,
            1 => HazardTier::Simple,
            _ => HazardTier::Complex,
        }
    }

    pub const fn avoids(self, class: DangerClass) -> bool {
        match self {
            HazardTier::None => false,
            HazardTier::Simple => matches!(class, DangerClass::Simple),
            HazardTier::Complex => true,
        }
    }
}

/// A mover's traversal capabilities and search limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Strength applied to obstacles; 0 never plans through them
    pub bash_strength: i32,
    /// Give up when the goal is further than this
    pub max_dist: i32,
    /// Longest acceptable path in steps
    pub max_length: i32,
    /// Highest acceptable total cost; 0 is unbounded
    pub max_cost: i32,
    /// Extra cost of climbing up a level without stairs; 0 disables climbing
    pub climb_cost: i32,
    pub allow_open_doors: bool,
    pub allow_stairs: bool,
    pub flies: bool,
    pub swims: bool,
    pub digs: bool,
    pub climbs: bool,
    pub hazards: HazardTier,
    pub mode: DistanceMode,
    /// Return a path to the closest reachable tile when the goal is unreachable
    pub partial: bool,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            bash_strength: 0,
            max_dist: 200,
            max_length: 1000,
            max_cost: 0,
            climb_cost: 0,
            allow_open_doors: false,
            allow_stairs: true,
            flies: false,
            swims: false,
            digs: false,
            climbs: false,
            hazards: HazardTier::None,
            mode: DistanceMode::Roguelike,
            partial: false,
        }
    }
}

impl Map {
    /// The danger class a mover with these capabilities would face at `p`
    pub fn danger_at(&self, p: Tripoint, flies: bool) -> Option<DangerClass> {
        let flags = self.flags_at(p);
        if flags.contains(TileFlags::LAVA) && !flies {
            return Some(DangerClass::Simple);
        }
        if !flies && (flags.contains(TileFlags::PIT) || !self.has_floor(p)) {
            return Some(DangerClass::Simple);
        }
        let fields = self.fields_at(p);
        if fields
            .iter()
            .any(|f| f.kind.danger() == Some(DangerClass::Simple))
        {
            return Some(DangerClass::Simple);
        }
        if let Some(trap) = self.trap_at(p) {
            if !flies || trap.triggered_by_flyers() {
                return Some(DangerClass::Complex);
            }
        }
        if !flies && flags.contains(TileFlags::SHARP) {
            return Some(DangerClass::Complex);
        }
        if fields
            .iter()
            .any(|f| matches!(f.kind, FieldType::Acid | FieldType::ToxicGas))
        {
            return Some(DangerClass::Complex);
        }
        None
    }

    /// Route from `start` to `goal`; empty when no acceptable path exists
    pub fn route(
        &self,
        start: Tripoint,
        goal: Tripoint,
        settings: &PathSettings,
        avoid: &HashSet<Tripoint>,
    ) -> Vec<Tripoint> {
        route(self, start, goal, settings, avoid)
    }
}

/// Cost of standing in a tile, in move-cost units (2 = plain floor)
fn tile_cost(map: &Map, p: Tripoint, s: &PathSettings, avoid: &HashSet<Tripoint>) -> Option<i32> {
    if !map.inbounds(p) || avoid.contains(&p) {
        return None;
    }
    if map
        .danger_at(p, s.flies)
        .is_some_and(|d| s.hazards.avoids(d))
    {
        return None;
    }
    let flags = map.flags_at(p);
    let cost = map.move_cost(p);
    if s.digs && flags.contains(TileFlags::DIGGABLE) {
        return Some(2);
    }
    if s.swims && flags.contains(TileFlags::SWIMMABLE) {
        return Some(1);
    }
    if flags.contains(TileFlags::DEEP_WATER) && !s.flies {
        return None;
    }
    if cost > 0 {
        return Some(if s.flies { 2 } else { cost });
    }
    if s.allow_open_doors && map.ter(p).opened().is_some() {
        return Some(2 + DOOR_OPEN_COST);
    }
    if s.bash_strength > 0 {
        let rating = map.bash_rating(s.bash_strength, p);
        if rating > 0 {
            return Some(2 + BASH_COST * 10 / rating);
        }
    }
    None
}

/// Whether a vertical step between two tiles in one column is allowed
fn vertical_ok(map: &Map, from: Tripoint, to: Tripoint, s: &PathSettings) -> bool {
    let via_stairs = if to.z > from.z {
        map.has_flag(TileFlags::GOES_UP, from)
    } else {
        map.has_flag(TileFlags::GOES_DOWN, from)
    };
    if via_stairs {
        return s.allow_stairs;
    }
    let climbs = s.climbs && s.climb_cost > 0;
    map.valid_move(from, to, s.flies, climbs)
}

/// Cost of the step `from` -> `to` given the cost of standing on each end
fn edge_cost(map: &Map, from: Tripoint, to: Tripoint, c1: i32, c2: i32, s: &PathSettings) -> i32 {
    if from.z != to.z {
        let stairs = map.has_flag(TileFlags::GOES_UP, from) || map.has_flag(TileFlags::GOES_DOWN, from);
        if !stairs && !s.flies && to.z > from.z {
            return VERTICAL_COST + s.climb_cost * 50;
        }
        return VERTICAL_COST;
    }
    let diagonal = from.x != to.x && from.y != to.y;
    let mult = if diagonal && s.mode.is_trig() { 71 } else { 50 };
    (c1 + c2) * mult / 2
}

/// Lower bound on the remaining cost: every step costs at least 50
fn heuristic(a: Tripoint, b: Tripoint, mode: DistanceMode) -> i32 {
    2 * 25 * mode.rl_dist(a, b)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    pos: Tripoint,
    f_cost: i32,
    g_cost: i32,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; prefer deeper nodes on ties
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| self.g_cost.cmp(&other.g_cost))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Straight Bresenham line, if every tile on it is plain walking
fn straight_line(
    map: &Map,
    start: Tripoint,
    goal: Tripoint,
    s: &PathSettings,
    avoid: &HashSet<Tripoint>,
) -> Option<Vec<Tripoint>> {
    if start.z != goal.z {
        return None;
    }
    let line = line_to(start, goal);
    if line.len() as i32 > s.max_length {
        return None;
    }
    let clear = line.iter().all(|&p| {
        map.passable(p) && tile_cost(map, p, s, avoid).is_some()
    });
    clear.then_some(line)
}

/// Find a route from `start` to `goal`
pub fn route(
    map: &Map,
    start: Tripoint,
    goal: Tripoint,
    settings: &PathSettings,
    avoid: &HashSet<Tripoint>,
) -> Vec<Tripoint> {
    if start == goal || !map.inbounds(start) || !map.inbounds(goal) {
        return Vec::new();
    }
    if settings.mode.rl_dist(start, goal) > settings.max_dist {
        return Vec::new();
    }
    if let Some(line) = straight_line(map, start, goal, settings, avoid) {
        return line;
    }

    let pad = PATH_SEARCH_PAD;
    let min = Tripoint::new(start.x.min(goal.x) - pad, start.y.min(goal.y) - pad, map.min_z());
    let max = Tripoint::new(start.x.max(goal.x) + pad, start.y.max(goal.y) + pad, map.max_z());
    let in_box = |p: Tripoint| p.x >= min.x && p.y >= min.y && p.x <= max.x && p.y <= max.y;

    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<Tripoint, Tripoint> = HashMap::new();
    let mut g_scores: HashMap<Tripoint, (i32, i32)> = HashMap::new();
    let mut closed: HashSet<Tripoint> = HashSet::new();

    let start_cost = map.move_cost(start).max(2);
    g_scores.insert(start, (0, 0));
    open.push(OpenNode {
        pos: start,
        f_cost: heuristic(start, goal, settings.mode),
        g_cost: 0,
    });

    let mut best = start;
    let mut best_h = heuristic(start, goal, settings.mode);

    while let Some(current) = open.pop() {
        if current.pos == goal {
            return reconstruct_path(&came_from, goal);
        }
        if !closed.insert(current.pos) {
            continue;
        }
        let (current_g, current_len) = g_scores.get(&current.pos).copied().unwrap_or((i32::MAX, 0));
        if current.g_cost > current_g {
            continue;
        }
        let h = heuristic(current.pos, goal, settings.mode);
        if h < best_h {
            best_h = h;
            best = current.pos;
        }
        if current_len >= settings.max_length {
            continue;
        }

        let c1 = if current.pos == start {
            start_cost
        } else {
            tile_cost(map, current.pos, settings, avoid).unwrap_or(2)
        };

        let flat = current.pos.neighbors();
        let vertical = [current.pos.with_z(current.pos.z + 1), current.pos.with_z(current.pos.z - 1)];
        for next in flat.into_iter().chain(vertical) {
            if !in_box(next) || closed.contains(&next) {
                continue;
            }
            if next.z != current.pos.z && !vertical_ok(map, current.pos, next, settings) {
                continue;
            }
            let Some(c2) = tile_cost(map, next, settings, avoid) else {
                continue;
            };
            let tentative = current_g.saturating_add(edge_cost(map, current.pos, next, c1, c2, settings));
            if settings.max_cost > 0 && tentative > settings.max_cost {
                continue;
            }
            let known = g_scores.get(&next).map_or(i32::MAX, |&(g, _)| g);
            if tentative < known {
                came_from.insert(next, current.pos);
                g_scores.insert(next, (tentative, current_len + 1));
                open.push(OpenNode {
                    pos: next,
                    f_cost: tentative + heuristic(next, goal, settings.mode),
                    g_cost: tentative,
                });
            }
        }
    }

    if settings.partial && best != start {
        return reconstruct_path(&came_from, best);
    }
    Vec::new()
}

/// Walk the came-from chain back to the start, which is left out
fn reconstruct_path(came_from: &HashMap<Tripoint, Tripoint>, mut current: Tripoint) -> Vec<Tripoint> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.pop();
    path.reverse();
    path
}

/// Sum of step costs along a path starting from `start`
pub fn path_cost(map: &Map, start: Tripoint, path: &[Tripoint], settings: &PathSettings) -> i32 {
    let empty = HashSet::new();
    let mut prev = start;
    let mut c1 = map.move_cost(start).max(2);
    let mut total = 0;
    for &p in path {
        let c2 = tile_cost(map, p, settings, &empty).unwrap_or(2);
        total += edge_cost(map, prev, p, c1, c2, settings);
        prev = p;
        c1 = c2;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Terrain, TrapType, square_dist};

    fn walker() -> PathSettings {
        PathSettings::default()
    }

    fn no_avoid() -> HashSet<Tripoint> {
        HashSet::new()
    }

    fn assert_valid(start: Tripoint, path: &[Tripoint]) {
        let mut prev = start;
        for &p in path {
            let flat = p.z == prev.z && square_dist(prev, p) == 1;
            let vertical = prev.same_column(p) && (p.z - prev.z).abs() == 1;
            assert!(flat || vertical, "{prev} -> {p} is not a step");
            prev = p;
        }
    }

    #[test]
    fn test_route_straight_line() {
        let map = Map::from_ascii(&[
            "#######", //
            "#.....#", //
            "#.....#", //
            "#######",
        ]);
        let start = Tripoint::new(1, 1, 0);
        let goal = Tripoint::new(5, 2, 0);
        let path = map.route(start, goal, &walker(), &no_avoid());
        assert_eq!(path.last(), Some(&goal));
        assert_ne!(path.first(), Some(&start));
        assert_eq!(path.len(), 4);
        assert_valid(start, &path);
    }

    #[test]
    fn test_route_around_wall() {
        let map = Map::from_ascii(&[
            "#######", //
            "#..#..#", //
            "#..#..#", //
            "#.....#", //
            "#######",
        ]);
        let start = Tripoint::new(1, 1, 0);
        let goal = Tripoint::new(5, 1, 0);
        let path = map.route(start, goal, &walker(), &no_avoid());
        assert_eq!(path.last(), Some(&goal));
        assert!(!path.contains(&Tripoint::new(3, 1, 0)));
        assert!(path.contains(&Tripoint::new(3, 3, 0)));
        assert_valid(start, &path);
    }

    #[test]
    fn test_adjacent_wall_is_unreachable() {
        let map = Map::from_ascii(&[
            "#####", //
            "#.#.#", //
            "#####",
        ]);
        let start = Tripoint::new(1, 1, 0);
        let wall = Tripoint::new(2, 1, 0);
        assert!(map.route(start, wall, &walker(), &no_avoid()).is_empty());
        assert!(map.route(start, Tripoint::new(3, 1, 0), &walker(), &no_avoid()).is_empty());
    }

    #[test]
    fn test_basher_plans_through_door() {
        let map = Map::from_ascii(&[
            "#####", //
            "#.L.#", //
            "#####",
        ]);
        let start = Tripoint::new(1, 1, 0);
        let goal = Tripoint::new(3, 1, 0);
        assert!(map.route(start, goal, &walker(), &no_avoid()).is_empty());
        let basher = PathSettings {
            bash_strength: 40,
            ..walker()
        };
        let path = map.route(start, goal, &basher, &no_avoid());
        assert_eq!(path, vec![Tripoint::new(2, 1, 0), goal]);
    }

    #[test]
    fn test_door_opener() {
        let map = Map::from_ascii(&[
            "#####", //
            "#.+.#", //
            "#####",
        ]);
        let start = Tripoint::new(1, 1, 0);
        let goal = Tripoint::new(3, 1, 0);
        let opener = PathSettings {
            allow_open_doors: true,
            ..walker()
        };
        assert_eq!(map.route(start, goal, &opener, &no_avoid()).len(), 2);
    }

    #[test]
    fn test_avoid_set_and_hazards() {
        let mut map = Map::from_ascii(&[
            "#######", //
            "#.....#", //
            "#.....#", //
            "#######",
        ]);
        let start = Tripoint::new(1, 1, 0);
        let goal = Tripoint::new(5, 1, 0);
        let mut avoid = HashSet::new();
        avoid.insert(Tripoint::new(3, 1, 0));
        let path = map.route(start, goal, &walker(), &avoid);
        assert!(!path.contains(&Tripoint::new(3, 1, 0)));
        assert_eq!(path.last(), Some(&goal));

        map.set_trap(Tripoint::new(3, 2, 0), TrapType::BearTrap);
        map.add_field(Tripoint::new(3, 1, 0), FieldType::Fire, 2);
        let simple = PathSettings {
            hazards: HazardTier::Simple,
            ..walker()
        };
        let path = map.route(start, goal, &simple, &no_avoid());
        assert!(path.contains(&Tripoint::new(3, 2, 0)));
        let complex = PathSettings {
            hazards: HazardTier::Complex,
            ..walker()
        };
        assert!(map.route(start, goal, &complex, &no_avoid()).is_empty());
    }

    #[test]
    fn test_swimmer_and_flier_cross_water() {
        let map = Map::from_ascii(&[
            "#######", //
            "#..~..#", //
            "#######",
        ]);
        let start = Tripoint::new(1, 1, 0);
        let goal = Tripoint::new(5, 1, 0);
        assert!(map.route(start, goal, &walker(), &no_avoid()).is_empty());
        let swimmer = PathSettings {
            swims: true,
            ..walker()
        };
        assert_eq!(map.route(start, goal, &swimmer, &no_avoid()).len(), 4);
        let flier = PathSettings {
            flies: true,
            ..walker()
        };
        assert_eq!(map.route(start, goal, &flier, &no_avoid()).len(), 4);
    }

    #[test]
    fn test_partial_path_gets_close() {
        let map = Map::from_ascii(&[
            "#######", //
            "#...#.#", //
            "#######",
        ]);
        let start = Tripoint::new(1, 1, 0);
        let goal = Tripoint::new(5, 1, 0);
        assert!(map.route(start, goal, &walker(), &no_avoid()).is_empty());
        let partial = PathSettings {
            partial: true,
            ..walker()
        };
        let path = map.route(start, goal, &partial, &no_avoid());
        assert_eq!(path.last(), Some(&Tripoint::new(3, 1, 0)));
        assert_valid(start, &path);
    }

    #[test]
    fn test_stairs_between_levels() {
        let map = Map::from_ascii_levels(
            0,
            &[
                &["#####", "#.<.#", "#####"],
                &["#####", "#.>.#", "#####"],
            ],
        );
        let start = Tripoint::new(1, 1, 0);
        let goal = Tripoint::new(3, 1, 1);
        let path = map.route(start, goal, &walker(), &no_avoid());
        assert_eq!(path.last(), Some(&goal));
        assert!(path.contains(&Tripoint::new(2, 1, 1)));
        assert_valid(start, &path);
        let no_stairs = PathSettings {
            allow_stairs: false,
            ..walker()
        };
        assert!(map.route(start, goal, &no_stairs, &no_avoid()).is_empty());
    }

    #[test]
    fn test_trig_mode_costs_diagonals_more() {
        let map = Map::from_ascii(&[
            "#####", //
            "#...#", //
            "#...#", //
            "#####",
        ]);
        let start = Tripoint::new(1, 1, 0);
        let path = [Tripoint::new(2, 2, 0)];
        let rl = path_cost(&map, start, &path, &walker());
        let trig = path_cost(
            &map,
            start,
            &path,
            &PathSettings {
                mode: DistanceMode::Trigonometric,
                ..walker()
            },
        );
        assert_eq!(rl, 100);
        assert_eq!(trig, 142);
        assert_eq!(map.ter(Tripoint::new(2, 2, 0)), Terrain::Floor);
    }

    #[test]
    fn test_max_dist_limits_search() {
        let map = Map::from_ascii(&["#########", "#.......#", "#########"]);
        let settings = PathSettings {
            max_dist: 3,
            ..walker()
        };
        let path = map.route(Tripoint::new(1, 1, 0), Tripoint::new(7, 1, 0), &settings, &no_avoid());
        assert!(path.is_empty());
    }
}
