//! The tile grid: point queries and mutations over submap storage

use hashbrown::HashMap;

use super::coords::{DistanceMode, Tripoint};
use super::field::{Field, FieldType, TrapType, VehiclePart};
use super::line::line_to;
use super::submap::Submap;
use super::tile::{Furniture, Terrain, TileFlags};
use crate::consts::{SEEX, SEEY};
use crate::light::LevelCache;
use crate::rng::GameRng;

/// Outcome of a smash attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BashResult {
    /// Nothing there can be smashed
    NotBashable,
    /// Hit it, but it held
    Failed,
    /// Broke it
    Smashed,
}

/// A bounded multi-level tile world plus its lighting caches
#[derive(Debug, Clone)]
pub struct Map {
    width_sm: i32,
    height_sm: i32,
    min_z: i32,
    max_z: i32,
    submaps: Vec<Submap>,
    vehicles: HashMap<Tripoint, VehiclePart>,
    pub(crate) caches: Vec<LevelCache>,
    /// Multiplier applied to outdoor transparency (rain, fog)
    pub(crate) weather_sight_penalty: f32,
}

impl Map {
    /// Create a map of `width_sm` x `height_sm` submaps spanning `min_z..=max_z`.
    ///
    /// Levels above 0 start as open air, level 0 as dirt and deeper levels as rock.
    pub fn new(width_sm: i32, height_sm: i32, min_z: i32, max_z: i32) -> Self {
        let width_sm = width_sm.max(1);
        let height_sm = height_sm.max(1);
        let max_z = max_z.max(min_z);
        let mut submaps = Vec::new();
        for z in min_z..=max_z {
            let fill = match z {
                z if z > 0 => Terrain::OpenAir,
                0 => Terrain::Dirt,
                _ => Terrain::Rock,
            };
            for _ in 0..width_sm * height_sm {
                submaps.push(Submap::new(fill));
            }
        }
        let caches = (min_z..=max_z)
            .map(|_| LevelCache::new(width_sm * SEEX, height_sm * SEEY))
            .collect();
        Self {
            width_sm,
            height_sm,
            min_z,
            max_z,
            submaps,
            vehicles: HashMap::new(),
            caches,
            weather_sight_penalty: 1.0,
        }
    }

    /// Build a map from text rows, one slice of rows per level starting at `min_z`.
    ///
    /// Tiles beyond the supplied rows are walls.
    pub fn from_ascii_levels(min_z: i32, levels: &[&[&str]]) -> Self {
        let rows_w = levels
            .iter()
            .flat_map(|rows| rows.iter().map(|r| r.chars().count() as i32))
            .max()
            .unwrap_or(1);
        let rows_h = levels.iter().map(|rows| rows.len() as i32).max().unwrap_or(1);
        let width_sm = (rows_w + SEEX - 1) / SEEX;
        let height_sm = (rows_h + SEEY - 1) / SEEY;
        let max_z = min_z + levels.len().max(1) as i32 - 1;
        let mut map = Map::new(width_sm, height_sm, min_z, max_z);
        for (i, rows) in levels.iter().enumerate() {
            let z = min_z + i as i32;
            map.fill_level(z, Terrain::Wall);
            for (y, row) in rows.iter().enumerate() {
                for (x, c) in row.chars().enumerate() {
                    let p = Tripoint::new(x as i32, y as i32, z);
                    let (ter, furn) = glyph_tile(c);
                    map.set_ter(p, ter);
                    map.set_furn(p, furn);
                }
            }
        }
        map
    }

    /// Single-level text map at z = 0
    pub fn from_ascii(rows: &[&str]) -> Self {
        Self::from_ascii_levels(0, &[rows])
    }

    pub fn width(&self) -> i32 {
        self.width_sm * SEEX
    }

    pub fn height(&self) -> i32 {
        self.height_sm * SEEY
    }

    pub fn min_z(&self) -> i32 {
        self.min_z
    }

    pub fn max_z(&self) -> i32 {
        self.max_z
    }

    pub fn z_levels(&self) -> core::ops::RangeInclusive<i32> {
        self.min_z..=self.max_z
    }

    pub fn inbounds(&self, p: Tripoint) -> bool {
        p.x >= 0
            && p.y >= 0
            && p.x < self.width()
            && p.y < self.height()
            && p.z >= self.min_z
            && p.z <= self.max_z
    }

    pub fn inbounds_z(&self, z: i32) -> bool {
        z >= self.min_z && z <= self.max_z
    }

    pub(crate) fn cache(&self, z: i32) -> Option<&LevelCache> {
        if !self.inbounds_z(z) {
            return None;
        }
        self.caches.get((z - self.min_z) as usize)
    }

    pub(crate) fn cache_mut(&mut self, z: i32) -> Option<&mut LevelCache> {
        if !self.inbounds_z(z) {
            return None;
        }
        self.caches.get_mut((z - self.min_z) as usize)
    }

    fn locate(&self, p: Tripoint) -> Option<(usize, usize)> {
        if !self.inbounds(p) {
            return None;
        }
        let (smx, smy) = (p.x / SEEX, p.y / SEEY);
        let level = (p.z - self.min_z) * self.width_sm * self.height_sm;
        let sm = (level + smx * self.height_sm + smy) as usize;
        Some((sm, Submap::index(p.x % SEEX, p.y % SEEY)))
    }

    fn mark_dirty(&mut self, z: i32, floor: bool) {
        if let Some(cache) = self.cache_mut(z) {
            cache.transparency_dirty = true;
            cache.floor_dirty |= floor;
        }
        // The level below sees this level's floor as its roof
        if floor {
            if let Some(cache) = self.cache_mut(z - 1) {
                cache.floor_dirty = true;
            }
        }
    }

    pub fn ter(&self, p: Tripoint) -> Terrain {
        match self.locate(p) {
            Some((sm, i)) => self.submaps[sm].ter(i),
            None => Terrain::Null,
        }
    }

    /// Set terrain; returns false out of bounds
    pub fn set_ter(&mut self, p: Tripoint, ter: Terrain) -> bool {
        let Some((sm, i)) = self.locate(p) else {
            return false;
        };
        let old = self.submaps[sm].ter(i);
        if old == ter {
            return true;
        }
        self.submaps[sm].set_ter(i, ter);
        self.mark_dirty(p.z, old.has_floor() != ter.has_floor());
        true
    }

    pub fn furn(&self, p: Tripoint) -> Furniture {
        match self.locate(p) {
            Some((sm, i)) => self.submaps[sm].furn(i),
            None => Furniture::None,
        }
    }

    pub fn set_furn(&mut self, p: Tripoint, furn: Furniture) -> bool {
        let Some((sm, i)) = self.locate(p) else {
            return false;
        };
        if self.submaps[sm].furn(i) != furn {
            self.submaps[sm].set_furn(i, furn);
            self.mark_dirty(p.z, false);
        }
        true
    }

    /// Fill a whole level with one terrain
    pub fn fill_level(&mut self, z: i32, ter: Terrain) {
        for x in 0..self.width() {
            for y in 0..self.height() {
                self.set_ter(Tripoint::new(x, y, z), ter);
            }
        }
    }

    /// Fill the inclusive rectangle spanned by `a` and `b` on `a.z`
    pub fn fill_rect(&mut self, a: Tripoint, b: Tripoint, ter: Terrain) {
        for x in a.x.min(b.x)..=a.x.max(b.x) {
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                self.set_ter(Tripoint::new(x, y, a.z), ter);
            }
        }
    }

    pub fn fields_at(&self, p: Tripoint) -> &[Field] {
        match self.locate(p) {
            Some((sm, i)) => self.submaps[sm].fields(i),
            None => &[],
        }
    }

    pub fn field_intensity(&self, p: Tripoint, kind: FieldType) -> i32 {
        self.fields_at(p)
            .iter()
            .find(|f| f.kind == kind)
            .map_or(0, |f| f.intensity)
    }

    /// Add or strengthen a field; returns true if the tile changed
    pub fn add_field(&mut self, p: Tripoint, kind: FieldType, intensity: i32) -> bool {
        let Some((sm, i)) = self.locate(p) else {
            return false;
        };
        if self.ter(p) == Terrain::Null || !self.ter(p).is_transparent() {
            return false;
        }
        let changed = self.submaps[sm].add_field(i, Field::new(kind, intensity));
        if changed {
            self.mark_dirty(p.z, false);
        }
        changed
    }

    pub fn remove_field(&mut self, p: Tripoint, kind: FieldType) -> bool {
        let Some((sm, i)) = self.locate(p) else {
            return false;
        };
        let changed = self.submaps[sm].remove_field(i, kind);
        if changed {
            self.mark_dirty(p.z, false);
        }
        changed
    }

    pub fn trap_at(&self, p: Tripoint) -> Option<TrapType> {
        self.locate(p).and_then(|(sm, i)| self.submaps[sm].trap(i))
    }

    pub fn set_trap(&mut self, p: Tripoint, trap: TrapType) -> bool {
        let Some((sm, i)) = self.locate(p) else {
            return false;
        };
        self.submaps[sm].set_trap(i, Some(trap));
        true
    }

    pub fn remove_trap(&mut self, p: Tripoint) {
        if let Some((sm, i)) = self.locate(p) {
            self.submaps[sm].set_trap(i, None);
        }
    }

    /// Luminance of items lying on the tile
    pub fn item_luminance(&self, p: Tripoint) -> f32 {
        self.locate(p).map_or(0.0, |(sm, i)| self.submaps[sm].lum(i))
    }

    pub fn set_item_luminance(&mut self, p: Tripoint, lum: f32) {
        if let Some((sm, i)) = self.locate(p) {
            self.submaps[sm].set_lum(i, lum.max(0.0));
        }
    }

    pub fn veh_at(&self, p: Tripoint) -> Option<&VehiclePart> {
        self.vehicles.get(&p)
    }

    pub fn add_vehicle_part(&mut self, p: Tripoint, part: VehiclePart) {
        if self.inbounds(p) {
            self.vehicles.insert(p, part);
        }
    }

    pub fn remove_vehicle_part(&mut self, p: Tripoint) -> Option<VehiclePart> {
        self.vehicles.remove(&p)
    }

    pub fn vehicle_parts(&self) -> impl Iterator<Item = (&Tripoint, &VehiclePart)> {
        self.vehicles.iter()
    }

    /// Terrain and furniture flags combined
    pub fn flags_at(&self, p: Tripoint) -> TileFlags {
        self.ter(p).flags() | self.furn(p).flags()
    }

    pub fn has_flag(&self, flag: TileFlags, p: Tripoint) -> bool {
        self.flags_at(p).intersects(flag)
    }

    pub fn has_floor(&self, p: Tripoint) -> bool {
        self.ter(p).has_floor()
    }

    /// No floor above this tile
    pub fn is_outside(&self, p: Tripoint) -> bool {
        if !self.inbounds(p) {
            return false;
        }
        let above = p.with_z(p.z + 1);
        !self.inbounds(above) || !self.has_floor(above)
    }

    /// Movement cost of the tile; 0 means impassable
    pub fn move_cost(&self, p: Tripoint) -> i32 {
        let ter_cost = self.ter(p).move_cost();
        if ter_cost == 0 {
            return 0;
        }
        let furn_mod = self.furn(p).move_cost_mod();
        if furn_mod < 0 {
            return 0;
        }
        if self.veh_at(p).is_some_and(|v| v.obstacle) {
            return 0;
        }
        ter_cost + furn_mod
    }

    pub fn passable(&self, p: Tripoint) -> bool {
        self.move_cost(p) != 0
    }

    pub fn impassable(&self, p: Tripoint) -> bool {
        !self.passable(p)
    }

    /// Cost in move points of stepping between two adjacent tiles.
    ///
    /// Diagonals and level changes are weighted only under trigonometric distance.
    pub fn combined_movecost(&self, from: Tripoint, to: Tripoint, mode: DistanceMode) -> i32 {
        const MULTS: [i32; 4] = [0, 50, 71, 100];
        let c1 = self.move_cost(from);
        let c2 = self.move_cost(to);
        if c1 == 0 || c2 == 0 {
            return 0;
        }
        let axes = (from.x != to.x) as usize + (from.y != to.y) as usize + (from.z != to.z) as usize;
        let idx = if mode.is_trig() { axes } else { axes.min(1) };
        (c1 + c2) * MULTS[idx] / 2
    }

    /// Chance rating (0..=10) that `strength` smashes whatever is at `p`;
    /// -1 when nothing there is bashable.
    pub fn bash_rating(&self, strength: i32, p: Tripoint) -> i32 {
        if !self.inbounds(p) {
            return -1;
        }
        if self.veh_at(p).is_some_and(|v| v.obstacle) {
            return 2;
        }
        let window = if let Some(b) = self.furn(p).bash() {
            Some((b.str_min, b.str_max))
        } else {
            self.ter(p).bash().map(|b| (b.str_min, b.str_max))
        };
        let Some((min, max)) = window else {
            return -1;
        };
        if strength < min {
            0
        } else if strength >= max {
            10
        } else {
            (10 * (strength - min) / (max - min).max(1)).max(1)
        }
    }

    /// Try to smash furniture, then terrain, at `p`
    pub fn bash(&mut self, p: Tripoint, strength: i32, rng: &mut GameRng) -> BashResult {
        if let Some(b) = self.furn(p).bash() {
            if strength >= rng.rng(b.str_min, b.str_max) {
                self.set_furn(p, Furniture::None);
                return BashResult::Smashed;
            }
            return BashResult::Failed;
        }
        if let Some(b) = self.ter(p).bash() {
            if strength >= rng.rng(b.str_min, b.str_max) {
                self.set_ter(p, b.result);
                return BashResult::Smashed;
            }
            return BashResult::Failed;
        }
        BashResult::NotBashable
    }

    /// Open a door at `p`. Doors that only open from inside refuse
    /// creatures standing outdoors; none of the stock doors do.
    pub fn open_door(&mut self, p: Tripoint, _from_inside: bool) -> bool {
        match self.ter(p).opened() {
            Some(open) => self.set_ter(p, open),
            None => false,
        }
    }

    pub fn close_door(&mut self, p: Tripoint) -> bool {
        match self.ter(p).closed() {
            Some(closed) => self.set_ter(p, closed),
            None => false,
        }
    }

    /// Whether a straight vertical move between `from` and `to` is possible
    pub fn valid_move(&self, from: Tripoint, to: Tripoint, flies: bool, climbs: bool) -> bool {
        if !self.inbounds(to) || !from.same_column(to) || (to.z - from.z).abs() != 1 {
            return false;
        }
        if to.z > from.z {
            if self.has_flag(TileFlags::GOES_UP, from) {
                return true;
            }
            let can_lift = flies || (climbs && self.has_flag(TileFlags::CLIMBABLE, from));
            can_lift && !self.has_floor(to)
        } else {
            if self.has_flag(TileFlags::GOES_DOWN, from) {
                return true;
            }
            flies && !self.has_floor(from)
        }
    }

    /// Every tile strictly between the ends has a move cost within `cost_min..=cost_max`
    pub fn clear_path(&self, from: Tripoint, to: Tripoint, range: i32, cost_min: i32, cost_max: i32) -> bool {
        if crate::map::square_dist(from, to) > range {
            return false;
        }
        let line = line_to(from, to);
        let n = line.len();
        line.iter().take(n.saturating_sub(1)).all(|&p| {
            let cost = self.move_cost(p);
            cost >= cost_min && cost <= cost_max
        })
    }
}

/// Terrain and furniture for a text-map glyph
fn glyph_tile(c: char) -> (Terrain, Furniture) {
    match c {
        '.' => (Terrain::Floor, Furniture::None),
        ',' => (Terrain::Grass, Furniture::None),
        '#' => (Terrain::Wall, Furniture::None),
        'R' => (Terrain::Rock, Furniture::None),
        'G' => (Terrain::GlassWall, Furniture::None),
        '"' => (Terrain::Window, Furniture::None),
        '+' => (Terrain::DoorClosed, Furniture::None),
        'L' => (Terrain::DoorLocked, Furniture::None),
        '\'' => (Terrain::DoorOpen, Furniture::None),
        'T' => (Terrain::Tree, Furniture::None),
        '^' => (Terrain::Rubble, Furniture::None),
        '~' => (Terrain::WaterDeep, Furniture::None),
        'w' => (Terrain::WaterShallow, Furniture::None),
        '=' => (Terrain::Lava, Furniture::None),
        'o' => (Terrain::Pit, Furniture::None),
        '<' => (Terrain::StairsUp, Furniture::None),
        '>' => (Terrain::StairsDown, Furniture::None),
        ' ' => (Terrain::OpenAir, Furniture::None),
        'B' => (Terrain::Floor, Furniture::Boulder),
        'h' => (Terrain::Floor, Furniture::Chair),
        'n' => (Terrain::Floor, Furniture::Table),
        'l' => (Terrain::Floor, Furniture::Lamp),
        _ => (Terrain::Floor, Furniture::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> Map {
        Map::from_ascii(&[
            "#######", //
            "#.....#", //
            "#..B..#", //
            "#.....+", //
            "#######",
        ])
    }

    #[test]
    fn test_out_of_bounds_is_null() {
        let map = room();
        assert_eq!(map.ter(Tripoint::new(-1, 0, 0)), Terrain::Null);
        assert_eq!(map.ter(Tripoint::new(0, 0, 5)), Terrain::Null);
        assert!(map.impassable(Tripoint::new(500, 0, 0)));
        assert_eq!(map.bash_rating(100, Tripoint::new(-3, -3, 0)), -1);
    }

    #[test]
    fn test_ascii_layout() {
        let map = room();
        assert_eq!(map.width(), 12);
        assert_eq!(map.ter(Tripoint::new(1, 1, 0)), Terrain::Floor);
        assert_eq!(map.ter(Tripoint::new(6, 3, 0)), Terrain::DoorClosed);
        assert_eq!(map.furn(Tripoint::new(3, 2, 0)), Furniture::Boulder);
        assert_eq!(map.ter(Tripoint::new(10, 10, 0)), Terrain::Wall);
    }

    #[test]
    fn test_move_cost_with_furniture() {
        let mut map = room();
        let p = Tripoint::new(2, 2, 0);
        assert_eq!(map.move_cost(p), 2);
        map.set_furn(p, Furniture::Table);
        assert_eq!(map.move_cost(p), 4);
        assert!(map.impassable(Tripoint::new(3, 2, 0)));
    }

    #[test]
    fn test_combined_movecost_modes() {
        let map = room();
        let a = Tripoint::new(1, 1, 0);
        let diag = Tripoint::new(2, 2, 0);
        let orth = Tripoint::new(2, 1, 0);
        assert_eq!(map.combined_movecost(a, orth, DistanceMode::Roguelike), 100);
        assert_eq!(map.combined_movecost(a, diag, DistanceMode::Roguelike), 100);
        assert_eq!(map.combined_movecost(a, diag, DistanceMode::Trigonometric), 142);
        assert_eq!(map.combined_movecost(a, Tripoint::new(0, 0, 0), DistanceMode::Roguelike), 0);
    }

    #[test]
    fn test_bash_rating_scale() {
        let map = room();
        let door = Tripoint::new(6, 3, 0);
        assert_eq!(map.bash_rating(4, door), 0);
        assert_eq!(map.bash_rating(80, door), 10);
        let mid = map.bash_rating(44, door);
        assert!((1..10).contains(&mid));
        assert_eq!(map.bash_rating(50, Tripoint::new(1, 1, 0)), -1);
    }

    #[test]
    fn test_vehicle_obstacle_blocks() {
        let mut map = room();
        let p = Tripoint::new(2, 1, 0);
        map.add_vehicle_part(p, VehiclePart::obstacle());
        assert!(map.impassable(p));
        assert_eq!(map.bash_rating(1, p), 2);
        map.remove_vehicle_part(p);
        assert!(map.passable(p));
    }

    #[test]
    fn test_open_and_bash_door() {
        let mut map = room();
        let door = Tripoint::new(6, 3, 0);
        assert!(map.open_door(door, true));
        assert_eq!(map.ter(door), Terrain::DoorOpen);
        assert!(map.close_door(door));
        let mut rng = GameRng::new(1);
        assert_eq!(map.bash(door, 200, &mut rng), BashResult::Smashed);
        assert_eq!(map.ter(door), Terrain::DoorBroken);
        assert_eq!(map.bash(Tripoint::new(1, 1, 0), 200, &mut rng), BashResult::NotBashable);
    }

    #[test]
    fn test_mutation_marks_dirty() {
        let mut map = room();
        map.cache_mut(0).unwrap().transparency_dirty = false;
        map.set_ter(Tripoint::new(2, 2, 0), Terrain::Wall);
        assert!(map.cache(0).unwrap().is_transparency_dirty());
        map.cache_mut(0).unwrap().transparency_dirty = false;
        map.add_field(Tripoint::new(1, 1, 0), FieldType::Smoke, 2);
        assert!(map.cache(0).unwrap().is_transparency_dirty());
    }

    #[test]
    fn test_vertical_moves() {
        let mut map = Map::new(1, 1, 0, 1);
        let base = Tripoint::new(4, 4, 0);
        let up = base.with_z(1);
        assert!(!map.valid_move(base, up, false, false));
        // Open air above: fliers rise, walkers do not
        assert!(map.valid_move(base, up, true, false));
        map.set_ter(base, Terrain::StairsUp);
        assert!(map.valid_move(base, up, false, false));
        // Falling through open air needs flight to be a deliberate move
        assert!(map.valid_move(up, base, true, false));
        assert!(!map.valid_move(up, base, false, false));
        assert!(map.is_outside(base));
    }
}
