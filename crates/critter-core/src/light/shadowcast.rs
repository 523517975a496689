//! Octant shadow-casting over a single level
//!
//! Rows are scanned outward from the origin in each of the eight octants.
//! Slopes are exact fractions, so a transparent tile is lit only when its
//! centre lies inside the unobstructed sector. That keeps the result symmetric:
//! if A reaches B then B reaches A. Opaque tiles are lit if any part of them
//! faces the sector. Runs of differing transparency split the sector and
//! carry their own cumulative transparency into the next row. A run goes on
//! to the next row while its brightest tile is still above the cutoff.

use core::cmp::Ordering;

use crate::consts::{LIGHT_AMBIENT_LOW, LIGHT_TRANSPARENCY_SOLID};
use crate::map::DistanceMode;

/// An exact slope `rise / run` with `run > 0`
#[derive(Debug, Clone, Copy)]
pub struct Slope {
    rise: i32,
    run: i32,
}

impl Slope {
    pub const fn new(rise: i32, run: i32) -> Self {
        if run < 0 {
            Self { rise: -rise, run: -run }
        } else {
            Self { rise, run }
        }
    }

    /// Slope of the near edge of the tile at `col` in row `depth`
    const fn tile_edge(col: i32, depth: i32) -> Self {
        Self::new(2 * col - 1, 2 * depth)
    }

    fn cross(self, other: Slope) -> (i64, i64) {
        (
            self.rise as i64 * other.run as i64,
            other.rise as i64 * self.run as i64,
        )
    }
}

impl PartialEq for Slope {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = self.cross(*other);
        a == b
    }
}

impl Eq for Slope {}

impl PartialOrd for Slope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slope {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = self.cross(*other);
        a.cmp(&b)
    }
}

/// Floor division for a positive divisor
fn div_floor(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && a < 0 { q - 1 } else { q }
}

fn div_ceil(a: i64, b: i64) -> i64 {
    -div_floor(-a, b)
}

/// How values propagate: light fades with distance, sight only needs a clear line
pub trait Propagation {
    fn calc(numerator: f32, transparency: f32, distance: i32) -> f32;
    fn check(transparency: f32, intensity: f32) -> bool;

    /// Running average of transparency over the rows crossed so far
    fn accumulate(cumulative: f32, current: f32, distance: i32) -> f32 {
        let d = distance.max(1) as f32;
        ((d - 1.0) * cumulative + current) / d
    }
}

/// Light emitted from a source
#[derive(Debug, Clone, Copy)]
pub struct LightFalloff;

impl Propagation for LightFalloff {
    fn calc(numerator: f32, transparency: f32, distance: i32) -> f32 {
        let d = distance.max(1) as f32;
        numerator / ((transparency * d).exp() * d)
    }

    fn check(transparency: f32, intensity: f32) -> bool {
        transparency > LIGHT_TRANSPARENCY_SOLID && intensity > LIGHT_AMBIENT_LOW
    }
}

/// Fraction of a viewer's sight reaching a tile
#[derive(Debug, Clone, Copy)]
pub struct SightFalloff;

impl Propagation for SightFalloff {
    fn calc(numerator: f32, transparency: f32, distance: i32) -> f32 {
        numerator / (transparency * distance.max(1) as f32).exp()
    }

    fn check(transparency: f32, _intensity: f32) -> bool {
        transparency > LIGHT_TRANSPARENCY_SOLID
    }
}

/// Maps (col, depth) in octant space to a grid delta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Octant {
    pub xx: i32,
    pub xy: i32,
    pub yx: i32,
    pub yy: i32,
}

impl Octant {
    const fn new(xx: i32, xy: i32, yx: i32, yy: i32) -> Self {
        Self { xx, xy, yx, yy }
    }

    pub const fn delta(&self, col: i32, depth: i32) -> (i32, i32) {
        (
            col * self.xx + depth * self.xy,
            col * self.yx + depth * self.yy,
        )
    }

    /// The orthogonal step the octant's rows advance along
    pub const fn axis(&self) -> (i32, i32) {
        (self.xy, self.yy)
    }
}

pub const OCTANTS: [Octant; 8] = [
    Octant::new(1, 0, 0, 1),
    Octant::new(0, 1, 1, 0),
    Octant::new(-1, 0, 0, 1),
    Octant::new(0, -1, 1, 0),
    Octant::new(1, 0, 0, -1),
    Octant::new(0, 1, -1, 0),
    Octant::new(-1, 0, 0, -1),
    Octant::new(0, -1, -1, 0),
];

/// Angular mask for cones: only tiles whose bearing lies within the arc are written
#[derive(Debug, Clone, Copy)]
pub struct ArcMask {
    /// Degrees, 0 = +x, 90 = +y
    pub center: f32,
    pub half_width: f32,
}

impl ArcMask {
    fn contains(&self, dx: i32, dy: i32) -> bool {
        if dx == 0 && dy == 0 {
            return true;
        }
        let bearing = (dy as f32).atan2(dx as f32).to_degrees();
        let mut diff = (bearing - self.center) % 360.0;
        if diff > 180.0 {
            diff -= 360.0;
        } else if diff < -180.0 {
            diff += 360.0;
        }
        diff.abs() <= self.half_width
    }
}

/// Input and output grids for one cast
pub struct CastGrid<'a> {
    pub width: i32,
    pub height: i32,
    pub transparency: &'a [f32],
    pub output: &'a mut [f32],
}

impl CastGrid<'_> {
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((x * self.height + y) as usize)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Row {
    depth: i32,
    start: Slope,
    end: Slope,
    cumulative: f32,
}

/// One octant sweep from a fixed origin
struct Sweep<'g, 'a, P> {
    grid: &'g mut CastGrid<'a>,
    origin: (i32, i32),
    octant: Octant,
    numerator: f32,
    offset_distance: i32,
    radius: i32,
    mode: DistanceMode,
    mask: Option<ArcMask>,
    _model: core::marker::PhantomData<P>,
}

impl<P: Propagation> Sweep<'_, '_, P> {
    fn distance(&self, col: i32, depth: i32) -> i32 {
        let d = match self.mode {
            DistanceMode::Roguelike => depth,
            DistanceMode::Trigonometric => ((col * col + depth * depth) as f32).sqrt().round() as i32,
        };
        d + self.offset_distance
    }

    fn scan(&mut self, mut row: Row) {
        if row.depth > self.radius {
            return;
        }
        let depth = row.depth as i64;
        // Columns whose span at this depth touches the sector
        let min_col = div_floor(2 * depth * row.start.rise as i64 + row.start.run as i64, 2 * row.start.run as i64)
            .max(0) as i32;
        let max_col = div_ceil(2 * depth * row.end.rise as i64 - row.end.run as i64, 2 * row.end.run as i64)
            .min(depth) as i32;

        let mut prev: Option<f32> = None;
        // Brightest tile of the current run
        let mut run_peak = 0.0f32;
        for col in min_col..=max_col {
            let (dx, dy) = self.octant.delta(col, row.depth);
            let (x, y) = (self.origin.0 + dx, self.origin.1 + dy);
            let idx = self.grid.index(x, y);
            let transparency = idx.map_or(LIGHT_TRANSPARENCY_SOLID, |i| self.grid.transparency[i]);
            let opaque = transparency <= LIGHT_TRANSPARENCY_SOLID;

            let centre = Slope::new(col, row.depth);
            let symmetric = centre >= row.start && centre <= row.end;
            let intensity = P::calc(self.numerator, row.cumulative, self.distance(col, row.depth));
            if let Some(i) = idx {
                let masked = self.mask.is_some_and(|m| !m.contains(dx, dy));
                if (opaque || symmetric) && !masked && intensity > self.grid.output[i] {
                    self.grid.output[i] = intensity;
                }
            }

            if let Some(prev_t) = prev {
                if prev_t != transparency {
                    let prev_open = prev_t > LIGHT_TRANSPARENCY_SOLID;
                    if prev_open && P::check(prev_t, run_peak) {
                        let child = Row {
                            depth: row.depth + 1,
                            start: row.start,
                            end: Slope::tile_edge(col, row.depth),
                            cumulative: P::accumulate(row.cumulative, prev_t, row.depth),
                        };
                        self.scan(child);
                    }
                    if !opaque {
                        row.start = Slope::tile_edge(col, row.depth);
                    }
                    run_peak = 0.0;
                }
            }
            prev = Some(transparency);
            run_peak = run_peak.max(intensity);
        }

        if let Some(prev_t) = prev {
            if prev_t > LIGHT_TRANSPARENCY_SOLID && P::check(prev_t, run_peak) {
                self.scan(Row {
                    depth: row.depth + 1,
                    start: row.start,
                    end: row.end,
                    cumulative: P::accumulate(row.cumulative, prev_t, row.depth),
                });
            }
        }
    }
}

/// Parameters shared by every octant of a cast
#[derive(Debug, Clone, Copy)]
pub struct CastParams {
    pub origin: (i32, i32),
    pub numerator: f32,
    pub offset_distance: i32,
    pub radius: i32,
    pub mode: DistanceMode,
    pub initial_transparency: f32,
    pub mask: Option<ArcMask>,
}

/// Cast one octant
pub fn cast_octant<P: Propagation>(grid: &mut CastGrid<'_>, octant: Octant, params: &CastParams) {
    let radius = params.radius - params.offset_distance;
    if radius < 1 {
        return;
    }
    let mut sweep = Sweep::<P> {
        grid,
        origin: params.origin,
        octant,
        numerator: params.numerator,
        offset_distance: params.offset_distance,
        radius,
        mode: params.mode,
        mask: params.mask,
        _model: core::marker::PhantomData,
    };
    sweep.scan(Row {
        depth: 1,
        start: Slope::new(0, 1),
        end: Slope::new(1, 1),
        cumulative: params.initial_transparency,
    });
}

/// Cast all eight octants
pub fn cast_all<P: Propagation>(grid: &mut CastGrid<'_>, params: &CastParams) {
    for octant in OCTANTS {
        cast_octant::<P>(grid, octant, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{LIGHT_TRANSPARENCY_OPEN_AIR, MAX_VIEW_DISTANCE};

    fn open_grid(w: i32, h: i32) -> Vec<f32> {
        vec![LIGHT_TRANSPARENCY_OPEN_AIR; (w * h) as usize]
    }

    fn params(origin: (i32, i32)) -> CastParams {
        CastParams {
            origin,
            numerator: 1.0,
            offset_distance: 0,
            radius: MAX_VIEW_DISTANCE,
            mode: DistanceMode::Roguelike,
            initial_transparency: LIGHT_TRANSPARENCY_OPEN_AIR,
            mask: None,
        }
    }

    fn seen(w: i32, h: i32, t: &[f32], origin: (i32, i32)) -> Vec<f32> {
        let mut out = vec![0.0; (w * h) as usize];
        let mut grid = CastGrid { width: w, height: h, transparency: t, output: &mut out };
        cast_all::<SightFalloff>(&mut grid, &params(origin));
        out
    }

    #[test]
    fn test_slope_ordering() {
        assert!(Slope::new(1, 2) < Slope::new(2, 3));
        assert_eq!(Slope::new(2, 4), Slope::new(1, 2));
        assert_eq!(Slope::new(1, -2), Slope::new(-1, 2));
        assert_eq!(Slope::new(3, 6).max(Slope::new(1, 3)), Slope::new(1, 2));
    }

    #[test]
    fn test_open_field_sees_everything() {
        let (w, h) = (9, 9);
        let t = open_grid(w, h);
        let out = seen(w, h, &t, (4, 4));
        for (i, v) in out.iter().enumerate() {
            if i != (4 * h + 4) as usize {
                assert!(*v > 0.0, "tile {i} unseen");
            }
        }
    }

    #[test]
    fn test_wall_casts_shadow() {
        let (w, h) = (11, 11);
        let mut t = open_grid(w, h);
        // Wall directly east of the origin
        t[(6 * h + 5) as usize] = LIGHT_TRANSPARENCY_SOLID;
        let out = seen(w, h, &t, (5, 5));
        assert!(out[(6 * h + 5) as usize] > 0.0, "wall itself is lit");
        assert_eq!(out[(8 * h + 5) as usize], 0.0, "tile behind wall is dark");
        assert!(out[(5 * h + 8) as usize] > 0.0);
    }

    #[test]
    fn test_out_of_bounds_origin_edge() {
        let (w, h) = (5, 5);
        let t = open_grid(w, h);
        let out = seen(w, h, &t, (0, 0));
        assert!(out[(4 * h + 4) as usize] > 0.0);
    }

    #[test]
    fn test_light_falls_off() {
        let (w, h) = (11, 11);
        let t = open_grid(w, h);
        let mut out = vec![0.0; (w * h) as usize];
        let mut grid = CastGrid { width: w, height: h, transparency: &t, output: &mut out };
        let mut p = params((5, 5));
        p.numerator = 10.0;
        cast_all::<LightFalloff>(&mut grid, &p);
        let near = out[(6 * h + 5) as usize];
        let far = out[(7 * h + 5) as usize];
        assert!(near > far && far > 0.0);
        assert!(near < 10.0);
    }

    #[test]
    fn test_axis_stays_lit_past_faded_diagonal() {
        let (w, h) = (49, 49);
        let mut t = open_grid(w, h);
        let mut p = params((24, 24));
        p.numerator = 100.0;
        p.mode = DistanceMode::Trigonometric;
        let light = |t: &[f32]| {
            let mut out = vec![0.0; (w * h) as usize];
            let mut grid = CastGrid { width: w, height: h, transparency: t, output: &mut out };
            cast_all::<LightFalloff>(&mut grid, &p);
            out
        };
        let target = (36 * h + 24) as usize;
        let open = light(&t);
        t[(35 * h + 30) as usize] = LIGHT_TRANSPARENCY_SOLID;
        let walled = light(&t);
        assert!(open[target] > 0.0, "axis tile dark in the open");
        assert!(walled[target] <= open[target] + 1e-4);
    }

    #[test]
    fn test_arc_mask_limits_cone() {
        let (w, h) = (11, 11);
        let t = open_grid(w, h);
        let mut out = vec![0.0; (w * h) as usize];
        let mut grid = CastGrid { width: w, height: h, transparency: &t, output: &mut out };
        let mut p = params((5, 5));
        p.mask = Some(ArcMask { center: 0.0, half_width: 30.0 });
        cast_all::<SightFalloff>(&mut grid, &p);
        assert!(out[(8 * h + 5) as usize] > 0.0);
        assert_eq!(out[(2 * h + 5) as usize], 0.0);
    }
}
