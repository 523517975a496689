//! What a viewer can see

use super::shadowcast::{CastGrid, CastParams, SightFalloff, cast_all};
use super::zlight::{VerticalDirection, ZGrid, ZLevel, ZParams, cast_zlight};
use crate::consts::{
    LIGHT_TRANSPARENCY_OPEN_AIR, LIGHT_TRANSPARENCY_SOLID, MAX_VIEW_DISTANCE, VISIBILITY_FULL,
};
use crate::map::{DistanceMode, Map, Tripoint, line_to, square_dist};

/// Options for a seen-cache rebuild
#[derive(Debug, Clone, Copy)]
pub struct SeenOptions {
    /// Also look up and down through floor gaps
    pub three_d: bool,
    /// Levels above and below the viewer considered in 3D
    pub z_range: i32,
    pub mode: DistanceMode,
    /// Distance already travelled before the origin (e.g. looking through a camera)
    pub offset_distance: i32,
}

impl Default for SeenOptions {
    fn default() -> Self {
        Self {
            three_d: false,
            z_range: 4,
            mode: DistanceMode::Roguelike,
            offset_distance: 0,
        }
    }
}

impl Map {
    /// Recompute the seen cache for a viewer at `origin`
    pub fn build_seen_cache(&mut self, origin: Tripoint, opts: &SeenOptions) {
        for cache in &mut self.caches {
            cache.seen.fill(LIGHT_TRANSPARENCY_SOLID);
        }
        if !self.inbounds(origin) {
            return;
        }
        let (lo, hi) = if opts.three_d {
            (
                (origin.z - opts.z_range.max(0)).max(self.min_z()),
                (origin.z + opts.z_range.max(0)).min(self.max_z()),
            )
        } else {
            (origin.z, origin.z)
        };
        for z in lo..=hi {
            self.build_transparency_cache(z);
            self.build_floor_cache(z);
        }

        let Some(cache) = self.cache_mut(origin.z) else {
            return;
        };
        let (w, h) = (cache.width(), cache.height());
        if let Some(i) = cache.index(origin.x, origin.y) {
            cache.seen[i] = VISIBILITY_FULL;
        }
        let (transparency, _, seen) = cache.sight_layers();
        let mut grid = CastGrid {
            width: w,
            height: h,
            transparency,
            output: seen,
        };
        cast_all::<SightFalloff>(
            &mut grid,
            &CastParams {
                origin: (origin.x, origin.y),
                numerator: VISIBILITY_FULL,
                offset_distance: opts.offset_distance,
                radius: MAX_VIEW_DISTANCE,
                mode: opts.mode,
                initial_transparency: LIGHT_TRANSPARENCY_OPEN_AIR,
                mask: None,
            },
        );

        if lo == hi {
            return;
        }
        let gap_on = |map: &Map, z: i32| map.cache(z).is_some_and(|c| c.floor.iter().any(|f| !f));
        let up = origin.z < hi && gap_on(self, origin.z + 1);
        let down = origin.z > lo && gap_on(self, origin.z);
        let dir = match (up, down) {
            (true, true) => VerticalDirection::Both,
            (true, false) => VerticalDirection::Up,
            (false, true) => VerticalDirection::Down,
            (false, false) => return,
        };

        let first = (lo - self.min_z()) as usize;
        let last = (hi - self.min_z()) as usize;
        let levels = self.caches[first..=last]
            .iter_mut()
            .map(|c| {
                let (transparency, floor, output) = c.sight_layers();
                ZLevel {
                    transparency,
                    floor,
                    output,
                }
            })
            .collect();
        let mut grid = ZGrid {
            width: w,
            height: h,
            min_z: lo,
            levels,
        };
        let params = ZParams {
            numerator: VISIBILITY_FULL,
            offset_distance: opts.offset_distance,
            radius: MAX_VIEW_DISTANCE,
            mode: opts.mode,
            skip_origin_level: true,
        };
        cast_zlight::<SightFalloff>(&mut grid, origin, &params, dir);
    }

    /// Visibility of `p` from the last seen-cache origin
    pub fn seen_at(&self, p: Tripoint) -> f32 {
        self.cache(p.z)
            .and_then(|c| c.index(p.x, p.y).map(|i| c.seen[i]))
            .unwrap_or(LIGHT_TRANSPARENCY_SOLID)
    }

    pub fn is_seen(&self, p: Tripoint) -> bool {
        self.seen_at(p) > LIGHT_TRANSPARENCY_SOLID
    }

    /// Whether a clear line joins `from` and `to` within `range`.
    ///
    /// Lines are traced both ways so the answer does not depend on argument order.
    pub fn sees(&self, from: Tripoint, to: Tripoint, range: i32) -> bool {
        if !self.inbounds(from) || !self.inbounds(to) || square_dist(from, to) > range {
            return false;
        }
        from == to || self.clear_line(from, to) || self.clear_line(to, from)
    }

    fn clear_line(&self, from: Tripoint, to: Tripoint) -> bool {
        let mut prev = from;
        for p in line_to(from, to) {
            let blocked_vertically = if p.z > prev.z {
                self.has_floor(p)
            } else if p.z < prev.z {
                self.has_floor(prev)
            } else {
                false
            };
            if blocked_vertically {
                return false;
            }
            if p == to {
                return true;
            }
            if !self.is_transparent(p) {
                return false;
            }
            prev = p;
        }
        true
    }
}
