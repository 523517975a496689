//! Ambient light: natural light, openings and local sources

use serde::{Deserialize, Serialize};
use strum::Display;

use super::shadowcast::{
    ArcMask, CastGrid, CastParams, LightFalloff, OCTANTS, Propagation, cast_all, cast_octant,
};
use crate::consts::{
    LIGHT_AMBIENT_DIM, LIGHT_AMBIENT_LIT, LIGHT_AMBIENT_LOW, LIGHT_SOURCE_BRIGHT,
    LIGHT_TRANSPARENCY_OPEN_AIR, LIGHT_TRANSPARENCY_SOLID, MAX_VIEW_DISTANCE,
};
use crate::map::{DistanceMode, LightShape, Map, Tripoint, line_to_2d};

/// How well lit a tile is
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, Display,
)]
#[repr(u8)]
pub enum LitLevel {
    #[default]
    Dark = 0,
    /// Too obscured to make out, but a light source shows through
    BrightOnly = 1,
    Low = 2,
    Lit = 3,
    Bright = 4,
}

/// A point light the caller knows about (creatures, carried lamps)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    pub pos: Tripoint,
    pub luminance: f32,
    /// Marks the tile as a bright source regardless of its luminance
    pub bright: bool,
}

impl LightSource {
    pub fn new(pos: Tripoint, luminance: f32) -> Self {
        Self {
            pos,
            luminance,
            bright: false,
        }
    }
}

/// Everything outside the map that feeds a lightmap rebuild
#[derive(Debug, Clone, Default)]
pub struct LightEnvironment {
    /// Outdoor light level (sun or moon)
    pub natural_light: f32,
    pub sources: Vec<LightSource>,
    pub mode: DistanceMode,
}

impl Map {
    /// Transparency of a tile computed from terrain, furniture, fields and weather
    fn tile_transparency(&self, p: Tripoint) -> f32 {
        if !self.inbounds(p) || !self.ter(p).is_transparent() || !self.furn(p).is_transparent() {
            return LIGHT_TRANSPARENCY_SOLID;
        }
        let mut value = LIGHT_TRANSPARENCY_OPEN_AIR;
        if self.is_outside(p) {
            value *= self.weather_sight_penalty;
        }
        for field in self.fields_at(p) {
            value *= field.kind.translucency(field.intensity);
        }
        value
    }

    /// Rebuild the transparency cache of level `z` if it is dirty.
    ///
    /// Returns true if anything was rebuilt.
    pub fn build_transparency_cache(&mut self, z: i32) -> bool {
        let Some(cache) = self.cache(z) else {
            return false;
        };
        if !cache.transparency_dirty {
            return false;
        }
        let (w, h) = (self.width(), self.height());
        let mut values = Vec::with_capacity((w * h) as usize);
        for x in 0..w {
            for y in 0..h {
                values.push(self.tile_transparency(Tripoint::new(x, y, z)));
            }
        }
        if let Some(cache) = self.cache_mut(z) {
            cache.transparency = values;
            cache.transparency_dirty = false;
        }
        true
    }

    /// Rebuild the floor and outside caches of level `z` if stale
    pub fn build_floor_cache(&mut self, z: i32) -> bool {
        let Some(cache) = self.cache(z) else {
            return false;
        };
        if !cache.floor_dirty {
            return false;
        }
        let (w, h) = (self.width(), self.height());
        let mut floor = Vec::with_capacity((w * h) as usize);
        let mut outside = Vec::with_capacity((w * h) as usize);
        for x in 0..w {
            for y in 0..h {
                let p = Tripoint::new(x, y, z);
                floor.push(self.has_floor(p));
                outside.push(self.is_outside(p));
            }
        }
        if let Some(cache) = self.cache_mut(z) {
            cache.floor = floor;
            cache.outside = outside;
            cache.floor_dirty = false;
        }
        true
    }

    /// Bring every level's transparency and floor caches up to date
    pub fn build_map_cache(&mut self) {
        for z in self.z_levels() {
            self.build_transparency_cache(z);
            self.build_floor_cache(z);
        }
    }

    /// Weather multiplier on outdoor transparency; dirties every level
    pub fn set_weather_sight_penalty(&mut self, penalty: f32) {
        let penalty = penalty.max(1.0);
        if penalty == self.weather_sight_penalty {
            return;
        }
        self.weather_sight_penalty = penalty;
        for cache in &mut self.caches {
            cache.transparency_dirty = true;
        }
    }

    /// Current transparency at `p`. A stale level is answered from the tiles directly.
    pub fn transparency_at(&self, p: Tripoint) -> f32 {
        let Some(cache) = self.cache(p.z) else {
            return LIGHT_TRANSPARENCY_SOLID;
        };
        if cache.transparency_dirty {
            return self.tile_transparency(p);
        }
        cache
            .index(p.x, p.y)
            .map_or(LIGHT_TRANSPARENCY_SOLID, |i| cache.transparency[i])
    }

    pub fn is_transparent(&self, p: Tripoint) -> bool {
        self.transparency_at(p) > LIGHT_TRANSPARENCY_SOLID
    }

    /// Recompute the lightmap of level `z`
    pub fn generate_lightmap(&mut self, z: i32, env: &LightEnvironment) {
        if !self.inbounds_z(z) {
            return;
        }
        self.build_transparency_cache(z);
        self.build_floor_cache(z);
        if let Some(cache) = self.cache_mut(z) {
            cache.reset_light();
        }
        self.build_sunlight(z, env.natural_light, env.mode);

        let (w, h) = (self.width(), self.height());

        for source in env.sources.iter().filter(|s| s.pos.z == z) {
            if source.luminance > 0.0 {
                self.add_light_source(source.pos, source.luminance);
            }
        }

        // Terrain, furniture, fields and items
        for x in 0..w {
            for y in 0..h {
                let p = Tripoint::new(x, y, z);
                let mut lum = self.ter(p).light_emitted().max(self.furn(p).light_emitted());
                for field in self.fields_at(p) {
                    lum = lum.max(field.kind.light_emitted(field.intensity));
                }
                lum = lum.max(self.item_luminance(p));
                if lum > 0.0 {
                    self.add_light_source(p, lum);
                }
            }
        }

        let vehicle_lights: Vec<_> = self
            .vehicle_parts()
            .filter(|(p, _)| p.z == z)
            .filter_map(|(p, part)| part.light.map(|l| (*p, l)))
            .collect();
        for (p, light) in vehicle_lights {
            match light.shape {
                LightShape::Circle => self.add_light_source(p, light.luminance),
                LightShape::Cone { direction, width } => {
                    self.apply_light_arc(p, direction as f32, light.luminance, width as f32, env.mode)
                }
                LightShape::Beam { dx, dy } => {
                    let target = Tripoint::new(p.x + dx, p.y + dy, z);
                    self.apply_light_ray(p, target, light.luminance, env.mode);
                }
            }
        }

        let buffered: Vec<(Tripoint, f32)> = match self.cache(z) {
            Some(cache) => (0..w)
                .flat_map(|x| (0..h).map(move |y| (x, y)))
                .filter_map(|(x, y)| {
                    let lum = cache.source_buffer[cache.index(x, y)?];
                    (lum > 0.0).then_some((Tripoint::new(x, y, z), lum))
                })
                .collect(),
            None => Vec::new(),
        };
        for (p, lum) in buffered {
            self.apply_light_source(p, lum, env.mode);
        }

        for source in env.sources.iter().filter(|s| s.bright && s.pos.z == z) {
            if let Some(cache) = self.cache_mut(z) {
                if let Some(i) = cache.index(source.pos.x, source.pos.y) {
                    cache.source[i] = cache.source[i].max(LIGHT_SOURCE_BRIGHT);
                    cache.light[i] = cache.light[i].max(LIGHT_SOURCE_BRIGHT);
                }
            }
        }
    }

    /// Natural light outdoors, a dim remainder indoors, and light spilling in through openings
    fn build_sunlight(&mut self, z: i32, natural_light: f32, mode: DistanceMode) {
        let inside_light = if natural_light > LIGHT_SOURCE_BRIGHT && z >= 0 {
            LIGHT_AMBIENT_DIM * 0.8
        } else {
            LIGHT_AMBIENT_LOW
        };
        let Some(cache) = self.cache_mut(z) else {
            return;
        };
        for i in 0..cache.light.len() {
            let value = if cache.outside[i] { natural_light } else { inside_light };
            cache.ambient[i] = value;
            cache.light[i] = value;
        }
        if natural_light <= inside_light {
            return;
        }

        // Outdoor tiles next to a transparent indoor tile shine inward
        let (w, h) = (self.width(), self.height());
        let mut openings = Vec::new();
        if let Some(cache) = self.cache(z) {
            for x in 0..w {
                for y in 0..h {
                    let Some(i) = cache.index(x, y) else { continue };
                    if !cache.outside[i] || cache.transparency[i] <= LIGHT_TRANSPARENCY_SOLID {
                        continue;
                    }
                    for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                        let Some(j) = cache.index(x + dx, y + dy) else { continue };
                        if !cache.outside[j] && cache.transparency[j] > LIGHT_TRANSPARENCY_SOLID {
                            openings.push((Tripoint::new(x, y, z), (dx, dy)));
                        }
                    }
                }
            }
        }
        for (p, dir) in openings {
            self.apply_directional_light(p, dir, natural_light, mode);
        }
    }

    /// Buffer a point source; the strongest per tile is cast later
    pub fn add_light_source(&mut self, p: Tripoint, luminance: f32) {
        if let Some(cache) = self.cache_mut(p.z) {
            if let Some(i) = cache.index(p.x, p.y) {
                cache.source_buffer[i] = cache.source_buffer[i].max(luminance);
            }
        }
    }

    /// Cast a point source in every direction not already covered by a stronger neighbour
    pub fn apply_light_source(&mut self, p: Tripoint, luminance: f32, mode: DistanceMode) {
        let Some(cache) = self.cache_mut(p.z) else {
            return;
        };
        let Some(i) = cache.index(p.x, p.y) else {
            return;
        };
        cache.light[i] = cache.light[i].max(luminance.max(1.0));
        cache.source[i] = cache.source[i].max(luminance);
        if luminance <= 1.0 {
            return;
        }
        let luminance = if luminance <= 2.0 { 1.49 } else { luminance };

        let (w, h) = (cache.width(), cache.height());
        let octants: Vec<_> = OCTANTS
            .into_iter()
            .filter(|o| {
                let (ax, ay) = o.axis();
                cache
                    .index(p.x + ax, p.y + ay)
                    .is_none_or(|j| cache.source_buffer[j] < luminance)
            })
            .collect();
        let mut grid = CastGrid {
            width: w,
            height: h,
            transparency: &cache.transparency,
            output: &mut cache.light,
        };
        let params = light_params(p, luminance, mode, None);
        for octant in octants {
            cast_octant::<LightFalloff>(&mut grid, octant, &params);
        }
    }

    /// Light a cone centred on `angle` degrees, `width` degrees wide
    pub fn apply_light_arc(&mut self, p: Tripoint, angle: f32, luminance: f32, width: f32, mode: DistanceMode) {
        let Some(cache) = self.cache_mut(p.z) else {
            return;
        };
        let Some(i) = cache.index(p.x, p.y) else {
            return;
        };
        cache.light[i] = cache.light[i].max(luminance);
        let (w, h) = (cache.width(), cache.height());
        let mut grid = CastGrid {
            width: w,
            height: h,
            transparency: &cache.transparency,
            output: &mut cache.light,
        };
        let mask = ArcMask {
            center: angle,
            half_width: width / 2.0,
        };
        cast_all::<LightFalloff>(&mut grid, &light_params(p, luminance, mode, Some(mask)));
    }

    /// Light the tiles along a straight beam until something opaque stops it
    pub fn apply_light_ray(&mut self, from: Tripoint, to: Tripoint, luminance: f32, mode: DistanceMode) {
        let Some(cache) = self.cache_mut(from.z) else {
            return;
        };
        let mut cumulative = LIGHT_TRANSPARENCY_OPEN_AIR;
        for (step, (x, y)) in line_to_2d((from.x, from.y), (to.x, to.y)).into_iter().enumerate() {
            let Some(i) = cache.index(x, y) else {
                break;
            };
            let dist = mode.rl_dist(from, Tripoint::new(x, y, from.z));
            let intensity = LightFalloff::calc(luminance, cumulative, dist);
            cache.light[i] = cache.light[i].max(intensity);
            let t = cache.transparency[i];
            if !LightFalloff::check(t, intensity) {
                break;
            }
            cumulative = LightFalloff::accumulate(cumulative, t, step as i32 + 1);
        }
    }

    /// Cast the two octants that advance along `dir`
    fn apply_directional_light(&mut self, p: Tripoint, dir: (i32, i32), luminance: f32, mode: DistanceMode) {
        let Some(cache) = self.cache_mut(p.z) else {
            return;
        };
        let (w, h) = (cache.width(), cache.height());
        let mut grid = CastGrid {
            width: w,
            height: h,
            transparency: &cache.transparency,
            output: &mut cache.light,
        };
        let params = light_params(p, luminance, mode, None);
        for octant in OCTANTS.into_iter().filter(|o| o.axis() == dir) {
            cast_octant::<LightFalloff>(&mut grid, octant, &params);
        }
    }

    /// Ambient brightness at `p`, 0 outside the map
    pub fn light_at(&self, p: Tripoint) -> f32 {
        self.cache(p.z)
            .and_then(|c| c.index(p.x, p.y).map(|i| c.light[i]))
            .unwrap_or(0.0)
    }

    /// Natural light layer alone
    pub fn ambient_light_at(&self, p: Tripoint) -> f32 {
        self.cache(p.z)
            .and_then(|c| c.index(p.x, p.y).map(|i| c.ambient[i]))
            .unwrap_or(0.0)
    }

    pub fn lit_level_at(&self, p: Tripoint) -> LitLevel {
        let Some((cache, i)) = self.cache(p.z).and_then(|c| Some((c, c.index(p.x, p.y)?))) else {
            return LitLevel::Dark;
        };
        if cache.source[i] >= LIGHT_SOURCE_BRIGHT {
            LitLevel::Bright
        } else if cache.light[i] >= LIGHT_AMBIENT_LIT {
            LitLevel::Lit
        } else if cache.light[i] >= LIGHT_AMBIENT_LOW {
            LitLevel::Low
        } else {
            LitLevel::Dark
        }
    }

    /// Light level as perceived from the last seen-cache origin
    pub fn apparent_light_at(&self, p: Tripoint, vision_threshold: f32) -> LitLevel {
        let Some((cache, i)) = self.cache(p.z).and_then(|c| Some((c, c.index(p.x, p.y)?))) else {
            return LitLevel::Dark;
        };
        let source = cache.source[i];
        if cache.seen[i] <= LIGHT_TRANSPARENCY_SOLID {
            return if source > 0.0 { LitLevel::BrightOnly } else { LitLevel::Dark };
        }
        let apparent = cache.light[i] * cache.seen[i];
        if apparent > LIGHT_SOURCE_BRIGHT || source > 0.0 {
            LitLevel::Bright
        } else if apparent > LIGHT_AMBIENT_LIT {
            LitLevel::Lit
        } else if apparent >= vision_threshold {
            LitLevel::Low
        } else {
            LitLevel::Dark
        }
    }

    /// Outdoors under strong natural light
    pub fn is_in_sunlight(&self, p: Tripoint) -> bool {
        self.is_outside(p) && self.ambient_light_at(p) >= LIGHT_AMBIENT_LIT
    }
}

fn light_params(p: Tripoint, luminance: f32, mode: DistanceMode, mask: Option<ArcMask>) -> CastParams {
    CastParams {
        origin: (p.x, p.y),
        numerator: luminance,
        offset_distance: 0,
        radius: MAX_VIEW_DISTANCE,
        mode,
        initial_transparency: LIGHT_TRANSPARENCY_OPEN_AIR,
        mask,
    }
}
