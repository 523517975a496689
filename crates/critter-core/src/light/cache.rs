//! Per-level lighting and visibility caches

use crate::consts::LIGHT_TRANSPARENCY_SOLID;

/// The 2D caches kept for one z-level.
///
/// Every grid is flattened as `x * height + y`.
#[derive(Debug, Clone)]
pub struct LevelCache {
    width: i32,
    height: i32,
    /// Terrain, furniture or fields changed since the last transparency rebuild
    pub(crate) transparency_dirty: bool,
    /// Terrain changed since the last floor/outside rebuild
    pub(crate) floor_dirty: bool,
    pub(crate) transparency: Vec<f32>,
    /// Tile has a floor (blocks vertical sight and movement)
    pub(crate) floor: Vec<bool>,
    /// Tile has no roof above it
    pub(crate) outside: Vec<bool>,
    /// Combined ambient brightness
    pub(crate) light: Vec<f32>,
    /// Natural light layer before local sources
    pub(crate) ambient: Vec<f32>,
    /// Strongest local source sitting on each tile
    pub(crate) source: Vec<f32>,
    /// Buffered point sources, max per tile, before casting
    pub(crate) source_buffer: Vec<f32>,
    /// Visibility from the last seen-cache origin
    pub(crate) seen: Vec<f32>,
}

impl LevelCache {
    pub fn new(width: i32, height: i32) -> Self {
        let n = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            transparency_dirty: true,
            floor_dirty: true,
            transparency: vec![LIGHT_TRANSPARENCY_SOLID; n],
            floor: vec![true; n],
            outside: vec![false; n],
            light: vec![0.0; n],
            ambient: vec![0.0; n],
            source: vec![0.0; n],
            source_buffer: vec![0.0; n],
            seen: vec![LIGHT_TRANSPARENCY_SOLID; n],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Flattened index, or None outside the level
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((x * self.height + y) as usize)
        }
    }

    pub fn is_transparency_dirty(&self) -> bool {
        self.transparency_dirty
    }

    /// Transparency and floors to read, seen grid to write
    pub(crate) fn sight_layers(&mut self) -> (&[f32], &[bool], &mut [f32]) {
        (&self.transparency, &self.floor, &mut self.seen)
    }

    pub(crate) fn reset_light(&mut self) {
        self.light.fill(0.0);
        self.ambient.fill(0.0);
        self.source.fill(0.0);
        self.source_buffer.fill(0.0);
    }
}
