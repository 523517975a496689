//! Fixed-size tile chunks backing the grid

use serde::{Deserialize, Serialize};

use super::field::{Field, FieldType, TrapType};
use super::tile::{Furniture, Terrain};
use crate::consts::{SEEX, SEEY};

/// Number of tiles in one submap
pub const SUBMAP_TILES: usize = (SEEX * SEEY) as usize;

/// One SEEX x SEEY chunk of a single level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submap {
    ter: Vec<Terrain>,
    furn: Vec<Furniture>,
    fields: Vec<Vec<Field>>,
    traps: Vec<Option<TrapType>>,
    /// Luminance of light-emitting items lying on the tile
    lum: Vec<f32>,
}

impl Submap {
    pub fn new(fill: Terrain) -> Self {
        Self {
            ter: vec![fill; SUBMAP_TILES],
            furn: vec![Furniture::None; SUBMAP_TILES],
            fields: vec![Vec::new(); SUBMAP_TILES],
            traps: vec![None; SUBMAP_TILES],
            lum: vec![0.0; SUBMAP_TILES],
        }
    }

    /// Local index; callers guarantee 0 <= lx < SEEX and 0 <= ly < SEEY
    pub const fn index(lx: i32, ly: i32) -> usize {
        (lx * SEEY + ly) as usize
    }

    pub fn ter(&self, i: usize) -> Terrain {
        self.ter[i]
    }

    pub fn set_ter(&mut self, i: usize, ter: Terrain) {
        self.ter[i] = ter;
    }

    pub fn furn(&self, i: usize) -> Furniture {
        self.furn[i]
    }

    pub fn set_furn(&mut self, i: usize, furn: Furniture) {
        self.furn[i] = furn;
    }

    pub fn fields(&self, i: usize) -> &[Field] {
        &self.fields[i]
    }

    /// Add a field, keeping the stronger intensity when one already exists.
    /// Returns true if the tile changed.
    pub fn add_field(&mut self, i: usize, field: Field) -> bool {
        let stack = &mut self.fields[i];
        match stack.iter_mut().find(|f| f.kind == field.kind) {
            Some(existing) if existing.intensity >= field.intensity => false,
            Some(existing) => {
                existing.intensity = field.intensity;
                true
            }
            None => {
                stack.push(field);
                true
            }
        }
    }

    pub fn remove_field(&mut self, i: usize, kind: FieldType) -> bool {
        let stack = &mut self.fields[i];
        let before = stack.len();
        stack.retain(|f| f.kind != kind);
        stack.len() != before
    }

    pub fn trap(&self, i: usize) -> Option<TrapType> {
        self.traps[i]
    }

    pub fn set_trap(&mut self, i: usize, trap: Option<TrapType>) {
        self.traps[i] = trap;
    }

    pub fn lum(&self, i: usize) -> f32 {
        self.lum[i]
    }

    pub fn set_lum(&mut self, i: usize, lum: f32) {
        self.lum[i] = lum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_field_keeps_strongest() {
        let mut sm = Submap::new(Terrain::Floor);
        let i = Submap::index(3, 4);
        assert!(sm.add_field(i, Field::new(FieldType::Smoke, 2)));
        assert!(!sm.add_field(i, Field::new(FieldType::Smoke, 1)));
        assert!(sm.add_field(i, Field::new(FieldType::Smoke, 3)));
        assert_eq!(sm.fields(i).len(), 1);
        assert_eq!(sm.fields(i)[0].intensity, 3);
        assert!(sm.remove_field(i, FieldType::Smoke));
        assert!(sm.fields(i).is_empty());
    }
}
