//! Scent trail left behind by the avatar

use std::collections::VecDeque;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::consts::SCENT_MAX;
use crate::map::{Map, Tripoint};

/// Scent strength per tile; missing tiles have none
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScentMap {
    values: HashMap<Tripoint, i32>,
}

impl ScentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, p: Tripoint) -> i32 {
        self.values.get(&p).copied().unwrap_or(0)
    }

    pub fn set(&mut self, p: Tripoint, value: i32) {
        let value = value.clamp(0, SCENT_MAX);
        if value == 0 {
            self.values.remove(&p);
        } else {
            self.values.insert(p, value);
        }
    }

    /// Spread scent from `center` over passable tiles, losing `falloff` per step.
    ///
    /// Stronger existing scent is kept.
    pub fn lay(&mut self, map: &Map, center: Tripoint, strength: i32, falloff: i32) {
        let falloff = falloff.max(1);
        let mut seen: HashMap<Tripoint, i32> = HashMap::new();
        let mut queue = VecDeque::from([(center, strength)]);
        seen.insert(center, strength);
        while let Some((p, value)) = queue.pop_front() {
            if value > self.get(p) {
                self.set(p, value);
            }
            let next = value - falloff;
            if next <= 0 {
                continue;
            }
            for n in p.neighbors() {
                if !map.passable(n) || seen.contains_key(&n) {
                    continue;
                }
                seen.insert(n, next);
                queue.push_back((n, next));
            }
        }
    }

    /// Weaken every tile by `amount`, forgetting those that fade out
    pub fn decay(&mut self, amount: i32) {
        self.values.retain(|_, v| {
            *v -= amount;
            *v > 0
        });
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lay_falls_off_with_distance() {
        let map = Map::from_ascii(&[
            "#######", //
            "#.....#", //
            "#.....#", //
            "#######",
        ]);
        let mut scent = ScentMap::new();
        scent.lay(&map, Tripoint::new(1, 1, 0), 100, 25);
        assert_eq!(scent.get(Tripoint::new(1, 1, 0)), 100);
        assert_eq!(scent.get(Tripoint::new(2, 2, 0)), 75);
        assert_eq!(scent.get(Tripoint::new(4, 1, 0)), 25);
        assert_eq!(scent.get(Tripoint::new(5, 1, 0)), 0);
        assert_eq!(scent.get(Tripoint::new(0, 1, 0)), 0);
    }

    #[test]
    fn test_lay_keeps_stronger_scent() {
        let map = Map::from_ascii(&["....."]);
        let mut scent = ScentMap::new();
        scent.set(Tripoint::new(2, 0, 0), 900);
        scent.lay(&map, Tripoint::new(0, 0, 0), 100, 10);
        assert_eq!(scent.get(Tripoint::new(2, 0, 0)), 900);
    }

    #[test]
    fn test_decay_forgets_faded_tiles() {
        let mut scent = ScentMap::new();
        scent.set(Tripoint::new(1, 1, 0), 3);
        scent.set(Tripoint::new(2, 1, 0), 1);
        scent.decay(1);
        assert_eq!(scent.get(Tripoint::new(1, 1, 0)), 2);
        assert_eq!(scent.len(), 1);
        scent.set(Tripoint::new(1, 1, 0), -5);
        assert!(scent.is_empty());
    }
}
