//! Creature table with spawn order and a position index

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::record::{Creature, CreatureId};
use crate::map::Tripoint;

/// Owns every creature. Iteration follows spawn order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatureTracker {
    creatures: HashMap<CreatureId, Creature>,
    order: Vec<CreatureId>,
    #[serde(skip)]
    positions: HashMap<Tripoint, CreatureId>,
    next_id: u32,
}

impl CreatureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a creature; None if its tile is taken
    pub fn spawn(&mut self, mut creature: Creature) -> Option<CreatureId> {
        if self.positions.contains_key(&creature.pos) {
            return None;
        }
        self.next_id += 1;
        let id = CreatureId(self.next_id);
        creature.id = id;
        self.positions.insert(creature.pos, id);
        self.order.push(id);
        self.creatures.insert(id, creature);
        Some(id)
    }

    pub fn get(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.get(&id)
    }

    pub fn get_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.creatures.get_mut(&id)
    }

    /// Live creature with this id
    pub fn live(&self, id: CreatureId) -> Option<&Creature> {
        self.get(id).filter(|c| c.is_alive())
    }

    /// Id of the creature standing on `p`
    pub fn id_at(&self, p: Tripoint) -> Option<CreatureId> {
        self.positions.get(&p).copied()
    }

    pub fn creature_at(&self, p: Tripoint) -> Option<&Creature> {
        self.id_at(p).and_then(|id| self.get(id))
    }

    /// Move a creature; false if the destination is occupied by someone else
    pub fn relocate(&mut self, id: CreatureId, to: Tripoint) -> bool {
        if let Some(&other) = self.positions.get(&to) {
            return other == id;
        }
        let Some(c) = self.creatures.get_mut(&id) else {
            return false;
        };
        if self.positions.get(&c.pos) == Some(&id) {
            self.positions.remove(&c.pos);
        }
        c.pos = to;
        self.positions.insert(to, id);
        true
    }

    /// Exchange the tiles of two creatures
    pub fn swap_positions(&mut self, a: CreatureId, b: CreatureId) -> bool {
        if a == b {
            return false;
        }
        let (Some(pa), Some(pb)) = (self.get(a).map(|c| c.pos), self.get(b).map(|c| c.pos)) else {
            return false;
        };
        if let Some(c) = self.creatures.get_mut(&a) {
            c.pos = pb;
        }
        if let Some(c) = self.creatures.get_mut(&b) {
            c.pos = pa;
        }
        self.positions.insert(pb, a);
        self.positions.insert(pa, b);
        true
    }

    /// Mark dead and free its tile
    pub fn kill(&mut self, id: CreatureId) {
        if let Some(c) = self.creatures.get_mut(&id) {
            c.dead = true;
            if self.positions.get(&c.pos) == Some(&id) {
                self.positions.remove(&c.pos);
            }
        }
    }

    /// Drop dead creatures from the table
    pub fn remove_dead(&mut self) -> Vec<CreatureId> {
        let dead: Vec<_> = self
            .order
            .iter()
            .copied()
            .filter(|id| self.creatures.get(id).is_none_or(|c| c.dead))
            .collect();
        for id in &dead {
            self.creatures.remove(id);
        }
        self.order.retain(|id| !dead.contains(id));
        dead
    }

    /// Ids in spawn order
    pub fn ids(&self) -> Vec<CreatureId> {
        self.order.clone()
    }

    /// Creatures in spawn order
    pub fn iter(&self) -> impl Iterator<Item = &Creature> {
        self.order.iter().filter_map(|id| self.creatures.get(id))
    }

    pub fn avatar(&self) -> Option<&Creature> {
        self.iter().find(|c| c.is_avatar() && !c.dead)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rebuild the position index after deserializing
    pub fn reindex(&mut self) {
        self.positions.clear();
        for id in &self.order {
            if let Some(c) = self.creatures.get(id) {
                if !c.dead {
                    self.positions.insert(c.pos, *id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_index() {
        let mut tracker = CreatureTracker::new();
        let a = tracker.spawn(Creature::new("a", Tripoint::new(1, 1, 0))).unwrap();
        assert!(tracker.spawn(Creature::new("b", Tripoint::new(1, 1, 0))).is_none());
        let b = tracker.spawn(Creature::new("b", Tripoint::new(2, 1, 0))).unwrap();
        assert_eq!(tracker.ids(), vec![a, b]);
        assert_eq!(tracker.id_at(Tripoint::new(2, 1, 0)), Some(b));
        assert_eq!(tracker.get(a).unwrap().id, a);
    }

    #[test]
    fn test_relocate_and_swap() {
        let mut tracker = CreatureTracker::new();
        let a = tracker.spawn(Creature::new("a", Tripoint::new(1, 1, 0))).unwrap();
        let b = tracker.spawn(Creature::new("b", Tripoint::new(2, 1, 0))).unwrap();
        assert!(!tracker.relocate(a, Tripoint::new(2, 1, 0)));
        assert!(tracker.relocate(a, Tripoint::new(1, 2, 0)));
        assert_eq!(tracker.id_at(Tripoint::new(1, 1, 0)), None);
        assert!(tracker.swap_positions(a, b));
        assert_eq!(tracker.id_at(Tripoint::new(1, 2, 0)), Some(b));
        assert_eq!(tracker.get(a).unwrap().pos, Tripoint::new(2, 1, 0));
    }

    #[test]
    fn test_kill_frees_tile() {
        let mut tracker = CreatureTracker::new();
        let a = tracker.spawn(Creature::new("a", Tripoint::new(1, 1, 0))).unwrap();
        tracker.kill(a);
        assert!(tracker.live(a).is_none());
        assert_eq!(tracker.id_at(Tripoint::new(1, 1, 0)), None);
        assert_eq!(tracker.remove_dead(), vec![a]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_reindex_after_round_trip() {
        let mut tracker = CreatureTracker::new();
        let a = tracker.spawn(Creature::new("a", Tripoint::new(3, 1, 0))).unwrap();
        let json = serde_json::to_string(&tracker).unwrap();
        let mut back: CreatureTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id_at(Tripoint::new(3, 1, 0)), None);
        back.reindex();
        assert_eq!(back.id_at(Tripoint::new(3, 1, 0)), Some(a));
    }
}
