//! Faction relations

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Faction identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct FactionId(pub u32);

impl FactionId {
    /// The player and anything sworn to them
    pub const PLAYER: FactionId = FactionId(0);
    /// Ordinary wildlife
    pub const ANIMAL: FactionId = FactionId(1);
    /// Anything that attacks on sight
    pub const ZOMBIE: FactionId = FactionId(2);
}

/// How one faction regards another
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum FactionAttitude {
    Neutral = 0,
    Friendly = 1,
    /// Hostile when the creature is in a hostile mood
    #[default]
    Hostile = 2,
    /// Hostile regardless of mood
    Hate = 3,
}

/// Source of faction-to-faction attitudes
pub trait FactionRelations {
    fn attitude(&self, from: FactionId, to: FactionId) -> FactionAttitude;
}

/// Table of explicit relations; members of one faction are friendly to each other
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactionTable {
    relations: HashMap<FactionId, HashMap<FactionId, FactionAttitude>>,
    #[serde(default)]
    default_attitude: FactionAttitude,
}

impl FactionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how `from` regards `to`
    pub fn set(&mut self, from: FactionId, to: FactionId, attitude: FactionAttitude) {
        self.relations.entry(from).or_default().insert(to, attitude);
    }

    /// Set both directions at once
    pub fn set_mutual(&mut self, a: FactionId, b: FactionId, attitude: FactionAttitude) {
        self.set(a, b, attitude);
        self.set(b, a, attitude);
    }

    pub fn set_default(&mut self, attitude: FactionAttitude) {
        self.default_attitude = attitude;
    }
}

impl FactionRelations for FactionTable {
    fn attitude(&self, from: FactionId, to: FactionId) -> FactionAttitude {
        if from == to {
            return FactionAttitude::Friendly;
        }
        self.relations
            .get(&from)
            .and_then(|m| m.get(&to))
            .copied()
            .unwrap_or(self.default_attitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_faction_is_friendly() {
        let table = FactionTable::new();
        assert_eq!(
            table.attitude(FactionId::ANIMAL, FactionId::ANIMAL),
            FactionAttitude::Friendly
        );
        assert_eq!(
            table.attitude(FactionId::ANIMAL, FactionId::PLAYER),
            FactionAttitude::Hostile
        );
    }

    #[test]
    fn test_explicit_relations() {
        let mut table = FactionTable::new();
        table.set(FactionId::ZOMBIE, FactionId::PLAYER, FactionAttitude::Hate);
        table.set_mutual(FactionId::ANIMAL, FactionId(7), FactionAttitude::Neutral);
        assert_eq!(table.attitude(FactionId::ZOMBIE, FactionId::PLAYER), FactionAttitude::Hate);
        assert_eq!(table.attitude(FactionId::PLAYER, FactionId::ZOMBIE), FactionAttitude::Hostile);
        assert_eq!(table.attitude(FactionId(7), FactionId::ANIMAL), FactionAttitude::Neutral);
        table.set_default(FactionAttitude::Neutral);
        assert_eq!(table.attitude(FactionId(9), FactionId(8)), FactionAttitude::Neutral);
    }
}
