//! Creature capability flags, trigger sets and size classes

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

bitflags! {
    /// Traversal and behaviour traits of a creature type
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct MoverFlags: u64 {
        const FLIES = 1 << 0;
        const SWIMS = 1 << 1;
        const DIGS = 1 << 2;
        const CLIMBS = 1 << 3;
        const CAN_OPEN_DOORS = 1 << 4;
        /// Must stay in water
        const AQUATIC = 1 << 5;
        /// Dies in sunlight, so avoids it
        const SUNDEATH = 1 << 6;
        /// Wanders off course
        const STUMBLES = 1 << 7;
        /// Follows scent trails
        const SMELLS = 1 << 8;
        /// Picks up faint scent
        const KEENNOSE = 1 << 9;
        /// Attacks monsters in its way even when not hostile to them
        const ATTACKMON = 1 << 10;
        /// Shoves other creatures out of its way
        const PUSH_MON = 1 << 11;
        /// Nearby allies help with bashing
        const GROUP_BASH = 1 << 12;
        /// Smashes walls with ease
        const DESTROYS = 1 << 13;
        /// Bores through anything
        const BORES = 1 << 14;
        /// Chooses targets by threat, not only distance
        const PRIORITIZE_TARGETS = 1 << 15;
        /// Retreats after landing a hit
        const HIT_AND_RUN = 1 << 16;
        /// Animal behaviour: cautious about hazards
        const ANIMAL = 1 << 17;
        /// Drips acid as it moves
        const ACIDTRAIL = 1 << 18;
        /// Leaves sludge as it moves
        const SLUDGETRAIL = 1 << 19;
        /// Vents toxic gas as it moves
        const GASTRAIL = 1 << 20;
        /// Does not need to breathe
        const NO_BREATHE = 1 << 21;
        /// Gathers with its own kind
        const SWARMS = 1 << 22;
        /// Shares morale with nearby allies
        const GROUP_MORALE = 1 << 23;
        /// Does not move on its own
        const IMMOBILE = 1 << 24;
        /// Has eyes
        const SEES = 1 << 25;
        /// Has ears
        const HEARS = 1 << 26;
        /// Pet that will not follow its owner
        const PET_WONT_FOLLOW = 1 << 27;
        /// Does not trigger traps
        const NO_TRAPS = 1 << 28;
        /// Stays out of water
        const WATER_FEAR = 1 << 29;
    }
}

// Manual serde impl for MoverFlags
impl Serialize for MoverFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MoverFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u64::deserialize(deserializer)?;
        Ok(MoverFlags::from_bits_truncate(bits))
    }
}

bitflags! {
    /// Situations that change a creature's anger, fear or calm
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Triggers: u8 {
        /// A hostile in view is badly hurt
        const HOSTILE_WEAK = 1 << 0;
        /// A hostile is within a few tiles
        const HOSTILE_CLOSE = 1 << 1;
        /// A hostile is in view at all
        const HOSTILE_SEEN = 1 << 2;
        /// Breeding season
        const MATING_SEASON = 1 << 3;
        /// A hostile is near one of our young
        const PLAYER_NEAR_BABY = 1 << 4;
    }
}

impl Serialize for Triggers {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Triggers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Triggers::from_bits_truncate(bits))
    }
}

/// Body size class
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
    Display, EnumIter,
)]
#[repr(u8)]
pub enum CreatureSize {
    Tiny = 0,
    Small = 1,
    #[default]
    Medium = 2,
    Large = 3,
    Huge = 4,
}

impl CreatureSize {
    /// Bonus to stability when something tries to shove us
    pub const fn stability_bonus(&self) -> i32 {
        match self {
            CreatureSize::Tiny => -7,
            CreatureSize::Small => -3,
            CreatureSize::Medium => 0,
            CreatureSize::Large => 5,
            CreatureSize::Huge => 10,
        }
    }
}

/// Which kind of actor a creature is
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum CreatureKind {
    #[default]
    Monster = 0,
    /// The player's body; moved by input, never by the engine
    Avatar = 1,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_serde_as_bits() {
        let flags = MoverFlags::FLIES | MoverFlags::PUSH_MON;
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, (1u64 | (1 << 11)).to_string());
        let back: MoverFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flags);
    }

    #[test]
    fn test_size_stability() {
        assert!(CreatureSize::Huge.stability_bonus() > CreatureSize::Large.stability_bonus());
        assert_eq!(CreatureSize::Medium.stability_bonus(), 0);
        assert!(CreatureSize::Tiny < CreatureSize::Huge);
    }
}
