//! Creatures: records, capability flags, effects, factions and the tracker

pub mod effects;
pub mod faction;
pub mod flags;
pub mod record;
pub mod tracker;

pub use effects::{Effect, EffectSet, PERMANENT};
pub use faction::{FactionAttitude, FactionId, FactionRelations, FactionTable};
pub use flags::{CreatureKind, CreatureSize, MoverFlags, Triggers};
pub use record::{
    Attitude, Creature, CreatureId, MeleeStats, MonsterAttitude, PendingAction, SpecialSlot,
};
pub use tracker::CreatureTracker;
