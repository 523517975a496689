//! Timed status effects

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Status effect type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Effect {
    Stunned = 0,
    Downed = 1,
    /// Held by another creature
    Grabbed = 2,
    /// Holding another creature
    Grabbing = 3,
    Dragging = 4,
    Pacified = 5,
    /// Will not attack or flee; follows quietly
    Docile = 6,
    /// Fleeing regardless of morale
    Run = 7,
    /// Scrambling over unstable ground
    Bouldering = 8,
    Drenched = 9,
    /// Being aimed at
    Targeted = 10,
    OnFire = 11,
    Beartrapped = 12,
    /// Already shoved this turn
    Pushed = 13,
    /// Marked by a targeting laser
    LaserLocked = 14,
    Poisoned = 15,
    Bleeding = 16,
    Infected = 17,
    /// Caught in a snare
    Snared = 18,
    /// A targeting routine is spinning up
    Targeting = 19,
}

impl Effect {
    /// Effects that keep a creature from moving on its own
    pub const fn immobilizes(&self) -> bool {
        matches!(self, Effect::Downed | Effect::Beartrapped | Effect::Snared)
    }
}

/// Duration for effects that never expire on their own
pub const PERMANENT: i32 = -1;

/// Active effects and their remaining turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSet {
    active: HashMap<Effect, i32>,
}

impl EffectSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an effect; an existing one keeps the longer duration
    pub fn add(&mut self, effect: Effect, turns: i32) {
        let entry = self.active.entry(effect).or_insert(0);
        if turns == PERMANENT || *entry == PERMANENT {
            *entry = PERMANENT;
        } else {
            *entry = (*entry).max(turns);
        }
    }

    pub fn has(&self, effect: Effect) -> bool {
        self.active.contains_key(&effect)
    }

    pub fn remove(&mut self, effect: Effect) -> bool {
        self.active.remove(&effect).is_some()
    }

    /// Remaining turns, None if absent
    pub fn remaining(&self, effect: Effect) -> Option<i32> {
        self.active.get(&effect).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Effect, i32)> + '_ {
        self.active.iter().map(|(&e, &t)| (e, t))
    }

    /// Count every timed effect down one turn; returns those that ended
    pub fn tick(&mut self) -> Vec<Effect> {
        let mut expired = Vec::new();
        for (effect, turns) in self.active.iter_mut() {
            if *turns == PERMANENT {
                continue;
            }
            *turns -= 1;
            if *turns <= 0 {
                expired.push(*effect);
            }
        }
        for effect in &expired {
            self.active.remove(effect);
        }
        expired.sort();
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_keeps_longer() {
        let mut effects = EffectSet::new();
        effects.add(Effect::Stunned, 3);
        effects.add(Effect::Stunned, 1);
        assert_eq!(effects.remaining(Effect::Stunned), Some(3));
        effects.add(Effect::Stunned, PERMANENT);
        effects.add(Effect::Stunned, 5);
        assert_eq!(effects.remaining(Effect::Stunned), Some(PERMANENT));
    }

    #[test]
    fn test_tick_expires() {
        let mut effects = EffectSet::new();
        effects.add(Effect::Downed, 1);
        effects.add(Effect::Drenched, 2);
        effects.add(Effect::Grabbed, PERMANENT);
        assert_eq!(effects.tick(), vec![Effect::Downed]);
        assert!(effects.has(Effect::Drenched));
        assert_eq!(effects.tick(), vec![Effect::Drenched]);
        assert!(effects.has(Effect::Grabbed));
        assert!(effects.remove(Effect::Grabbed));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut effects = EffectSet::new();
        effects.add(Effect::OnFire, 4);
        let json = serde_json::to_string(&effects).unwrap();
        let back: EffectSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, effects);
    }
}
