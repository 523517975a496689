//! Observable events produced while the simulation runs

use serde::{Deserialize, Serialize};

use crate::creature::CreatureId;
use crate::map::{TrapType, Tripoint};

/// Something a watcher could have noticed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    Moved {
        id: CreatureId,
        from: Tripoint,
        to: Tripoint,
    },
    /// Took a stair, possibly landing on a nearby one
    ChangedLevel {
        id: CreatureId,
        from: Tripoint,
        to: Tripoint,
    },
    Attacked {
        attacker: CreatureId,
        target: CreatureId,
        hit: bool,
        damage: i32,
    },
    Died {
        id: CreatureId,
        killer: Option<CreatureId>,
    },
    Bashed {
        id: CreatureId,
        pos: Tripoint,
        smashed: bool,
    },
    /// Finished tunnelling through a tile
    Dug {
        id: CreatureId,
        pos: Tripoint,
    },
    DoorOpened {
        id: CreatureId,
        pos: Tripoint,
    },
    Pushed {
        pusher: CreatureId,
        pushed: CreatureId,
        to: Tripoint,
    },
    Trampled {
        pusher: CreatureId,
        trampled: CreatureId,
    },
    /// Dove or sank into deep water
    EnteredWater {
        id: CreatureId,
        pos: Tripoint,
    },
    /// Leapt or emerged from deep water
    LeftWater {
        id: CreatureId,
        pos: Tripoint,
    },
    Drowned {
        id: CreatureId,
    },
    TrapTriggered {
        id: CreatureId,
        pos: Tripoint,
        trap: TrapType,
    },
    KnockedBack {
        id: CreatureId,
        to: Tripoint,
    },
    /// Hit a wall or another creature while knocked back
    Bounced {
        id: CreatureId,
        off: Option<CreatureId>,
    },
    AbilityUsed {
        id: CreatureId,
        name: String,
    },
    Grabbed {
        grabber: CreatureId,
        victim: CreatureId,
    },
    /// Hauled a grabbed victim along
    Dragged {
        id: CreatureId,
        victim: CreatureId,
        to: Tripoint,
    },
    Leapt {
        id: CreatureId,
        from: Tripoint,
        to: Tripoint,
    },
    /// A targeting system locked on
    TargetAcquired {
        id: CreatureId,
        target: CreatureId,
    },
    Fired {
        id: CreatureId,
        target: Tripoint,
        shots: i32,
    },
    /// The trigger clicked on an empty weapon
    OutOfAmmo {
        id: CreatureId,
    },
    Sound {
        pos: Tripoint,
        volume: i32,
    },
    Stumbled {
        id: CreatureId,
        to: Tripoint,
    },
}

/// An event stamped with the turn it happened on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub turn: u64,
    pub event: WorldEvent,
}

/// Append-only record of events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: u64, event: WorldEvent) {
        self.entries.push(LoggedEvent { turn, event });
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldEvent> {
        self.entries.iter().map(|e| &e.event)
    }

    pub fn entries(&self) -> &[LoggedEvent] {
        &self.entries
    }

    /// Events from one turn
    pub fn for_turn(&self, turn: u64) -> impl Iterator<Item = &WorldEvent> {
        self.entries
            .iter()
            .filter(move |e| e.turn == turn)
            .map(|e| &e.event)
    }

    /// Remove and return everything logged so far
    pub fn take(&mut self) -> Vec<LoggedEvent> {
        core::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_by_turn() {
        let mut log = EventLog::new();
        log.push(1, WorldEvent::Drowned { id: CreatureId(3) });
        log.push(2, WorldEvent::OutOfAmmo { id: CreatureId(4) });
        assert_eq!(log.len(), 2);
        assert_eq!(log.for_turn(2).count(), 1);
        let taken = log.take();
        assert_eq!(taken[0].turn, 1);
        assert!(log.is_empty());
    }
}
