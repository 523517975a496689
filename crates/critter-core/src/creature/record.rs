//! Creature records

use std::collections::VecDeque;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::effects::{Effect, EffectSet};
use super::faction::FactionId;
use super::flags::{CreatureKind, CreatureSize, MoverFlags, Triggers};
use crate::consts::{ANGER_MAX, ANGER_MIN, FEAR_MAX, MORALE_MAX, MORALE_MIN, NORMAL_SPEED};
use crate::map::Tripoint;
use crate::pathfind::{HazardTier, PathSettings};

/// Unique identifier for creature instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(pub u32);

impl CreatureId {
    pub const NONE: CreatureId = CreatureId(0);

    pub fn next(self) -> Self {
        CreatureId(self.0 + 1)
    }
}

impl core::fmt::Display for CreatureId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mood toward the player, derived from anger and morale
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum MonsterAttitude {
    /// Allied or docile
    Friend = 0,
    Flee = 1,
    #[default]
    Ignore = 2,
    /// Curious; keeps close without attacking
    Follow = 3,
    Attack = 4,
}

/// How one creature regards another right now
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Attitude {
    Hostile = 0,
    #[default]
    Neutral = 1,
    Friendly = 2,
}

/// A special ability slot: name, remaining cooldown and whether it is usable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialSlot {
    pub name: String,
    /// Turns until the ability may be tried again
    pub cooldown: i32,
    pub enabled: bool,
}

impl SpecialSlot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cooldown: 0,
            enabled: true,
        }
    }
}

/// Multi-turn action carried between turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingAction {
    /// Hauling a grabbed victim along behind
    Dragging { victim: CreatureId },
    /// Tunnelling into an adjacent tile
    Mining { target: Tripoint, turns_left: i32 },
}

/// Melee capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeleeStats {
    pub dice: i32,
    pub sides: i32,
    /// Accuracy in dice of 10
    pub skill: i32,
    /// Dodge in dice of 10
    pub dodge: i32,
    /// Flat damage reduction
    pub armor: i32,
}

impl Default for MeleeStats {
    fn default() -> Self {
        Self {
            dice: 1,
            sides: 4,
            skill: 3,
            dodge: 2,
            armor: 0,
        }
    }
}

/// A live creature in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creature {
    pub id: CreatureId,
    pub name: String,
    pub kind: CreatureKind,
    /// Creatures of one species recognise each other's young
    pub species: String,
    pub baby: bool,

    pub pos: Tripoint,
    pub hp: i32,
    pub hp_max: i32,
    pub speed: i32,
    /// Movement points left this turn
    pub moves: i32,
    pub size: CreatureSize,
    pub flags: MoverFlags,
    pub hazards: HazardTier,
    pub melee: MeleeStats,
    /// Raw smashing strength before trait multipliers
    pub bash_skill: i32,
    pub vision_day: i32,
    pub vision_night: i32,
    /// Own light output
    pub luminance: f32,

    pub faction: FactionId,
    /// Friendly to the player: 0 not, -1 permanently, otherwise turns left
    pub friendly: i32,
    pub anger: i32,
    pub morale: i32,
    pub fear: i32,
    pub anger_triggers: Triggers,
    pub fear_triggers: Triggers,
    pub placate_triggers: Triggers,

    /// Upcoming steps, next first; never contains `pos`
    pub path: VecDeque<Tripoint>,
    /// Where the creature is heading
    pub goal: Option<Tripoint>,
    /// Looked up again every use
    pub target: Option<CreatureId>,
    /// Last heard noise
    pub wander_pos: Option<Tripoint>,
    /// Turns left to keep wandering toward `wander_pos`
    pub wandf: i32,
    pub patrol: Vec<Tripoint>,
    pub patrol_index: usize,
    /// Led on a leash by this creature
    pub led_by: Option<CreatureId>,

    pub effects: EffectSet,
    pub specials: Vec<SpecialSlot>,
    pub pending: Option<PendingAction>,
    pub ammo: HashMap<String, i32>,

    /// Currently submerged
    pub underwater: bool,
    /// Moved at least once this turn
    pub moved: bool,
    pub dead: bool,
}

impl Creature {
    /// Create a medium monster with plain walking capabilities
    pub fn new(name: impl Into<String>, pos: Tripoint) -> Self {
        Self {
            id: CreatureId::NONE,
            name: name.into(),
            kind: CreatureKind::Monster,
            species: String::new(),
            baby: false,
            pos,
            hp: 10,
            hp_max: 10,
            speed: NORMAL_SPEED,
            moves: 0,
            size: CreatureSize::Medium,
            flags: MoverFlags::SEES | MoverFlags::HEARS,
            hazards: HazardTier::None,
            melee: MeleeStats::default(),
            bash_skill: 0,
            vision_day: 40,
            vision_night: 1,
            luminance: 0.0,
            faction: FactionId::ZOMBIE,
            friendly: 0,
            anger: 0,
            morale: 0,
            fear: 0,
            anger_triggers: Triggers::empty(),
            fear_triggers: Triggers::empty(),
            placate_triggers: Triggers::empty(),
            path: VecDeque::new(),
            goal: None,
            target: None,
            wander_pos: None,
            wandf: 0,
            patrol: Vec::new(),
            patrol_index: 0,
            led_by: None,
            effects: EffectSet::new(),
            specials: Vec::new(),
            pending: None,
            ammo: HashMap::new(),
            underwater: false,
            moved: false,
            dead: false,
        }
    }

    /// The player's body
    pub fn avatar(pos: Tripoint) -> Self {
        Self {
            kind: CreatureKind::Avatar,
            faction: FactionId::PLAYER,
            hp: 100,
            hp_max: 100,
            ..Self::new("you", pos)
        }
    }

    pub fn with_flags(mut self, flags: MoverFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_special(mut self, name: impl Into<String>) -> Self {
        self.specials.push(SpecialSlot::new(name));
        self
    }

    pub fn has_flag(&self, flag: MoverFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn has_effect(&self, effect: Effect) -> bool {
        self.effects.has(effect)
    }

    pub fn add_effect(&mut self, effect: Effect, turns: i32) {
        self.effects.add(effect, turns);
    }

    pub fn remove_effect(&mut self, effect: Effect) -> bool {
        self.effects.remove(effect)
    }

    pub fn is_avatar(&self) -> bool {
        self.kind == CreatureKind::Avatar
    }

    pub fn is_alive(&self) -> bool {
        !self.dead && self.hp > 0
    }

    pub fn flies(&self) -> bool {
        self.has_flag(MoverFlags::FLIES)
    }

    pub fn swims(&self) -> bool {
        self.has_flag(MoverFlags::SWIMS) || self.has_flag(MoverFlags::AQUATIC)
    }

    pub fn digs(&self) -> bool {
        self.has_flag(MoverFlags::DIGS)
    }

    pub fn climbs(&self) -> bool {
        self.has_flag(MoverFlags::CLIMBS)
    }

    /// Can stay under deep water without drowning
    pub fn can_submerge(&self) -> bool {
        self.swims() || self.has_flag(MoverFlags::NO_BREATHE)
    }

    pub fn can_open_doors(&self) -> bool {
        self.has_flag(MoverFlags::CAN_OPEN_DOORS)
    }

    pub fn is_friendly_to_player(&self) -> bool {
        self.friendly != 0 || self.faction == FactionId::PLAYER
    }

    pub fn hp_percent(&self) -> i32 {
        if self.hp_max <= 0 {
            return 0;
        }
        self.hp * 100 / self.hp_max
    }

    /// Rough threat estimate used to compare targets
    pub fn power_rating(&self) -> f32 {
        let damage = self.melee.dice * (self.melee.sides + 1) / 2;
        let mut power = 1.0 + damage as f32 / 4.0 + self.melee.skill as f32 / 2.0;
        if self.size >= CreatureSize::Large {
            power += 1.0;
        }
        if self.hp_percent() < 50 {
            power *= 0.5;
        }
        power.max(0.1)
    }

    /// Strength applied when smashing obstacles
    pub fn bash_strength(&self) -> i32 {
        let mut skill = self.bash_skill as f32;
        if self.has_flag(MoverFlags::BORES) {
            skill *= 15.0;
        } else if self.has_flag(MoverFlags::DESTROYS) {
            skill *= 2.5;
        }
        skill as i32
    }

    pub fn change_anger(&mut self, delta: i32) {
        self.anger = (self.anger + delta).clamp(ANGER_MIN, ANGER_MAX);
    }

    pub fn change_morale(&mut self, delta: i32) {
        self.morale = (self.morale + delta).clamp(MORALE_MIN, MORALE_MAX);
    }

    pub fn change_fear(&mut self, delta: i32) {
        self.fear = (self.fear + delta).clamp(0, FEAR_MAX);
    }

    /// Mood toward the player
    pub fn monster_attitude(&self) -> MonsterAttitude {
        if self.friendly != 0 || self.has_effect(Effect::Docile) {
            return MonsterAttitude::Friend;
        }
        if self.has_effect(Effect::Run) {
            return MonsterAttitude::Flee;
        }
        if self.has_effect(Effect::Pacified) {
            return MonsterAttitude::Ignore;
        }
        let morale = self.morale - self.fear;
        if morale < 0 {
            if morale + self.anger > 0 && self.hp > self.hp_max / 3 {
                return MonsterAttitude::Follow;
            }
            return MonsterAttitude::Flee;
        }
        if self.anger <= 0 {
            if self.hp * 10 <= self.hp_max * 6 {
                return MonsterAttitude::Flee;
            }
            return MonsterAttitude::Ignore;
        }
        if self.anger < 10 {
            return MonsterAttitude::Follow;
        }
        MonsterAttitude::Attack
    }

    /// Path settings matching this creature's capabilities
    pub fn path_settings(&self, base: &PathSettings) -> PathSettings {
        PathSettings {
            bash_strength: self.bash_strength(),
            allow_open_doors: self.can_open_doors(),
            flies: self.flies(),
            swims: self.swims(),
            digs: self.digs(),
            climbs: self.climbs(),
            climb_cost: if self.climbs() { 2 } else { 0 },
            hazards: self.hazards,
            ..base.clone()
        }
    }

    /// Current sight range given the light at our tile
    pub fn sight_range(&self, light: f32) -> i32 {
        if !self.has_flag(MoverFlags::SEES) {
            return 1;
        }
        let day = self.vision_day.max(self.vision_night);
        let night = self.vision_night.min(self.vision_day);
        let frac = (light / crate::consts::DAYLIGHT_LEVEL).clamp(0.0, 1.0);
        let range = night as f32 + (day - night) as f32 * frac;
        (range.round() as i32).max(1)
    }

    /// Drop path steps we already stand on
    pub fn trim_path(&mut self) {
        while self.path.front() == Some(&self.pos) {
            self.path.pop_front();
        }
    }

    pub fn special_mut(&mut self, name: &str) -> Option<&mut SpecialSlot> {
        self.specials.iter_mut().find(|s| s.name == name)
    }

    /// Decrement every special's cooldown by one turn, never below zero
    pub fn tick_cooldowns(&mut self) {
        for slot in &mut self.specials {
            if slot.cooldown > 0 {
                slot.cooldown -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attitude_from_anger_and_morale() {
        let mut c = Creature::new("rat", Tripoint::ZERO);
        assert_eq!(c.monster_attitude(), MonsterAttitude::Ignore);
        c.anger = 5;
        assert_eq!(c.monster_attitude(), MonsterAttitude::Follow);
        c.anger = 30;
        assert_eq!(c.monster_attitude(), MonsterAttitude::Attack);
        c.morale = -50;
        assert_eq!(c.monster_attitude(), MonsterAttitude::Flee);
        c.morale = -10;
        assert_eq!(c.monster_attitude(), MonsterAttitude::Follow);
        c.friendly = -1;
        assert_eq!(c.monster_attitude(), MonsterAttitude::Friend);
    }

    #[test]
    fn test_wounded_calm_creature_flees() {
        let mut c = Creature::new("deer", Tripoint::ZERO);
        c.hp = 5;
        assert_eq!(c.monster_attitude(), MonsterAttitude::Flee);
    }

    #[test]
    fn test_scalars_are_clamped() {
        let mut c = Creature::new("rat", Tripoint::ZERO);
        c.change_anger(500);
        c.change_morale(-500);
        c.change_fear(-3);
        assert_eq!(c.anger, ANGER_MAX);
        assert_eq!(c.morale, MORALE_MIN);
        assert_eq!(c.fear, 0);
    }

    #[test]
    fn test_cooldowns_stop_at_zero() {
        let mut c = Creature::new("rat", Tripoint::ZERO).with_special("bite");
        c.specials[0].cooldown = 1;
        c.tick_cooldowns();
        c.tick_cooldowns();
        assert_eq!(c.specials[0].cooldown, 0);
    }

    #[test]
    fn test_trim_path_and_bash_strength() {
        let mut c = Creature::new("hulk", Tripoint::new(1, 1, 0)).with_flags(MoverFlags::DESTROYS);
        c.bash_skill = 10;
        assert_eq!(c.bash_strength(), 25);
        c.path.extend([Tripoint::new(1, 1, 0), Tripoint::new(2, 1, 0)]);
        c.trim_path();
        assert_eq!(c.path.front(), Some(&Tripoint::new(2, 1, 0)));
    }

    #[test]
    fn test_sight_range_scales_with_light() {
        let c = Creature::new("owl", Tripoint::ZERO);
        assert_eq!(c.sight_range(0.0), 1);
        assert_eq!(c.sight_range(100.0), 40);
        let blind = Creature {
            flags: MoverFlags::empty(),
            ..c
        };
        assert_eq!(blind.sight_range(100.0), 1);
    }
}
