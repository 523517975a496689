//! Combat interface
//!
//! Attacks hand their rolls to a [`Combat`] implementation, which decides
//! hit spread and how much damage actually lands. [`BasicCombat`] is the
//! stock rules: dice-of-10 dodge, flat armor against physical damage.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::creature::{Creature, CreatureId, Effect};
use crate::rng::GameRng;

/// Damage type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum DamageType {
    #[default]
    Bash = 0,
    Cut = 1,
    Stab = 2,
    Acid = 3,
    Heat = 4,
    Cold = 5,
    Electric = 6,
    /// Ignores armor entirely
    True = 7,
    Biological = 8,
}

impl DamageType {
    /// Blunt, edged and piercing damage
    pub const fn is_physical(&self) -> bool {
        matches!(self, DamageType::Bash | DamageType::Cut | DamageType::Stab)
    }
}

/// Body part
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum BodyPart {
    #[default]
    Torso = 0,
    Head = 1,
    Eyes = 2,
    Mouth = 3,
    ArmLeft = 4,
    ArmRight = 5,
    HandLeft = 6,
    HandRight = 7,
    LegLeft = 8,
    LegRight = 9,
    FootLeft = 10,
    FootRight = 11,
}

impl BodyPart {
    /// Relative chance of being hit
    pub const fn hit_size(&self) -> i32 {
        match self {
            BodyPart::Torso => 36,
            BodyPart::Head => 8,
            BodyPart::Eyes | BodyPart::Mouth => 1,
            BodyPart::ArmLeft | BodyPart::ArmRight => 9,
            BodyPart::HandLeft | BodyPart::HandRight => 3,
            BodyPart::LegLeft | BodyPart::LegRight => 10,
            BodyPart::FootLeft | BodyPart::FootRight => 3,
        }
    }

    pub const ALL: [BodyPart; 12] = [
        BodyPart::Torso,
        BodyPart::Head,
        BodyPart::Eyes,
        BodyPart::Mouth,
        BodyPart::ArmLeft,
        BodyPart::ArmRight,
        BodyPart::HandLeft,
        BodyPart::HandRight,
        BodyPart::LegLeft,
        BodyPart::LegRight,
        BodyPart::FootLeft,
        BodyPart::FootRight,
    ];
}

/// One typed component of a hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageUnit {
    pub kind: DamageType,
    pub amount: f32,
}

/// All damage carried by one hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageInstance {
    pub units: Vec<DamageUnit>,
}

impl DamageInstance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(kind: DamageType, amount: f32) -> Self {
        Self {
            units: vec![DamageUnit { kind, amount }],
        }
    }

    pub fn add(&mut self, kind: DamageType, amount: f32) {
        self.units.push(DamageUnit { kind, amount });
    }

    /// Scale every unit
    pub fn mult_damage(&mut self, multiplier: f32) {
        for unit in &mut self.units {
            unit.amount *= multiplier;
        }
    }

    pub fn total(&self) -> f32 {
        self.units.iter().map(|u| u.amount).sum()
    }
}

/// What a hit actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealtDamage {
    pub amount: i32,
    pub bp: BodyPart,
    /// The target dropped to zero hit points
    pub killed: bool,
}

/// Melee and damage resolution
pub trait Combat: core::fmt::Debug {
    /// Roll the defender's dodge against `roll`; a negative result is a miss
    fn deal_melee_attack(
        &self,
        attacker: &Creature,
        target: &Creature,
        roll: i32,
        rng: &mut GameRng,
    ) -> i32;

    /// Apply damage to one body part of `target`
    fn apply_damage(
        &self,
        source: Option<CreatureId>,
        target: &mut Creature,
        bp: BodyPart,
        damage: &DamageInstance,
        rng: &mut GameRng,
    ) -> DealtDamage;

    /// Pick the body part a hit lands on; better hits reach smaller parts
    fn select_body_part(&self, hitspread: i32, rng: &mut GameRng) -> BodyPart {
        let bonus = hitspread.clamp(0, 20);
        let weights: Vec<i32> = BodyPart::ALL
            .iter()
            .map(|bp| {
                let size = bp.hit_size();
                if size < 5 { size + bonus / 4 } else { size }
            })
            .collect();
        let total: i32 = weights.iter().sum();
        let mut roll = rng.rng(0, total - 1);
        for (bp, w) in BodyPart::ALL.iter().zip(&weights) {
            if roll < *w {
                return *bp;
            }
            roll -= w;
        }
        BodyPart::Torso
    }
}

/// Stock combat rules
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicCombat;

impl BasicCombat {
    fn dodge_roll(target: &Creature, rng: &mut GameRng) -> i32 {
        if target.has_effect(Effect::Downed)
            || target.has_effect(Effect::Stunned)
            || target.has_effect(Effect::Grabbed)
            || target.has_effect(Effect::Beartrapped)
        {
            return 0;
        }
        rng.dice(target.melee.dodge, 10)
    }
}

impl Combat for BasicCombat {
    fn deal_melee_attack(
        &self,
        _attacker: &Creature,
        target: &Creature,
        roll: i32,
        rng: &mut GameRng,
    ) -> i32 {
        roll - Self::dodge_roll(target, rng)
    }

    fn apply_damage(
        &self,
        _source: Option<CreatureId>,
        target: &mut Creature,
        bp: BodyPart,
        damage: &DamageInstance,
        _rng: &mut GameRng,
    ) -> DealtDamage {
        let armor = target.melee.armor as f32;
        let mut total = 0.0;
        for unit in &damage.units {
            let reduction = match unit.kind {
                DamageType::True => 0.0,
                k if k.is_physical() => armor,
                _ => armor / 2.0,
            };
            total += (unit.amount - reduction).max(0.0);
        }
        let amount = total.round() as i32;
        target.hp -= amount;
        DealtDamage {
            amount,
            bp,
            killed: target.hp <= 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Tripoint;

    #[test]
    fn test_armor_reduces_physical_fully() {
        let combat = BasicCombat;
        let mut rng = GameRng::new(1);
        let mut target = Creature::new("plated", Tripoint::ZERO);
        target.melee.armor = 4;
        let mut hit = DamageInstance::single(DamageType::Cut, 6.0);
        hit.add(DamageType::Heat, 6.0);
        let dealt = combat.apply_damage(None, &mut target, BodyPart::Torso, &hit, &mut rng);
        assert_eq!(dealt.amount, 2 + 4);
        assert_eq!(target.hp, 4);
        assert!(!dealt.killed);
    }

    #[test]
    fn test_true_damage_ignores_armor() {
        let combat = BasicCombat;
        let mut rng = GameRng::new(1);
        let mut target = Creature::new("plated", Tripoint::ZERO);
        target.melee.armor = 50;
        let hit = DamageInstance::single(DamageType::True, 12.0);
        let dealt = combat.apply_damage(None, &mut target, BodyPart::Head, &hit, &mut rng);
        assert!(dealt.killed);
        assert_eq!(dealt.bp, BodyPart::Head);
    }

    #[test]
    fn test_helpless_targets_cannot_dodge() {
        let combat = BasicCombat;
        let mut rng = GameRng::new(7);
        let attacker = Creature::new("a", Tripoint::ZERO);
        let mut target = Creature::new("b", Tripoint::new(1, 0, 0));
        target.add_effect(Effect::Downed, 2);
        assert_eq!(combat.deal_melee_attack(&attacker, &target, 5, &mut rng), 5);
        target.remove_effect(Effect::Downed);
        target.melee.dodge = 3;
        for _ in 0..20 {
            let spread = combat.deal_melee_attack(&attacker, &target, 5, &mut rng);
            assert!((5 - 30..=5 - 3).contains(&spread));
        }
    }

    #[test]
    fn test_mult_damage() {
        let mut hit = DamageInstance::single(DamageType::Bash, 10.0);
        hit.mult_damage(0.5);
        assert_eq!(hit.total(), 5.0);
    }
}
