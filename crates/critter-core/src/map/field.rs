//! Fields, traps and vehicle parts occupying tiles

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Highest field intensity
pub const MAX_FIELD_INTENSITY: i32 = 3;

/// Field type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum FieldType {
    Fire = 0,
    Smoke = 1,
    Acid = 2,
    Sludge = 3,
    ToxicGas = 4,
    Electricity = 5,
    Blood = 6,
}

/// Which avoidance tier cares about a danger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DangerClass {
    /// Fire, lava, electricity and falls
    Simple,
    /// Traps, sharp terrain and chemical fields
    Complex,
}

impl FieldType {
    /// Transparency multiplier at the given intensity; 1.0 leaves sight untouched
    pub const fn translucency(&self, intensity: i32) -> f32 {
        match self {
            FieldType::Smoke => match intensity {
                1 => 4.0,
                2 => 8.0,
                _ => 16.0,
            },
            FieldType::Fire => match intensity {
                1 => 1.5,
                2 => 2.0,
                _ => 3.0,
            },
            FieldType::ToxicGas => match intensity {
                1 => 1.5,
                2 => 2.5,
                _ => 4.0,
            },
            _ => 1.0,
        }
    }

    pub const fn light_emitted(&self, intensity: i32) -> f32 {
        match self {
            FieldType::Fire => match intensity {
                1 => 8.0,
                2 => 16.0,
                _ => 30.0,
            },
            FieldType::Electricity => match intensity {
                1 => 2.0,
                2 => 4.0,
                _ => 8.0,
            },
            _ => 0.0,
        }
    }

    /// Danger class, if the field hurts creatures standing in it
    pub const fn danger(&self) -> Option<DangerClass> {
        match self {
            FieldType::Fire | FieldType::Electricity => Some(DangerClass::Simple),
            FieldType::Acid | FieldType::ToxicGas => Some(DangerClass::Complex),
            FieldType::Smoke | FieldType::Sludge | FieldType::Blood => None,
        }
    }
}

/// A field instance on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub kind: FieldType,
    /// 1..=MAX_FIELD_INTENSITY
    pub intensity: i32,
}

impl Field {
    pub fn new(kind: FieldType, intensity: i32) -> Self {
        Self {
            kind,
            intensity: intensity.clamp(1, MAX_FIELD_INTENSITY),
        }
    }
}

/// Trap type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum TrapType {
    BearTrap = 0,
    Caltrops = 1,
    Pit = 2,
    Landmine = 3,
    Tripwire = 4,
    Snare = 5,
}

impl TrapType {
    /// Whether a flying creature sets it off
    pub const fn triggered_by_flyers(&self) -> bool {
        matches!(self, TrapType::Snare)
    }

    /// Whether the trap is consumed when triggered
    pub const fn single_use(&self) -> bool {
        matches!(self, TrapType::Landmine | TrapType::Snare)
    }
}

/// Shape of a vehicle-mounted light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightShape {
    /// Omnidirectional
    Circle,
    /// Cone centred on `direction` degrees, `width` degrees wide
    Cone { direction: i32, width: i32 },
    /// Straight beam to an offset
    Beam { dx: i32, dy: i32 },
}

/// Light mounted on a vehicle part
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleLight {
    pub luminance: f32,
    pub shape: LightShape,
}

/// The parts of a vehicle the engine consults
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehiclePart {
    /// Blocks movement (frame, wall, closed door)
    pub obstacle: bool,
    /// Creatures may stand on it
    pub boardable: bool,
    pub light: Option<VehicleLight>,
}

impl VehiclePart {
    pub const fn obstacle() -> Self {
        Self {
            obstacle: true,
            boardable: false,
            light: None,
        }
    }

    pub const fn seat() -> Self {
        Self {
            obstacle: false,
            boardable: true,
            light: None,
        }
    }
}
