//! Terrain and furniture types

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

bitflags! {
    /// Per-tile flags contributed by terrain and furniture
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct TileFlags: u32 {
        const DIGGABLE = 1 << 0;
        const SWIMMABLE = 1 << 1;
        const DEEP_WATER = 1 << 2;
        const LIQUID = 1 << 3;
        const SHARP = 1 << 4;
        const ROUGH = 1 << 5;
        const UNSTABLE = 1 << 6;
        const GOES_UP = 1 << 7;
        const GOES_DOWN = 1 << 8;
        const NO_FLOOR = 1 << 9;
        const CLIMBABLE = 1 << 10;
        const DOOR = 1 << 11;
        const FLAMMABLE = 1 << 12;
        const LAVA = 1 << 13;
        const RAMP = 1 << 14;
        const WALL = 1 << 15;
        const PIT = 1 << 16;
    }
}

// Manual serde impl for TileFlags
impl Serialize for TileFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TileFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(TileFlags::from_bits_truncate(bits))
    }
}

/// Strength window for smashing a tile, and what it becomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BashInfo {
    pub str_min: i32,
    pub str_max: i32,
    pub result: Terrain,
}

/// Terrain type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Terrain {
    /// Out-of-bounds sentinel
    #[default]
    Null = 0,
    OpenAir = 1,
    Dirt = 2,
    Grass = 3,
    Floor = 4,
    Pavement = 5,
    RockFloor = 6,
    Wall = 7,
    Rock = 8,
    GlassWall = 9,
    Window = 10,
    WindowFrame = 11,
    DoorClosed = 12,
    DoorOpen = 13,
    DoorLocked = 14,
    DoorBroken = 15,
    Tree = 16,
    Rubble = 17,
    DirtMound = 18,
    Pit = 19,
    SpikedPit = 20,
    WaterShallow = 21,
    WaterDeep = 22,
    Lava = 23,
    StairsUp = 24,
    StairsDown = 25,
    RampUp = 26,
    RampDown = 27,
}

impl Terrain {
    /// Base movement cost; 0 means impassable
    pub const fn move_cost(&self) -> i32 {
        match self {
            Terrain::Null
            | Terrain::Wall
            | Terrain::Rock
            | Terrain::GlassWall
            | Terrain::Window
            | Terrain::DoorClosed
            | Terrain::DoorLocked
            | Terrain::Tree => 0,
            Terrain::DirtMound => 3,
            Terrain::WaterShallow => 5,
            Terrain::Rubble => 6,
            Terrain::WaterDeep => 8,
            Terrain::WindowFrame => 8,
            Terrain::Pit | Terrain::SpikedPit => 10,
            Terrain::Lava => 4,
            _ => 2,
        }
    }

    /// Whether light passes through
    pub const fn is_transparent(&self) -> bool {
        !matches!(
            self,
            Terrain::Null
                | Terrain::Wall
                | Terrain::Rock
                | Terrain::DoorClosed
                | Terrain::DoorLocked
                | Terrain::Tree
        )
    }

    pub const fn flags(&self) -> TileFlags {
        match self {
            Terrain::OpenAir => TileFlags::NO_FLOOR,
            Terrain::Dirt | Terrain::Grass => TileFlags::DIGGABLE,
            Terrain::Wall => TileFlags::WALL.union(TileFlags::FLAMMABLE),
            Terrain::Rock => TileFlags::WALL.union(TileFlags::DIGGABLE),
            Terrain::GlassWall => TileFlags::WALL,
            Terrain::WindowFrame => TileFlags::SHARP.union(TileFlags::ROUGH),
            Terrain::DoorClosed | Terrain::DoorLocked | Terrain::DoorOpen => {
                TileFlags::DOOR.union(TileFlags::FLAMMABLE)
            }
            Terrain::DoorBroken => TileFlags::ROUGH,
            Terrain::Tree => TileFlags::CLIMBABLE.union(TileFlags::FLAMMABLE),
            Terrain::Rubble => TileFlags::ROUGH
                .union(TileFlags::UNSTABLE)
                .union(TileFlags::DIGGABLE),
            Terrain::DirtMound => TileFlags::DIGGABLE.union(TileFlags::UNSTABLE),
            Terrain::Pit => TileFlags::PIT,
            Terrain::SpikedPit => TileFlags::PIT.union(TileFlags::SHARP),
            Terrain::WaterShallow => TileFlags::SWIMMABLE.union(TileFlags::LIQUID),
            Terrain::WaterDeep => TileFlags::SWIMMABLE
                .union(TileFlags::LIQUID)
                .union(TileFlags::DEEP_WATER),
            Terrain::Lava => TileFlags::LAVA.union(TileFlags::LIQUID),
            Terrain::StairsUp => TileFlags::GOES_UP,
            Terrain::StairsDown => TileFlags::GOES_DOWN,
            Terrain::RampUp => TileFlags::GOES_UP.union(TileFlags::RAMP),
            Terrain::RampDown => TileFlags::GOES_DOWN.union(TileFlags::RAMP),
            _ => TileFlags::empty(),
        }
    }

    /// Smash thresholds, if this terrain can be bashed
    pub const fn bash(&self) -> Option<BashInfo> {
        match self {
            Terrain::Wall => Some(BashInfo { str_min: 60, str_max: 150, result: Terrain::Rubble }),
            Terrain::GlassWall => Some(BashInfo { str_min: 4, str_max: 20, result: Terrain::WindowFrame }),
            Terrain::Window => Some(BashInfo { str_min: 3, str_max: 6, result: Terrain::WindowFrame }),
            Terrain::DoorClosed => Some(BashInfo { str_min: 8, str_max: 80, result: Terrain::DoorBroken }),
            Terrain::DoorLocked => Some(BashInfo { str_min: 10, str_max: 80, result: Terrain::DoorBroken }),
            Terrain::DoorOpen => Some(BashInfo { str_min: 10, str_max: 80, result: Terrain::DoorBroken }),
            _ => None,
        }
    }

    /// What this terrain becomes when opened
    pub const fn opened(&self) -> Option<Terrain> {
        match self {
            Terrain::DoorClosed => Some(Terrain::DoorOpen),
            _ => None,
        }
    }

    /// What this terrain becomes when closed
    pub const fn closed(&self) -> Option<Terrain> {
        match self {
            Terrain::DoorOpen => Some(Terrain::DoorClosed),
            _ => None,
        }
    }

    /// Luminance emitted by the terrain itself
    pub const fn light_emitted(&self) -> f32 {
        match self {
            Terrain::Lava => 12.0,
            _ => 0.0,
        }
    }

    pub const fn has_floor(&self) -> bool {
        !matches!(self, Terrain::OpenAir | Terrain::Null)
    }

    /// Map symbol used by the text dumps
    pub const fn symbol(&self) -> char {
        match self {
            Terrain::Null => ' ',
            Terrain::OpenAir => ' ',
            Terrain::Dirt | Terrain::RockFloor => '.',
            Terrain::Grass => ',',
            Terrain::Floor | Terrain::Pavement => '.',
            Terrain::Wall | Terrain::Rock => '#',
            Terrain::GlassWall | Terrain::Window => '"',
            Terrain::WindowFrame => '0',
            Terrain::DoorClosed | Terrain::DoorLocked => '+',
            Terrain::DoorOpen | Terrain::DoorBroken => '\'',
            Terrain::Tree => 'T',
            Terrain::Rubble | Terrain::DirtMound => '^',
            Terrain::Pit | Terrain::SpikedPit => '0',
            Terrain::WaterShallow | Terrain::WaterDeep => '~',
            Terrain::Lava => '~',
            Terrain::StairsUp | Terrain::RampUp => '<',
            Terrain::StairsDown | Terrain::RampDown => '>',
        }
    }
}

/// Furniture type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Furniture {
    #[default]
    None = 0,
    Table = 1,
    Chair = 2,
    Bookcase = 3,
    Boulder = 4,
    Lamp = 5,
    Brazier = 6,
    Barricade = 7,
    Bush = 8,
}

/// Furniture smash thresholds; a smashed piece is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FurnitureBash {
    pub str_min: i32,
    pub str_max: i32,
}

impl Furniture {
    /// Added movement cost; negative means the furniture blocks movement
    pub const fn move_cost_mod(&self) -> i32 {
        match self {
            Furniture::None | Furniture::Lamp => 0,
            Furniture::Table => 2,
            Furniture::Chair => 1,
            Furniture::Bush => 3,
            Furniture::Brazier => 2,
            Furniture::Bookcase | Furniture::Boulder | Furniture::Barricade => -1,
        }
    }

    pub const fn is_transparent(&self) -> bool {
        !matches!(self, Furniture::Bookcase | Furniture::Bush)
    }

    pub const fn flags(&self) -> TileFlags {
        match self {
            Furniture::Table | Furniture::Chair | Furniture::Bookcase => TileFlags::FLAMMABLE,
            Furniture::Barricade => TileFlags::SHARP,
            Furniture::Bush => TileFlags::FLAMMABLE.union(TileFlags::ROUGH),
            Furniture::Boulder => TileFlags::CLIMBABLE,
            _ => TileFlags::empty(),
        }
    }

    pub const fn bash(&self) -> Option<FurnitureBash> {
        match self {
            Furniture::Table => Some(FurnitureBash { str_min: 12, str_max: 50 }),
            Furniture::Chair => Some(FurnitureBash { str_min: 6, str_max: 20 }),
            Furniture::Bookcase => Some(FurnitureBash { str_min: 6, str_max: 40 }),
            Furniture::Boulder => Some(FurnitureBash { str_min: 32, str_max: 80 }),
            Furniture::Barricade => Some(FurnitureBash { str_min: 20, str_max: 60 }),
            Furniture::Bush => Some(FurnitureBash { str_min: 4, str_max: 30 }),
            Furniture::Lamp => Some(FurnitureBash { str_min: 4, str_max: 12 }),
            Furniture::Brazier => Some(FurnitureBash { str_min: 12, str_max: 40 }),
            Furniture::None => None,
        }
    }

    pub const fn light_emitted(&self) -> f32 {
        match self {
            Furniture::Lamp => 15.0,
            Furniture::Brazier => 20.0,
            _ => 0.0,
        }
    }
}
