//! Engine-wide constants

/// Tiles per submap edge
pub const SEEX: i32 = 12;
/// Tiles per submap edge
pub const SEEY: i32 = 12;

/// Hard cap on light and sight propagation radius
pub const MAX_VIEW_DISTANCE: i32 = 60;

/// Movement points a normal-speed creature gains each turn
pub const NORMAL_SPEED: i32 = 100;

// Transparency values. SOLID blocks everything; larger values attenuate more.
pub const LIGHT_TRANSPARENCY_SOLID: f32 = 0.0;
pub const LIGHT_TRANSPARENCY_OPEN_AIR: f32 = 0.038_376_418;
pub const LIGHT_TRANSPARENCY_CLEAR: f32 = 1.0;

// Ambient light thresholds
pub const LIGHT_AMBIENT_LOW: f32 = 3.5;
pub const LIGHT_AMBIENT_MINIMAL: f32 = 3.7;
pub const LIGHT_AMBIENT_DIM: f32 = 5.0;
pub const LIGHT_AMBIENT_LIT: f32 = 10.0;

// Light source strengths
pub const LIGHT_SOURCE_LOCAL: f32 = 4.1;
pub const LIGHT_SOURCE_BRIGHT: f32 = 10.0;

/// Full daylight on an unroofed tile
pub const DAYLIGHT_LEVEL: f32 = 100.0;

/// Seen-cache value at the viewer's own tile
pub const VISIBILITY_FULL: f32 = 1.0;

/// Luminance of a creature that is on fire
pub const ON_FIRE_LUMINANCE: f32 = 8.0;

/// Distance within which friendly creatures keep close to their owner
pub const MONSTER_FOLLOW_DIST: i32 = 8;

/// Bounds for the anger and morale accumulators
pub const ANGER_MIN: i32 = -100;
pub const ANGER_MAX: i32 = 100;
pub const MORALE_MIN: i32 = -100;
pub const MORALE_MAX: i32 = 100;
pub const FEAR_MAX: i32 = 100;

/// Search radius used when aligning stairs between levels
pub const STAIR_SHIM_RADIUS: i32 = 10;

/// Maximum scent value tracked per tile
pub const SCENT_MAX: i32 = 1000;

/// Scent the avatar lays on its own tile each turn
pub const AVATAR_SCENT: i32 = 500;
/// Scent lost per tile of distance from the avatar
pub const AVATAR_SCENT_FALLOFF: i32 = 25;
