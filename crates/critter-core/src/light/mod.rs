//! Lighting and visibility
//!
//! Transparency, floor and light values live in per-level caches owned by the
//! [`Map`](crate::map::Map). Tile mutations mark a level dirty and the next
//! query or rebuild refreshes it.

pub mod cache;
pub mod lightmap;
pub mod seen;
pub mod shadowcast;
pub mod zlight;

pub use cache::LevelCache;
pub use lightmap::{LightEnvironment, LightSource, LitLevel};
pub use seen::SeenOptions;
pub use shadowcast::{
    ArcMask, CastGrid, CastParams, LightFalloff, OCTANTS, Octant, Propagation, SightFalloff, Slope,
    cast_all, cast_octant,
};
pub use zlight::{VerticalDirection, ZGrid, ZLevel, ZParams, cast_zlight};
