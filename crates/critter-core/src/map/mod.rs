//! Tile grid, coordinates and map features

pub mod coords;
pub mod field;
pub mod grid;
pub mod line;
pub mod submap;
pub mod tile;

pub use coords::{DistanceMode, Tripoint, manhattan_dist, square_dist, squares_closer_to, trig_dist};
pub use field::{
    DangerClass, Field, FieldType, LightShape, MAX_FIELD_INTENSITY, TrapType, VehicleLight,
    VehiclePart,
};
pub use grid::{BashResult, Map};
pub use line::{line_to, line_to_2d};
pub use tile::{BashInfo, Furniture, FurnitureBash, Terrain, TileFlags};
