//! critter-core: creature movement and perception for tile worlds
//!
//! This crate holds the engine behind non-player creatures: the grid they
//! live on, light and sight over that grid, A* routing, the per-turn
//! decision and movement logic, and the special attacks they can use.
//! It does no I/O beyond loading and saving engine options.

pub mod ai;
pub mod combat;
pub mod creature;
pub mod light;
pub mod map;
pub mod pathfind;
pub mod special;
pub mod world;

mod consts;
mod gameloop;
mod rng;

pub use consts::*;
pub use gameloop::{Simulation, TickResult};
pub use rng::GameRng;

pub use creature::{Creature, CreatureId};
pub use map::{Map, Tripoint};
pub use world::{EngineError, EngineOptions, EngineResult, World, WorldEvent};
