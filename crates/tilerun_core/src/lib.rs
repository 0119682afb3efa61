//! Core types for Tilerun
//!
//! This crate ties the physics core to levels and gameplay objects:
//!
//! - [`Entity`] - An object in a level with a shared position slot
//! - [`World`] - Container for entities, positions, the tile grid and physics
//! - [`EntityKey`] - Generational key to an entity in the world
//! - [`ControlInput`] - Per-tick player controls
//! - [`LevelMap`] - Text level format, expanded to a tile grid
//! - [`EntityTemplate`] / [`EntityCatalog`] - RON entity definitions

mod catalog;
mod entity;
mod level;
mod world;

pub use catalog::{CatalogError, EntityCatalog};
pub use entity::{Entity, EntityTemplate, Facing, PhysicsTemplate};
pub use level::{LevelMap, MapLoadError, CELL_TILES};
pub use world::{ControlInput, EntityKey, World, DEFAULT_TIME_STEP};

// Re-export commonly used types from tilerun_math for convenience
pub use tilerun_math::{Rect, Vec2};

// Re-export physics types for convenient access through tilerun_core
pub use tilerun_physics::{
    BodyKey, CollisionSide, ContactKind, Locomotion, LocomotionState, PhysicsBody, PhysicsConfig,
    PhysicsWorld, PositionKey, TileGrid,
};
