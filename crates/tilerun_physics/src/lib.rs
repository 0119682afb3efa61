//! Tile-grid platformer physics for Tilerun
//!
//! This crate provides the simulation core of a 2D platformer:
//! - A static tile grid queried by world-space rectangles
//! - Box bodies sized in whole tiles, driven by accumulated forces
//! - A fixed-step integrator with per-tick displacement clamping
//! - Collision resolution against tiles (walls, floors, concave and convex corners)
//! - Player locomotion with quadratic drag, jump cooldown and coyote time

pub mod body;
pub mod collision;
pub mod grid;
pub mod locomotion;
pub mod world;

// Re-export commonly used types
pub use body::{BodyKey, PhysicsBody, PositionKey};
pub use collision::{
    resolve, CollisionCounters, CollisionSide, CollisionSides, ContactKind, DiagnosticReason,
    Resolution, ResolveOptions, TileDiagnostic,
};
pub use grid::{GridError, TileGrid, TILE_CENTER_OFFSET};
pub use locomotion::{Locomotion, LocomotionInput, LocomotionState};
pub use world::{PhysicsConfig, PhysicsWorld};
