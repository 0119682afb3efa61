//! Tilerun - tile-grid platformer simulation
//!
//! Application layer over the workspace crates: layered configuration and the
//! fixed-step simulation loop.

pub mod config;
pub mod systems;
