//! 2D Mathematics Library
//!
//! This crate provides the small value types the tilerun physics core is
//! written against.
//!
//! ## Core Types
//!
//! - [`Vec2`] - 2D vector with x, y components (y grows downward)
//! - [`Rect`] - Axis-aligned rectangle with a top-left origin

mod vec2;
pub mod rect;

pub use vec2::{sign, Vec2};
pub use rect::Rect;
