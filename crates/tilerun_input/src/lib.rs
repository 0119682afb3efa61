//! Device-agnostic input for Tilerun
//!
//! Device code (keyboard, gamepad, replay files) produces a [`RawInput`] per
//! frame; this crate classifies it into a nine-way [`MoveDirection`] and keeps
//! a short [`InputBuffer`] history with button edge detection.

mod buffer;
mod direction;

pub use buffer::{Buttons, InputBuffer, InputFrame, RawInput, DEFAULT_HISTORY_LENGTH};
pub use direction::{MoveDirection, SLOPE_HORIZONTAL, SLOPE_VERTICAL};
