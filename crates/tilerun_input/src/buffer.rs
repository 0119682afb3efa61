//! Input history
//!
//! Device code feeds one [`RawInput`] per frame. The buffer turns it into an
//! [`InputFrame`] (classified direction, held buttons, freshly pressed buttons)
//! and keeps the last few frames so gameplay code can ask questions like
//! "was jump pressed in the last 4 frames?".

use std::collections::VecDeque;

use bitflags::bitflags;
use tilerun_math::Vec2;

use crate::direction::MoveDirection;

/// Default number of frames kept
pub const DEFAULT_HISTORY_LENGTH: usize = 10;

bitflags! {
    /// Buttons held on a frame
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        const JUMP  = 1 << 0;
        const DUCK  = 1 << 1;
        const DODGE = 1 << 2;
    }
}

/// Device-agnostic input for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawInput {
    /// Stick or key-derived movement vector (y down)
    pub movement: Vec2,
    pub held: Buttons,
}

impl RawInput {
    pub fn new(movement: Vec2, held: Buttons) -> Self {
        Self { movement, held }
    }
}

/// One processed frame of input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub direction: MoveDirection,
    pub held: Buttons,
    /// Buttons held this frame but not the previous one
    pub pressed: Buttons,
}

impl InputFrame {
    /// Jump went down on this frame
    pub fn jump_pressed(&self) -> bool {
        self.pressed.contains(Buttons::JUMP)
    }
}

/// Bounded history of processed input frames, newest last
#[derive(Clone, Debug)]
pub struct InputBuffer {
    frames: VecDeque<InputFrame>,
    capacity: usize,
    deadzone: f32,
    last_held: Buttons,
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LENGTH, 0.2)
    }
}

impl InputBuffer {
    /// Create a buffer keeping `capacity` frames
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, deadzone: f32) -> Self {
        assert!(capacity > 0, "input history must hold at least one frame");
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
            deadzone,
            last_held: Buttons::empty(),
        }
    }

    /// Record a new frame, evicting the oldest when full
    pub fn push(&mut self, raw: RawInput) -> InputFrame {
        let frame = InputFrame {
            direction: MoveDirection::from_vector(raw.movement, self.deadzone),
            held: raw.held,
            pressed: raw.held & !self.last_held,
        };
        self.last_held = raw.held;

        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
        frame
    }

    /// Newest frame
    pub fn current(&self) -> Option<&InputFrame> {
        self.frames.back()
    }

    /// Direction on the newest frame
    pub fn direction(&self) -> MoveDirection {
        self.current().map(|f| f.direction).unwrap_or_default()
    }

    /// Jump went down on the newest frame
    pub fn jump_pressed(&self) -> bool {
        self.current().is_some_and(InputFrame::jump_pressed)
    }

    /// Whether any of the last `frames` frames satisfies `predicate`
    ///
    /// # Panics
    /// Panics if `frames` is zero.
    pub fn had<F>(&self, frames: usize, predicate: F) -> bool
    where
        F: Fn(&InputFrame) -> bool,
    {
        assert!(frames > 0, "must look back at least one frame");
        self.frames.iter().rev().take(frames).any(predicate)
    }

    /// Number of frames held
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all history, including the held state used for edge detection
    pub fn clear(&mut self) {
        self.frames.clear();
        self.last_held = Buttons::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(buttons: Buttons) -> RawInput {
        RawInput::new(Vec2::ZERO, buttons)
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = InputBuffer::default();
        assert!(buffer.is_empty());
        assert_eq!(buffer.direction(), MoveDirection::None);
        assert!(!buffer.jump_pressed());
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity_panics() {
        let _ = InputBuffer::new(0, 0.2);
    }

    #[test]
    fn test_jump_edge_only_on_first_frame() {
        let mut buffer = InputBuffer::default();
        assert!(buffer.push(held(Buttons::JUMP)).jump_pressed());
        assert!(!buffer.push(held(Buttons::JUMP)).jump_pressed());
        assert!(!buffer.push(held(Buttons::empty())).jump_pressed());
        assert!(buffer.push(held(Buttons::JUMP)).jump_pressed());
        assert!(buffer.jump_pressed());
    }

    #[test]
    fn test_pressed_tracks_each_button() {
        let mut buffer = InputBuffer::default();
        buffer.push(held(Buttons::DUCK));
        let frame = buffer.push(held(Buttons::DUCK | Buttons::DODGE));
        assert_eq!(frame.pressed, Buttons::DODGE);
        assert_eq!(frame.held, Buttons::DUCK | Buttons::DODGE);
    }

    #[test]
    fn test_direction_classified() {
        let mut buffer = InputBuffer::new(4, 0.2);
        buffer.push(RawInput::new(Vec2::new(-1.0, 0.0), Buttons::empty()));
        assert_eq!(buffer.direction(), MoveDirection::Left);
        buffer.push(RawInput::new(Vec2::new(0.1, 0.0), Buttons::empty()));
        assert_eq!(buffer.direction(), MoveDirection::None);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut buffer = InputBuffer::new(3, 0.2);
        for _ in 0..5 {
            buffer.push(RawInput::default());
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.capacity(), 3);
    }

    #[test]
    fn test_had_looks_back_n_frames() {
        let mut buffer = InputBuffer::new(10, 0.2);
        buffer.push(held(Buttons::JUMP));
        buffer.push(held(Buttons::empty()));
        buffer.push(held(Buttons::empty()));

        assert!(!buffer.had(2, InputFrame::jump_pressed));
        assert!(buffer.had(3, InputFrame::jump_pressed));
        assert!(buffer.had(50, InputFrame::jump_pressed));
    }

    #[test]
    fn test_clear_resets_edge_state() {
        let mut buffer = InputBuffer::default();
        buffer.push(held(Buttons::JUMP));
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.push(held(Buttons::JUMP)).jump_pressed());
    }
}
