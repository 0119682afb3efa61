//! Nine-way movement direction
//!
//! Raw stick or key state is reduced to one of nine directions by comparing
//! the input's slope against the 22.5 and 67.5 degree lines. World space has y
//! growing downward, so "up" is negative y.

use tilerun_math::Vec2;

/// tan(22.5 degrees): below this slope a vector reads as horizontal
pub const SLOPE_HORIZONTAL: f32 = 0.414_213_57;
/// tan(67.5 degrees): above this slope a vector reads as vertical
pub const SLOPE_VERTICAL: f32 = 2.414_213_7;

/// Movement direction: none plus the eight compass directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MoveDirection {
    #[default]
    None,
    Right,
    UpRight,
    Up,
    UpLeft,
    Left,
    DownLeft,
    Down,
    DownRight,
}

impl MoveDirection {
    /// Classify an input vector
    ///
    /// Vectors no longer than `deadzone` map to [`MoveDirection::None`].
    pub fn from_vector(v: Vec2, deadzone: f32) -> Self {
        if v.length() <= deadzone || v == Vec2::ZERO {
            return MoveDirection::None;
        }

        let ax = v.x.abs();
        let ay = v.y.abs();
        let right = v.x > 0.0;
        let down = v.y > 0.0;

        let horizontal = ax > 0.0 && ay / ax < SLOPE_HORIZONTAL;
        let vertical = ax == 0.0 || ay / ax > SLOPE_VERTICAL;

        match (horizontal, vertical) {
            (true, _) if right => MoveDirection::Right,
            (true, _) => MoveDirection::Left,
            (_, true) if down => MoveDirection::Down,
            (_, true) => MoveDirection::Up,
            _ => match (right, down) {
                (true, false) => MoveDirection::UpRight,
                (false, false) => MoveDirection::UpLeft,
                (false, true) => MoveDirection::DownLeft,
                (true, true) => MoveDirection::DownRight,
            },
        }
    }

    /// Unit vector for this direction (zero for `None`)
    pub fn to_vector(self) -> Vec2 {
        let (x, y) = self.components();
        Vec2::new(x, y).normalized()
    }

    /// Horizontal component: -1, 0 or 1
    pub fn horizontal(self) -> f32 {
        self.components().0
    }

    /// Vertical component: -1 (up), 0 or 1 (down)
    pub fn vertical(self) -> f32 {
        self.components().1
    }

    fn components(self) -> (f32, f32) {
        match self {
            MoveDirection::None => (0.0, 0.0),
            MoveDirection::Right => (1.0, 0.0),
            MoveDirection::UpRight => (1.0, -1.0),
            MoveDirection::Up => (0.0, -1.0),
            MoveDirection::UpLeft => (-1.0, -1.0),
            MoveDirection::Left => (-1.0, 0.0),
            MoveDirection::DownLeft => (-1.0, 1.0),
            MoveDirection::Down => (0.0, 1.0),
            MoveDirection::DownRight => (1.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_directions() {
        assert_eq!(MoveDirection::from_vector(Vec2::new(1.0, 0.0), 0.1), MoveDirection::Right);
        assert_eq!(MoveDirection::from_vector(Vec2::new(-1.0, 0.0), 0.1), MoveDirection::Left);
        assert_eq!(MoveDirection::from_vector(Vec2::new(0.0, -1.0), 0.1), MoveDirection::Up);
        assert_eq!(MoveDirection::from_vector(Vec2::new(0.0, 1.0), 0.1), MoveDirection::Down);
    }

    #[test]
    fn test_diagonals() {
        assert_eq!(MoveDirection::from_vector(Vec2::new(1.0, -1.0), 0.1), MoveDirection::UpRight);
        assert_eq!(MoveDirection::from_vector(Vec2::new(-1.0, -1.0), 0.1), MoveDirection::UpLeft);
        assert_eq!(MoveDirection::from_vector(Vec2::new(-1.0, 1.0), 0.1), MoveDirection::DownLeft);
        assert_eq!(MoveDirection::from_vector(Vec2::new(1.0, 1.0), 0.1), MoveDirection::DownRight);
    }

    #[test]
    fn test_slope_thresholds() {
        // 20 degrees off horizontal still reads as horizontal
        assert_eq!(MoveDirection::from_vector(Vec2::new(1.0, 0.36), 0.1), MoveDirection::Right);
        // 25 degrees is diagonal
        assert_eq!(MoveDirection::from_vector(Vec2::new(1.0, 0.47), 0.1), MoveDirection::DownRight);
        // 65 degrees is diagonal, 70 is vertical
        assert_eq!(MoveDirection::from_vector(Vec2::new(1.0, -2.14), 0.1), MoveDirection::UpRight);
        assert_eq!(MoveDirection::from_vector(Vec2::new(1.0, -2.75), 0.1), MoveDirection::Up);
    }

    #[test]
    fn test_deadzone() {
        assert_eq!(MoveDirection::from_vector(Vec2::ZERO, 0.0), MoveDirection::None);
        assert_eq!(MoveDirection::from_vector(Vec2::new(0.1, 0.1), 0.2), MoveDirection::None);
        assert_eq!(MoveDirection::from_vector(Vec2::new(0.3, 0.0), 0.2), MoveDirection::Right);
    }

    #[test]
    fn test_to_vector() {
        assert_eq!(MoveDirection::None.to_vector(), Vec2::ZERO);
        assert_eq!(MoveDirection::Left.to_vector(), Vec2::new(-1.0, 0.0));
        let d = MoveDirection::DownRight.to_vector();
        assert!((d.length() - 1.0).abs() < 0.0001);
        assert!(d.x > 0.0 && d.y > 0.0);
    }

    #[test]
    fn test_components() {
        assert_eq!(MoveDirection::UpLeft.horizontal(), -1.0);
        assert_eq!(MoveDirection::UpLeft.vertical(), -1.0);
        assert_eq!(MoveDirection::Down.horizontal(), 0.0);
    }
}
