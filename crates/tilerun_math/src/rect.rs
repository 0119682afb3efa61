//! Axis-aligned rectangle
//!
//! Rectangles are stored as a top-left origin plus non-negative dimensions.
//! Two overlap tests exist with different edge semantics:
//!
//! - [`Rect::overlaps`] uses the Minkowski-sum trick on top of
//!   [`Rect::contains_point`], which is open on the left/top edges and closed on
//!   the right/bottom edges. Touching on one side counts, touching on the other
//!   does not.
//! - [`Rect::intersects`] is a strict interior test: touching never counts.

use serde::{Serialize, Deserialize};

use crate::Vec2;

/// An axis-aligned rectangle with a top-left origin
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    ///
    /// # Panics
    /// Panics if `width` or `height` is negative.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        assert!(
            width >= 0.0 && height >= 0.0,
            "rect dimensions must be non-negative, got {}x{}",
            width,
            height
        );
        Self { x, y, width, height }
    }

    /// Create a rectangle from an origin and dimensions
    pub fn from_origin_dimensions(origin: Vec2, dimensions: Vec2) -> Self {
        Self::new(origin.x, origin.y, dimensions.x, dimensions.y)
    }

    /// Top-left corner
    #[inline]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Width and height as a vector
    #[inline]
    pub fn dimensions(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Right edge x coordinate
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge y coordinate
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Corners in order: top-left, top-right, bottom-left, bottom-right
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.right(), self.y),
            Vec2::new(self.x, self.bottom()),
            Vec2::new(self.right(), self.bottom()),
        ]
    }

    /// Point containment, open on the left/top edges and closed on the
    /// right/bottom edges
    ///
    /// A point exactly on the left or top edge is outside; a point exactly on
    /// the right or bottom edge is inside.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x > self.x
            && point.x <= self.right()
            && point.y > self.y
            && point.y <= self.bottom()
    }

    /// Rect-vs-rect overlap via the Minkowski sum
    ///
    /// Inflates `self` by half of `other`'s extents on every side and tests
    /// `other`'s center against the inflated rect with [`Rect::contains_point`].
    /// Inherits its edge semantics: `other` touching `self` from the right or
    /// from below counts as overlapping, touching from the left or above does not.
    pub fn overlaps(&self, other: &Rect) -> bool {
        let sum = Rect {
            x: self.x - other.width * 0.5,
            y: self.y - other.height * 0.5,
            width: self.width + other.width,
            height: self.height + other.height,
        };
        sum.contains_point(other.center())
    }

    /// Strict interior overlap; rectangles that only share an edge do not
    /// intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Translate the rect by a delta
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            ..*self
        }
    }

    /// Same dimensions at a new origin
    pub fn with_origin(&self, origin: Vec2) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            ..*self
        }
    }

    /// Widen horizontally by `multiplier`, keeping the horizontal center fixed
    ///
    /// Used as a forgiving probe when testing ledge corners.
    pub fn fat(&self, multiplier: f32) -> Self {
        let width = self.width * multiplier;
        Self {
            x: self.x - (width - self.width) * 0.5,
            width,
            ..*self
        }
    }
}
