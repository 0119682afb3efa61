//! Collision resolution against the tile grid
//!
//! [`resolve`] takes a body's current rect and velocity, sweeps it by one tick,
//! and reconciles the result with the solid tiles it would touch. Each axis is
//! tested with a trial rect whose other axis is pinned to the nearest tile
//! boundary, so a body sliding along a floor never clips the wall beside it
//! (and vice versa).
//!
//! Contacts are classified as wall, floor/ceiling, concave corner, or, when a
//! diagonal move touches nothing on either axis, a convex corner above or below
//! the body. Convex corners below use a slightly widened ("fat") probe so that
//! a falling body grazing a ledge corner lands on it instead of slipping past.
//!
//! Bodies must be exact multiples of the tile width and must not move more than
//! half a tile per axis per tick; the integrator clamps velocity to guarantee
//! the latter.

use bitflags::bitflags;
use log::trace;

use crate::grid::TileGrid;
use tilerun_math::{sign, Rect, Vec2};

/// Distance a body is pushed back from a wall after a horizontal contact
pub const WALL_NUDGE: f32 = 1.0;

/// One side of a body
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionSide {
    Up,
    Down,
    Left,
    Right,
}

impl CollisionSide {
    /// All sides, in counter order
    pub const ALL: [CollisionSide; 4] = [
        CollisionSide::Up,
        CollisionSide::Down,
        CollisionSide::Left,
        CollisionSide::Right,
    ];

    /// Side hit when moving horizontally with the given velocity
    pub fn horizontal(velocity_x: f32) -> Option<Self> {
        match sign(velocity_x) {
            s if s > 0.0 => Some(CollisionSide::Right),
            s if s < 0.0 => Some(CollisionSide::Left),
            _ => None,
        }
    }

    /// Side hit when moving vertically with the given velocity (y grows down)
    pub fn vertical(velocity_y: f32) -> Option<Self> {
        match sign(velocity_y) {
            s if s > 0.0 => Some(CollisionSide::Down),
            s if s < 0.0 => Some(CollisionSide::Up),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            CollisionSide::Up => 0,
            CollisionSide::Down => 1,
            CollisionSide::Left => 2,
            CollisionSide::Right => 3,
        }
    }

    fn flag(self) -> CollisionSides {
        match self {
            CollisionSide::Up => CollisionSides::UP,
            CollisionSide::Down => CollisionSides::DOWN,
            CollisionSide::Left => CollisionSides::LEFT,
            CollisionSide::Right => CollisionSides::RIGHT,
        }
    }
}

bitflags! {
    /// Summary of which sides registered at least one contact this tick
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CollisionSides: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

/// Per-side contact counts for one tick
///
/// Counts rather than flags: two floor tiles under a body register two
/// downward contacts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionCounters {
    counts: [u32; 4],
}

impl CollisionCounters {
    /// Record one contact on a side
    pub fn increment(&mut self, side: CollisionSide) {
        self.counts[side.index()] += 1;
    }

    /// Contacts recorded on a side
    pub fn get(&self, side: CollisionSide) -> u32 {
        self.counts[side.index()]
    }

    pub fn up(&self) -> u32 {
        self.get(CollisionSide::Up)
    }

    pub fn down(&self) -> u32 {
        self.get(CollisionSide::Down)
    }

    pub fn left(&self) -> u32 {
        self.get(CollisionSide::Left)
    }

    pub fn right(&self) -> u32 {
        self.get(CollisionSide::Right)
    }

    /// Reset all counters to zero
    pub fn clear(&mut self) {
        self.counts = [0; 4];
    }

    /// Sum of contacts on all sides
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Standing on something
    pub fn is_grounded(&self) -> bool {
        self.down() > 0
    }

    /// Sides with at least one contact
    pub fn sides(&self) -> CollisionSides {
        CollisionSide::ALL
            .iter()
            .filter(|side| self.get(**side) > 0)
            .fold(CollisionSides::empty(), |acc, side| acc | side.flag())
    }
}

/// How a body's move was reconciled with the grid this tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContactKind {
    /// Nothing touched, the swept rect was committed as-is
    #[default]
    None,
    /// Horizontal contact only
    Wall,
    /// Vertical contact only
    FloorOrCeiling,
    /// Horizontal and vertical contact
    ConcaveCorner,
    /// Diagonal move grazing a tile corner above the body
    ConvexCornerAbove,
    /// Diagonal move grazing a tile corner below the body
    ConvexCornerBelow,
}

/// Why a tile shows up in the diagnostics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticReason {
    HorizontalContact(CollisionSide),
    VerticalContact(CollisionSide),
    /// Chosen as the corner tile for a diagonal move
    DiagonalCorner,
    /// The widened probe caught the ledge corner
    FatCatch,
    /// The widened probe missed the ledge corner
    FatMiss,
}

/// One tile touched during resolution, and why
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileDiagnostic {
    pub tile: Rect,
    pub reason: DiagnosticReason,
}

/// Tuning for [`resolve`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolveOptions {
    /// Width multiplier for the convex-corner-below probe
    pub fat_rect_multiplier: f32,
    /// Record a [`TileDiagnostic`] for every tile that influenced the result
    pub collect_diagnostics: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            fat_rect_multiplier: 1.05,
            collect_diagnostics: false,
        }
    }
}

/// Outcome of resolving one body for one tick
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// Rect to commit
    pub rect: Rect,
    /// Velocity to commit
    pub velocity: Vec2,
    pub counters: CollisionCounters,
    pub kind: ContactKind,
    /// Empty unless diagnostics were requested
    pub diagnostics: Vec<TileDiagnostic>,
}

impl Resolution {
    fn unobstructed(rect: Rect, velocity: Vec2) -> Self {
        Self {
            rect,
            velocity,
            counters: CollisionCounters::default(),
            kind: ContactKind::None,
            diagnostics: Vec::new(),
        }
    }

    fn note(&mut self, options: &ResolveOptions, tile: Rect, reason: DiagnosticReason) {
        if options.collect_diagnostics {
            self.diagnostics.push(TileDiagnostic { tile, reason });
        }
    }
}

/// Pick the corner tile for a diagonal move
///
/// Candidates lie on the side the body is travelling toward. Among them the
/// tile whose center is closest to the body's center wins; on a tie the first
/// in enumeration order is kept.
fn diagonal_tile(tiles: &[Rect], body: &Rect, velocity: Vec2) -> Option<Rect> {
    let center = body.center();
    tiles
        .iter()
        .filter(|tile| sign(velocity.x) == sign(tile.x - body.x))
        .min_by(|a, b| {
            let da = (a.center() - center).length_squared();
            let db = (b.center() - center).length_squared();
            da.total_cmp(&db)
        })
        .copied()
}

/// Sweep `current` by `velocity * dt` and reconcile it with the grid
pub fn resolve(
    grid: &TileGrid,
    current: Rect,
    velocity: Vec2,
    dt: f32,
    options: &ResolveOptions,
) -> Resolution {
    let step = velocity * dt;
    let candidate = current.translated(step);
    let mut result = Resolution::unobstructed(candidate, velocity);

    let tiles = grid.tiles_overlapping(&candidate);
    if tiles.is_empty() {
        return result;
    }

    let position = current.origin();
    let nearest = grid.nearest_tile_origin(position);
    let trial_h = current.with_origin(Vec2::new(position.x + step.x, nearest.y));
    let trial_v = current.with_origin(Vec2::new(nearest.x, position.y + step.y));

    let mut horizontal = false;
    let mut vertical = false;
    for tile in &tiles {
        if let Some(side) = CollisionSide::horizontal(velocity.x) {
            if trial_h.intersects(tile) {
                horizontal = true;
                result.counters.increment(side);
                result.note(options, *tile, DiagnosticReason::HorizontalContact(side));
            }
        }
        if let Some(side) = CollisionSide::vertical(velocity.y) {
            if trial_v.intersects(tile) {
                vertical = true;
                result.counters.increment(side);
                result.note(options, *tile, DiagnosticReason::VerticalContact(side));
            }
        }
    }

    match (horizontal, vertical) {
        (true, false) => {
            result.kind = ContactKind::Wall;
            result.rect = current.with_origin(Vec2::new(
                nearest.x - sign(velocity.x) * WALL_NUDGE,
                trial_v.y,
            ));
            result.velocity.x = 0.0;
        }
        (false, true) => {
            result.kind = ContactKind::FloorOrCeiling;
            result.rect = current.with_origin(Vec2::new(trial_h.x, nearest.y));
            result.velocity.y = 0.0;
        }
        (true, true) => {
            result.kind = ContactKind::ConcaveCorner;
            result.rect = current.with_origin(nearest);
            result.velocity = Vec2::ZERO;
        }
        (false, false) => {
            if velocity.x != 0.0 && velocity.y != 0.0 {
                if let Some(diag) = diagonal_tile(&tiles, &current, velocity) {
                    result.note(options, diag, DiagnosticReason::DiagonalCorner);
                    resolve_convex(&mut result, &current, &diag, velocity, step, nearest, trial_h, trial_v, options);
                }
            }
        }
    }

    trace!(
        "resolve: {:?} -> {:?} at ({}, {}) v=({}, {})",
        current.origin(),
        result.kind,
        result.rect.x,
        result.rect.y,
        result.velocity.x,
        result.velocity.y
    );
    result
}

/// Convex corner cases of [`resolve`]
#[allow(clippy::too_many_arguments)]
fn resolve_convex(
    result: &mut Resolution,
    current: &Rect,
    diag: &Rect,
    velocity: Vec2,
    step: Vec2,
    nearest: Vec2,
    trial_h: Rect,
    trial_v: Rect,
    options: &ResolveOptions,
) {
    let falling = velocity.y > 0.0;
    if diag.y < current.y {
        result.kind = ContactKind::ConvexCornerAbove;
        if falling {
            // Slide past the corner
            result.rect = current.with_origin(nearest);
            result.velocity.y = 0.0;
        } else {
            // Bonk: horizontal momentum is kept
            result.rect = current.with_origin(Vec2::new(trial_h.x, nearest.y));
            result.velocity.y = 0.0;
            result.counters.increment(CollisionSide::Up);
        }
    } else if diag.y > current.y {
        result.kind = ContactKind::ConvexCornerBelow;
        if !falling {
            return;
        }
        let probe = current
            .translated(Vec2::new(0.0, step.y))
            .fat(options.fat_rect_multiplier);
        if probe.overlaps(diag) {
            result.note(options, *diag, DiagnosticReason::FatCatch);
            result.rect = current.with_origin(Vec2::new(trial_h.x, nearest.y));
            result.velocity.y = 0.0;
            result.counters.increment(CollisionSide::Down);
        } else {
            // Flush with the ledge face, keep falling
            result.note(options, *diag, DiagnosticReason::FatMiss);
            result.rect = trial_v;
            result.velocity.x = 0.0;
        }
    }
}
