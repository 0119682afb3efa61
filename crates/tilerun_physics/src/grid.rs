//! Static tile geometry
//!
//! A [`TileGrid`] is a boolean occupancy field over square tiles of a fixed
//! world-space width. Tile (0, 0) sits at world (0, 0); y grows downward.
//! The grid is read-only while the simulation ticks; editors mutate it between
//! ticks only.

use std::fmt;

use tilerun_math::{Rect, Vec2};

/// Fractional offset used by [`TileGrid::tile_to_world`] to address a tile's center
pub const TILE_CENTER_OFFSET: f32 = 0.5;

/// Error building a grid from raw cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The cell buffer length does not equal `width * height`
    CellCountMismatch { expected: usize, actual: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::CellCountMismatch { expected, actual } => write!(
                f,
                "Tile grid cell count mismatch: expected {}, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for GridError {}

/// Uniform grid of solid/empty tiles
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_width: f32,
    /// Row-major occupancy, addressed `x + width * y`
    cells: Vec<bool>,
}

impl TileGrid {
    /// Create an empty grid
    ///
    /// # Panics
    /// Panics if `tile_width` is not positive.
    pub fn new(width: u32, height: u32, tile_width: f32) -> Self {
        assert!(tile_width > 0.0, "tile width must be positive, got {}", tile_width);
        Self {
            width,
            height,
            tile_width,
            cells: vec![false; width as usize * height as usize],
        }
    }

    /// Create a grid from a row-major cell buffer
    pub fn from_cells(
        width: u32,
        height: u32,
        tile_width: f32,
        cells: Vec<bool>,
    ) -> Result<Self, GridError> {
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(GridError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }
        let mut grid = Self::new(width, height, tile_width);
        grid.cells = cells;
        Ok(grid)
    }

    /// Create a grid whose outermost ring of tiles is solid
    pub fn bordered(width: u32, height: u32, tile_width: f32) -> Self {
        let mut grid = Self::new(width, height, tile_width);
        for ty in 0..height as i32 {
            for tx in 0..width as i32 {
                let edge = tx == 0
                    || ty == 0
                    || tx == width as i32 - 1
                    || ty == height as i32 - 1;
                grid.set_solid(tx, ty, edge);
            }
        }
        grid
    }

    /// Width in tiles
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles
    pub fn height(&self) -> u32 {
        self.height
    }

    /// World-space size of one tile
    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    /// Number of solid tiles inside the grid
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|&&solid| solid).count()
    }

    fn index(&self, tx: i32, ty: i32) -> Option<usize> {
        if tx < 0 || ty < 0 || tx >= self.width as i32 || ty >= self.height as i32 {
            None
        } else {
            Some(tx as usize + self.width as usize * ty as usize)
        }
    }

    /// Whether tile `(tx, ty)` is solid
    ///
    /// Tiles outside the grid report solid, so the map edge acts as a wall.
    pub fn is_solid(&self, tx: i32, ty: i32) -> bool {
        match self.index(tx, ty) {
            Some(i) => self.cells[i],
            None => true,
        }
    }

    /// Set a tile's occupancy. Returns `false` if the tile is outside the grid.
    pub fn set_solid(&mut self, tx: i32, ty: i32, solid: bool) -> bool {
        match self.index(tx, ty) {
            Some(i) => {
                self.cells[i] = solid;
                true
            }
            None => false,
        }
    }

    /// Tile coordinates containing a world position (floor division)
    pub fn world_to_tile(&self, position: Vec2) -> (i32, i32) {
        let tile = (position / self.tile_width).floor();
        (tile.x as i32, tile.y as i32)
    }

    /// World position of a tile, offset by a fraction of a tile on both axes
    ///
    /// An offset of `0.0` gives the tile origin, [`TILE_CENTER_OFFSET`] its center.
    pub fn tile_to_world(&self, tx: i32, ty: i32, offset: f32) -> Vec2 {
        Vec2::new(
            (tx as f32 + offset) * self.tile_width,
            (ty as f32 + offset) * self.tile_width,
        )
    }

    /// World-space rect covering one tile
    pub fn tile_rect(&self, tx: i32, ty: i32) -> Rect {
        let origin = self.tile_to_world(tx, ty, 0.0);
        Rect::new(origin.x, origin.y, self.tile_width, self.tile_width)
    }

    /// Tile boundary nearest to a world position
    ///
    /// Rounds each axis by adding half a tile before flooring.
    pub fn nearest_tile_origin(&self, position: Vec2) -> Vec2 {
        let half = Vec2::splat(self.tile_width * 0.5);
        ((position + half) / self.tile_width).floor() * self.tile_width
    }

    /// World-space rects of every solid tile in the tile range a rect spans
    ///
    /// The range runs from the tile containing the rect's origin to the tile
    /// containing its far corner, inclusive, enumerated column by column.
    /// Returns an empty list when no solid tile is in range.
    pub fn tiles_overlapping(&self, rect: &Rect) -> Vec<Rect> {
        let (min_x, min_y) = self.world_to_tile(rect.origin());
        let (max_x, max_y) = self.world_to_tile(rect.origin() + rect.dimensions());

        let span = (max_x - min_x + 1).max(0) as usize * (max_y - min_y + 1).max(0) as usize;
        let mut tiles = Vec::with_capacity(span);
        for tx in min_x..=max_x {
            for ty in min_y..=max_y {
                if self.is_solid(tx, ty) {
                    tiles.push(self.tile_rect(tx, ty));
                }
            }
        }
        tiles
    }
}
