//! Level text maps
//!
//! A level is stored as plain text:
//!
//! ```text
//! 6,4
//! ######
//! #@   #
//! #  ..#
//! ######
//! ```
//!
//! The first line is `<cols>,<rows>`. Each following line is one row of exactly
//! `cols` cells: `#` is solid, space or `.` is empty, and `@` is empty and marks
//! the player spawn. Every cell becomes a 2x2 block of tiles in the grid, so
//! the grid is `2*cols` by `2*rows` tiles.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use log::info;
use tilerun_math::Vec2;
use tilerun_physics::TileGrid;

/// Tiles per map cell along each axis
pub const CELL_TILES: i32 = 2;

const SOLID: char = '#';
const EMPTY: char = ' ';
const EMPTY_ALT: char = '.';
const SPAWN: char = '@';

/// Error loading a level map
#[derive(Debug)]
pub enum MapLoadError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Missing or malformed `<cols>,<rows>` header
    Header(String),
    /// Number of rows differs from the header
    RowCount { expected: usize, actual: usize },
    /// A row's length differs from the header
    RowLength { line: usize, expected: usize, actual: usize },
    /// A cell character outside the map alphabet
    BadChar { line: usize, column: usize, ch: char },
    /// More than one `@` in the map
    DuplicateSpawn { line: usize, column: usize },
}

impl fmt::Display for MapLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapLoadError::Io(e) => write!(f, "IO error: {}", e),
            MapLoadError::Header(line) => write!(f, "Bad map header: {:?}", line),
            MapLoadError::RowCount { expected, actual } => {
                write!(f, "Map has {} rows, header says {}", actual, expected)
            }
            MapLoadError::RowLength { line, expected, actual } => write!(
                f,
                "Line {}: row has {} cells, header says {}",
                line, actual, expected
            ),
            MapLoadError::BadChar { line, column, ch } => {
                write!(f, "Line {}, column {}: unknown cell {:?}", line, column, ch)
            }
            MapLoadError::DuplicateSpawn { line, column } => {
                write!(f, "Line {}, column {}: second spawn point", line, column)
            }
        }
    }
}

impl std::error::Error for MapLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapLoadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MapLoadError {
    fn from(e: io::Error) -> Self {
        MapLoadError::Io(e)
    }
}

/// A parsed level: its tile grid and spawn cell
#[derive(Clone, Debug, PartialEq)]
pub struct LevelMap {
    cols: usize,
    rows: usize,
    grid: TileGrid,
    /// Bottom-left tile of the `@` cell
    spawn: Option<(i32, i32)>,
}

impl LevelMap {
    /// Parse map text into a grid with the given tile width
    pub fn parse(text: &str, tile_width: f32) -> Result<Self, MapLoadError> {
        let mut lines = text.lines();
        let header = lines.next().unwrap_or_default();
        let (cols, rows) = parse_header(header)?;

        let mut body: Vec<&str> = lines.collect();
        while body.last().is_some_and(|l| l.is_empty()) {
            body.pop();
        }
        if body.len() != rows {
            return Err(MapLoadError::RowCount {
                expected: rows,
                actual: body.len(),
            });
        }

        let mut grid = TileGrid::new(
            (cols as i32 * CELL_TILES) as u32,
            (rows as i32 * CELL_TILES) as u32,
            tile_width,
        );
        let mut spawn = None;

        for (row, line) in body.iter().enumerate() {
            let line_no = row + 2;
            let cells: Vec<char> = line.chars().collect();
            if cells.len() != cols {
                return Err(MapLoadError::RowLength {
                    line: line_no,
                    expected: cols,
                    actual: cells.len(),
                });
            }

            for (col, &ch) in cells.iter().enumerate() {
                let solid = match ch {
                    SOLID => true,
                    EMPTY | EMPTY_ALT => false,
                    SPAWN => {
                        if spawn.is_some() {
                            return Err(MapLoadError::DuplicateSpawn {
                                line: line_no,
                                column: col + 1,
                            });
                        }
                        spawn = Some((
                            col as i32 * CELL_TILES,
                            row as i32 * CELL_TILES + CELL_TILES - 1,
                        ));
                        false
                    }
                    other => {
                        return Err(MapLoadError::BadChar {
                            line: line_no,
                            column: col + 1,
                            ch: other,
                        })
                    }
                };
                fill_cell(&mut grid, col, row, solid);
            }
        }

        Ok(Self {
            cols,
            rows,
            grid,
            spawn,
        })
    }

    /// Load a map file
    pub fn load<P: AsRef<Path>>(path: P, tile_width: f32) -> Result<Self, MapLoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let map = Self::parse(&text, tile_width)?;
        info!(
            "Loaded level {} ({}x{} cells, {} solid tiles)",
            path.display(),
            map.cols,
            map.rows,
            map.grid.solid_count()
        );
        Ok(map)
    }

    /// An empty map of `cols` x `rows` cells with a solid border
    pub fn bordered(cols: usize, rows: usize, tile_width: f32) -> Self {
        let mut grid = TileGrid::new(
            (cols as i32 * CELL_TILES) as u32,
            (rows as i32 * CELL_TILES) as u32,
            tile_width,
        );
        for row in 0..rows {
            for col in 0..cols {
                let edge = row == 0 || col == 0 || row + 1 == rows || col + 1 == cols;
                fill_cell(&mut grid, col, row, edge);
            }
        }
        Self {
            cols,
            rows,
            grid,
            spawn: None,
        }
    }

    /// Write the map back to text
    ///
    /// A cell is written solid when its top-left tile is solid.
    pub fn to_text(&self) -> String {
        let mut out = format!("{},{}\n", self.cols, self.rows);
        for row in 0..self.rows {
            for col in 0..self.cols {
                let tx = col as i32 * CELL_TILES;
                let ty = row as i32 * CELL_TILES;
                let ch = if self.spawn == Some((tx, ty + CELL_TILES - 1)) {
                    SPAWN
                } else if self.grid.is_solid(tx, ty) {
                    SOLID
                } else {
                    EMPTY
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }

    /// Width in cells
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Height in cells
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn into_grid(self) -> TileGrid {
        self.grid
    }

    /// Tile coordinates of the spawn marker (bottom-left tile of the `@` cell)
    pub fn spawn_tile(&self) -> Option<(i32, i32)> {
        self.spawn
    }

    /// Move the spawn marker to a cell
    pub fn set_spawn_cell(&mut self, col: usize, row: usize) {
        self.spawn = Some((
            col as i32 * CELL_TILES,
            row as i32 * CELL_TILES + CELL_TILES - 1,
        ));
    }

    /// Top-left position that rests a body `height_tiles` tall on the floor
    /// of the spawn cell
    pub fn spawn_position(&self, height_tiles: u32) -> Option<Vec2> {
        self.spawn.map(|(tx, ty)| {
            let feet = self.grid.tile_to_world(tx, ty + 1, 0.0);
            Vec2::new(feet.x, feet.y - height_tiles as f32 * self.grid.tile_width())
        })
    }
}

fn parse_header(line: &str) -> Result<(usize, usize), MapLoadError> {
    let bad = || MapLoadError::Header(line.to_string());
    let (cols, rows) = line.trim().split_once(',').ok_or_else(bad)?;
    let cols = cols.trim().parse::<usize>().map_err(|_| bad())?;
    let rows = rows.trim().parse::<usize>().map_err(|_| bad())?;
    Ok((cols, rows))
}

fn fill_cell(grid: &mut TileGrid, col: usize, row: usize, solid: bool) {
    for dy in 0..CELL_TILES {
        for dx in 0..CELL_TILES {
            grid.set_solid(
                col as i32 * CELL_TILES + dx,
                row as i32 * CELL_TILES + dy,
                solid,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "4,3\n####\n#@ #\n####\n";

    #[test]
    fn test_parse_small_map() {
        let map = LevelMap::parse(SMALL, 16.0).unwrap();
        assert_eq!(map.cols(), 4);
        assert_eq!(map.rows(), 3);
        assert_eq!(map.grid().width(), 8);
        assert_eq!(map.grid().height(), 6);

        // Each cell is a 2x2 block
        assert!(map.grid().is_solid(0, 0));
        assert!(map.grid().is_solid(1, 1));
        assert!(!map.grid().is_solid(2, 2));
        assert!(!map.grid().is_solid(5, 3));
        assert!(map.grid().is_solid(6, 2));
        assert_eq!(map.grid().solid_count(), 48 - 8);
    }

    #[test]
    fn test_spawn_tile_and_position() {
        let map = LevelMap::parse(SMALL, 16.0).unwrap();
        assert_eq!(map.spawn_tile(), Some((2, 3)));

        // Floor of the spawn cell is at tile row 4 (y = 64)
        assert_eq!(map.spawn_position(1), Some(Vec2::new(32.0, 48.0)));
        assert_eq!(map.spawn_position(2), Some(Vec2::new(32.0, 32.0)));
    }

    #[test]
    fn test_dot_is_empty_and_trailing_blank_lines() {
        let map = LevelMap::parse("2,1\n.#\n\n\n", 8.0).unwrap();
        assert!(!map.grid().is_solid(0, 0));
        assert!(map.grid().is_solid(2, 1));
        assert_eq!(map.spawn_tile(), None);
        assert_eq!(map.spawn_position(1), None);
    }

    #[test]
    fn test_crlf_line_endings() {
        let map = LevelMap::parse("2,1\r\n#@\r\n", 16.0).unwrap();
        assert_eq!(map.spawn_tile(), Some((2, 1)));
    }

    #[test]
    fn test_bad_header() {
        for text in ["", "four,3\n", "4\n", "4,x\n"] {
            let err = LevelMap::parse(text, 16.0).unwrap_err();
            assert!(matches!(err, MapLoadError::Header(_)), "{:?} gave {:?}", text, err);
        }
    }

    #[test]
    fn test_row_count_mismatch() {
        let err = LevelMap::parse("2,3\n##\n##\n", 16.0).unwrap_err();
        assert!(matches!(err, MapLoadError::RowCount { expected: 3, actual: 2 }));
    }

    #[test]
    fn test_row_length_mismatch() {
        let err = LevelMap::parse("3,2\n###\n##\n", 16.0).unwrap_err();
        assert!(matches!(
            err,
            MapLoadError::RowLength { line: 3, expected: 3, actual: 2 }
        ));
    }

    #[test]
    fn test_bad_char_reports_location() {
        let err = LevelMap::parse("3,2\n###\n#x#\n", 16.0).unwrap_err();
        assert!(matches!(
            err,
            MapLoadError::BadChar { line: 3, column: 2, ch: 'x' }
        ));
        assert!(err.to_string().contains("column 2"));
    }

    #[test]
    fn test_duplicate_spawn() {
        let err = LevelMap::parse("3,1\n@ @\n", 16.0).unwrap_err();
        assert!(matches!(err, MapLoadError::DuplicateSpawn { line: 2, column: 3 }));
    }

    #[test]
    fn test_to_text_roundtrip() {
        let map = LevelMap::parse(SMALL, 16.0).unwrap();
        assert_eq!(map.to_text(), SMALL);

        let with_dots = LevelMap::parse("3,1\n#.@\n", 16.0).unwrap();
        assert_eq!(with_dots.to_text(), "3,1\n# @\n");
    }

    #[test]
    fn test_bordered() {
        let mut map = LevelMap::bordered(4, 3, 16.0);
        assert_eq!(map.spawn_tile(), None);
        map.set_spawn_cell(1, 1);
        assert_eq!(map.to_text(), SMALL);
    }

    #[test]
    fn test_load_missing_file() {
        let err = LevelMap::load("does/not/exist.txt", 16.0).unwrap_err();
        assert!(matches!(err, MapLoadError::Io(_)));
    }
}
