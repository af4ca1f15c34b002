//! Board representation: cells, colors, coordinates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EDGE;

/// One of the two disc colors. Dark moves first in a standard game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    /// Returns the opposing color.
    pub fn opposite(self) -> Color {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Light => write!(f, "light"),
            Color::Dark => write!(f, "dark"),
        }
    }
}

/// The contents of a single board cell.
///
/// On the wire a cell is one of the strings `"empty"`, `"light"`, `"dark"`,
/// so serde goes through a custom impl rather than the default enum tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Disc(Color),
}

impl Cell {
    /// Wire representation of this cell.
    pub fn as_str(self) -> &'static str {
        match self {
            Cell::Empty => "empty",
            Cell::Disc(Color::Light) => "light",
            Cell::Disc(Color::Dark) => "dark",
        }
    }

    /// Returns `true` if the cell holds no disc.
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl Serialize for Cell {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "empty" => Ok(Cell::Empty),
            "light" => Ok(Cell::Disc(Color::Light)),
            "dark" => Ok(Cell::Disc(Color::Dark)),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["empty", "light", "dark"],
            )),
        }
    }
}

/// A 0-based (row, col) board coordinate.
///
/// `Coord` does not validate its fields on construction; operations that
/// take a `Coord` bounds-check it and report out-of-range placements as
/// errors rather than panicking on hostile input.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns `true` if the coordinate lies on the board.
    pub fn in_bounds(self) -> bool {
        self.row < EDGE && self.col < EDGE
    }

    /// Moves one step in direction `(dr, dc)`, or `None` at the edge.
    ///
    /// Bounds are checked before the step is taken, so a walk along a
    /// direction can never index off the board.
    pub(crate) fn step(self, dr: i8, dc: i8) -> Option<Coord> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if (0..EDGE as i8).contains(&row) && (0..EDGE as i8).contains(&col)
        {
            Some(Coord::new(row as usize, col as usize))
        } else {
            None
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// An 8×8 Othello board.
///
/// Serializes as the bare row-major grid, so snapshots carry an array
/// of arrays of cell strings with no wrapper object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    grid: [[Cell; EDGE]; EDGE],
}

impl Board {
    /// Returns an entirely empty board.
    pub fn empty() -> Self {
        Self {
            grid: [[Cell::Empty; EDGE]; EDGE],
        }
    }

    /// Returns the standard Othello starting position: the four center
    /// cells pre-filled in the canonical diagonal pattern.
    pub fn standard_start() -> Self {
        let mut board = Self::empty();
        board.grid[3][3] = Cell::Disc(Color::Light);
        board.grid[3][4] = Cell::Disc(Color::Dark);
        board.grid[4][3] = Cell::Disc(Color::Dark);
        board.grid[4][4] = Cell::Disc(Color::Light);
        board
    }

    /// Returns the cell at `coord`, or `None` if out of bounds.
    pub fn cell(&self, coord: Coord) -> Option<Cell> {
        if coord.in_bounds() {
            Some(self.grid[coord.row][coord.col])
        } else {
            None
        }
    }

    pub(crate) fn set(&mut self, coord: Coord, cell: Cell) {
        self.grid[coord.row][coord.col] = cell;
    }

    /// The raw grid, row-major. This is the shape snapshots carry.
    pub fn grid(&self) -> &[[Cell; EDGE]; EDGE] {
        &self.grid
    }

    /// Iterates over every coordinate on the board, row-major.
    pub fn coords() -> impl Iterator<Item = Coord> {
        (0..EDGE).flat_map(|row| (0..EDGE).map(move |col| Coord::new(row, col)))
    }

    /// Counts `(light, dark)` discs.
    pub fn counts(&self) -> (usize, usize) {
        let mut light = 0;
        let mut dark = 0;
        for row in &self.grid {
            for cell in row {
                match cell {
                    Cell::Disc(Color::Light) => light += 1,
                    Cell::Disc(Color::Dark) => dark += 1,
                    Cell::Empty => {}
                }
            }
        }
        (light, dark)
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        let (light, dark) = self.counts();
        light + dark
    }
}

/// Failed to parse a board diagram.
#[derive(Debug, thiserror::Error)]
pub enum ParseBoardError {
    /// The diagram did not have exactly eight rows.
    #[error("expected 8 rows, got {0}")]
    WrongRowCount(usize),

    /// A row did not have exactly eight cells.
    #[error("row {row} has {len} cells, expected 8")]
    WrongRowLength { row: usize, len: usize },

    /// An unrecognized cell character.
    #[error("unknown cell character {0:?} (expected '.', 'x', or 'o')")]
    UnknownCell(char),
}

/// Parses a board from an 8-line diagram: `.` empty, `x` dark, `o` light.
/// Blank lines and leading/trailing whitespace per line are ignored.
///
/// ```
/// use flipside_rules::Board;
///
/// let start: Board = "
///     ........
///     ........
///     ........
///     ...ox...
///     ...xo...
///     ........
///     ........
///     ........
/// ".parse().unwrap();
/// assert_eq!(start, Board::standard_start());
/// ```
impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if rows.len() != EDGE {
            return Err(ParseBoardError::WrongRowCount(rows.len()));
        }

        let mut board = Board::empty();
        for (r, line) in rows.iter().enumerate() {
            if line.chars().count() != EDGE {
                return Err(ParseBoardError::WrongRowLength {
                    row: r,
                    len: line.chars().count(),
                });
            }
            for (c, ch) in line.chars().enumerate() {
                board.grid[r][c] = match ch {
                    '.' => Cell::Empty,
                    'x' => Cell::Disc(Color::Dark),
                    'o' => Cell::Disc(Color::Light),
                    other => {
                        return Err(ParseBoardError::UnknownCell(other));
                    }
                };
            }
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.grid {
            for cell in row {
                let ch = match cell {
                    Cell::Empty => '.',
                    Cell::Disc(Color::Dark) => 'x',
                    Cell::Disc(Color::Light) => 'o',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
