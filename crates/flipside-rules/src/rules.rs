//! Legality, capture, and terminal-state rules.
//!
//! Every direction is scanned with a bounded iterative walk that checks
//! bounds before each step, so cost is fixed (8 directions, at most 6
//! steps each) and termination does not depend on board contents.

use serde::{Deserialize, Serialize};

use crate::{Board, Cell, Color, Coord, CELLS};

/// The eight scan directions as `(dr, dc)` offsets.
const DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Why a proposed placement is not a legal move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// The coordinate is off the board.
    #[error("coordinate {0} is off the board")]
    OutOfBounds(Coord),

    /// The target cell already holds a disc.
    #[error("cell {0} is occupied")]
    Occupied(Coord),

    /// The placement captures nothing in any direction.
    #[error("placement at {0} captures no discs")]
    NoCapture(Coord),
}

/// The result of a finished game, by disc count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Light,
    Dark,
    Draw,
}

impl Board {
    /// Number of opposing discs a disc of `color` placed at `from` would
    /// flip in direction `(dr, dc)`.
    ///
    /// Zero means the run is not capturing: it is empty, reaches the board
    /// edge, or hits an empty cell before a disc of `color`.
    fn capture_run(&self, color: Color, from: Coord, dr: i8, dc: i8) -> usize {
        let mut cur = from;
        let mut run = 0;
        loop {
            cur = match cur.step(dr, dc) {
                Some(next) => next,
                None => return 0, // ran off the board
            };
            match self.cell(cur) {
                Some(Cell::Disc(c)) if c == color.opposite() => run += 1,
                Some(Cell::Disc(_)) => return run, // terminated by own color
                _ => return 0, // empty cell breaks the run
            }
        }
    }

    /// Returns `true` if `color` may legally place a disc at `coord`.
    pub fn is_legal(&self, color: Color, coord: Coord) -> bool {
        match self.cell(coord) {
            Some(Cell::Empty) => DIRECTIONS
                .iter()
                .any(|&(dr, dc)| self.capture_run(color, coord, dr, dc) > 0),
            _ => false,
        }
    }

    /// All cells where `color` may legally place a disc.
    pub fn legal_moves(&self, color: Color) -> Vec<Coord> {
        Board::coords()
            .filter(|&coord| self.is_legal(color, coord))
            .collect()
    }

    /// Returns `true` if `color` has at least one legal move.
    pub fn has_legal_move(&self, color: Color) -> bool {
        Board::coords().any(|coord| self.is_legal(color, coord))
    }

    /// Places a disc of `color` at `coord` and flips every captured run,
    /// returning the resulting board. The original board is untouched.
    ///
    /// Directions are resolved independently: a run terminated by the edge
    /// or an empty cell flips nothing in that direction, while a single
    /// placement may capture in several directions at once. Illegal
    /// placements fail before any mutation.
    pub fn apply_move(
        &self,
        color: Color,
        coord: Coord,
    ) -> Result<Board, MoveError> {
        if !coord.in_bounds() {
            return Err(MoveError::OutOfBounds(coord));
        }
        if self.cell(coord) != Some(Cell::Empty) {
            return Err(MoveError::Occupied(coord));
        }

        let runs: Vec<(i8, i8, usize)> = DIRECTIONS
            .iter()
            .map(|&(dr, dc)| (dr, dc, self.capture_run(color, coord, dr, dc)))
            .filter(|&(_, _, run)| run > 0)
            .collect();
        if runs.is_empty() {
            return Err(MoveError::NoCapture(coord));
        }

        let mut next = *self;
        next.set(coord, Cell::Disc(color));
        for (dr, dc, run) in runs {
            let mut cur = coord;
            for _ in 0..run {
                // capture_run already verified every step stays on the board
                cur = match cur.step(dr, dc) {
                    Some(c) => c,
                    None => break,
                };
                next.set(cur, Cell::Disc(color));
            }
        }
        Ok(next)
    }

    /// Returns `true` when the game is over: the board is full or neither
    /// color has a legal move.
    pub fn is_terminal(&self) -> bool {
        self.occupied() == CELLS
            || (!self.has_legal_move(Color::Dark)
                && !self.has_legal_move(Color::Light))
    }

    /// The outcome by disc count. Ties resolve to [`Outcome::Draw`].
    pub fn winner(&self) -> Outcome {
        let (light, dark) = self.counts();
        match light.cmp(&dark) {
            std::cmp::Ordering::Greater => Outcome::Light,
            std::cmp::Ordering::Less => Outcome::Dark,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}
