//! Othello board and rules engine for Flipside.
//!
//! This crate is pure computation: no I/O, no async, no shared state.
//! It provides two layers:
//!
//! - [`Board`] — an 8×8 grid of [`Cell`]s with parsing and display support.
//!   A board is immutable except through [`Board::apply_move`], which
//!   returns the resulting board instead of mutating in place.
//! - The rules operations on a board — [`Board::legal_moves`],
//!   [`Board::apply_move`], [`Board::is_terminal`], [`Board::winner`] —
//!   implemented as bounded per-direction scans (no recursion).
//!
//! Higher layers own turn order and player identity; this crate only
//! answers "is this placement legal, and what does it flip?".

mod board;
mod rules;

pub use board::{Board, Cell, Color, Coord, ParseBoardError};
pub use rules::{MoveError, Outcome};

/// The number of cells on one edge of the board.
pub const EDGE: usize = 8;

/// The total number of cells on the board.
pub const CELLS: usize = EDGE * EDGE;
