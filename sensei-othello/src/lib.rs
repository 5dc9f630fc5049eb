//! `sensei-othello` holds the bitboard primitives of an Othello solver.
//!
//! This package implements two levels of abstraction:
//!
//!  - [`bitboard`] contains the raw, unchecked operations on pairs of bitboards:
//!    move generation, flips, scoring and neighbors.
//!  - [`Board`] implements the game logic in the same fast, unchecked way, as an
//!    immutable value seen from the side to move.
//!
//! On top of these, [`stable`] bounds the final score through stable disks,
//! [`symmetry`] maps boards through the eight symmetries of the square, and
//! [`hash`] hashes positions row by row for transposition tables.
//!
//! Square `row * 8 + col` is bit `row * 8 + col`, with A1 the upper-left corner.

pub mod bitboard;
pub mod hash;
pub mod stable;
pub mod symmetry;
pub mod test_utils;

mod board;
mod location;
mod utils;

pub use bitboard::Bitboard;
pub use board::*;
pub use location::*;

/// The number of spaces on one edge of an Othello board.
pub const EDGE_LENGTH: usize = 8;

/// The number of spaces on an Othello board.
pub const NUM_SPACES: usize = 64;

/// Build the process-wide lookup tables (edge stability, hash keys).
/// Call once before starting search threads; later calls are free.
pub fn init() {
    stable::init();
    hash::init();
}
