//! Core Othello game logic on a pair of bitboards, seen from the side to move.

use crate::bitboard::{self, Bitboard, BLACK_START, WHITE_START};
use crate::location::{Location, LocationList};
use crate::utils;
use derive_more::{Display, Error};
use std::fmt;

/// A position from the perspective of the player to move.
///
/// Boards are values: making a move or passing returns a new board with the
/// sides swapped, so the player to move is always `player`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Board {
    pub player: Bitboard,
    pub opponent: Bitboard,
}

#[derive(Debug, PartialEq, Error, Display)]
pub enum ParseBoardError {
    InvalidCharacter,
    WrongCellCount,
    InvalidMove,
    IllegalMove,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The starting position, with Black to move.
    pub const fn new() -> Self {
        Self {
            player: BLACK_START,
            opponent: WHITE_START,
        }
    }

    /// Build a board from the two sides' pieces. The bitboards must be disjoint.
    #[inline]
    pub fn from_bitboards(player: Bitboard, opponent: Bitboard) -> Self {
        debug_assert!((player & opponent).is_empty());
        Self { player, opponent }
    }

    /// Replay a sequence of moves like "e6f4c3" from the starting position.
    /// Passes are inserted automatically when the side to move has no legal move.
    pub fn from_sequence(sequence: &str) -> Result<Self, ParseBoardError> {
        let cells: Vec<char> = sequence.chars().filter(|c| !c.is_whitespace()).collect();
        if cells.len() % 2 != 0 {
            return Err(ParseBoardError::InvalidMove);
        }

        let mut board = Self::new();
        for pair in cells.chunks(2) {
            let notation: String = pair.iter().collect();
            let loc: Location = notation.parse().or(Err(ParseBoardError::InvalidMove))?;

            if board.have_to_pass() {
                board = board.pass();
            }
            if !board.get_moves().contains(loc) {
                return Err(ParseBoardError::IllegalMove);
            }
            board = board.play(loc);
        }

        Ok(board)
    }

    /// Swap sides without placing a piece.
    #[inline]
    pub fn pass(self) -> Self {
        Self {
            player: self.opponent,
            opponent: self.player,
        }
    }

    /// Get the legal moves for the player to move.
    #[inline]
    pub fn get_moves(self) -> LocationList {
        LocationList::from(bitboard::get_move_mask(self.player, self.opponent))
    }

    /// Count the legal moves for the player to move.
    #[inline]
    pub fn n_moves(self) -> u8 {
        bitboard::get_move_mask(self.player, self.opponent).count_occupied()
    }

    /// The opponent pieces flipped by playing at `loc`. Empty iff the move is illegal.
    /// `loc` must be an empty square.
    #[inline]
    pub fn get_flip(self, loc: Location) -> Bitboard {
        bitboard::get_flip(self.player, self.opponent, loc.into())
    }

    /// Play at `loc` with a flip set already computed by [`Board::get_flip()`].
    #[inline]
    pub fn play_flip(self, loc: Location, flip: Bitboard) -> Self {
        debug_assert!(!flip.is_empty());
        let move_mask: Bitboard = loc.into();

        Self {
            player: self.opponent ^ flip,
            opponent: self.player | flip | move_mask,
        }
    }

    /// Make a move for the player to move. The move must be legal.
    #[inline]
    pub fn play(self, loc: Location) -> Self {
        self.play_flip(loc, self.get_flip(loc))
    }

    /// True if the player to move has no legal move.
    #[inline]
    pub fn have_to_pass(self) -> bool {
        bitboard::get_move_mask(self.player, self.opponent).is_empty()
    }

    /// True if neither side can move.
    #[inline]
    pub fn is_game_over(self) -> bool {
        self.have_to_pass() && self.pass().have_to_pass()
    }

    /// Score a board as: # my pieces - # opponent pieces.
    #[inline]
    pub fn score_absolute_difference(self) -> i8 {
        bitboard::score_absolute_difference(self.player, self.opponent)
    }

    /// Final score of a finished game for the player to move: the disk difference,
    /// with the empty squares awarded to the leader.
    #[inline]
    pub fn game_over_eval(self) -> i8 {
        bitboard::score_winner_gets_empties(self.player, self.opponent)
    }

    /// Get a mask indicating where the occupied spaces are.
    #[inline]
    pub fn occupied_mask(self) -> Bitboard {
        self.player | self.opponent
    }

    /// Get a mask indicating where the empty spaces are.
    #[inline]
    pub fn empty_mask(self) -> Bitboard {
        !self.occupied_mask()
    }

    /// Count the empty squares.
    #[inline]
    pub fn count_empty(self) -> u8 {
        self.occupied_mask().count_empty()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pieces = self
            .player
            .into_iter()
            .zip(self.opponent.into_iter())
            .map(|pieces| match pieces {
                (true, false) => 'X',
                (false, true) => 'O',
                (false, false) => '-',
                (true, true) => '?',
            });

        utils::format_grid(pieces, f)
    }
}

/// Parse 64 cells in reading order (A1, B1, ..., H8).
/// `X`, `*` and `b` mark the player to move, `O` and `w` the opponent, `-` and `.` empties.
/// Whitespace and `/` row separators are ignored.
impl std::str::FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut player = 0u64;
        let mut opponent = 0u64;
        let mut index = 0;

        for c in s.chars().filter(|&c| !c.is_whitespace() && c != '/') {
            if index == 64 {
                return Err(ParseBoardError::WrongCellCount);
            }

            match c {
                'X' | 'x' | '*' | 'b' | 'B' => player |= 1 << index,
                'O' | 'o' | 'w' | 'W' => opponent |= 1 << index,
                '-' | '.' => {}
                _ => return Err(ParseBoardError::InvalidCharacter),
            }
            index += 1;
        }

        if index != 64 {
            return Err(ParseBoardError::WrongCellCount);
        }

        Ok(Self::from_bitboards(player.into(), opponent.into()))
    }
}
