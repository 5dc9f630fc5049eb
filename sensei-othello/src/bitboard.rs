//! Low-level bitboard operations.
//!
//! For efficiency, [`Bitboard`] operations are unchecked and produce inconsistent
//! state if their contracts are not checked by the caller. The only contract most of
//! them share is that the two sides never occupy the same square.
//!
//! Under the hood, all these operations work on u64 bitboards. By convention,
//! square `row * 8 + col` is bit `row * 8 + col`: the LSB is the upper-left of the
//! board (A1) and the MSB is the lower-right (H8).

use crate::{utils, NUM_SPACES};
use derive_more::{
    BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, From, Into, Not,
};
use std::fmt::{self, Display, Formatter};

/// Holds a single bit per location on an Othello board.
/// Wraps [`u64`] for efficient bit-twiddling, but avoids mixing with numerics.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    Default,
    From,
    Into,
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    BitXor,
    BitXorAssign,
    Not,
)]
pub struct Bitboard(u64);

/// Starting bitboard for Black.
pub const BLACK_START: Bitboard = Bitboard(0x0000000810000000);

/// Starting bitboard for White.
pub const WHITE_START: Bitboard = Bitboard(0x0000001008000000);

/// Every square except column A.
pub(crate) const NOT_A_FILE: u64 = 0xfefefefefefefefe;

/// Every square except column H.
pub(crate) const NOT_H_FILE: u64 = 0x7f7f7f7f7f7f7f7f;

const FULL_MASK: u64 = 0xffffffffffffffff;

// Shifts for each direction pair: E/W, S/N, SW/NE, SE/NW.
// The first direction is handled by SHL, the second by SHR.
const SHIFTS: [u32; 4] = [1, 8, 7, 9];

// Masks applied to propagators when left-shifting or right-shifting,
// clipping pieces that would wrap around to the other side of the board.
const LEFT_MASKS: [u64; 4] = [NOT_A_FILE, FULL_MASK, NOT_H_FILE, NOT_A_FILE];
const RIGHT_MASKS: [u64; 4] = [NOT_H_FILE, FULL_MASK, NOT_A_FILE, NOT_H_FILE];

impl Display for Bitboard {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        utils::format_grid(
            self.into_iter().map(|bit| match bit {
                false => '.',
                true => '#',
            }),
            f,
        )
    }
}

impl Bitboard {
    /// The bitboard with no squares set.
    pub const EMPTY: Self = Self(0);

    /// The bitboard with every square set.
    pub const FULL: Self = Self(FULL_MASK);

    /// A bitboard with only the square at `index` set.
    #[inline]
    pub const fn from_index(index: u8) -> Self {
        Self(1 << index)
    }

    /// Count the number of occupied spaces in the bitboard.
    #[inline]
    pub fn count_occupied(self) -> u8 {
        self.0.count_ones() as u8
    }

    /// Count the number of empty spaces in the bitboard.
    #[inline]
    pub fn count_empty(self) -> u8 {
        self.0.count_zeros() as u8
    }

    /// Return true if this bitboard is empty.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Return true if the square at `index` is set.
    #[inline]
    pub fn contains_index(self, index: u8) -> bool {
        self.0 & (1 << index) != 0
    }
}

/// Score a board as: # my pieces - # opponent pieces.
/// Faster than [`score_winner_gets_empties()`], but less common.
/// Undefined behavior if both players have a piece at the same location.
#[inline]
pub fn score_absolute_difference(active: Bitboard, opponent: Bitboard) -> i8 {
    (active.0.count_ones() as i8) - (opponent.0.count_ones() as i8)
}

/// Score a finished game as: # my spaces - # opponent spaces, where empty spaces
/// are scored for the winner. A draw scores 0 regardless of empties.
/// Undefined behavior if both players have a piece at the same location.
#[inline]
pub fn score_winner_gets_empties(active: Bitboard, opponent: Bitboard) -> i8 {
    let absolute_difference = score_absolute_difference(active, opponent);

    if absolute_difference.is_positive() {
        absolute_difference + ((active | opponent).0.count_zeros() as i8)
    } else if absolute_difference.is_negative() {
        absolute_difference - ((active | opponent).0.count_zeros() as i8)
    } else {
        0
    }
}

/// Compute a mask of the legal moves for the active player from
/// masks of the active player's pieces and the opponent's pieces.
/// Undefined behavior if an invalid Othello board is specified.
// Algorithm adapted from Sam Blazes' Coin, released under the Apache 2.0 license:
// https://github.com/Tenebryo/coin/blob/master/bitboard/src/find_moves_fast.rs
#[inline]
pub fn get_move_mask(active: Bitboard, opponent: Bitboard) -> Bitboard {
    // Mask to clip off the invalid wraparound pieces on the edge.
    const EDGE_MASK: u64 = 0x7E7E7E7E7E7E7E7Eu64;

    let opponent_edge_mask = EDGE_MASK & opponent.0;

    // Masks used for each shift direction. The same for SHL and SHR.
    let masks = [
        opponent_edge_mask,
        opponent.0,
        opponent_edge_mask,
        opponent_edge_mask,
    ];

    let mut captures = 0;
    for (&shift, &mask) in SHIFTS.iter().zip(masks.iter()) {
        // Pieces we flip while shifting along each direction.
        let mut flip_l = active.0;
        let mut flip_r = active.0;

        // Accumulated mask when shifting along each direction.
        let mut masks_l = mask & (mask << shift);
        let mut masks_r = mask & (mask >> shift);

        // Smear our pieces in each direction while masking invalid flips.
        flip_l |= mask & (flip_l << shift);
        flip_l |= masks_l & (flip_l << (2 * shift));
        masks_l &= masks_l << (2 * shift);
        flip_l |= masks_l & (flip_l << (4 * shift));

        flip_r |= mask & (flip_r >> shift);
        flip_r |= masks_r & (flip_r >> (2 * shift));
        masks_r &= masks_r >> (2 * shift);
        flip_r |= masks_r & (flip_r >> (4 * shift));

        // One extra shift of all flipped locations lands on candidate moves.
        captures |= ((flip_l & mask) << shift) | ((flip_r & mask) >> shift);
    }

    // Moves are the intersection of empties and captures.
    let empties = !(active | opponent).0;
    Bitboard(empties & captures)
}

/// Occluded fill towards higher bits: smear `gen` through `pro` along `shift`.
#[inline(always)]
fn fill_left(mut gen: u64, mut pro: u64, shift: u32) -> u64 {
    gen |= pro & (gen << shift);
    pro &= pro << shift;
    gen |= pro & (gen << (2 * shift));
    pro &= pro << (2 * shift);
    gen | (pro & (gen << (4 * shift)))
}

/// Occluded fill towards lower bits: smear `gen` through `pro` along `shift`.
#[inline(always)]
fn fill_right(mut gen: u64, mut pro: u64, shift: u32) -> u64 {
    gen |= pro & (gen >> shift);
    pro &= pro >> shift;
    gen |= pro & (gen >> (2 * shift));
    pro &= pro >> (2 * shift);
    gen | (pro & (gen >> (4 * shift)))
}

/// Compute the opponent pieces flipped when the active player moves at `move_mask`.
/// `move_mask` must be a one-hot bitboard on an empty square.
/// An empty result means the move is illegal.
#[inline]
pub fn get_flip(active: Bitboard, opponent: Bitboard, move_mask: Bitboard) -> Bitboard {
    debug_assert_eq!(move_mask.count_occupied(), 1);
    debug_assert!((move_mask & (active | opponent)).is_empty());

    let mut flip_mask = 0;
    for dir in 0..SHIFTS.len() {
        let shift = SHIFTS[dir];
        let pro_left = opponent.0 & LEFT_MASKS[dir];
        let pro_right = opponent.0 & RIGHT_MASKS[dir];

        // Opponent runs that start at the new piece and end at one of ours, both ways.
        flip_mask |=
            fill_left(move_mask.0, pro_left, shift) & fill_right(active.0, pro_right, shift);
        flip_mask |=
            fill_right(move_mask.0, pro_right, shift) & fill_left(active.0, pro_left, shift);
    }

    Bitboard(flip_mask)
}

/// Reference flip computation: walk the eight directions from `index` one square at a time.
/// Slow, but obviously correct; used to validate [`get_flip()`].
pub fn get_flip_basic(active: Bitboard, opponent: Bitboard, index: u8) -> Bitboard {
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

    let row = (index / 8) as i8;
    let col = (index % 8) as i8;
    let mut flip = 0;

    for &(d_row, d_col) in DIRECTIONS.iter() {
        let mut line = 0;
        let (mut r, mut c) = (row + d_row, col + d_col);

        while (0..8).contains(&r) && (0..8).contains(&c) {
            let bit = 1u64 << (r * 8 + c);
            if opponent.0 & bit != 0 {
                line |= bit;
            } else {
                if active.0 & bit != 0 {
                    flip |= line;
                }
                break;
            }
            r += d_row;
            c += d_col;
        }
    }

    Bitboard(flip)
}

/// Reference move generation built on [`get_flip_basic()`].
pub fn get_move_mask_basic(active: Bitboard, opponent: Bitboard) -> Bitboard {
    let empties = !(active | opponent);
    let mut moves = 0;

    for index in 0..NUM_SPACES as u8 {
        if empties.contains_index(index) && !get_flip_basic(active, opponent, index).is_empty() {
            moves |= 1 << index;
        }
    }

    Bitboard(moves)
}

/// Every square adjacent (including diagonally) to a square in `bitboard`.
/// Never wraps around the board edges. The input squares themselves are not included
/// unless they neighbor another input square.
#[inline]
pub fn neighbors(bitboard: Bitboard) -> Bitboard {
    let b = bitboard.0;
    let towards_h = ((b << 1) | (b << 9) | (b >> 7)) & NOT_A_FILE;
    let towards_a = ((b >> 1) | (b >> 9) | (b << 7)) & NOT_H_FILE;

    Bitboard(towards_h | towards_a | (b << 8) | (b >> 8))
}

/// Iterator for the bits in a [`Bitboard`].
#[derive(Clone, Copy, Debug)]
pub struct Bits {
    next_index: usize,
    bitboard: Bitboard,
}

impl Iterator for Bits {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index == NUM_SPACES {
            return None;
        }

        let bit = self.bitboard.contains_index(self.next_index as u8);
        self.next_index += 1;

        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = NUM_SPACES - self.next_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Bits {}

/// Iterate over the bits in row-major order, starting at A1.
impl IntoIterator for Bitboard {
    type Item = bool;
    type IntoIter = Bits;

    fn into_iter(self) -> Self::IntoIter {
        Bits {
            next_index: 0,
            bitboard: self,
        }
    }
}
