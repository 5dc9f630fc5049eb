//! The eight symmetries of the board.

use crate::bitboard::Bitboard;
use crate::board::Board;

/// Flip rows: row 1 becomes row 8.
#[inline]
pub fn vertical_mirror(bitboard: Bitboard) -> Bitboard {
    Bitboard::from(u64::from(bitboard).swap_bytes())
}

/// Flip columns: column A becomes column H.
#[inline]
pub fn horizontal_mirror(bitboard: Bitboard) -> Bitboard {
    Bitboard::from(u64::from(bitboard).reverse_bits().swap_bytes())
}

/// Mirror along the A1-H8 diagonal: (row, col) becomes (col, row).
#[inline]
pub fn transpose(bitboard: Bitboard) -> Bitboard {
    let mut b = u64::from(bitboard);

    // Swap 1x1, then 2x2, then 4x4 blocks across the diagonal.
    let t = (b ^ (b >> 7)) & 0x00aa00aa00aa00aa;
    b ^= t ^ (t << 7);
    let t = (b ^ (b >> 14)) & 0x0000cccc0000cccc;
    b ^= t ^ (t << 14);
    let t = (b ^ (b >> 28)) & 0x00000000f0f0f0f0;
    b ^= t ^ (t << 28);

    Bitboard::from(b)
}

/// Rotate by 90 degrees counter-clockwise: (row, col) becomes (7 - col, row).
#[inline]
pub fn rotate(bitboard: Bitboard) -> Bitboard {
    vertical_mirror(transpose(bitboard))
}

/// All eight images of `bitboard`: four rotations, then the same four after a horizontal mirror.
pub fn all_transforms(bitboard: Bitboard) -> [Bitboard; 8] {
    let mut result = [bitboard; 8];

    for i in 1..4 {
        result[i] = rotate(result[i - 1]);
    }
    result[4] = horizontal_mirror(bitboard);
    for i in 5..8 {
        result[i] = rotate(result[i - 1]);
    }

    result
}

impl Board {
    /// All eight symmetric images of this board, in the order of [`all_transforms()`].
    pub fn all_symmetries(self) -> [Board; 8] {
        let players = all_transforms(self.player);
        let opponents = all_transforms(self.opponent);
        let mut result = [self; 8];

        for i in 0..8 {
            result[i] = Board::from_bitboards(players[i], opponents[i]);
        }

        result
    }
}
