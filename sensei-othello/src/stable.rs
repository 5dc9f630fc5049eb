//! Stable disks: pieces that cannot be flipped for the rest of the game.
//!
//! The computation is conservative. It finds:
//!  - edge disks that are stable within their edge, from a table over all
//!    one-dimensional 8-square configurations;
//!  - disks whose four lines (row, column, both diagonals) are all full;
//!  - interior disks of `player` that, in each of the four directions, touch a full
//!    line or an already-stable disk of their own color. This grows to a fixed point.
//!
//! The result bounds the final score: the opponent keeps every stable opponent disk.

use crate::bitboard::{Bitboard, NOT_A_FILE, NOT_H_FILE};
use crate::utils::row_byte;
use once_cell::sync::Lazy;
use std::time::Instant;

#[cfg(any(test, all(target_arch = "x86_64", target_feature = "bmi2")))]
const COLUMN_A: u64 = 0x0101010101010101;
const NON_EDGE: u64 = 0x007e7e7e7e7e7e00;

// Masks dropping the columns a row shift of 2 or 4 would wrap into.
const NOT_AB_FILES: u64 = 0xfcfcfcfcfcfcfcfc;
const NOT_GH_FILES: u64 = 0x3f3f3f3f3f3f3f3f;
const NOT_A_TO_D_FILES: u64 = 0xf0f0f0f0f0f0f0f0;
const NOT_E_TO_H_FILES: u64 = 0x0f0f0f0f0f0f0f0f;

/// Stable squares of every 8-square line, indexed by [`edge_index()`].
static EDGE_STABLE: Lazy<Box<[u8]>> = Lazy::new(build_edge_table);

/// Force construction of the edge table.
pub fn init() {
    Lazy::force(&EDGE_STABLE);
}

#[inline(always)]
fn edge_index(player: u8, opponent: u8) -> usize {
    player as usize | (opponent as usize) << 8
}

/// Pieces of `opponent` flipped on a single line when `player` plays at `square`.
fn line_flip(square: i32, player: u8, opponent: u8) -> u8 {
    let mut flip = 0;

    for &step in [-1, 1].iter() {
        let mut captured = 0;
        let mut i = square + step;
        while (0..8).contains(&i) {
            let bit = 1u8 << i;
            if opponent & bit != 0 {
                captured |= bit;
            } else {
                if player & bit != 0 {
                    flip |= captured;
                }
                break;
            }
            i += step;
        }
    }

    flip
}

fn build_edge_table() -> Box<[u8]> {
    let start = Instant::now();
    let mut table = vec![0u8; 1 << 16].into_boxed_slice();

    // A line only depends on lines with one more disk, which have a smaller empties mask.
    for empties in 0..=255u8 {
        let occupied = !empties;
        for player in 0..=255u8 {
            if player & empties != 0 {
                continue;
            }
            let opponent = occupied & !player;
            let mut stable = occupied;

            for square in 0..8 {
                let move_bit = 1u8 << square;
                if empties & move_bit == 0 {
                    continue;
                }

                // Either side may eventually play here; legality may come from other lines.
                let flip = line_flip(square, player, opponent);
                stable &= !flip & table[edge_index(player | flip | move_bit, opponent & !flip)];

                let flip = line_flip(square, opponent, player);
                stable &= !flip & table[edge_index(player & !flip, opponent | flip | move_bit)];
            }

            table[edge_index(player, opponent)] = stable;
        }
    }

    log::debug!("Built edge stability table in {:?}", start.elapsed());
    table
}

/// Pack column `col` into a byte, row 1 in the lowest bit.
#[inline]
pub fn pack_column_portable(bits: u64, col: usize) -> u8 {
    let mut line = 0;
    for row in 0..8 {
        line |= (((bits >> (row * 8 + col)) & 1) as u8) << row;
    }
    line
}

/// Inverse of [`pack_column_portable()`].
#[inline]
pub fn unpack_column_portable(line: u8, col: usize) -> u64 {
    let mut bits = 0;
    for row in 0..8 {
        bits |= (((line >> row) & 1) as u64) << (row * 8 + col);
    }
    bits
}

#[cfg(all(target_arch = "x86_64", target_feature = "bmi2"))]
#[inline]
fn pack_column(bits: u64, col: usize) -> u8 {
    // SAFETY: bmi2 is enabled for the whole build.
    unsafe { std::arch::x86_64::_pext_u64(bits, COLUMN_A << col) as u8 }
}

#[cfg(all(target_arch = "x86_64", target_feature = "bmi2"))]
#[inline]
fn unpack_column(line: u8, col: usize) -> u64 {
    // SAFETY: bmi2 is enabled for the whole build.
    unsafe { std::arch::x86_64::_pdep_u64(line as u64, COLUMN_A << col) }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "bmi2")))]
#[inline]
fn pack_column(bits: u64, col: usize) -> u8 {
    pack_column_portable(bits, col)
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "bmi2")))]
#[inline]
fn unpack_column(line: u8, col: usize) -> u64 {
    unpack_column_portable(line, col)
}

/// Stable disks on the four edges, of both colors.
#[inline]
pub fn stable_edges(player: Bitboard, opponent: Bitboard) -> Bitboard {
    let (p, o): (u64, u64) = (player.into(), opponent.into());
    let table = &*EDGE_STABLE;

    let top = table[edge_index(row_byte(p, 0), row_byte(o, 0))] as u64;
    let bottom = (table[edge_index(row_byte(p, 7), row_byte(o, 7))] as u64) << 56;
    let left = unpack_column(table[edge_index(pack_column(p, 0), pack_column(o, 0))], 0);
    let right = unpack_column(table[edge_index(pack_column(p, 7), pack_column(o, 7))], 7);

    Bitboard::from(top | bottom | left | right)
}

/// Squares whose row contains no empty square.
#[inline]
pub fn full_rows(empties: u64) -> u64 {
    let mut e = empties;
    e |= ((e >> 1) & NOT_H_FILE) | ((e << 1) & NOT_A_FILE);
    e |= ((e >> 2) & NOT_GH_FILES) | ((e << 2) & NOT_AB_FILES);
    e |= ((e >> 4) & NOT_E_TO_H_FILES) | ((e << 4) & NOT_A_TO_D_FILES);
    !e
}

/// Squares whose column contains no empty square.
#[inline]
pub fn full_columns(empties: u64) -> u64 {
    let mut e = empties;
    e |= (e >> 8) | (e << 8);
    e |= (e >> 16) | (e << 16);
    e |= (e >> 32) | (e << 32);
    !e
}

/// Squares whose A1-H8 direction diagonal contains no empty square.
#[inline]
pub fn full_diags9(empties: u64) -> u64 {
    let mut e = empties;
    e |= ((e >> 9) & NOT_H_FILE) | ((e << 9) & NOT_A_FILE);
    e |= ((e >> 18) & NOT_GH_FILES) | ((e << 18) & NOT_AB_FILES);
    e |= ((e >> 36) & NOT_E_TO_H_FILES) | ((e << 36) & NOT_A_TO_D_FILES);
    !e
}

/// Squares whose H1-A8 direction diagonal contains no empty square.
#[inline]
pub fn full_diags7(empties: u64) -> u64 {
    let mut e = empties;
    e |= ((e >> 7) & NOT_A_FILE) | ((e << 7) & NOT_H_FILE);
    e |= ((e >> 14) & NOT_AB_FILES) | ((e << 14) & NOT_GH_FILES);
    e |= ((e >> 28) & NOT_A_TO_D_FILES) | ((e << 28) & NOT_E_TO_H_FILES);
    !e
}

/// Compute a set of disks that can never be flipped.
/// Includes stable edge and full-line disks of both colors, and stable interior disks of `player`.
pub fn stable_disks(player: Bitboard, opponent: Bitboard) -> Bitboard {
    let (p, o): (u64, u64) = (player.into(), opponent.into());
    let empties = !(p | o);

    let rows = full_rows(empties);
    let columns = full_columns(empties);
    let diags9 = full_diags9(empties);
    let diags7 = full_diags7(empties);

    let stable = u64::from(stable_edges(player, opponent)) | (rows & columns & diags9 & diags7);
    let mut stable_player = stable & p;

    loop {
        let mut new_stable = (stable_player << 1) | (stable_player >> 1) | rows;
        new_stable &= (stable_player << 8) | (stable_player >> 8) | columns;
        new_stable &= (stable_player << 7) | (stable_player >> 7) | diags7;
        new_stable &= (stable_player << 9) | (stable_player >> 9) | diags9;
        new_stable &= p & NON_EDGE & !stable_player;

        if new_stable == 0 {
            break;
        }
        stable_player |= new_stable;
    }

    Bitboard::from(stable | stable_player)
}

/// Upper bound on the final score of the player to move, given the opponent's stable disks.
#[inline]
pub fn stable_disks_upper_bound(player: Bitboard, opponent: Bitboard) -> i8 {
    let stable = stable_disks(opponent, player);
    64 - 2 * (stable & opponent).count_occupied() as i8
}
