//! Miscellaneous project utilities.

use crate::EDGE_LENGTH;
use std::fmt::{self, Formatter};

/// Format one character per square, A1 first, as a labelled 8x8 grid.
/// `cells` must yield exactly 64 items.
pub fn format_grid<T: Iterator<Item = char>>(mut cells: T, f: &mut Formatter) -> fmt::Result {
    write!(f, "   A B C D E F G H")?;

    for row in 0..EDGE_LENGTH {
        write!(f, "\n {} ", row + 1)?;
        for _ in 0..EDGE_LENGTH {
            write!(f, "{} ", cells.next().ok_or(fmt::Error)?)?;
        }
    }

    match cells.next() {
        None => Ok(()),
        Some(_) => Err(fmt::Error),
    }
}

/// Extract row `row` (0 = top) as a byte, column A in the lowest bit.
#[inline(always)]
pub(crate) fn row_byte(bits: u64, row: usize) -> u8 {
    (bits >> (row * EDGE_LENGTH)) as u8
}
