//! A fixed-size transposition table shared by all search threads.
//!
//! Each position maps to a single slot. Writes always replace the slot's content, and
//! reads check the stored position, so collisions only cost a miss.

use crate::config::SearchConfig;
use crate::{EvalLarge, MAX_EVAL_LARGE, MIN_EVAL_LARGE};
use parking_lot::Mutex;
use sensei_othello::hash::position_hash;
use sensei_othello::{Bitboard, Board, Location};

/// Square index stored when there is no move.
pub const NO_SQUARE: u8 = 255;

#[inline]
fn encode_square(square: Option<Location>) -> u8 {
    square.map_or(NO_SQUARE, Location::to_index)
}

#[inline]
fn decode_square(square: u8) -> Option<Location> {
    if square == NO_SQUARE {
        None
    } else {
        Some(Location::from_index(square))
    }
}

/// A snapshot of one slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TableEntry {
    pub board: Board,
    pub epoch: u8,
    pub depth: u8,
    pub eval: EvalLarge,
    pub lower: EvalLarge,
    pub upper: EvalLarge,
    best_move: u8,
    second_best_move: u8,
}

impl TableEntry {
    // Overlapping sides: never equal to a real position.
    const EMPTY: TableEntry = TableEntry {
        board: Board {
            player: Bitboard::FULL,
            opponent: Bitboard::FULL,
        },
        epoch: 0,
        depth: 0,
        eval: 0,
        lower: MIN_EVAL_LARGE,
        upper: MAX_EVAL_LARGE,
        best_move: NO_SQUARE,
        second_best_move: NO_SQUARE,
    };

    #[inline]
    pub fn best_move(&self) -> Option<Location> {
        decode_square(self.best_move)
    }

    #[inline]
    pub fn second_best_move(&self) -> Option<Location> {
        decode_square(self.second_best_move)
    }
}

pub struct TranspositionTable {
    slots: Box<[Mutex<TableEntry>]>,
    mask: usize,
}

impl TranspositionTable {
    /// A table with `2^bits` slots.
    pub fn new(bits: u8) -> Self {
        assert!((1..=30).contains(&bits), "invalid table size: 2^{}", bits);
        let size = 1usize << bits;
        let slots = (0..size).map(|_| Mutex::new(TableEntry::EMPTY)).collect();
        log::debug!("Allocated transposition table with {} slots", size);

        Self {
            slots,
            mask: size - 1,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.hash_map_bits)
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Forget every entry.
    pub fn reset(&self) {
        for slot in self.slots.iter() {
            *slot.lock() = TableEntry::EMPTY;
        }
    }

    #[inline]
    fn slot(&self, board: Board) -> &Mutex<TableEntry> {
        &self.slots[position_hash(board.player, board.opponent) as usize & self.mask]
    }

    /// Store the result of a search of `board` with window `(window_lower, window_upper)`.
    /// A fail-low `eval` only bounds the score from above, a fail-high one from below.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &self,
        board: Board,
        epoch: u8,
        depth: u8,
        eval: EvalLarge,
        window_lower: EvalLarge,
        window_upper: EvalLarge,
        best_move: Option<Location>,
        second_best_move: Option<Location>,
    ) {
        debug_assert!(window_lower < window_upper);
        let lower = if eval > window_lower {
            eval
        } else {
            MIN_EVAL_LARGE
        };
        let upper = if eval < window_upper {
            eval
        } else {
            MAX_EVAL_LARGE
        };
        let entry = TableEntry {
            board,
            epoch,
            depth,
            eval,
            lower,
            upper,
            best_move: encode_square(best_move),
            second_best_move: encode_square(second_best_move),
        };

        *self.slot(board).lock() = entry;
    }

    /// The stored entry for `board`, if its slot still holds it.
    pub fn get(&self, board: Board) -> Option<TableEntry> {
        let entry = *self.slot(board).lock();
        if entry.board == board {
            Some(entry)
        } else {
            None
        }
    }

    /// Bounds on the score of `board` from a search at least `min_depth` deep,
    /// or the full range if there is none.
    pub fn get_lower_upper(&self, board: Board, min_depth: u8) -> (EvalLarge, EvalLarge) {
        match self.get(board) {
            Some(entry) if entry.depth >= min_depth => (entry.lower, entry.upper),
            _ => (MIN_EVAL_LARGE, MAX_EVAL_LARGE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use sensei_othello::test_utils::random_boards;
    use std::collections::HashSet;

    fn start() -> Board {
        Board::new()
    }

    #[test]
    fn store_and_retrieve() {
        let table = TranspositionTable::new(10);
        let d3 = Some("d3".parse().unwrap());
        table.update(start(), 1, 5, 16, -64, 64, d3, None);

        let entry = table.get(start()).unwrap();
        assert_eq!(entry.eval, 16);
        assert_eq!(entry.best_move(), d3);
        assert_eq!(entry.second_best_move(), None);
        assert_eq!(table.get_lower_upper(start(), 5), (16, 16));
        assert_eq!(table.get_lower_upper(start(), 4), (16, 16));
        assert_eq!(
            table.get_lower_upper(start(), 6),
            (MIN_EVAL_LARGE, MAX_EVAL_LARGE)
        );
        assert_eq!(
            table.get_lower_upper(start().pass(), 0),
            (MIN_EVAL_LARGE, MAX_EVAL_LARGE)
        );
    }

    #[test]
    fn window_decides_bounds() {
        let table = TranspositionTable::new(4);

        table.update(start(), 0, 3, -8, -8, 40, None, None);
        assert_eq!(table.get_lower_upper(start(), 0), (MIN_EVAL_LARGE, -8));

        table.update(start(), 0, 3, 40, -8, 40, None, None);
        assert_eq!(table.get_lower_upper(start(), 0), (40, MAX_EVAL_LARGE));

        table.update(start(), 0, 3, 24, -8, 40, None, None);
        assert_eq!(table.get_lower_upper(start(), 0), (24, 24));
    }

    #[test]
    fn collisions_overwrite() {
        let table = TranspositionTable::new(1);
        let boards = random_boards(0x77, 50);
        for (i, &board) in boards.iter().enumerate() {
            table.update(board, 0, 1, i as EvalLarge, -512, 512, None, None);
        }
        let stored = boards
            .iter()
            .filter(|&&board| table.get(board).is_some())
            .collect::<HashSet<_>>()
            .len();
        assert!(stored >= 1 && stored <= 2);
        assert!(table.get(*boards.last().unwrap()).is_some());

        table.reset();
        assert!(boards.iter().all(|&board| table.get(board).is_none()));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn best_moves_fit_in_a_byte() {
        let table = TranspositionTable::new(6);
        let a1 = Some(Location::from_index(0));
        let h8 = Some(Location::from_index(63));
        table.update(start(), 2, 4, 0, -8, 8, a1, h8);

        let entry = table.get(start()).unwrap();
        assert_eq!(entry.best_move(), a1);
        assert_eq!(entry.second_best_move(), h8);
        assert_eq!(TableEntry::EMPTY.best_move(), None);
        assert_eq!(TableEntry::EMPTY.second_best_move(), None);
        assert!(std::mem::size_of::<TableEntry>() <= 32);
    }

    #[test]
    fn empty_board_is_not_stored() {
        let table = TranspositionTable::new(3);
        let empty = Board::from_bitboards(Bitboard::EMPTY, Bitboard::EMPTY);
        assert_eq!(table.get(empty), None);
    }

    // Every field of a written entry is a function of its board.
    fn entry_for(board: Board) -> (u8, EvalLarge, Option<Location>) {
        let depth = board.count_empty();
        let eval = board.score_absolute_difference() as EvalLarge * 8;
        (depth, eval, board.get_moves().next())
    }

    #[test]
    fn concurrent_writers_leave_coherent_entries() {
        let table = TranspositionTable::new(5);
        let boards = random_boards(0xc0c0, 2_000);

        std::thread::scope(|scope| {
            for thread in 0..64u64 {
                let table = &table;
                let boards = &boards;
                scope.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(thread);
                    for _ in 0..2_000 {
                        let board = boards[rng.gen_range(0..boards.len())];
                        let (depth, eval, best_move) = entry_for(board);
                        if rng.gen_bool(0.5) {
                            table.update(
                                board,
                                thread as u8,
                                depth,
                                eval,
                                eval - 1,
                                eval + 1,
                                best_move,
                                None,
                            );
                        } else if let Some(entry) = table.get(board) {
                            assert_eq!(
                                (entry.depth, entry.eval, entry.best_move()),
                                entry_for(board)
                            );
                            assert_eq!((entry.lower, entry.upper), (eval, eval));
                        }
                    }
                });
            }
        });

        let mut filled = 0;
        for slot in table.slots.iter() {
            let entry = *slot.lock();
            if entry == TableEntry::EMPTY {
                continue;
            }
            filled += 1;
            assert_eq!(
                (entry.depth, entry.eval, entry.best_move()),
                entry_for(entry.board)
            );
            assert_eq!((entry.lower, entry.upper), (entry.eval, entry.eval));
            assert!(entry.epoch < 64);
        }
        assert!(filled > 16);
    }
}
