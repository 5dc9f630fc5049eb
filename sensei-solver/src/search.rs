//! Internal search functions.

use arrayvec::ArrayVec;
use sensei_othello::stable::stable_disks_upper_bound;
use sensei_othello::Board;

// Below this many empties, stop sorting moves.
const MAX_SORT_DEPTH: u8 = 6;

// From this many empties up, try to cut off with the stable-disk bound.
const MIN_STABILITY_CUTOFF_DEPTH: u8 = 7;

/// State of one solve: the number of positions visited so far.
#[derive(Clone, Copy, Debug, Default)]
pub struct Search {
    pub visited: u64,
}

impl Search {
    /// Fail-hard window search. Returns the exact score if it lies strictly inside
    /// `(alpha, beta)`; otherwise a bound on the same side of the window as the score.
    pub fn window(&mut self, board: Board, alpha: i8, beta: i8) -> i8 {
        self.window_fastest_first(board, board.count_empty(), false, alpha, beta)
    }

    /// Window search, using "fastest first" move ordering which first
    /// explores moves where the opponent has the fewest legal moves.
    fn window_fastest_first(
        &mut self,
        board: Board,
        empties: u8,
        passed: bool,
        mut alpha: i8,
        beta: i8,
    ) -> i8 {
        if empties < MAX_SORT_DEPTH {
            return self.window_unsorted(board, empties, passed, alpha, beta);
        }
        self.visited += 1;

        // The opponent's stable disks cap my score
        if empties >= MIN_STABILITY_CUTOFF_DEPTH
            && stable_disks_upper_bound(board.player, board.opponent) <= alpha
        {
            return alpha;
        }

        let moves = board.get_moves();
        if moves.is_exhausted() {
            // Both players pass: game ends
            if passed {
                return board.game_over_eval();
            }

            // I pass, but my opponent may have moves
            return -self.window_fastest_first(board.pass(), empties, true, -beta, -alpha);
        }

        // Precompute all next boards and their moves
        let mut next_boards: ArrayVec<[Board; 64]> = moves.map(|loc| board.play(loc)).collect();
        next_boards.sort_unstable_by_key(|next| next.n_moves());

        // Visit boards by lowest-mobility first
        for next_board in next_boards {
            let score = -self.window_fastest_first(next_board, empties - 1, false, -beta, -alpha);

            // Fail high: this branch has a line so good for me my opponent won't allow it
            if score >= beta {
                return beta;
            }

            // This branch is better than any line I could force before: update current lower bound
            if score > alpha {
                alpha = score
            }
        }

        alpha
    }

    /// Window search without move ordering, which is faster for shallow trees.
    fn window_unsorted(
        &mut self,
        board: Board,
        empties: u8,
        passed: bool,
        mut alpha: i8,
        beta: i8,
    ) -> i8 {
        self.visited += 1;

        if empties == 0 {
            return board.score_absolute_difference();
        }

        let moves = board.get_moves();
        if moves.is_exhausted() {
            if passed {
                return board.game_over_eval();
            }

            return -self.window_unsorted(board.pass(), empties, true, -beta, -alpha);
        }

        for mv in moves {
            let score = -self.window_unsorted(board.play(mv), empties - 1, false, -beta, -alpha);

            if score >= beta {
                return beta;
            }

            if score > alpha {
                alpha = score
            }
        }

        alpha
    }
}
