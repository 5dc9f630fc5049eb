//! Exact endgame solving by negamax with alpha-beta pruning.
//!
//! Scores are from the point of view of the player to move, in disks, with empty
//! squares of a finished game going to the winner.

pub mod search;

pub use search::Search;

use sensei_othello::{Board, Location, NUM_SPACES};

/// Maximum achievable score magnitude.
pub const MAX_SCORE: i8 = NUM_SPACES as i8;

/// Score and effort of a solve.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SolveResult {
    pub score: i8,
    pub visited: u64,
}

/// Solve the game, trying to determine the exact score.
/// Takes longer, but can be valuable for debugging or winning by a margin.
pub fn solve_exact(board: Board) -> i8 {
    solve_with_stats(board).score
}

/// Solve the game, caring only about solving for a win, loss, or draw.
/// Faster, but provides less information: only the sign of the result is exact.
pub fn solve_win_loss_draw(board: Board) -> i8 {
    solve_window(board, -1, 1)
}

/// Solve within `(alpha, beta)`: exact inside the window, a bound outside of it.
pub fn solve_window(board: Board, alpha: i8, beta: i8) -> i8 {
    assert!(alpha < beta);
    Search::default().window(board, alpha, beta)
}

/// Solve exactly, also reporting how many positions were visited.
pub fn solve_with_stats(board: Board) -> SolveResult {
    let mut search = Search::default();
    let score = search.window(board, -MAX_SCORE, MAX_SCORE);

    log::debug!(
        "Solved {} empties: score {}, {} positions visited",
        board.count_empty(),
        score,
        search.visited
    );

    SolveResult {
        score,
        visited: search.visited,
    }
}

/// Find a best move and its exact score. Returns None if the player to move must pass.
pub fn solve_best_move(board: Board) -> Option<(Location, i8)> {
    let mut search = Search::default();
    let mut best: Option<(Location, i8)> = None;
    let mut alpha = -MAX_SCORE - 1;

    for loc in board.get_moves() {
        // Only scores above alpha are exact, which is all we need to beat it.
        let score = -search.window(board.play(loc), -MAX_SCORE, -alpha);
        if score > alpha {
            alpha = score;
            best = Some((loc, score));
        }
    }

    best
}
