//! The solver against a plain negamax reference on small endgames.

use indicatif::ProgressIterator;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sensei_othello::test_utils::random_board_with_empties;
use sensei_othello::{Bitboard, Board};
use sensei_solver::{
    solve_best_move, solve_exact, solve_win_loss_draw, solve_window, solve_with_stats,
};

/// Brute-force negamax: every move, no pruning.
fn reference_negamax(board: Board, passed: bool) -> i8 {
    let moves = board.get_moves();
    if moves.is_exhausted() {
        if passed {
            return board.game_over_eval();
        }
        return -reference_negamax(board.pass(), true);
    }

    moves
        .map(|mv| -reference_negamax(board.play(mv), false))
        .max()
        .unwrap()
}

#[test]
fn three_empties() {
    let board: Board = "-XXXOOOO/XXXXOOOO/XXXXOOOO/XXXXOOO-/XXXXOOOO/XXXXOOOO/XXXXOOOO/XXXXOOO-"
        .parse()
        .unwrap();
    assert_eq!(board.count_empty(), 3);
    assert_eq!(solve_exact(board), reference_negamax(board, false));
    assert_eq!(
        solve_exact(board.pass()),
        reference_negamax(board.pass(), false)
    );
}

#[test]
fn full_board() {
    let player = Bitboard::from(0x0000_00ff_ffff_ffffu64);
    let board = Board::from_bitboards(player, !player);
    assert_eq!(solve_exact(board), 16);
    assert_eq!(solve_exact(board.pass()), -16);
}

#[test]
fn both_sides_blocked() {
    // Only X on the board, and empties: nobody can move, X takes every square.
    let board = Board::from_bitboards(Bitboard::from(0xffu64), Bitboard::from(0u64));
    assert!(board.is_game_over());
    assert_eq!(solve_exact(board), 64);
    assert_eq!(solve_exact(board.pass()), -64);
}

#[test]
fn random_endgames_match_reference() {
    let mut rng = StdRng::seed_from_u64(0xe4ac7);

    for i in (0..900).progress() {
        let empties = (i % 9) as u8;
        let board = random_board_with_empties(&mut rng, empties);
        let expected = reference_negamax(board, false);

        assert_eq!(solve_exact(board), expected, "{}", board);
        assert_eq!(
            solve_win_loss_draw(board).signum(),
            expected.signum(),
            "{}",
            board
        );
    }
}

#[test]
fn windows_bound_the_score() {
    let mut rng = StdRng::seed_from_u64(0x1d0);

    for _ in 0..200 {
        let board = random_board_with_empties(&mut rng, 8);
        let exact = solve_exact(board);

        for &(alpha, beta) in &[(-64, -10), (-10, 0), (-2, 2), (0, 10), (10, 64)] {
            let score = solve_window(board, alpha, beta);
            if exact <= alpha {
                assert!(score <= alpha);
            } else if exact >= beta {
                assert!(score >= beta);
            } else {
                assert_eq!(score, exact);
            }
        }
    }
}

#[test]
fn best_move_achieves_score() {
    let mut rng = StdRng::seed_from_u64(0xbe57);

    for _ in 0..200 {
        let board = random_board_with_empties(&mut rng, 9);
        let exact = solve_exact(board);

        match solve_best_move(board) {
            Some((loc, score)) => {
                assert_eq!(score, exact, "{}", board);
                assert_eq!(-solve_exact(board.play(loc)), exact, "{}", board);
            }
            None => assert!(board.have_to_pass()),
        }
    }
}

#[test]
fn larger_endgames_agree_with_stats() {
    let mut rng = StdRng::seed_from_u64(0x5747);

    for _ in 0..10 {
        let board = random_board_with_empties(&mut rng, 12);
        let result = solve_with_stats(board);
        assert_eq!(result.score, solve_exact(board));
        assert!(result.visited > 0);
        assert_eq!(result.score.signum(), solve_win_loss_draw(board).signum());
    }
}
