//! Properties of the bitboard primitives over random playouts.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sensei_othello::bitboard::{self, Bitboard};
use sensei_othello::stable::{stable_disks, stable_disks_upper_bound};
use sensei_othello::symmetry::all_transforms;
use sensei_othello::test_utils::random_game;
use sensei_othello::Board;

fn game(seed: u64) -> Vec<Board> {
    random_game(&mut StdRng::seed_from_u64(seed))
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn flips_match_reference(seed in any::<u64>()) {
        for board in game(seed) {
            let empties = board.empty_mask();
            for index in 0..64u8 {
                if !empties.contains_index(index) {
                    continue;
                }
                prop_assert_eq!(
                    bitboard::get_flip(board.player, board.opponent, Bitboard::from_index(index)),
                    bitboard::get_flip_basic(board.player, board.opponent, index)
                );
            }
        }
    }

    #[test]
    fn stable_disks_keep_their_color(seed in any::<u64>()) {
        let game = game(seed);
        for (i, board) in game.iter().enumerate() {
            let stable = stable_disks(board.player, board.opponent);
            let (mut mine, mut theirs) = (board.player & stable, board.opponent & stable);

            // Sides alternate along the game, passes included.
            for later in &game[i + 1..] {
                std::mem::swap(&mut mine, &mut theirs);
                prop_assert_eq!(later.player & mine, mine);
                prop_assert_eq!(later.opponent & theirs, theirs);
            }
        }
    }

    #[test]
    fn final_score_respects_upper_bound(seed in any::<u64>()) {
        let game = game(seed);
        let last = game.len() - 1;
        let final_score = game[last].game_over_eval();

        for (i, board) in game.iter().enumerate() {
            let score = if (last - i) % 2 == 0 { final_score } else { -final_score };
            prop_assert!(score <= stable_disks_upper_bound(board.player, board.opponent));
        }
    }

    #[test]
    fn moves_commute_with_symmetries(seed in any::<u64>()) {
        for board in game(seed) {
            let moves = bitboard::get_move_mask(board.player, board.opponent);
            let images = board.all_symmetries();
            let move_images = all_transforms(moves);
            for (image, expected) in images.iter().zip(move_images.iter()) {
                prop_assert_eq!(bitboard::get_move_mask(image.player, image.opponent), *expected);
            }
        }
    }
}
