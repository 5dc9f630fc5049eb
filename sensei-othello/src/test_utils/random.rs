//! Positions sampled from random playouts.

use crate::board::Board;
use crate::location::Location;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Play uniformly random moves from the start until the game ends.
/// Returns every position reached, passes included, so consecutive positions alternate sides.
pub fn random_game<R: Rng>(rng: &mut R) -> Vec<Board> {
    let mut board = Board::new();
    let mut game = vec![board];

    while !board.is_game_over() {
        if board.have_to_pass() {
            board = board.pass();
        } else {
            let moves: Vec<Location> = board.get_moves().collect();
            board = board.play(moves[rng.gen_range(0..moves.len())]);
        }
        game.push(board);
    }

    game
}

/// `count` random games from a fixed seed.
pub fn random_games(seed: u64, count: usize) -> Vec<Vec<Board>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| random_game(&mut rng)).collect()
}

/// `count` positions taken from consecutive random games from a fixed seed.
pub fn random_boards(seed: u64, count: usize) -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut boards = Vec::with_capacity(count);

    while boards.len() < count {
        boards.extend(random_game(&mut rng));
    }

    boards.truncate(count);
    boards
}

/// A random reachable position with exactly `empties` empty squares.
pub fn random_board_with_empties<R: Rng>(rng: &mut R, empties: u8) -> Board {
    assert!(empties <= 60);

    loop {
        if let Some(&board) = random_game(rng)
            .iter()
            .find(|board| board.count_empty() == empties)
        {
            return board;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_games_end_and_alternate() {
        for game in random_games(7, 20) {
            let last = game[game.len() - 1];
            assert!(last.is_game_over());
            for pair in game.windows(2) {
                let before = pair[0].player.count_occupied() + pair[0].opponent.count_occupied();
                let after = pair[1].player.count_occupied() + pair[1].opponent.count_occupied();
                assert!(after == before || after == before + 1);
            }
        }
    }

    #[test]
    fn random_boards_are_reproducible() {
        assert_eq!(random_boards(11, 500), random_boards(11, 500));
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(random_board_with_empties(&mut rng, 10).count_empty(), 10);
    }
}
