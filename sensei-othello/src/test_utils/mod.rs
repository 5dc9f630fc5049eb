//! Utilities used for testing and benchmarking.

mod perft;
pub use perft::run_perft;

mod random;
pub use random::{random_board_with_empties, random_boards, random_game, random_games};
