//! Row-wise position hashing for transposition tables.

use crate::bitboard::Bitboard;
use crate::utils::row_byte;
use crate::EDGE_LENGTH;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const HASH_SEED: u64 = 0x5e45_e10c_e110;

/// One random value per (row, row contents), for each side.
struct HashKeys {
    player: [[u32; 256]; EDGE_LENGTH],
    opponent: [[u32; 256]; EDGE_LENGTH],
}

static HASH_KEYS: Lazy<Box<HashKeys>> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(HASH_SEED);
    let mut keys = Box::new(HashKeys {
        player: [[0; 256]; EDGE_LENGTH],
        opponent: [[0; 256]; EDGE_LENGTH],
    });

    for row in 0..EDGE_LENGTH {
        for byte in 0..256 {
            keys.player[row][byte] = rng.gen();
            keys.opponent[row][byte] = rng.gen();
        }
    }

    log::debug!("Built position hash keys");
    keys
});

/// Force construction of the hash keys.
pub fn init() {
    Lazy::force(&HASH_KEYS);
}

/// Hash a position: XOR of the keys of every row of both sides.
/// Stable across runs, since the keys come from a fixed seed.
#[inline]
pub fn position_hash(player: Bitboard, opponent: Bitboard) -> u32 {
    let keys = &**HASH_KEYS;
    let (p, o): (u64, u64) = (player.into(), opponent.into());
    let mut hash = 0;

    for row in 0..EDGE_LENGTH {
        hash ^= keys.player[row][row_byte(p, row) as usize];
        hash ^= keys.opponent[row][row_byte(o, row) as usize];
    }

    hash
}
