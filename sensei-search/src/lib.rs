//! Search support for a best-first Othello solver.
//!
//! This crate holds the pieces shared by search threads:
//!  - calibrated win probabilities and proof numbers, quantized to 8-bit codes
//!    ([`probability`], [`proof_number`]),
//!  - the algebra that combines children's evaluations into their father's
//!    ([`combiner`], [`Evaluation`]),
//!  - a transposition table safe to share between threads ([`TranspositionTable`]).
//!
//! All lookup tables are built lazily on first use. Call [`init()`] before starting
//! search threads to build them up front.

pub mod combiner;
pub mod config;
pub mod evaluation;
pub mod probability;
pub mod proof_number;
pub mod transposition;

pub use config::{ConfigError, SearchConfig};
pub use evaluation::Evaluation;
pub use transposition::{TableEntry, TranspositionTable};

use std::time::Instant;

/// A score in disks, from the perspective of the player to move.
pub type Eval = i8;

/// A score in eighths of a disk.
pub type EvalLarge = i32;

pub const MIN_EVAL: Eval = -64;
pub const MAX_EVAL: Eval = 64;

pub const MIN_EVAL_LARGE: EvalLarge = MIN_EVAL as EvalLarge * 8;
pub const MAX_EVAL_LARGE: EvalLarge = MAX_EVAL as EvalLarge * 8;

#[inline]
pub fn eval_to_eval_large(eval: Eval) -> EvalLarge {
    eval as EvalLarge * 8
}

/// Build every lookup table used by search, including the board crate's.
pub fn init() {
    let start = Instant::now();
    sensei_othello::init();
    probability::init();
    proof_number::init();
    combiner::init();
    log::info!("Initialized search tables in {:?}", start.elapsed());
}
