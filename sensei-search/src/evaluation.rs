//! The quantized evaluation of a search node for a fixed goal.
//!
//! A node's record is built either as a leaf (from a shallow evaluation) or by folding
//! the finalized records of all its children:
//!
//! ```text
//! father.initialize();
//! for child in children { father.update_father_with_this_child(&child); }
//! father.finalize();
//! ```
//!
//! Children are evaluated from the opponent's point of view, so the fold computes the
//! probability that every child stays below the goal, and `finalize` flips it.

use crate::combiner::{CombineTables, COMBINE_TABLES, LOG_DERIVATIVE_MINUS_INF};
use crate::probability::{byte_to_probability, win_probability, Probability, PROB_STEP};
use crate::proof_number::{
    byte_to_proof_number, convert_disproof_number, convert_proof_number, disproof_number,
    proof_number, proof_number_to_byte, ProofNumberCode, PN_STEP,
};
use crate::EvalLarge;
use sensei_othello::Board;
use std::fmt;

#[inline(always)]
fn tables() -> &'static CombineTables {
    &COMBINE_TABLES
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Evaluation {
    prob_greater_equal: Probability,
    proof_number: ProofNumberCode,
    disproof_number: ProofNumberCode,
    max_log_derivative: i32,
}

impl Default for Evaluation {
    fn default() -> Self {
        let mut evaluation = Self {
            prob_greater_equal: 0,
            proof_number: 0,
            disproof_number: 0,
            max_log_derivative: 0,
        };
        evaluation.initialize();
        evaluation
    }
}

impl Evaluation {
    /// Probability that the node scores at least the goal.
    #[inline]
    pub fn prob_greater_equal(&self) -> f64 {
        byte_to_probability(self.prob_greater_equal)
    }

    /// `(1 - p)^3`, where `p` is [`Evaluation::prob_greater_equal()`].
    #[inline]
    pub fn prob_lower_cubed(&self) -> f64 {
        tables().prob_lower_cubed[self.prob_greater_equal as usize]
    }

    #[inline]
    pub fn proof_number(&self) -> f64 {
        byte_to_proof_number(self.proof_number)
    }

    #[inline]
    pub fn disproof_number(&self) -> f64 {
        byte_to_proof_number(self.disproof_number)
    }

    #[inline]
    pub fn max_log_derivative(&self) -> i32 {
        self.max_log_derivative
    }

    #[inline]
    pub fn prob_greater_equal_code(&self) -> Probability {
        self.prob_greater_equal
    }

    #[inline]
    pub fn proof_number_code(&self) -> ProofNumberCode {
        self.proof_number
    }

    #[inline]
    pub fn disproof_number_code(&self) -> ProofNumberCode {
        self.disproof_number
    }

    #[inline]
    pub fn is_solved(&self) -> bool {
        debug_assert!(self.is_consistent(), "{}", self);
        self.proof_number == 0 || self.disproof_number == 0
    }

    /// Log-derivative of `father`'s probability with respect to this child's,
    /// plus the best log-derivative below this child.
    pub fn log_derivative(&self, father: &Evaluation) -> i32 {
        if self.prob_greater_equal == 0
            || self.prob_greater_equal == PROB_STEP
            || father.prob_greater_equal == 0
            || father.prob_greater_equal == PROB_STEP
        {
            return LOG_DERIVATIVE_MINUS_INF;
        }
        let log_derivative = &tables().log_derivative;
        let child_term = log_derivative[self.prob_greater_equal as usize];
        let father_term = log_derivative[(PROB_STEP - father.prob_greater_equal) as usize];
        self.max_log_derivative + child_term - father_term
    }

    /// Reset to the neutral element of [`Evaluation::update_father_with_this_child()`].
    pub fn initialize(&mut self) {
        self.prob_greater_equal = PROB_STEP;
        self.proof_number = PN_STEP;
        self.disproof_number = 0;
        self.max_log_derivative = LOG_DERIVATIVE_MINUS_INF;
    }

    /// Fold a finalized child into this in-progress record.
    pub fn update_father_with_this_child(&mut self, child: &Evaluation) {
        debug_assert!(child.is_consistent(), "{}", child);
        let tables = tables();
        let child_prob = child.prob_greater_equal as usize;

        self.prob_greater_equal = tables.combine_prob[self.prob_greater_equal as usize][child_prob];
        if child.max_log_derivative > LOG_DERIVATIVE_MINUS_INF {
            self.max_log_derivative = self
                .max_log_derivative
                .max(child.max_log_derivative + tables.log_derivative[child_prob]);
        }

        let proof = tables.disproof_to_proof_number[child.disproof_number as usize][child_prob];
        self.proof_number = self.proof_number.min(proof);
        let disproof = &tables.combine_disproof_number[self.disproof_number as usize];
        self.disproof_number = disproof[child.proof_number as usize];

        debug_assert!(self.prob_greater_equal <= child.prob_greater_equal);
        debug_assert!(self.is_consistent_in_progress(), "{}", self);
    }

    /// Turn the fold over all children into this node's own record.
    pub fn finalize(&mut self) {
        if self.prob_greater_equal == PROB_STEP || self.prob_greater_equal == 0 {
            self.max_log_derivative = LOG_DERIVATIVE_MINUS_INF;
        } else {
            let log_derivative = tables().log_derivative[self.prob_greater_equal as usize];
            let max_log_derivative = self.max_log_derivative - log_derivative;
            self.max_log_derivative = max_log_derivative.max(LOG_DERIVATIVE_MINUS_INF + 1);
        }
        self.prob_greater_equal = PROB_STEP - self.prob_greater_equal;
        if self.prob_greater_equal == PROB_STEP {
            self.disproof_number = PN_STEP;
        }
        debug_assert!(self.is_consistent(), "{}", self);
    }

    /// Evaluate a leaf from a shallow `eval` at `depth` (1 to 4).
    pub fn set_leaf(
        &mut self,
        board: Board,
        goal: EvalLarge,
        eval: EvalLarge,
        depth: u8,
        n_empties: u8,
    ) {
        let prob = win_probability(depth, n_empties, goal, eval);
        self.prob_greater_equal = prob;
        self.proof_number = if prob == 0 {
            PN_STEP
        } else {
            proof_number(board, goal, eval)
        };
        self.disproof_number = if prob == PROB_STEP {
            PN_STEP
        } else {
            disproof_number(board, goal, eval)
        };
        self.max_log_derivative = tables().leaf_log_derivative[prob as usize];
        debug_assert!(self.is_consistent(), "{}", self);
    }

    pub fn set_proved(&mut self) {
        self.set(PROB_STEP, 0, PN_STEP, LOG_DERIVATIVE_MINUS_INF);
    }

    pub fn set_disproved(&mut self) {
        self.set(0, PN_STEP, 0, LOG_DERIVATIVE_MINUS_INF);
    }

    /// Provisional proof of a goal `delta` below the one `other` was computed for.
    /// The proof number is an empirical extrapolation of `other`'s.
    pub fn set_proving(&mut self, other: &Evaluation, delta: EvalLarge) {
        assert!(delta > 0 && delta % 2 == 0, "invalid delta: {}", delta);
        let proof = convert_proof_number(other.proof_number(), delta);
        self.set_proving_raw(proof_number_to_byte(proof));
    }

    /// Provisional refutation of a goal `delta` above the one `other` was computed for.
    pub fn set_disproving(&mut self, other: &Evaluation, delta: EvalLarge) {
        assert!(delta > 0 && delta % 2 == 0, "invalid delta: {}", delta);
        let disproof = convert_disproof_number(other.disproof_number(), delta);
        self.set_disproving_raw(proof_number_to_byte(disproof));
    }

    pub fn set_proving_raw(&mut self, proof_number: ProofNumberCode) {
        self.prob_greater_equal = PROB_STEP;
        self.proof_number = proof_number;
        self.disproof_number = PN_STEP;
        self.max_log_derivative = LOG_DERIVATIVE_MINUS_INF;
    }

    pub fn set_disproving_raw(&mut self, disproof_number: ProofNumberCode) {
        self.prob_greater_equal = 0;
        self.proof_number = PN_STEP;
        self.disproof_number = disproof_number;
        self.max_log_derivative = LOG_DERIVATIVE_MINUS_INF;
    }

    /// Overwrite every field. No consistency check.
    pub fn set(
        &mut self,
        prob_greater_equal: Probability,
        proof_number: ProofNumberCode,
        disproof_number: ProofNumberCode,
        max_log_derivative: i32,
    ) {
        self.prob_greater_equal = prob_greater_equal;
        self.proof_number = proof_number;
        self.disproof_number = disproof_number;
        self.max_log_derivative = max_log_derivative;
    }

    /// Invariants of a leaf, a terminal or a finalized record.
    pub fn is_consistent(&self) -> bool {
        let extreme = self.prob_greater_equal == 0 || self.prob_greater_equal == PROB_STEP;
        (self.prob_greater_equal == 0) == (self.proof_number == PN_STEP)
            && (self.prob_greater_equal == PROB_STEP) == (self.disproof_number == PN_STEP)
            && extreme == (self.max_log_derivative == LOG_DERIVATIVE_MINUS_INF)
            && self.max_log_derivative < 0
            && (self.proof_number != 0 || self.prob_greater_equal == PROB_STEP)
            && (self.disproof_number != 0 || self.prob_greater_equal == 0)
    }

    /// Invariants of a record between [`Evaluation::initialize()`] and
    /// [`Evaluation::finalize()`].
    pub fn is_consistent_in_progress(&self) -> bool {
        let uncertain = self.prob_greater_equal != PROB_STEP;
        (self.prob_greater_equal == PROB_STEP) == (self.proof_number == PN_STEP)
            && (uncertain || self.max_log_derivative == LOG_DERIVATIVE_MINUS_INF)
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}% (proof {:.3e}, disproof {:.3e}, log-derivative {})",
            self.prob_greater_equal() * 100.0,
            self.proof_number(),
            self.disproof_number(),
            self.max_log_derivative
        )
    }
}
