//! Combining the win probabilities of a node's children into the node's own probability.
//!
//! Probabilities are mapped through an increasing function `f` with `f(1) = 0`. The
//! combined value of two children is `f^-1(f(x1) + f(x2))`, which behaves like a soft
//! product: a single near-certain loss dominates, many uncertain ones accumulate.
//! All combinations used during search are precomputed on 8-bit codes.

use crate::probability::{
    bisect_inverse, byte_to_probability, probability_to_byte, Probability, PROB_STEP,
};
use crate::proof_number::{
    byte_to_proof_number, proof_number_to_byte, ProofNumberCode, MAX_PROOF_NUMBER, PN_STEP,
};
use itertools::iproduct;
use once_cell::sync::Lazy;
use std::f64::consts::LN_2;
use std::time::Instant;

/// Sentinel log-derivative: the node cannot influence its ancestors.
pub const LOG_DERIVATIVE_MINUS_INF: i32 = -1_000_000;

/// Log-derivatives are stored as `round(LOG_DERIVATIVE_MULTIPLIER * ln(d))`.
pub const LOG_DERIVATIVE_MULTIPLIER: f64 = 100.0;

const POWER: f64 = 1.7;

#[inline]
fn exponential(y: f64) -> f64 {
    2f64.powf(20.0 * (1.0 - y)) - 1.0
}

#[inline]
fn poly_log(y: f64) -> f64 {
    (-y.max(1e-30).ln()).powf(1.5)
}

/// The combining function: increasing on [0, 1], `f(1) = 0`, `f(0) = -f64::MAX`.
pub fn f(x: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&x), "probability out of range: {}", x);
    if x <= 1e-18 {
        return -f64::MAX;
    }
    let y = x.powf(POWER);
    -(exponential(y) * poly_log(y)).powf(1.0 / POWER)
}

/// Inverse of [`f()`]. Values below `f(1e-14)` map to 0.
pub fn inverse(y: f64) -> f64 {
    debug_assert!(y <= 0.0);
    if f(1e-14) >= y {
        return 0.0;
    }
    bisect_inverse(f, y, 1e-14, 1.0)
}

/// Derivative of [`f()`], in closed form.
pub fn derivative(x: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&x), "probability out of range: {}", x);
    if x >= 1.0 {
        return 0.0;
    } else if x <= 1e-18 {
        return f64::INFINITY;
    }

    // f(x) = -g(x^1.7)^(1/1.7), with g = exponential * poly_log.
    let y = x.powf(POWER);
    let log = -y.ln();
    let exponential_term = exponential(y);
    let g = exponential_term * log.powf(1.5);
    let g_prime = -20.0 * LN_2 * 2f64.powf(20.0 * (1.0 - y)) * log.powf(1.5)
        - exponential_term * 1.5 * log.sqrt() / y;

    let result = -g.powf(1.0 / POWER - 1.0) * g_prime * x.powf(POWER - 1.0);
    if result.is_nan() {
        0.0
    } else {
        result
    }
}

fn leaf_log_derivative_explicit(prob: f64) -> i32 {
    (LOG_DERIVATIVE_MULTIPLIER * (prob * (1.0 - prob)).ln())
        .round()
        .max(LOG_DERIVATIVE_MINUS_INF as f64) as i32
}

pub(crate) struct CombineTables {
    pub combine_prob: Box<[[Probability; 256]; 256]>,
    pub log_derivative: [i32; 256],
    pub leaf_log_derivative: [i32; 256],
    pub combine_disproof_number: Box<[[ProofNumberCode; 256]; 256]>,
    pub disproof_to_proof_number: Box<[[ProofNumberCode; 256]; 256]>,
    pub prob_lower_cubed: [f64; 256],
}

fn build_combine_prob() -> Box<[[Probability; 256]; 256]> {
    let mut table = Box::new([[0; 256]; 256]);

    for i in 0..=PROB_STEP as usize {
        let f1 = f(byte_to_probability(i as Probability));
        for j in i..=PROB_STEP as usize {
            let combined = if i == 0 {
                0
            } else if j == PROB_STEP as usize {
                i as Probability
            } else {
                let f2 = f(byte_to_probability(j as Probability));
                probability_to_byte(inverse(f1 + f2)).min(i as Probability)
            };
            table[i][j] = combined;
            table[j][i] = combined;
        }
    }

    table
}

fn build_log_derivative() -> [i32; 256] {
    let mut table = [0; 256];
    let max = -LOG_DERIVATIVE_MINUS_INF as f64;

    for i in 0..=PROB_STEP as usize {
        let slope = derivative(byte_to_probability(i as Probability));
        let value = (LOG_DERIVATIVE_MULTIPLIER * slope.ln())
            .max(-max + 1.0)
            .min(max)
            .round() as i32;
        table[i] = if i == 0 {
            value
        } else {
            value.min(table[i - 1])
        };
    }

    table
}

fn build_combine_disproof_number() -> Box<[[ProofNumberCode; 256]; 256]> {
    let mut table = Box::new([[0; 256]; 256]);

    for (i, j) in iproduct!(0..=PN_STEP, 0..=PN_STEP) {
        table[i as usize][j as usize] = if i == PN_STEP || j == PN_STEP {
            PN_STEP
        } else {
            let sum = byte_to_proof_number(i) + byte_to_proof_number(j);
            let code = proof_number_to_byte(sum.min(MAX_PROOF_NUMBER - 1.0));
            i.max(j).max(code)
        };
    }

    table
}

fn build_disproof_to_proof_number() -> Box<[[ProofNumberCode; 256]; 256]> {
    let mut table = Box::new([[0; 256]; 256]);

    for (disproof, prob) in iproduct!(0..=PN_STEP, 0..=PROB_STEP) {
        table[disproof as usize][prob as usize] = if disproof == PN_STEP || prob == PROB_STEP {
            PN_STEP
        } else if disproof == 0 {
            0
        } else {
            let mut proof_number = byte_to_proof_number(disproof);
            let p = byte_to_probability(prob);
            if p > 0.5 {
                proof_number *= (0.5 / (1.0 - p)).powi(3);
            }
            proof_number_to_byte(proof_number.min(MAX_PROOF_NUMBER).max(1.0))
        };
    }

    table
}

pub(crate) static COMBINE_TABLES: Lazy<CombineTables> = Lazy::new(|| {
    let start = Instant::now();
    let mut leaf_log_derivative = [0; 256];
    let mut prob_lower_cubed = [0.0; 256];
    for i in 0..=PROB_STEP as usize {
        let prob = byte_to_probability(i as Probability);
        leaf_log_derivative[i] = leaf_log_derivative_explicit(prob);
        prob_lower_cubed[i] = (1.0 - prob).powi(3);
    }

    let tables = CombineTables {
        combine_prob: build_combine_prob(),
        log_derivative: build_log_derivative(),
        leaf_log_derivative,
        combine_disproof_number: build_combine_disproof_number(),
        disproof_to_proof_number: build_disproof_to_proof_number(),
        prob_lower_cubed,
    };

    log::debug!("Built combine tables in {:?}", start.elapsed());
    tables
});

/// Combined code of two children's probability codes.
#[inline]
pub fn combine_prob(first: Probability, second: Probability) -> Probability {
    COMBINE_TABLES.combine_prob[first as usize][second as usize]
}

/// Force construction of the combine tables.
pub fn init() {
    Lazy::force(&COMBINE_TABLES);
}
