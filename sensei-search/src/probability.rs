//! Calibrated win probabilities and their 8-bit codes.
//!
//! Codes are spaced by a rescaling that is dense near 0 and 1, where extra
//! precision changes search decisions the most.

use crate::{EvalLarge, MAX_EVAL_LARGE, MIN_EVAL_LARGE};
use once_cell::sync::Lazy;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_2_SQRT_PI, PI};
use std::time::Instant;

/// An 8-bit probability code: 0 is certainly below the goal, [`PROB_STEP`] certainly above.
pub type Probability = u8;

pub const PROB_STEP: Probability = 255;

const MAX_DEPTH: u8 = 4;
const MAX_EMPTIES: u8 = 63;
const MAX_DELTA: EvalLarge = MAX_EVAL_LARGE - MIN_EVAL_LARGE;

/// Standard deviation, in disks, of a shallow evaluation around the exact score,
/// by depth (1 to 4) and empties.
const ERRORS: [[f64; 60]; 4] = [
    [
        2.00, 2.00, 2.00, 2.00, 6.64, 6.87, 7.64, 7.77, 8.18, 8.30, 8.72, 8.73, 8.98, 8.71, 8.65,
        8.35, 8.29, 8.05, 8.20, 7.64, 7.55, 7.05, 6.82, 6.00, 6.36, 5.61, 5.86, 5.19, 5.76, 5.13,
        5.58, 4.91, 5.19, 4.39, 4.89, 4.14, 4.82, 4.03, 4.38, 3.83, 4.16, 3.52, 3.82, 3.20, 3.28,
        2.79, 2.96, 2.41, 2.84, 2.57, 2.51, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00,
    ],
    [
        2.00, 2.00, 2.00, 2.00, 5.57, 5.86, 6.40, 7.08, 7.23, 7.63, 7.77, 8.06, 8.03, 8.19, 7.91,
        7.81, 7.57, 7.51, 7.41, 7.29, 6.92, 6.56, 6.18, 5.41, 5.67, 5.14, 5.13, 4.66, 4.98, 4.56,
        4.78, 4.37, 4.21, 3.90, 4.03, 3.73, 3.97, 3.63, 3.54, 3.46, 3.51, 3.15, 3.17, 2.94, 2.67,
        2.52, 2.56, 2.21, 2.10, 2.48, 2.09, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00,
    ],
    [
        2.00, 2.00, 2.00, 2.00, 5.17, 4.96, 5.63, 5.93, 6.68, 6.74, 7.21, 7.25, 7.47, 7.38, 7.51,
        7.21, 7.10, 6.97, 6.89, 6.66, 6.57, 6.03, 5.75, 5.01, 5.30, 4.71, 5.16, 4.30, 4.73, 4.09,
        4.59, 3.88, 4.40, 3.50, 3.97, 3.29, 4.03, 3.17, 3.81, 3.09, 3.50, 2.74, 3.25, 2.59, 3.00,
        2.28, 2.61, 2.05, 2.25, 2.00, 2.37, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00,
    ],
    [
        2.00, 2.00, 2.00, 2.00, 2.00, 4.72, 4.71, 5.25, 5.53, 6.34, 6.37, 6.77, 6.71, 6.87, 6.81,
        7.03, 6.56, 6.54, 6.37, 6.27, 6.05, 5.93, 5.32, 4.77, 4.93, 4.39, 4.64, 3.98, 4.05, 3.66,
        3.96, 3.53, 3.67, 3.24, 3.15, 2.96, 3.34, 2.93, 3.06, 2.86, 2.80, 2.57, 2.72, 2.40, 2.50,
        2.13, 2.13, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00, 2.00,
    ],
];

fn base_rescale(x: f64) -> f64 {
    if x < f64::MIN_POSITIVE {
        0.0
    } else {
        (10.0 - x.ln()).powf(-3.5)
    }
}

/// Map a probability to [0, 1], stretching the regions near 0 and 1.
/// Symmetric: `rescale_prob(1 - x) == 1 - rescale_prob(x)`.
pub fn rescale_prob(x: f64) -> f64 {
    if x <= 1e-14 {
        return 0.0;
    } else if x >= 1.0 - 1e-14 {
        return 1.0;
    }
    (base_rescale(x) - base_rescale(1.0 - x)) / (base_rescale(1.0) - base_rescale(0.0)) / 2.0 + 0.5
}

/// Invert the non-decreasing `f` at `y` on `[lower, upper]` by bisection.
pub(crate) fn bisect_inverse<F: Fn(f64) -> f64>(
    f: F,
    y: f64,
    mut lower: f64,
    mut upper: f64,
) -> f64 {
    if f(lower) >= y {
        return lower;
    } else if f(upper) <= y {
        return upper;
    }

    while upper - lower > 1e-14 {
        let mid = (lower + upper) / 2.0;
        if f(mid) < y {
            lower = mid;
        } else {
            upper = mid;
        }
    }

    (lower + upper) / 2.0
}

pub fn inverse_rescale_prob(y: f64) -> f64 {
    if y <= 1e-14 {
        return 0.0;
    } else if y >= 1.0 - 1e-14 {
        return 1.0;
    }
    bisect_inverse(rescale_prob, y, 0.0, 1.0)
}

/// Encode a probability in [0, 1].
#[inline]
pub fn probability_to_byte(probability: f64) -> Probability {
    debug_assert!(
        (0.0..=1.0).contains(&probability),
        "probability out of range: {}",
        probability
    );
    (rescale_prob(probability) * PROB_STEP as f64).round() as Probability
}

static BYTE_TO_PROBABILITY: Lazy<[f64; 256]> = Lazy::new(|| {
    let mut table = [0.0; 256];
    for (byte, value) in table.iter_mut().enumerate() {
        *value = inverse_rescale_prob(byte as f64 / PROB_STEP as f64);
    }
    table
});

/// Decode a probability code.
#[inline]
pub fn byte_to_probability(byte: Probability) -> f64 {
    BYTE_TO_PROBABILITY[byte as usize]
}

/// Complementary error function, accurate to about 1e-14.
pub fn erfc(x: f64) -> f64 {
    if x < 0.0 {
        return 2.0 - erfc(-x);
    }

    if x < 3.0 {
        // erf(x) = 2 / sqrt(pi) * exp(-x^2) * sum(2^n x^(2n+1) / (1 * 3 * ... * (2n+1))),
        // a series of positive terms.
        let mut term = x;
        let mut sum = x;
        let mut n = 0.0;
        while term > sum * 1e-17 {
            n += 1.0;
            term *= 2.0 * x * x / (2.0 * n + 1.0);
            sum += term;
        }
        1.0 - FRAC_2_SQRT_PI * (-x * x).exp() * sum
    } else {
        // Continued fraction: x + (1/2) / (x + 1 / (x + (3/2) / (x + ...))).
        let mut fraction = x;
        for n in (1..=60).rev() {
            fraction = x + (n as f64 / 2.0) / fraction;
        }
        (-x * x).exp() / (fraction * PI.sqrt())
    }
}

/// Cumulative distribution function of the standard normal distribution.
#[inline]
pub fn gaussian_cdf(x: f64) -> f64 {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// Probability that the exact score is at least `eval + delta`, given an evaluation at `depth`
/// with `empties` empty squares. `delta` is in eval-large units.
pub fn prob_explicit(depth: u8, empties: u8, delta: EvalLarge) -> f64 {
    debug_assert!((1..=MAX_DEPTH).contains(&depth));
    let error = if empties < 60 {
        ERRORS[depth as usize - 1][empties as usize].max(3.0)
    } else {
        3.0
    };
    1.0 - gaussian_cdf(delta as f64 / (8.0 * error))
}

#[inline]
fn win_probability_index(depth: u8, empties: u8, delta: EvalLarge) -> usize {
    assert!(
        (1..=MAX_DEPTH).contains(&depth),
        "depth out of range: {}",
        depth
    );
    debug_assert!(empties <= MAX_EMPTIES, "empties out of range: {}", empties);
    debug_assert!(
        (-MAX_DELTA..=MAX_DELTA).contains(&delta),
        "delta out of range: {}",
        delta
    );
    (depth as usize - 1) | (empties as usize) << 2 | ((delta + MAX_DELTA) as usize) << 8
}

static WIN_PROBABILITY: Lazy<Box<[Probability]>> = Lazy::new(|| {
    let start = Instant::now();
    let size = win_probability_index(MAX_DEPTH, MAX_EMPTIES, MAX_DELTA) + 1;
    let mut table = vec![0; size].into_boxed_slice();

    for depth in 1..=MAX_DEPTH {
        for empties in 0..=MAX_EMPTIES {
            for delta in -MAX_DELTA..=MAX_DELTA {
                table[win_probability_index(depth, empties, delta)] =
                    probability_to_byte(prob_explicit(depth, empties, delta));
            }
        }
    }

    log::debug!("Built win probability table in {:?}", start.elapsed());
    table
});

/// Calibrated code for "the exact score is at least `goal`", given `eval` from a search of
/// `depth` (1 to 4) with `empties` empty squares.
#[inline]
pub fn win_probability(depth: u8, empties: u8, goal: EvalLarge, eval: EvalLarge) -> Probability {
    WIN_PROBABILITY[win_probability_index(depth, empties, goal - eval)]
}

/// Force construction of the probability tables.
pub fn init() {
    Lazy::force(&BYTE_TO_PROBABILITY);
    Lazy::force(&WIN_PROBABILITY);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_is_symmetric_and_monotone() {
        let mut last = 0.0;
        for i in 0..=1000 {
            let x = i as f64 / 1000.0;
            let y = rescale_prob(x);
            assert!(y >= last);
            assert!((rescale_prob(1.0 - x) - (1.0 - y)).abs() < 1e-9);
            last = y;
        }
        assert_eq!(rescale_prob(0.0), 0.0);
        assert_eq!(rescale_prob(0.5), 0.5);
        assert_eq!(rescale_prob(1.0), 1.0);
    }

    #[test]
    fn inverse_rescale() {
        for i in 1..100 {
            let y = i as f64 / 100.0;
            assert!((rescale_prob(inverse_rescale_prob(y)) - y).abs() < 1e-6);
        }
    }

    #[test]
    fn codes_round_trip() {
        for byte in 0..=PROB_STEP {
            assert_eq!(probability_to_byte(byte_to_probability(byte)), byte);
        }
    }

    #[test]
    fn codes_are_monotone() {
        assert_eq!(byte_to_probability(0), 0.0);
        assert_eq!(byte_to_probability(PROB_STEP), 1.0);
        for byte in 1..=PROB_STEP {
            assert!(byte_to_probability(byte) > byte_to_probability(byte - 1));
        }
        assert!(byte_to_probability(1) < 1e-10);
        assert!(1.0 - byte_to_probability(PROB_STEP - 1) < 1e-10);
        assert_eq!(probability_to_byte(0.5), 128);
    }

    #[test]
    fn gaussian() {
        assert!((gaussian_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((gaussian_cdf(1.0) - 0.841_344_746).abs() < 1e-7);
        assert!((gaussian_cdf(-1.0) - 0.158_655_254).abs() < 1e-7);
        assert!((gaussian_cdf(-6.0) - 9.865_88e-10).abs() < 1e-10);
        assert!((gaussian_cdf(6.0) - 1.0).abs() < 1e-9);
        assert_eq!(erfc(0.0), 1.0);
        // Both branches agree where they meet.
        assert!((erfc(2.999_999_999) - erfc(3.0)).abs() < 1e-12);
        assert!((erfc(3.0) - 2.209_049_699_858_544e-5).abs() < 1e-15);
    }

    #[test]
    fn win_probability_tracks_delta() {
        for depth in 1..=4 {
            for empties in 0..=63 {
                assert_eq!(win_probability(depth, empties, 0, 0), 128);
                let certain = win_probability(depth, empties, MIN_EVAL_LARGE, MAX_EVAL_LARGE);
                assert_eq!(certain, PROB_STEP);
                let hopeless = win_probability(depth, empties, MAX_EVAL_LARGE, MIN_EVAL_LARGE);
                assert_eq!(hopeless, 0);

                let mut last = PROB_STEP;
                for goal in (MIN_EVAL_LARGE..=MAX_EVAL_LARGE).step_by(16) {
                    let prob = win_probability(depth, empties, goal, 0);
                    assert!(prob <= last);
                    last = prob;
                }
            }
        }
    }

    #[test]
    fn win_probability_matches_explicit() {
        // A 4-disk lead with the depth 1, 30 empties error of 5.58 disks.
        let expected = 1.0 - gaussian_cdf(-32.0 / (8.0 * 5.58));
        assert!((prob_explicit(1, 30, -32) - expected).abs() < 1e-12);
        assert_eq!(win_probability(1, 30, 0, 32), probability_to_byte(expected));
        // Beyond the table, the error floor applies.
        assert_eq!(prob_explicit(2, 61, 24), 1.0 - gaussian_cdf(1.0));
    }
}
