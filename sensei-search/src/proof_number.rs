//! Proof and disproof numbers: estimated effort to prove or disprove that a position
//! reaches a goal, stored as 8-bit codes on a logarithmic scale.

use crate::probability::prob_explicit;
use crate::EvalLarge;
use once_cell::sync::Lazy;
use sensei_othello::{bitboard, Board};
use std::time::Instant;

/// An 8-bit proof-number code: 0 is proven, [`PN_STEP`] is unbounded.
pub type ProofNumberCode = u8;

pub const PN_STEP: ProofNumberCode = 255;

/// Largest finite proof number; anything above encodes as unbounded.
pub const MAX_PROOF_NUMBER: f64 = 1e25;

/// Ratio between consecutive codes.
pub static BASE_LOG_PROOF_NUMBER: Lazy<f64> =
    Lazy::new(|| MAX_PROOF_NUMBER.powf(1.0 / (PN_STEP as f64 - 1.99)));

const MAX_MOVES: u8 = 15;
const MAX_EMPTIES: u8 = 63;
const MAX_DELTA: EvalLarge = 128;

/// Fitted `(constant, log-mobility, error)` coefficients of the log proof number, by empties.
const LOG_PROOF_COEFFICIENTS: [(f64, f64, f64); 64] = [
    (2.3775, -0.0135, -0.0077),
    (2.6704, -0.0135, -0.0077),
    (2.9633, -0.0135, -0.0077),
    (3.2562, -0.0135, -0.0077),
    (3.4484, 0.0531, -0.0077),
    (3.7903, 0.0611, -0.0095),
    (4.0437, 0.1433, -0.0111),
    (4.3923, 0.1815, -0.0134),
    (4.7118, 0.229, -0.0151),
    (5.0509, 0.3189, -0.0195),
    (5.4526, 0.3808, -0.0243),
    (5.8066, 0.485, -0.0291),
    (6.1568, 0.633, -0.0343),
    (6.5719, 0.7582, -0.0407),
    (6.8365, 0.9411, -0.0453),
    (6.9268, 1.1992, -0.0497),
    (7.2731, 1.366, -0.0556),
    (7.7136, 1.487, -0.0612),
    (8.3667, 1.5015, -0.0652),
    (8.9113, 1.5736, -0.0688),
    (9.466, 1.6287, -0.0711),
    (9.8823, 1.768, -0.0755),
    (9.9799, 2.0293, -0.0778),
    (10.176, 2.2368, -0.0801),
    (10.5026, 2.3894, -0.081),
    (11.0438, 2.4437, -0.0812),
    (11.5552, 2.5013, -0.0809),
    (11.2036, 2.91, -0.0817),
    (11.5537, 3.021, -0.082),
    (11.358, 3.344, -0.0838),
    (11.9478, 3.3756, -0.0858),
    (11.134, 3.9379, -0.0869),
    (11.2932, 4.1384, -0.0903),
    (12.2237, 4.0371, -0.0922),
    (12.4435, 4.1864, -0.093),
    (12.8772, 4.2497, -0.0935),
    (14.2472, 3.9304, -0.0946),
    (14.7386, 3.9651, -0.095),
    (14.898, 4.1735, -0.097),
    (14.0817, 4.7402, -0.0984),
    (14.3064, 4.8891, -0.0986),
    (14.6816, 5.0126, -0.0987),
    (15.8863, 4.7816, -0.0986),
    (17.3965, 4.4429, -0.0992),
    (18.3813, 4.3203, -0.0999),
    (20.5447, 3.7845, -0.1017),
    (22.0146, 3.4876, -0.1032),
    (23.6573, 3.1384, -0.104),
    (25.6805, 2.6265, -0.1055),
    (27.6521, 2.1471, -0.1058),
    (28.3654, 2.1083, -0.1074),
    (30.2369, 1.6629, -0.1073),
    (31.2131, 1.5556, -0.1095),
    (32.9067, 1.1731, -0.1091),
    (33.4042, 1.2356, -0.1087),
    (34.3972, 1.1098, -0.1088),
    (35.4394, 0.9344, -0.1093),
    (36.4362, 0.768, -0.1091),
    (36.4893, 1.1315, -0.1097),
    (37.9377, 0.5617, -0.1093),
    (39.9141, -0.1785, -0.1098),
    (38.2563, 0.6285, -0.1082),
    (42.0388, 0.5295, -0.1078),
    (41.8089, 0.0181, -0.108),
];

/// Fitted `(constant, log-mobility, error)` coefficients of the log disproof number, by empties.
const LOG_DISPROOF_COEFFICIENTS: [(f64, f64, f64); 64] = [
    (0.747, 1.8772, 0.0068),
    (0.8341, 1.8772, 0.0068),
    (0.9211, 1.8772, 0.0068),
    (1.0081, 1.8772, 0.0068),
    (1.2574, 1.8207, 0.0093),
    (1.438, 1.815, 0.0117),
    (1.7417, 1.7745, 0.0141),
    (2.0862, 1.7405, 0.0165),
    (2.3991, 1.7622, 0.0196),
    (2.9038, 1.768, 0.0265),
    (3.4093, 1.7722, 0.0328),
    (3.7167, 1.9012, 0.039),
    (3.956, 2.0881, 0.0453),
    (4.247, 2.2542, 0.0515),
    (4.5899, 2.4023, 0.0584),
    (4.8119, 2.6004, 0.0653),
    (4.8123, 2.8932, 0.0708),
    (4.7712, 3.2071, 0.0753),
    (5.0249, 3.3671, 0.0789),
    (5.4563, 3.4749, 0.0819),
    (5.3436, 3.7827, 0.0837),
    (5.78, 3.8638, 0.0846),
    (6.1249, 3.9909, 0.0855),
    (6.5926, 4.0829, 0.0871),
    (6.9811, 4.1664, 0.0867),
    (7.5065, 4.207, 0.0861),
    (7.9698, 4.2483, 0.0849),
    (8.4343, 4.2815, 0.0839),
    (8.7454, 4.387, 0.0839),
    (8.7884, 4.6196, 0.0845),
    (9.2611, 4.6733, 0.0852),
    (10.1316, 4.5851, 0.0868),
    (9.0824, 5.1902, 0.0846),
    (9.1862, 5.4088, 0.0862),
    (9.8346, 5.3909, 0.0876),
    (9.116, 5.9012, 0.0881),
    (10.0605, 5.8064, 0.0896),
    (10.5922, 5.8341, 0.0901),
    (10.2118, 6.2229, 0.0919),
    (10.5953, 6.3295, 0.0931),
    (11.0811, 6.4034, 0.094),
    (12.684, 6.0612, 0.0946),
    (14.5836, 5.575, 0.0949),
    (15.6792, 5.4182, 0.0955),
    (18.2796, 4.7097, 0.0979),
    (20.0477, 4.2865, 0.0987),
    (21.2313, 4.1294, 0.0999),
    (24.3182, 3.2275, 0.0999),
    (25.9864, 2.857, 0.1005),
    (27.5568, 2.5071, 0.1023),
    (28.2594, 2.5344, 0.1035),
    (28.8723, 2.5801, 0.1053),
    (29.8889, 2.4971, 0.1056),
    (31.5168, 2.1207, 0.1064),
    (32.2733, 2.1401, 0.1069),
    (33.0243, 2.1285, 0.1074),
    (33.4561, 2.2713, 0.1076),
    (34.1675, 2.3004, 0.1081),
    (34.981, 2.2548, 0.108),
    (35.4962, 2.4597, 0.109),
    (36.8959, 1.8881, 0.1089),
    (38.4175, 1.4472, 0.1099),
    (36.1571, 2.9271, 0.1099),
    (41.823, 0.0181, 0.1107),
];

/// Encode a proof number, which must be 0 or at least 1.
#[inline]
pub fn proof_number_to_byte(proof_number: f64) -> ProofNumberCode {
    debug_assert!(
        proof_number == 0.0 || proof_number >= 1.0,
        "invalid proof number: {}",
        proof_number
    );
    if proof_number <= 1e-8 {
        return 0;
    } else if proof_number > MAX_PROOF_NUMBER {
        return PN_STEP;
    }

    let rescaled = proof_number.ln() / BASE_LOG_PROOF_NUMBER.ln() + 1.0;
    debug_assert!(rescaled >= 0.5 && rescaled <= PN_STEP as f64 - 0.5);
    rescaled.round() as ProofNumberCode
}

static BYTE_TO_PROOF_NUMBER: Lazy<[f64; 256]> = Lazy::new(|| {
    let mut table = [0.0; 256];
    for (byte, value) in table.iter_mut().enumerate() {
        *value = match byte {
            0 => 0.0,
            b if b == PN_STEP as usize => f64::INFINITY,
            b => BASE_LOG_PROOF_NUMBER.powi(b as i32 - 1),
        };
    }
    table
});

/// Decode a proof-number code. The unbounded code decodes to infinity.
#[inline]
pub fn byte_to_proof_number(byte: ProofNumberCode) -> f64 {
    BYTE_TO_PROOF_NUMBER[byte as usize]
}

/// Clamp an estimate to the finite, nonzero range.
#[inline]
pub fn bound(value: f64) -> f64 {
    value.min(MAX_PROOF_NUMBER * 0.99).max(1.0)
}

/// Extrapolate a proof number to a goal `delta` (eval-large units, positive) easier to reach.
/// An empirical exponential decay, not an exact transformation.
#[inline]
pub fn convert_proof_number(old: f64, delta: EvalLarge) -> f64 {
    assert!(delta > 0);
    bound((old.ln() - 0.07 * delta as f64).exp())
}

/// Extrapolate a disproof number to a goal `delta` (eval-large units, positive) easier to refute.
#[inline]
pub fn convert_disproof_number(old: f64, delta: EvalLarge) -> f64 {
    assert!(delta > 0);
    bound((old.ln() - 0.07 * delta as f64).exp())
}

fn log_model(coefficients: (f64, f64, f64), moves: u8, error: EvalLarge) -> f64 {
    let (constant, mobility_weight, error_weight) = coefficients;
    let log_moves = (moves.max(1) as f64 + 2.0).ln();
    let error = error.max(-560).min(560);
    constant + mobility_weight * log_moves + error_weight * error as f64
}

/// Fitted log of the proof number, given the opponent's mobility and
/// `error = (eval - goal) / 8`.
pub fn log_proof_number(empties: u8, moves_opponent: u8, error: EvalLarge) -> f64 {
    let coefficients = LOG_PROOF_COEFFICIENTS[empties as usize];
    log_model(coefficients, moves_opponent, error)
}

/// Fitted log of the disproof number, given the mover's mobility and
/// `error = (eval - goal) / 8`.
pub fn log_disproof_number(empties: u8, moves_player: u8, error: EvalLarge) -> f64 {
    let coefficients = LOG_DISPROOF_COEFFICIENTS[empties as usize];
    log_model(coefficients, moves_player, error)
}

#[inline]
fn offset(empties: u8, moves: u8, delta: EvalLarge) -> usize {
    debug_assert!(empties <= MAX_EMPTIES);
    debug_assert!(moves <= MAX_MOVES);
    debug_assert!(
        (-MAX_DELTA..=MAX_DELTA).contains(&delta),
        "delta out of range: {}",
        delta
    );
    empties as usize | (moves as usize) << 6 | ((delta + MAX_DELTA) as usize) << 10
}

struct ProofNumberTables {
    proof_number: Box<[ProofNumberCode]>,
    disproof_number: Box<[ProofNumberCode]>,
    disproof_number_over_prob: Box<[i32]>,
}

static PROOF_NUMBER_TABLES: Lazy<ProofNumberTables> = Lazy::new(|| {
    let start = Instant::now();
    let size = offset(MAX_EMPTIES, MAX_MOVES, MAX_DELTA) + 1;
    let mut tables = ProofNumberTables {
        proof_number: vec![0; size].into_boxed_slice(),
        disproof_number: vec![0; size].into_boxed_slice(),
        disproof_number_over_prob: vec![0; size].into_boxed_slice(),
    };

    for empties in 0..=MAX_EMPTIES {
        for moves in 0..=MAX_MOVES {
            for delta in -MAX_DELTA..=MAX_DELTA {
                let i = offset(empties, moves, delta);
                let disproof = bound(log_disproof_number(empties, moves, delta).exp());

                tables.proof_number[i] =
                    proof_number_to_byte(bound(log_proof_number(empties, moves, delta).exp()));
                tables.disproof_number[i] = proof_number_to_byte(disproof);
                let over_prob = disproof / prob_explicit(1, empties, delta);
                tables.disproof_number_over_prob[i] =
                    over_prob.min(i32::MAX as f64 - 2.0).round() as i32;
            }
        }
    }

    log::debug!("Built proof number tables in {:?}", start.elapsed());
    tables
});

#[inline]
fn board_offset(board: Board, moves: u8, goal: EvalLarge, eval: EvalLarge) -> usize {
    let delta = (eval - goal) >> 3;
    offset(board.count_empty(), moves.min(MAX_MOVES), delta)
}

/// Estimated proof number for "`board` scores at least `goal`", given a shallow `eval`.
#[inline]
pub fn proof_number(board: Board, goal: EvalLarge, eval: EvalLarge) -> ProofNumberCode {
    let moves = bitboard::get_move_mask(board.opponent, board.player).count_occupied();
    PROOF_NUMBER_TABLES.proof_number[board_offset(board, moves, goal, eval)]
}

/// Estimated disproof number for "`board` scores at least `goal`", given a shallow `eval`.
#[inline]
pub fn disproof_number(board: Board, goal: EvalLarge, eval: EvalLarge) -> ProofNumberCode {
    PROOF_NUMBER_TABLES.disproof_number[board_offset(board, board.n_moves(), goal, eval)]
}

/// The disproof number estimate divided by the depth 1 win probability at the same delta.
/// Used to rank moves by expected cost of refutation.
#[inline]
pub fn disproof_number_over_prob(board: Board, goal: EvalLarge, eval: EvalLarge) -> i32 {
    PROOF_NUMBER_TABLES.disproof_number_over_prob[board_offset(board, board.n_moves(), goal, eval)]
}

/// Force construction of the proof number tables.
pub fn init() {
    Lazy::force(&BYTE_TO_PROOF_NUMBER);
    Lazy::force(&PROOF_NUMBER_TABLES);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_extremes() {
        assert_eq!(proof_number_to_byte(0.0), 0);
        assert_eq!(proof_number_to_byte(1.0), 1);
        assert_eq!(proof_number_to_byte(MAX_PROOF_NUMBER), PN_STEP - 1);
        assert_eq!(proof_number_to_byte(MAX_PROOF_NUMBER * 10.0), PN_STEP);
        assert_eq!(proof_number_to_byte(f64::INFINITY), PN_STEP);
        assert_eq!(byte_to_proof_number(0), 0.0);
        assert_eq!(byte_to_proof_number(1), 1.0);
        assert_eq!(byte_to_proof_number(PN_STEP), f64::INFINITY);
    }

    #[test]
    fn codes_round_trip() {
        for byte in 0..=PN_STEP {
            assert_eq!(proof_number_to_byte(byte_to_proof_number(byte)), byte);
        }
    }

    #[test]
    fn encoding_is_accurate() {
        let tolerance = BASE_LOG_PROOF_NUMBER.sqrt() * 1.0001;
        let mut value = 1.0;
        while value < MAX_PROOF_NUMBER {
            let decoded = byte_to_proof_number(proof_number_to_byte(value));
            assert!(decoded / value < tolerance, "{} {}", value, decoded);
            assert!(value / decoded < tolerance, "{} {}", value, decoded);
            value *= 1.37;
        }
    }

    #[test]
    fn conversion_decays() {
        let base = *BASE_LOG_PROOF_NUMBER;
        for byte in 1..PN_STEP {
            let value = byte_to_proof_number(byte);
            let converted = convert_proof_number(value, 2);
            assert!(converted <= value);
            assert!(converted >= 1.0);
            assert_eq!(convert_disproof_number(value, 2), converted);
            if value > 10.0 {
                // Decays by exp(-0.14): less than a code step.
                assert!(converted > value / base);
            }
        }
        assert_eq!(convert_proof_number(1e30, 100), MAX_PROOF_NUMBER * 0.99);
    }

    #[test]
    fn estimates_are_finite() {
        for board in sensei_othello::test_utils::random_boards(0x9f, 3_000) {
            for &(goal, eval) in &[(0, 0), (-512, 512), (512, -512), (16, -40)] {
                let proof = proof_number(board, goal, eval);
                let disproof = disproof_number(board, goal, eval);
                assert!(proof >= 1 && proof < PN_STEP);
                assert!(disproof >= 1 && disproof < PN_STEP);
                assert!(disproof_number_over_prob(board, goal, eval) >= 1);
            }
        }
    }

    #[test]
    fn easier_goals_are_cheaper_to_prove() {
        let board = Board::new();
        let mut last_proof = 0;
        let mut last_disproof = PN_STEP;
        for goal in (-512..=512).step_by(64) {
            let proof = proof_number(board, goal, 0);
            let disproof = disproof_number(board, goal, 0);
            assert!(proof >= last_proof);
            assert!(disproof <= last_disproof);
            last_proof = proof;
            last_disproof = disproof;
        }
    }
}
