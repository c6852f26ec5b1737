//! Fixed parameters of the five-state pair HMM: state geometry, transition
//! matrix, emission tables, and start/end probabilities. All values are
//! natural-log probabilities.

use crate::alphabet::N_SYMBOLS;
use crate::logspace::LOG_ZERO;

/// Number of states in the pair HMM.
pub const N_STATES: usize = 5;

/// States of the pair HMM, in the fixed order the spec assigns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum State {
    /// Consumes one symbol from X and one from Y.
    Match = 0,
    /// Short gap in Y: consumes X only.
    ShortGapInY = 1,
    /// Short gap in X: consumes Y only.
    ShortGapInX = 2,
    /// Long gap in Y: consumes X only.
    LongGapInY = 3,
    /// Long gap in X: consumes Y only.
    LongGapInX = 4,
}

pub const ALL_STATES: [State; N_STATES] = [
    State::Match,
    State::ShortGapInY,
    State::ShortGapInX,
    State::LongGapInY,
    State::LongGapInX,
];

/// Per-state advance on the X sequence.
pub const DX: [usize; N_STATES] = [1, 1, 0, 1, 0];
/// Per-state advance on the Y sequence.
pub const DY: [usize; N_STATES] = [1, 0, 1, 0, 1];

// Individual transition log-probabilities, named as in spec.md §3.
const MATCH_CONTINUE: f64 = -0.030_064_059_121_770_816;
const GAP_OPEN_SHORT: f64 = -4.343_819_109_004_48;
const GAP_OPEN_LONG: f64 = -6.308_105_953_669_29;
const SHORT_EXTEND: f64 = -0.338_826_268_923_155_3;
const SHORT_SWITCH: f64 = -4.910_694_825_551_255;
const MATCH_FROM_SHORT: f64 = -1.272_871_422_049_609;
const LONG_EXTEND: f64 = -0.003_442_492_794_189_331;
const MATCH_FROM_LONG: f64 = -5.673_280_173_170_473;

/// Transition log-probability matrix, `TRANSITION[from][to]`. Entries with
/// no finite transition are log-zero. Only 13 of the 25 entries are finite;
/// the forward/backward fill skips the rest (see spec.md §9).
pub const TRANSITION: [[f64; N_STATES]; N_STATES] = [
    // from Match
    [
        MATCH_CONTINUE,
        GAP_OPEN_SHORT,
        GAP_OPEN_SHORT,
        GAP_OPEN_LONG,
        GAP_OPEN_LONG,
    ],
    // from ShortGapInY
    [MATCH_FROM_SHORT, SHORT_EXTEND, SHORT_SWITCH, LOG_ZERO, LOG_ZERO],
    // from ShortGapInX
    [MATCH_FROM_SHORT, SHORT_SWITCH, SHORT_EXTEND, LOG_ZERO, LOG_ZERO],
    // from LongGapInY
    [MATCH_FROM_LONG, LOG_ZERO, LOG_ZERO, LONG_EXTEND, LOG_ZERO],
    // from LongGapInX
    [MATCH_FROM_LONG, LOG_ZERO, LOG_ZERO, LOG_ZERO, LONG_EXTEND],
];

/// Start log-probabilities for cell (0, 0), indexed by state.
pub const START_PROB: [f64; N_STATES] = [
    MATCH_CONTINUE,
    GAP_OPEN_SHORT,
    GAP_OPEN_SHORT,
    GAP_OPEN_LONG,
    GAP_OPEN_LONG,
];

/// `log(1/5)`, the end probability in every state.
const END_PROB_VALUE: f64 = -1.609_437_912_434_1;

/// End log-probabilities, uniform across states.
pub const END_PROB: [f64; N_STATES] = [END_PROB_VALUE; N_STATES];

/// Uniform gap emission log-probability (`log 0.2`), used by every gap
/// state regardless of the emitted symbol's identity.
pub const GAP_EMISSION: f64 = -1.609_437_912_434_100_3;

const MATCH_MATCH: f64 = -2.114_919_665_503_474_5;
const TRANSVERSION: f64 = -4.569_101_437_683_047_9;
const TRANSITION_SUB: f64 = -3.983_386_003_222_084_2;
const N_MATCH: f64 = -3.218_875_824_868_200_6;

/// Match-state emission table, `MATCH_EMISSION[x_base][y_base]`, indexed by
/// the encoded alphabet (A=0, C=1, G=2, T=3, N=4).
pub const MATCH_EMISSION: [[f64; N_SYMBOLS]; N_SYMBOLS] = [
    // A
    [MATCH_MATCH, TRANSVERSION, TRANSITION_SUB, TRANSVERSION, N_MATCH],
    // C
    [TRANSVERSION, MATCH_MATCH, TRANSVERSION, TRANSITION_SUB, N_MATCH],
    // G
    [TRANSITION_SUB, TRANSVERSION, MATCH_MATCH, TRANSVERSION, N_MATCH],
    // T
    [TRANSVERSION, TRANSITION_SUB, TRANSVERSION, MATCH_MATCH, N_MATCH],
    // N
    [N_MATCH, N_MATCH, N_MATCH, N_MATCH, N_MATCH],
];

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn match_emission_is_symmetric() {
        for i in 0..N_SYMBOLS {
            for j in 0..N_SYMBOLS {
                assert_relative_eq!(MATCH_EMISSION[i][j], MATCH_EMISSION[j][i]);
            }
        }
    }

    #[test]
    fn transition_table_has_thirteen_finite_entries() {
        let finite = TRANSITION
            .iter()
            .flat_map(|row| row.iter())
            .filter(|p| p.is_finite())
            .count();
        assert_eq!(finite, 13);
    }

    #[test]
    fn advance_vectors_never_both_zero() {
        for s in 0..N_STATES {
            assert!(DX[s] + DY[s] >= 1);
        }
    }

    #[test]
    fn end_prob_is_uniform_fifth() {
        for &p in &END_PROB {
            assert_relative_eq!(p.exp(), 0.2, epsilon = 1e-9);
        }
    }
}
