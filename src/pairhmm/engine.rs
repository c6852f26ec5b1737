//! Forward/backward matrix fill and posterior extraction (spec.md §4.D).

use log::debug;
use serde_derive::{Deserialize, Serialize};

use crate::alphabet;
use crate::config::AlignerConfig;
use crate::logspace::{log_add, LOG_ZERO};
use crate::pairhmm::params::{
    self, DX, DY, END_PROB, GAP_EMISSION, MATCH_EMISSION, N_STATES, START_PROB, TRANSITION,
};

/// A position pair (x, y) that is homologous with a posterior probability
/// of at least the configured threshold.
///
/// `score` is a fixed-point representation of the posterior in
/// `0..=pair_alignment_prob_1` (1,000,000 by default). `x`/`y` are
/// zero-based positions into the original X/Y sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedPair {
    pub score: u32,
    pub x: usize,
    pub y: usize,
}

impl AlignedPair {
    pub fn new(score: u32, x: usize, y: usize) -> Self {
        AlignedPair { score, x, y }
    }
}

/// A dense, contiguous (lX * lY * `N_STATES`) log-probability matrix, laid
/// out column-major over (y, x, state) as `(y * l_x + x) * N_STATES + state`
/// (spec.md §3): this matches the inner loop over y during the forward
/// fill and keeps per-row accesses contiguous.
struct LogMatrix {
    l_x: usize,
    l_y: usize,
    data: Vec<f64>,
}

impl LogMatrix {
    fn filled_with(l_x: usize, l_y: usize, value: f64) -> Self {
        LogMatrix {
            l_x,
            l_y,
            data: vec![value; l_x * l_y * N_STATES],
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize, state: usize) -> usize {
        (y * self.l_x + x) * N_STATES + state
    }

    #[inline]
    fn get(&self, x: usize, y: usize, state: usize) -> f64 {
        self.data[self.index(x, y, state)]
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, state: usize, value: f64) {
        let i = self.index(x, y, state);
        self.data[i] = value;
    }
}

/// Emission log-probability for entering state `to` at cell (x, y). Callers
/// only invoke this once the predecessor-validity check has confirmed `x`/`y`
/// are within bounds for `to`'s advance vector.
#[inline]
fn emission(sx: &[u8], sy: &[u8], x: usize, y: usize, to: usize) -> f64 {
    if to == params::State::Match as usize {
        MATCH_EMISSION[sx[x - 1] as usize][sy[y - 1] as usize]
    } else {
        // Gap states emit uniformly regardless of the symbol's identity.
        GAP_EMISSION
    }
}

/// Runs the forward/backward fill over a pair of already-encoded
/// sequences and extracts posterior-weighted aligned pairs.
pub struct Engine<'a> {
    sx: &'a [u8],
    sy: &'a [u8],
    l_x: usize,
    l_y: usize,
}

impl<'a> Engine<'a> {
    pub fn new(sx: &'a [u8], sy: &'a [u8]) -> Self {
        Engine {
            sx,
            sy,
            l_x: sx.len() + 1,
            l_y: sy.len() + 1,
        }
    }

    fn forward(&self) -> LogMatrix {
        let mut f = LogMatrix::filled_with(self.l_x, self.l_y, LOG_ZERO);
        for state in 0..N_STATES {
            f.set(0, 0, state, START_PROB[state]);
        }

        for x in 0..self.l_x {
            for y in 0..self.l_y {
                if x == 0 && y == 0 {
                    continue;
                }
                for to in 0..N_STATES {
                    let (px, py) = match (x.checked_sub(DX[to]), y.checked_sub(DY[to])) {
                        (Some(px), Some(py)) => (px, py),
                        _ => continue,
                    };
                    let e_p = emission(self.sx, self.sy, x, y, to);
                    let mut acc = LOG_ZERO;
                    for from in 0..N_STATES {
                        let t = TRANSITION[from][to];
                        if !t.is_finite() {
                            continue;
                        }
                        acc = log_add(acc, f.get(px, py, from) + t + e_p);
                    }
                    f.set(x, y, to, acc);
                }
            }
        }
        f
    }

    fn backward(&self) -> LogMatrix {
        let mut b = LogMatrix::filled_with(self.l_x, self.l_y, LOG_ZERO);
        for state in 0..N_STATES {
            b.set(self.l_x - 1, self.l_y - 1, state, END_PROB[state]);
        }

        for x in (0..self.l_x).rev() {
            for y in (0..self.l_y).rev() {
                for to in 0..N_STATES {
                    let (px, py) = match (x.checked_sub(DX[to]), y.checked_sub(DY[to])) {
                        (Some(px), Some(py)) => (px, py),
                        _ => continue,
                    };
                    let e_p = emission(self.sx, self.sy, x, y, to);
                    let cell_to = b.get(x, y, to);
                    for from in 0..N_STATES {
                        let t = TRANSITION[from][to];
                        if !t.is_finite() {
                            continue;
                        }
                        let contribution = cell_to + t + e_p;
                        let updated = log_add(b.get(px, py, from), contribution);
                        b.set(px, py, from, updated);
                    }
                }
            }
        }
        b
    }

    /// Computes forward and backward matrices and extracts all aligned
    /// pairs whose posterior exceeds `config.posterior_threshold`, in
    /// row-major (x, then y) scan order.
    pub fn posteriors(&self, config: &AlignerConfig) -> Vec<AlignedPair> {
        debug!(
            "running pair HMM forward/backward over sequences of length {} and {}",
            self.sx.len(),
            self.sy.len()
        );

        let forward = self.forward();
        let backward = self.backward();

        let mut total_forward = LOG_ZERO;
        let mut total_backward = LOG_ZERO;
        for i in 0..N_STATES {
            total_forward = log_add(
                total_forward,
                END_PROB[i] + forward.get(self.l_x - 1, self.l_y - 1, i),
            );
            total_backward = log_add(total_backward, START_PROB[i] + backward.get(0, 0, i));
        }
        let total_prob = (total_forward + total_backward) / 2.0;

        // This is an implementation-correctness check (spec.md §7, §8
        // property 1), not a data-dependent condition: it must hold for
        // any valid input, so a violation is a bug, not a bad alignment.
        if total_prob.is_finite() {
            let relative_disagreement = (total_forward - total_backward).abs() / total_prob.abs();
            assert!(
                relative_disagreement < 1e-3,
                "bug: forward/backward totals disagree beyond tolerance: {} vs {}",
                total_forward,
                total_backward
            );
        }

        let mut pairs = Vec::new();
        for x in 1..self.l_x {
            for y in 1..self.l_y {
                let match_state = params::State::Match as usize;
                let e_p = MATCH_EMISSION[self.sx[x - 1] as usize][self.sy[y - 1] as usize];
                let mut f = LOG_ZERO;
                for from in 0..N_STATES {
                    let t = TRANSITION[from][match_state];
                    if !t.is_finite() {
                        continue;
                    }
                    f = log_add(
                        f,
                        forward.get(x - 1, y - 1, from) + t + e_p + backward.get(x, y, match_state),
                    );
                }
                let p = (f - total_prob).exp();
                if p >= config.posterior_threshold {
                    let clamped = p.max(0.0).min(1.0);
                    let score = (clamped * config.pair_alignment_prob_1 as f64).floor() as u32;
                    pairs.push(AlignedPair::new(score, x - 1, y - 1));
                }
            }
        }
        pairs
    }
}

/// Encodes `x` and `y` and runs the full (unbanded) pair HMM over them.
pub fn align_pairs_with_config(x: &[u8], y: &[u8], config: &AlignerConfig) -> Vec<AlignedPair> {
    let sx = alphabet::encode(x);
    let sy = alphabet::encode(y);
    Engine::new(&sx, &sy).posteriors(config)
}

/// Full pairwise alignment with default configuration (spec.md §6).
pub fn align_pairs(x: &[u8], y: &[u8]) -> Vec<AlignedPair> {
    align_pairs_with_config(x, y, &AlignerConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_at(pairs: &[AlignedPair], x: usize, y: usize) -> Option<u32> {
        pairs
            .iter()
            .find(|p| p.x == x && p.y == y)
            .map(|p| p.score)
    }

    #[test]
    fn empty_sequences_yield_no_pairs() {
        // E1
        assert!(align_pairs(b"", b"").is_empty());
    }

    #[test]
    fn identical_sequences_align_on_diagonal() {
        // E2
        let pairs = align_pairs(b"ACGT", b"ACGT");
        for i in 0..4 {
            let score = score_at(&pairs, i, i).expect("diagonal pair missing");
            assert!(score >= 990_000, "score {} too low at ({},{})", score, i, i);
        }
    }

    #[test]
    fn single_deletion_aligns_around_the_gap() {
        // E3: X = "ACGT", Y = "AGT" (Y is missing the C)
        let pairs = align_pairs(b"ACGT", b"AGT");
        for &(x, y) in &[(0usize, 0usize), (2, 1), (3, 2)] {
            let score = score_at(&pairs, x, y).unwrap_or(0);
            assert!(
                score >= 500_000,
                "expected ({},{}) >= 500000, got {}",
                x,
                y,
                score
            );
        }
        let spurious = score_at(&pairs, 1, 0).unwrap_or(0);
        assert!(spurious < 500_000);
    }

    #[test]
    fn unrelated_sequences_have_low_or_no_posteriors() {
        // E4
        let pairs = align_pairs(b"AAAA", b"TTTT");
        assert!(pairs.iter().all(|p| p.score < 100_000));
    }

    #[test]
    fn identity_alignment_covers_the_interior() {
        // property 4: align_pairs(X, X) should recover the diagonal with
        // high confidence away from the sequence ends.
        let x = b"ACGTACGTACGTACGTACGT";
        let pairs = align_pairs(x, x);
        for i in 2..(x.len() - 2) {
            let score = score_at(&pairs, i, i).expect("diagonal pair missing");
            assert!(score >= 990_000, "low score {} at diagonal {}", score, i);
        }
    }

    #[test]
    fn every_emitted_pair_is_in_bounds_and_unique() {
        // properties 2 and 3
        let x = b"ACGTACGTAC";
        let y = b"ACGTAGTACG";
        let pairs = align_pairs(x, y);
        let mut seen = std::collections::HashSet::new();
        for p in &pairs {
            assert!(p.score <= 1_000_000);
            assert!(p.x < x.len());
            assert!(p.y < y.len());
            assert!(seen.insert((p.x, p.y)), "duplicate pair ({},{})", p.x, p.y);
        }
    }

    #[test]
    fn swapping_x_and_y_is_symmetric_up_to_rounding() {
        // property 5
        let x = b"ACGTTGCAAC";
        let y = b"ACGTAGCAAC";
        let forward_pairs = align_pairs(x, y);
        let swapped_pairs = align_pairs(y, x);

        let mut forward_scores: Vec<_> = forward_pairs.iter().map(|p| (p.x, p.y, p.score)).collect();
        let mut swapped_scores: Vec<_> = swapped_pairs
            .iter()
            .map(|p| (p.y, p.x, p.score))
            .collect();
        forward_scores.sort();
        swapped_scores.sort();

        assert_eq!(forward_scores.len(), swapped_scores.len());
        for ((fx, fy, fs), (sx, sy, ss)) in forward_scores.iter().zip(swapped_scores.iter()) {
            assert_eq!((fx, fy), (sx, sy));
            assert!((*fs as i64 - *ss as i64).abs() <= 1);
        }
    }
}
