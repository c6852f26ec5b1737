//! Banded tiling driver (spec.md §4.E): repeatedly aligns overlapping
//! square windows of the two sequences and stitches the per-band pair sets
//! into one consistent, de-duplicated, monotonically advancing alignment.

use std::cmp;
use std::collections::HashMap;

use itertools::Itertools;
use log::{debug, trace};

use crate::config::AlignerConfig;
use crate::pairhmm::{align_pairs_with_config, AlignedPair};

/// Banded pairwise alignment with default configuration (spec.md §6).
pub fn align_pairs_banded(x: &[u8], y: &[u8], band_size: usize) -> Vec<AlignedPair> {
    align_pairs_banded_with_config(x, y, band_size, &AlignerConfig::default())
}

/// Banded pairwise alignment with caller-supplied tuning constants.
///
/// `band_size` must be positive: this is one of the programmer-error
/// conditions spec.md §7 calls out, so it is enforced with a fatal
/// assertion rather than a `Result`.
pub fn align_pairs_banded_with_config(
    x: &[u8],
    y: &[u8],
    band_size: usize,
    config: &AlignerConfig,
) -> Vec<AlignedPair> {
    assert!(
        band_size > 0,
        "bug: band size must be a positive integer, got {}",
        band_size
    );

    debug!(
        "banded alignment: |X|={} |Y|={} band_size={}",
        x.len(),
        y.len(),
        band_size
    );

    let mut merged: HashMap<(usize, usize), u32> = HashMap::new();
    let mut offset_x = 0usize;
    let mut offset_y = 0usize;

    loop {
        let l_x_prime = cmp::min(band_size, x.len() - offset_x);
        let l_y_prime = cmp::min(band_size, y.len() - offset_y);
        let band_x = &x[offset_x..offset_x + l_x_prime];
        let band_y = &y[offset_y..offset_y + l_y_prime];

        trace!(
            "band iteration: offset=({}, {}) window=({}, {})",
            offset_x,
            offset_y,
            l_x_prime,
            l_y_prime
        );

        // Scan order is fixed to the ascending-(x, y) order the full
        // aligner emits pairs in: the "last-scanned maximum wins" tie-break
        // below is coupled to it (spec.md §9 design note).
        let band_pairs = align_pairs_with_config(band_x, band_y, config);

        let start_diag = offset_x + offset_y;
        let end_diag = start_diag + l_x_prime + l_y_prime;
        let reached_end = offset_x + l_x_prime == x.len() && offset_y + l_y_prime == y.len();

        let lower_diag = start_diag + (l_x_prime + l_y_prime) / 2;
        let upper_diag = end_diag.saturating_sub(config.min_trace_back_diag);

        let mut next_offset: Option<(u32, usize, usize)> = None;
        if !reached_end {
            for pair in &band_pairs {
                let gx = pair.x + offset_x;
                let gy = pair.y + offset_y;
                let diag = gx + gy;
                if diag < lower_diag || diag > upper_diag {
                    continue;
                }
                let is_new_max = match next_offset {
                    Some((best_score, _, _)) => pair.score >= best_score,
                    None => true,
                };
                if is_new_max {
                    next_offset = Some((pair.score, gx, gy));
                }
            }
        }

        let done = reached_end || next_offset.is_none();

        for pair in &band_pairs {
            let gx = pair.x + offset_x;
            let gy = pair.y + offset_y;
            let diag = gx + gy;

            if start_diag != 0 && diag < start_diag + config.min_trace_gap_diags {
                continue;
            }
            if !done && diag > end_diag.saturating_sub(config.min_trace_gap_diags) {
                continue;
            }

            merged
                .entry((gx, gy))
                .and_modify(|score| *score = (*score + pair.score) / 2)
                .or_insert(pair.score);
        }

        if done {
            break;
        }

        let (_, next_x, next_y) = next_offset.expect("done is false only when next_offset is Some");
        offset_x = next_x;
        offset_y = next_y;
    }

    merged
        .into_iter()
        .map(|((x, y), score)| AlignedPair::new(score, x, y))
        .sorted_by_key(|p| (p.x, p.y))
        .collect()
}
