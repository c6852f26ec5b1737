//! A pairwise sequence aligner computing posterior-probability-weighted
//! aligned base pairs `(i, j, p)` between two nucleotide sequences, under a
//! fixed five-state pair HMM.
//!
//! Two entry points cover the whole surface: [`align_pairs`] runs the full
//! forward/backward algorithm; [`align_pairs_banded`] tiles it over
//! overlapping bands for sequences too long to matrix-fill in one pass.
//! Both are total: any pair of finite ASCII byte sequences is legal input.
//! The `_with_config` variants take an [`AlignerConfig`] for callers that
//! need non-default tuning constants.

pub mod alphabet;
pub mod band;
pub mod config;
pub mod errors;
pub mod logspace;
pub mod pairhmm;

pub use band::{align_pairs_banded, align_pairs_banded_with_config};
pub use config::{AlignerConfig, AlignerConfigBuilder};
pub use errors::AlignerError;
pub use logspace::LogProb;
pub use pairhmm::{align_pairs, align_pairs_with_config, AlignedPair};
