//! The fixed five-state pair HMM: parameters (`params`) and the
//! forward/backward engine that fills its matrices and extracts posteriors
//! (`engine`).

pub mod engine;
pub mod params;

pub use engine::{align_pairs, align_pairs_with_config, AlignedPair, Engine};
pub use params::{State, DX, DY, END_PROB, MATCH_EMISSION, N_STATES, START_PROB, TRANSITION};
