use thiserror::Error;

/// Configuration-time errors. These are raised only when building an
/// [`crate::config::AlignerConfig`] with out-of-range values, or when loading
/// one from a YAML file; they are distinct from the per-call fatal aborts the
/// aligner itself raises for the programmer-error conditions in spec.md §7
/// (non-positive band size, numeric inconsistency), which panic rather than
/// return a `Result`.
#[derive(Error, Debug)]
pub enum AlignerError {
    #[error("posterior threshold must lie in [0.0, 1.0], got {value}")]
    InvalidPosteriorThreshold { value: f64 },
    #[error("pair_alignment_prob_1 must be a positive integer, got {value}")]
    InvalidPairAlignmentProb1 { value: u32 },
    #[error("could not read config file {path}")]
    ConfigFileUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {path} is not valid AlignerConfig YAML")]
    ConfigFileInvalid {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl PartialEq for AlignerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                AlignerError::InvalidPosteriorThreshold { value: a },
                AlignerError::InvalidPosteriorThreshold { value: b },
            ) => a == b,
            (
                AlignerError::InvalidPairAlignmentProb1 { value: a },
                AlignerError::InvalidPairAlignmentProb1 { value: b },
            ) => a == b,
            _ => false,
        }
    }
}
