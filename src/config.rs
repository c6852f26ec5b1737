//! Configuration surface for the tuning constants spec.md §9 calls out:
//! `PAIR_ALIGNMENT_PROB_1`, the band constants `min_trace_back_diag` and
//! `min_trace_gap_diags`, and the posterior threshold. Built with
//! `derive_builder`, following the same owned-builder pattern the teacher
//! repo uses for `SampleBuilder`/`CallerBuilder`.

use std::fs;
use std::path::Path;

use derive_builder::Builder;
use serde_derive::{Deserialize, Serialize};

use crate::errors::AlignerError;

/// Fixed-point scale for posterior scores: a score of `pair_alignment_prob_1`
/// represents posterior probability 1.0.
pub const DEFAULT_PAIR_ALIGNMENT_PROB_1: u32 = 1_000_000;

/// Minimum posterior probability (as a fraction) for a pair to be emitted.
pub const DEFAULT_POSTERIOR_THRESHOLD: f64 = 0.01;

/// Distance from a band's trailing edge a trace-back candidate must clear
/// before it is eligible to seed the next band.
pub const DEFAULT_MIN_TRACE_BACK_DIAG: usize = 50;

/// Width of the exclusion zone suppressing near-boundary pairs at a band's
/// leading/trailing edge from appearing twice.
pub const DEFAULT_MIN_TRACE_GAP_DIAGS: usize = 5;

/// Tuning constants shared by the full and banded aligners.
#[derive(Debug, Clone, Copy, PartialEq, Builder, Serialize, Deserialize)]
#[builder(build_fn(private, name = "build_unchecked"))]
pub struct AlignerConfig {
    /// Fixed-point scale for posterior scores.
    #[builder(default = "DEFAULT_PAIR_ALIGNMENT_PROB_1")]
    pub pair_alignment_prob_1: u32,
    /// Minimum posterior probability for a pair to be emitted.
    #[builder(default = "DEFAULT_POSTERIOR_THRESHOLD")]
    pub posterior_threshold: f64,
    /// Banded driver: trace-back distance from a band's trailing edge.
    #[builder(default = "DEFAULT_MIN_TRACE_BACK_DIAG")]
    pub min_trace_back_diag: usize,
    /// Banded driver: width of the near-boundary exclusion zone.
    #[builder(default = "DEFAULT_MIN_TRACE_GAP_DIAGS")]
    pub min_trace_gap_diags: usize,
}

impl AlignerConfigBuilder {
    /// Builds the config, validating the fields that `derive_builder`'s
    /// generated (and here renamed-private) `build_unchecked` cannot check
    /// on its own: every field has a default, so only range validation can
    /// fail.
    pub fn build(&self) -> Result<AlignerConfig, AlignerError> {
        let config = self
            .build_unchecked()
            .expect("every AlignerConfig field has a #[builder(default)]");

        if !(0.0..=1.0).contains(&config.posterior_threshold) {
            return Err(AlignerError::InvalidPosteriorThreshold {
                value: config.posterior_threshold,
            });
        }
        if config.pair_alignment_prob_1 == 0 {
            return Err(AlignerError::InvalidPairAlignmentProb1 {
                value: config.pair_alignment_prob_1,
            });
        }
        Ok(config)
    }
}

impl Default for AlignerConfig {
    fn default() -> Self {
        AlignerConfig {
            pair_alignment_prob_1: DEFAULT_PAIR_ALIGNMENT_PROB_1,
            posterior_threshold: DEFAULT_POSTERIOR_THRESHOLD,
            min_trace_back_diag: DEFAULT_MIN_TRACE_BACK_DIAG,
            min_trace_gap_diags: DEFAULT_MIN_TRACE_GAP_DIAGS,
        }
    }
}

/// Mirrors [`AlignerConfig`] with every field optional, so a YAML file only
/// needs to name the constants it wants to override. `serde` treats
/// `Option<T>` fields as absent-is-`None` without needing `#[serde(default)]`
/// on each of them.
#[derive(Debug, Default, Deserialize)]
struct PartialAlignerConfig {
    pair_alignment_prob_1: Option<u32>,
    posterior_threshold: Option<f64>,
    min_trace_back_diag: Option<usize>,
    min_trace_gap_diags: Option<usize>,
}

impl AlignerConfig {
    /// Loads a config from a YAML file, the same way the teacher loads its
    /// scenario/grammar files through `serde_yaml::from_str`. Fields absent
    /// from the file keep their documented defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<AlignerConfig, AlignerError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|source| {
            AlignerError::ConfigFileUnreadable {
                path: path.as_ref().display().to_string(),
                source,
            }
        })?;
        let partial: PartialAlignerConfig =
            serde_yaml::from_str(&content).map_err(|source| AlignerError::ConfigFileInvalid {
                path: path.as_ref().display().to_string(),
                source,
            })?;

        let mut builder = AlignerConfigBuilder::default();
        if let Some(value) = partial.pair_alignment_prob_1 {
            builder.pair_alignment_prob_1(value);
        }
        if let Some(value) = partial.posterior_threshold {
            builder.posterior_threshold(value);
        }
        if let Some(value) = partial.min_trace_back_diag {
            builder.min_trace_back_diag(value);
        }
        if let Some(value) = partial.min_trace_gap_diags {
            builder.min_trace_gap_diags(value);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_constants() {
        let config = AlignerConfig::default();
        assert_eq!(config.pair_alignment_prob_1, 1_000_000);
        assert_eq!(config.posterior_threshold, 0.01);
        assert_eq!(config.min_trace_back_diag, 50);
        assert_eq!(config.min_trace_gap_diags, 5);
    }

    #[test]
    fn builder_accepts_valid_overrides() {
        let config = AlignerConfigBuilder::default()
            .posterior_threshold(0.5)
            .build()
            .unwrap();
        assert_eq!(config.posterior_threshold, 0.5);
    }

    #[test]
    fn builder_rejects_out_of_range_threshold() {
        let result = AlignerConfigBuilder::default()
            .posterior_threshold(1.5)
            .build();
        assert_eq!(
            result.unwrap_err(),
            AlignerError::InvalidPosteriorThreshold { value: 1.5 }
        );
    }

    #[test]
    fn builder_rejects_zero_pair_alignment_prob_1() {
        let result = AlignerConfigBuilder::default()
            .pair_alignment_prob_1(0)
            .build();
        assert_eq!(
            result.unwrap_err(),
            AlignerError::InvalidPairAlignmentProb1 { value: 0 }
        );
    }

    #[test]
    fn from_yaml_file_round_trips_a_config() {
        let path = std::env::temp_dir().join("pairhmm_aligner_config_test.yaml");
        let written = AlignerConfig {
            posterior_threshold: 0.2,
            ..AlignerConfig::default()
        };
        fs::write(&path, serde_yaml::to_string(&written).unwrap()).unwrap();

        let loaded = AlignerConfig::from_yaml_file(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, written);
    }

    #[test]
    fn from_yaml_file_defaults_fields_absent_from_a_partial_file() {
        let path = std::env::temp_dir().join("pairhmm_aligner_config_partial_test.yaml");
        fs::write(&path, "posterior_threshold: 0.3\n").unwrap();

        let loaded = AlignerConfig::from_yaml_file(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.posterior_threshold, 0.3);
        assert_eq!(loaded.pair_alignment_prob_1, DEFAULT_PAIR_ALIGNMENT_PROB_1);
        assert_eq!(loaded.min_trace_back_diag, DEFAULT_MIN_TRACE_BACK_DIAG);
        assert_eq!(loaded.min_trace_gap_diags, DEFAULT_MIN_TRACE_GAP_DIAGS);
    }

    #[test]
    fn from_yaml_file_reports_missing_files() {
        let result = AlignerConfig::from_yaml_file("/nonexistent/pairhmm-aligner.yaml");
        assert!(matches!(
            result.unwrap_err(),
            AlignerError::ConfigFileUnreadable { .. }
        ));
    }
}
