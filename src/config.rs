use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::candidates::{AGE_TOLERANCE_ABOVE, AGE_TOLERANCE_BELOW};
use crate::constants::geo::{BOUNDING_BOX_DEGREES, DECAY_MILES};
use crate::constants::leads::{DEFAULT_LIMIT, DEFAULT_MIN_SCORE};
use crate::constants::scoring::{
    BIO_MULTIPLIER, GEO_WEIGHT, PHENOTYPE_WEIGHT, TEXT_NORMALIZER, TEXT_WEIGHT,
};
use crate::constants::specificity::{ORDINARY_THRESHOLD, RARE_THRESHOLD, UNSEEN_TOKEN_SPECIFICITY};
use crate::errors::MatchError;
use crate::stats::StopWords;

/// Relative weights of the soft factors in the composite score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeWeights {
    /// Weight of the text-overlap score.
    pub text: f64,
    /// Weight of the geographic score.
    pub geo: f64,
    /// Weight of the phenotype score.
    pub phenotype: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            text: TEXT_WEIGHT,
            geo: GEO_WEIGHT,
            phenotype: PHENOTYPE_WEIGHT,
        }
    }
}

/// Pair scoring parameters.
///
/// The defaults are empirical and have not been calibrated against labeled
/// ground truth; every value can be overridden from a config file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Divisor applied to summed specificity of shared tokens.
    pub text_normalizer: f64,
    /// Averaged specificity above which a token is annotated as rare.
    pub rare_threshold: f64,
    /// Averaged specificity above which a token is surfaced at all.
    pub ordinary_threshold: f64,
    /// Specificity assigned to tokens a collection has never seen.
    pub unseen_token_specificity: f64,
    /// Distance in miles at which the geo score falls to 1/e.
    pub geo_decay_miles: f64,
    /// Weights combining the soft factors.
    pub weights: CompositeWeights,
    /// Boost applied when both sides carry complete DNA or dental records.
    pub bio_multiplier: f64,
    /// Tokens that never contribute to text overlap.
    pub stop_words: StopWords,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            text_normalizer: TEXT_NORMALIZER,
            rare_threshold: RARE_THRESHOLD,
            ordinary_threshold: ORDINARY_THRESHOLD,
            unseen_token_specificity: UNSEEN_TOKEN_SPECIFICITY,
            geo_decay_miles: DECAY_MILES,
            weights: CompositeWeights::default(),
            bio_multiplier: BIO_MULTIPLIER,
            stop_words: StopWords::default(),
        }
    }
}

/// Hard-filter parameters used before any scoring runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    /// Years below the UHR minimum age still admitted.
    pub age_tolerance_below: u32,
    /// Years above the UHR maximum age still admitted.
    pub age_tolerance_above: u32,
    /// Half-width of the coarse geographic box; `None` disables the filter.
    pub geo_box_degrees: Option<f64>,
    /// UHR records with shorter descriptions (in characters) are not matched.
    /// 0 keeps every record.
    pub min_uhr_description_chars: usize,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            age_tolerance_below: AGE_TOLERANCE_BELOW,
            age_tolerance_above: AGE_TOLERANCE_ABOVE,
            geo_box_degrees: Some(BOUNDING_BOX_DEGREES),
            min_uhr_description_chars: 0,
        }
    }
}

/// Batch execution and output parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Minimum composite score for a pair to become a lead.
    pub min_score: f64,
    /// Maximum number of ranked leads returned.
    pub limit: usize,
    /// Run scoring across multiple workers.
    pub parallel: bool,
    /// Worker count; `None` uses the available parallelism.
    pub worker_count: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            limit: DEFAULT_LIMIT,
            parallel: true,
            worker_count: None,
        }
    }
}

impl RunConfig {
    /// Number of chunks the UHR set is split into.
    ///
    /// Sequential runs still honour `worker_count` for chunking so both modes
    /// walk identical chunk contents.
    pub fn effective_workers(&self) -> usize {
        self.worker_count
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(NonZeroUsize::get)
                    .unwrap_or(1)
            })
            .max(1)
    }
}

/// Top-level matcher configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Pair scoring parameters.
    pub scoring: ScoringConfig,
    /// Hard-filter parameters.
    pub candidates: CandidateConfig,
    /// Threshold, limit, and worker settings.
    pub run: RunConfig,
}

impl MatcherConfig {
    /// Load a (possibly partial) JSON config; absent fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MatchError> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: MatcherConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make scores meaningless.
    pub fn validate(&self) -> Result<(), MatchError> {
        let scoring = &self.scoring;
        require_positive("scoring.text_normalizer", scoring.text_normalizer)?;
        require_positive("scoring.geo_decay_miles", scoring.geo_decay_miles)?;
        require_non_negative("scoring.weights.text", scoring.weights.text)?;
        require_non_negative("scoring.weights.geo", scoring.weights.geo)?;
        require_non_negative("scoring.weights.phenotype", scoring.weights.phenotype)?;
        require_non_negative("scoring.unseen_token_specificity", scoring.unseen_token_specificity)?;
        require_non_negative("scoring.rare_threshold", scoring.rare_threshold)?;
        require_non_negative("scoring.ordinary_threshold", scoring.ordinary_threshold)?;
        if !scoring.bio_multiplier.is_finite() || scoring.bio_multiplier < 1.0 {
            return Err(MatchError::Configuration(format!(
                "scoring.bio_multiplier must be >= 1.0 (got {})",
                scoring.bio_multiplier
            )));
        }
        if scoring.rare_threshold < scoring.ordinary_threshold {
            return Err(MatchError::Configuration(
                "scoring.rare_threshold must not be below scoring.ordinary_threshold".into(),
            ));
        }
        if let Some(degrees) = self.candidates.geo_box_degrees {
            require_positive("candidates.geo_box_degrees", degrees)?;
        }
        if !(0.0..=1.0).contains(&self.run.min_score) {
            return Err(MatchError::Configuration(format!(
                "run.min_score must be within [0, 1] (got {})",
                self.run.min_score
            )));
        }
        if self.run.worker_count == Some(0) {
            return Err(MatchError::Configuration(
                "run.worker_count must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), MatchError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MatchError::Configuration(format!(
            "{name} must be a positive number (got {value})"
        )))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), MatchError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MatchError::Configuration(format!(
            "{name} must be a non-negative number (got {value})"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_documented_constants() {
        let config = MatcherConfig::default();
        assert_eq!(config.run.min_score, 0.35);
        assert_eq!(config.run.limit, 200);
        assert_eq!(config.scoring.text_normalizer, 35.0);
        assert_eq!(config.scoring.geo_decay_miles, 300.0);
        assert_eq!(config.scoring.weights.text, 0.4);
        assert_eq!(config.scoring.bio_multiplier, 1.5);
        assert_eq!(config.candidates.geo_box_degrees, Some(8.0));
        assert_eq!(config.candidates.age_tolerance_below, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("matcher.json");
        fs::write(
            &path,
            r#"{"run": {"min_score": 0.5, "worker_count": 3}, "scoring": {"weights": {"text": 0.6}}}"#,
        )
        .unwrap();
        let config = MatcherConfig::from_json_file(&path).unwrap();
        assert_eq!(config.run.min_score, 0.5);
        assert_eq!(config.run.limit, 200);
        assert_eq!(config.run.effective_workers(), 3);
        assert_eq!(config.scoring.weights.text, 0.6);
        assert_eq!(config.scoring.weights.geo, 0.3);
        assert!(config.scoring.stop_words.contains("remains"));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = MatcherConfig::default();
        config.run.min_score = 1.5;
        assert!(matches!(
            config.validate(),
            Err(MatchError::Configuration(_))
        ));

        let mut config = MatcherConfig::default();
        config.run.worker_count = Some(0);
        assert!(config.validate().is_err());

        let mut config = MatcherConfig::default();
        config.scoring.text_normalizer = 0.0;
        assert!(config.validate().is_err());

        let mut config = MatcherConfig::default();
        config.scoring.bio_multiplier = 0.5;
        assert!(config.validate().is_err());

        let mut config = MatcherConfig::default();
        config.scoring.rare_threshold = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            MatcherConfig::from_json_file(&path),
            Err(MatchError::Json(_))
        ));
    }
}
