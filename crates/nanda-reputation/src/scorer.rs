//! Weighted-aggregation scoring algorithm.
//!
//! Implements [`ScoringAlgorithm`] by scoring the four categories
//! independently, blending them with the configured weights and attaching a
//! confidence estimate. Weights need not sum to 1: the blend is clamped to
//! `[0, 100]` and saturates silently at the bounds. A warning is logged once
//! per construction when the weights do not sum to 1.

use chrono::{DateTime, Utc};
use nanda_core::constants::WEIGHTED_AGGREGATION_V1;
use nanda_core::error::ConfigError;
use nanda_core::traits::ScoringAlgorithm;
use nanda_core::types::{CategoryScores, CategoryWeights, MetricsBundle, ReputationScore, ScoringConfig};
use tracing::{debug, warn};

use crate::categories::category_scores;
use crate::confidence::ConfidenceEstimator;
use crate::normalize::{clamp_score, round_score};

/// Tolerance within which weights are considered to sum to 1.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weighted sum of category scores, clamped to `[0, 100]`. Not rounded.
pub fn aggregate(categories: &CategoryScores, weights: &CategoryWeights) -> f64 {
    clamp_score(
        categories.performance * weights.performance
            + categories.verification * weights.verification
            + categories.feedback * weights.feedback
            + categories.usage * weights.usage,
    )
}

/// The weighted-aggregation strategy, version 1.
#[derive(Debug, Clone)]
pub struct WeightedAggregation {
    config: ScoringConfig,
    confidence: ConfidenceEstimator,
}

impl WeightedAggregation {
    /// Validate `config` and build the algorithm with default confidence
    /// sub-estimators.
    pub fn new(config: ScoringConfig) -> Result<Self, ConfigError> {
        let confidence = ConfidenceEstimator::new(&config)?;
        Self::with_confidence(config, confidence)
    }

    /// Build with a caller-assembled confidence estimator.
    pub fn with_confidence(
        config: ScoringConfig,
        confidence: ConfidenceEstimator,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let sum = config.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            warn!(
                weight_sum = sum,
                "scorer: category weights do not sum to 1, overall score may saturate"
            );
        }

        Ok(Self { config, confidence })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a subject, stamping the record with `now`.
    pub fn calculate_at(
        &self,
        subject_id: &str,
        bundle: &MetricsBundle,
        now: DateTime<Utc>,
    ) -> ReputationScore {
        let raw = category_scores(bundle);
        let overall = aggregate(&raw, &self.config.weights);
        let confidence = self.confidence.estimate(bundle);

        let categories = CategoryScores {
            performance: round_score(raw.performance),
            verification: round_score(raw.verification),
            feedback: round_score(raw.feedback),
            usage: round_score(raw.usage),
        };

        debug!(
            subject_id,
            overall,
            confidence = confidence.level,
            "scorer: calculated"
        );

        ReputationScore {
            subject_id: subject_id.to_string(),
            overall_score: round_score(overall),
            categories,
            confidence,
            last_updated: now,
            data_points: bundle.rating_count(),
            algorithm_id: WEIGHTED_AGGREGATION_V1.to_string(),
        }
    }
}

impl ScoringAlgorithm for WeightedAggregation {
    fn id(&self) -> &str {
        WEIGHTED_AGGREGATION_V1
    }

    fn description(&self) -> &str {
        "weighted sum of performance, verification, feedback and usage sub-scores"
    }

    fn calculate(&self, subject_id: &str, bundle: &MetricsBundle) -> ReputationScore {
        self.calculate_at(subject_id, bundle, Utc::now())
    }
}

/// One-shot scoring: validate `config`, then score `bundle`.
///
/// # Errors
///
/// [`ConfigError`] if `config` is invalid. Missing metrics never error.
pub fn calculate_score(
    subject_id: &str,
    bundle: &MetricsBundle,
    config: &ScoringConfig,
) -> Result<ReputationScore, ConfigError> {
    Ok(WeightedAggregation::new(config.clone())?.calculate(subject_id, bundle))
}
