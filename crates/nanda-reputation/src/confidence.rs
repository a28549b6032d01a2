//! Confidence estimation.
//!
//! Five factors, each in `[0, 100]`, blended with fixed weights:
//!
//! | Factor             | Weight | Source |
//! |--------------------|--------|--------|
//! | sample_size        | 0.3    | feedback rating count vs. ideal review count |
//! | consistency        | 0.2    | pluggable [`FactorEstimator`] |
//! | diversity          | 0.1    | pluggable [`FactorEstimator`] |
//! | recency            | 0.2    | pluggable [`FactorEstimator`] |
//! | verification_level | 0.2    | verification step function |
//!
//! The default estimators derive consistency, diversity and recency from the
//! bundle, so a subject with no data has zero confidence.
//! [`ConfidenceEstimator::with_placeholder_factors`] installs the fixed
//! 70/60/80 placeholder values instead.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use nanda_core::constants::{
    CONFIDENCE_CONSISTENCY_WEIGHT, CONFIDENCE_DIVERSITY_WEIGHT, CONFIDENCE_RECENCY_WEIGHT,
    CONFIDENCE_SAMPLE_SIZE_WEIGHT, CONFIDENCE_VERIFICATION_WEIGHT, FACTOR_CONSISTENCY,
    FACTOR_DIVERSITY, FACTOR_RECENCY, FACTOR_SAMPLE_SIZE, FACTOR_VERIFICATION_LEVEL, SCORE_MAX,
    USAGE_CLIENTS_SATURATION,
};
use nanda_core::error::ConfigError;
use nanda_core::traits::FactorEstimator;
use nanda_core::types::{Confidence, MetricsBundle, ScoringConfig};

use crate::decay::{age_in_days, HalfLife};
use crate::normalize::{clamp_score, round_score};

// ---------------------------------------------------------------------------
// Fixed factors
// ---------------------------------------------------------------------------

/// `min(100, rating_count / ideal_reviews * 100)`, scaled by
/// `rating_count / minimum_data_points` while below the minimum.
pub fn sample_size_factor(bundle: &MetricsBundle, ideal_reviews: u64, minimum_data_points: u64) -> f64 {
    let Some(feedback) = bundle.feedback.as_ref() else {
        return 0.0;
    };
    let count = feedback.rating_count.unwrap_or(0);
    if ideal_reviews == 0 {
        return 0.0;
    }

    let mut factor = (count as f64 / ideal_reviews as f64 * SCORE_MAX).min(SCORE_MAX);
    if count < minimum_data_points {
        factor *= count as f64 / minimum_data_points as f64;
    }
    factor
}

pub fn verification_factor(bundle: &MetricsBundle) -> f64 {
    bundle.verification_level().score()
}

// ---------------------------------------------------------------------------
// Default sub-estimators
// ---------------------------------------------------------------------------

/// Self-reported usage consistency, `0` when absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageConsistency;

impl FactorEstimator for UsageConsistency {
    fn name(&self) -> &str {
        "usage_consistency"
    }

    fn estimate(&self, bundle: &MetricsBundle) -> f64 {
        bundle
            .usage
            .as_ref()
            .and_then(|u| u.consistency_score)
            .map(clamp_score)
            .unwrap_or(0.0)
    }
}

/// Breadth of the client and rater population.
///
/// Averages the unique-client count (saturating at 100 clients) with the
/// share of star buckets that received at least one rating. Either signal
/// alone is used as-is; neither yields `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientDiversity;

impl FactorEstimator for ClientDiversity {
    fn name(&self) -> &str {
        "client_diversity"
    }

    fn estimate(&self, bundle: &MetricsBundle) -> f64 {
        let clients = bundle
            .usage
            .as_ref()
            .and_then(|u| u.unique_clients)
            .map(|c| (c as f64 / USAGE_CLIENTS_SATURATION * SCORE_MAX).min(SCORE_MAX));

        let spread = bundle
            .feedback
            .as_ref()
            .and_then(|f| f.rating_distribution)
            .filter(|d| d.iter().any(|&c| c > 0))
            .map(|d| {
                let filled = d.iter().filter(|&&c| c > 0).count();
                filled as f64 / d.len() as f64 * SCORE_MAX
            });

        match (clients, spread) {
            (Some(c), Some(s)) => (c + s) / 2.0,
            (Some(c), None) => c,
            (None, Some(s)) => s,
            (None, None) => 0.0,
        }
    }
}

/// Freshness of the verification, `100` decayed by its age.
///
/// `0` when the bundle carries no verification timestamp.
#[derive(Debug, Clone, Copy)]
pub struct VerificationRecency {
    half_life: HalfLife,
}

impl VerificationRecency {
    pub fn new(half_life: HalfLife) -> Self {
        Self { half_life }
    }

    pub fn estimate_at(&self, bundle: &MetricsBundle, now: DateTime<Utc>) -> f64 {
        bundle
            .verification
            .as_ref()
            .and_then(|v| v.verified_at)
            .map(|at| self.half_life.decay(SCORE_MAX, age_in_days(at, now)))
            .unwrap_or(0.0)
    }
}

impl FactorEstimator for VerificationRecency {
    fn name(&self) -> &str {
        "verification_recency"
    }

    fn estimate(&self, bundle: &MetricsBundle) -> f64 {
        self.estimate_at(bundle, Utc::now())
    }
}

/// Fixed value regardless of input.
#[derive(Debug, Clone)]
pub struct ConstantEstimator {
    name: String,
    value: f64,
}

impl ConstantEstimator {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: clamp_score(value),
        }
    }
}

impl FactorEstimator for ConstantEstimator {
    fn name(&self) -> &str {
        &self.name
    }

    fn estimate(&self, _bundle: &MetricsBundle) -> f64 {
        self.value
    }
}

// ---------------------------------------------------------------------------
// Estimator
// ---------------------------------------------------------------------------

/// Blends the five confidence factors for a bundle.
///
/// The three pluggable slots can be replaced independently with the
/// `with_*` builders.
#[derive(Clone)]
pub struct ConfidenceEstimator {
    consistency: Arc<dyn FactorEstimator>,
    diversity: Arc<dyn FactorEstimator>,
    recency: Arc<dyn FactorEstimator>,
    ideal_reviews: u64,
    minimum_data_points: u64,
}

impl std::fmt::Debug for ConfidenceEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfidenceEstimator")
            .field("consistency", &self.consistency.name())
            .field("diversity", &self.diversity.name())
            .field("recency", &self.recency.name())
            .field("ideal_reviews", &self.ideal_reviews)
            .field("minimum_data_points", &self.minimum_data_points)
            .finish()
    }
}

impl ConfidenceEstimator {
    /// Estimator with the data-driven default sub-estimators.
    pub fn new(config: &ScoringConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let half_life = HalfLife::new(config.half_life_days)?;
        Ok(Self {
            consistency: Arc::new(UsageConsistency),
            diversity: Arc::new(ClientDiversity),
            recency: Arc::new(VerificationRecency::new(half_life)),
            ideal_reviews: config.ideal_reviews,
            minimum_data_points: config.minimum_data_points,
        })
    }

    /// Replace consistency, diversity and recency with the fixed 70/60/80
    /// placeholder values.
    pub fn with_placeholder_factors(self) -> Self {
        self.with_consistency(ConstantEstimator::new(FACTOR_CONSISTENCY, 70.0))
            .with_diversity(ConstantEstimator::new(FACTOR_DIVERSITY, 60.0))
            .with_recency(ConstantEstimator::new(FACTOR_RECENCY, 80.0))
    }

    pub fn with_consistency(mut self, estimator: impl FactorEstimator + 'static) -> Self {
        self.consistency = Arc::new(estimator);
        self
    }

    pub fn with_diversity(mut self, estimator: impl FactorEstimator + 'static) -> Self {
        self.diversity = Arc::new(estimator);
        self
    }

    pub fn with_recency(mut self, estimator: impl FactorEstimator + 'static) -> Self {
        self.recency = Arc::new(estimator);
        self
    }

    /// Compute every factor and the rounded weighted level.
    pub fn estimate(&self, bundle: &MetricsBundle) -> Confidence {
        let sample_size = clamp_score(sample_size_factor(
            bundle,
            self.ideal_reviews,
            self.minimum_data_points,
        ));
        let consistency = clamp_score(self.consistency.estimate(bundle));
        let diversity = clamp_score(self.diversity.estimate(bundle));
        let recency = clamp_score(self.recency.estimate(bundle));
        let verification = clamp_score(verification_factor(bundle));

        let level = round_score(
            sample_size * CONFIDENCE_SAMPLE_SIZE_WEIGHT
                + consistency * CONFIDENCE_CONSISTENCY_WEIGHT
                + diversity * CONFIDENCE_DIVERSITY_WEIGHT
                + recency * CONFIDENCE_RECENCY_WEIGHT
                + verification * CONFIDENCE_VERIFICATION_WEIGHT,
        );

        let factors = BTreeMap::from([
            (FACTOR_SAMPLE_SIZE.to_string(), sample_size),
            (FACTOR_CONSISTENCY.to_string(), consistency),
            (FACTOR_DIVERSITY.to_string(), diversity),
            (FACTOR_RECENCY.to_string(), recency),
            (FACTOR_VERIFICATION_LEVEL.to_string(), verification),
        ]);

        Confidence { level, factors }
    }
}

/// One-shot confidence with the default estimators.
pub fn calculate_confidence(
    bundle: &MetricsBundle,
    config: &ScoringConfig,
) -> Result<Confidence, ConfigError> {
    Ok(ConfidenceEstimator::new(config)?.estimate(bundle))
}
