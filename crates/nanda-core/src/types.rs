//! Core data types: metrics bundles, scoring configuration and score records.
//!
//! A [`MetricsBundle`] is sparse: every category may be absent, and so may
//! every field inside a present category. A [`ReputationScore`] is an
//! immutable record; corrections are expressed by producing a new record.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HALF_LIFE_DAYS, DEFAULT_IDEAL_REVIEWS, DEFAULT_MINIMUM_DATA_POINTS,
    DEFAULT_OUTLIER_Z_THRESHOLD, VERIFICATION_BRONZE_SCORE, VERIFICATION_GOLD_SCORE,
    VERIFICATION_NONE_SCORE, VERIFICATION_SILVER_SCORE,
};
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Metrics bundle
// ---------------------------------------------------------------------------

/// Operational performance of a subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Uptime in percent, `0–100`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_percentage: Option<f64>,
    /// Mean response time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_response_time_ms: Option<f64>,
    /// Fraction of failed requests, `0–1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful_transactions: Option<u64>,
}

/// Verification tier granted to a subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationLevel {
    #[default]
    None,
    Bronze,
    Silver,
    Gold,
}

impl VerificationLevel {
    /// Step-function score of this level.
    pub fn score(self) -> f64 {
        match self {
            Self::Gold => VERIFICATION_GOLD_SCORE,
            Self::Silver => VERIFICATION_SILVER_SCORE,
            Self::Bronze => VERIFICATION_BRONZE_SCORE,
            Self::None => VERIFICATION_NONE_SCORE,
        }
    }

    /// Recover the level from a verification category score.
    ///
    /// Scores that fall between steps map to the highest level they reach.
    pub fn from_score(score: f64) -> Self {
        if score >= VERIFICATION_GOLD_SCORE {
            Self::Gold
        } else if score >= VERIFICATION_SILVER_SCORE {
            Self::Silver
        } else if score >= VERIFICATION_BRONZE_SCORE {
            Self::Bronze
        } else {
            Self::None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "bronze" => Ok(Self::Bronze),
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            other => Err(format!("unknown verification level: {other}")),
        }
    }
}

/// Verification state of a subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationMetrics {
    #[serde(default)]
    pub level: VerificationLevel,
    /// When the current level was granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
}

/// User feedback on a 1–5 rating scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<u64>,
    /// Counts of 1-star through 5-star ratings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_distribution: Option<[u64; 5]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
}

/// Usage volume and longevity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_requests: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_clients: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longevity_days: Option<u64>,
    /// Self-reported consistency, `0–100`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency_score: Option<f64>,
}

/// Opaque caller-defined metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Sparse collection of metric categories for one subject.
///
/// Built fresh for every calculation; it has no persisted identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageMetrics>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub custom: HashMap<String, CustomValue>,
}

impl MetricsBundle {
    /// A bundle with every category absent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether no category carries data.
    pub fn is_empty(&self) -> bool {
        self.performance.is_none()
            && self.verification.is_none()
            && self.feedback.is_none()
            && self.usage.is_none()
            && self.custom.is_empty()
    }

    /// Number of feedback samples, `0` when feedback is absent.
    pub fn rating_count(&self) -> u64 {
        self.feedback
            .as_ref()
            .and_then(|f| f.rating_count)
            .unwrap_or(0)
    }

    /// Verification level, [`VerificationLevel::None`] when absent.
    pub fn verification_level(&self) -> VerificationLevel {
        self.verification
            .as_ref()
            .map(|v| v.level)
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Scoring configuration
// ---------------------------------------------------------------------------

/// Per-category aggregation weights.
///
/// Weights are not required to sum to 1; the aggregate is clamped to
/// `[0, 100]` and may saturate when they do not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub performance: f64,
    pub verification: f64,
    pub feedback: f64,
    pub usage: f64,
}

impl CategoryWeights {
    pub fn sum(&self) -> f64 {
        self.performance + self.verification + self.feedback + self.usage
    }

    fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("performance", self.performance),
            ("verification", self.verification),
            ("feedback", self.feedback),
            ("usage", self.usage),
        ]
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            performance: 0.3,
            verification: 0.2,
            feedback: 0.3,
            usage: 0.2,
        }
    }
}

/// Caller-supplied configuration, immutable for the duration of a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: CategoryWeights,
    /// Age at which decayed values reach half their magnitude.
    pub half_life_days: f64,
    /// Rating count below which the sample-size confidence factor is scaled down.
    pub minimum_data_points: u64,
    pub outlier_z_threshold: f64,
    /// Rating count at which the sample-size confidence factor saturates.
    pub ideal_reviews: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: CategoryWeights::default(),
            half_life_days: DEFAULT_HALF_LIFE_DAYS,
            minimum_data_points: DEFAULT_MINIMUM_DATA_POINTS,
            outlier_z_threshold: DEFAULT_OUTLIER_Z_THRESHOLD,
            ideal_reviews: DEFAULT_IDEAL_REVIEWS,
        }
    }
}

impl ScoringConfig {
    /// Check every field, failing on the first invalid one.
    ///
    /// Weights must be finite and non-negative; their sum is not checked.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.half_life_days.is_finite() && self.half_life_days > 0.0) {
            return Err(ConfigError::NonPositiveHalfLife(self.half_life_days));
        }
        if !(self.outlier_z_threshold.is_finite() && self.outlier_z_threshold > 0.0) {
            return Err(ConfigError::InvalidZThreshold(self.outlier_z_threshold));
        }
        if self.ideal_reviews == 0 {
            return Err(ConfigError::ZeroIdealReviews);
        }
        for (category, value) in self.weights.entries() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { category, value });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Score record
// ---------------------------------------------------------------------------

/// Per-category sub-scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub performance: f64,
    pub verification: f64,
    pub feedback: f64,
    pub usage: f64,
}

/// Trustworthiness estimate attached to a score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    /// Blended confidence, `0–100`.
    pub level: f64,
    /// Individual factors by name, each `0–100`.
    pub factors: BTreeMap<String, f64>,
}

impl Confidence {
    pub fn factor(&self, name: &str) -> Option<f64> {
        self.factors.get(name).copied()
    }
}

/// Immutable result of one scoring calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationScore {
    pub subject_id: String,
    /// Weighted aggregate, `0–100`.
    pub overall_score: f64,
    pub categories: CategoryScores,
    pub confidence: Confidence,
    /// Calculation time, not the time the metrics were collected.
    pub last_updated: DateTime<Utc>,
    /// Feedback samples the calculation drew on.
    pub data_points: u64,
    pub algorithm_id: String,
}

impl ReputationScore {
    /// Verification level implied by the verification category score.
    pub fn verification_level(&self) -> VerificationLevel {
        VerificationLevel::from_score(self.categories.verification)
    }
}
