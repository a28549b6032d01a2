//! Scoring constants shared across crates.
//!
//! Category defaults are intentionally asymmetric: graded human judgements
//! (performance, feedback) start at the neutral midpoint, while categories
//! with a natural floor (verification, usage volume terms) start at zero.

/// Identifier of the weighted-aggregation algorithm, version 1.
///
/// Any change to the category formulas or the aggregation must mint a new
/// identifier so stored records stay attributable to the formula that
/// produced them.
pub const WEIGHTED_AGGREGATION_V1: &str = "weighted-aggregation-v1";

/// Lower bound of every score and confidence value.
pub const SCORE_MIN: f64 = 0.0;
/// Upper bound of every score and confidence value.
pub const SCORE_MAX: f64 = 100.0;

// ---------------------------------------------------------------------------
// Category defaults
// ---------------------------------------------------------------------------

/// Performance score when the category is absent.
pub const DEFAULT_PERFORMANCE_SCORE: f64 = 50.0;
/// Verification score when the category is absent.
pub const DEFAULT_VERIFICATION_SCORE: f64 = 0.0;
/// Feedback score when the category is absent or the rating is zero.
pub const DEFAULT_FEEDBACK_SCORE: f64 = 50.0;
/// Usage score when the category is absent.
pub const DEFAULT_USAGE_SCORE: f64 = 50.0;
/// Value of a performance sub-term whose field is missing.
pub const DEFAULT_PERFORMANCE_TERM: f64 = 50.0;

// ---------------------------------------------------------------------------
// Performance formula
// ---------------------------------------------------------------------------

pub const PERFORMANCE_UPTIME_WEIGHT: f64 = 0.5;
pub const PERFORMANCE_RESPONSE_WEIGHT: f64 = 0.3;
pub const PERFORMANCE_ERROR_WEIGHT: f64 = 0.2;
/// Milliseconds of average response time that cost one point.
pub const RESPONSE_MS_PER_POINT: f64 = 10.0;

// ---------------------------------------------------------------------------
// Verification levels
// ---------------------------------------------------------------------------

pub const VERIFICATION_GOLD_SCORE: f64 = 100.0;
pub const VERIFICATION_SILVER_SCORE: f64 = 75.0;
pub const VERIFICATION_BRONZE_SCORE: f64 = 50.0;
pub const VERIFICATION_NONE_SCORE: f64 = 0.0;

// ---------------------------------------------------------------------------
// Feedback formula
// ---------------------------------------------------------------------------

pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 5.0;

// ---------------------------------------------------------------------------
// Usage formula
// ---------------------------------------------------------------------------

pub const USAGE_REQUESTS_WEIGHT: f64 = 0.3;
pub const USAGE_CLIENTS_WEIGHT: f64 = 0.4;
pub const USAGE_LONGEVITY_WEIGHT: f64 = 0.3;
/// Total requests at which the request term saturates.
pub const USAGE_REQUESTS_SATURATION: f64 = 1000.0;
/// Unique clients at which the client term saturates.
pub const USAGE_CLIENTS_SATURATION: f64 = 100.0;
/// Days of longevity at which the longevity term saturates.
pub const USAGE_LONGEVITY_SATURATION_DAYS: f64 = 30.0;

// ---------------------------------------------------------------------------
// Confidence blend
// ---------------------------------------------------------------------------

pub const CONFIDENCE_SAMPLE_SIZE_WEIGHT: f64 = 0.3;
pub const CONFIDENCE_CONSISTENCY_WEIGHT: f64 = 0.2;
pub const CONFIDENCE_DIVERSITY_WEIGHT: f64 = 0.1;
pub const CONFIDENCE_RECENCY_WEIGHT: f64 = 0.2;
pub const CONFIDENCE_VERIFICATION_WEIGHT: f64 = 0.2;

pub const FACTOR_SAMPLE_SIZE: &str = "sample_size";
pub const FACTOR_CONSISTENCY: &str = "consistency";
pub const FACTOR_DIVERSITY: &str = "diversity";
pub const FACTOR_RECENCY: &str = "recency";
pub const FACTOR_VERIFICATION_LEVEL: &str = "verification_level";

// ---------------------------------------------------------------------------
// Configuration defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_HALF_LIFE_DAYS: f64 = 30.0;
pub const DEFAULT_MINIMUM_DATA_POINTS: u64 = 5;
pub const DEFAULT_OUTLIER_Z_THRESHOLD: f64 = 2.5;
/// Rating count at which the sample-size confidence factor saturates.
pub const DEFAULT_IDEAL_REVIEWS: u64 = 100;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
