//! Category sub-score functions.
//!
//! Each function is pure and total. Absence is handled per category rather
//! than uniformly:
//!
//! | Category     | Absent | Formula |
//! |--------------|--------|---------|
//! | performance  | 50     | `0.5·uptime + 0.3·clamp(100 − ms/10) + 0.2·clamp(100 − err·100)` |
//! | verification | 0      | gold 100, silver 75, bronze 50, none 0 |
//! | feedback     | 50     | `(rating − 1) / 4 · 100` |
//! | usage        | 50     | `0.3·req + 0.4·clients + 0.3·longevity`, each term saturating at 100 |
//!
//! Inside a present performance category each missing field contributes the
//! neutral 50 to its term. Inside a present usage category each missing
//! field contributes 0.

use nanda_core::constants::{
    DEFAULT_FEEDBACK_SCORE, DEFAULT_PERFORMANCE_SCORE, DEFAULT_PERFORMANCE_TERM,
    DEFAULT_USAGE_SCORE, DEFAULT_VERIFICATION_SCORE, PERFORMANCE_ERROR_WEIGHT,
    PERFORMANCE_RESPONSE_WEIGHT, PERFORMANCE_UPTIME_WEIGHT, RATING_MAX, RATING_MIN,
    RESPONSE_MS_PER_POINT, SCORE_MAX, USAGE_CLIENTS_SATURATION, USAGE_CLIENTS_WEIGHT,
    USAGE_LONGEVITY_SATURATION_DAYS, USAGE_LONGEVITY_WEIGHT, USAGE_REQUESTS_SATURATION,
    USAGE_REQUESTS_WEIGHT,
};
use nanda_core::types::{
    CategoryScores, FeedbackMetrics, MetricsBundle, PerformanceMetrics, UsageMetrics,
    VerificationMetrics,
};

use crate::normalize::clamp_score;

pub fn performance_score(performance: Option<&PerformanceMetrics>) -> f64 {
    let Some(p) = performance else {
        return DEFAULT_PERFORMANCE_SCORE;
    };

    // Uptime enters unclamped; only the blended result is bounded.
    let uptime = p.uptime_percentage.unwrap_or(DEFAULT_PERFORMANCE_TERM);
    let response = p
        .avg_response_time_ms
        .map(|ms| clamp_score(SCORE_MAX - ms / RESPONSE_MS_PER_POINT))
        .unwrap_or(DEFAULT_PERFORMANCE_TERM);
    let errors = p
        .error_rate
        .map(|rate| clamp_score(SCORE_MAX - rate * SCORE_MAX))
        .unwrap_or(DEFAULT_PERFORMANCE_TERM);

    clamp_score(
        PERFORMANCE_UPTIME_WEIGHT * uptime
            + PERFORMANCE_RESPONSE_WEIGHT * response
            + PERFORMANCE_ERROR_WEIGHT * errors,
    )
}

pub fn verification_score(verification: Option<&VerificationMetrics>) -> f64 {
    verification
        .map(|v| v.level.score())
        .unwrap_or(DEFAULT_VERIFICATION_SCORE)
}

/// A zero or `NaN` rating is treated as absent.
pub fn feedback_score(feedback: Option<&FeedbackMetrics>) -> f64 {
    match feedback.and_then(|f| f.average_rating) {
        Some(rating) if rating != 0.0 && !rating.is_nan() => {
            clamp_score((rating - RATING_MIN) / (RATING_MAX - RATING_MIN) * SCORE_MAX)
        }
        _ => DEFAULT_FEEDBACK_SCORE,
    }
}

pub fn usage_score(usage: Option<&UsageMetrics>) -> f64 {
    let Some(u) = usage else {
        return DEFAULT_USAGE_SCORE;
    };

    let saturating = |value: Option<u64>, saturation: f64| {
        value
            .map(|v| (v as f64 / saturation * SCORE_MAX).min(SCORE_MAX))
            .unwrap_or(0.0)
    };

    clamp_score(
        USAGE_REQUESTS_WEIGHT * saturating(u.total_requests, USAGE_REQUESTS_SATURATION)
            + USAGE_CLIENTS_WEIGHT * saturating(u.unique_clients, USAGE_CLIENTS_SATURATION)
            + USAGE_LONGEVITY_WEIGHT
                * saturating(u.longevity_days, USAGE_LONGEVITY_SATURATION_DAYS),
    )
}

/// Score all four categories independently. Values are not rounded.
pub fn category_scores(bundle: &MetricsBundle) -> CategoryScores {
    CategoryScores {
        performance: performance_score(bundle.performance.as_ref()),
        verification: verification_score(bundle.verification.as_ref()),
        feedback: feedback_score(bundle.feedback.as_ref()),
        usage: usage_score(bundle.usage.as_ref()),
    }
}
