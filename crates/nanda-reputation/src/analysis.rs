//! History analysis over stored scores.

use nanda_core::error::ConfigError;
use nanda_core::types::ReputationScore;

use crate::outliers::detect_outliers;

/// Scores in `history` whose overall value is a z-score outlier.
///
/// Order follows `history`. Fails on the same thresholds as [`detect_outliers`].
pub fn score_anomalies(
    history: &[ReputationScore],
    z_threshold: f64,
) -> Result<Vec<ReputationScore>, ConfigError> {
    let overall: Vec<f64> = history.iter().map(|s| s.overall_score).collect();
    Ok(detect_outliers(&overall, z_threshold)?
        .into_iter()
        .map(|i| history[i].clone())
        .collect())
}

/// Latest minus earliest overall score. `None` for an empty history.
pub fn score_trend(history: &[ReputationScore]) -> Option<f64> {
    let first = history.first()?;
    let last = history.last()?;
    Some(last.overall_score - first.overall_score)
}
