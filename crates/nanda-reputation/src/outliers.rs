//! Z-score outlier detection over a population.
//!
//! Uses the population standard deviation (divide by `N`). Inputs with
//! fewer than two values, or with zero spread, have no outliers.

use nanda_core::error::ConfigError;

/// Population mean and standard deviation, or `None` for an empty slice.
pub fn population_stats(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// Indices of values whose `|value - mean| / stddev` exceeds `z_threshold`.
///
/// Indices are returned in ascending order. The comparison is strict: a
/// value exactly at the threshold is not an outlier.
///
/// # Errors
///
/// [`ConfigError::InvalidZThreshold`] unless `z_threshold` is positive and finite.
pub fn detect_outliers(values: &[f64], z_threshold: f64) -> Result<Vec<usize>, ConfigError> {
    check_z_threshold(z_threshold)?;
    if values.len() < 2 {
        return Ok(Vec::new());
    }
    let Some((mean, stddev)) = population_stats(values) else {
        return Ok(Vec::new());
    };
    if stddev == 0.0 || !stddev.is_finite() || !mean.is_finite() {
        return Ok(Vec::new());
    }

    Ok(values
        .iter()
        .enumerate()
        .filter(|(_, v)| ((*v - mean).abs() / stddev) > z_threshold)
        .map(|(i, _)| i)
        .collect())
}

/// Accepts only a positive, finite z-score threshold.
pub fn check_z_threshold(z_threshold: f64) -> Result<(), ConfigError> {
    if z_threshold.is_finite() && z_threshold > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidZThreshold(z_threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanda_core::constants::DEFAULT_OUTLIER_Z_THRESHOLD;

    #[test]
    fn empty_has_no_outliers() {
        assert!(detect_outliers(&[], DEFAULT_OUTLIER_Z_THRESHOLD).unwrap().is_empty());
    }

    #[test]
    fn single_value_has_no_outliers() {
        assert!(detect_outliers(&[42.0], DEFAULT_OUTLIER_Z_THRESHOLD).unwrap().is_empty());
        assert!(detect_outliers(&[-1e9], 0.1).unwrap().is_empty());
    }

    #[test]
    fn identical_values_have_no_outliers() {
        assert!(detect_outliers(&[7.0; 20], 0.5).unwrap().is_empty());
    }

    #[test]
    fn spike_is_flagged() {
        let values = [2.0, 3.0, 3.0, 4.0, 4.0, 4.0, 5.0, 5.0, 20.0];
        let outliers = detect_outliers(&values, 2.0).unwrap();
        assert!(outliers.contains(&8), "expected index 8 in {outliers:?}");
        assert_eq!(outliers, vec![8]);
    }

    #[test]
    fn low_spike_is_flagged() {
        let mut values = vec![50.0; 30];
        values[4] = 49.0;
        values[5] = 51.0;
        values.push(-200.0);
        assert_eq!(detect_outliers(&values, DEFAULT_OUTLIER_Z_THRESHOLD).unwrap(), vec![30]);
    }

    #[test]
    fn two_values_never_exceed_unit_z() {
        // With two points each sits exactly one stddev from the mean.
        assert!(detect_outliers(&[0.0, 100.0], 1.0).unwrap().is_empty());
        assert_eq!(detect_outliers(&[0.0, 100.0], 0.5).unwrap(), vec![0, 1]);
    }

    #[test]
    fn population_stats_known_values() {
        let (mean, stddev) = population_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(mean, 5.0);
        assert_eq!(stddev, 2.0);
        assert!(population_stats(&[]).is_none());
    }

    #[test]
    fn invalid_threshold_rejected() {
        for z in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            match detect_outliers(&[1.0, 2.0, 3.0], z) {
                Err(ConfigError::InvalidZThreshold(got)) => {
                    assert!(got.to_bits() == z.to_bits(), "{got} vs {z}")
                }
                other => panic!("z={z}: expected InvalidZThreshold, got {other:?}"),
            }
        }
        // checked even when there is nothing to scan
        assert!(detect_outliers(&[], -1.0).is_err());
    }
}
