//! Min–max normalization and score clamping.

use nanda_core::constants::{SCORE_MAX, SCORE_MIN};
use nanda_core::error::ConfigError;

/// Clamp to `[0, 100]`. `NaN` maps to `0`.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return SCORE_MIN;
    }
    value.clamp(SCORE_MIN, SCORE_MAX)
}

/// Clamp to `[0, 100]` and round to the nearest integer.
pub fn round_score(value: f64) -> f64 {
    clamp_score(value).round()
}

/// Clamp `value` to `[min, max]`, then rescale linearly onto `[0, 100]`.
///
/// A degenerate range (`min == max`) returns `100` when `value >= min` and
/// `0` otherwise. An inverted or non-finite range is a configuration error.
pub fn normalize(value: f64, min: f64, max: f64) -> Result<f64, ConfigError> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(ConfigError::InvalidRange { min, max });
    }
    if value.is_nan() {
        return Ok(SCORE_MIN);
    }
    if min == max {
        return Ok(if value >= min { SCORE_MAX } else { SCORE_MIN });
    }

    let clamped = value.clamp(min, max);
    Ok((clamped - min) / (max - min) * SCORE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn endpoints_map_to_bounds() {
        assert_eq!(normalize(10.0, 10.0, 20.0).unwrap(), 0.0);
        assert_eq!(normalize(20.0, 10.0, 20.0).unwrap(), 100.0);
    }

    #[test]
    fn midpoint_is_fifty() {
        assert_eq!(normalize(15.0, 10.0, 20.0).unwrap(), 50.0);
    }

    #[test]
    fn out_of_range_values_clamp() {
        assert_eq!(normalize(-5.0, 0.0, 10.0).unwrap(), 0.0);
        assert_eq!(normalize(500.0, 0.0, 10.0).unwrap(), 100.0);
    }

    #[test]
    fn degenerate_range_at_or_above_min_is_full() {
        assert_eq!(normalize(5.0, 5.0, 5.0).unwrap(), 100.0);
        assert_eq!(normalize(6.0, 5.0, 5.0).unwrap(), 100.0);
    }

    #[test]
    fn degenerate_range_below_min_is_zero() {
        assert_eq!(normalize(4.999, 5.0, 5.0).unwrap(), 0.0);
    }

    #[test]
    fn inverted_range_rejected() {
        assert_eq!(
            normalize(1.0, 10.0, 0.0),
            Err(ConfigError::InvalidRange { min: 10.0, max: 0.0 })
        );
    }

    #[test]
    fn non_finite_range_rejected() {
        assert!(normalize(1.0, f64::NEG_INFINITY, 0.0).is_err());
        assert!(normalize(1.0, 0.0, f64::NAN).is_err());
    }

    #[test]
    fn nan_value_maps_to_zero() {
        assert_eq!(normalize(f64::NAN, 0.0, 1.0).unwrap(), 0.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
    }

    #[test]
    fn round_score_clamps_then_rounds() {
        assert_eq!(round_score(99.6), 100.0);
        assert_eq!(round_score(150.0), 100.0);
        assert_eq!(round_score(-3.0), 0.0);
        assert_eq!(round_score(42.5), 43.0);
        assert_eq!(round_score(42.49), 42.0);
    }

    // --- proptest ---

    proptest! {
        #[test]
        fn normalize_monotonic(
            min in -1_000f64..1_000.0,
            span in 0.001f64..1_000.0,
            a in -5_000f64..5_000.0,
            b in -5_000f64..5_000.0,
        ) {
            let max = min + span;
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(normalize(lo, min, max).unwrap() <= normalize(hi, min, max).unwrap());
        }

        #[test]
        fn normalize_always_in_bounds(
            min in -1_000f64..1_000.0,
            span in 0f64..1_000.0,
            x in -5_000f64..5_000.0,
        ) {
            let n = normalize(x, min, min + span).unwrap();
            prop_assert!((0.0..=100.0).contains(&n));
        }

        #[test]
        fn clamp_score_always_in_bounds(x in proptest::num::f64::ANY) {
            let c = clamp_score(x);
            prop_assert!((0.0..=100.0).contains(&c));
        }
    }
}
