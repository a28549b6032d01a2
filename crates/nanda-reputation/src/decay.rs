//! Exponential time decay by age.
//!
//! `decayed = value * 0.5^(age_days / half_life_days)`. Age is measured at
//! call time, so two calls on the same input at different wall-clock times
//! return different results.

use chrono::{DateTime, Utc};
use nanda_core::constants::SECONDS_PER_DAY;
use nanda_core::error::ConfigError;

/// A validated, strictly positive half-life in days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfLife(f64);

impl HalfLife {
    /// Rejects zero, negative and non-finite half-lives.
    pub fn new(days: f64) -> Result<Self, ConfigError> {
        if days.is_finite() && days > 0.0 {
            Ok(Self(days))
        } else {
            Err(ConfigError::NonPositiveHalfLife(days))
        }
    }

    pub fn days(self) -> f64 {
        self.0
    }

    /// Remaining fraction after `age_days`, in `(0, 1]`.
    ///
    /// Non-positive ages (records timestamped in the future) do not decay.
    pub fn factor(self, age_days: f64) -> f64 {
        if age_days.is_nan() || age_days <= 0.0 {
            return 1.0;
        }
        0.5_f64.powf(age_days / self.0)
    }

    pub fn decay(self, value: f64, age_days: f64) -> f64 {
        value * self.factor(age_days)
    }
}

/// Fractional days elapsed from `recorded_at` to `now`.
pub fn age_in_days(recorded_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed_ms = now.signed_duration_since(recorded_at).num_milliseconds();
    elapsed_ms as f64 / 1000.0 / SECONDS_PER_DAY
}

/// Decay `value` by the age of `recorded_at` relative to the current time.
pub fn apply_time_decay(
    value: f64,
    recorded_at: DateTime<Utc>,
    half_life_days: f64,
) -> Result<f64, ConfigError> {
    apply_time_decay_at(value, recorded_at, Utc::now(), half_life_days)
}

/// Decay `value` by the age of `recorded_at` relative to `now`.
pub fn apply_time_decay_at(
    value: f64,
    recorded_at: DateTime<Utc>,
    now: DateTime<Utc>,
    half_life_days: f64,
) -> Result<f64, ConfigError> {
    let half_life = HalfLife::new(half_life_days)?;
    Ok(half_life.decay(value, age_in_days(recorded_at, now)))
}
