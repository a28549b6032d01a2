//! # nanda-reputation: Reputation scoring for networked services.
//!
//! Every function here is pure: immutable inputs in, fresh values out, no
//! shared state. Safe to call from any number of threads.
//!
//! - **Category sub-scores**: performance, verification, feedback and usage
//!   are scored independently, each with its own default when absent.
//! - **Weighted aggregation**: sub-scores are blended by configured weights
//!   and clamped to `[0, 100]`.
//! - **Confidence**: a separate `[0, 100]` estimate blended from sample size,
//!   verification strength and pluggable consistency/diversity/recency
//!   estimators.
//! - **Primitives**: exponential time decay, min–max normalization and
//!   z-score outlier detection.
//! - **Registry**: algorithms are held in an owned [`AlgorithmRegistry`]
//!   value; there is no process-global state.

pub mod analysis;
pub mod categories;
pub mod confidence;
pub mod decay;
pub mod normalize;
pub mod outliers;
pub mod registry;
pub mod scorer;

pub use analysis::{score_anomalies, score_trend};
pub use confidence::{calculate_confidence, ConfidenceEstimator};
pub use decay::{apply_time_decay, HalfLife};
pub use normalize::normalize;
pub use outliers::detect_outliers;
pub use registry::AlgorithmRegistry;
pub use scorer::{calculate_score, WeightedAggregation};
