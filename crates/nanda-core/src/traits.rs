//! Trait interfaces for NANDA reputation scoring.
//!
//! These traits define the contracts between crates:
//! - [`ScoringAlgorithm`]: turns a metrics bundle into a score record (nanda-reputation implements)
//! - [`FactorEstimator`]: pluggable confidence sub-estimator (nanda-reputation implements)
//! - [`MetricsSource`]: supplies metrics bundles per subject (nanda-server implements over HTTP)
//!
//! The persistence contract lives in [`crate::store`].

use async_trait::async_trait;

use crate::error::SourceError;
use crate::types::{MetricsBundle, ReputationScore};

/// A versioned scoring strategy.
///
/// Implementations are pure: they read the bundle and their own immutable
/// configuration, and return a fresh record. Configuration is validated
/// when the algorithm is constructed, so calculation itself cannot fail.
pub trait ScoringAlgorithm: Send + Sync {
    /// Stable identifier stamped on every record this algorithm produces.
    fn id(&self) -> &str;

    /// Human-readable summary of the strategy.
    fn description(&self) -> &str {
        ""
    }

    /// Score one subject from its metrics bundle.
    fn calculate(&self, subject_id: &str, bundle: &MetricsBundle) -> ReputationScore;
}

/// One confidence sub-factor computed from a bundle.
///
/// Returned values must lie in `[0, 100]`; callers clamp the result.
pub trait FactorEstimator: Send + Sync {
    fn name(&self) -> &str;

    fn estimate(&self, bundle: &MetricsBundle) -> f64;
}

/// Supplier of metrics bundles.
///
/// Any transport (HTTP, in-memory fixture, database) satisfies this. An
/// unknown subject yields an empty bundle rather than an error; errors are
/// reserved for transport and decoding failures.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn fetch(&self, subject_id: &str) -> Result<MetricsBundle, SourceError>;
}
