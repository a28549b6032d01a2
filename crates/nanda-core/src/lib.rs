//! # nanda-core
//! Foundation types and collaborator traits for NANDA reputation scoring.
//!
//! - [`types`]: metrics bundles, scoring configuration, score records
//! - [`traits`]: scoring algorithm, confidence sub-estimator and metrics source contracts
//! - [`store`]: score persistence contract and in-memory store
//! - [`source`]: in-memory metrics source fixture

pub mod constants;
pub mod error;
pub mod source;
pub mod store;
pub mod traits;
pub mod types;

pub use error::{ConfigError, NandaError, RegistryError, SourceError, StoreError};
pub use source::MemoryMetricsSource;
pub use store::{MemoryScoreStore, ScoreStore};
pub use traits::{FactorEstimator, MetricsSource, ScoringAlgorithm};
pub use types::{
    CategoryScores, CategoryWeights, Confidence, CustomValue, FeedbackMetrics, MetricsBundle,
    PerformanceMetrics, ReputationScore, ScoringConfig, UsageMetrics, VerificationLevel,
    VerificationMetrics,
};
