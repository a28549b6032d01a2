//! Error types for NANDA reputation scoring.
//!
//! Missing metrics are never errors. Only invalid configuration and
//! collaborator failures (storage, metrics sources) surface to callers.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("half-life must be positive and finite, got {0}")] NonPositiveHalfLife(f64),
    #[error("outlier z-threshold must be positive and finite, got {0}")] InvalidZThreshold(f64),
    #[error("ideal review count must be at least 1")] ZeroIdealReviews,
    #[error("invalid weight for {category}: {value}")] InvalidWeight { category: &'static str, value: f64 },
    #[error("invalid normalization range: min {min}, max {max}")] InvalidRange { min: f64, max: f64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid subject id: {0:?}")] InvalidSubject(String),
    #[error("codec: {0}")] Codec(String),
    #[error("backend: {0}")] Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("invalid metrics endpoint: {0}")] InvalidEndpoint(String),
    #[error("transport: {0}")] Transport(String),
    #[error("metrics source returned status {status} for {subject_id}")] Status { subject_id: String, status: u16 },
    #[error("decode: {0}")] Decode(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("unknown algorithm: {0}")] UnknownAlgorithm(String),
    #[error("algorithm already registered: {0}")] DuplicateAlgorithm(String),
    #[error("no default algorithm registered")] NoDefault,
    #[error(transparent)] Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum NandaError {
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Store(#[from] StoreError),
    #[error(transparent)] Source(#[from] SourceError),
    #[error(transparent)] Registry(#[from] RegistryError),
}
