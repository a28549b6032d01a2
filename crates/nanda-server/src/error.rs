//! Error types for the server wrapper and the reputation service.
use nanda_core::error::{ConfigError, RegistryError, SourceError, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("invalid subject id: {0:?}")] InvalidSubject(String),
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Registry(#[from] RegistryError),
    #[error(transparent)] Source(#[from] SourceError),
    #[error(transparent)] Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("configuration load: {0}")] Load(#[from] config::ConfigError),
    #[error(transparent)] Scoring(#[from] ConfigError),
    #[error(transparent)] Registry(#[from] RegistryError),
    #[error(transparent)] Store(#[from] StoreError),
    #[error(transparent)] Source(#[from] SourceError),
    #[error("plugin already registered: {0}")] DuplicatePlugin(String),
    #[error("store backend {0} not compiled in")] BackendUnavailable(&'static str),
    #[error("io: {0}")] Io(#[from] std::io::Error),
}
