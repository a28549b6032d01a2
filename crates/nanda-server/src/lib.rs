//! # nanda-server: HTTP server wrapper for NANDA services.
//!
//! A [`NandaServer`] owns the configuration and a shared
//! [`ReputationService`]. Functionality is contributed by [`Plugin`]s: each
//! plugin advertises capabilities and mounts its routes onto the shared
//! router. The built-in [`ReputationPlugin`] exposes scoring, history,
//! anomaly and badge endpoints.
//!
//! Persistence defaults to the in-memory store; the `rocksdb` feature adds
//! [`storage::RocksScoreStore`].

pub mod badge;
pub mod config;
pub mod error;
pub mod http_source;
pub mod plugin;
pub mod routes;
pub mod service;
#[cfg(feature = "rocksdb")]
pub mod storage;

use std::sync::Arc;

pub use config::{ServerConfig, StoreBackend};
pub use error::{ServerError, ServiceError};
pub use http_source::HttpMetricsSource;
pub use plugin::{NandaServer, Plugin, PluginInfo};
pub use routes::ReputationPlugin;
pub use service::ReputationService;

/// State shared by every route handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReputationService>,
    pub config: Arc<ServerConfig>,
    /// Registered plugins and their capabilities, in registration order.
    pub plugins: Arc<Vec<PluginInfo>>,
}
