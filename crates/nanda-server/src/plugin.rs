//! Plugin registration and server bootstrap.
//!
//! [`NandaServer`] is a builder: construct it from a [`ServerConfig`],
//! register plugins, then either take the assembled [`Router`] (tests) or
//! call [`NandaServer::serve`].

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use nanda_core::source::MemoryMetricsSource;
use nanda_core::store::{MemoryScoreStore, ScoreStore};
use nanda_core::traits::MetricsSource;
use nanda_reputation::AlgorithmRegistry;
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::{ServerConfig, StoreBackend};
use crate::error::ServerError;
use crate::http_source::HttpMetricsSource;
use crate::service::ReputationService;
use crate::AppState;

/// A unit of server functionality.
pub trait Plugin: Send + Sync {
    /// Unique plugin name.
    fn name(&self) -> &str;

    /// Capability identifiers advertised on `/api/capabilities`.
    fn capabilities(&self) -> Vec<String>;

    /// Routes to mount. Paths must not collide with other plugins.
    fn routes(&self) -> Router<AppState>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub capabilities: Vec<String>,
}

pub struct NandaServer {
    config: ServerConfig,
    service: Arc<ReputationService>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl NandaServer {
    /// Build a server with collaborators chosen by `config`.
    ///
    /// The metrics source is HTTP when `metrics_endpoint` is set and an empty
    /// in-memory fixture otherwise. The store follows `config.store`.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let registry = AlgorithmRegistry::with_default(config.scoring.clone())?;

        let source: Arc<dyn MetricsSource> = match &config.metrics_endpoint {
            Some(endpoint) => Arc::new(HttpMetricsSource::new(endpoint)?),
            None => Arc::new(MemoryMetricsSource::new()),
        };
        let store = open_store(&config)?;

        let service = ReputationService::new(source, registry, store)
            .with_outlier_z_threshold(config.scoring.outlier_z_threshold)?;
        Ok(Self::with_service(config, Arc::new(service)))
    }

    /// Build a server around an existing service.
    pub fn with_service(config: ServerConfig, service: Arc<ReputationService>) -> Self {
        Self {
            config,
            service,
            plugins: Vec::new(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn service(&self) -> &Arc<ReputationService> {
        &self.service
    }

    /// # Errors
    ///
    /// [`ServerError::DuplicatePlugin`] if a plugin with the same name exists.
    pub fn register_plugin(&mut self, plugin: impl Plugin + 'static) -> Result<(), ServerError> {
        if self.plugins.iter().any(|p| p.name() == plugin.name()) {
            return Err(ServerError::DuplicatePlugin(plugin.name().to_string()));
        }
        info!(
            plugin = %plugin.name(),
            capabilities = ?plugin.capabilities(),
            "server: plugin registered"
        );
        self.plugins.push(Box::new(plugin));
        Ok(())
    }

    /// Builder-style [`register_plugin`](Self::register_plugin).
    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Result<Self, ServerError> {
        self.register_plugin(plugin)?;
        Ok(self)
    }

    pub fn capabilities(&self) -> Vec<PluginInfo> {
        self.plugins
            .iter()
            .map(|p| PluginInfo {
                name: p.name().to_string(),
                capabilities: p.capabilities(),
            })
            .collect()
    }

    /// Assemble the router: built-in endpoints plus every plugin's routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            service: self.service.clone(),
            config: Arc::new(self.config.clone()),
            plugins: Arc::new(self.capabilities()),
        };

        let mut router = Router::new()
            .route("/health", get(health))
            .route("/api/capabilities", get(capabilities));
        for plugin in &self.plugins {
            router = router.merge(plugin.routes());
        }

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router = router.layer(cors);
        }
        router.with_state(state)
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(
            addr = %addr,
            plugins = self.plugins.len(),
            store = %self.config.store,
            "server: listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("server: stopped");
        Ok(())
    }
}

fn open_store(config: &ServerConfig) -> Result<Arc<dyn ScoreStore>, ServerError> {
    match config.store {
        StoreBackend::Memory => Ok(Arc::new(MemoryScoreStore::new())),
        #[cfg(feature = "rocksdb")]
        StoreBackend::Rocksdb => {
            let path = config.db_path();
            std::fs::create_dir_all(&path)?;
            Ok(Arc::new(crate::storage::RocksScoreStore::open(&path)?))
        }
        #[cfg(not(feature = "rocksdb"))]
        StoreBackend::Rocksdb => Err(ServerError::BackendUnavailable("rocksdb")),
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn capabilities(State(s): State<AppState>) -> Json<Value> {
    Json(json!({ "plugins": s.plugins.as_ref() }))
}
